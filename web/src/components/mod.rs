pub mod error;
pub mod loading;
pub mod search_bar;
pub mod search_filters;
pub mod search_results;

pub use search_bar::SearchBar;
pub use search_filters::SearchFilters;
pub use search_results::SearchResults;
