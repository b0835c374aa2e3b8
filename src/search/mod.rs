pub mod filters;
pub mod ingredient_tags;
pub mod request_builder;

pub use filters::{Cuisine, Diet, FilterPanel, FilterSelection, Intolerance};
pub use ingredient_tags::IngredientTagEditor;
pub use request_builder::{LoadingSignal, SearchError, SearchRequestBuilder};
