pub mod connection;
pub mod endpoints;

pub use connection::{ApiConnectionError, EdamamClient, NutritionApi, RecipeApi, SpoonacularClient};
pub use endpoints::{SearchOutcome, SearchParams};
