pub mod loader;
pub mod nutrition;

pub use loader::{DetailError, DetailState, LoadToken, NutritionState, RecipeDetailLoader, RecipeSource};
pub use nutrition::{MacroBreakdown, NutritionAnalysis, NutritionLabel};
