use serde::{Deserialize, Serialize};

use crate::recipe::Recipe;

pub const SPOONACULAR_DEFAULT_BASE_URL: &str = "https://api.spoonacular.com";
pub const EDAMAM_DEFAULT_BASE_URL: &str = "https://api.edamam.com";

pub const COMPLEX_SEARCH_PATH: &str = "/recipes/complexSearch";
pub const RANDOM_RECIPES_PATH: &str = "/recipes/random";
pub const RANDOM_TRIVIA_PATH: &str = "/food/trivia/random";
pub const NUTRITION_DETAILS_PATH: &str = "/api/nutrition-details";

/// Maximum number of recipes requested from a single ingredient search.
pub const MAX_SEARCH_RESULTS: u32 = 16;

pub fn recipe_information_path(id: u64) -> String {
    format!("/recipes/{}/information", id)
}

/// Everything the ingredient search sends to `complexSearch`, minus the API key.
///
/// Unset filters go out as empty strings, which the API treats as "any".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchParams {
    pub include_ingredients: String,
    pub cuisine: String,
    pub intolerances: String,
    pub diet: String,
    pub number: u32,
}

impl SearchParams {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("query", String::new()),
            ("includeIngredients", self.include_ingredients.clone()),
            ("cuisine", self.cuisine.clone()),
            ("intolerances", self.intolerances.clone()),
            ("diet", self.diet.clone()),
            ("addRecipeInformation", "true".to_string()),
            ("instructionsRequired", "true".to_string()),
            ("number", self.number.to_string()),
        ]
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ComplexSearchResponse {
    #[serde(default)]
    pub results: Vec<Recipe>,
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RandomRecipesResponse {
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TriviaResponse {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NutritionDetailsRequest {
    pub title: String,
    pub ingr: Vec<String>,
}

/// Search results after ranking, as handed to the results presenter.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub results: Vec<Recipe>,
    pub total_results: u64,
    pub search_triggered: bool,
}
