#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use recipe_finder::api_connection::connection::{ApiConnectionError, NutritionApi, RecipeApi};
use recipe_finder::api_connection::endpoints::{
    ComplexSearchResponse, NutritionDetailsRequest, SearchParams,
};
use recipe_finder::detail::nutrition::{Nutrient, NutritionAnalysis};
use recipe_finder::recipe::{Ingredient, Recipe};
use recipe_finder::search::LoadingSignal;

fn server_error() -> ApiConnectionError {
    ApiConnectionError::ApiError {
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        error_body: "boom".to_string(),
    }
}

/// In-process recipe API. `None` in a slot makes that call fail.
#[derive(Default)]
pub struct FakeRecipeApi {
    pub search_results: Mutex<Option<Vec<Recipe>>>,
    pub total_results: Mutex<u64>,
    pub random: Mutex<Option<Vec<Recipe>>>,
    pub recipe: Mutex<Option<Recipe>>,
    pub trivia: Mutex<Option<String>>,
    pub recipe_delay: Mutex<Duration>,
    pub trivia_delay: Mutex<Duration>,
    pub last_search: Mutex<Option<SearchParams>>,
    pub search_calls: AtomicUsize,
    pub recipe_calls: AtomicUsize,
    pub loading: Mutex<Option<LoadingSignal>>,
    pub loading_during_call: Mutex<Vec<bool>>,
}

impl FakeRecipeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(self, results: Vec<Recipe>, total: u64) -> Self {
        *self.search_results.lock().unwrap() = Some(results);
        *self.total_results.lock().unwrap() = total;
        self
    }

    pub fn with_random(self, results: Vec<Recipe>) -> Self {
        *self.random.lock().unwrap() = Some(results);
        self
    }

    pub fn with_recipe(self, recipe: Recipe, delay: Duration) -> Self {
        *self.recipe.lock().unwrap() = Some(recipe);
        *self.recipe_delay.lock().unwrap() = delay;
        self
    }

    pub fn with_trivia(self, text: &str, delay: Duration) -> Self {
        *self.trivia.lock().unwrap() = Some(text.to_string());
        *self.trivia_delay.lock().unwrap() = delay;
        self
    }

    /// Records the flag's value whenever a search or random call reaches the network.
    pub fn watching_loading(self, signal: LoadingSignal) -> Self {
        *self.loading.lock().unwrap() = Some(signal);
        self
    }

    pub fn last_search(&self) -> Option<SearchParams> {
        self.last_search.lock().unwrap().clone()
    }

    pub fn loading_during_call(&self) -> Vec<bool> {
        self.loading_during_call.lock().unwrap().clone()
    }

    async fn record_loading(&self) {
        let seen = self.loading.lock().unwrap().as_ref().map(|s| s.is_loading());
        if let Some(seen) = seen {
            self.loading_during_call.lock().unwrap().push(seen);
        }
        // Lets subscribers observe the raised flag before it drops.
        tokio::task::yield_now().await;
    }
}

#[async_trait]
impl RecipeApi for FakeRecipeApi {
    async fn complex_search(
        &self,
        params: &SearchParams,
    ) -> Result<ComplexSearchResponse, ApiConnectionError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.record_loading().await;
        *self.last_search.lock().unwrap() = Some(params.clone());
        let results = self.search_results.lock().unwrap().clone();
        let total_results = *self.total_results.lock().unwrap();
        results
            .map(|results| ComplexSearchResponse {
                results,
                total_results,
            })
            .ok_or_else(server_error)
    }

    async fn random_recipes(&self, _number: u32) -> Result<Vec<Recipe>, ApiConnectionError> {
        self.record_loading().await;
        self.random.lock().unwrap().clone().ok_or_else(server_error)
    }

    async fn recipe_information(&self, _id: u64) -> Result<Recipe, ApiConnectionError> {
        self.recipe_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.recipe_delay.lock().unwrap();
        tokio::time::sleep(delay).await;
        self.recipe.lock().unwrap().clone().ok_or_else(server_error)
    }

    async fn random_trivia(&self) -> Result<String, ApiConnectionError> {
        let delay = *self.trivia_delay.lock().unwrap();
        tokio::time::sleep(delay).await;
        self.trivia.lock().unwrap().clone().ok_or_else(server_error)
    }
}

#[derive(Default)]
pub struct FakeNutritionApi {
    pub analysis: Mutex<Option<NutritionAnalysis>>,
    pub requests: Mutex<Vec<NutritionDetailsRequest>>,
}

impl FakeNutritionApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_analysis(self, analysis: NutritionAnalysis) -> Self {
        *self.analysis.lock().unwrap() = Some(analysis);
        self
    }

    pub fn requests(&self) -> Vec<NutritionDetailsRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl NutritionApi for FakeNutritionApi {
    async fn nutrition_details(
        &self,
        request: &NutritionDetailsRequest,
    ) -> Result<NutritionAnalysis, ApiConnectionError> {
        self.requests.lock().unwrap().push(request.clone());
        self.analysis.lock().unwrap().clone().ok_or_else(server_error)
    }
}

pub fn recipe(id: u64, title: &str, health_score: f64) -> Recipe {
    Recipe {
        id,
        title: title.to_string(),
        health_score,
        servings: 2,
        ready_in_minutes: 25,
        ..Default::default()
    }
}

pub fn with_ingredients(mut recipe: Recipe, lines: &[(&str, f64, &str)]) -> Recipe {
    recipe.extended_ingredients = lines
        .iter()
        .map(|(name, amount, unit)| Ingredient {
            name: name.to_string(),
            amount: *amount,
            unit: Some(unit.to_string()),
            ..Default::default()
        })
        .collect();
    recipe
}

pub fn analysis(calories: f64, carb: f64, protein: f64, fat: f64) -> NutritionAnalysis {
    let mut analysis = NutritionAnalysis {
        calories,
        ..Default::default()
    };
    for (code, quantity) in [("CHOCDF", carb), ("PROCNT", protein), ("FAT", fat)] {
        analysis.total_nutrients.insert(
            code.to_string(),
            Nutrient {
                label: code.to_string(),
                quantity,
                unit: "g".to_string(),
            },
        );
    }
    analysis
}
