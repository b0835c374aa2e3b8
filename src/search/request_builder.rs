use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

use super::filters::FilterSelection;
use crate::api_connection::connection::{ApiConnectionError, RecipeApi};
use crate::api_connection::endpoints::{SearchOutcome, SearchParams, MAX_SEARCH_RESULTS};
use crate::notify::Notifier;
use crate::recipe::sort_by_health_score;

pub const NO_INGREDIENTS_MESSAGE: &str = "Please enter at least one ingredient.";
pub const SEARCH_FAILED_MESSAGE: &str = "Error searching recipes. Please try again.";
pub const RANDOM_FAILED_MESSAGE: &str = "Error finding random recipe. Please try again.";

#[derive(Debug)]
pub enum SearchError {
    NoIngredients,
    Api(ApiConnectionError),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::NoIngredients => write!(f, "no ingredients to search with"),
            SearchError::Api(err) => write!(f, "recipe search failed: {}", err),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SearchError::Api(err) => Some(err),
            SearchError::NoIngredients => None,
        }
    }
}

impl From<ApiConnectionError> for SearchError {
    fn from(err: ApiConnectionError) -> Self {
        SearchError::Api(err)
    }
}

/// Shared "a search is in flight" flag. Observers subscribe to changes.
#[derive(Clone)]
pub struct LoadingSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for LoadingSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_loading(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn set(&self, loading: bool) {
        self.tx.send_replace(loading);
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Raises the flag until the guard is dropped, so every exit path clears it once.
    pub fn begin(&self) -> LoadingGuard {
        self.set(true);
        LoadingGuard {
            signal: self.clone(),
        }
    }
}

pub struct LoadingGuard {
    signal: LoadingSignal,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.signal.set(false);
    }
}

/// Builds the `complexSearch` parameters, or `None` when there is nothing to search for.
pub fn build_search_params(ingredients: &[String], filters: &FilterSelection) -> Option<SearchParams> {
    if ingredients.is_empty() {
        return None;
    }
    Some(SearchParams {
        include_ingredients: ingredients.join(","),
        cuisine: filters.cuisine_param(),
        intolerances: filters.intolerances_param(),
        diet: filters.diet_param(),
        number: MAX_SEARCH_RESULTS,
    })
}

pub struct SearchRequestBuilder {
    api: Arc<dyn RecipeApi>,
    notifier: Arc<dyn Notifier>,
    loading: LoadingSignal,
}

impl SearchRequestBuilder {
    pub fn new(api: Arc<dyn RecipeApi>, notifier: Arc<dyn Notifier>, loading: LoadingSignal) -> Self {
        Self {
            api,
            notifier,
            loading,
        }
    }

    pub fn loading(&self) -> &LoadingSignal {
        &self.loading
    }

    pub async fn search_by_ingredients(
        &self,
        ingredients: &[String],
        filters: &FilterSelection,
    ) -> Result<SearchOutcome, SearchError> {
        let params = match build_search_params(ingredients, filters) {
            Some(params) => params,
            None => {
                self.notifier.notify(NO_INGREDIENTS_MESSAGE);
                return Err(SearchError::NoIngredients);
            }
        };

        let guard = self.loading.begin();
        self.notifier.announce("Searching for recipes...");
        info!(ingredients = %params.include_ingredients, cuisine = %params.cuisine, diet = %params.diet, intolerances = %params.intolerances, "searching recipes");

        match self.api.complex_search(&params).await {
            Ok(response) => {
                let mut results = response.results;
                sort_by_health_score(&mut results);
                drop(guard);
                self.notifier
                    .announce(&format!("Found {} recipes", results.len()));
                Ok(SearchOutcome {
                    results,
                    total_results: response.total_results,
                    search_triggered: true,
                })
            }
            Err(err) => {
                drop(guard);
                error!(%err, "recipe search failed");
                self.notifier.notify(SEARCH_FAILED_MESSAGE);
                Err(err.into())
            }
        }
    }

    pub async fn random_recipe(&self) -> Result<SearchOutcome, SearchError> {
        let guard = self.loading.begin();
        self.notifier.announce("Finding a random recipe...");

        let result = self.api.random_recipes(1).await.and_then(|recipes| {
            recipes
                .into_iter()
                .next()
                .ok_or_else(|| ApiConnectionError::EmptyResponse("random recipe".to_string()))
        });
        drop(guard);

        match result {
            Ok(recipe) => {
                info!(id = recipe.id, title = %recipe.title, "random recipe found");
                self.notifier.announce("Random recipe found");
                Ok(SearchOutcome {
                    results: vec![recipe],
                    total_results: 1,
                    search_triggered: true,
                })
            }
            Err(err) => {
                error!(%err, "random recipe failed");
                self.notifier.notify(RANDOM_FAILED_MESSAGE);
                Err(err.into())
            }
        }
    }
}
