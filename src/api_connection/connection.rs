use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;
use tracing::debug;

use super::endpoints::{
    recipe_information_path, ComplexSearchResponse, NutritionDetailsRequest,
    RandomRecipesResponse, SearchParams, TriviaResponse, COMPLEX_SEARCH_PATH,
    NUTRITION_DETAILS_PATH, RANDOM_RECIPES_PATH, RANDOM_TRIVIA_PATH,
};
use crate::config::{AppConfig, EDAMAM_APP_ID_VAR, EDAMAM_APP_KEY_VAR, SPOONACULAR_API_KEY_VAR};
use crate::detail::nutrition::NutritionAnalysis;
use crate::recipe::Recipe;

#[derive(Debug)]
pub enum ApiConnectionError {
    MissingApiKey(String),
    NetworkError(reqwest::Error),
    SerializationError(serde_json::Error),
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    EmptyResponse(String),
}

impl fmt::Display for ApiConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiConnectionError::MissingApiKey(key_name) => {
                write!(f, "API key not found in environment: {}", key_name)
            }
            ApiConnectionError::NetworkError(err) => write!(f, "Network error: {}", err),
            ApiConnectionError::SerializationError(err) => {
                write!(f, "Serialization error: {}", err)
            }
            ApiConnectionError::ApiError { status, error_body } => {
                write!(f, "API error {}: {}", status, error_body)
            }
            ApiConnectionError::EmptyResponse(what) => {
                write!(f, "API returned no {}", what)
            }
        }
    }
}

impl Error for ApiConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiConnectionError::NetworkError(err) => Some(err),
            ApiConnectionError::SerializationError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiConnectionError {
    fn from(err: reqwest::Error) -> Self {
        ApiConnectionError::NetworkError(err)
    }
}

impl From<serde_json::Error> for ApiConnectionError {
    fn from(err: serde_json::Error) -> Self {
        ApiConnectionError::SerializationError(err)
    }
}

/// The recipe side of the app: search, random picks, detail lookups and trivia.
#[async_trait]
pub trait RecipeApi: Send + Sync {
    async fn complex_search(
        &self,
        params: &SearchParams,
    ) -> Result<ComplexSearchResponse, ApiConnectionError>;

    async fn random_recipes(&self, number: u32) -> Result<Vec<Recipe>, ApiConnectionError>;

    async fn recipe_information(&self, id: u64) -> Result<Recipe, ApiConnectionError>;

    async fn random_trivia(&self) -> Result<String, ApiConnectionError>;
}

/// Nutrition analysis of a free-text ingredient list.
#[async_trait]
pub trait NutritionApi: Send + Sync {
    async fn nutrition_details(
        &self,
        request: &NutritionDetailsRequest,
    ) -> Result<NutritionAnalysis, ApiConnectionError>;
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiConnectionError> {
    let status = response.status();
    if status.is_success() {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    } else {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        Err(ApiConnectionError::ApiError { status, error_body })
    }
}

#[derive(Clone, Debug)]
pub struct SpoonacularClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl SpoonacularClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.spoonacular_base_url.clone(),
            config.spoonacular_api_key.clone(),
        )
    }

    fn api_key(&self) -> Result<&str, ApiConnectionError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ApiConnectionError::MissingApiKey(SPOONACULAR_API_KEY_VAR.to_string()))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiConnectionError> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", api_key)])
            .query(query)
            .send()
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl RecipeApi for SpoonacularClient {
    async fn complex_search(
        &self,
        params: &SearchParams,
    ) -> Result<ComplexSearchResponse, ApiConnectionError> {
        self.get(COMPLEX_SEARCH_PATH, &params.to_query()).await
    }

    async fn random_recipes(&self, number: u32) -> Result<Vec<Recipe>, ApiConnectionError> {
        let response: RandomRecipesResponse = self
            .get(RANDOM_RECIPES_PATH, &[("number", number.to_string())])
            .await?;
        Ok(response.recipes)
    }

    async fn recipe_information(&self, id: u64) -> Result<Recipe, ApiConnectionError> {
        self.get(&recipe_information_path(id), &[]).await
    }

    async fn random_trivia(&self) -> Result<String, ApiConnectionError> {
        let response: TriviaResponse = self.get(RANDOM_TRIVIA_PATH, &[]).await?;
        Ok(response.text)
    }
}

#[derive(Clone, Debug)]
pub struct EdamamClient {
    client: Client,
    base_url: String,
    app_id: Option<String>,
    app_key: Option<String>,
}

impl EdamamClient {
    pub fn new(
        base_url: impl Into<String>,
        app_id: Option<String>,
        app_key: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            app_id,
            app_key,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.edamam_base_url.clone(),
            config.edamam_app_id.clone(),
            config.edamam_app_key.clone(),
        )
    }
}

#[async_trait]
impl NutritionApi for EdamamClient {
    async fn nutrition_details(
        &self,
        request: &NutritionDetailsRequest,
    ) -> Result<NutritionAnalysis, ApiConnectionError> {
        let app_id = self
            .app_id
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiConnectionError::MissingApiKey(EDAMAM_APP_ID_VAR.to_string()))?;
        let app_key = self
            .app_key
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiConnectionError::MissingApiKey(EDAMAM_APP_KEY_VAR.to_string()))?;

        let url = format!("{}{}", self.base_url, NUTRITION_DETAILS_PATH);
        debug!(%url, title = %request.title, lines = request.ingr.len(), "POST");
        let response = self
            .client
            .post(&url)
            .query(&[("app_id", app_id), ("app_key", app_key)])
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }
}
