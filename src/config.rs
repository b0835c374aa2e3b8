use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

use crate::api_connection::endpoints::{EDAMAM_DEFAULT_BASE_URL, SPOONACULAR_DEFAULT_BASE_URL};

pub const SPOONACULAR_API_KEY_VAR: &str = "SPOONACULAR_API_KEY";
pub const EDAMAM_APP_ID_VAR: &str = "EDAMAM_APP_ID";
pub const EDAMAM_APP_KEY_VAR: &str = "EDAMAM_APP_KEY";
pub const SPOONACULAR_BASE_URL_VAR: &str = "SPOONACULAR_BASE_URL";
pub const EDAMAM_BASE_URL_VAR: &str = "EDAMAM_BASE_URL";
pub const SESSION_DIR_VAR: &str = "RECIPE_FINDER_SESSION_DIR";

const DEFAULT_SESSION_DIR_NAME: &str = "recipe_finder_session";

/// Runtime configuration, read from the environment (and `.env` if present).
///
/// Credentials are optional here. A missing key only surfaces as
/// `ApiConnectionError::MissingApiKey` when the matching API is actually called,
/// so a missing nutrition key degrades the detail page instead of blocking startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub spoonacular_api_key: Option<String>,
    pub edamam_app_id: Option<String>,
    pub edamam_app_key: Option<String>,
    pub spoonacular_base_url: String,
    pub edamam_base_url: String,
    pub session_dir: PathBuf,
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenv().ok();
        Self {
            spoonacular_api_key: non_empty_var(SPOONACULAR_API_KEY_VAR),
            edamam_app_id: non_empty_var(EDAMAM_APP_ID_VAR),
            edamam_app_key: non_empty_var(EDAMAM_APP_KEY_VAR),
            spoonacular_base_url: non_empty_var(SPOONACULAR_BASE_URL_VAR)
                .unwrap_or_else(|| SPOONACULAR_DEFAULT_BASE_URL.to_string()),
            edamam_base_url: non_empty_var(EDAMAM_BASE_URL_VAR)
                .unwrap_or_else(|| EDAMAM_DEFAULT_BASE_URL.to_string()),
            session_dir: non_empty_var(SESSION_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| env::temp_dir().join(DEFAULT_SESSION_DIR_NAME)),
        }
    }

    pub fn with_session_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.session_dir = dir;
        }
        self
    }

    pub fn nutrition_enabled(&self) -> bool {
        self.edamam_app_id.is_some() && self.edamam_app_key.is_some()
    }
}
