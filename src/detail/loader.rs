use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::nutrition::{nutrition_request_for, NutritionAnalysis};
use crate::api_connection::connection::{ApiConnectionError, NutritionApi, RecipeApi};
use crate::recipe::Recipe;

/// The loading screen stays up at least this long so the trivia can be read.
pub const MIN_LOADING: Duration = Duration::from_secs(4);

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load recipe details. Please try again later.";
pub const TRIVIA_FAILED_MESSAGE: &str = "Oops! Something went wrong fetching the trivia.";

#[derive(Debug)]
pub enum DetailError {
    Parse(serde_json::Error),
    Api(ApiConnectionError),
}

impl fmt::Display for DetailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailError::Parse(err) => write!(f, "malformed recipe payload: {}", err),
            DetailError::Api(err) => write!(f, "recipe lookup failed: {}", err),
        }
    }
}

impl Error for DetailError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DetailError::Parse(err) => Some(err),
            DetailError::Api(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for DetailError {
    fn from(err: serde_json::Error) -> Self {
        DetailError::Parse(err)
    }
}

impl From<ApiConnectionError> for DetailError {
    fn from(err: ApiConnectionError) -> Self {
        DetailError::Api(err)
    }
}

/// Where the recipe comes from: fetched by id, or handed over as JSON by the
/// page that navigated here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeSource {
    Id(u64),
    Inline(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NutritionState {
    Pending,
    Available(NutritionAnalysis),
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading { trivia: Option<String> },
    Error(String),
    Loaded { recipe: Recipe, nutrition: NutritionState },
}

impl DetailState {
    pub fn is_loading(&self) -> bool {
        matches!(self, DetailState::Loading { .. })
    }
}

/// Identifies one `load` call. Results carrying a stale token are dropped.
#[derive(Debug, Clone)]
pub struct LoadToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl LoadToken {
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

#[derive(Debug)]
struct Slots {
    recipe: Option<Recipe>,
    error: Option<String>,
    trivia: Option<String>,
    nutrition: NutritionState,
    loading: bool,
}

impl Default for Slots {
    fn default() -> Self {
        Self {
            recipe: None,
            error: None,
            trivia: None,
            nutrition: NutritionState::Pending,
            loading: true,
        }
    }
}

/// Drives the recipe detail screen.
///
/// Trivia, the recipe itself and (once the recipe is known) its nutrition are
/// fetched as independent tasks, each writing its own slot. Starting a new
/// load, calling `cancel`, or dropping the loader invalidates everything still
/// in flight from the previous load.
pub struct RecipeDetailLoader {
    recipes: Arc<dyn RecipeApi>,
    nutrition: Arc<dyn NutritionApi>,
    slots: Arc<Mutex<Slots>>,
    generation: Arc<AtomicU64>,
    min_loading: Duration,
    task: Option<JoinHandle<()>>,
}

impl RecipeDetailLoader {
    pub fn new(recipes: Arc<dyn RecipeApi>, nutrition: Arc<dyn NutritionApi>) -> Self {
        Self {
            recipes,
            nutrition,
            slots: Arc::new(Mutex::new(Slots::default())),
            generation: Arc::new(AtomicU64::new(0)),
            min_loading: MIN_LOADING,
            task: None,
        }
    }

    pub fn with_min_loading(mut self, min_loading: Duration) -> Self {
        self.min_loading = min_loading;
        self
    }

    /// Bumps the generation and resets the slots under the slots lock, so no
    /// writer holding the previous token can land after the reset.
    fn next_token(&self) -> LoadToken {
        let mut slots = lock_slots(&self.slots);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *slots = Slots::default();
        LoadToken {
            generation,
            current: self.generation.clone(),
        }
    }

    /// Starts (or restarts) the state machine from Loading.
    pub fn load(&mut self, source: RecipeSource) -> LoadToken {
        let token = self.next_token();
        info!(?source, generation = token.generation, "loading recipe detail");

        // Trivia runs detached; a stale token keeps it from writing.
        tokio::spawn(fetch_trivia(
            self.recipes.clone(),
            self.slots.clone(),
            token.clone(),
        ));
        let main_task = tokio::spawn(resolve_recipe(
            self.recipes.clone(),
            self.nutrition.clone(),
            self.slots.clone(),
            token.clone(),
            source,
            self.min_loading,
        ));

        if let Some(previous) = self.task.replace(main_task) {
            previous.abort();
        }
        token
    }

    pub fn cancel(&mut self) {
        {
            let _slots = lock_slots(&self.slots);
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn state(&self) -> DetailState {
        let slots = lock_slots(&self.slots);
        if slots.loading {
            return DetailState::Loading {
                trivia: slots.trivia.clone(),
            };
        }
        match (&slots.recipe, &slots.error) {
            (Some(recipe), _) => DetailState::Loaded {
                recipe: recipe.clone(),
                nutrition: slots.nutrition.clone(),
            },
            (None, Some(message)) => DetailState::Error(message.clone()),
            (None, None) => DetailState::Error(LOAD_FAILED_MESSAGE.to_string()),
        }
    }

    /// Waits until the primary load (recipe plus minimum display time) is over.
    pub async fn wait_loaded(&mut self) -> DetailState {
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                if !err.is_cancelled() {
                    error!(%err, "detail load task failed");
                }
            }
        }
        self.state()
    }

    /// Waits for nutrition to leave `Pending`, up to `timeout`.
    pub async fn wait_nutrition(&self, timeout: Duration) -> NutritionState {
        let deadline = Instant::now() + timeout;
        loop {
            let state = self.nutrition_state();
            if state != NutritionState::Pending || Instant::now() >= deadline {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    }

    pub fn nutrition_state(&self) -> NutritionState {
        lock_slots(&self.slots).nutrition.clone()
    }
}

impl Drop for RecipeDetailLoader {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn lock_slots(slots: &Mutex<Slots>) -> MutexGuard<'_, Slots> {
    slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The generation only moves while the slots lock is held, so checking the
/// token after locking rules out a stale write landing on a newer load.
fn write_slots(slots: &Mutex<Slots>, token: &LoadToken, f: impl FnOnce(&mut Slots)) {
    let mut guard = lock_slots(slots);
    if !token.is_current() {
        debug!(generation = token.generation, "dropping result from superseded load");
        return;
    }
    f(&mut guard);
}

async fn fetch_trivia(api: Arc<dyn RecipeApi>, slots: Arc<Mutex<Slots>>, token: LoadToken) {
    let trivia = match api.random_trivia().await {
        Ok(text) => text,
        Err(err) => {
            warn!(%err, "error fetching trivia");
            TRIVIA_FAILED_MESSAGE.to_string()
        }
    };
    write_slots(&slots, &token, |s| s.trivia = Some(trivia));
}

async fn fetch_recipe(api: &dyn RecipeApi, source: RecipeSource) -> Result<Recipe, DetailError> {
    match source {
        RecipeSource::Inline(payload) => Ok(serde_json::from_str(&payload)?),
        RecipeSource::Id(id) => Ok(api.recipe_information(id).await?),
    }
}

async fn fetch_nutrition(
    api: Arc<dyn NutritionApi>,
    slots: Arc<Mutex<Slots>>,
    token: LoadToken,
    recipe: Recipe,
) {
    let state = match nutrition_request_for(&recipe) {
        None => {
            debug!(id = recipe.id, "no ingredients, skipping nutrition");
            NutritionState::Unavailable
        }
        Some(request) => match api.nutrition_details(&request).await {
            Ok(analysis) => NutritionState::Available(analysis),
            Err(err) => {
                warn!(%err, id = recipe.id, "error fetching nutrition");
                NutritionState::Unavailable
            }
        },
    };
    write_slots(&slots, &token, |s| s.nutrition = state);
}

async fn resolve_recipe(
    recipes: Arc<dyn RecipeApi>,
    nutrition: Arc<dyn NutritionApi>,
    slots: Arc<Mutex<Slots>>,
    token: LoadToken,
    source: RecipeSource,
    min_loading: Duration,
) {
    let started = Instant::now();
    let result = fetch_recipe(recipes.as_ref(), source).await;

    match result {
        Ok(recipe) => {
            if token.is_current() {
                tokio::spawn(fetch_nutrition(
                    nutrition,
                    slots.clone(),
                    token.clone(),
                    recipe.clone(),
                ));
            }
            write_slots(&slots, &token, |s| s.recipe = Some(recipe));
        }
        Err(err) => {
            // Failures skip the minimum display time.
            error!(%err, "error loading recipe");
            write_slots(&slots, &token, |s| {
                s.error = Some(LOAD_FAILED_MESSAGE.to_string());
                s.loading = false;
            });
            return;
        }
    }

    tokio::time::sleep_until(started + min_loading).await;
    write_slots(&slots, &token, |s| s.loading = false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    fn token_for(generation: &Arc<AtomicU64>) -> LoadToken {
        LoadToken {
            generation: generation.load(Ordering::SeqCst),
            current: generation.clone(),
        }
    }

    #[test]
    fn test_write_waiting_on_lock_is_dropped_after_supersede() {
        let slots = Arc::new(Mutex::new(Slots::default()));
        let generation = Arc::new(AtomicU64::new(1));
        let old = token_for(&generation);

        let mut held = lock_slots(&slots);
        let (started_tx, started_rx) = mpsc::channel();
        let writer = {
            let slots = slots.clone();
            thread::spawn(move || {
                assert!(old.is_current());
                started_tx.send(()).unwrap();
                write_slots(&slots, &old, |s| {
                    s.recipe = Some(Recipe {
                        title: "STALE".to_string(),
                        ..Default::default()
                    })
                });
            })
        };
        started_rx.recv().unwrap();
        // Supersede while the old writer is blocked on the lock.
        generation.fetch_add(1, Ordering::SeqCst);
        *held = Slots::default();
        drop(held);
        writer.join().unwrap();

        assert!(lock_slots(&slots).recipe.is_none());
    }

    #[test]
    fn test_current_token_writes() {
        let slots = Mutex::new(Slots::default());
        let generation = Arc::new(AtomicU64::new(3));
        write_slots(&slots, &token_for(&generation), |s| {
            s.trivia = Some("fresh".to_string())
        });
        assert_eq!(lock_slots(&slots).trivia.as_deref(), Some("fresh"));
    }

    #[test]
    fn test_poisoned_slots_still_reset() {
        let slots = Arc::new(Mutex::new(Slots::default()));
        let poisoner = slots.clone();
        let _ = thread::spawn(move || {
            let mut guard = poisoner.lock().unwrap();
            guard.loading = false;
            panic!("poison the slots");
        })
        .join();
        assert!(slots.is_poisoned());

        let generation = Arc::new(AtomicU64::new(0));
        write_slots(&slots, &token_for(&generation), |s| *s = Slots::default());
        assert!(lock_slots(&slots).loading);
    }
}
