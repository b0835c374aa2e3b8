use std::sync::Arc;
use tracing::{debug, warn};

use crate::api_connection::endpoints::SearchOutcome;
use crate::badges::{badges_for, diet_labels_for, Badge};
use crate::recipe::{Ingredient, Recipe};
use crate::search::request_builder::LoadingSignal;
use crate::session_store::{
    SessionStore, SessionStoreError, LAST_SEARCH_RESULTS_KEY, SEARCH_TRIGGERED_KEY,
};

/// Result sets at or above this size are not written to session storage.
pub const PERSIST_THRESHOLD: u64 = 2000;

const USED_INGREDIENTS_SHOWN: usize = 3;
const MISSED_INGREDIENTS_SHOWN: usize = 2;

/// A list cut down for a card, with how many were left off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncatedList {
    pub shown: Vec<String>,
    pub hidden: usize,
}

impl TruncatedList {
    fn from_ingredients(ingredients: &[Ingredient], limit: usize) -> Self {
        Self {
            shown: ingredients
                .iter()
                .take(limit)
                .map(|i| i.name.clone())
                .collect(),
            hidden: ingredients.len().saturating_sub(limit),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }

    /// `+N more`, only when something was cut.
    pub fn more_suffix(&self) -> Option<String> {
        (self.hidden > 0).then(|| format!("+{} more", self.hidden))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeCard {
    pub id: u64,
    pub title: String,
    pub image: Option<String>,
    pub ready_in_minutes: u32,
    pub servings: u32,
    pub used_ingredients: TruncatedList,
    pub missed_ingredients: TruncatedList,
    pub badges: Vec<Badge>,
    pub diet_labels: Vec<String>,
    pub link: String,
}

impl From<&Recipe> for RecipeCard {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            image: recipe.image().map(str::to_string),
            ready_in_minutes: recipe.ready_in_minutes,
            servings: recipe.servings,
            used_ingredients: TruncatedList::from_ingredients(
                &recipe.used_ingredients,
                USED_INGREDIENTS_SHOWN,
            ),
            missed_ingredients: TruncatedList::from_ingredients(
                &recipe.missed_ingredients,
                MISSED_INGREDIENTS_SHOWN,
            ),
            badges: badges_for(recipe),
            diet_labels: diet_labels_for(recipe),
            link: recipe.detail_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    Loading,
    NoRecipesFound,
    Cards(Vec<RecipeCard>),
    /// Nothing searched yet.
    Idle,
}

/// The results half of the search page: what was found, and whether the
/// user has searched at all in this session.
pub struct ResultsPresenter {
    store: Arc<dyn SessionStore>,
    loading: LoadingSignal,
    recipes: Vec<Recipe>,
    total_results: u64,
    search_triggered: bool,
}

impl ResultsPresenter {
    pub fn new(store: Arc<dyn SessionStore>, loading: LoadingSignal) -> Self {
        Self {
            store,
            loading,
            recipes: Vec::new(),
            total_results: 0,
            search_triggered: false,
        }
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn total_results(&self) -> u64 {
        self.total_results
    }

    pub fn search_triggered(&self) -> bool {
        self.search_triggered
    }

    pub fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
    }

    /// Picks up whatever the last search in this session left behind.
    /// Entries that fail to parse are skipped.
    pub fn restore(&mut self) {
        match self.store.get(LAST_SEARCH_RESULTS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Recipe>>(&raw) {
                Ok(recipes) => {
                    debug!(count = recipes.len(), "restored last search results");
                    self.recipes = recipes;
                }
                Err(err) => warn!(%err, "ignoring malformed {}", LAST_SEARCH_RESULTS_KEY),
            },
            Ok(None) => {}
            Err(err) => warn!(%err, "could not read {}", LAST_SEARCH_RESULTS_KEY),
        }
        match self.store.get(SEARCH_TRIGGERED_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<bool>(&raw) {
                Ok(triggered) => self.search_triggered = triggered,
                Err(err) => warn!(%err, "ignoring malformed {}", SEARCH_TRIGGERED_KEY),
            },
            Ok(None) => {}
            Err(err) => warn!(%err, "could not read {}", SEARCH_TRIGGERED_KEY),
        }
    }

    pub fn handle_search_results(
        &mut self,
        results: Vec<Recipe>,
        total_results: u64,
        search_triggered: bool,
    ) {
        self.recipes = results;
        self.total_results = total_results;
        self.search_triggered = search_triggered;

        if total_results < PERSIST_THRESHOLD {
            if let Err(err) = self.persist() {
                warn!(%err, "could not persist search results");
            }
        }
    }

    pub fn handle_outcome(&mut self, outcome: SearchOutcome) {
        self.handle_search_results(
            outcome.results,
            outcome.total_results,
            outcome.search_triggered,
        );
    }

    fn persist(&self) -> Result<(), SessionStoreError> {
        let recipes = serde_json::to_string(&self.recipes)?;
        let triggered = serde_json::to_string(&self.search_triggered)?;
        self.store.set(LAST_SEARCH_RESULTS_KEY, &recipes)?;
        self.store.set(SEARCH_TRIGGERED_KEY, &triggered)?;
        Ok(())
    }

    /// Page is going away: drop the persisted snapshot.
    pub fn on_unload(&self) {
        for key in [LAST_SEARCH_RESULTS_KEY, SEARCH_TRIGGERED_KEY] {
            if let Err(err) = self.store.remove(key) {
                warn!(%err, key, "could not clear session entry");
            }
        }
    }

    pub fn find(&self, id: u64) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn view(&self) -> ResultsView {
        if self.loading.is_loading() {
            ResultsView::Loading
        } else if !self.recipes.is_empty() {
            ResultsView::Cards(self.recipes.iter().map(RecipeCard::from).collect())
        } else if self.search_triggered {
            ResultsView::NoRecipesFound
        } else {
            ResultsView::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_store::MemorySessionStore;

    fn ingredient(name: &str) -> Ingredient {
        Ingredient {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn recipe(id: u64) -> Recipe {
        Recipe {
            id,
            title: format!("Recipe {}", id),
            servings: 2,
            ready_in_minutes: 30,
            ..Default::default()
        }
    }

    fn presenter() -> (ResultsPresenter, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        (
            ResultsPresenter::new(store.clone(), LoadingSignal::new()),
            store,
        )
    }

    #[test]
    fn test_idle_before_any_search() {
        let (results, _) = presenter();
        assert_eq!(results.view(), ResultsView::Idle);
    }

    #[test]
    fn test_loading_hides_results() {
        let (mut results, _) = presenter();
        results.handle_search_results(vec![recipe(1)], 1, true);
        results.set_loading(true);
        assert_eq!(results.view(), ResultsView::Loading);
        results.set_loading(false);
        assert!(matches!(results.view(), ResultsView::Cards(ref c) if c.len() == 1));
    }

    #[test]
    fn test_empty_triggered_search_shows_empty_state() {
        let (mut results, _) = presenter();
        results.handle_search_results(Vec::new(), 0, true);
        assert_eq!(results.view(), ResultsView::NoRecipesFound);
    }

    #[test]
    fn test_cards_keep_given_order() {
        let (mut results, _) = presenter();
        results.handle_search_results(vec![recipe(9), recipe(3), recipe(1)], 3, true);
        match results.view() {
            ResultsView::Cards(cards) => {
                let ids: Vec<u64> = cards.iter().map(|c| c.id).collect();
                assert_eq!(ids, vec![9, 3, 1]);
            }
            other => panic!("expected cards, got {:?}", other),
        }
    }

    #[test]
    fn test_card_truncates_ingredient_lists() {
        let mut r = recipe(7);
        r.used_ingredients = ["a", "b", "c", "d", "e"].iter().map(|n| ingredient(n)).collect();
        r.missed_ingredients = ["x", "y"].iter().map(|n| ingredient(n)).collect();
        r.image = Some(String::new());
        let card = RecipeCard::from(&r);
        assert_eq!(card.used_ingredients.shown, vec!["a", "b", "c"]);
        assert_eq!(card.used_ingredients.more_suffix().as_deref(), Some("+2 more"));
        assert_eq!(card.missed_ingredients.shown, vec!["x", "y"]);
        assert_eq!(card.missed_ingredients.more_suffix(), None);
        assert_eq!(card.image, None);
        assert_eq!(card.link, "/recipe/7");
    }

    #[test]
    fn test_results_persist_and_restore() {
        let (mut results, store) = presenter();
        results.handle_search_results(vec![recipe(1), recipe(2)], 2, true);
        assert!(store.get(LAST_SEARCH_RESULTS_KEY).unwrap().is_some());
        assert_eq!(store.get(SEARCH_TRIGGERED_KEY).unwrap().as_deref(), Some("true"));

        let mut revived = ResultsPresenter::new(store.clone(), LoadingSignal::new());
        revived.restore();
        assert_eq!(revived.recipes(), results.recipes());
        assert!(revived.search_triggered());
    }

    #[test]
    fn test_large_result_sets_are_not_persisted() {
        let (mut results, store) = presenter();
        results.handle_search_results(vec![recipe(1)], PERSIST_THRESHOLD, true);
        assert_eq!(store.get(LAST_SEARCH_RESULTS_KEY).unwrap(), None);
        results.handle_search_results(vec![recipe(1)], PERSIST_THRESHOLD - 1, true);
        assert!(store.get(LAST_SEARCH_RESULTS_KEY).unwrap().is_some());
    }

    #[test]
    fn test_unload_clears_snapshot() {
        let (mut results, store) = presenter();
        results.handle_search_results(vec![recipe(1)], 1, true);
        results.on_unload();
        assert_eq!(store.get(LAST_SEARCH_RESULTS_KEY).unwrap(), None);
        assert_eq!(store.get(SEARCH_TRIGGERED_KEY).unwrap(), None);
    }

    #[test]
    fn test_restore_ignores_malformed_entries() {
        let (mut results, store) = presenter();
        store.set(LAST_SEARCH_RESULTS_KEY, "not json").unwrap();
        store.set(SEARCH_TRIGGERED_KEY, "true").unwrap();
        results.restore();
        assert!(results.recipes().is_empty());
        assert!(results.search_triggered());
        assert_eq!(results.view(), ResultsView::NoRecipesFound);
    }
}
