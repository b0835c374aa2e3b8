use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api_connection::connection::{NutritionApi, RecipeApi};
use crate::detail::loader::{DetailState, NutritionState, RecipeDetailLoader, RecipeSource, MIN_LOADING};
use crate::notify::{MemoryNotifier, MessageKind};
use crate::render::{render_detail, render_filters, render_results};
use crate::results::ResultsPresenter;
use crate::search::{
    Cuisine, Diet, FilterPanel, IngredientTagEditor, Intolerance, LoadingSignal,
    SearchRequestBuilder,
};
use crate::session_store::SessionStore;

/// How long the detail page waits on a slow nutrition analysis before
/// showing the label as pending.
pub const NUTRITION_WAIT: Duration = Duration::from_secs(15);

const POLL: Duration = Duration::from_millis(50);

const HELP: &str = "\
Commands:
  add <a, b, ...>        add ingredients (comma separated)
  type <text>            type into the ingredient box; a comma commits it
  enter                  commit what was typed
  remove <n>             remove the n-th ingredient
  list                   show ingredients and filters
  filter open            start editing filters
  filter cuisine <name>  set cuisine (or 'none')
  filter diet <name>     set diet (or 'none')
  filter intolerance <name>  toggle an intolerance
  filter apply | cancel  keep or discard the edits
  search                 search with the current ingredients and filters
  lucky                  pick a random recipe
  results                show the current results
  open <id>              show a recipe's detail page
  help                   show this text
  quit                   leave (clears the session)
";

/// Where a resolved recipe id comes from when opening a detail page: the
/// card payload if the recipe is in `results`, otherwise the API.
pub fn source_for(results: &ResultsPresenter, id: u64, force_fetch: bool) -> RecipeSource {
    if !force_fetch {
        if let Some(recipe) = results.find(id) {
            match serde_json::to_string(recipe) {
                Ok(payload) => return RecipeSource::Inline(payload),
                Err(err) => debug!(%err, id, "falling back to fetching recipe"),
            }
        }
    }
    RecipeSource::Id(id)
}

/// Shows the loading screen (with trivia once it arrives), then the detail page.
pub async fn show_detail<W: AsyncWrite + Unpin>(
    loader: &mut RecipeDetailLoader,
    source: RecipeSource,
    out: &mut W,
) -> Result<DetailState> {
    loader.load(source);

    let deadline = Instant::now() + MIN_LOADING;
    loop {
        let state = loader.state();
        let waiting_for_trivia = matches!(state, DetailState::Loading { trivia: None });
        if !waiting_for_trivia || Instant::now() >= deadline {
            if state.is_loading() {
                out.write_all(render_detail(&state).as_bytes()).await?;
                out.flush().await?;
            }
            break;
        }
        tokio::time::sleep(POLL).await;
    }

    let mut state = loader.wait_loaded().await;
    if let DetailState::Loaded { nutrition, .. } = &mut state {
        if *nutrition == NutritionState::Pending {
            *nutrition = loader.wait_nutrition(NUTRITION_WAIT).await;
        }
    }
    out.write_all(render_detail(&state).as_bytes()).await?;
    out.flush().await?;
    Ok(state)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive front end for the search page: one line in, one screen out.
pub struct Shell {
    notifier: Arc<MemoryNotifier>,
    tags: IngredientTagEditor,
    filters: FilterPanel,
    builder: SearchRequestBuilder,
    results: ResultsPresenter,
    loader: RecipeDetailLoader,
}

impl Shell {
    pub fn new(
        recipes: Arc<dyn RecipeApi>,
        nutrition: Arc<dyn NutritionApi>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let notifier = Arc::new(MemoryNotifier::new());
        let loading = LoadingSignal::new();
        let mut results = ResultsPresenter::new(store, loading.clone());
        results.restore();
        Self {
            tags: IngredientTagEditor::new(notifier.clone()),
            filters: FilterPanel::new(notifier.clone()),
            builder: SearchRequestBuilder::new(recipes.clone(), notifier.clone(), loading),
            results,
            loader: RecipeDetailLoader::new(recipes, nutrition),
            notifier,
        }
    }

    pub fn with_min_loading(mut self, min_loading: Duration) -> Self {
        self.loader = self.loader.with_min_loading(min_loading);
        self
    }

    pub fn ingredients(&self) -> &[String] {
        self.tags.ingredients()
    }

    pub fn results(&self) -> &ResultsPresenter {
        &self.results
    }

    /// Runs the command loop. The session is cleared on every exit, including
    /// read and write failures.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("starting interactive shell");
        let result = self.command_loop(input, out).await;
        self.results.on_unload();
        match &result {
            Ok(()) => info!("shell closed, session cleared"),
            Err(err) => warn!(error = %err, "shell aborted, session cleared"),
        }
        result
    }

    async fn command_loop<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        out.write_all(b"Type 'help' for commands.\n").await?;
        if !self.results.recipes().is_empty() {
            out.write_all(render_results(&self.results.view()).as_bytes())
                .await?;
        }
        out.flush().await?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await.context("Failed to read command")? {
            let flow = self.handle_line(&line, out).await?;
            self.flush_messages(out).await?;
            if flow == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    async fn flush_messages<W: AsyncWrite + Unpin>(&self, out: &mut W) -> Result<()> {
        for message in self.notifier.drain() {
            let line = match message.kind {
                MessageKind::Announcement => format!("> {}\n", message.text),
                MessageKind::Notification => format!("! {}\n", message.text),
            };
            out.write_all(line.as_bytes()).await?;
        }
        out.flush().await?;
        Ok(())
    }

    pub async fn handle_line<W: AsyncWrite + Unpin>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let text = match command {
            "" => return Ok(Flow::Continue),
            "quit" | "exit" => return Ok(Flow::Quit),
            "help" => HELP.to_string(),
            "add" => {
                self.tags.add_from_delimited_text(rest);
                self.ingredient_line()
            }
            "type" => {
                self.tags.set_pending_input(rest);
                format!("{}Typing: {}\n", self.ingredient_line(), self.tags.pending_input())
            }
            "enter" => {
                self.tags.submit();
                self.ingredient_line()
            }
            "remove" => {
                let removed = rest
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|index| self.tags.remove(index));
                match removed {
                    Some(_) => self.ingredient_line(),
                    None => format!("No ingredient number '{}'.\n", rest),
                }
            }
            "list" => format!(
                "{}{}",
                self.ingredient_line(),
                render_filters(self.filters.active())
            ),
            "filter" => self.handle_filter(rest),
            "search" => {
                let ingredients = self.tags.ingredients().to_vec();
                let filters = self.filters.active().clone();
                match self.builder.search_by_ingredients(&ingredients, &filters).await {
                    Ok(outcome) => {
                        self.results.handle_outcome(outcome);
                        render_results(&self.results.view())
                    }
                    Err(_) => String::new(),
                }
            }
            "lucky" => match self.builder.random_recipe().await {
                Ok(outcome) => {
                    self.results.handle_outcome(outcome);
                    render_results(&self.results.view())
                }
                Err(_) => String::new(),
            },
            "results" => render_results(&self.results.view()),
            "open" => match rest.parse::<u64>() {
                Ok(id) => {
                    let source = source_for(&self.results, id, false);
                    show_detail(&mut self.loader, source, out).await?;
                    String::new()
                }
                Err(_) => format!("Not a recipe id: '{}'.\n", rest),
            },
            other => format!("Unknown command '{}'. Type 'help'.\n", other),
        };
        out.write_all(text.as_bytes()).await?;
        Ok(Flow::Continue)
    }

    fn ingredient_line(&self) -> String {
        if self.tags.is_empty() {
            "Ingredients: (none)\n".to_string()
        } else {
            let numbered: Vec<String> = self
                .tags
                .ingredients()
                .iter()
                .enumerate()
                .map(|(i, name)| format!("{}. {}", i + 1, name))
                .collect();
            format!("Ingredients: {}\n", numbered.join("  "))
        }
    }

    fn handle_filter(&mut self, args: &str) -> String {
        let (action, value) = match args.split_once(char::is_whitespace) {
            Some((action, value)) => (action, value.trim()),
            None => (args, ""),
        };
        let clear = value.eq_ignore_ascii_case("none") || value.is_empty();
        let outcome: Result<(), String> = match action {
            "open" => {
                self.filters.open();
                Ok(())
            }
            "cuisine" if clear => {
                self.filters.set_cuisine(None);
                Ok(())
            }
            "cuisine" => value
                .parse::<Cuisine>()
                .map(|c| self.filters.set_cuisine(Some(c)))
                .map_err(|e| e.to_string()),
            "diet" if clear => {
                self.filters.set_diet(None);
                Ok(())
            }
            "diet" => value
                .parse::<Diet>()
                .map(|d| self.filters.set_diet(Some(d)))
                .map_err(|e| e.to_string()),
            "intolerance" => value
                .parse::<Intolerance>()
                .map(|i| self.filters.toggle_intolerance(i))
                .map_err(|e| e.to_string()),
            "apply" => {
                self.filters.apply();
                return render_filters(self.filters.active());
            }
            "cancel" => {
                self.filters.cancel();
                return render_filters(self.filters.active());
            }
            "" | "show" => return render_filters(self.filters.active()),
            other => Err(format!("unknown filter action '{}'", other)),
        };
        match outcome {
            Ok(()) => format!("Editing {}", render_filters(self.filters.pending())),
            Err(message) => format!("{}\n", message),
        }
    }
}
