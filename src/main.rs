use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{self, AsyncWriteExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use recipe_finder::api_connection::{EdamamClient, NutritionApi, RecipeApi, SpoonacularClient};
use recipe_finder::carousel::Carousel;
use recipe_finder::cli::{parse_args, Command};
use recipe_finder::config::AppConfig;
use recipe_finder::detail::RecipeDetailLoader;
use recipe_finder::notify::ConsoleNotifier;
use recipe_finder::render::{render_carousel_frame, render_results};
use recipe_finder::results::ResultsPresenter;
use recipe_finder::search::{FilterSelection, IngredientTagEditor, LoadingSignal, SearchRequestBuilder};
use recipe_finder::session_store::{FileSessionStore, SessionStore};
use recipe_finder::shell::{show_detail, source_for, Shell};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "recipe_finder=debug" } else { "recipe_finder=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn play_featured(frames: u32, speed: f64, viewport: f64, interval_ms: u64) -> Result<()> {
    let mut carousel = Carousel::new(speed);
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    let mut stdout = io::stdout();
    let frame_ticks = (interval_ms / 16).max(1);
    for frame in 0..u64::from(frames) {
        ticker.tick().await;
        let tick = frame * frame_ticks;
        // Hover over the middle third, like a pointer resting on the strip.
        let hovering = frame >= u64::from(frames) / 3 && frame < 2 * u64::from(frames) / 3;
        carousel.set_hovering(hovering, tick);
        let line = render_carousel_frame(carousel.position(tick), viewport);
        stdout.write_all(format!("{}\n", line).as_bytes()).await?;
        stdout.flush().await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = parse_args();
    init_tracing(cli_args.verbose);

    let config = AppConfig::from_env().with_session_dir(cli_args.session_dir.clone());
    debug!(session_dir = %config.session_dir.display(), "configuration loaded");
    if !config.nutrition_enabled() {
        info!("Edamam credentials not set; nutrition labels will be unavailable");
    }

    let recipes: Arc<dyn RecipeApi> = Arc::new(SpoonacularClient::from_config(&config));
    let nutrition: Arc<dyn NutritionApi> = Arc::new(EdamamClient::from_config(&config));
    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(config.session_dir.clone()));
    let mut stdout = io::stdout();

    match cli_args.command {
        Command::Search {
            ingredients,
            cuisine,
            diet,
            intolerances,
        } => {
            let filters = FilterSelection {
                cuisine,
                diet,
                intolerances,
            };
            let notifier = Arc::new(ConsoleNotifier);
            let mut tags = IngredientTagEditor::new(notifier.clone());
            tags.add_from_delimited_text(&ingredients.join(","));
            let loading = LoadingSignal::new();
            let builder = SearchRequestBuilder::new(recipes, notifier, loading.clone());
            let mut results = ResultsPresenter::new(store, loading);
            let outcome = builder
                .search_by_ingredients(tags.ingredients(), &filters)
                .await
                .context("Recipe search failed")?;
            results.handle_outcome(outcome);
            stdout.write_all(render_results(&results.view()).as_bytes()).await?;
        }
        Command::Lucky => {
            let loading = LoadingSignal::new();
            let builder = SearchRequestBuilder::new(recipes, Arc::new(ConsoleNotifier), loading.clone());
            let mut results = ResultsPresenter::new(store, loading);
            let outcome = builder
                .random_recipe()
                .await
                .context("Random recipe lookup failed")?;
            results.handle_outcome(outcome);
            stdout.write_all(render_results(&results.view()).as_bytes()).await?;
        }
        Command::Recipe { id, fetch } => {
            let mut results = ResultsPresenter::new(store, LoadingSignal::new());
            results.restore();
            let source = source_for(&results, id, fetch);
            let mut loader = RecipeDetailLoader::new(recipes, nutrition);
            show_detail(&mut loader, source, &mut stdout)
                .await
                .with_context(|| format!("Failed to show recipe {}", id))?;
        }
        Command::Results => {
            let mut results = ResultsPresenter::new(store, LoadingSignal::new());
            results.restore();
            stdout.write_all(render_results(&results.view()).as_bytes()).await?;
        }
        Command::Featured {
            frames,
            speed,
            viewport,
            interval_ms,
        } => {
            play_featured(frames, speed, viewport, interval_ms).await?;
        }
        Command::Shell => {
            let mut shell = Shell::new(recipes, nutrition, store);
            let input = BufReader::new(io::stdin());
            shell.run(input, &mut stdout).await.context("Shell exited with an error")?;
        }
    }

    stdout.flush().await?;
    Ok(())
}
