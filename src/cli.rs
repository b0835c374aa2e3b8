use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::carousel::{DEFAULT_SPEED, MAX_VIEWPORT};
use crate::config::SESSION_DIR_VAR;
use crate::search::{Cuisine, Diet, Intolerance};

#[derive(Parser, Debug)]
#[command(author, version, about = "Find recipes from the ingredients you already have", long_about = None)]
pub struct Cli {
    /// Directory holding the session (last search results)
    #[arg(long, global = true, env = SESSION_DIR_VAR)]
    pub session_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Search recipes by ingredients
    Search {
        /// Ingredients, separated by spaces or commas
        #[arg(required = true, value_delimiter = ',')]
        ingredients: Vec<String>,

        #[arg(long)]
        cuisine: Option<Cuisine>,

        #[arg(long)]
        diet: Option<Diet>,

        /// May be repeated or comma separated
        #[arg(long = "intolerance", value_delimiter = ',')]
        intolerances: Vec<Intolerance>,
    },
    /// Pick one random recipe
    Lucky,
    /// Show a recipe's detail page
    Recipe {
        id: u64,

        /// Always fetch from the API, even if the recipe is in the last results
        #[arg(long)]
        fetch: bool,
    },
    /// Show the results of the last search in this session
    Results,
    /// Play the featured dishes showcase
    Featured {
        #[arg(long, default_value_t = 30)]
        frames: u32,

        /// Pixels per tick
        #[arg(long, default_value_t = DEFAULT_SPEED, value_parser = parse_speed)]
        speed: f64,

        /// Viewport width in pixels
        #[arg(long, default_value_t = 660.0, value_parser = parse_viewport)]
        viewport: f64,

        #[arg(long, default_value_t = 100)]
        interval_ms: u64,
    },
    /// Interactive search session
    Shell,
}

fn parse_finite(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|_| format!("'{}' is not a number", raw))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("'{}' is not a finite number", raw))
    }
}

fn parse_speed(raw: &str) -> Result<f64, String> {
    parse_finite(raw)
}

fn parse_viewport(raw: &str) -> Result<f64, String> {
    let value = parse_finite(raw)?;
    if value > 0.0 && value <= MAX_VIEWPORT {
        Ok(value)
    } else {
        Err(format!("viewport must be between 0 and {} pixels", MAX_VIEWPORT))
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
