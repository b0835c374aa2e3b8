use scraper::Html;
use std::fmt::Write;

use crate::carousel::{visible_items, ITEM_WIDTH};
use crate::detail::loader::{DetailState, NutritionState};
use crate::detail::nutrition::{LabelRow, MacroBreakdown, NutritionLabel, RowStyle};
use crate::recipe::Recipe;
use crate::results::{RecipeCard, ResultsView, TruncatedList};
use crate::search::FilterSelection;

const RULE: &str = "----------------------------------------";
const IMAGE_PLACEHOLDER: &str = "[no image]";
const NUTRITION_UNAVAILABLE: &str =
    "Unfortunately, the Nutrition Label for this recipe is unavailable.";
const NO_INSTRUCTIONS: &str = "No detailed instructions available for this recipe.\n\
     Please check the source website for complete instructions.";

/// Text content of API-supplied HTML prose (summaries, free-form
/// instructions), with tags dropped and entities decoded.
pub fn strip_tags(html: &str) -> String {
    Html::parse_fragment(html)
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncated(label: &str, list: &TruncatedList) -> Option<String> {
    if list.is_empty() {
        return None;
    }
    let mut line = format!("{}: {}", label, list.shown.join(", "));
    if let Some(more) = list.more_suffix() {
        let _ = write!(line, " {}", more);
    }
    Some(line)
}

pub fn render_card(card: &RecipeCard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", card.id, card.title);
    let _ = writeln!(out, "  {}", card.image.as_deref().unwrap_or(IMAGE_PLACEHOLDER));
    let _ = writeln!(
        out,
        "  {} min | {} servings",
        card.ready_in_minutes, card.servings
    );
    for line in [
        truncated("Used", &card.used_ingredients),
        truncated("Missing", &card.missed_ingredients),
    ]
    .into_iter()
    .flatten()
    {
        let _ = writeln!(out, "  {}", line);
    }
    if !card.badges.is_empty() {
        let badges: Vec<&str> = card.badges.iter().map(|b| b.label).collect();
        let _ = writeln!(out, "  [{}]", badges.join("] ["));
    }
    if !card.diet_labels.is_empty() {
        let _ = writeln!(out, "  {}", card.diet_labels.join(" · "));
    }
    let _ = writeln!(out, "  -> {}", card.link);
    out
}

pub fn render_results(view: &ResultsView) -> String {
    match view {
        ResultsView::Loading => "Searching...\n".to_string(),
        ResultsView::NoRecipesFound => {
            "No recipes found. Try different ingredients or fewer filters.\n".to_string()
        }
        ResultsView::Idle => "Add some ingredients and search to see recipes.\n".to_string(),
        ResultsView::Cards(cards) => cards
            .iter()
            .map(render_card)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn render_filters(selection: &FilterSelection) -> String {
    format!("Filters: {}\n", selection.summary())
}

fn label_row(row: &LabelRow) -> String {
    let indent = match row.style {
        RowStyle::Indented => "  ",
        _ => "",
    };
    let name = match row.style {
        RowStyle::Primary => row.name.to_uppercase(),
        _ => row.name.to_string(),
    };
    let amount = format!("{}{} {:.1}{}", indent, name, row.quantity, row.unit);
    match row.daily_percent {
        Some(percent) => format!("{:<32}{:>7.1}%", amount, percent),
        None => amount,
    }
}

/// Proportional bar, `width` characters wide: `c` carbs, `p` protein, `f` fat.
pub fn render_macro_bar(macros: &MacroBreakdown, width: usize) -> String {
    let mut bar = String::with_capacity(width);
    let fill = ['c', 'p', 'f'];
    for (segment, glyph) in macros.segments().iter().zip(fill) {
        let start = (segment.offset / 100.0 * width as f64).round() as usize;
        let end = ((segment.offset + segment.width) / 100.0 * width as f64).round() as usize;
        for _ in start..end.min(width) {
            bar.push(glyph);
        }
    }
    while bar.chars().count() < width {
        bar.push('.');
    }
    let (carb, protein, fat) = macros.rounded_percents();
    format!(
        "[{}]\nCarbs {}% | Protein {}% | Fat {}%",
        bar, carb, protein, fat
    )
}

pub fn render_nutrition_label(label: &NutritionLabel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Nutrition Label");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Amount Per Serving ({} servings)", label.servings);
    let _ = writeln!(out, "{:<32}{:>8.0}", "Calories", label.calories_per_serving);
    let _ = writeln!(out, "{:>40}", "% Daily Value*");
    for row in &label.rows {
        let _ = writeln!(out, "{}", label_row(row));
    }
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Macronutrient Breakdown");
    let _ = writeln!(out, "{}", render_macro_bar(&label.macros, 40));
    out
}

pub fn render_recipe(recipe: &Recipe, nutrition: &NutritionState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", recipe.title);
    let _ = writeln!(out, "{}", "=".repeat(recipe.title.chars().count().max(1)));
    let _ = writeln!(out, "{}", recipe.image().unwrap_or(IMAGE_PLACEHOLDER));
    let _ = writeln!(
        out,
        "Ready in {} min | {} servings | Health score {:.0}",
        recipe.ready_in_minutes, recipe.servings, recipe.health_score
    );
    for badge in crate::badges::badges_for(recipe) {
        let _ = writeln!(out, "* {}", badge.headline);
    }
    if let Some(summary) = recipe.summary.as_deref() {
        let _ = writeln!(out, "\n{}", strip_tags(summary));
    }

    let _ = writeln!(out, "\nInstructions");
    let steps = recipe.steps();
    if !steps.is_empty() {
        for step in steps {
            let _ = writeln!(out, "Step {}: {}", step.number, step.step);
            if !step.ingredients.is_empty() {
                let names: Vec<&str> = step.ingredients.iter().map(|i| i.name.as_str()).collect();
                let _ = writeln!(out, "  Ingredients: {}", names.join(", "));
            }
            if !step.equipment.is_empty() {
                let names: Vec<&str> = step.equipment.iter().map(|i| i.name.as_str()).collect();
                let _ = writeln!(out, "  Equipment: {}", names.join(", "));
            }
        }
    } else if let Some(text) = recipe.instructions.as_deref().filter(|t| !t.trim().is_empty()) {
        let _ = writeln!(out, "{}", strip_tags(text));
    } else {
        let _ = writeln!(out, "{}", NO_INSTRUCTIONS);
    }
    if let Some(url) = recipe.source_url.as_deref() {
        let _ = writeln!(out, "Source: {}", url);
    }

    let _ = writeln!(out, "\nIngredients Used");
    for ingredient in &recipe.extended_ingredients {
        let _ = writeln!(
            out,
            "- {} - {:.1} {}",
            capitalize(&ingredient.name),
            ingredient.amount,
            ingredient.unit().unwrap_or("")
        );
    }

    let _ = writeln!(out);
    match nutrition {
        NutritionState::Pending => {
            let _ = writeln!(out, "Analyzing nutrition...");
        }
        NutritionState::Unavailable => {
            let _ = writeln!(out, "{}", NUTRITION_UNAVAILABLE);
        }
        NutritionState::Available(analysis) => {
            let label = NutritionLabel::build(analysis, recipe.servings);
            out.push_str(&render_nutrition_label(&label));
        }
    }
    out
}

pub fn render_detail(state: &DetailState) -> String {
    match state {
        DetailState::Loading { trivia } => match trivia {
            Some(text) => format!("Did You Know?\n{}\n", text),
            None => "Did You Know?\nFetching a fun food trivia...\n".to_string(),
        },
        DetailState::Error(message) => format!("Error\n{}\n<- Back to search\n", message),
        DetailState::Loaded { recipe, nutrition } => render_recipe(recipe, nutrition),
    }
}

/// One frame of the landing-page showcase.
pub fn render_carousel_frame(offset: f64, viewport: f64) -> String {
    let items = visible_items(offset, viewport);
    let shift = (-offset).rem_euclid(ITEM_WIDTH);
    let names: Vec<String> = items
        .iter()
        .map(|dish| format!("{} ({})", dish.name, dish.cuisine))
        .collect();
    format!("{:>6.1}px | {}", shift, names.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::nutrition::{Nutrient, NutritionAnalysis, CARBOHYDRATE, FAT, PROTEIN};
    use crate::recipe::Ingredient;
    use std::collections::HashMap;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>Tasty</b> and <a href=\"x\">quick</a>"), "Tasty and quick");
        assert_eq!(strip_tags("plain"), "plain");
    }

    #[test]
    fn test_strip_tags_decodes_entities() {
        assert_eq!(
            strip_tags("<p>Salt &amp; pepper, 2 &lt; 3&nbsp;cups</p>"),
            "Salt & pepper, 2 < 3\u{a0}cups"
        );
        assert_eq!(strip_tags("  <i>Caf&eacute;</i> style  "), "Café style");
    }

    #[test]
    fn test_summary_rendered_as_text() {
        let recipe = Recipe {
            title: "Dal".to_string(),
            servings: 2,
            summary: Some("Lentils &amp; <b>rice</b>".to_string()),
            ..Default::default()
        };
        let text = render_recipe(&recipe, &NutritionState::Pending);
        assert!(text.contains("\nLentils & rice\n"));
    }

    #[test]
    fn test_macro_bar_widths() {
        let bar = render_macro_bar(&MacroBreakdown::from_grams(40.0, 20.0, 10.0), 100);
        let first = bar.lines().next().unwrap();
        assert_eq!(first.matches('c').count(), 48);
        assert_eq!(first.matches('p').count(), 25);
        assert_eq!(first.matches('f').count(), 27);
        assert!(bar.ends_with("Carbs 48% | Protein 24% | Fat 27%"));
    }

    #[test]
    fn test_macro_bar_empty() {
        let bar = render_macro_bar(&MacroBreakdown::from_grams(0.0, 0.0, 0.0), 10);
        assert!(bar.starts_with("[..........]"));
        assert!(bar.ends_with("Carbs 0% | Protein 0% | Fat 0%"));
    }

    #[test]
    fn test_recipe_without_nutrition() {
        let recipe = Recipe {
            id: 3,
            title: "Toast".to_string(),
            servings: 1,
            ..Default::default()
        };
        let text = render_recipe(&recipe, &NutritionState::Unavailable);
        assert!(text.contains(NUTRITION_UNAVAILABLE));
        assert!(text.contains("No detailed instructions available"));
        assert!(text.contains(IMAGE_PLACEHOLDER));
    }

    #[test]
    fn test_recipe_with_label() {
        let mut totals = HashMap::new();
        for (code, q) in [(CARBOHYDRATE, 40.0), (PROTEIN, 20.0), (FAT, 10.0)] {
            totals.insert(
                code.to_string(),
                Nutrient {
                    quantity: q,
                    ..Default::default()
                },
            );
        }
        let analysis = NutritionAnalysis {
            calories: 331.0,
            total_nutrients: totals,
            total_daily: HashMap::new(),
        };
        let recipe = Recipe {
            title: "Bowl".to_string(),
            servings: 2,
            extended_ingredients: vec![Ingredient {
                name: "rice".to_string(),
                amount: 1.0,
                unit: Some("cup".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let text = render_recipe(&recipe, &NutritionState::Available(analysis));
        assert!(text.contains("- Rice - 1.0 cup"));
        assert!(text.contains("TOTAL FAT 5.0g"));
        assert!(text.contains("  Trans Fat 0.0g"));
        assert!(text.contains("166"));
    }

    #[test]
    fn test_loading_screen() {
        let waiting = render_detail(&DetailState::Loading { trivia: None });
        assert!(waiting.contains("Fetching a fun food trivia"));
        let ready = render_detail(&DetailState::Loading {
            trivia: Some("Carrots were purple.".to_string()),
        });
        assert!(ready.contains("Carrots were purple."));
    }
}
