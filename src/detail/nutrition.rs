use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::api_connection::endpoints::NutritionDetailsRequest;
use crate::recipe::{Ingredient, Recipe};

pub const FAT: &str = "FAT";
pub const SATURATED_FAT: &str = "FASAT";
pub const TRANS_FAT: &str = "FATRN";
pub const CHOLESTEROL: &str = "CHOLE";
pub const SODIUM: &str = "NA";
pub const CARBOHYDRATE: &str = "CHOCDF";
pub const FIBER: &str = "FIBTG";
pub const SUGARS: &str = "SUGAR";
pub const PROTEIN: &str = "PROCNT";
pub const VITAMIN_D: &str = "VITD";
pub const CALCIUM: &str = "CA";
pub const IRON: &str = "FE";
pub const POTASSIUM: &str = "K";

// Atwater factors, kcal per gram.
const CARB_KCAL_PER_G: f64 = 4.0;
const PROTEIN_KCAL_PER_G: f64 = 4.0;
const FAT_KCAL_PER_G: f64 = 9.0;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Nutrient {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
}

/// Edamam nutrition-details response. Only the fields the label needs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NutritionAnalysis {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub total_nutrients: HashMap<String, Nutrient>,
    #[serde(default)]
    pub total_daily: HashMap<String, Nutrient>,
}

impl NutritionAnalysis {
    /// Whole-recipe quantity for a nutrient code, 0 when absent.
    pub fn quantity(&self, code: &str) -> f64 {
        self.total_nutrients.get(code).map(|n| n.quantity).unwrap_or(0.0)
    }

    /// Whole-recipe percent of daily value for a nutrient code, 0 when absent.
    pub fn daily_percent(&self, code: &str) -> f64 {
        self.total_daily.get(code).map(|n| n.quantity).unwrap_or(0.0)
    }

    pub fn macros(&self) -> MacroBreakdown {
        MacroBreakdown::from_grams(
            self.quantity(CARBOHYDRATE),
            self.quantity(PROTEIN),
            self.quantity(FAT),
        )
    }
}

/// Formats one ingredient the way the nutrition API parses best:
/// `"<amount> <unit> of <name>"`, with the unit left out when there is none.
pub fn format_ingredient_line(ingredient: &Ingredient) -> String {
    let amount = format_amount(ingredient.amount);
    match ingredient.unit() {
        Some(unit) => format!("{} {} of {}", amount, unit, ingredient.name),
        None => format!("{} of {}", amount, ingredient.name),
    }
    .trim()
    .to_string()
}

/// Beyond this every f64 is an integer and `i64` can no longer hold them all.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Integral amounts print without a fractional part (`2`, not `2.0`).
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < EXACT_INTEGER_LIMIT {
        format!("{}", amount as i64)
    } else {
        format!("{}", amount)
    }
}

/// `None` when the recipe has no ingredients, in which case no request is made.
pub fn nutrition_request_for(recipe: &Recipe) -> Option<NutritionDetailsRequest> {
    if recipe.extended_ingredients.is_empty() {
        return None;
    }
    Some(NutritionDetailsRequest {
        title: recipe.title.clone(),
        ingr: recipe
            .extended_ingredients
            .iter()
            .map(format_ingredient_line)
            .collect(),
    })
}

/// One segment of the proportional macro bar, in percent of its width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSegment {
    pub offset: f64,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroBreakdown {
    pub carb_calories: f64,
    pub protein_calories: f64,
    pub fat_calories: f64,
    pub carb_percent: f64,
    pub protein_percent: f64,
    pub fat_percent: f64,
}

impl MacroBreakdown {
    pub fn from_grams(carb_g: f64, protein_g: f64, fat_g: f64) -> Self {
        let carb_calories = carb_g * CARB_KCAL_PER_G;
        let protein_calories = protein_g * PROTEIN_KCAL_PER_G;
        let fat_calories = fat_g * FAT_KCAL_PER_G;
        let total = carb_calories + protein_calories + fat_calories;
        let share = |kcal: f64| if total > 0.0 { kcal / total * 100.0 } else { 0.0 };
        Self {
            carb_calories,
            protein_calories,
            fat_calories,
            carb_percent: share(carb_calories),
            protein_percent: share(protein_calories),
            fat_percent: share(fat_calories),
        }
    }

    pub fn total_calories(&self) -> f64 {
        self.carb_calories + self.protein_calories + self.fat_calories
    }

    /// Carbohydrate, protein, fat, laid left to right without overlap.
    pub fn segments(&self) -> [BarSegment; 3] {
        [
            BarSegment {
                offset: 0.0,
                width: self.carb_percent,
            },
            BarSegment {
                offset: self.carb_percent,
                width: self.protein_percent,
            },
            BarSegment {
                offset: self.carb_percent + self.protein_percent,
                width: self.fat_percent,
            },
        ]
    }

    /// Percentages rounded to whole numbers, for the bar captions.
    pub fn rounded_percents(&self) -> (i64, i64, i64) {
        (
            self.carb_percent.round() as i64,
            self.protein_percent.round() as i64,
            self.fat_percent.round() as i64,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    /// Bold nutrient name with a bold daily value.
    Primary,
    /// Indented sub-nutrient.
    Indented,
    /// Plain row, used for vitamins and minerals.
    Plain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelRow {
    pub name: &'static str,
    pub quantity: f64,
    pub unit: &'static str,
    /// `None` for nutrients without a daily value (trans fat, sugars).
    pub daily_percent: Option<f64>,
    pub style: RowStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NutritionLabel {
    pub servings: u32,
    pub calories_per_serving: f64,
    pub rows: Vec<LabelRow>,
    pub macros: MacroBreakdown,
}

struct RowDef {
    code: &'static str,
    name: &'static str,
    unit: &'static str,
    has_daily: bool,
    style: RowStyle,
}

const LABEL_ROWS: &[RowDef] = &[
    RowDef { code: FAT, name: "Total Fat", unit: "g", has_daily: true, style: RowStyle::Primary },
    RowDef { code: SATURATED_FAT, name: "Saturated Fat", unit: "g", has_daily: true, style: RowStyle::Indented },
    RowDef { code: TRANS_FAT, name: "Trans Fat", unit: "g", has_daily: false, style: RowStyle::Indented },
    RowDef { code: CHOLESTEROL, name: "Cholesterol", unit: "mg", has_daily: true, style: RowStyle::Primary },
    RowDef { code: SODIUM, name: "Sodium", unit: "mg", has_daily: true, style: RowStyle::Primary },
    RowDef { code: CARBOHYDRATE, name: "Total Carbohydrate", unit: "g", has_daily: true, style: RowStyle::Primary },
    RowDef { code: FIBER, name: "Dietary Fiber", unit: "g", has_daily: true, style: RowStyle::Indented },
    RowDef { code: SUGARS, name: "Total Sugars", unit: "g", has_daily: false, style: RowStyle::Indented },
    RowDef { code: PROTEIN, name: "Protein", unit: "g", has_daily: true, style: RowStyle::Primary },
    RowDef { code: VITAMIN_D, name: "Vitamin D", unit: "µg", has_daily: true, style: RowStyle::Plain },
    RowDef { code: CALCIUM, name: "Calcium", unit: "mg", has_daily: true, style: RowStyle::Plain },
    RowDef { code: IRON, name: "Iron", unit: "mg", has_daily: true, style: RowStyle::Plain },
    RowDef { code: POTASSIUM, name: "Potassium", unit: "mg", has_daily: true, style: RowStyle::Plain },
];

impl NutritionLabel {
    /// Per-serving label. The macro bar uses whole-recipe totals; the shares are the same.
    pub fn build(analysis: &NutritionAnalysis, servings: u32) -> Self {
        let divisor = servings.max(1) as f64;
        let rows = LABEL_ROWS
            .iter()
            .map(|row| LabelRow {
                name: row.name,
                quantity: analysis.quantity(row.code) / divisor,
                unit: row.unit,
                daily_percent: row
                    .has_daily
                    .then(|| analysis.daily_percent(row.code) / divisor),
                style: row.style,
            })
            .collect();
        Self {
            servings: servings.max(1),
            calories_per_serving: analysis.calories / divisor,
            rows,
            macros: analysis.macros(),
        }
    }

    pub fn row(&self, name: &str) -> Option<&LabelRow> {
        self.rows.iter().find(|r| r.name == name)
    }
}
