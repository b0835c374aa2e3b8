use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
}

impl Ingredient {
    /// Unit with blank strings treated as absent; the API sends `""` for unitless items.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// An ingredient or piece of equipment referenced by an instruction step.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct StepItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct InstructionStep {
    pub number: u32,
    pub step: String,
    #[serde(default)]
    pub ingredients: Vec<StepItem>,
    #[serde(default)]
    pub equipment: Vec<StepItem>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct InstructionSet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<InstructionStep>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default = "default_servings")]
    pub servings: u32,
    #[serde(default)]
    pub ready_in_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation_minutes: Option<i64>,
    #[serde(default)]
    pub health_score: f64,

    #[serde(default)]
    pub vegan: bool,
    #[serde(default)]
    pub vegetarian: bool,
    #[serde(default)]
    pub gluten_free: bool,
    #[serde(default)]
    pub dairy_free: bool,
    #[serde(default)]
    pub very_healthy: bool,
    #[serde(default)]
    pub very_popular: bool,
    #[serde(default)]
    pub cheap: bool,

    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub dish_types: Vec<String>,
    #[serde(default)]
    pub diets: Vec<String>,

    #[serde(default)]
    pub used_ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub missed_ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub extended_ingredients: Vec<Ingredient>,

    #[serde(default)]
    pub analyzed_instructions: Vec<InstructionSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

fn default_servings() -> u32 {
    1
}

impl Recipe {
    /// Servings as a divisor. Never zero.
    pub fn serving_divisor(&self) -> f64 {
        self.servings.max(1) as f64
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref().filter(|i| !i.trim().is_empty())
    }

    /// Steps of the first analyzed instruction set, if the API supplied any.
    pub fn steps(&self) -> &[InstructionStep] {
        self.analyzed_instructions
            .first()
            .map(|set| set.steps.as_slice())
            .unwrap_or(&[])
    }

    pub fn detail_path(&self) -> String {
        format!("/recipe/{}", self.id)
    }
}

/// Stable sort, highest health score first. Ties keep the API's order.
pub fn sort_by_health_score(recipes: &mut [Recipe]) {
    recipes.sort_by(|a, b| {
        b.health_score
            .partial_cmp(&a.health_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(id: u64, score: f64) -> Recipe {
        Recipe {
            id,
            title: format!("Recipe {}", id),
            health_score: score,
            ..Default::default()
        }
    }

    #[test]
    fn test_sort_by_health_score_descending() {
        let mut recipes = vec![scored(1, 3.0), scored(2, 9.0), scored(3, 1.0)];
        sort_by_health_score(&mut recipes);
        let scores: Vec<f64> = recipes.iter().map(|r| r.health_score).collect();
        assert_eq!(scores, vec![9.0, 3.0, 1.0]);
    }

    #[test]
    fn test_sort_by_health_score_is_stable() {
        let mut recipes = vec![scored(1, 5.0), scored(2, 7.0), scored(3, 5.0), scored(4, 5.0)];
        sort_by_health_score(&mut recipes);
        let ids: Vec<u64> = recipes.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_deserialize_spoonacular_shape() {
        let json = r#"{
            "id": 632660,
            "title": "Apricot Glazed Apple Tart",
            "image": "https://img.spoonacular.com/recipes/632660-312x231.jpg",
            "servings": 8,
            "readyInMinutes": 45,
            "healthScore": 12.0,
            "vegetarian": true,
            "glutenFree": false,
            "cuisines": [],
            "dishTypes": ["dessert"],
            "usedIngredients": [{"id": 9003, "name": "apples", "amount": 4.0, "unit": ""}],
            "extendedIngredients": [{"id": 9003, "name": "apples", "amount": 4.0, "unit": "large"}],
            "analyzedInstructions": [{"name": "", "steps": [
                {"number": 1, "step": "Peel the apples.", "ingredients": [{"id": 9003, "name": "apples", "localizedName": "apples", "image": "apple.jpg"}], "equipment": []}
            ]}],
            "spoonacularScore": 77.1
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.id, 632660);
        assert_eq!(recipe.servings, 8);
        assert_eq!(recipe.ready_in_minutes, 45);
        assert!(recipe.vegetarian);
        assert!(!recipe.vegan);
        assert_eq!(recipe.used_ingredients[0].unit(), None);
        assert_eq!(recipe.extended_ingredients[0].unit(), Some("large"));
        assert_eq!(recipe.steps().len(), 1);
        assert_eq!(recipe.steps()[0].ingredients[0].name, "apples");
        assert_eq!(recipe.detail_path(), "/recipe/632660");
    }

    #[test]
    fn test_missing_servings_defaults_to_one() {
        let recipe: Recipe = serde_json::from_str(r#"{"id": 1, "title": "Water"}"#).unwrap();
        assert_eq!(recipe.servings, 1);
        assert_eq!(recipe.serving_divisor(), 1.0);
        assert!(recipe.steps().is_empty());
        assert_eq!(recipe.image(), None);
    }
}
