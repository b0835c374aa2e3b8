use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::notify::Notifier;

/// Declares a closed set of filter values together with the strings the
/// recipe API expects for them.
macro_rules! api_enum {
    ($name:ident, $what:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownFilterValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| UnknownFilterValue {
                        kind: $what,
                        value: wanted.to_string(),
                    })
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFilterValue {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownFilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownFilterValue {}

api_enum!(Cuisine, "cuisine", {
    African => "African",
    Asian => "Asian",
    American => "American",
    British => "British",
    Cajun => "Cajun",
    Caribbean => "Caribbean",
    Chinese => "Chinese",
    EasternEuropean => "Eastern European",
    European => "European",
    French => "French",
    German => "German",
    Greek => "Greek",
    Indian => "Indian",
    Irish => "Irish",
    Italian => "Italian",
    Japanese => "Japanese",
    Jewish => "Jewish",
    Korean => "Korean",
    LatinAmerican => "Latin American",
    Mediterranean => "Mediterranean",
    Mexican => "Mexican",
    MiddleEastern => "Middle Eastern",
    Nordic => "Nordic",
    Southern => "Southern",
    Spanish => "Spanish",
    Thai => "Thai",
    Vietnamese => "Vietnamese",
});

api_enum!(Diet, "diet", {
    GlutenFree => "Gluten Free",
    Ketogenic => "Ketogenic",
    Vegetarian => "Vegetarian",
    LactoVegetarian => "Lacto-Vegetarian",
    OvoVegetarian => "Ovo-Vegetarian",
    Vegan => "Vegan",
    Pescetarian => "Pescetarian",
    Paleo => "Paleo",
    Primal => "Primal",
    LowFodmap => "Low FODMAP",
});

api_enum!(Intolerance, "intolerance", {
    Dairy => "Dairy",
    Egg => "Egg",
    Gluten => "Gluten",
    Grain => "Grain",
    Peanut => "Peanut",
    Seafood => "Seafood",
    Sesame => "Sesame",
    Shellfish => "Shellfish",
    Soy => "Soy",
    Sulfite => "Sulfite",
    TreeNut => "Tree Nut",
    Wheat => "Wheat",
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub cuisine: Option<Cuisine>,
    pub diet: Option<Diet>,
    /// Kept in toggle order.
    pub intolerances: Vec<Intolerance>,
}

impl FilterSelection {
    pub fn cuisine_param(&self) -> String {
        self.cuisine.map(|c| c.as_str().to_string()).unwrap_or_default()
    }

    pub fn diet_param(&self) -> String {
        self.diet.map(|d| d.as_str().to_string()).unwrap_or_default()
    }

    pub fn intolerances_param(&self) -> String {
        self.intolerances
            .iter()
            .map(Intolerance::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn toggle_intolerance(&mut self, value: Intolerance) {
        if let Some(pos) = self.intolerances.iter().position(|i| *i == value) {
            self.intolerances.remove(pos);
        } else {
            self.intolerances.push(value);
        }
    }

    /// e.g. `Cuisine: Thai; Intolerances: Dairy, Egg`. Empty when nothing is set.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(cuisine) = self.cuisine {
            parts.push(format!("Cuisine: {}", cuisine));
        }
        if let Some(diet) = self.diet {
            parts.push(format!("Diet: {}", diet));
        }
        if !self.intolerances.is_empty() {
            let list: Vec<&str> = self.intolerances.iter().map(Intolerance::as_str).collect();
            parts.push(format!("Intolerances: {}", list.join(", ")));
        }
        parts.join("; ")
    }
}

/// The filter drawer. Edits land in a pending copy and only reach the active
/// selection on `apply`; `cancel` throws them away.
pub struct FilterPanel {
    active: FilterSelection,
    pending: Option<FilterSelection>,
    notifier: Arc<dyn Notifier>,
}

impl FilterPanel {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            active: FilterSelection::default(),
            pending: None,
            notifier,
        }
    }

    pub fn active(&self) -> &FilterSelection {
        &self.active
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// What the drawer currently shows: pending edits if open, else the active filters.
    pub fn pending(&self) -> &FilterSelection {
        self.pending.as_ref().unwrap_or(&self.active)
    }

    pub fn open(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.active.clone());
        }
    }

    fn pending_mut(&mut self) -> &mut FilterSelection {
        let active = &self.active;
        self.pending.get_or_insert_with(|| active.clone())
    }

    pub fn set_cuisine(&mut self, cuisine: Option<Cuisine>) {
        self.pending_mut().cuisine = cuisine;
    }

    pub fn set_diet(&mut self, diet: Option<Diet>) {
        self.pending_mut().diet = diet;
    }

    pub fn toggle_intolerance(&mut self, intolerance: Intolerance) {
        self.pending_mut().toggle_intolerance(intolerance);
    }

    pub fn apply(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.active = pending;
        }
        let summary = self.active.summary();
        let message = if summary.is_empty() {
            "All filters cleared".to_string()
        } else {
            format!("Filters applied: {}", summary)
        };
        self.notifier.announce(&message);
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
