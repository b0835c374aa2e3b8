use crate::recipe::Recipe;

/// A recipe flag shown as an icon with a caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub icon: &'static str,
    /// Short caption used on result cards.
    pub label: &'static str,
    /// Longer caption used on the detail page.
    pub headline: &'static str,
}

struct BadgeRule {
    applies: fn(&Recipe) -> bool,
    badge: Badge,
}

// Card order: healthy, vegan, popular, cheap.
const BADGE_TABLE: &[BadgeRule] = &[
    BadgeRule {
        applies: |r: &Recipe| r.very_healthy,
        badge: Badge {
            icon: "/icon/healthy.png",
            label: "Healthy",
            headline: "Healthy Choice!",
        },
    },
    BadgeRule {
        applies: |r: &Recipe| r.vegan,
        badge: Badge {
            icon: "/icon/vegan.png",
            label: "Vegan",
            headline: "100% Vegan!",
        },
    },
    BadgeRule {
        applies: |r: &Recipe| r.very_popular,
        badge: Badge {
            icon: "/icon/popular.png",
            label: "Popular",
            headline: "Very popular!",
        },
    },
    BadgeRule {
        applies: |r: &Recipe| r.cheap,
        badge: Badge {
            icon: "/icon/cheap.png",
            label: "Cheap",
            headline: "Very cheap!",
        },
    },
];

struct LabelRule {
    applies: fn(&Recipe) -> bool,
    label: &'static str,
}

const DIET_LABEL_TABLE: &[LabelRule] = &[
    LabelRule {
        applies: |r: &Recipe| r.vegetarian,
        label: "Vegetarian",
    },
    LabelRule {
        applies: |r: &Recipe| r.vegan,
        label: "Vegan",
    },
    LabelRule {
        applies: |r: &Recipe| r.gluten_free,
        label: "Gluten Free",
    },
    LabelRule {
        applies: |r: &Recipe| r.dairy_free,
        label: "Dairy Free",
    },
];

pub fn badges_for(recipe: &Recipe) -> Vec<Badge> {
    BADGE_TABLE
        .iter()
        .filter(|rule| (rule.applies)(recipe))
        .map(|rule| rule.badge)
        .collect()
}

/// Diet pills for a card, followed by the first listed cuisine.
pub fn diet_labels_for(recipe: &Recipe) -> Vec<String> {
    DIET_LABEL_TABLE
        .iter()
        .filter(|rule| (rule.applies)(recipe))
        .map(|rule| rule.label.to_string())
        .chain(recipe.cuisines.first().cloned())
        .collect()
}
