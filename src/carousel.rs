/// Width of one showcase card, padding included.
pub const ITEM_WIDTH: f64 = 220.0;

pub const DEFAULT_SPEED: f64 = 0.5;

/// Widest viewport `visible_items` lays out; wider ones are clamped.
pub const MAX_VIEWPORT: f64 = 10_000.0;

/// Hovering the showcase slows it to this fraction of the base speed.
const HOVER_SLOWDOWN: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeaturedDish {
    pub id: u32,
    pub name: &'static str,
    pub cuisine: &'static str,
    pub image: &'static str,
}

pub const FEATURED_DISHES: [FeaturedDish; 10] = [
    FeaturedDish { id: 1, name: "Korean Rice with Vegetables & Beef", cuisine: "Korean", image: "food/beef-bimbimbap.jpg" },
    FeaturedDish { id: 2, name: "Cauliflower Fried Rice", cuisine: "Chinese", image: "food/cauliflower-fried-rice.jpg" },
    FeaturedDish { id: 3, name: "Coconut Curry Mackeral Rice", cuisine: "Indian", image: "food/coconut-curry-mackerel.jpg" },
    FeaturedDish { id: 4, name: "Pho with Zucchini Noodles", cuisine: "Vietnamese", image: "food/pho-with-zucchini-noodles.jpg" },
    FeaturedDish { id: 5, name: "Salmon Quinoa Risotto", cuisine: "Italian", image: "food/salmon-quinoa-risotto.jpg" },
    FeaturedDish { id: 6, name: "Slow Cooker Chicken Taco Soup", cuisine: "Mexican", image: "food/slow-cooker-chicken-taco-soup.jpg" },
    FeaturedDish { id: 7, name: "Baked Sweet Potato Fries", cuisine: "American", image: "food/sweet-potato-fries.jpg" },
    FeaturedDish { id: 8, name: "Teriyaki Chicken Soba", cuisine: "Japanese", image: "food/teriyaki-chicken-soba.jpg" },
    FeaturedDish { id: 9, name: "Thai Green Mango Salad", cuisine: "Thai", image: "food/thai-green-mango-salad.jpg" },
    FeaturedDish { id: 10, name: "Chicken, Sausage & Shrimp Paella", cuisine: "Spanish", image: "food/chicken-sausage-shrimp-paella.jpg" },
];

pub fn total_width() -> f64 {
    FEATURED_DISHES.len() as f64 * ITEM_WIDTH
}

/// Endless left-scrolling showcase, computed from a tick count instead of
/// mutated frame by frame.
///
/// Position is always in `(-total_width, 0]`. Changing speed or hover state
/// rebases the origin at the given tick, so the position never jumps.
#[derive(Debug, Clone, PartialEq)]
pub struct Carousel {
    base_speed: f64,
    hovering: bool,
    origin_tick: u64,
    origin_distance: f64,
}

impl Default for Carousel {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED)
    }
}

impl Carousel {
    pub fn new(speed: f64) -> Self {
        Self {
            base_speed: speed,
            hovering: false,
            origin_tick: 0,
            origin_distance: 0.0,
        }
    }

    pub fn current_speed(&self) -> f64 {
        if self.hovering {
            self.base_speed / HOVER_SLOWDOWN
        } else {
            self.base_speed
        }
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    fn distance(&self, tick: u64) -> f64 {
        let elapsed = tick.saturating_sub(self.origin_tick) as f64;
        self.origin_distance + self.current_speed() * elapsed
    }

    /// Horizontal offset of the track at `tick`.
    pub fn position(&self, tick: u64) -> f64 {
        let offset = -self.distance(tick).rem_euclid(total_width());
        // Avoid handing out -0.0.
        if offset == 0.0 {
            0.0
        } else {
            offset
        }
    }

    fn rebase(&mut self, tick: u64) {
        self.origin_distance = self.distance(tick).rem_euclid(total_width());
        self.origin_tick = tick;
    }

    pub fn set_hovering(&mut self, hovering: bool, tick: u64) {
        if self.hovering != hovering {
            self.rebase(tick);
            self.hovering = hovering;
        }
    }

    pub fn change_speed(&mut self, speed: f64, tick: u64) {
        self.rebase(tick);
        self.base_speed = speed;
    }
}

/// Dishes that overlap a viewport of `viewport` pixels when the track sits at
/// `offset`. Wraps around, so a wide viewport may list a dish twice.
pub fn visible_items(offset: f64, viewport: f64) -> Vec<&'static FeaturedDish> {
    if !offset.is_finite() || !viewport.is_finite() || viewport <= 0.0 {
        return Vec::new();
    }
    let viewport = viewport.min(MAX_VIEWPORT);
    // The track repeats every total width, so only the remainder matters.
    let start = (-offset).max(0.0).rem_euclid(total_width());
    let first = (start / ITEM_WIDTH).floor() as usize;
    let last = ((start + viewport) / ITEM_WIDTH).ceil() as usize;
    (first..last)
        .map(|slot| &FEATURED_DISHES[slot % FEATURED_DISHES.len()])
        .collect()
}
