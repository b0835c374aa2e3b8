use std::sync::Arc;

use crate::notify::Notifier;

/// Ordered, duplicate-free list of ingredient tags typed by the user.
///
/// Equality is exact and case-sensitive: "Apple" and "apple" are two tags.
pub struct IngredientTagEditor {
    tags: Vec<String>,
    pending_input: String,
    notifier: Arc<dyn Notifier>,
}

impl IngredientTagEditor {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            tags: Vec::new(),
            pending_input: String::new(),
            notifier,
        }
    }

    pub fn ingredients(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tags.iter().any(|t| t == token)
    }

    pub fn joined(&self) -> String {
        self.tags.join(",")
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    /// Mirrors typing into the input box. A comma anywhere commits the text
    /// as a batch of tags.
    pub fn set_pending_input(&mut self, text: &str) {
        self.pending_input = text.to_string();
        if text.contains(',') {
            self.add_from_delimited_text(text);
        }
    }

    pub fn clear_pending_input(&mut self) {
        self.pending_input.clear();
    }

    /// Submits the pending input as a single tag.
    pub fn submit(&mut self) -> bool {
        let input = std::mem::take(&mut self.pending_input);
        self.add(&input)
    }

    pub fn add(&mut self, token: &str) -> bool {
        self.pending_input.clear();
        let trimmed = token.trim();
        if trimmed.is_empty() || self.contains(trimmed) {
            return false;
        }
        self.tags.push(trimmed.to_string());
        self.notifier
            .announce(&format!("Added {} to ingredients", trimmed));
        true
    }

    /// Splits on commas and adds every new, non-empty segment in one batch.
    /// Returns how many tags were added.
    pub fn add_from_delimited_text(&mut self, text: &str) -> usize {
        let mut added = 0;
        for segment in text.split(',').map(str::trim) {
            if !segment.is_empty() && !self.contains(segment) {
                self.tags.push(segment.to_string());
                added += 1;
            }
        }
        if added > 0 {
            self.pending_input.clear();
            self.notifier.announce("Added ingredients to list");
        }
        added
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index >= self.tags.len() {
            return None;
        }
        let removed = self.tags.remove(index);
        self.notifier
            .announce(&format!("Removed {} from ingredients", removed));
        Some(removed)
    }
}
