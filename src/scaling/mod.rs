// scaling/mod.rs - Serving-size scaling for ingredient lists

mod ingredient;

pub use ingredient::{format_quantity, parse_ingredient, scale_ingredient_line, ParsedIngredient};

use crate::recipe::Recipe;

pub const MIN_SERVINGS: u32 = 1;
pub const MAX_SERVINGS: u32 = 20;
pub const DEFAULT_SERVINGS: u32 = 4;

/// Target vs. original servings for the recipe currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ServingsScaler {
    recipe_id: Option<String>,
    original_servings: u32,
    target_servings: u32,
}

impl ServingsScaler {
    pub fn new(original_servings: Option<u32>) -> Self {
        let original = normalize_servings(original_servings);
        Self {
            recipe_id: None,
            original_servings: original,
            target_servings: original.clamp(MIN_SERVINGS, MAX_SERVINGS),
        }
    }

    pub fn for_recipe(recipe: &Recipe) -> Self {
        let mut scaler = Self::new(recipe.servings);
        scaler.recipe_id = Some(recipe.id.clone());
        scaler
    }

    /// Switch to `recipe`; the target resets only when the recipe identity changes.
    pub fn select_recipe(&mut self, recipe: &Recipe) {
        if self.recipe_id.as_deref() == Some(recipe.id.as_str()) {
            return;
        }
        tracing::debug!("Servings reset for recipe {}", recipe.id);
        *self = Self::for_recipe(recipe);
    }

    pub fn original_servings(&self) -> u32 {
        self.original_servings
    }

    pub fn target_servings(&self) -> u32 {
        self.target_servings
    }

    pub fn set_target(&mut self, servings: u32) {
        self.target_servings = servings.clamp(MIN_SERVINGS, MAX_SERVINGS);
    }

    pub fn increment(&mut self) {
        self.set_target(self.target_servings.saturating_add(1));
    }

    pub fn decrement(&mut self) {
        self.set_target(self.target_servings.saturating_sub(1));
    }

    pub fn reset(&mut self) {
        self.set_target(self.original_servings);
    }

    pub fn scale_factor(&self) -> f64 {
        self.target_servings as f64 / self.original_servings as f64
    }

    pub fn is_scaled(&self) -> bool {
        self.target_servings != self.original_servings
    }

    pub fn scale_ingredients(&self, ingredients: &[String]) -> Vec<String> {
        let factor = self.scale_factor();
        ingredients
            .iter()
            .map(|line| scale_ingredient_line(line, factor))
            .collect()
    }
}

impl Default for ServingsScaler {
    fn default() -> Self {
        Self::new(None)
    }
}

fn normalize_servings(servings: Option<u32>) -> u32 {
    match servings {
        Some(value) if value > 0 => value,
        _ => DEFAULT_SERVINGS,
    }
}
