// ABOUTME: Domain models for recipes, component edges, and nutrition data
// ABOUTME: Defines Recipe, RecipeComponent, ComponentNode, NutritionInfo, and request types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Sous-Chef

//! Core data structures shared between the database managers and the
//! component service. `NutritionInfo` fields are independently optional:
//! an absent field means "unknown", never zero, and aggregation only sums
//! populated fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest accepted `servings_needed` value for a component edge
pub const MIN_SERVINGS_NEEDED: f64 = 0.1;

/// Per-serving nutrition estimate with independently optional fields
///
/// Every field is per one serving of the recipe this record is attached to.
/// A `None` field is unknown, not zero; it stays absent through aggregation
/// unless some source populates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionInfo {
    /// Calories (kcal)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    /// Protein (grams)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_g: Option<f64>,
    /// Carbohydrates (grams)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbohydrates_g: Option<f64>,
    /// Fat (grams)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat_g: Option<f64>,
    /// Saturated fat (grams)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturated_fat_g: Option<f64>,
    /// Fiber (grams)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber_g: Option<f64>,
    /// Sugar (grams)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar_g: Option<f64>,
    /// Sodium (milligrams)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium_mg: Option<f64>,
    /// Cholesterol (milligrams)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cholesterol_mg: Option<f64>,
}

/// Add `value * scale` into an accumulator field, treating an absent
/// accumulator as zero only once the incoming value is known to be present
fn add_field(acc: &mut Option<f64>, value: Option<f64>, scale: f64) {
    if let Some(v) = value {
        *acc = Some(acc.unwrap_or(0.0) + v * scale);
    }
}

/// Round an optional field to one decimal place
fn round_field(field: &mut Option<f64>) {
    if let Some(v) = field.as_mut() {
        *v = (*v * 10.0).round() / 10.0;
    }
}

impl NutritionInfo {
    /// True when no field is populated
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.calories.is_none()
            && self.protein_g.is_none()
            && self.carbohydrates_g.is_none()
            && self.fat_g.is_none()
            && self.saturated_fat_g.is_none()
            && self.fiber_g.is_none()
            && self.sugar_g.is_none()
            && self.sodium_mg.is_none()
            && self.cholesterol_mg.is_none()
    }

    /// Add every populated field of `other`, scaled, into this record
    ///
    /// Fields absent on `other` leave the corresponding accumulator field
    /// untouched (unknown stays unknown).
    pub fn add_scaled(&mut self, other: &Self, scale: f64) {
        add_field(&mut self.calories, other.calories, scale);
        add_field(&mut self.protein_g, other.protein_g, scale);
        add_field(&mut self.carbohydrates_g, other.carbohydrates_g, scale);
        add_field(&mut self.fat_g, other.fat_g, scale);
        add_field(&mut self.saturated_fat_g, other.saturated_fat_g, scale);
        add_field(&mut self.fiber_g, other.fiber_g, scale);
        add_field(&mut self.sugar_g, other.sugar_g, scale);
        add_field(&mut self.sodium_mg, other.sodium_mg, scale);
        add_field(&mut self.cholesterol_mg, other.cholesterol_mg, scale);
    }

    /// Round every populated field to one decimal place
    pub fn round_to_tenths(&mut self) {
        round_field(&mut self.calories);
        round_field(&mut self.protein_g);
        round_field(&mut self.carbohydrates_g);
        round_field(&mut self.fat_g);
        round_field(&mut self.saturated_fat_g);
        round_field(&mut self.fiber_g);
        round_field(&mut self.sugar_g);
        round_field(&mut self.sodium_mg);
        round_field(&mut self.cholesterol_mg);
    }
}

/// Ingredient line carried through for display
///
/// No unit parsing or conversion happens here; amounts and units are opaque
/// to the component subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    /// Ingredient name
    pub name: String,
    /// Amount in the recipe's own unit (if stated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Unit label, e.g. "g", "cup" (if stated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A stored recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique identifier
    pub id: Uuid,
    /// Display title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Serving count the recipe, as written, produces (unknown if `None`)
    pub servings: Option<f64>,
    /// Preparation time in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_time_minutes: Option<i64>,
    /// Cooking time in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cook_time_minutes: Option<i64>,
    /// Ingredient lines (stored as JSON array)
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    /// Instruction steps (stored as JSON array)
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Tags for filtering and search (stored as JSON array)
    #[serde(default)]
    pub tags: Vec<String>,
    /// Per-serving nutrition estimate for this recipe (unknown if `None`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<NutritionInfo>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Request to create a new recipe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateRecipeRequest {
    /// Display title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Serving count the recipe produces
    pub servings: Option<f64>,
    /// Preparation time in minutes
    pub prep_time_minutes: Option<i64>,
    /// Cooking time in minutes
    pub cook_time_minutes: Option<i64>,
    /// Ingredient lines
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    /// Instruction steps
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Tags for filtering and search
    #[serde(default)]
    pub tags: Vec<String>,
    /// Per-serving nutrition estimate
    pub nutrition: Option<NutritionInfo>,
}

/// A component edge: the parent recipe requires `servings_needed` servings
/// of the child recipe as a sub-component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeComponent {
    /// Unique identifier
    pub id: Uuid,
    /// Recipe that uses the component
    pub parent_recipe_id: Uuid,
    /// Recipe being used as a component
    pub child_recipe_id: Uuid,
    /// Servings of the child recipe the parent requires (>= 0.1)
    pub servings_needed: f64,
    /// Display order among siblings of the same parent
    pub sort_order: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// A component edge joined with the child recipe's current data
///
/// Returned by `add_component` as a read-through convenience; the recipe
/// data is fetched at call time, not cached on the edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentWithRecipe {
    /// The component edge
    #[serde(flatten)]
    pub component: RecipeComponent,
    /// The child recipe's current data
    pub recipe: Recipe,
}

/// A node in a materialized component hierarchy
///
/// Carries the edge data, the child recipe (including its tags), and the
/// child's own components recursively. Siblings are ordered by `sort_order`
/// ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentNode {
    /// The component edge this node materializes
    #[serde(flatten)]
    pub component: RecipeComponent,
    /// The child recipe's full data
    pub recipe: Recipe,
    /// The child's own components, if any
    #[serde(default)]
    pub components: Vec<ComponentNode>,
}

/// Request to update an existing component edge
///
/// At least one field must be provided; omitted fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateComponentRequest {
    /// New servings requirement (if provided)
    pub servings_needed: Option<f64>,
    /// New sibling position (if provided)
    pub sort_order: Option<i64>,
}

/// One entry of a bulk component replacement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// Recipe to use as a component
    pub child_recipe_id: Uuid,
    /// Servings of the child the parent requires
    pub servings_needed: f64,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_nutrition_is_empty() {
        assert!(NutritionInfo::default().is_empty());

        let info = NutritionInfo {
            sodium_mg: Some(120.0),
            ..Default::default()
        };
        assert!(!info.is_empty());
    }

    #[test]
    fn test_add_scaled_skips_absent_fields() {
        let mut acc = NutritionInfo {
            calories: Some(100.0),
            ..Default::default()
        };
        let other = NutritionInfo {
            calories: Some(200.0),
            protein_g: Some(10.0),
            ..Default::default()
        };

        acc.add_scaled(&other, 0.5);
        assert_eq!(acc.calories, Some(200.0));
        assert_eq!(acc.protein_g, Some(5.0));
        // Absent on both sides stays unknown
        assert_eq!(acc.fat_g, None);
    }

    #[test]
    fn test_round_to_tenths() {
        let mut info = NutritionInfo {
            calories: Some(123.456),
            fiber_g: Some(0.04),
            ..Default::default()
        };
        info.round_to_tenths();
        assert_eq!(info.calories, Some(123.5));
        assert_eq!(info.fiber_g, Some(0.0));
    }

    #[test]
    fn test_nutrition_skips_absent_fields_in_json() {
        let info = NutritionInfo {
            calories: Some(400.0),
            ..Default::default()
        };
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("calories"));
        assert!(!json.contains("protein_g"));
    }
}
