// ABOUTME: Pure nutrition aggregation over a materialized component hierarchy
// ABOUTME: One-level scale-and-sum of per-serving values with sparse-field handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Sous-Chef

//! # Nutrition Aggregation
//!
//! Combines a recipe's own per-serving nutrition with the scaled
//! contributions of its direct components. A child's stored nutrition is
//! assumed to already reflect everything nested beneath it, so the walk is
//! deliberately one level deep; recursing into grandchildren as well would
//! double-count. Each child contributes `value * servings_needed /
//! child.servings` per populated field; a child without a recorded serving
//! count contributes nothing (unknown, not zero).

use crate::models::{ComponentNode, NutritionInfo};

/// Aggregate a combined per-serving nutrition estimate for a recipe
///
/// Starts from the recipe's own nutrition (if present) and folds in each
/// direct child's populated fields, scaled by the serving ratio. Every
/// output field is rounded to one decimal place. Returns `None` when no
/// field ends up populated from any source. Pure; invoked identically for
/// simple recipes (empty hierarchy) and compound ones.
#[must_use]
pub fn aggregate_nutrition(
    root_nutrition: Option<&NutritionInfo>,
    hierarchy: &[ComponentNode],
) -> Option<NutritionInfo> {
    let mut total = root_nutrition.cloned().unwrap_or_default();

    for node in hierarchy {
        let Some(child_nutrition) = node.recipe.nutrition.as_ref() else {
            continue;
        };
        // No recorded serving count means the scale factor is unknowable;
        // the component contributes nothing rather than a guessed zero.
        let Some(child_servings) = node.recipe.servings else {
            continue;
        };
        if child_servings <= 0.0 {
            continue;
        }

        let scale = node.component.servings_needed / child_servings;
        total.add_scaled(child_nutrition, scale);
    }

    if total.is_empty() {
        return None;
    }

    total.round_to_tenths();
    Some(total)
}
