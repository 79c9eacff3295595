// ABOUTME: Business logic for compound recipe components over the database managers
// ABOUTME: Mutation facade, hierarchy materialization, and aggregated nutrition reads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Sous-Chef

//! # Component Service
//!
//! The facade the API layer calls for everything component-related. Writes
//! go through the cycle-checked transactional paths of the components
//! manager; reads materialize the nested hierarchy or the combined
//! nutrition estimate. Every call is stateless and request-scoped.

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{
    ComponentNode, ComponentSpec, ComponentWithRecipe, NutritionInfo, Recipe, RecipeComponent,
    UpdateComponentRequest, MIN_SERVINGS_NEEDED,
};
use crate::services::nutrition::aggregate_nutrition;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use tracing::warn;
use uuid::Uuid;

/// Service for managing compound recipe components
#[derive(Clone)]
pub struct ComponentService {
    db: Database,
}

impl ComponentService {
    /// Create a new component service
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Add a child recipe as a component of a parent recipe
    ///
    /// Fails with `ResourceNotFound` if either recipe is missing,
    /// `CycleDetected` if the edge would close a cycle (including the
    /// self-loop), and `ResourceAlreadyExists` for a duplicate pair. The
    /// new edge is appended after the parent's existing components.
    /// Returns the edge joined with the child recipe's current data.
    pub async fn add_component(
        &self,
        parent_recipe_id: Uuid,
        child_recipe_id: Uuid,
        servings_needed: f64,
    ) -> AppResult<ComponentWithRecipe> {
        validate_servings_needed(servings_needed)?;

        let recipes = self.db.recipes();
        recipes
            .get(parent_recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {parent_recipe_id}")))?;
        let child_recipe = recipes
            .get(child_recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {child_recipe_id}")))?;

        let component = self
            .db
            .components()
            .insert_checked(parent_recipe_id, child_recipe_id, servings_needed)
            .await?;

        Ok(ComponentWithRecipe {
            component,
            recipe: child_recipe,
        })
    }

    /// Update a component's servings requirement and/or sibling position
    ///
    /// At least one field must be provided; omitted fields are untouched.
    pub async fn update_component(
        &self,
        component_id: Uuid,
        request: &UpdateComponentRequest,
    ) -> AppResult<RecipeComponent> {
        if request.servings_needed.is_none() && request.sort_order.is_none() {
            return Err(AppError::invalid_input(
                "At least one of servings_needed or sort_order must be provided",
            ));
        }
        if let Some(servings_needed) = request.servings_needed {
            validate_servings_needed(servings_needed)?;
        }

        self.db.components().update(component_id, request).await
    }

    /// Remove a component edge
    ///
    /// Removing an edge that does not exist fails with `ResourceNotFound`;
    /// a double remove is not a silent no-op.
    pub async fn remove_component(&self, component_id: Uuid) -> AppResult<()> {
        self.db.components().delete(component_id).await
    }

    /// Replace all components of a parent recipe, all-or-nothing
    ///
    /// Every candidate is validated (recipes exist, servings in range, no
    /// repeated child in the request) and cycle-checked against the
    /// persisted graph before anything is deleted. On any rejection the
    /// existing edge set is left completely unchanged. `sort_order` follows
    /// the list order.
    pub async fn set_components(
        &self,
        parent_recipe_id: Uuid,
        components: &[ComponentSpec],
    ) -> AppResult<Vec<RecipeComponent>> {
        let recipes = self.db.recipes();
        recipes
            .get(parent_recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {parent_recipe_id}")))?;

        let mut seen: HashSet<Uuid> = HashSet::new();
        for spec in components {
            validate_servings_needed(spec.servings_needed)?;
            if !seen.insert(spec.child_recipe_id) {
                return Err(AppError::invalid_input(format!(
                    "Recipe {} appears more than once in the component list",
                    spec.child_recipe_id
                )));
            }
        }

        let child_ids: Vec<Uuid> = components.iter().map(|s| s.child_recipe_id).collect();
        let found = recipes.get_many(&child_ids).await?;
        let found_ids: HashSet<Uuid> = found.iter().map(|r| r.id).collect();
        for child_id in &child_ids {
            if !found_ids.contains(child_id) {
                return Err(AppError::not_found(format!("Recipe {child_id}")));
            }
        }

        self.db
            .components()
            .replace_all_checked(parent_recipe_id, components)
            .await
    }

    /// Materialize the full nested component hierarchy of a recipe
    ///
    /// Depth-first; siblings are ordered by `sort_order` ascending. A
    /// recipe with no components yields an empty list. A recipe id already
    /// on the current path (a data-integrity violation the write-time cycle
    /// guard should have prevented) is treated as having no further
    /// children and logged, so the read degrades instead of recursing
    /// forever.
    pub async fn get_hierarchy(&self, recipe_id: Uuid) -> AppResult<Vec<ComponentNode>> {
        let mut visited: HashSet<Uuid> = HashSet::new();
        visited.insert(recipe_id);
        self.build_nodes(recipe_id, &mut visited).await
    }

    /// Recursive step of [`Self::get_hierarchy`]
    ///
    /// `visited` holds the ids on the current path; entries are removed on
    /// backtrack so the same sub-recipe may legitimately appear under
    /// several branches of the tree.
    fn build_nodes<'a>(
        &'a self,
        recipe_id: Uuid,
        visited: &'a mut HashSet<Uuid>,
    ) -> Pin<Box<dyn Future<Output = AppResult<Vec<ComponentNode>>> + Send + 'a>> {
        Box::pin(async move {
            let edges = self.db.components().list_children_of(recipe_id).await?;
            if edges.is_empty() {
                return Ok(Vec::new());
            }

            let child_ids: Vec<Uuid> = edges.iter().map(|e| e.child_recipe_id).collect();
            let child_recipes: HashMap<Uuid, Recipe> = self
                .db
                .recipes()
                .get_many(&child_ids)
                .await?
                .into_iter()
                .map(|r| (r.id, r))
                .collect();

            let mut nodes = Vec::with_capacity(edges.len());
            for edge in edges {
                let Some(recipe) = child_recipes.get(&edge.child_recipe_id).cloned() else {
                    // Edge outlived its recipe (concurrent delete); skip it
                    // rather than failing the whole read.
                    warn!(
                        component_id = %edge.id,
                        child_recipe_id = %edge.child_recipe_id,
                        "component edge references a missing recipe, skipping"
                    );
                    continue;
                };

                let components = if visited.insert(edge.child_recipe_id) {
                    let children = self.build_nodes(edge.child_recipe_id, visited).await?;
                    visited.remove(&edge.child_recipe_id);
                    children
                } else {
                    // Cycle in stored data; the write-time guard was
                    // bypassed or a race occurred.
                    warn!(
                        recipe_id = %edge.child_recipe_id,
                        parent_recipe_id = %edge.parent_recipe_id,
                        "component cycle detected in stored data, truncating hierarchy"
                    );
                    Vec::new()
                };

                nodes.push(ComponentNode {
                    component: edge,
                    recipe,
                    components,
                });
            }

            Ok(nodes)
        })
    }

    /// List the recipes that use a recipe as a component ("used in")
    pub async fn get_component_parents(
        &self,
        recipe_id: Uuid,
    ) -> AppResult<Vec<ComponentWithRecipe>> {
        let edges = self.db.components().list_parents_of(recipe_id).await?;
        if edges.is_empty() {
            return Ok(Vec::new());
        }

        let parent_ids: Vec<Uuid> = edges.iter().map(|e| e.parent_recipe_id).collect();
        let parents: HashMap<Uuid, Recipe> = self
            .db
            .recipes()
            .get_many(&parent_ids)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();

        Ok(edges
            .into_iter()
            .filter_map(|edge| {
                parents.get(&edge.parent_recipe_id).cloned().map(|recipe| {
                    ComponentWithRecipe {
                        component: edge,
                        recipe,
                    }
                })
            })
            .collect())
    }

    /// Combined per-serving nutrition estimate for a recipe
    ///
    /// Composition of [`Self::get_hierarchy`] and the pure aggregator. For
    /// a recipe with no components this is the recipe's own nutrition
    /// unchanged; `None` when nothing is known.
    pub async fn get_aggregated_nutrition(
        &self,
        recipe_id: Uuid,
    ) -> AppResult<Option<NutritionInfo>> {
        let recipe = self
            .db
            .recipes()
            .get(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {recipe_id}")))?;

        let hierarchy = self.get_hierarchy(recipe_id).await?;
        Ok(aggregate_nutrition(recipe.nutrition.as_ref(), &hierarchy))
    }
}

/// Reject servings requirements below the supported minimum
fn validate_servings_needed(servings_needed: f64) -> AppResult<()> {
    if !servings_needed.is_finite() || servings_needed < MIN_SERVINGS_NEEDED {
        return Err(AppError::invalid_input(format!(
            "servings_needed must be at least {MIN_SERVINGS_NEEDED}, got {servings_needed}"
        )));
    }
    Ok(())
}
