// ABOUTME: Database operations for component edges between recipes
// ABOUTME: Cycle-checked transactional writes, edge reads, and the reachability guard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Sous-Chef

//! # Component Edge Store
//!
//! Component edges form a directed graph over the recipe table: an edge
//! `parent -> child` means the parent recipe requires some servings of the
//! child recipe as a sub-component. The graph must stay acyclic, so every
//! write path that adds edges runs the reachability check *inside the same
//! transaction* as the mutation. SQLite serializes writers, which means the
//! check and the insert observe the same snapshot and two concurrent adds
//! cannot jointly close a cycle.

use crate::errors::{AppError, AppResult};
use crate::models::{ComponentSpec, RecipeComponent, UpdateComponentRequest};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, Sqlite, SqlitePool, Transaction};
use std::collections::HashSet;
use uuid::Uuid;

/// Component edge database operations manager
pub struct ComponentsManager {
    pool: SqlitePool,
}

impl ComponentsManager {
    /// Create a new components manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List the direct components of a parent recipe, ordered by `sort_order`
    pub async fn list_children_of(&self, parent_recipe_id: Uuid) -> AppResult<Vec<RecipeComponent>> {
        let rows = sqlx::query(
            r"
            SELECT id, parent_recipe_id, child_recipe_id, servings_needed, sort_order,
                   created_at, updated_at
            FROM recipe_components
            WHERE parent_recipe_id = $1
            ORDER BY sort_order ASC
            ",
        )
        .bind(parent_recipe_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list components: {e}")))?;

        rows.iter().map(row_to_component).collect()
    }

    /// List the edges where a recipe is used as a component ("used in")
    pub async fn list_parents_of(&self, child_recipe_id: Uuid) -> AppResult<Vec<RecipeComponent>> {
        let rows = sqlx::query(
            r"
            SELECT id, parent_recipe_id, child_recipe_id, servings_needed, sort_order,
                   created_at, updated_at
            FROM recipe_components
            WHERE child_recipe_id = $1
            ",
        )
        .bind(child_recipe_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list parent components: {e}")))?;

        rows.iter().map(row_to_component).collect()
    }

    /// Get a component edge by ID
    pub async fn get(&self, component_id: Uuid) -> AppResult<Option<RecipeComponent>> {
        let row = sqlx::query(
            r"
            SELECT id, parent_recipe_id, child_recipe_id, servings_needed, sort_order,
                   created_at, updated_at
            FROM recipe_components
            WHERE id = $1
            ",
        )
        .bind(component_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get component: {e}")))?;

        row.as_ref().map(row_to_component).transpose()
    }

    /// Find the edge for an exact (parent, child) pair, if any
    pub async fn find_exact(
        &self,
        parent_recipe_id: Uuid,
        child_recipe_id: Uuid,
    ) -> AppResult<Option<RecipeComponent>> {
        let row = sqlx::query(
            r"
            SELECT id, parent_recipe_id, child_recipe_id, servings_needed, sort_order,
                   created_at, updated_at
            FROM recipe_components
            WHERE parent_recipe_id = $1 AND child_recipe_id = $2
            ",
        )
        .bind(parent_recipe_id.to_string())
        .bind(child_recipe_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find component: {e}")))?;

        row.as_ref().map(row_to_component).transpose()
    }

    /// Check whether adding `parent -> child` would create a cycle
    ///
    /// Returns `true` for the degenerate self-loop, otherwise runs a
    /// depth-first reachability search from `child` over the persisted
    /// edges: if `parent` is reachable, the new edge would close a cycle.
    /// The visited set guarantees termination in linear-in-edges time even
    /// if the stored graph already contains a cycle. Read-only.
    pub async fn would_create_cycle(
        &self,
        parent_recipe_id: Uuid,
        child_recipe_id: Uuid,
    ) -> AppResult<bool> {
        if parent_recipe_id == child_recipe_id {
            return Ok(true);
        }

        let mut visited: HashSet<Uuid> = HashSet::new();
        let mut stack = vec![child_recipe_id];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if current == parent_recipe_id {
                return Ok(true);
            }
            let children = self.child_ids_of(current).await?;
            stack.extend(children);
        }

        Ok(false)
    }

    /// Insert a new edge after duplicate and cycle checks, atomically
    ///
    /// The duplicate check, the reachability search, the next-sort-order
    /// computation, and the insert all run in one transaction so concurrent
    /// writers cannot interleave between check and act. `sort_order` is
    /// assigned as one greater than the current maximum among the parent's
    /// children (0 when there are none).
    pub async fn insert_checked(
        &self,
        parent_recipe_id: Uuid,
        child_recipe_id: Uuid,
        servings_needed: f64,
    ) -> AppResult<RecipeComponent> {
        let mut tx = self.pool.begin().await?;

        let duplicate: Option<(String,)> = sqlx::query_as(
            "SELECT id FROM recipe_components WHERE parent_recipe_id = $1 AND child_recipe_id = $2",
        )
        .bind(parent_recipe_id.to_string())
        .bind(child_recipe_id.to_string())
        .fetch_optional(&mut *tx)
        .await?;
        if duplicate.is_some() {
            return Err(AppError::already_exists(format!(
                "Recipe {child_recipe_id} is already a component of recipe {parent_recipe_id}"
            )));
        }

        if would_create_cycle_tx(&mut tx, parent_recipe_id, child_recipe_id).await? {
            return Err(AppError::cycle_detected(format!(
                "Adding recipe {child_recipe_id} as a component of recipe {parent_recipe_id} \
                 would create a circular reference"
            )));
        }

        let (next_sort_order,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM recipe_components \
             WHERE parent_recipe_id = $1",
        )
        .bind(parent_recipe_id.to_string())
        .fetch_one(&mut *tx)
        .await?;

        let component = insert_edge_tx(
            &mut tx,
            parent_recipe_id,
            child_recipe_id,
            servings_needed,
            next_sort_order,
        )
        .await?;

        tx.commit().await?;
        Ok(component)
    }

    /// Replace all edges of a parent with a new ordered list, atomically
    ///
    /// Every candidate is cycle-checked against the persisted graph before
    /// anything is deleted; candidates are not checked against in-batch
    /// siblings, which do not participate in reachability until committed.
    /// On any rejection the transaction rolls back and the existing edge
    /// set is untouched. `sort_order` is the 0-based list index.
    pub async fn replace_all_checked(
        &self,
        parent_recipe_id: Uuid,
        components: &[ComponentSpec],
    ) -> AppResult<Vec<RecipeComponent>> {
        let mut tx = self.pool.begin().await?;

        for spec in components {
            if would_create_cycle_tx(&mut tx, parent_recipe_id, spec.child_recipe_id).await? {
                return Err(AppError::cycle_detected(format!(
                    "Adding recipe {} as a component of recipe {parent_recipe_id} \
                     would create a circular reference",
                    spec.child_recipe_id
                )));
            }
        }

        sqlx::query("DELETE FROM recipe_components WHERE parent_recipe_id = $1")
            .bind(parent_recipe_id.to_string())
            .execute(&mut *tx)
            .await?;

        let mut inserted = Vec::with_capacity(components.len());
        for (index, spec) in components.iter().enumerate() {
            let component = insert_edge_tx(
                &mut tx,
                parent_recipe_id,
                spec.child_recipe_id,
                spec.servings_needed,
                index as i64,
            )
            .await?;
            inserted.push(component);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Update an edge's `servings_needed` and/or `sort_order`
    ///
    /// Omitted fields are left untouched. Field-presence validation happens
    /// in the service layer; this only applies the change.
    pub async fn update(
        &self,
        component_id: Uuid,
        request: &UpdateComponentRequest,
    ) -> AppResult<RecipeComponent> {
        let existing = self
            .get(component_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Component {component_id}")))?;

        let servings_needed = request.servings_needed.unwrap_or(existing.servings_needed);
        let sort_order = request.sort_order.unwrap_or(existing.sort_order);
        let now = Utc::now();

        sqlx::query(
            r"
            UPDATE recipe_components
            SET servings_needed = $1, sort_order = $2, updated_at = $3
            WHERE id = $4
            ",
        )
        .bind(servings_needed)
        .bind(sort_order)
        .bind(now.to_rfc3339())
        .bind(component_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update component: {e}")))?;

        Ok(RecipeComponent {
            servings_needed,
            sort_order,
            updated_at: now,
            ..existing
        })
    }

    /// Delete an edge by ID
    ///
    /// Deleting an edge that does not exist is an error, not a silent
    /// no-op; callers that want idempotency check existence first.
    pub async fn delete(&self, component_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM recipe_components WHERE id = $1")
            .bind(component_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete component: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Component {component_id}")));
        }

        Ok(())
    }

    /// Delete every edge of a parent recipe
    pub async fn delete_all_for_parent(&self, parent_recipe_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM recipe_components WHERE parent_recipe_id = $1")
            .bind(parent_recipe_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete components: {e}")))?;

        Ok(())
    }

    /// Child recipe ids of a node, for the pool-based reachability search
    async fn child_ids_of(&self, recipe_id: Uuid) -> AppResult<Vec<Uuid>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT child_recipe_id FROM recipe_components WHERE parent_recipe_id = $1")
                .bind(recipe_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(|(id,)| parse_uuid(id)).collect()
    }
}

/// Reachability search from `child` to `parent` inside a transaction
///
/// Same contract as [`ComponentsManager::would_create_cycle`], but reads
/// through the caller's transaction so the check shares a snapshot with the
/// mutation that follows it.
async fn would_create_cycle_tx(
    tx: &mut Transaction<'_, Sqlite>,
    parent_recipe_id: Uuid,
    child_recipe_id: Uuid,
) -> AppResult<bool> {
    if parent_recipe_id == child_recipe_id {
        return Ok(true);
    }

    let mut visited: HashSet<Uuid> = HashSet::new();
    let mut stack = vec![child_recipe_id];

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        if current == parent_recipe_id {
            return Ok(true);
        }

        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT child_recipe_id FROM recipe_components WHERE parent_recipe_id = $1")
                .bind(current.to_string())
                .fetch_all(&mut **tx)
                .await?;
        for (id,) in &rows {
            stack.push(parse_uuid(id)?);
        }
    }

    Ok(false)
}

/// Insert one edge row inside a transaction and return the model
async fn insert_edge_tx(
    tx: &mut Transaction<'_, Sqlite>,
    parent_recipe_id: Uuid,
    child_recipe_id: Uuid,
    servings_needed: f64,
    sort_order: i64,
) -> AppResult<RecipeComponent> {
    let now = Utc::now();
    let id = Uuid::new_v4();

    sqlx::query(
        r"
        INSERT INTO recipe_components (
            id, parent_recipe_id, child_recipe_id, servings_needed, sort_order,
            created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $6)
        ",
    )
    .bind(id.to_string())
    .bind(parent_recipe_id.to_string())
    .bind(child_recipe_id.to_string())
    .bind(servings_needed)
    .bind(sort_order)
    .bind(now.to_rfc3339())
    .execute(&mut **tx)
    .await
    .map_err(|e| AppError::database(format!("Failed to insert component: {e}")))?;

    Ok(RecipeComponent {
        id,
        parent_recipe_id,
        child_recipe_id,
        servings_needed,
        sort_order,
        created_at: now,
        updated_at: now,
    })
}

/// Convert a database row to a `RecipeComponent` model
fn row_to_component(row: &SqliteRow) -> AppResult<RecipeComponent> {
    let id_str: String = row.get("id");
    let parent_str: String = row.get("parent_recipe_id");
    let child_str: String = row.get("child_recipe_id");
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    Ok(RecipeComponent {
        id: parse_uuid(&id_str)?,
        parent_recipe_id: parse_uuid(&parent_str)?,
        child_recipe_id: parse_uuid(&child_str)?,
        servings_needed: row.get("servings_needed"),
        sort_order: row.get("sort_order"),
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
            .with_timezone(&Utc),
        updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
            .with_timezone(&Utc),
    })
}

fn parse_uuid(s: &str) -> AppResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))
}
