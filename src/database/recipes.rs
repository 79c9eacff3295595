// ABOUTME: Database operations for recipe records
// ABOUTME: Handles recipe create/get/get_many/delete used by the component subsystem
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Sous-Chef

use crate::errors::{AppError, AppResult};
use crate::models::{CreateRecipeRequest, NutritionInfo, Recipe, RecipeIngredient};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Recipe database operations manager
pub struct RecipesManager {
    pool: SqlitePool,
}

impl RecipesManager {
    /// Create a new recipes manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new recipe in the database
    pub async fn create(&self, request: &CreateRecipeRequest) -> AppResult<Recipe> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let ingredients_json = serde_json::to_string(&request.ingredients)?;
        let instructions_json = serde_json::to_string(&request.instructions)?;
        let tags_json = serde_json::to_string(&request.tags)?;
        let nutrition_json = request
            .nutrition
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r"
            INSERT INTO recipes (
                id, title, description, servings, prep_time_minutes, cook_time_minutes,
                ingredients, instructions, tags, nutrition, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            ",
        )
        .bind(id.to_string())
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.servings)
        .bind(request.prep_time_minutes)
        .bind(request.cook_time_minutes)
        .bind(&ingredients_json)
        .bind(&instructions_json)
        .bind(&tags_json)
        .bind(&nutrition_json)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipe: {e}")))?;

        Ok(Recipe {
            id,
            title: request.title.clone(),
            description: request.description.clone(),
            servings: request.servings,
            prep_time_minutes: request.prep_time_minutes,
            cook_time_minutes: request.cook_time_minutes,
            ingredients: request.ingredients.clone(),
            instructions: request.instructions.clone(),
            tags: request.tags.clone(),
            nutrition: request.nutrition.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a recipe by ID
    pub async fn get(&self, recipe_id: Uuid) -> AppResult<Option<Recipe>> {
        let row = sqlx::query(
            r"
            SELECT id, title, description, servings, prep_time_minutes, cook_time_minutes,
                   ingredients, instructions, tags, nutrition, created_at, updated_at
            FROM recipes
            WHERE id = $1
            ",
        )
        .bind(recipe_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recipe: {e}")))?;

        row.as_ref().map(row_to_recipe).transpose()
    }

    /// Get several recipes by ID in one query
    ///
    /// Missing ids are simply absent from the result; callers that need
    /// existence guarantees check the returned set.
    pub async fn get_many(&self, recipe_ids: &[Uuid]) -> AppResult<Vec<Recipe>> {
        if recipe_ids.is_empty() {
            return Ok(Vec::new());
        }

        // SQLite has no array binds; expand one placeholder per id
        let placeholders = (1..=recipe_ids.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT id, title, description, servings, prep_time_minutes, cook_time_minutes, \
             ingredients, instructions, tags, nutrition, created_at, updated_at \
             FROM recipes WHERE id IN ({placeholders})"
        );

        let mut query = sqlx::query(&sql);
        for id in recipe_ids {
            query = query.bind(id.to_string());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get recipes: {e}")))?;

        rows.iter().map(row_to_recipe).collect()
    }

    /// Delete a recipe by ID
    ///
    /// Component edges referencing the recipe (as parent or child) are
    /// removed by the schema's ON DELETE CASCADE.
    pub async fn delete(&self, recipe_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete recipe: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Recipe {recipe_id}")));
        }

        Ok(())
    }
}

/// Convert a database row to a Recipe model
fn row_to_recipe(row: &SqliteRow) -> AppResult<Recipe> {
    let id_str: String = row.get("id");
    let ingredients_json: String = row.get("ingredients");
    let instructions_json: String = row.get("instructions");
    let tags_json: String = row.get("tags");
    let nutrition_json: Option<String> = row.get("nutrition");
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    let ingredients: Vec<RecipeIngredient> = serde_json::from_str(&ingredients_json)?;
    let instructions: Vec<String> = serde_json::from_str(&instructions_json)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json)?;
    let nutrition: Option<NutritionInfo> = nutrition_json
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;

    Ok(Recipe {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        title: row.get("title"),
        description: row.get("description"),
        servings: row.get("servings"),
        prep_time_minutes: row.get("prep_time_minutes"),
        cook_time_minutes: row.get("cook_time_minutes"),
        ingredients,
        instructions,
        tags,
        nutrition,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
            .with_timezone(&Utc),
        updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
            .with_timezone(&Utc),
    })
}
