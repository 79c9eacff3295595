// ABOUTME: Database connection management and schema migrations
// ABOUTME: Wraps a SQLite pool and creates the recipes and recipe_components tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Sous-Chef

//! # Database Management
//!
//! This module provides database functionality for the Sous-Chef core.
//! It owns the connection pool and the schema for recipes and their
//! component edges; the per-table operations live in the manager modules.

mod components;
mod recipes;

/// Test helpers for creating in-memory database instances
pub mod test_utils;

pub use components::ComponentsManager;
pub use recipes::RecipesManager;

use crate::errors::{AppError, AppResult};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Pool, Sqlite, SqlitePool};
use std::str::FromStr;

/// Database manager for recipe and component storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    pub async fn new(database_url: &str) -> AppResult<Self> {
        // Component edges declare ON DELETE CASCADE against recipes;
        // SQLite only honors it with foreign keys switched on, and the
        // pragma is per-connection, so it goes into the connect options.
        let connection_options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::database(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(connection_options).await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// A recipes manager bound to this database
    #[must_use]
    pub fn recipes(&self) -> RecipesManager {
        RecipesManager::new(self.pool.clone())
    }

    /// A components manager bound to this database
    #[must_use]
    pub fn components(&self) -> ComponentsManager {
        ComponentsManager::new(self.pool.clone())
    }

    /// Run database migrations
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_recipes().await?;
        self.migrate_components().await?;
        Ok(())
    }

    /// Create the recipes table
    async fn migrate_recipes(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipes (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                servings REAL,
                prep_time_minutes INTEGER,
                cook_time_minutes INTEGER,
                ingredients TEXT NOT NULL DEFAULT '[]',
                instructions TEXT NOT NULL DEFAULT '[]',
                tags TEXT NOT NULL DEFAULT '[]',
                nutrition TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create the recipe_components table
    ///
    /// The UNIQUE(parent, child) constraint and the servings CHECK are
    /// schema backstops behind the in-code validation; edges cascade away
    /// when either endpoint recipe is deleted.
    async fn migrate_components(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipe_components (
                id TEXT PRIMARY KEY,
                parent_recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                child_recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                servings_needed REAL NOT NULL CHECK (servings_needed > 0),
                sort_order INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(parent_recipe_id, child_recipe_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_recipe_components_parent
            ON recipe_components(parent_recipe_id)
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_recipe_components_child
            ON recipe_components(child_recipe_id)
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
