// ABOUTME: Main library entry point for the Sous-Chef recipe manager core
// ABOUTME: Compound recipe components, hierarchy reads, and nutrition aggregation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Sous-Chef

#![deny(unsafe_code)]

//! # Sous-Chef Core
//!
//! The compound-recipe component subsystem of the Sous-Chef recipe manager.
//! Recipes may reference other recipes as sub-components (a lasagna recipe
//! referencing a marinara sauce recipe), forming a directed graph over the
//! recipe table. This crate owns the invariants of that graph:
//!
//! - **Cycle prevention**: every edge insertion runs a reachability check
//!   inside the same transaction as the write, so the graph stays acyclic.
//! - **Hierarchy materialization**: the full nested component tree of a
//!   recipe, ordered and cycle-tolerant on read.
//! - **Nutrition aggregation**: a combined per-serving estimate that scales
//!   each direct component by its serving ratio, summing only known fields.
//!
//! The HTTP/RPC layer, auth, tagging UI, and AI features live outside this
//! crate and consume it through [`services::ComponentService`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use sous_chef::database::Database;
//! use sous_chef::errors::AppResult;
//! use sous_chef::services::ComponentService;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let db = Database::new("sqlite:./data/sous_chef.db").await?;
//!     let service = ComponentService::new(db);
//!
//!     // service.add_component(parent_id, child_id, 2.0).await?;
//!     Ok(())
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// Database connection, migrations, and store managers
pub mod database;

/// Unified error handling system
pub mod errors;

/// Structured logging configuration
pub mod logging;

/// Domain models
pub mod models;

/// Business logic layer
pub mod services;
