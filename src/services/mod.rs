// ABOUTME: Business logic layer over the database managers
// ABOUTME: Component mutations, hierarchy reads, and nutrition aggregation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Sous-Chef

//! Service layer: request-scoped, stateless business logic the API layer
//! calls into. Persistence stays behind the database managers.

/// Compound recipe component management
pub mod components;

/// Nutrition aggregation over materialized hierarchies
pub mod nutrition;

pub use components::ComponentService;
pub use nutrition::aggregate_nutrition;
