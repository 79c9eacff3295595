// ABOUTME: Environment-driven configuration for the Sous-Chef core
// ABOUTME: Loads database and logging settings from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Sous-Chef

//! Environment-only configuration: everything the core needs at startup
//! comes from environment variables with development-friendly defaults.

use crate::errors::AppResult;
use crate::logging::LoggingConfig;
use std::env;
use tracing::info;

/// Default SQLite database location for development
const DEFAULT_DATABASE_URL: &str = "sqlite:./data/sous_chef.db";

/// Top-level configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Database connection URL (`DATABASE_URL`)
    pub database_url: String,
    /// Logging configuration (`RUST_LOG`, `LOG_FORMAT`, ...)
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());

        Ok(Self {
            database_url,
            logging: LoggingConfig::from_env(),
        })
    }
}
