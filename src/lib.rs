// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Fitness Competition Tracker: score a fixed-length group fitness challenge
//!
//! This crate provides the local backend: the competition data model,
//! scoring and statistics, the one-entry-per-day activity log, JSON
//! persistence, and a small HTTP API for the UI.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{JsonStore, ProofStore};
use services::CompetitionService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub competition: CompetitionService,
    pub proofs: ProofStore,
}

impl AppState {
    /// Build the state, loading the competition document from disk.
    pub async fn load(config: Config) -> Self {
        let competition = CompetitionService::load(JsonStore::new(&config.data_file)).await;
        let proofs = ProofStore::new(&config.proofs_dir);
        Self {
            config,
            competition,
            proofs,
        }
    }
}
