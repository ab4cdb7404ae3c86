//! Incremental Jira issue sync engine.
//!
//! Pulls issues, comments, and worklogs for tracked users from Jira Cloud
//! into a local store, with durable per-project cursors so interrupted runs
//! resume where they left off.

pub mod activities;
pub mod config;
pub mod credentials;
pub mod crypto;
pub mod db;
pub mod error;
pub mod jira;
pub mod logging;
pub mod models;
pub mod repositories;
pub mod retry;
pub mod runner;
pub mod upsert;

pub use logging::init_subscriber;
