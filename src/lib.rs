//! # Token Machine Library
//!
//! Loads named tokens from local files listed in a YAML config, keeps them
//! in an actor-owned store, reconciles that store with the config on a
//! timer and serves tokens over HTTP.
//!
//! Modules:
//! - `cache` — the token store actor and its messages
//! - `config` — service configuration, loading and validation
//! - `reconciler` — diff-and-apply pass and the periodic refresher
//! - `server` — HTTP endpoints for token lookups and health
//! - `context` — the application context owned by the binary

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod reconciler;
pub mod server;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::cache::token_store::TokenStore;
pub use crate::config::tokens::{ServiceConfig, TokenConfig};
pub use crate::error::TokenError;
