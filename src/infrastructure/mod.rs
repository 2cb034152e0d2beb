//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root: repository, notifier and pipeline wiring
//! - [`config`] - Configuration loading and validation
//! - [`exchange`] - Reconnecting feed wrapper
//! - [`runtime`] - Feed session loop

pub mod bootstrap;
pub mod config;
pub mod exchange;
pub mod runtime;
