//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate graph store, scheduling, calendar and persistence into
//!   designer-level operations.
//! - Keep the CLI decoupled from storage and graph details.

pub mod designer_service;
