//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate codec and storage calls into the collaborator-facing API.
//! - Keep presentation layers decoupled from storage details.

pub mod task_manager;
