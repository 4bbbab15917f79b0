//! # Sinky
//!
//! Task management API with AI-assisted task generation.
//!
//! The service exposes a small CRUD surface over a single SQLite `tasks`
//! table, plus two AI endpoints that turn free text into structured task
//! records via the Gemini API. Untrusted model output goes through a
//! validation pipeline before anything is persisted:
//!
//! ```text
//! Prompt Builder -> Model Invocation -> Response Normalizer
//!                -> Schema Validator -> result | Error Classifier
//! ```
//!
//! ## Modules
//! - `ai`: the generation pipeline (prompting, provider client, validation)
//! - `api`: axum routes and handlers
//! - `task`: task entity, enums, domain rules, SQLite store
//! - `config`: environment-backed configuration
//! - `db`: SQLite bootstrap

pub mod ai;
pub mod api;
pub mod config;
pub mod db;
pub mod task;

pub use config::Config;
