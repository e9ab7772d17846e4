//! # SmartBin - Waste Photo Classification
//!
//! SmartBin turns a photo of a piece of waste into one of three categories
//! (Paper, Plastic, Organic) and keeps a local ledger of every scan.
//!
//! ## Features
//!
//! - **Remote classification with fallback**: photos are uploaded to a
//!   classification service; on any failure a local generator answers, so
//!   a scan always ends with a category
//! - **Durable ledger**: one SQLite row per completed scan, newest first,
//!   filterable by category name
//! - **Single-flight workflow**: at most one scan in progress, observable
//!   through a watch channel
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use smartbin::classifier::{ClassificationService, MockClassifier};
//! use smartbin::storage::{ResultStore, SqliteStore};
//! use smartbin::types::ImageHandle;
//! use smartbin::workflow::ScanWorkflow;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(SqliteStore::open("waste.db")?);
//!     store.initialize().await?;
//!
//!     let classifier = Arc::new(ClassificationService::offline(MockClassifier::new()));
//!     let workflow = ScanWorkflow::new(store, classifier);
//!
//!     let outcome = workflow.start_with_image(ImageHandle::new("bottle.jpg")).await?;
//!     println!("{}", outcome.classification);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`types`] - Core type definitions with newtype patterns for type safety
//! - [`capture`] - Image acquisition behind the `ImageSource` trait
//! - [`classifier`] - Remote classifier, fallback generator and the service
//!   composing them
//! - [`storage`] - The scan ledger
//! - [`workflow`] - The scan state machine
//! - [`weather`] - Current weather lookups
//! - [`config`] - Paths and settings
//! - [`error`] - Comprehensive error types
//! - [`output`] - Output formatting utilities

pub mod capture;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod storage;
pub mod types;
pub mod weather;
pub mod workflow;

// Re-export commonly used types
pub use classifier::{ClassificationResult, ClassificationService, Classifier};
pub use error::{CliError, FailedStep, StorageError, WorkflowError};
pub use storage::{ResultStore, ScanRecord};
pub use types::{Category, ImageHandle, RecordId, Source};
pub use workflow::{ScanWorkflow, WorkflowState};
