//! Core library surface for the teacher-desk client.
//!
//! The binary is a thin shell around these modules: [`api`] talks to the
//! teachers service, [`ui`] drives the terminal front-end and [`cli`] exposes
//! the same calls as one-shot subcommands.
pub mod api;
pub mod cli;
pub mod config;
pub mod export;
pub mod logging;
pub mod models;
pub mod ui;
pub mod validation;

/// The HTTP client and the shared list it keeps current.
pub use api::{ApiError, TeacherClient, TeacherStore};

/// Domain types exchanged with the service.
pub use models::{ExportFormat, FilterCriteria, Teacher, TeacherStatistics};

/// The interactive application entry point and state container.
pub use ui::{run_app, App, Route};
