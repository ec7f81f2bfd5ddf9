//! Student Performance Intelligence Dashboard.
//!
//! Collects a student's marks and profile, predicts a letter grade with a
//! pre-trained classifier, and renders a radar chart with rule-based
//! recommendations.

pub mod analysis;
pub mod api;
pub mod config;
pub mod data;
pub mod encoding;
pub mod error;
pub mod features;
pub mod model;
pub mod radar;
pub mod recommendations;

pub use analysis::{analyze, analyze_student, AnalysisReport};
pub use data::{Grade, StudentInput};
pub use error::{DashboardError, Result};
pub use model::{ModelArtifacts, ModelStore};
