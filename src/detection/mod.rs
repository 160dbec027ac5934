//! Signal-based classification
//!
//! [`Classifier`] drives a run: it checks the project root, scores every
//! category of a catalog through the [`ScoringEngine`], which evaluates each
//! signal with a [`SignalProbe`], then ranks the scores into a
//! [`DetectionReport`].

pub mod classifier;
pub mod probe;
pub mod report;
pub mod scoring;

pub use classifier::Classifier;
pub use probe::SignalProbe;
pub use report::{Artifact, BestCategory, DetectionReport, Evidence, RankedCategory};
pub use scoring::{confidence_percent, CategoryScore, ScoringEngine};
