//! Kestrel ML - small embeddable numeric-modeling engine
//!
//! Three trainable model families — regression, classification, and series
//! (time-series) classification — behind a uniform, handle-based contract.
//! A caller creates a training container, populates it, creates a model,
//! trains it, runs it against new inputs, and destroys everything it
//! created; models serialize to and restore from a JSON configuration
//! document without retraining.
//!
//! # Modules
//!
//! - [`dataset`] - Training-data containers (example sets, labeled series,
//!   series collections)
//! - [`models`] - The polymorphic model family and the sequence-alignment
//!   distance
//! - [`registry`] - Generation-checked handles with manual object lifetime
//! - [`engine`] - The boundary facade tying registries and models together
//! - [`error`] - Error taxonomy
//! - [`utils`] - Small shared helpers
//!
//! The design is deliberately synchronous and single-threaded: no operation
//! suspends or spawns concurrent work, and distinct handles denote
//! independently owned objects.

// Core error handling
pub mod error;

// Data containers and models
pub mod dataset;
pub mod models;

// Ownership and boundary surface
pub mod engine;
pub mod registry;

// Utilities
pub mod utils;

pub use error::{KestrelError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{KestrelError, Result};

    // Containers
    pub use crate::dataset::{SeriesCollection, TrainingExample, TrainingSeries, TrainingSet};

    // Models
    pub use crate::models::classification::{
        ClassificationConfig, ClassificationModel, WeightScheme,
    };
    pub use crate::models::dtw::{alignment_cost, DistanceMetric};
    pub use crate::models::regression::{RegressionConfig, RegressionModel};
    pub use crate::models::series::{CostAggregation, SeriesClassifier, SeriesConfig};
    pub use crate::models::{Model, ModelKind, ModelMetrics};

    // Boundary surface
    pub use crate::engine::{
        Engine, ModelHandle, SeriesCollectionHandle, SeriesHandle, TrainingSetHandle,
    };
    pub use crate::registry::{Handle, Registry};
}
