//! Boundary facade over models and training containers
//!
//! An [`Engine`] owns every caller-visible object behind explicit
//! create/destroy pairs and exposes the operation set a foreign-call shim
//! would wrap. All calls are synchronous and run to completion; serializing
//! access to one engine is the caller's responsibility.
//!
//! Buffer contract: numeric retrieval operations accept a caller-allocated
//! output slice and write `min(produced, capacity)` values, reporting the
//! count written — they never overrun and never signal an error for a short
//! buffer. String-producing operations return an owned `String` whose
//! ownership transfers to the caller.

use tracing::{debug, info, warn};

use crate::dataset::{SeriesCollection, TrainingSeries, TrainingSet};
use crate::error::{KestrelError, Result};
use crate::models::classification::{ClassificationConfig, ClassificationModel};
use crate::models::regression::{RegressionConfig, RegressionModel};
use crate::models::series::{SeriesClassifier, SeriesConfig};
use crate::models::{Model, ModelKind};
use crate::registry::{Handle, Registry};

/// Handle naming a model owned by an [`Engine`]
pub type ModelHandle = Handle<Model>;
/// Handle naming a training set
pub type TrainingSetHandle = Handle<TrainingSet>;
/// Handle naming a training series
pub type SeriesHandle = Handle<TrainingSeries>;
/// Handle naming a series collection
pub type SeriesCollectionHandle = Handle<SeriesCollection>;

/// Engine owning models and training containers behind opaque handles.
///
/// Each create returns a fresh handle; each destroy invalidates exactly one
/// handle. Used-after-destroy and double-destroy fail deterministically with
/// [`KestrelError::StaleHandle`].
#[derive(Default)]
pub struct Engine {
    models: Registry<Model>,
    training_sets: Registry<TrainingSet>,
    series: Registry<TrainingSeries>,
    collections: Registry<SeriesCollection>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Model lifecycle
    // ------------------------------------------------------------------

    pub fn create_regression_model(&mut self) -> ModelHandle {
        self.create_regression_model_with(RegressionConfig::default())
    }

    pub fn create_regression_model_with(&mut self, config: RegressionConfig) -> ModelHandle {
        self.models
            .insert(Model::Regression(RegressionModel::new(config)))
    }

    pub fn create_classification_model(&mut self) -> ModelHandle {
        self.create_classification_model_with(ClassificationConfig::default())
    }

    pub fn create_classification_model_with(
        &mut self,
        config: ClassificationConfig,
    ) -> ModelHandle {
        self.models
            .insert(Model::Classification(ClassificationModel::new(config)))
    }

    pub fn create_series_classification_model(&mut self) -> ModelHandle {
        self.create_series_classification_model_with(SeriesConfig::default())
    }

    pub fn create_series_classification_model_with(
        &mut self,
        config: SeriesConfig,
    ) -> ModelHandle {
        self.models
            .insert(Model::SeriesClassification(SeriesClassifier::new(config)))
    }

    pub fn destroy_model(&mut self, model: ModelHandle) -> Result<()> {
        let destroyed = self.models.remove(model)?;
        debug!(kind = destroyed.kind().as_str(), "destroyed model");
        Ok(())
    }

    pub fn model_kind(&self, model: ModelHandle) -> Result<ModelKind> {
        Ok(self.models.get(model)?.kind())
    }

    // ------------------------------------------------------------------
    // Training sets
    // ------------------------------------------------------------------

    pub fn create_training_set(&mut self) -> TrainingSetHandle {
        self.training_sets.insert(TrainingSet::new())
    }

    pub fn destroy_training_set(&mut self, set: TrainingSetHandle) -> Result<()> {
        self.training_sets.remove(set)?;
        Ok(())
    }

    /// Append one example; both slices are copied before the call returns
    pub fn add_training_example(
        &mut self,
        set: TrainingSetHandle,
        inputs: &[f64],
        outputs: &[f64],
    ) -> Result<()> {
        self.training_sets.get_mut(set)?.add(inputs, outputs);
        Ok(())
    }

    pub fn num_training_examples(&self, set: TrainingSetHandle) -> Result<usize> {
        Ok(self.training_sets.get(set)?.len())
    }

    /// Input element read; returns 0.0 for any out-of-range index
    pub fn training_input_at(
        &self,
        set: TrainingSetHandle,
        example: usize,
        element: usize,
    ) -> Result<f64> {
        Ok(self.training_sets.get(set)?.input_at(example, element))
    }

    /// Output element read; returns 0.0 for any out-of-range index
    pub fn training_output_at(
        &self,
        set: TrainingSetHandle,
        example: usize,
        element: usize,
    ) -> Result<f64> {
        Ok(self.training_sets.get(set)?.output_at(example, element))
    }

    // ------------------------------------------------------------------
    // Training series and collections
    // ------------------------------------------------------------------

    pub fn create_training_series(&mut self) -> SeriesHandle {
        self.series.insert(TrainingSeries::new())
    }

    pub fn destroy_training_series(&mut self, series: SeriesHandle) -> Result<()> {
        self.series.remove(series)?;
        Ok(())
    }

    /// Append one time step (one feature vector) to a series
    pub fn add_series_frame(&mut self, series: SeriesHandle, features: &[f64]) -> Result<()> {
        self.series.get_mut(series)?.add_frame(features);
        Ok(())
    }

    pub fn set_series_label(&mut self, series: SeriesHandle, label: &str) -> Result<()> {
        self.series.get_mut(series)?.set_label(label);
        Ok(())
    }

    pub fn create_series_collection(&mut self) -> SeriesCollectionHandle {
        self.collections.insert(SeriesCollection::new())
    }

    pub fn destroy_series_collection(
        &mut self,
        collection: SeriesCollectionHandle,
    ) -> Result<()> {
        self.collections.remove(collection)?;
        Ok(())
    }

    /// Copy a series into a collection by value; the series handle remains
    /// live and its later mutation does not reach the stored copy
    pub fn add_series_to_collection(
        &mut self,
        collection: SeriesCollectionHandle,
        series: SeriesHandle,
    ) -> Result<()> {
        let snapshot = self.series.get(series)?.clone();
        self.collections.get_mut(collection)?.add(&snapshot);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Training
    // ------------------------------------------------------------------

    /// Train a regression or classification model on a training set.
    ///
    /// Returns `Ok(false)` when the data is rejected (empty set, ragged
    /// arities) — the model is left untrained. Errors are reserved for
    /// invalid handles and model-kind mismatch.
    pub fn train(&mut self, model: ModelHandle, set: TrainingSetHandle) -> Result<bool> {
        let data = self.training_sets.get(set)?;
        let target = self.models.get_mut(model)?;
        let kind = target.kind();

        let outcome = match target {
            Model::Regression(m) => m.train(data),
            Model::Classification(m) => m.train(data),
            Model::SeriesClassification(_) => {
                return Err(KestrelError::WrongModelKind {
                    expected: "regression or classification",
                    actual: ModelKind::SeriesClassification.as_str(),
                })
            }
        };

        Self::training_verdict(kind, data.len(), outcome)
    }

    /// Train a series-classification model on a series collection.
    ///
    /// Same verdict contract as [`Engine::train`].
    pub fn train_series(
        &mut self,
        model: ModelHandle,
        collection: SeriesCollectionHandle,
    ) -> Result<bool> {
        let data = self.collections.get(collection)?;
        let target = self.models.get_mut(model)?;

        match target {
            Model::SeriesClassification(m) => {
                let outcome = m.train(data);
                Self::training_verdict(ModelKind::SeriesClassification, data.len(), outcome)
            }
            other => Err(KestrelError::WrongModelKind {
                expected: ModelKind::SeriesClassification.as_str(),
                actual: other.kind().as_str(),
            }),
        }
    }

    fn training_verdict(kind: ModelKind, n_samples: usize, outcome: Result<()>) -> Result<bool> {
        match outcome {
            Ok(()) => {
                info!(kind = kind.as_str(), n_samples, "model trained");
                Ok(true)
            }
            Err(
                err @ (KestrelError::DataError(_)
                | KestrelError::ShapeError { .. }
                | KestrelError::TrainingError(_)),
            ) => {
                warn!(kind = kind.as_str(), error = %err, "training rejected");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    // ------------------------------------------------------------------
    // Running
    // ------------------------------------------------------------------

    /// Run a regression or classification model on an input vector.
    ///
    /// Writes at most `output.len()` values into the caller's buffer,
    /// truncating silently when the model produces more, and returns the
    /// count written. Fails on an untrained model.
    pub fn process(
        &self,
        model: ModelHandle,
        input: &[f64],
        output: &mut [f64],
    ) -> Result<usize> {
        let produced = self.models.get(model)?.run(input)?;
        Ok(write_truncated(&produced, output))
    }

    /// Clear a series model's transient per-run state, keeping its templates
    pub fn reset_series_classification(&mut self, model: ModelHandle) -> Result<()> {
        match self.models.get_mut(model)? {
            Model::SeriesClassification(m) => {
                m.reset();
                Ok(())
            }
            other => Err(KestrelError::WrongModelKind {
                expected: ModelKind::SeriesClassification.as_str(),
                actual: other.kind().as_str(),
            }),
        }
    }

    /// Classify a query series; the returned label `String` is owned by the
    /// caller
    pub fn run_series_classification(
        &mut self,
        model: ModelHandle,
        series: SeriesHandle,
    ) -> Result<String> {
        let query = self.series.get(series)?;
        match self.models.get_mut(model)? {
            Model::SeriesClassification(m) => m.run(query.frames()),
            other => Err(KestrelError::WrongModelKind {
                expected: ModelKind::SeriesClassification.as_str(),
                actual: other.kind().as_str(),
            }),
        }
    }

    /// Retrieve the per-class costs of the last series classification under
    /// the truncating buffer contract
    pub fn series_classification_costs(
        &self,
        model: ModelHandle,
        output: &mut [f64],
    ) -> Result<usize> {
        match self.models.get(model)? {
            Model::SeriesClassification(m) => Ok(write_truncated(m.costs(), output)),
            other => Err(KestrelError::WrongModelKind {
                expected: ModelKind::SeriesClassification.as_str(),
                actual: other.kind().as_str(),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// Serialize a model to its configuration document; the returned
    /// `String` is owned by the caller
    pub fn model_to_json(&self, model: ModelHandle) -> Result<String> {
        self.models.get(model)?.to_json()
    }

    /// Restore a model from a configuration document of the same kind
    pub fn model_from_json(&mut self, model: ModelHandle, json: &str) -> Result<()> {
        self.models.get_mut(model)?.restore_json(json)?;
        debug!("restored model from configuration document");
        Ok(())
    }
}

/// Write `min(values.len(), out.len())` values, preserving order, and
/// report the count written
fn write_truncated(values: &[f64], out: &mut [f64]) -> usize {
    let n = values.len().min(out.len());
    out[..n].copy_from_slice(&values[..n]);
    n
}
