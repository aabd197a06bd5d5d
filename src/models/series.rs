//! Series classification by nearest template
//!
//! Training memorizes every labeled series as a template; classification
//! aligns the query against each template with the sequence-alignment
//! distance and selects the label of the cheapest match. Per-class costs of
//! the last run stay readable until the next run or an explicit reset.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::SeriesCollection;
use crate::error::{KestrelError, Result};
use crate::models::dtw::{alignment_cost, DistanceMetric};

/// How template costs aggregate into one cost per class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CostAggregation {
    /// Minimum cost among the class's templates
    Min,
    /// Mean cost across the class's templates
    Mean,
}

impl Default for CostAggregation {
    fn default() -> Self {
        Self::Min
    }
}

/// Series classifier configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Pointwise distance between frames
    pub metric: DistanceMetric,
    /// Per-class cost aggregation
    pub aggregation: CostAggregation,
}

impl SeriesConfig {
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_aggregation(mut self, aggregation: CostAggregation) -> Self {
        self.aggregation = aggregation;
        self
    }
}

/// One stored labeled series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Template {
    frames: Vec<Vec<f64>>,
    label: String,
}

/// Nearest-template series classification model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesClassifier {
    config: SeriesConfig,
    templates: Vec<Template>,
    /// Distinct labels in first-appearance order; indexes the cost vector
    class_labels: Vec<String>,
    /// Per-class costs of the last run. Transient, not learned state.
    #[serde(skip)]
    last_costs: Vec<f64>,
    is_fitted: bool,
}

impl Default for SeriesClassifier {
    fn default() -> Self {
        Self::new(SeriesConfig::default())
    }
}

impl SeriesClassifier {
    pub fn new(config: SeriesConfig) -> Self {
        Self {
            config,
            templates: Vec::new(),
            class_labels: Vec::new(),
            last_costs: Vec::new(),
            is_fitted: false,
        }
    }

    /// Memorize the collection's series as labeled templates.
    ///
    /// There is no parametric fitting; training fails only on an empty
    /// collection or a series with no frames, and replaces any previously
    /// stored templates on success.
    pub fn train(&mut self, collection: &SeriesCollection) -> Result<()> {
        if collection.is_empty() {
            return Err(KestrelError::TrainingError(
                "series collection is empty".to_string(),
            ));
        }

        let mut templates = Vec::with_capacity(collection.len());
        let mut class_labels: Vec<String> = Vec::new();
        for (i, series) in collection.iter().enumerate() {
            if series.is_empty() {
                return Err(KestrelError::TrainingError(format!(
                    "series {} has no frames",
                    i
                )));
            }
            if !class_labels.iter().any(|label| label == series.label()) {
                class_labels.push(series.label().to_string());
            }
            templates.push(Template {
                frames: series.frames().to_vec(),
                label: series.label().to_string(),
            });
        }

        debug!(
            n_templates = templates.len(),
            n_classes = class_labels.len(),
            "stored series templates"
        );

        self.templates = templates;
        self.class_labels = class_labels;
        self.last_costs.clear();
        self.is_fitted = true;
        Ok(())
    }

    /// Clear transient per-run state, keeping the learned templates
    pub fn reset(&mut self) {
        self.last_costs.clear();
    }

    /// Classify a query series.
    ///
    /// Computes the alignment cost against every template, refreshes the
    /// per-class cost vector (one entry per distinct class), and returns the
    /// label of the cheapest template. Ties go to the earliest-inserted
    /// template.
    pub fn run(&mut self, query: &[Vec<f64>]) -> Result<String> {
        if !self.is_fitted {
            return Err(KestrelError::ModelNotFitted);
        }
        if query.is_empty() {
            return Err(KestrelError::DataError(
                "query series has no frames".to_string(),
            ));
        }

        let n_classes = self.class_labels.len();
        let mut best_cost = f64::INFINITY;
        let mut best_label: Option<&str> = None;

        let mut class_costs = vec![f64::INFINITY; n_classes];
        let mut class_sums = vec![0.0; n_classes];
        let mut class_counts = vec![0usize; n_classes];

        for template in &self.templates {
            let cost = alignment_cost(query, &template.frames, self.config.metric);
            let class = self
                .class_labels
                .iter()
                .position(|label| label == &template.label)
                .unwrap_or(0);

            class_costs[class] = class_costs[class].min(cost);
            class_sums[class] += cost;
            class_counts[class] += 1;

            // Strict < keeps the earliest-inserted template on ties
            if cost < best_cost {
                best_cost = cost;
                best_label = Some(&template.label);
            }
        }

        if self.config.aggregation == CostAggregation::Mean {
            for (class, sum) in class_sums.iter().enumerate() {
                if class_counts[class] > 0 {
                    class_costs[class] = sum / class_counts[class] as f64;
                }
            }
        }

        let label = best_label
            .ok_or(KestrelError::ModelNotFitted)?
            .to_string();
        self.last_costs = class_costs;
        Ok(label)
    }

    /// Per-class costs of the last run, one entry per distinct class in
    /// first-appearance order; empty before any run and after a reset
    pub fn costs(&self) -> &[f64] {
        &self.last_costs
    }

    /// Distinct class labels in cost-vector order
    pub fn class_labels(&self) -> &[String] {
        &self.class_labels
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Number of stored templates
    pub fn num_templates(&self) -> usize {
        self.templates.len()
    }
}
