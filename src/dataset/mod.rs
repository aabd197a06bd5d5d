//! Training-data containers
//!
//! Append-only containers feeding the trainers. Every append copies the
//! caller's numeric data by value, so caller buffers may be reused or freed
//! as soon as the call returns. Indexed element reads return 0.0 out of
//! range instead of signaling an error; callers bound their iteration with
//! the count queries.

mod series;

pub use series::{SeriesCollection, TrainingSeries};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{KestrelError, Result};

/// One supervised (input vector, output vector) sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub input: Vec<f64>,
    pub output: Vec<f64>,
}

/// Ordered, append-only collection of training examples.
///
/// The container accepts examples of any arity; consistency across examples
/// is enforced by the trainers via [`TrainingSet::to_arrays`], not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingSet {
    examples: Vec<TrainingExample>,
}

impl TrainingSet {
    pub fn new() -> Self {
        Self {
            examples: Vec::new(),
        }
    }

    /// Append one example, copying both slices
    pub fn add(&mut self, inputs: &[f64], outputs: &[f64]) {
        self.examples.push(TrainingExample {
            input: inputs.to_vec(),
            output: outputs.to_vec(),
        });
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    /// Input element read with the 0.0 out-of-range sentinel.
    ///
    /// Pair with [`TrainingSet::len`] to detect exhaustion; no error is
    /// signaled for an index past the end.
    pub fn input_at(&self, example: usize, element: usize) -> f64 {
        self.examples
            .get(example)
            .and_then(|ex| ex.input.get(element))
            .copied()
            .unwrap_or(0.0)
    }

    /// Output element read with the 0.0 out-of-range sentinel
    pub fn output_at(&self, example: usize, element: usize) -> f64 {
        self.examples
            .get(example)
            .and_then(|ex| ex.output.get(element))
            .copied()
            .unwrap_or(0.0)
    }

    /// Validate arity consistency and convert to (inputs, outputs) matrices,
    /// one example per row
    pub fn to_arrays(&self) -> Result<(Array2<f64>, Array2<f64>)> {
        let first = self.examples.first().ok_or_else(|| {
            KestrelError::DataError("training set is empty".to_string())
        })?;
        let in_arity = first.input.len();
        let out_arity = first.output.len();
        if in_arity == 0 || out_arity == 0 {
            return Err(KestrelError::DataError(
                "training examples need at least one input and one output".to_string(),
            ));
        }
        for (i, example) in self.examples.iter().enumerate() {
            if example.input.len() != in_arity || example.output.len() != out_arity {
                return Err(KestrelError::ShapeError {
                    expected: format!("{}in/{}out per example", in_arity, out_arity),
                    actual: format!(
                        "{}in/{}out at example {}",
                        example.input.len(),
                        example.output.len(),
                        i
                    ),
                });
            }
        }

        let n = self.examples.len();
        let x = Array2::from_shape_fn((n, in_arity), |(r, c)| self.examples[r].input[c]);
        let y = Array2::from_shape_fn((n, out_arity), |(r, c)| self.examples[r].output[c]);
        Ok((x, y))
    }
}
