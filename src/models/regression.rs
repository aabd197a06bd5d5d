//! Multi-output linear regression
//!
//! Fits a linear map from input vectors to output vectors by normal
//! equations: Cholesky solve with a Gauss-Jordan fallback for near-singular
//! systems. The fit is closed-form and deterministic, so the learned state is
//! a pure function of the training set and config.

use std::time::Instant;

use ndarray::{aview1, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::TrainingSet;
use crate::error::{KestrelError, Result};
use crate::models::ModelMetrics;

/// Regression configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionConfig {
    /// L2 regularization strength (0.0 = ordinary least squares)
    pub alpha: f64,
    /// Whether to fit an intercept term
    pub fit_intercept: bool,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            alpha: 0.0,
            fit_intercept: true,
        }
    }
}

impl RegressionConfig {
    /// Set regularization strength (ridge regression)
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Enable/disable fitting an intercept
    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }
}

/// Linear regression model with vector-valued outputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionModel {
    config: RegressionConfig,
    /// Fitted weights, one column per output dimension
    weights: Option<Array2<f64>>,
    intercept: Option<Array1<f64>>,
    n_features: usize,
    n_outputs: usize,
    metrics: Option<ModelMetrics>,
    is_fitted: bool,
}

impl Default for RegressionModel {
    fn default() -> Self {
        Self::new(RegressionConfig::default())
    }
}

impl RegressionModel {
    pub fn new(config: RegressionConfig) -> Self {
        Self {
            config,
            weights: None,
            intercept: None,
            n_features: 0,
            n_outputs: 0,
            metrics: None,
            is_fitted: false,
        }
    }

    /// Fit the model to a training set.
    ///
    /// Fails on an empty set or inconsistent example arities; the model stays
    /// untrained in that case.
    pub fn train(&mut self, set: &TrainingSet) -> Result<()> {
        let start = Instant::now();
        let (x, y) = set.to_arrays()?;
        let n_samples = x.nrows();
        let n_features = x.ncols();
        let n_outputs = y.ncols();

        // Center data when fitting the intercept
        let (x_work, y_work, x_mean, y_mean) = if self.config.fit_intercept {
            let x_mean = x.mean_axis(Axis(0)).ok_or_else(|| {
                KestrelError::ComputationError("empty input matrix".to_string())
            })?;
            let y_mean = y.mean_axis(Axis(0)).ok_or_else(|| {
                KestrelError::ComputationError("empty output matrix".to_string())
            })?;
            let x_centered = &x - &x_mean.clone().insert_axis(Axis(0));
            let y_centered = &y - &y_mean.clone().insert_axis(Axis(0));
            (x_centered, y_centered, Some(x_mean), Some(y_mean))
        } else {
            (x.clone(), y.clone(), None, None)
        };

        // Normal equations: (X^T X + alpha*I) W = X^T Y
        let mut xtx = x_work.t().dot(&x_work);
        if self.config.alpha > 0.0 {
            for i in 0..n_features {
                xtx[[i, i]] += self.config.alpha;
            }
        }
        let xty = x_work.t().dot(&y_work);

        let weights = solve_normal_equations(&xtx, &xty)?;

        let intercept = match (x_mean, y_mean) {
            (Some(x_mean), Some(y_mean)) => &y_mean - &x_mean.dot(&weights),
            _ => Array1::zeros(n_outputs),
        };

        // Training-set fit quality
        let mut predictions = x.dot(&weights);
        predictions += &intercept;
        let mut metrics = ModelMetrics::compute_regression(&y, &predictions);
        metrics.training_time_secs = start.elapsed().as_secs_f64();
        metrics.n_features = n_features;

        debug!(
            n_samples,
            n_features, n_outputs, "fitted linear regression model"
        );

        self.weights = Some(weights);
        self.intercept = Some(intercept);
        self.n_features = n_features;
        self.n_outputs = n_outputs;
        self.metrics = Some(metrics);
        self.is_fitted = true;
        Ok(())
    }

    /// Run the model on one input vector.
    ///
    /// Fails with [`KestrelError::ModelNotFitted`] before training and with a
    /// shape error when the input arity differs from the learned one. The
    /// output length always equals the learned output arity.
    pub fn run(&self, input: &[f64]) -> Result<Vec<f64>> {
        let weights = self.weights.as_ref().ok_or(KestrelError::ModelNotFitted)?;
        if input.len() != self.n_features {
            return Err(KestrelError::ShapeError {
                expected: format!("{} inputs", self.n_features),
                actual: format!("{} inputs", input.len()),
            });
        }

        let mut output = aview1(input).dot(weights);
        if let Some(intercept) = &self.intercept {
            output += intercept;
        }
        Ok(output.to_vec())
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Learned output arity (0 before training)
    pub fn output_arity(&self) -> usize {
        self.n_outputs
    }

    pub fn metrics(&self) -> Option<&ModelMetrics> {
        self.metrics.as_ref()
    }
}

/// Solve (X^T X) W = X^T Y for W, one output column at a time.
///
/// Tries Cholesky first, retries once with a small ridge when the matrix is
/// not positive definite, then falls back to an explicit Gauss-Jordan
/// inverse.
fn solve_normal_equations(xtx: &Array2<f64>, xty: &Array2<f64>) -> Result<Array2<f64>> {
    let n = xtx.nrows();

    let factor = cholesky_factor(xtx).or_else(|| {
        let ridge = 1e-8 * xtx.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
        let mut regularized = xtx.clone();
        for i in 0..n {
            regularized[[i, i]] += ridge;
        }
        cholesky_factor(&regularized)
    });

    if let Some(l) = factor {
        let mut weights = Array2::zeros((n, xty.ncols()));
        for (k, rhs) in xty.axis_iter(Axis(1)).enumerate() {
            let solution = solve_with_factor(&l, &rhs.to_owned());
            weights.column_mut(k).assign(&solution);
        }
        return Ok(weights);
    }

    match matrix_inverse(xtx) {
        Some(inverse) => Ok(inverse.dot(xty)),
        None => Err(KestrelError::ComputationError(
            "normal-equation matrix is singular".to_string(),
        )),
    }
}

/// Cholesky decomposition A = L * L^T; None if A is not positive definite
fn cholesky_factor(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return None;
    }

    let mut l: Array2<f64> = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }
    Some(l)
}

/// Solve L * L^T * x = b by forward then backward substitution
fn solve_with_factor(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();

    // Forward substitution: L * y = b
    let mut y: Array1<f64> = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x: Array1<f64> = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    x
}

/// Gauss-Jordan matrix inversion fallback for small systems
fn matrix_inverse(m: &Array2<f64>) -> Option<Array2<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    // Augmented matrix [M | I]
    let mut aug: Array2<f64> = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = m[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        // Partial pivoting
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }
        if max_row != col {
            for j in 0..2 * n {
                let tmp = aug[[col, j]];
                aug[[col, j]] = aug[[max_row, j]];
                aug[[max_row, j]] = tmp;
            }
        }

        if aug[[col, col]].abs() < 1e-10 {
            return None;
        }

        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..2 * n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    let mut inverse = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            inverse[[i, j]] = aug[[i, n + j]];
        }
    }
    Some(inverse)
}
