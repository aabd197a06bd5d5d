//! Labeled time-series containers for sequence classification

use serde::{Deserialize, Serialize};

/// One labeled, ordered sequence of feature vectors.
///
/// Each frame is one time step. Frames may be appended with varying lengths;
/// a series used for classification should keep its feature dimensionality
/// consistent across its own time steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSeries {
    frames: Vec<Vec<f64>>,
    label: String,
}

impl TrainingSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one time step, copying the feature vector
    pub fn add_frame(&mut self, features: &[f64]) {
        self.frames.push(features.to_vec());
    }

    pub fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn frames(&self) -> &[Vec<f64>] {
        &self.frames
    }

    /// Number of time steps
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Ordered collection of training series, stored by value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesCollection {
    series: Vec<TrainingSeries>,
}

impl SeriesCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a copy of the series.
    ///
    /// Later mutation of the original does not reach the stored copy.
    pub fn add(&mut self, series: &TrainingSeries) {
        self.series.push(series.clone());
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn series(&self) -> &[TrainingSeries] {
        &self.series
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrainingSeries> {
        self.series.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_frames_and_label() {
        let mut series = TrainingSeries::new();
        series.add_frame(&[0.1, 0.2]);
        series.add_frame(&[0.3, 0.4]);
        series.set_label("gesture");

        assert_eq!(series.len(), 2);
        assert_eq!(series.label(), "gesture");
        assert_eq!(series.frames()[1], vec![0.3, 0.4]);
    }

    #[test]
    fn test_collection_stores_by_value() {
        let mut series = TrainingSeries::new();
        series.add_frame(&[1.0]);
        series.set_label("a");

        let mut collection = SeriesCollection::new();
        collection.add(&series);

        // Mutating the original must not reach the stored copy
        series.add_frame(&[2.0]);
        series.set_label("b");

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.series()[0].len(), 1);
        assert_eq!(collection.series()[0].label(), "a");
    }
}
