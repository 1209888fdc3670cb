use crate::errors::{EBMError, EBMResult};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub type FloatValue = f64;
/// Time in years since the start of a run
pub type Time = f64;

/// A single sample of a [`TimeSeries`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub time: Time,
    /// unit: K
    pub temperature: FloatValue,
    /// unit: W / m^2
    pub outgoing_flux: FloatValue,
}

/// Temperature and emitted flux of a body sampled on a monotonic time axis.
///
/// The series is only ever extended; previously recorded samples are never modified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    time: Vec<Time>,
    temperature: Vec<FloatValue>,
    outgoing_flux: Vec<FloatValue>,
}

impl TimeSeries {
    /// Create a series holding only its initial sample
    pub fn new(initial: TimeSeriesPoint) -> Self {
        let mut series = Self::with_capacity(1);
        series.append(initial);
        series
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            time: Vec::with_capacity(capacity),
            temperature: Vec::with_capacity(capacity),
            outgoing_flux: Vec::with_capacity(capacity),
        }
    }

    /// Append a sample
    ///
    /// Fails if `point.time` is not finite or is earlier than the latest sample.
    pub fn push(&mut self, point: TimeSeriesPoint) -> EBMResult<()> {
        if !point.time.is_finite() {
            return Err(EBMError::domain("time", point.time, "must be finite"));
        }
        if let Some(latest) = self.time.last() {
            if point.time < *latest {
                return Err(EBMError::domain(
                    "time",
                    point.time,
                    "must not precede the latest sample",
                ));
            }
        }
        self.append(point);
        Ok(())
    }

    fn append(&mut self, point: TimeSeriesPoint) {
        self.time.push(point.time);
        self.temperature.push(point.temperature);
        self.outgoing_flux.push(point.outgoing_flux);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[Time] {
        &self.time
    }

    pub fn temperature(&self) -> &[FloatValue] {
        &self.temperature
    }

    pub fn outgoing_flux(&self) -> &[FloatValue] {
        &self.outgoing_flux
    }

    pub fn get(&self, index: usize) -> Option<TimeSeriesPoint> {
        Some(TimeSeriesPoint {
            time: *self.time.get(index)?,
            temperature: self.temperature[index],
            outgoing_flux: self.outgoing_flux[index],
        })
    }

    pub fn first(&self) -> Option<TimeSeriesPoint> {
        self.get(0)
    }

    pub fn latest(&self) -> Option<TimeSeriesPoint> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = TimeSeriesPoint> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }

    /// Samples as an `(n, 3)` array with columns time, temperature and outgoing flux.
    pub fn to_array(&self) -> Array2<FloatValue> {
        Array2::from_shape_fn((self.len(), 3), |(i, j)| match j {
            0 => self.time[i],
            1 => self.temperature[i],
            _ => self.outgoing_flux[i],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(time: Time, temperature: FloatValue) -> TimeSeriesPoint {
        TimeSeriesPoint {
            time,
            temperature,
            outgoing_flux: temperature * 2.0,
        }
    }

    #[test]
    fn test_push_and_get() {
        let mut series = TimeSeries::new(point(0.0, 0.0));
        series.push(point(5.0, 10.0)).unwrap();
        series.push(point(10.0, 20.0)).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.first(), Some(point(0.0, 0.0)));
        assert_eq!(series.latest(), Some(point(10.0, 20.0)));
        assert_eq!(series.get(3), None);
        assert_eq!(series.temperature(), &[0.0, 10.0, 20.0]);
    }

    #[test]
    fn test_non_monotonic_time_is_rejected() {
        let mut series = TimeSeries::new(point(5.0, 0.0));
        assert!(series.push(point(1.0, 0.0)).unwrap_err().is_domain_error());
        assert!(series.push(point(Time::NAN, 0.0)).unwrap_err().is_domain_error());
        assert_eq!(series.len(), 1);

        // Repeated times are allowed
        series.push(point(5.0, 1.0)).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_to_array() {
        let mut series = TimeSeries::new(point(0.0, 1.0));
        series.push(point(1.0, 2.0)).unwrap();

        let values = series.to_array();
        assert_eq!(values.shape(), &[2, 3]);
        assert_eq!(values[[1, 0]], 1.0);
        assert_eq!(values[[1, 1]], 2.0);
        assert_eq!(values[[1, 2]], 4.0);
    }

    #[test]
    fn test_empty() {
        let series = TimeSeries::default();
        assert!(series.is_empty());
        assert_eq!(series.latest(), None);
        assert_eq!(series.iter().count(), 0);
    }
}
