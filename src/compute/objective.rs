//! Objective functions accepted by the synchronous runner.

/// Error type an objective may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A function `f: R^n -> R` to optimize.
pub trait Objective {
    fn evaluate(&mut self, point: &[f64]) -> Result<f64, BoxError>;
}

impl<F> Objective for F
where
    F: FnMut(&[f64]) -> f64,
{
    fn evaluate(&mut self, point: &[f64]) -> Result<f64, BoxError> {
        Ok(self(point))
    }
}

/// Adapter for closures that can fail.
///
/// ```
/// use harmony_search::compute::{BoxError, Fallible, Objective};
///
/// let mut objective = Fallible(|x: &[f64]| -> Result<f64, BoxError> {
///     if x[0] < 0.0 {
///         Err("negative input".into())
///     } else {
///         Ok(x[0].sqrt())
///     }
/// });
/// assert_eq!(objective.evaluate(&[4.0]).unwrap(), 2.0);
/// assert!(objective.evaluate(&[-1.0]).is_err());
/// ```
pub struct Fallible<F>(pub F);

impl<F> Objective for Fallible<F>
where
    F: FnMut(&[f64]) -> Result<f64, BoxError>,
{
    fn evaluate(&mut self, point: &[f64]) -> Result<f64, BoxError> {
        (self.0)(point)
    }
}
