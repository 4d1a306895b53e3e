//! Transfer functions mapping scalar values to opacity and color.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A piecewise-linear scalar function defined by sorted control points.
///
/// Evaluation clamps to the first/last control point outside the covered
/// range; an empty function evaluates to 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PiecewiseFunction {
    points: Vec<(f32, f32)>,
}

impl PiecewiseFunction {
    /// Creates an empty function.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a control point, keeping the points sorted by x. A point at an
    /// existing x replaces the old value.
    pub fn add_point(&mut self, x: f32, y: f32) -> &mut Self {
        match self.points.binary_search_by(|(px, _)| px.total_cmp(&x)) {
            Ok(i) => self.points[i] = (x, y),
            Err(i) => self.points.insert(i, (x, y)),
        }
        self
    }

    /// Removes all control points.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Returns the control points.
    #[must_use]
    pub fn points(&self) -> &[(f32, f32)] {
        &self.points
    }

    /// Evaluates the function at x.
    #[must_use]
    pub fn value(&self, x: f32) -> f32 {
        match self.points.as_slice() {
            [] => 0.0,
            [(_, y)] => *y,
            points => {
                if x <= points[0].0 {
                    return points[0].1;
                }
                if x >= points[points.len() - 1].0 {
                    return points[points.len() - 1].1;
                }
                let i = points.partition_point(|(px, _)| *px <= x);
                let (x0, y0) = points[i - 1];
                let (x1, y1) = points[i];
                let t = if x1 > x0 { (x - x0) / (x1 - x0) } else { 0.0 };
                y0 + (y1 - y0) * t
            }
        }
    }
}

/// A piecewise-linear color ramp defined by sorted control points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorTransferFunction {
    points: Vec<(f32, Vec3)>,
}

impl ColorTransferFunction {
    /// Creates an empty color transfer function.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a color control point, keeping the points sorted by x. A point at
    /// an existing x replaces the old color.
    pub fn add_point(&mut self, x: f32, color: Vec3) -> &mut Self {
        match self.points.binary_search_by(|(px, _)| px.total_cmp(&x)) {
            Ok(i) => self.points[i] = (x, color),
            Err(i) => self.points.insert(i, (x, color)),
        }
        self
    }

    /// Removes all control points.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Returns the control points.
    #[must_use]
    pub fn points(&self) -> &[(f32, Vec3)] {
        &self.points
    }

    /// Samples the ramp at x.
    #[must_use]
    pub fn value(&self, x: f32) -> Vec3 {
        match self.points.as_slice() {
            [] => Vec3::ZERO,
            [(_, c)] => *c,
            points => {
                if x <= points[0].0 {
                    return points[0].1;
                }
                if x >= points[points.len() - 1].0 {
                    return points[points.len() - 1].1;
                }
                let i = points.partition_point(|(px, _)| *px <= x);
                let (x0, c0) = points[i - 1];
                let (x1, c1) = points[i];
                let t = if x1 > x0 { (x - x0) / (x1 - x0) } else { 0.0 };
                c0.lerp(c1, t)
            }
        }
    }

    /// Builds a grayscale ramp from black at `lower` to white at `upper`.
    #[must_use]
    pub fn grayscale_ramp(lower: f32, upper: f32) -> Self {
        let mut ramp = Self::new();
        ramp.add_point(lower, Vec3::ZERO).add_point(upper, Vec3::ONE);
        ramp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_function_is_zero() {
        let f = PiecewiseFunction::new();
        assert_eq!(f.value(3.0), 0.0);
    }

    #[test]
    fn test_interpolation_and_clamping() {
        let mut f = PiecewiseFunction::new();
        f.add_point(10.0, 0.0).add_point(20.0, 1.0);
        assert_eq!(f.value(5.0), 0.0);
        assert_eq!(f.value(25.0), 1.0);
        assert!((f.value(15.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_add_point_keeps_sorted() {
        let mut f = PiecewiseFunction::new();
        f.add_point(20.0, 1.0).add_point(10.0, 0.0).add_point(15.0, 0.25);
        let xs: Vec<f32> = f.points().iter().map(|(x, _)| *x).collect();
        assert_eq!(xs, vec![10.0, 15.0, 20.0]);
        assert!((f.value(12.5) - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_duplicate_x_replaces() {
        let mut f = PiecewiseFunction::new();
        f.add_point(10.0, 0.2).add_point(10.0, 0.8);
        assert_eq!(f.points().len(), 1);
        assert!((f.value(10.0) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_grayscale_ramp() {
        let ramp = ColorTransferFunction::grayscale_ramp(0.0, 100.0);
        assert_eq!(ramp.value(-5.0), Vec3::ZERO);
        assert_eq!(ramp.value(200.0), Vec3::ONE);
        let mid = ramp.value(50.0);
        assert!((mid - Vec3::splat(0.5)).length() < 1e-6);
    }
}
