//! Natural cubic spline through 3D knots.
//!
//! Second derivatives are zero at both ends. The interior second
//! derivatives come from the usual tridiagonal continuity system, solved
//! with the Thomas algorithm (the matrix is strictly diagonally dominant,
//! so no pivoting is needed).

use nalgebra::{Point3, Vector3};

/// Piecewise cubic interpolant, one cubic per knot interval.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    times: Vec<f64>,
    values: Vec<Vector3<f64>>,
    /// Second derivative at each knot.
    moments: Vec<Vector3<f64>>,
}

impl CubicSpline {
    /// Fit through `knots`, which must be non-empty with strictly
    /// increasing times.
    pub(crate) fn fit(knots: &[(f64, Point3<f64>)]) -> Self {
        let times: Vec<f64> = knots.iter().map(|(t, _)| *t).collect();
        let values: Vec<Vector3<f64>> = knots.iter().map(|(_, p)| p.coords).collect();
        let n = times.len();
        let mut moments = vec![Vector3::zeros(); n];

        if n > 2 {
            let h: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();
            let slope = |i: usize| (values[i + 1] - values[i]) / h[i];

            // Forward sweep over interior knots 1..n-1.
            let mut c_prime = vec![0.0; n];
            let mut d_prime = vec![Vector3::zeros(); n];
            for i in 1..n - 1 {
                let sub = h[i - 1];
                let diag = 2.0 * (h[i - 1] + h[i]);
                let rhs = (slope(i) - slope(i - 1)) * 6.0;
                let m = diag - sub * c_prime[i - 1];
                c_prime[i] = h[i] / m;
                d_prime[i] = (rhs - d_prime[i - 1] * sub) / m;
            }

            // Back substitution; moments[n - 1] stays zero.
            for i in (1..n - 1).rev() {
                moments[i] = d_prime[i] - moments[i + 1] * c_prime[i];
            }
        }

        Self {
            times,
            values,
            moments,
        }
    }

    pub fn knot_times(&self) -> &[f64] {
        &self.times
    }

    /// Evaluate at `t`, clamped to the knot range. Exact at every knot.
    #[allow(clippy::float_cmp)]
    pub fn evaluate(&self, t: f64) -> Point3<f64> {
        let last = self.times.len() - 1;
        if t.is_nan() || t <= self.times[0] {
            return Point3::from(self.values[0]);
        }
        if t >= self.times[last] {
            return Point3::from(self.values[last]);
        }

        // First knot strictly after t; 1..=last given the clamps above.
        let hi = self.times.partition_point(|&k| k <= t);
        let lo = hi - 1;
        if self.times[lo] == t {
            return Point3::from(self.values[lo]);
        }

        let h = self.times[hi] - self.times[lo];
        let a = self.times[hi] - t;
        let b = t - self.times[lo];
        let (m_lo, m_hi) = (self.moments[lo], self.moments[hi]);
        let (y_lo, y_hi) = (self.values[lo], self.values[hi]);

        let v = m_lo * (a * a * a / (6.0 * h))
            + m_hi * (b * b * b / (6.0 * h))
            + (y_lo / h - m_lo * (h / 6.0)) * a
            + (y_hi / h - m_hi * (h / 6.0)) * b;
        Point3::from(v)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn knots() -> Vec<(f64, Point3<f64>)> {
        vec![
            (0.0, Point3::new(0.5, 0.0, 0.0)),
            (5.0, Point3::new(-0.4, 0.4, 0.5)),
            (10.0, Point3::new(-0.4, 0.1, 0.2)),
            (15.0, Point3::new(0.0, -0.3, 0.6)),
            (20.0, Point3::new(0.5, 0.0, 0.0)),
        ]
    }

    #[test]
    fn passes_through_every_knot() {
        let spline = CubicSpline::fit(&knots());
        for (t, p) in knots() {
            assert_relative_eq!(spline.evaluate(t), p, epsilon = 1e-12);
        }
    }

    #[test]
    fn two_knots_are_linear() {
        let spline = CubicSpline::fit(&[
            (0.0, Point3::new(0.0, 0.0, 0.0)),
            (10.0, Point3::new(10.0, -2.0, 4.0)),
        ]);
        assert_relative_eq!(spline.evaluate(2.5), Point3::new(2.5, -0.5, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn reproduces_straight_line_through_many_knots() {
        // Collinear, evenly timed knots: all moments vanish.
        let line: Vec<_> = (0..6)
            .map(|i| {
                let t = f64::from(i);
                (t, Point3::new(2.0 * t, -t, 0.5))
            })
            .collect();
        let spline = CubicSpline::fit(&line);
        assert_relative_eq!(spline.evaluate(3.7), Point3::new(7.4, -3.7, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn smooth_across_interior_knot() {
        let spline = CubicSpline::fit(&knots());
        let eps = 1e-6;
        let left = (spline.evaluate(5.0) - spline.evaluate(5.0 - eps)) / eps;
        let right = (spline.evaluate(5.0 + eps) - spline.evaluate(5.0)) / eps;
        assert_relative_eq!(left, right, epsilon = 1e-4);
    }

    #[test]
    fn clamps_outside_range() {
        let spline = CubicSpline::fit(&knots());
        assert_relative_eq!(spline.evaluate(-3.0), Point3::new(0.5, 0.0, 0.0));
        assert_relative_eq!(spline.evaluate(99.0), Point3::new(0.5, 0.0, 0.0));
        assert_eq!(spline.knot_times().len(), 5);
    }
}
