// Selection policies: turn an evaluation curve into a recommended K.
//
// The sweep never decides on a topic count by itself. Policies only read the
// points, so the same curve can be judged several ways side by side.

use serde::Serialize;

use super::sweep::{EvaluationPoint, SweepReport};

/// Picks a topic count from a K-ascending evaluation curve.
pub trait SelectionPolicy {
    fn name(&self) -> &str;

    /// The chosen K, or `None` for an empty curve.
    fn select(&self, points: &[EvaluationPoint]) -> Option<usize>;
}

/// Lowest value wins; the smallest K wins ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgMin;

impl SelectionPolicy for ArgMin {
    fn name(&self) -> &str {
        "argmin"
    }

    fn select(&self, points: &[EvaluationPoint]) -> Option<usize> {
        best_by(points, |candidate, best| candidate < best)
    }
}

/// Highest value wins; the smallest K wins ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgMax;

impl SelectionPolicy for ArgMax {
    fn name(&self) -> &str {
        "argmax"
    }

    fn select(&self, points: &[EvaluationPoint]) -> Option<usize> {
        best_by(points, |candidate, best| candidate > best)
    }
}

/// Strict improvement keeps the earliest (smallest K) point on ties.
fn best_by(points: &[EvaluationPoint], better: impl Fn(f64, f64) -> bool) -> Option<usize> {
    points
        .iter()
        .filter(|p| p.value.is_finite())
        .fold(None::<&EvaluationPoint>, |best, p| match best {
            Some(b) if !better(p.value, b.value) => Some(b),
            _ => Some(p),
        })
        .map(|p| p.k)
}

/// The point farthest from the straight line joining the curve's endpoints.
///
/// Both axes are rescaled to `[0, 1]` first so the result does not depend on
/// the metric's units. Curves with fewer than three points have no knee; the
/// first K is returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElbowPolicy;

impl SelectionPolicy for ElbowPolicy {
    fn name(&self) -> &str {
        "elbow"
    }

    fn select(&self, points: &[EvaluationPoint]) -> Option<usize> {
        let points: Vec<&EvaluationPoint> =
            points.iter().filter(|p| p.value.is_finite()).collect();
        let (first, last) = (*points.first()?, *points.last()?);
        if points.len() < 3 {
            return Some(first.k);
        }

        let (k_min, k_span) = (first.k as f64, (last.k - first.k).max(1) as f64);
        let v_min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
        let v_max = points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
        let v_span = if v_max > v_min { v_max - v_min } else { 1.0 };
        let scale = |p: &EvaluationPoint| ((p.k as f64 - k_min) / k_span, (p.value - v_min) / v_span);

        let (x0, y0) = scale(first);
        let (x1, y1) = scale(last);
        let (dx, dy) = (x1 - x0, y1 - y0);
        let chord = (dx * dx + dy * dy).sqrt();
        if chord == 0.0 {
            return Some(first.k);
        }

        let mut best = (first.k, f64::NEG_INFINITY);
        for &p in &points {
            let (x, y) = scale(p);
            let distance = (dy * (x - x0) - dx * (y - y0)).abs() / chord;
            if distance > best.1 {
                best = (p.k, distance);
            }
        }
        Some(best.0)
    }
}

/// Both sweep recommendations side by side. Either sweep may be absent when
/// only one was run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectionSummary {
    pub likelihood: Option<SweepReport>,
    pub coherence: Option<SweepReport>,
}

impl SelectionSummary {
    pub fn new(likelihood: Option<SweepReport>, coherence: Option<SweepReport>) -> Self {
        Self {
            likelihood,
            coherence,
        }
    }

    /// Arg-min of the log-likelihood curve.
    pub fn likelihood_k(&self) -> Option<usize> {
        self.likelihood.as_ref().and_then(SweepReport::recommended_k)
    }

    /// Arg-max of the coherence curve.
    pub fn coherence_k(&self) -> Option<usize> {
        self.coherence.as_ref().and_then(SweepReport::recommended_k)
    }

    /// Knee of the log-likelihood curve.
    pub fn elbow_k(&self) -> Option<usize> {
        self.likelihood
            .as_ref()
            .and_then(|r| r.recommend_with(&ElbowPolicy))
    }
}
