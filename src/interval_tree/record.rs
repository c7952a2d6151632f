//! A single registered interval and the shapes returned by queries.

use std::fmt::Display;

use super::error::{IntervalFault, IntervalTreeError};
use super::payload::{Endpoints, FieldKey};
use crate::Id;

/// An interval `[start, end]` with `start < end`, tagged with an id and a payload.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IntervalRecord<P> {
    id: Id,
    start: f64,
    end: f64,
    payload: P,
}

/// Midpoint of `a` and `b` that stays finite for any finite inputs.
pub(crate) fn midpoint(a: f64, b: f64) -> f64 {
    const HALF_MAX: f64 = f64::MAX / 2.0;
    if a.abs() <= HALF_MAX && b.abs() <= HALF_MAX {
        (a + b) / 2.0
    } else {
        a / 2.0 + b / 2.0
    }
}

/// Half the distance from `a` up to `b`; finite where `b - a` would overflow.
fn half_span(a: f64, b: f64) -> f64 {
    b / 2.0 - a / 2.0
}

fn finite_field<P: Endpoints>(payload: &P, key: &FieldKey) -> Result<f64, IntervalFault> {
    let value = payload
        .coordinate(key)
        .ok_or_else(|| IntervalFault::MissingField(key.clone()))?;
    if !value.is_finite() {
        return Err(IntervalFault::NotFinite {
            field: key.clone(),
            value,
        });
    }
    // Fold -0.0 into 0.0 so the endpoint index never splits equal coordinates.
    Ok(value + 0.0)
}

impl<P: Endpoints> IntervalRecord<P> {
    /// Reads `start`/`end` out of `payload` at the given keys.
    ///
    /// Fails with [`IntervalTreeError::InvalidInterval`] when either value is
    /// missing or not finite, or when `start >= end`. Zero-length intervals
    /// are rejected.
    pub fn new(
        payload: P,
        id: impl Into<Id>,
        start_key: &FieldKey,
        end_key: &FieldKey,
    ) -> Result<Self, IntervalTreeError> {
        let id = id.into();
        let bounds = finite_field(&payload, start_key).and_then(|start| {
            let end = finite_field(&payload, end_key)?;
            if start >= end {
                return Err(IntervalFault::NotIncreasing { start, end });
            }
            Ok((start, end))
        });
        match bounds {
            Ok((start, end)) => Ok(Self {
                id,
                start,
                end,
                payload,
            }),
            Err(fault) => Err(IntervalTreeError::InvalidInterval { id, fault }),
        }
    }
}

impl<P> IntervalRecord<P> {
    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn into_payload(self) -> P {
        self.payload
    }

    /// `end - start`; infinite when the interval is wider than `f64::MAX`.
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> f64 {
        midpoint(self.start, self.end)
    }

    /// Returns true if `point` ∈ `[start, end]`.
    pub fn contains(&self, point: f64) -> bool {
        self.start <= point && point <= self.end
    }

    /// Length of the intersection with `[query_start, query_end]`, never negative.
    pub fn overlap_length(&self, query_start: f64, query_end: f64) -> f64 {
        (self.end.min(query_end) - self.start.max(query_start)).max(0.0)
    }

    /// Returns true if the intersection with the query has positive length.
    ///
    /// Intervals that only touch the query at one coordinate do not overlap.
    pub fn overlaps(&self, query_start: f64, query_end: f64) -> bool {
        self.overlap_length(query_start, query_end) > 0.0
    }

    /// Point-query result.
    pub fn hit(&self) -> SearchHit<'_, P> {
        SearchHit {
            id: &self.id,
            payload: &self.payload,
        }
    }

    /// Range-query result, with coverage ratios against `[query_start, query_end]`.
    ///
    /// The caller must pass a non-empty query window.
    pub fn hit_within(&self, query_start: f64, query_end: f64) -> RangeHit<'_, P> {
        // Ratios of half spans, so windows wider than f64::MAX stay finite.
        let overlap =
            half_span(self.start.max(query_start), self.end.min(query_end)).max(0.0);
        RangeHit {
            id: &self.id,
            payload: &self.payload,
            query_coverage: overlap / half_span(query_start, query_end),
            interval_coverage: overlap / half_span(self.start, self.end),
        }
    }
}

impl<P> Display for IntervalRecord<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{:.3}, {:.3}]", self.id, self.start, self.end)
    }
}

/// An interval found by a point query.
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SearchHit<'a, P> {
    pub id: &'a Id,
    pub payload: &'a P,
}

/// An interval found by a range query.
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RangeHit<'a, P> {
    pub id: &'a Id,
    pub payload: &'a P,
    /// Fraction of the query window covered by the interval.
    #[cfg_attr(feature = "serde", serde(rename = "rate1"))]
    pub query_coverage: f64,
    /// Fraction of the interval covered by the query window.
    #[cfg_attr(feature = "serde", serde(rename = "rate2"))]
    pub interval_coverage: f64,
}

// References only; no bound on `P`.
impl<P> Clone for SearchHit<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for SearchHit<'_, P> {}

impl<P> Clone for RangeHit<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for RangeHit<'_, P> {}

#[cfg(test)]
mod tests {
    use super::*;

    const START: FieldKey = FieldKey::Index(0);
    const END: FieldKey = FieldKey::Index(1);

    fn rec(start: f64, end: f64) -> IntervalRecord<[f64; 2]> {
        IntervalRecord::new([start, end], "r", &START, &END).unwrap()
    }

    #[test]
    fn new_reads_configured_fields() {
        let r = IntervalRecord::new(
            [99.0, 10.0, 20.0],
            "a",
            &FieldKey::Index(1),
            &FieldKey::Index(2),
        )
        .unwrap();
        assert_eq!(r.id(), "a");
        assert_eq!(r.start(), 10.0);
        assert_eq!(r.end(), 20.0);
        assert_eq!(r.length(), 10.0);
        assert_eq!(r.midpoint(), 15.0);
    }

    #[test]
    fn zero_length_rejected() {
        let err = IntervalRecord::new([5.0, 5.0], "z", &START, &END).unwrap_err();
        assert_eq!(
            err,
            IntervalTreeError::InvalidInterval {
                id: "z".into(),
                fault: IntervalFault::NotIncreasing {
                    start: 5.0,
                    end: 5.0
                },
            }
        );
    }

    #[test]
    fn inverted_rejected() {
        let result = IntervalRecord::new([9.0, 1.0], "i", &START, &END);
        assert!(matches!(
            result,
            Err(IntervalTreeError::InvalidInterval {
                fault: IntervalFault::NotIncreasing { .. },
                ..
            })
        ));
    }

    #[test]
    fn missing_and_non_finite_rejected() {
        let missing = IntervalRecord::new([1.0], "m", &START, &END);
        assert!(matches!(
            missing,
            Err(IntervalTreeError::InvalidInterval {
                fault: IntervalFault::MissingField(FieldKey::Index(1)),
                ..
            })
        ));

        let nan = IntervalRecord::new([f64::NAN, 1.0], "n", &START, &END);
        assert!(matches!(
            nan,
            Err(IntervalTreeError::InvalidInterval {
                fault: IntervalFault::NotFinite { .. },
                ..
            })
        ));

        let inf = IntervalRecord::new([0.0, f64::INFINITY], "f", &START, &END);
        assert!(inf.is_err());
    }

    #[test]
    fn contains_is_closed() {
        let r = rec(10.0, 20.0);
        assert!(r.contains(10.0));
        assert!(r.contains(20.0));
        assert!(r.contains(15.0));
        assert!(!r.contains(20.5));
    }

    #[test]
    fn touching_is_not_overlapping() {
        let r = rec(20.0, 30.0);
        assert_eq!(r.overlap_length(10.0, 20.0), 0.0);
        assert!(!r.overlaps(10.0, 20.0));
        assert!(r.overlaps(10.0, 20.5));
    }

    #[test]
    fn coverage_ratios() {
        let r = rec(10.0, 20.0);

        let hit = r.hit_within(15.0, 35.0);
        assert_eq!(hit.id, "r");
        assert!((hit.query_coverage - 0.25).abs() < 1e-12);
        assert!((hit.interval_coverage - 0.5).abs() < 1e-12);

        let inside = r.hit_within(12.0, 14.0);
        assert!((inside.query_coverage - 1.0).abs() < 1e-12);
        assert!((inside.interval_coverage - 0.2).abs() < 1e-12);
    }

    #[test]
    fn midpoint_of_huge_interval_is_finite() {
        let r = rec(-1.7e308, 1.7e308);
        assert_eq!(r.midpoint(), 0.0);
        let upper = midpoint(1.6e308, 1.7e308);
        assert!(upper > 1.6e308 && upper < 1.7e308);
        assert_eq!(midpoint(-3.0, 5.0), 1.0);
        assert!(r.length().is_infinite());
    }

    #[test]
    fn coverage_of_huge_interval_is_finite() {
        let r = rec(-1.7e308, 1.7e308);
        let hit = r.hit_within(-1.0e308, 1.0e308);
        assert!((hit.query_coverage - 1.0).abs() < 1e-12);
        assert!((hit.interval_coverage - 1.0 / 1.7).abs() < 1e-12);

        let narrow = rec(0.0, 10.0);
        let wide = narrow.hit_within(-1.7e308, 1.7e308);
        assert!(wide.query_coverage > 0.0 && wide.query_coverage.is_finite());
        assert_eq!(wide.interval_coverage, 1.0);
    }

    #[test]
    fn point_hit_shape() {
        let r = rec(1.0, 2.0);
        let hit = r.hit();
        assert_eq!(hit.id, "r");
        assert_eq!(hit.payload, &[1.0, 2.0]);
    }

    #[test]
    fn display() {
        assert_eq!(rec(1.0, 2.5).to_string(), "r [1.000, 2.500]");
    }
}
