//! Inclusive year ranges, kept in a normalized form: sorted, disjoint, and
//! never adjacent (`spans[i].1 + 1 < spans[i + 1].0`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

/// One inclusive `[start, end]` year range. Serializes as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearSpan(pub i32, pub i32);

impl YearSpan {
    /// Build a span from one observation, swapping reversed bounds
    pub fn observed(start: i32, end: i32) -> Self {
        if start > end {
            warn!(start, end, "Year span start after end, swapping");
            YearSpan(end, start)
        } else {
            YearSpan(start, end)
        }
    }

    pub fn start(&self) -> i32 {
        self.0
    }

    pub fn end(&self) -> i32 {
        self.1
    }
}

/// Reduce a set of years to its minimal list of contiguous runs
fn years_to_spans(years: &BTreeSet<i32>) -> Vec<YearSpan> {
    let mut spans = Vec::new();
    let mut iter = years.iter().copied();
    let Some(first) = iter.next() else {
        return spans;
    };
    let (mut low, mut last) = (first, first);
    for year in iter {
        if year != last + 1 {
            spans.push(YearSpan(low, last));
            low = year;
        }
        last = year;
    }
    spans.push(YearSpan(low, last));
    spans
}

fn covered_years(spans: &[YearSpan], years: &mut BTreeSet<i32>) {
    for span in spans {
        let (lo, hi) = if span.0 <= span.1 {
            (span.0, span.1)
        } else {
            (span.1, span.0)
        };
        years.extend(lo..=hi);
    }
}

/// Merge `incoming` into `existing`, returning the normalized union.
/// The result does not depend on input order, overlap or duplication.
pub fn merge_spans(existing: &[YearSpan], incoming: &[YearSpan]) -> Vec<YearSpan> {
    let mut years = BTreeSet::new();
    covered_years(existing, &mut years);
    covered_years(incoming, &mut years);
    years_to_spans(&years)
}

/// Spans covering `first..=last` minus the explicit `gaps` years
pub fn gaps_to_spans(first: i32, last: i32, gaps: &[i32]) -> Vec<YearSpan> {
    let YearSpan(first, last) = YearSpan::observed(first, last);
    if gaps.iter().any(|g| *g <= first || *g >= last) {
        // years seem mangled; carry on with what we have
        warn!(first, last, ?gaps, "Gap years at or outside coverage range");
    }
    let mut years: BTreeSet<i32> = (first..=last).collect();
    for gap in gaps {
        years.remove(gap);
    }
    years_to_spans(&years)
}
