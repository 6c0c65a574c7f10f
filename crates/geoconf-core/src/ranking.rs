//! Deterministic ordering and threshold filtering of a scored batch.
//!
//! Hits sort by confidence descending. Ties break ascending on, in order:
//! `parent.localadmin`, `address_parts.street`, `address_parts.number`
//! (numerically, only when both parse), and `name.default`. A tie-break whose
//! fields are missing on either side is skipped.
//!
//! Skipped tie-breaks make [`compare_results`] non-transitive across batches
//! with mixed field presence, so the batch is ordered with a merge sort that
//! never inspects the comparator for consistency.

use crate::config::ScoringConfig;
use crate::matching::parse_leading_int;
use crate::model::{FieldValues, ResultHit};
use std::cmp::Ordering;
use tracing::debug;

/// Ordering used to rank a scored batch: best confidence first, then the
/// ascending tie-breaks listed in the module docs.
#[must_use]
pub fn compare_results(a: &ResultHit, b: &ResultHit) -> Ordering {
    let by_confidence = b.confidence_or_zero().total_cmp(&a.confidence_or_zero());
    if by_confidence.is_ne() {
        return by_confidence;
    }

    if a.parent.is_some() && b.parent.is_some() {
        let diff = compare_property(a.parent_field("localadmin"), b.parent_field("localadmin"));
        if diff.is_ne() {
            return diff;
        }
    }

    if a.address_parts.is_some() && b.address_parts.is_some() {
        let diff = compare_property(a.address_part("street"), b.address_part("street"));
        if diff.is_ne() {
            return diff;
        }

        let n1 = a.address_part("number").and_then(first_int);
        let n2 = b.address_part("number").and_then(first_int);
        if let (Some(n1), Some(n2)) = (n1, n2) {
            let diff = n1.cmp(&n2);
            if diff.is_ne() {
                return diff;
            }
        }
    }

    if let (Some(a_name), Some(b_name)) = (&a.name, &b.name) {
        return compare_text(
            a_name.get("default").map(String::as_str),
            b_name.get("default").map(String::as_str),
        );
    }

    Ordering::Equal
}

/// Case-insensitive comparison of the first value on each side; equal when
/// either is missing or empty.
fn compare_property(a: Option<&FieldValues>, b: Option<&FieldValues>) -> Ordering {
    compare_text(a.and_then(FieldValues::first), b.and_then(FieldValues::first))
}

fn compare_text(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => {
            a.to_lowercase().cmp(&b.to_lowercase())
        }
        _ => Ordering::Equal,
    }
}

fn first_int(values: &FieldValues) -> Option<i64> {
    values.first().and_then(parse_leading_int)
}

/// Minimum confidence a hit must exceed to be kept, given the best confidence
/// in the batch.
#[must_use]
pub fn confidence_floor(config: &ScoringConfig, best: f64) -> f64 {
    let limit = config.min_confidence();
    match config.relative_min_confidence() {
        Some(relative) => limit.max(relative * best),
        None => limit,
    }
}

/// Stable merge sort. Each comparison only decides which element is placed
/// next, so an inconsistent `compare` yields some permutation of `items`.
pub fn stable_sort_by<T>(items: &mut Vec<T>, mut compare: impl FnMut(&T, &T) -> Ordering) {
    let mut order: Vec<usize> = (0..items.len()).collect();
    let mut scratch = order.clone();

    let view: &[T] = items;
    merge_sort(&mut order, &mut scratch, &mut |a, b| compare(&view[a], &view[b]));

    let mut slots: Vec<Option<T>> = items.drain(..).map(Some).collect();
    items.extend(order.into_iter().filter_map(|i| slots[i].take()));
}

fn merge_sort(
    order: &mut [usize],
    scratch: &mut [usize],
    compare: &mut impl FnMut(usize, usize) -> Ordering,
) {
    let len = order.len();
    if len < 2 {
        return;
    }

    let mid = len / 2;
    {
        let (left, right) = order.split_at_mut(mid);
        let (left_scratch, right_scratch) = scratch.split_at_mut(mid);
        merge_sort(left, left_scratch, compare);
        merge_sort(right, right_scratch, compare);
    }

    let (mut i, mut j) = (0, mid);
    for slot in scratch.iter_mut() {
        // Right side wins only when strictly smaller, keeping ties in input order.
        let take_right = j < len && (i >= mid || compare(order[j], order[i]).is_lt());
        if take_right {
            *slot = order[j];
            j += 1;
        } else {
            *slot = order[i];
            i += 1;
        }
    }
    order.copy_from_slice(scratch);
}

/// Sort `hits` with [`compare_results`] and drop every hit whose confidence
/// does not strictly exceed the floor. Returns the number of dropped hits.
pub fn rank_and_filter(config: &ScoringConfig, hits: &mut Vec<ResultHit>) -> usize {
    stable_sort_by(hits, compare_results);

    let Some(best) = hits.first().map(ResultHit::confidence_or_zero) else {
        return 0;
    };

    let limit = confidence_floor(config, best);
    let before = hits.len();
    hits.retain(|hit| hit.confidence_or_zero() > limit);
    let dropped = before - hits.len();

    debug!(best, limit, kept = hits.len(), dropped, "confidence filter");
    dropped
}
