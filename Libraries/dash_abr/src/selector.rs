//! Bandwidth-driven candidate selection.
//!
//! Every call advances all representations by one segment, so call N always works on
//! timeline position N no matter which representations were chosen before. This assumes
//! the representations are segment-aligned; alignment is not checked against timestamps.

use crate::error::{DashError, DashResult};
use crate::mpd::RepresentationSet;
use crate::segment::Segment;
use tracing::trace;

/// Index of the representation whose declared bandwidth is closest to `bandwidth`.
/// Ties go to the first one in iteration order. `None` for an empty set.
pub fn bandwidth_match(representations: &RepresentationSet, bandwidth: f64) -> Option<usize> {
    let bandwidth = if bandwidth.is_finite() { bandwidth } else { 0.0 };
    representations
        .iter()
        .map(|r| (r.bandwidth() as f64 - bandwidth).abs())
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (index, distance)| match best {
            Some((_, best_distance)) if best_distance <= distance => best,
            _ => Some((index, distance)),
        })
        .map(|(index, _)| index)
}

/// Picks the segment to fetch next for a measured bandwidth (bits per second).
///
/// The front segment of every other representation is dropped in the same round. Fails
/// with [`DashError::Exhausted`] when the chosen representation has nothing left.
pub fn candidate(representations: &mut RepresentationSet, bandwidth: f64) -> DashResult<Segment> {
    let selected = bandwidth_match(representations, bandwidth).ok_or(DashError::Exhausted)?;

    let mut candidate = None;
    for index in 0..representations.len() {
        let front = representations.dequeue(index);
        if index == selected {
            candidate = front;
        }
    }

    let segment = candidate.ok_or(DashError::Exhausted)?;
    trace!(
        "Selected representation {} ({} bps) for measured {} bps",
        segment.representation_id,
        segment.bandwidth,
        bandwidth
    );
    Ok(segment)
}
