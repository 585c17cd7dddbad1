use super::Segment;
use std::collections::VecDeque;

/// Playback-ordered segments of one representation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentQueue {
    segments: VecDeque<Segment>,
}

impl SegmentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_back(&mut self, segment: Segment) {
        self.segments.push_back(segment);
    }

    pub fn peek_front(&self) -> Option<&Segment> {
        self.segments.front()
    }

    pub fn pop_front(&mut self) -> Option<Segment> {
        self.segments.pop_front()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
