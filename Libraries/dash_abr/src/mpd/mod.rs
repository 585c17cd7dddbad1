//! DASH manifest data structures (MPD and related types).
//! A parsed manifest is flattened into a set of representations, each owning the
//! playback-ordered queue of segments it can serve.

pub mod base_url;
pub mod element;
pub mod parser;
pub mod validator;

use crate::segment::queue::SegmentQueue;
use crate::segment::{Initialization, Segment};

/// A single quality variant with its own segment sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Representation {
    id: u64,
    /// Declared bandwidth in bits per second. Only used to match a measured bandwidth.
    bandwidth: u64,
    initialization: Option<Initialization>,
    segments: SegmentQueue,
}

impl Representation {
    pub fn new(id: u64, bandwidth: u64) -> Self {
        Self {
            id,
            bandwidth,
            initialization: None,
            segments: SegmentQueue::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn bandwidth(&self) -> u64 {
        self.bandwidth
    }

    pub fn initialization(&self) -> Option<&Initialization> {
        self.initialization.as_ref()
    }

    pub fn segments(&self) -> &SegmentQueue {
        &self.segments
    }

    pub(crate) fn set_initialization(&mut self, initialization: Initialization) {
        self.initialization = Some(initialization);
    }

    pub(crate) fn push_segment(&mut self, segment: Segment) {
        self.segments.push_back(segment);
    }

    pub(crate) fn pop_segment(&mut self) -> Option<Segment> {
        self.segments.pop_front()
    }
}

/// All representations of one manifest load, ordered ascending by declared bandwidth.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepresentationSet {
    representations: Vec<Representation>,
}

impl RepresentationSet {
    pub fn new(mut representations: Vec<Representation>) -> Self {
        // Stable, so equal bandwidths keep manifest order
        representations.sort_by_key(|r| r.bandwidth);
        Self { representations }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Representation> {
        self.representations.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Representation> {
        self.representations.get(index)
    }

    pub fn len(&self) -> usize {
        self.representations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.representations.is_empty()
    }

    /// Pops the front segment of the representation at `index`.
    pub fn dequeue(&mut self, index: usize) -> Option<Segment> {
        self.representations.get_mut(index)?.pop_segment()
    }

    /// Remaining queue length of every representation, in iteration order.
    pub fn remaining(&self) -> Vec<usize> {
        self.representations.iter().map(|r| r.segments.len()).collect()
    }

    pub fn initializations(&self) -> impl Iterator<Item = &Initialization> {
        self.representations.iter().filter_map(|r| r.initialization.as_ref())
    }
}

/// Everything a manifest load produces.
#[derive(Debug, Clone, Default)]
pub struct MpdMetadata {
    /// `mediaPresentationDuration` in seconds, zero when absent.
    pub presentation_duration: f64,
    /// `minBufferTime` in seconds.
    pub min_buffer_time: f64,
    /// Largest `SegmentList` duration seen, in seconds.
    pub max_segment_duration: f64,
    pub representations: RepresentationSet,
}
