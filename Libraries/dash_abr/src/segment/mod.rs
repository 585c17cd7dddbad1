//! Downloadable segment descriptors produced by the manifest parser.

pub mod fetcher;
pub mod queue;

use crate::error::{DashError, DashResult};

/// Inclusive byte range of a resource. `0-0` stands for the whole resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub const WHOLE: ByteRange = ByteRange { start: 0, end: 0 };

    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn is_whole(&self) -> bool {
        *self == Self::WHOLE
    }

    /// Parses a `start-end` attribute value. An absent attribute yields [`ByteRange::WHOLE`].
    pub fn parse(
        value: Option<&str>,
        element: &'static str,
        attribute: &'static str,
    ) -> DashResult<Self> {
        let Some(value) = value else {
            return Ok(Self::WHOLE);
        };
        let invalid = || DashError::InvalidAttribute {
            element,
            attribute,
            value: value.to_string(),
        };
        let (start, end) = value.split_once('-').ok_or_else(invalid)?;
        let start = start.trim().parse::<u64>().map_err(|_| invalid())?;
        let end = end.trim().parse::<u64>().map_err(|_| invalid())?;
        Ok(Self { start, end })
    }

    /// Value for an HTTP `Range` header, or `None` when the whole resource is wanted.
    pub fn header_value(&self) -> Option<String> {
        if self.is_whole() {
            None
        } else {
            Some(format!("bytes={}-{}", self.start, self.end))
        }
    }
}

/// A media segment of one representation.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Nominal duration in seconds.
    pub duration: f64,
    pub url: String,
    pub range: ByteRange,
    /// Declared bandwidth of the owning representation.
    pub bandwidth: u64,
    pub representation_id: u64,
}

/// The one-time initialization resource of a representation.
#[derive(Debug, Clone, PartialEq)]
pub struct Initialization {
    pub url: String,
    pub range: ByteRange,
    pub bandwidth: u64,
    pub representation_id: u64,
}

/// Anything the fetch collaborator can retrieve.
#[derive(Debug, Clone, Copy)]
pub enum FetchItem<'a> {
    Initialization(&'a Initialization),
    Segment(&'a Segment),
}

impl FetchItem<'_> {
    pub fn url(&self) -> &str {
        match self {
            FetchItem::Initialization(init) => &init.url,
            FetchItem::Segment(segment) => &segment.url,
        }
    }

    pub fn range(&self) -> ByteRange {
        match self {
            FetchItem::Initialization(init) => init.range,
            FetchItem::Segment(segment) => segment.range,
        }
    }

    pub fn representation_id(&self) -> u64 {
        match self {
            FetchItem::Initialization(init) => init.representation_id,
            FetchItem::Segment(segment) => segment.representation_id,
        }
    }

    /// Last path component of the URL, without query or fragment.
    pub fn file_name(&self) -> &str {
        let url = self.url();
        let path = url.split(['?', '#']).next().unwrap_or(url);
        match path.rsplit('/').next() {
            Some(name) if !name.is_empty() => name,
            _ => "index",
        }
    }
}

/// What a single fetch cost.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FetchStats {
    /// Download time in seconds.
    pub duration: f64,
    /// Bytes received.
    pub length: u64,
}
