//! Lifecycle of one manifest load: addressing, validation, parsing, initialization
//! downloads and candidate selection.

use crate::context::{Phase, PlayerContext};
use crate::error::DashResult;
use crate::mpd::element::Element;
use crate::mpd::parser::ManifestParser;
use crate::mpd::validator::{ManifestValidator, StructuralValidator};
use crate::mpd::{MpdMetadata, RepresentationSet};
use crate::segment::fetcher::HttpFetcher;
use crate::segment::{FetchItem, Segment};
use crate::selector;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use tracing::{debug, info};

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*(),]|%[0-9a-fA-F]{2})+")
        .expect("static URL pattern")
});

/// The URL embedded in a manifest argument, if it addresses a remote manifest.
pub fn remote_url(source: &str) -> Option<&str> {
    URL_PATTERN.find(source).map(|m| m.as_str())
}

#[derive(Debug, Default)]
pub struct Manifest {
    metadata: MpdMetadata,
}

impl Manifest {
    /// Loads the manifest and downloads every initialization segment. A failed
    /// initialization download is reported through the event sink like a failed load.
    pub fn open<C: PlayerContext + ?Sized>(ctx: &mut C, source: &str) -> DashResult<Self> {
        let manifest = Self::load(ctx, source)?;
        if let Err(e) = manifest.initialise(ctx) {
            ctx.event(Phase::Error, &e.to_string());
            return Err(e);
        }
        Ok(manifest)
    }

    /// Loads a manifest from a local path or a remote URL. Fatal problems are reported
    /// through the event sink before being returned.
    pub fn load<C: PlayerContext + ?Sized>(ctx: &mut C, source: &str) -> DashResult<Self> {
        let result = Self::load_inner(ctx, source);
        if let Err(e) = &result {
            ctx.event(Phase::Error, &e.to_string());
        }
        result
    }

    fn load_inner<C: PlayerContext + ?Sized>(ctx: &mut C, source: &str) -> DashResult<Self> {
        ctx.event(Phase::Start, "parsing mpd");
        let path = match remote_url(source) {
            Some(url) => fetch_remote_mpd(ctx, url)?,
            None => PathBuf::from(source),
        };

        let document = if ctx.options().xml_validation {
            validate_mpd(ctx, &path)?
        } else {
            Element::from_file(&path)?
        };

        let manifest = Self::from_document(&document)?;
        info!(
            "Loaded {} representations from {}",
            manifest.representations().len(),
            path.display()
        );
        ctx.event(Phase::Stop, "parsing mpd");
        Ok(manifest)
    }

    pub fn from_document(document: &Element) -> DashResult<Self> {
        let metadata = ManifestParser::new().parse(document)?;
        Ok(Self { metadata })
    }

    /// Fetches every initialization once and reports the aggregate to the bandwidth estimate.
    pub fn initialise<C: PlayerContext + ?Sized>(&self, ctx: &mut C) -> DashResult<()> {
        ctx.event(Phase::Start, "downloading initializations");
        let mut total_duration = 0.0;
        let mut total_length = 0;
        for initialization in self.metadata.representations.initializations() {
            let stats = ctx.fetch_item(FetchItem::Initialization(initialization))?;
            total_duration += stats.duration;
            total_length += stats.length;
        }
        debug!(
            "Initializations took {:.3}s for {} bytes",
            total_duration, total_length
        );
        ctx.update_bandwidth(total_duration, total_length);
        ctx.event(Phase::Stop, "downloading initializations");
        Ok(())
    }

    /// Next segment to fetch for a measured bandwidth in bits per second.
    pub fn candidate(&mut self, bandwidth: f64) -> DashResult<Segment> {
        selector::candidate(&mut self.metadata.representations, bandwidth)
    }

    /// Discards every representation of this load.
    pub fn stop<C: PlayerContext + ?Sized>(&mut self, ctx: &C) {
        self.metadata.representations = RepresentationSet::default();
        ctx.event(Phase::Stop, "representations");
    }

    pub fn representations(&self) -> &RepresentationSet {
        &self.metadata.representations
    }

    pub fn min_buffer_time(&self) -> f64 {
        self.metadata.min_buffer_time
    }

    pub fn max_segment_duration(&self) -> f64 {
        self.metadata.max_segment_duration
    }

    /// Presentation duration in whole seconds.
    pub fn duration(&self) -> u64 {
        self.metadata.presentation_duration as u64
    }
}

fn fetch_remote_mpd<C: PlayerContext + ?Sized>(ctx: &mut C, url: &str) -> DashResult<PathBuf> {
    ctx.event(Phase::Start, "fetching remote mpd");
    let body = HttpFetcher::new().download(url)?;
    let file_name = url
        .split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("manifest.mpd");
    let path = ctx.create_directory("mpd")?.join(file_name);
    std::fs::write(&path, &body)?;
    ctx.event(Phase::Stop, "fetching remote mpd");
    Ok(path)
}

fn validate_mpd<C: PlayerContext + ?Sized>(ctx: &C, path: &std::path::Path) -> DashResult<Element> {
    ctx.event(Phase::Start, "validating schema");
    let validator = StructuralValidator::from_schema_file(&ctx.options().schema_path)?;
    ctx.event(Phase::Stop, "validating schema");

    let document = Element::from_file(path)?;
    ctx.event(Phase::Start, "validating document");
    validator.validate(&document)?;
    ctx.event(Phase::Stop, "validating document");
    Ok(document)
}
