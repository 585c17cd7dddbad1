use crate::error::{DashError, DashResult};
use crate::mpd::base_url::{BaseUrlLevel, BaseUrlResolver};
use crate::mpd::element::Element;
use crate::mpd::{MpdMetadata, Representation, RepresentationSet};
use crate::segment::{ByteRange, Initialization, Segment};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Upper bound for synthesized representation identifiers.
const MAX_GENERATED_ID: u64 = 1_000_000;

pub fn parse_mpd(xml: &str) -> DashResult<MpdMetadata> {
    let root = Element::parse(xml)?;
    ManifestParser::new().parse(&root)
}

/// Walks an MPD element tree depth-first, one step per structural level, and flattens it
/// into a [`RepresentationSet`].
pub struct ManifestParser {
    base_url: BaseUrlResolver,
    rng: StdRng,
    used_ids: HashSet<u64>,
    representations: Vec<Representation>,
    max_segment_duration: f64,
}

impl Default for ManifestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestParser {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic identifier synthesis.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            base_url: BaseUrlResolver::new(),
            rng,
            used_ids: HashSet::new(),
            representations: Vec::new(),
            max_segment_duration: 0.0,
        }
    }

    pub fn parse(mut self, root: &Element) -> DashResult<MpdMetadata> {
        if !root.is("MPD") {
            return Err(DashError::MalformedXml(format!(
                "root element is <{}>, expected <MPD>",
                root.name
            )));
        }

        // Reserve every declared id up front so synthesized ones cannot collide with them
        self.used_ids = root
            .descendants()
            .into_iter()
            .filter(|e| e.is("Representation"))
            .filter_map(|e| e.attr("id").and_then(|id| id.trim().parse::<u64>().ok()))
            .collect();

        let presentation_duration = root
            .attr("mediaPresentationDuration")
            .and_then(parse_duration)
            .unwrap_or(0.0);
        let min_buffer_time = root
            .attr("minBufferTime")
            .map(parse_buffer_time)
            .unwrap_or(0.0);

        self.parse_mpd_level(root)?;

        let representations = RepresentationSet::new(self.representations);
        debug!(
            "Parsed {} representations, presentation duration {}s, min buffer {}s",
            representations.len(),
            presentation_duration,
            min_buffer_time
        );

        Ok(MpdMetadata {
            presentation_duration,
            min_buffer_time,
            max_segment_duration: self.max_segment_duration,
            representations,
        })
    }

    fn parse_mpd_level(&mut self, mpd: &Element) -> DashResult<()> {
        for child in &mpd.children {
            match child.name.as_str() {
                "BaseURL" => self.base_url.set(BaseUrlLevel::Mpd, child.text.as_str()),
                "Period" => self.parse_period(child)?,
                _ => {}
            }
        }
        self.base_url.clear(BaseUrlLevel::Mpd);
        Ok(())
    }

    fn parse_period(&mut self, period: &Element) -> DashResult<()> {
        for child in &period.children {
            match child.name.as_str() {
                "BaseURL" => self.base_url.set(BaseUrlLevel::Period, child.text.as_str()),
                "AdaptationSet" => self.parse_adaptation_set(child)?,
                _ => {}
            }
        }
        self.base_url.clear(BaseUrlLevel::Period);
        Ok(())
    }

    fn parse_adaptation_set(&mut self, adaptation_set: &Element) -> DashResult<()> {
        for child in &adaptation_set.children {
            match child.name.as_str() {
                "BaseURL" => self
                    .base_url
                    .set(BaseUrlLevel::AdaptationSet, child.text.as_str()),
                "Representation" => {
                    let bandwidth = required_u64(child, "Representation", "bandwidth")?;
                    let id = self.representation_id(child);
                    let representation = self.parse_representation(id, bandwidth, child)?;
                    self.representations.push(representation);
                }
                _ => {}
            }
        }
        self.base_url.clear(BaseUrlLevel::AdaptationSet);
        Ok(())
    }

    fn parse_representation(
        &mut self,
        id: u64,
        bandwidth: u64,
        element: &Element,
    ) -> DashResult<Representation> {
        let mut representation = Representation::new(id, bandwidth);
        for child in &element.children {
            match child.name.as_str() {
                "BaseURL" => self
                    .base_url
                    .set(BaseUrlLevel::Representation, child.text.as_str()),
                "SegmentBase" => self.parse_segment_base(&mut representation, child)?,
                "SegmentList" => self.parse_segment_list(&mut representation, child)?,
                _ => {}
            }
        }
        self.base_url.clear(BaseUrlLevel::Representation);

        if representation.segments().is_empty() {
            debug!("Representation {} has no segments", id);
        }
        Ok(representation)
    }

    fn parse_segment_base(
        &mut self,
        representation: &mut Representation,
        segment_base: &Element,
    ) -> DashResult<()> {
        for child in segment_base.children_named("Initialization") {
            let range = ByteRange::parse(child.attr("range"), "Initialization", "range")?;
            representation.set_initialization(Initialization {
                url: format!(
                    "{}{}",
                    self.base_url.resolve(),
                    child.attr("sourceURL").unwrap_or_default()
                ),
                range,
                bandwidth: representation.bandwidth(),
                representation_id: representation.id(),
            });
        }
        Ok(())
    }

    fn parse_segment_list(
        &mut self,
        representation: &mut Representation,
        segment_list: &Element,
    ) -> DashResult<()> {
        let duration = required_u64(segment_list, "SegmentList", "duration")?;
        let timescale = match segment_list.attr("timescale") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(ts) if ts > 0 => ts,
                _ => {
                    return Err(DashError::InvalidAttribute {
                        element: "SegmentList",
                        attribute: "timescale",
                        value: value.to_string(),
                    })
                }
            },
            None => 1,
        };
        let duration = duration as f64 / timescale as f64;
        if duration > self.max_segment_duration {
            self.max_segment_duration = duration;
        }

        for child in segment_list.children_named("SegmentURL") {
            let range = ByteRange::parse(child.attr("mediaRange"), "SegmentURL", "mediaRange")?;
            representation.push_segment(Segment {
                duration,
                url: format!(
                    "{}{}",
                    self.base_url.resolve(),
                    child.attr("media").unwrap_or_default()
                ),
                range,
                bandwidth: representation.bandwidth(),
                representation_id: representation.id(),
            });
        }
        Ok(())
    }

    fn representation_id(&mut self, element: &Element) -> u64 {
        match element.attr("id") {
            Some(id) => match id.trim().parse::<u64>() {
                Ok(id) => return id,
                Err(_) => warn!("Representation id {:?} is not an integer, generating one", id),
            },
            None => warn!("Representation id not found, generating one"),
        }
        self.generate_id()
    }

    fn generate_id(&mut self) -> u64 {
        loop {
            let candidate = self.rng.gen_range(0..=MAX_GENERATED_ID);
            if self.used_ids.insert(candidate) {
                return candidate;
            }
        }
    }
}

fn required_u64(element: &Element, name: &'static str, attribute: &'static str) -> DashResult<u64> {
    let value = element
        .attr(attribute)
        .ok_or(DashError::MissingAttribute { element: name, attribute })?;
    value.trim().parse::<u64>().map_err(|_| DashError::InvalidAttribute {
        element: name,
        attribute,
        value: value.to_string(),
    })
}

fn parse_duration(value: &str) -> Option<f64> {
    let iso = iso8601_duration::Duration::parse(value.trim()).ok()?;
    iso.to_std().map(|d| d.as_secs_f64())
}

/// `minBufferTime` is usually a plain `PT<seconds>S`; anything else falls back to stripping
/// the units by hand.
fn parse_buffer_time(value: &str) -> f64 {
    parse_duration(value)
        .or_else(|| {
            value
                .trim()
                .trim_start_matches("PT")
                .trim_end_matches('S')
                .parse::<f64>()
                .ok()
        })
        .unwrap_or_else(|| {
            warn!("Unreadable minBufferTime {:?}, using 0", value);
            0.0
        })
}
