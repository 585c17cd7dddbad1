use crate::error::{DashError, DashResult};
use crate::mpd::element::Element;
use std::collections::HashSet;
use std::path::Path;

/// Pass/fail gate run on a manifest before it is parsed.
pub trait ManifestValidator {
    fn validate(&self, document: &Element) -> DashResult<()>;
}

/// Checks a manifest against the element declarations of a schema definition plus the
/// attributes the parser cannot do without. This is a structural check, not a full XSD
/// validation.
#[derive(Debug, Clone)]
pub struct StructuralValidator {
    declared_elements: HashSet<String>,
}

impl StructuralValidator {
    pub fn from_schema_file<P: AsRef<Path>>(path: P) -> DashResult<Self> {
        let xml = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            DashError::SchemaDefinition(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_schema_str(&xml)
    }

    pub fn from_schema_str(xml: &str) -> DashResult<Self> {
        let schema = Element::parse(xml).map_err(|e| DashError::SchemaDefinition(e.to_string()))?;
        if !schema.is("schema") {
            return Err(DashError::SchemaDefinition(format!(
                "root element is <{}>, expected <schema>",
                schema.name
            )));
        }

        let declared_elements = schema
            .descendants()
            .into_iter()
            .filter(|e| e.is("element"))
            .filter_map(|e| e.attr("name"))
            .map(str::to_string)
            .collect();

        Ok(Self { declared_elements })
    }
}

impl ManifestValidator for StructuralValidator {
    fn validate(&self, document: &Element) -> DashResult<()> {
        if !document.is("MPD") {
            return Err(DashError::SchemaValidation(format!(
                "root element is <{}>, expected <MPD>",
                document.name
            )));
        }
        if !self.declared_elements.contains("MPD") {
            return Err(DashError::SchemaValidation(
                "schema does not declare an MPD element".to_string(),
            ));
        }

        for element in document.descendants() {
            let required: &[&str] = match element.name.as_str() {
                "Representation" => &["bandwidth"],
                "SegmentList" => &["duration"],
                _ => continue,
            };
            if let Some(missing) = required.iter().find(|a| element.attr(a).is_none()) {
                return Err(DashError::SchemaValidation(format!(
                    "<{}> is missing required attribute `{}`",
                    element.name, missing
                )));
            }
        }
        Ok(())
    }
}
