use crate::error::{DashError, DashResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

/// A parsed XML element. Names are stored without their namespace prefix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Concatenated, trimmed text content.
    pub text: String,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.is(name))
    }

    /// This element followed by all of its descendants, level by level.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = vec![self];
        let mut i = 0;
        while i < out.len() {
            let current = out[i];
            out.extend(current.children.iter());
            i += 1;
        }
        out
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> DashResult<Element> {
        let xml = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => DashError::MalformedXml(e.to_string()),
            _ => DashError::Io(e),
        })?;
        Self::parse(&xml)
    }

    /// Builds an element tree from a complete XML document.
    pub fn parse(xml: &str) -> DashResult<Element> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => stack.push(Self::from_start(e)?),
                Event::Empty(ref e) => {
                    let element = Self::from_start(e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| DashError::MalformedXml("unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(ref t) => {
                    let text = t.unescape().map_err(quick_xml::Error::from)?;
                    push_text(&mut stack, text.trim())?;
                }
                Event::CData(c) => {
                    push_text(&mut stack, String::from_utf8_lossy(&c.into_inner()).trim())?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(DashError::MalformedXml(format!("unclosed element <{}>", open.name)));
        }
        root.ok_or_else(|| DashError::MalformedXml("document has no root element".to_string()))
    }

    fn from_start(e: &BytesStart) -> DashResult<Element> {
        let mut element = Element::new(&String::from_utf8_lossy(e.local_name().as_ref()));
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            // Namespace declarations carry no manifest data
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
            let value = attr.unescape_value()?.to_string();
            element.attributes.push((key, value));
        }
        Ok(element)
    }
}

/// Text is only allowed inside the root element.
fn push_text(stack: &mut [Element], text: &str) -> DashResult<()> {
    if text.is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(top) => {
            top.text.push_str(text);
            Ok(())
        }
        None => Err(DashError::MalformedXml(format!(
            "text outside the root element: {:?}",
            text
        ))),
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> DashResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_some() {
        return Err(DashError::MalformedXml(format!(
            "unexpected second root element <{}>",
            element.name
        )));
    } else {
        *root = Some(element);
    }
    Ok(())
}
