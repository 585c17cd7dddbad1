/// Nesting level a `<BaseURL>` was declared at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseUrlLevel {
    Mpd,
    Period,
    AdaptationSet,
    Representation,
}

/// Tracks the BaseURL overrides in scope while walking the manifest.
///
/// The most specific non-empty level wins. Levels are independent: the parser clears a
/// level once it leaves the element that declared it so the value never leaks into a
/// sibling subtree.
#[derive(Debug, Clone, Default)]
pub struct BaseUrlResolver {
    mpd: String,
    period: String,
    adaptation_set: String,
    representation: String,
}

impl BaseUrlResolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, level: BaseUrlLevel) -> &mut String {
        match level {
            BaseUrlLevel::Mpd => &mut self.mpd,
            BaseUrlLevel::Period => &mut self.period,
            BaseUrlLevel::AdaptationSet => &mut self.adaptation_set,
            BaseUrlLevel::Representation => &mut self.representation,
        }
    }

    pub fn get(&self, level: BaseUrlLevel) -> &str {
        match level {
            BaseUrlLevel::Mpd => &self.mpd,
            BaseUrlLevel::Period => &self.period,
            BaseUrlLevel::AdaptationSet => &self.adaptation_set,
            BaseUrlLevel::Representation => &self.representation,
        }
    }

    pub fn set(&mut self, level: BaseUrlLevel, value: impl Into<String>) {
        *self.slot_mut(level) = value.into();
    }

    pub fn clear(&mut self, level: BaseUrlLevel) {
        self.slot_mut(level).clear();
    }

    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    /// The effective prefix for a segment reference, or `""` when nothing is in scope.
    pub fn resolve(&self) -> &str {
        [
            &self.representation,
            &self.adaptation_set,
            &self.period,
            &self.mpd,
        ]
        .into_iter()
        .find(|slot| !slot.is_empty())
        .map(String::as_str)
        .unwrap_or("")
    }
}
