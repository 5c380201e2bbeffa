//! One-time warnings for accepted but unimplemented features

use rustc_hash::FxHashSet;

/// Remembers which features a context has already warned about
#[derive(Debug, Default)]
pub struct Diagnostics {
    enabled: bool,
    warned: FxHashSet<&'static str>,
}

impl Diagnostics {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            warned: FxHashSet::default(),
        }
    }

    /// Log `feature` as unsupported the first time it is used. Returns true
    /// when a warning was emitted.
    pub fn unsupported(&mut self, feature: &'static str) -> bool {
        if !self.enabled || !self.warned.insert(feature) {
            return false;
        }
        tracing::warn!(feature, "not supported by this target, ignoring");
        true
    }

    pub fn has_warned(&self, feature: &str) -> bool {
        self.warned.contains(feature)
    }
}
