//! Diagnostic hooks for the normalization pipeline.
//!
//! Normalizers report unusual payload shapes through an [`Observer`] instead
//! of logging directly, so the functional result never depends on logging
//! and tests can assert on the events themselves.

use std::cell::RefCell;

/// Something worth knowing about a payload that did not stop normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeEvent {
    /// A `[` in recommendation text never closed; the tail was kept verbatim.
    UnterminatedBracket { text: String, offset: usize },
    /// Accessibility array held bare strings instead of objects.
    BareAccessibilityEntries { count: usize },
    /// A section arrived as an object keyed by slug rather than an array.
    KeyedSectionShape {
        section: &'static str,
        keys: Vec<String>,
    },
    /// Raw candidates and normalized items disagree in number.
    CountDrift {
        section: &'static str,
        raw: usize,
        normalized: usize,
    },
}

impl NormalizeEvent {
    /// Whether the event signals degraded input rather than a shape note.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            NormalizeEvent::UnterminatedBracket { .. }
                | NormalizeEvent::BareAccessibilityEntries { .. }
        )
    }

    pub fn describe(&self) -> String {
        match self {
            NormalizeEvent::UnterminatedBracket { text, offset } => {
                format!("unterminated '[' at byte {offset} in recommendation: {text}")
            }
            NormalizeEvent::BareAccessibilityEntries { count } => {
                format!("{count} bare string accessibility entries promoted to insights")
            }
            NormalizeEvent::KeyedSectionShape { section, keys } => {
                format!("{section} payload keyed by [{}]", keys.join(", "))
            }
            NormalizeEvent::CountDrift {
                section,
                raw,
                normalized,
            } => format!("{section}: {raw} raw candidates, {normalized} normalized items"),
        }
    }
}

pub trait Observer {
    fn observe(&self, event: &NormalizeEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&self, event: &NormalizeEvent) {
        match event {
            NormalizeEvent::UnterminatedBracket { text, offset } => {
                tracing::warn!(offset, text = %text, "unterminated bracket in recommendation text");
            }
            NormalizeEvent::BareAccessibilityEntries { count } => {
                tracing::warn!(count, "accessibility array contained bare strings");
            }
            NormalizeEvent::KeyedSectionShape { section, keys } => {
                tracing::debug!(section, keys = ?keys, "keyed section payload");
            }
            NormalizeEvent::CountDrift {
                section,
                raw,
                normalized,
            } => {
                tracing::debug!(section, raw, normalized, "raw vs normalized count drift");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl Observer for SilentObserver {
    fn observe(&self, _event: &NormalizeEvent) {}
}

/// Records events for the report and forwards them to `tracing`.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    events: RefCell<Vec<NormalizeEvent>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_events(self) -> Vec<NormalizeEvent> {
        self.events.into_inner()
    }
}

impl Observer for CollectingObserver {
    fn observe(&self, event: &NormalizeEvent) {
        TracingObserver.observe(event);
        self.events.borrow_mut().push(event.clone());
    }
}
