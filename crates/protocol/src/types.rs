use serde::{Deserialize, Serialize};

/// All profile timestamps and durations are in milliseconds since
/// profile start.
pub type Milliseconds = f64;

/// Restricts which frame implementations participate in the call tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImplementationFilter {
    /// No restriction — every frame is kept.
    Combined,
    /// Only JS frames.
    Js,
    /// Only native frames.
    Cpp,
}

impl ImplementationFilter {
    /// Whether a frame with the given JS-ness passes this filter.
    pub fn matches(self, is_js: bool) -> bool {
        match self {
            ImplementationFilter::Combined => true,
            ImplementationFilter::Js => is_js,
            ImplementationFilter::Cpp => !is_js,
        }
    }
}

/// The currently committed selection window, half-open `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommittedRange {
    pub start: Milliseconds,
    pub end: Milliseconds,
}

impl CommittedRange {
    pub fn new(start: Milliseconds, end: Milliseconds) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, time: Milliseconds) -> bool {
        time >= self.start && time < self.end
    }
}

/// Snapshot of the UI filter state driving one round of timing
/// derivation. Read-only input: the engine never stores or mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub implementation: ImplementationFilter,
    #[serde(rename = "hidePlatformDetails")]
    pub hide_platform_details: bool,
    /// Case-insensitive substring matched against function names
    /// anywhere on a sample's call-node path. Empty = no filtering.
    pub search: String,
    #[serde(rename = "invertCallstack")]
    pub invert_callstack: bool,
    pub range: CommittedRange,
}

impl FilterState {
    /// A state that keeps everything within the given range.
    pub fn all(range: CommittedRange) -> Self {
        Self {
            implementation: ImplementationFilter::Combined,
            hide_platform_details: false,
            search: String::new(),
            invert_callstack: false,
            range,
        }
    }
}
