//! stackline-core: the timing derivation engine behind the stackline
//! profile viewer.
//!
//! Everything here is a pure, synchronous function of its inputs: a raw
//! sampled profile plus the current filter state goes in, fresh
//! immutable timing structures come out. The rendering layer consumes
//! those through `stackline-protocol` and never sees the raw tables.

pub mod model;
pub mod timing;

pub use model::{CallNodeInfo, CallNodeTable, Profile, Thread, TrackKind, TrackTiming};
pub use timing::{FilteredSamples, compute_track_timing};
