pub mod call_node;
pub mod profile;
pub mod track;

pub use call_node::{CallNodeInfo, CallNodeTable, build_call_node_info};
pub use profile::{
    Category, FuncTable, Profile, ProfileError, ProfileMeta, RawMarkerTable, SamplesTable,
    StackTable, StringTable, Thread,
};
pub use track::{Track, TrackKind, TrackTiming};
