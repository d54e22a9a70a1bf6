pub mod timing;
pub mod types;

pub use timing::{TimingRow, lane_for_y};
pub use types::{CommittedRange, FilterState, ImplementationFilter, Milliseconds};
