pub mod host;
pub mod range;

pub use host::HostKey;
pub use range::{Range, RangeSet};
