pub mod aggregator;
pub mod cli;
pub mod ingest;
pub mod merge;
pub mod metrics;
pub mod storage;
pub mod types;

pub use aggregator::{Aggregation, AggregationError, Aggregator, Config};
pub use merge::HostResult;
pub use types::{HostKey, Range, RangeSet};
