use itertools::Itertools;

use crate::ingest::HostRanges;
use crate::types::{host::compare_hosts, RangeSet};

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct HostResult {
    pub name: String,
    pub ranges: RangeSet,
}

impl std::fmt::Display for HostResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.ranges)
    }
}

/// Unites the includes of a host and removes its excludes from them.
///
/// Returns `None` for hosts that were never included.
pub fn resolve_host(host: HostRanges) -> Option<HostResult> {
    if host.includes.is_empty() {
        return None;
    }
    let includes = RangeSet::from(host.includes);
    let excludes = RangeSet::from(host.excludes);
    Some(HostResult {
        name: host.name,
        ranges: includes.difference(&excludes),
    })
}

pub fn sort_results(results: &mut [HostResult]) {
    results.sort_by(|a, b| compare_hosts(&a.name, &b.name));
}

pub fn format_results(results: &[HostResult]) -> Vec<String> {
    results.iter().map(ToString::to_string).collect_vec()
}
