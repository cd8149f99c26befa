use std::num::ParseIntError;

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{HostKey, Range};

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Tag {
    Include,
    Exclude,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Directive {
    pub hosts: Vec<String>,
    pub tag: Tag,
    pub range: Range,
}

#[derive(thiserror::Error, Debug)]
pub enum DirectiveError {
    #[error("Invalid range bound '{token}': {source}")]
    InvalidBound {
        token: String,
        #[source]
        source: ParseIntError,
    },
    #[error("Range start {start} is greater than its end {end}")]
    InvertedRange { start: i64, end: i64 },
}

lazy_static! {
    static ref HOSTS_RE: Regex = Regex::new(r"hosts:\(([^)]*)\)").unwrap();
    static ref TAG_RE: Regex = Regex::new(r"type:(include|exclude)\b").unwrap();
    static ref RANGE_RE: Regex = Regex::new(r"range:\[([-+\d,\s]*)").unwrap();
}

/// Extracts a directive from a single line.
///
/// Returns `Ok(None)` for lines that don't look like a directive at all and an
/// error for lines that do but carry a broken range.
pub fn parse_directive(line: &str) -> Result<Option<Directive>, DirectiveError> {
    let (Some(hosts), Some(tag), Some(bounds)) =
        (parse_hosts(line), parse_tag(line), range_bounds(line))
    else {
        return Ok(None);
    };
    let [start, end] = bounds.map(parse_bound);
    let (start, end) = (start?, end?);
    let range = Range::new(start, end).ok_or(DirectiveError::InvertedRange { start, end })?;
    Ok(Some(Directive { hosts, tag, range }))
}

fn parse_hosts(line: &str) -> Option<Vec<String>> {
    let list = HOSTS_RE.captures(line)?.get(1)?.as_str();
    let hosts = list
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unique_by(|name| HostKey::new(name))
        .map(ToOwned::to_owned)
        .collect_vec();
    (!hosts.is_empty()).then_some(hosts)
}

// A line naming both tags is ambiguous and doesn't count as a directive
fn parse_tag(line: &str) -> Option<Tag> {
    TAG_RE
        .captures_iter(line)
        .filter_map(|cap| cap.get(1))
        .map(|m| match m.as_str() {
            "include" => Tag::Include,
            _ => Tag::Exclude,
        })
        .dedup()
        .exactly_one()
        .ok()
}

fn range_bounds(line: &str) -> Option<[&str; 2]> {
    let body = RANGE_RE.captures(line)?.get(1)?.as_str();
    body.split(',')
        .map(str::trim)
        .collect_tuple()
        .map(|(start, end)| [start, end])
}

fn parse_bound(token: &str) -> Result<i64, DirectiveError> {
    token.parse().map_err(|source| DirectiveError::InvalidBound {
        token: token.to_owned(),
        source,
    })
}
