use itertools::Itertools;

// Inclusive range, start <= end
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Range {
    start: i64,
    end: i64,
}

impl Range {
    pub fn new(start: i64, end: i64) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn contains(&self, value: i64) -> bool {
        self.start <= value && value <= self.end
    }

    pub fn overlaps(&self, other: &Range) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.start, self.end)
    }
}

impl std::fmt::Debug for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self, f)
    }
}

/// Sorts the ranges and collapses every overlapping or touching pair.
///
/// The result is ascending and every two neighbours are separated by a gap
/// of at least one missing value: `result[i].end + 1 < result[i + 1].start`.
pub fn merge(mut ranges: Vec<Range>) -> Vec<Range> {
    ranges.sort_unstable_by_key(|range| range.start);
    let mut result: Vec<Range> = Vec::with_capacity(ranges.len());
    for next in ranges {
        match result.last_mut() {
            // saturating: nothing can start after i64::MAX anyway
            Some(current) if next.start <= current.end.saturating_add(1) => {
                current.end = current.end.max(next.end);
            }
            _ => result.push(next),
        }
    }
    result
}

/// Removes every value covered by `exclude` from a normalized list.
///
/// Ranges keep their relative order, so a normalized input stays normalized.
pub fn subtract(ranges: &[Range], exclude: Range) -> Vec<Range> {
    let mut result = Vec::with_capacity(ranges.len() + 1);
    for &range in ranges {
        if !range.overlaps(&exclude) {
            result.push(range);
            continue;
        }
        if exclude.start > range.start {
            result.push(Range {
                start: range.start,
                end: exclude.start - 1,
            });
        }
        if exclude.end < range.end {
            result.push(Range {
                start: exclude.end + 1,
                end: range.end,
            });
        }
    }
    result
}

/// Normalized list of ranges. Any way of building it goes through [`merge`].
#[repr(transparent)]
#[derive(Default, PartialEq, Eq, Clone, Hash)]
pub struct RangeSet {
    ranges: Vec<Range>,
}

impl RangeSet {
    pub fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    pub fn from_ranges(ranges: impl IntoIterator<Item = Range>) -> Self {
        Self {
            ranges: merge(ranges.into_iter().collect()),
        }
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Range> {
        self.ranges.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn contains(&self, value: i64) -> bool {
        let index = self.ranges.partition_point(|range| range.end < value);
        self.ranges
            .get(index)
            .is_some_and(|range| range.contains(value))
    }

    pub fn subtract(&self, exclude: Range) -> RangeSet {
        RangeSet {
            ranges: subtract(&self.ranges, exclude),
        }
    }

    // Excludes are applied in ascending order, the result doesn't depend on it
    pub fn difference(&self, excludes: &RangeSet) -> RangeSet {
        excludes
            .iter()
            .fold(self.clone(), |acc, &exclude| acc.subtract(exclude))
    }
}

impl FromIterator<Range> for RangeSet {
    fn from_iter<I: IntoIterator<Item = Range>>(iter: I) -> Self {
        Self::from_ranges(iter)
    }
}

impl From<Vec<Range>> for RangeSet {
    fn from(ranges: Vec<Range>) -> Self {
        Self {
            ranges: merge(ranges),
        }
    }
}

impl<'a> IntoIterator for &'a RangeSet {
    type Item = &'a Range;
    type IntoIter = std::slice::Iter<'a, Range>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

impl std::fmt::Display for RangeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ranges.iter().join(", "))
    }
}

impl std::fmt::Debug for RangeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ranges.iter()).finish()
    }
}
