use anyhow::{Context, Result};
use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, instrument};

use crate::metrics;

pub mod accumulator;
pub mod directive;

pub use accumulator::{Accumulator, FileRanges, HostRanges};
pub use directive::{parse_directive, Directive, DirectiveError, Tag};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FileStats {
    pub path: PathBuf,
    pub directives: u64,
    pub skipped: u64,
    pub invalid: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileStats {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            directives: 0,
            skipped: 0,
            invalid: 0,
            error: None,
        }
    }

    pub fn failed(path: PathBuf, error: &anyhow::Error) -> Self {
        Self {
            error: Some(format!("{error:#}")),
            ..Self::new(path)
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

impl std::fmt::Display for FileStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "File: {}, directives: {}, skipped: {}, invalid: {}",
            self.path, self.directives, self.skipped, self.invalid
        )?;
        if let Some(error) = &self.error {
            write!(f, ", error: {error}")?;
        }
        Ok(())
    }
}

pub struct ParsedFile {
    pub ranges: FileRanges,
    pub stats: FileStats,
}

/// Reads the file line by line and collects all of its directives.
///
/// Lines are decoded lossily, so a malformed byte sequence only affects the
/// line it appears in. Any I/O error fails the whole file: partial contents are
/// never returned.
#[instrument(skip_all, fields(file = %path))]
pub async fn parse_file(path: &Path) -> Result<ParsedFile> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Couldn't open file {path}"))?;
    let mut lines = BufReader::new(file).split(b'\n');
    let mut ranges = FileRanges::new();
    let mut stats = FileStats::new(path.to_owned());
    let mut line_number = 0u64;
    while let Some(bytes) = lines
        .next_segment()
        .await
        .with_context(|| format!("Couldn't read line {} of {path}", line_number + 1))?
    {
        line_number += 1;
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(&bytes);
        let line = String::from_utf8_lossy(bytes);
        match parse_directive(&line) {
            Ok(Some(directive)) => {
                stats.directives += 1;
                ranges.add(directive);
            }
            Ok(None) => stats.skipped += 1,
            Err(e) => {
                debug!("Skipping line {line_number}: {e}");
                stats.invalid += 1;
            }
        }
    }
    metrics::DIRECTIVES.inc_by(stats.directives);
    metrics::SKIPPED_LINES.inc_by(stats.skipped);
    metrics::INVALID_LINES.inc_by(stats.invalid);
    debug!(
        "Parsed {} directives for {} hosts",
        stats.directives,
        ranges.len()
    );
    Ok(ParsedFile { ranges, stats })
}
