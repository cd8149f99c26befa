use anyhow::{Context, Result};
use camino::Utf8Path as Path;
use prometheus_client::registry::Registry;
use tracing::instrument;

use crate::ingest::FileStats;

use super::local_fs::write_lines;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsFormat {
    /// One human readable line per file
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

#[instrument(skip(stats))]
pub fn write_statistics(path: &Path, stats: &[FileStats], format: StatsFormat) -> Result<()> {
    let lines: Vec<String> = match format {
        StatsFormat::Text => stats.iter().map(ToString::to_string).collect(),
        StatsFormat::Json => stats
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<_, _>>()
            .context("Couldn't serialize statistics")?,
    };
    write_lines(path, lines)
}

/// Dumps the current values of all registered metrics in the text exposition format.
#[instrument(skip(registry))]
pub fn write_metrics(path: &Path, registry: &Registry) -> Result<()> {
    let mut buffer = String::new();
    prometheus_client::encoding::text::encode(&mut buffer, registry)
        .context("Couldn't encode metrics")?;
    write_lines(path, buffer.lines())
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf as PathBuf;
    use prometheus_client::metrics::counter::Counter;
    use prometheus_client::registry::Registry;

    use crate::ingest::FileStats;

    use super::{write_metrics, write_statistics, StatsFormat};

    fn sample_stats() -> Vec<FileStats> {
        let mut first = FileStats::new("in/a.txt".into());
        first.directives = 2;
        first.invalid = 1;
        let second = FileStats::failed("in/b.txt".into(), &anyhow::anyhow!("Couldn't open"));
        vec![first, second]
    }

    #[test]
    fn test_text_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let path = PathBuf::try_from(dir.path().join("statistics.txt")).unwrap();
        write_statistics(&path, &sample_stats(), StatsFormat::Text).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "File: in/a.txt, directives: 2, skipped: 0, invalid: 1\n\
             File: in/b.txt, directives: 0, skipped: 0, invalid: 0, error: Couldn't open\n"
        );
    }

    #[test]
    fn test_json_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let path = PathBuf::try_from(dir.path().join("statistics.jsonl")).unwrap();
        write_statistics(&path, &sample_stats(), StatsFormat::Json).unwrap();
        let lines: Vec<serde_json::Value> = std::fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![
                serde_json::json!({
                    "path": "in/a.txt", "directives": 2, "skipped": 0, "invalid": 1
                }),
                serde_json::json!({
                    "path": "in/b.txt", "directives": 0, "skipped": 0, "invalid": 0,
                    "error": "Couldn't open"
                }),
            ]
        );
    }

    #[test]
    fn test_write_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let path = PathBuf::try_from(dir.path().join("metrics.txt")).unwrap();
        let mut registry = Registry::default();
        let counter: Counter = Default::default();
        counter.inc_by(3);
        registry.register("num_things", "Number of things", counter);
        write_metrics(&path, &registry).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("num_things_total 3"));
        assert!(contents.ends_with("# EOF\n"));
    }
}
