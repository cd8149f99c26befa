use camino::Utf8PathBuf as PathBuf;
use clap::Parser;

use crate::aggregator::Config;
use crate::storage::StatsFormat;

#[derive(Parser, Clone, Debug)]
#[command(version)]
pub struct Args {
    /// Directory with the input files
    #[clap(long, env, value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Only files with names matching this glob pattern are read
    #[clap(long, env, value_parser = parse_pattern, default_value = "*")]
    pub pattern: glob::Pattern,

    /// File to write the aggregated ranges to
    #[clap(long, env, value_name = "FILE", default_value = "output.txt")]
    pub output: PathBuf,

    /// File to write per-file statistics to
    #[clap(long, env, value_name = "FILE", default_value = "statistics.txt")]
    pub statistics: PathBuf,

    #[clap(long, env, value_enum, default_value_t = StatsFormat::Text)]
    pub statistics_format: StatsFormat,

    /// File to dump the run metrics to in prometheus text format
    #[clap(long, env, value_name = "FILE")]
    pub metrics: Option<PathBuf>,

    /// Number of files parsed at the same time
    #[clap(long, env, default_value_t = 16)]
    pub ingest_concurrency: usize,

    /// Number of hosts merged at the same time
    #[clap(long, env, default_value_t = 16)]
    pub merge_concurrency: usize,

    #[clap(long, env, hide(true), default_value_t = 64)]
    pub accumulator_shards: usize,

    /// Number of runtime worker threads (defaults to the number of CPUs)
    #[clap(long, env)]
    pub worker_threads: Option<usize>,

    #[clap(long, env)]
    pub log_span_durations: bool,
}

impl Args {
    pub fn aggregator_config(&self) -> Config {
        Config {
            ingest_concurrency: self.ingest_concurrency,
            merge_concurrency: self.merge_concurrency,
            accumulator_shards: self.accumulator_shards,
        }
    }
}

fn parse_pattern(s: &str) -> Result<glob::Pattern, glob::PatternError> {
    glob::Pattern::new(s)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;
    use crate::storage::StatsFormat;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["aggregator", "--input-dir", "data"]).unwrap();
        assert_eq!(args.input_dir.as_str(), "data");
        assert_eq!(args.output.as_str(), "output.txt");
        assert_eq!(args.statistics.as_str(), "statistics.txt");
        assert_eq!(args.statistics_format, StatsFormat::Text);
        assert!(args.pattern.matches("anything.txt"));
        assert_eq!(args.aggregator_config().ingest_concurrency, 16);
        assert_eq!(args.metrics, None);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "aggregator",
            "--input-dir",
            "data",
            "--pattern",
            "*.txt",
            "--statistics-format",
            "json",
            "--merge-concurrency",
            "2",
            "--metrics",
            "metrics.txt",
        ])
        .unwrap();
        assert!(!args.pattern.matches("a.log"));
        assert_eq!(args.statistics_format, StatsFormat::Json);
        assert_eq!(args.aggregator_config().merge_concurrency, 2);
        assert_eq!(args.metrics.as_deref().map(|p| p.as_str()), Some("metrics.txt"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(Args::try_parse_from(["aggregator", "--input-dir", "d", "--pattern", "[a"]).is_err());
    }
}
