use anyhow::Result;
use camino::Utf8PathBuf as PathBuf;
use tokio_util::sync::CancellationToken;

use range_aggregator::merge::format_results;
use range_aggregator::storage::{list_files, write_lines, write_statistics, StatsFormat};
use range_aggregator::util::tests::{setup_tracing, tests_data};
use range_aggregator::{Aggregator, Config};

fn input_files() -> Result<Vec<PathBuf>> {
    list_files(&tests_data().join("hosts"), &glob::Pattern::new("*.txt")?)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fixtures() -> Result<()> {
    setup_tracing()?;
    let files = input_files()?;
    assert_eq!(files.len(), 3);

    let aggregation = Aggregator::new(Config::default())
        .run(files, CancellationToken::new())
        .await?;

    let dir = tempfile::tempdir()?;
    let output = PathBuf::try_from(dir.path().join("output.txt"))?;
    write_lines(&output, format_results(&aggregation.hosts))?;
    let expected = std::fs::read_to_string(tests_data().join("expected_output.txt"))?;
    assert_eq!(std::fs::read_to_string(&output)?, expected);

    let counts: Vec<_> = aggregation
        .files
        .iter()
        .map(|stats| (stats.directives, stats.skipped, stats.invalid))
        .collect();
    assert_eq!(counts, vec![(4, 3, 0), (5, 0, 1), (4, 0, 0)]);

    let statistics = PathBuf::try_from(dir.path().join("statistics.txt"))?;
    write_statistics(&statistics, &aggregation.files, StatsFormat::Text)?;
    let written = std::fs::read_to_string(&statistics)?;
    assert_eq!(written.lines().count(), 3);
    assert!(written.lines().all(|line| line.starts_with("File: ")));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_result_does_not_depend_on_concurrency() -> Result<()> {
    let mut outputs = Vec::new();
    for (ingest_concurrency, merge_concurrency, accumulator_shards) in
        [(1, 1, 1), (2, 4, 3), (16, 16, 64)]
    {
        let aggregation = Aggregator::new(Config {
            ingest_concurrency,
            merge_concurrency,
            accumulator_shards,
        })
        .run(input_files()?, CancellationToken::new())
        .await?;
        outputs.push(format_results(&aggregation.hosts));
    }
    assert!(outputs.windows(2).all(|pair| pair[0] == pair[1]));
    Ok(())
}
