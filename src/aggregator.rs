use std::sync::Arc;

use camino::Utf8PathBuf as PathBuf;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::{
    ingest::{parse_file, Accumulator, FileStats},
    merge::{resolve_host, sort_results, HostResult},
    metrics,
};

#[derive(thiserror::Error, Debug)]
pub enum AggregationError {
    #[error("Aggregation cancelled")]
    Cancelled,
    #[error("Internal error")]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub ingest_concurrency: usize,
    pub merge_concurrency: usize,
    pub accumulator_shards: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ingest_concurrency: 16,
            merge_concurrency: 16,
            accumulator_shards: 64,
        }
    }
}

#[derive(Debug, Default)]
pub struct Aggregation {
    /// Hosts in output order
    pub hosts: Vec<HostResult>,
    /// One entry per input file, in input order
    pub files: Vec<FileStats>,
}

pub struct Aggregator {
    config: Config,
}

impl Aggregator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs both phases over the given files.
    ///
    /// Merging starts only after every file has been ingested, because any file
    /// may contribute to any host. Cancellation is checked between files and
    /// between hosts; a cancelled run yields no result at all.
    pub async fn run(
        &self,
        files: Vec<PathBuf>,
        cancellation_token: CancellationToken,
    ) -> Result<Aggregation, AggregationError> {
        info!("Ingesting {} files", files.len());
        let accumulator = Arc::new(Accumulator::new(self.config.accumulator_shards));
        let stats = self
            .ingest(files, accumulator.clone(), &cancellation_token)
            .await?;
        let accumulator = Arc::into_inner(accumulator)
            .ok_or_else(|| anyhow::anyhow!("Accumulator is still shared after ingestion"))?;

        info!("Merging ranges of {} hosts", accumulator.host_count());
        let mut hosts = self.merge(accumulator, &cancellation_token).await?;

        sort_results(&mut hosts);
        metrics::HOSTS_EMITTED.inc_by(hosts.len() as u64);
        info!("Aggregated {} hosts", hosts.len());
        Ok(Aggregation {
            hosts,
            files: stats,
        })
    }

    #[instrument(skip_all)]
    async fn ingest(
        &self,
        files: Vec<PathBuf>,
        accumulator: Arc<Accumulator>,
        cancellation_token: &CancellationToken,
    ) -> Result<Vec<FileStats>, AggregationError> {
        let total = files.len();
        let stats: Vec<FileStats> = futures::stream::iter(files)
            .take_until(cancellation_token.cancelled())
            .map(|path| {
                let accumulator = accumulator.clone();
                async move {
                    let task_path = path.clone();
                    let joined = tokio::spawn(async move {
                        let parsed = parse_file(&task_path).await?;
                        accumulator.absorb(parsed.ranges);
                        anyhow::Ok(parsed.stats)
                    })
                    .await
                    .unwrap_or_else(|e| {
                        Err(anyhow::Error::new(e).context("File processing task panicked"))
                    });
                    match joined {
                        Ok(stats) => {
                            metrics::FILES_PROCESSED.inc();
                            info!("Processed file {}: {} directives", path, stats.directives);
                            stats
                        }
                        Err(e) => {
                            metrics::FILES_FAILED.inc();
                            warn!("Dropping file {path}: {e:?}");
                            FileStats::failed(path, &e)
                        }
                    }
                }
            })
            .buffered(self.config.ingest_concurrency.max(1))
            .collect()
            .await;
        if stats.len() < total {
            return Err(AggregationError::Cancelled);
        }
        Ok(stats)
    }

    #[instrument(skip_all)]
    async fn merge(
        &self,
        accumulator: Accumulator,
        cancellation_token: &CancellationToken,
    ) -> Result<Vec<HostResult>, AggregationError> {
        let hosts: Vec<_> = accumulator.into_hosts().collect();
        let total = hosts.len();
        let resolved: Vec<Option<HostResult>> = futures::stream::iter(hosts)
            .take_until(cancellation_token.cancelled())
            .map(|(_key, host)| async move {
                tokio::task::spawn_blocking(move || resolve_host(host))
                    .await
                    .map_err(|e| anyhow::Error::new(e).context("Merge task panicked"))
            })
            .buffer_unordered(self.config.merge_concurrency.max(1))
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<anyhow::Result<_>>()?;
        if resolved.len() < total {
            return Err(AggregationError::Cancelled);
        }
        Ok(resolved.into_iter().flatten().collect())
    }
}
