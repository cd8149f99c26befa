// SQD range aggregator, a batch tool for the SQD network.
// Copyright (C) 2024 Subsquid Labs GmbH

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{Context, Result};
use clap::Parser;
use prometheus_client::metrics::info::Info;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use range_aggregator::cli::Args;
use range_aggregator::merge::format_results;
use range_aggregator::{metrics, storage, Aggregator};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn setup_tracing(args: &Args) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::builder().parse_lossy(
        std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV).unwrap_or("info".to_string()),
    );
    let fmt = tracing_subscriber::fmt::layer()
        .compact()
        .with_span_events(if args.log_span_durations {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .with_filter(env_filter);
    tracing_subscriber::registry().with(fmt).try_init()?;
    Ok(())
}

fn create_cancellation_token() -> Result<CancellationToken> {
    use tokio::signal::unix::{signal, SignalKind};

    let token = CancellationToken::new();
    let copy = token.clone();
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::spawn(async move {
        tokio::select!(
            _ = sigint.recv() => {
                copy.cancel();
            },
            _ = sigterm.recv() => {
                copy.cancel();
            },
        );
    });
    Ok(token)
}

async fn run(args: Args) -> Result<()> {
    setup_tracing(&args)?;

    let mut metrics_registry = prometheus_client::registry::Registry::default();
    let info = Info::new(vec![(
        "version".to_owned(),
        env!("CARGO_PKG_VERSION").to_owned(),
    )]);
    metrics::register_metrics(&mut metrics_registry, info);

    let files = storage::list_files(&args.input_dir, &args.pattern)?;
    if files.is_empty() {
        tracing::warn!("No input files found in {}", args.input_dir);
    }

    let cancellation_token = create_cancellation_token()?;
    let aggregation = Aggregator::new(args.aggregator_config())
        .run(files, cancellation_token)
        .await?;

    storage::write_lines(&args.output, format_results(&aggregation.hosts))
        .with_context(|| format!("Couldn't write results to {}", args.output))?;
    tracing::info!("Results written to {}", args.output);

    // Statistics and metrics are auxiliary, failing to write them doesn't fail the run
    if let Err(e) =
        storage::write_statistics(&args.statistics, &aggregation.files, args.statistics_format)
    {
        tracing::warn!("Couldn't write statistics: {e:?}");
    }
    if let Some(path) = &args.metrics {
        if let Err(e) = storage::write_metrics(path, &metrics_registry) {
            tracing::warn!("Couldn't write metrics: {e:?}");
        }
    }

    tracing::info!("Done");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut runtime = tokio::runtime::Builder::new_multi_thread();
    if let Some(threads) = args.worker_threads {
        runtime.worker_threads(threads.max(1));
    }
    runtime.enable_all().build()?.block_on(run(args))
}
