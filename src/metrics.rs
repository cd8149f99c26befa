use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::info::Info;
use prometheus_client::registry::Registry;

lazy_static::lazy_static! {
    pub static ref FILES_PROCESSED: Counter = Default::default();
    pub static ref FILES_FAILED: Counter = Default::default();
    pub static ref DIRECTIVES: Counter = Default::default();
    pub static ref SKIPPED_LINES: Counter = Default::default();
    pub static ref INVALID_LINES: Counter = Default::default();
    pub static ref HOSTS_EMITTED: Counter = Default::default();
}

pub fn register_metrics(registry: &mut Registry, info: Info<Vec<(String, String)>>) {
    registry.register("aggregator_info", "Aggregator info", info);
    registry.register(
        "num_files_processed",
        "Number of input files which were read completely",
        FILES_PROCESSED.clone(),
    );
    registry.register(
        "num_files_failed",
        "Number of input files which couldn't be read",
        FILES_FAILED.clone(),
    );
    registry.register(
        "num_directives",
        "Number of recognized directive lines",
        DIRECTIVES.clone(),
    );
    registry.register(
        "num_skipped_lines",
        "Number of lines which are not directives",
        SKIPPED_LINES.clone(),
    );
    registry.register(
        "num_invalid_lines",
        "Number of directive lines with an unparsable range",
        INVALID_LINES.clone(),
    );
    registry.register(
        "num_hosts_emitted",
        "Number of hosts written to the output",
        HOSTS_EMITTED.clone(),
    );
}
