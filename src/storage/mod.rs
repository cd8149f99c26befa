pub mod local_fs;
pub mod report;

pub use local_fs::{list_files, write_lines};
pub use report::{write_metrics, write_statistics, StatsFormat};
