use std::io::{BufWriter, Write};

use anyhow::{anyhow, Context, Result};
use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use tracing::{debug, instrument, warn};

/// Lists regular files placed directly in `dir` whose names match `pattern`.
///
/// The result is sorted by file name.
#[instrument(skip_all, fields(dir = %dir))]
pub fn list_files(dir: &Path, pattern: &glob::Pattern) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.with_context(|| format!("Couldn't list dir {dir}"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = match PathBuf::try_from(entry.into_path()) {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping non UTF-8 path {:?}", e.as_path());
                continue;
            }
        };
        let matches = path
            .file_name()
            .is_some_and(|name| pattern.matches(name));
        if matches {
            files.push(path);
        } else {
            debug!("Skipping {path}: doesn't match '{pattern}'");
        }
    }
    Ok(files)
}

/// Writes all lines to `path`, replacing it only once everything is written.
#[instrument(skip(lines))]
pub fn write_lines<I>(path: &Path, lines: I) -> Result<()>
where
    I: IntoIterator,
    I::Item: std::fmt::Display,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Couldn't create dir '{parent}'"))?;
    }
    let tmp = add_temp_prefix(path)?;
    let guard = scopeguard::guard(tmp, |tmp| {
        if let Err(e) = std::fs::remove_file(&tmp) {
            debug!("Couldn't remove temp file '{tmp}': {e}");
        }
    });

    let file = std::fs::File::create(&*guard)
        .with_context(|| format!("Couldn't create file '{}'", *guard))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    writer
        .into_inner()
        .map_err(|e| e.into_error())?
        .sync_all()?;

    let tmp = scopeguard::ScopeGuard::into_inner(guard);
    std::fs::rename(&tmp, path).with_context(|| format!("Couldn't move '{tmp}' to '{path}'"))?;
    Ok(())
}

pub fn add_temp_prefix(path: &Path) -> Result<PathBuf> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .context("Invalid system time")?
        .as_millis();
    let result: Option<_> = (|| {
        let name = path.file_name()?;
        let new_name = format!("temp-{}-{}", timestamp, name);
        Some(path.parent()?.join(new_name))
    })();
    result.ok_or_else(|| anyhow!("Invalid output path: {path}"))
}
