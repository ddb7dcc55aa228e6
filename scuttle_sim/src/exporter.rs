//! Writers for the fixture output directory.
//!
//! ```text
//! <output_dir>/
//!   log.ndjson          one record per line, generation order
//!   report.md           stats (optional)
//!   follow-graph.json   {source: {dest: true|false}} (optional)
//!   secret              primary participant's keys
//!   secret-<i>          other participants' keys (optional)
//! ```

use crate::error::RunError;
use crate::keys::Identity;
use crate::report::Report;
use scuttle_core::{Content, SocialState};
use scuttle_env::Record;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// One line of `log.ndjson`.
#[derive(Serialize)]
struct LogLine<'a> {
    #[serde(flatten)]
    record: &'a Record<Content>,

    /// True for payloads that would be encrypted on a real network
    private: bool,
}

/// Follow graph in the boolean encoding: `true` following, `false` blocking.
///
/// A block overrides a follow of the same pair.
pub fn follow_graph(state: &SocialState) -> BTreeMap<String, BTreeMap<String, bool>> {
    let mut graph: BTreeMap<String, BTreeMap<String, bool>> = BTreeMap::new();
    for (source, dests) in state.follow_graph() {
        for dest in dests {
            graph
                .entry(source.to_string())
                .or_default()
                .insert(dest.to_string(), true);
        }
    }
    for (source, dests) in state.block_graph() {
        for dest in dests {
            graph
                .entry(source.to_string())
                .or_default()
                .insert(dest.to_string(), false);
        }
    }
    graph
}

/// Writes `log.ndjson`.
pub fn write_log(dir: &Path, log: &[Record<Content>]) -> Result<PathBuf, RunError> {
    let path = dir.join("log.ndjson");
    let mut out = BufWriter::new(File::create(&path)?);
    for record in log {
        let line = LogLine {
            record,
            private: record.content().is_private(),
        };
        serde_json::to_writer(&mut out, &line)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(path)
}

/// Writes `report.md`.
pub fn write_report(dir: &Path, report: &Report) -> Result<PathBuf, RunError> {
    let path = dir.join("report.md");
    fs::write(&path, report.render())?;
    Ok(path)
}

/// Writes `follow-graph.json`.
pub fn write_follow_graph(dir: &Path, state: &SocialState) -> Result<PathBuf, RunError> {
    let path = dir.join("follow-graph.json");
    fs::write(&path, serde_json::to_string_pretty(&follow_graph(state))?)?;
    Ok(path)
}

/// Writes `secret` for the primary participant and, with `all_keys`,
/// `secret-<i>` for every other one.
pub fn write_secrets(
    dir: &Path,
    identities: &[Identity],
    all_keys: bool,
) -> Result<Vec<PathBuf>, RunError> {
    let mut written = Vec::new();
    for identity in identities {
        let name = match identity.index {
            0 => "secret".to_string(),
            i if all_keys => format!("secret-{}", i),
            _ => continue,
        };
        let path = dir.join(name);
        fs::write(&path, serde_json::to_string_pretty(&identity.secret())?)?;
        written.push(path);
    }
    Ok(written)
}

/// What to write besides the log.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    pub report: bool,
    pub follow_graph: bool,
    pub all_keys: bool,
}

/// Writes every requested file into `dir`, creating it if needed.
pub fn export_all(
    dir: &Path,
    log: &[Record<Content>],
    state: &SocialState,
    report: &Report,
    identities: &[Identity],
    options: ExportOptions,
) -> Result<Vec<PathBuf>, RunError> {
    fs::create_dir_all(dir)?;
    let mut written = vec![write_log(dir, log)?];
    if options.report {
        written.push(write_report(dir, report)?);
    }
    if options.follow_graph {
        written.push(write_follow_graph(dir, state)?);
    }
    written.extend(write_secrets(dir, identities, options.all_keys)?);

    info!("Wrote {} files to {}", written.len(), dir.display());
    Ok(written)
}
