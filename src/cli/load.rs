use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::export::write_dot;
use crate::keys::RecordReader;
use crate::tree::{RbTree, TreeOptions};
use crate::types::RbError;

/// Records between two progress callbacks.
pub const PROGRESS_INTERVAL: u64 = 4096;

/// Configuration for loading records into a tree.
#[derive(Debug, Clone, Default)]
pub struct LoadConfig {
    /// Input file; standard input when `None`.
    pub input: Option<PathBuf>,
    /// Destination for a DOT rendering of the loaded tree.
    pub export: Option<PathBuf>,
    /// Storage sizing for the tree.
    pub tree: TreeOptions,
}

/// Summary of a load operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadSummary {
    /// Where the records came from (`-` for standard input).
    pub input: String,
    /// Newline-terminated records read.
    pub records_read: u64,
    /// Nodes inserted into the tree.
    pub nodes_inserted: usize,
    /// Length of an unterminated final line that was skipped.
    pub trailing_bytes_ignored: usize,
    /// Path the DOT rendering was written to.
    pub exported_to: Option<String>,
    /// Wall-clock time for reading and inserting, in milliseconds.
    pub duration_ms: f64,
}

/// Errors that can occur while loading or exporting.
#[derive(Debug, Error)]
pub enum CliError {
    /// Generic error message.
    #[error("{0}")]
    Message(String),
    /// IO error on standard streams.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The input file could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        /// Input path.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// The export file could not be created.
    #[error("failed to create {path}: {source}")]
    Create {
        /// Export path.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// Tree storage error.
    #[error(transparent)]
    Tree(#[from] RbError),
}

impl From<&str> for CliError {
    fn from(value: &str) -> Self {
        CliError::Message(value.to_string())
    }
}

impl From<String> for CliError {
    fn from(value: String) -> Self {
        CliError::Message(value)
    }
}

/// Reads every record from `reader` into a new tree.
///
/// Each record is keyed by its one-at-a-time hash and stored with its text
/// as the payload. `progress` is called with the running record count every
/// [`PROGRESS_INTERVAL`] records.
pub fn load_from<R, F>(
    reader: R,
    opts: TreeOptions,
    mut progress: F,
) -> Result<(RbTree<String>, LoadSummary), CliError>
where
    R: BufRead,
    F: FnMut(u64),
{
    let start = Instant::now();
    let mut tree = RbTree::with_options(opts)?;
    let mut records = RecordReader::new(reader);
    while let Some(record) = records.next_record()? {
        tree.insert(record.key(), record.text())?;
        let read = records.records_read();
        if read % PROGRESS_INTERVAL == 0 {
            progress(read);
        }
    }

    let summary = LoadSummary {
        input: "-".to_string(),
        records_read: records.records_read(),
        nodes_inserted: tree.len(),
        trailing_bytes_ignored: records.trailing_fragment(),
        exported_to: None,
        duration_ms: start.elapsed().as_secs_f64() * 1_000.0,
    };
    debug!(
        records = summary.records_read,
        rows = tree.storage_shape().rows,
        "cli.load.done"
    );
    Ok((tree, summary))
}

/// Executes a complete load: open the input, insert every record and write
/// the DOT export if one was requested.
pub fn run_load<F>(cfg: &LoadConfig, progress: F) -> Result<(RbTree<String>, LoadSummary), CliError>
where
    F: FnMut(u64),
{
    let (tree, mut summary) = match cfg.input.as_deref() {
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::Open {
                path: path.to_path_buf(),
                source,
            })?;
            let (tree, mut summary) = load_from(BufReader::new(file), cfg.tree.clone(), progress)?;
            summary.input = path.display().to_string();
            (tree, summary)
        }
        None => {
            let stdin = io::stdin();
            load_from(stdin.lock(), cfg.tree.clone(), progress)?
        }
    };

    if let Some(path) = cfg.export.as_deref() {
        export_dot(&tree, path)?;
        summary.exported_to = Some(path.display().to_string());
    }
    info!(
        input = %summary.input,
        nodes = summary.nodes_inserted,
        "cli.load.finished"
    );
    Ok((tree, summary))
}

fn export_dot(tree: &RbTree<String>, path: &Path) -> Result<(), CliError> {
    let file = File::create(path).map_err(|source| CliError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_dot(tree, BufWriter::new(file))?;
    Ok(())
}
