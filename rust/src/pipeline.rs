//! One sealing run: read → encrypt → write data → render → write source.
//!
//! The two writes are independent. If the source write fails the data file
//! written just before it stays on disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::ToolConfig;
use crate::crypto::integrity::sha256_hex;
use crate::crypto::EncryptionKey;
use crate::emitter::render_source;
use crate::transform::{encrypt_config, TransformError};
use crate::tree::{ConfigTree, InputError};

/// Errors that abort a run. Nothing is retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input error: {0}")]
    Input(#[from] InputError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("encrypted tree could not be serialized: {0}")]
    Serialize(serde_json::Error),
    #[error("unable to write {path}: {source}")]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub sealed_leaves: usize,
    pub dropped_nulls: usize,
    pub data_sha256: String,
    pub source_sha256: String,
}

pub fn run(config: &ToolConfig, key: &EncryptionKey) -> Result<RunReport, PipelineError> {
    info!("Reading configuration from {}...", config.input_path.display());
    let tree = ConfigTree::load(&config.input_path)?;
    let dropped_nulls = tree.null_count();

    info!("Encrypting configuration ({})...", config.scheme.as_str());
    let cipher = config.scheme.cipher(key);
    let sealed = encrypt_config(tree, cipher.as_ref())?;

    info!("Writing encrypted configuration to {}...", config.data_output_path.display());
    let data = serde_json::to_string_pretty(&sealed).map_err(PipelineError::Serialize)?;
    write_artifact(&config.data_output_path, &data)?;

    info!("Rendering Dart source...");
    let source = render_source(&sealed, config.source_label(), config.quote_policy);

    info!("Writing Dart source to {}...", config.source_output_path.display());
    write_artifact(&config.source_output_path, &source)?;

    let report = RunReport {
        sealed_leaves: sealed.leaf_count(),
        dropped_nulls,
        data_sha256: sha256_hex(data.as_bytes()),
        source_sha256: sha256_hex(source.as_bytes()),
    };
    debug!(
        data_sha256 = %report.data_sha256,
        source_sha256 = %report.source_sha256,
        "artifact fingerprints"
    );
    info!(
        "Done. Sealed {} values, dropped {} null entries.",
        report.sealed_leaves, report.dropped_nulls
    );
    Ok(report)
}

fn write_artifact(path: &Path, contents: &str) -> Result<(), PipelineError> {
    fs::write(path, contents).map_err(|source| PipelineError::Output {
        path: path.to_path_buf(),
        source,
    })
}
