//! Fixed locations and output options for a sealing run. Paths are relative
//! to the application project root, matching its `tools/`, `assets/` and
//! `lib/` layout.

use std::path::{Path, PathBuf};

use crate::crypto::Scheme;
use crate::emitter::QuotePolicy;

pub const INPUT_PATH: &str = "tools/config.json";
pub const DATA_OUTPUT_PATH: &str = "assets/encrypted_config.json";
pub const SOURCE_OUTPUT_PATH: &str = "lib/config/encrypted_config.dart";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    /// Plaintext JSON configuration.
    pub input_path: PathBuf,
    /// Encrypted JSON written for the client's asset bundle.
    pub data_output_path: PathBuf,
    /// Generated Dart source.
    pub source_output_path: PathBuf,
    pub scheme: Scheme,
    pub quote_policy: QuotePolicy,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(INPUT_PATH),
            data_output_path: PathBuf::from(DATA_OUTPUT_PATH),
            source_output_path: PathBuf::from(SOURCE_OUTPUT_PATH),
            scheme: Scheme::default(),
            quote_policy: QuotePolicy::default(),
        }
    }
}

impl ToolConfig {
    /// Same fixed layout, resolved under `root` instead of the working directory.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            input_path: root.join(INPUT_PATH),
            data_output_path: root.join(DATA_OUTPUT_PATH),
            source_output_path: root.join(SOURCE_OUTPUT_PATH),
            ..Self::default()
        }
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_quote_policy(mut self, quote_policy: QuotePolicy) -> Self {
        self.quote_policy = quote_policy;
        self
    }

    /// Label written into the generated file header. Always the
    /// project-relative location, whatever root the run uses.
    pub fn source_label(&self) -> &'static str {
        SOURCE_OUTPUT_PATH
    }
}
