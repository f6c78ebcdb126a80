//! Seals a plaintext application configuration for a Dart client: every leaf
//! is encrypted in place, the result is written as JSON, and the same tree is
//! rendered into a generated `EncryptedConfig` class.

pub mod config;
pub mod crypto;
pub mod emitter;
pub mod logging;
pub mod pipeline;
pub mod transform;
pub mod tree;
