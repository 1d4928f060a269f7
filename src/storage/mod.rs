//! Storage layer for connect-audit
//!
//! Handles configuration profiles (TOML under the user config dir). AWS
//! credentials are never stored here; they come from the standard AWS
//! resolution chain (environment, shared config, IMDS).

use crate::error::StorageError;

pub mod config;

type Result<T> = std::result::Result<T, StorageError>;
