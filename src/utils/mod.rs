//! Utils module - Shared utilities and helpers
//!
//! This module provides utility functions and helpers that are used across
//! multiple layers of the application architecture.

/// Verbose/console logging helpers
pub mod logging;

/// Backoff-based retry policy for the API client
pub mod retry;

/// Text truncation for table cells
pub mod text;
