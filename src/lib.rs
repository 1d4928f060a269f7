pub use error::AppError;

/// Main architecture layers (dependency flow: CLI → Core → API)
pub mod cli; // Command-line interface
pub mod core; // Inventory collection and snapshot assembly
pub mod storage; // Configuration persistence

/// Support modules (used across layers)
pub mod api; // Amazon Connect API client
pub mod display; // Output formatting
pub mod error; // Error handling
pub mod utils; // Shared utilities and helpers

pub type Result<T> = std::result::Result<T, AppError>;
