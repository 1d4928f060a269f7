//! Inventory collection core: fan-out traversal over instances with
//! per-call failure isolation, snapshot assembly, and export.

pub mod cancel;
pub mod collector;
pub mod export;
pub mod snapshot;

pub use cancel::CancelToken;
pub use collector::InventoryCollector;
pub use export::SnapshotExporter;
pub use snapshot::{
    CollectionResult, Diagnostic, InstanceRecord, ResourceKind, Snapshot, SnapshotTotals,
};
