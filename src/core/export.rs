use crate::core::snapshot::Snapshot;
use crate::error::ExportError;

/// Deterministic structural serialization of a [`Snapshot`].
///
/// Encoding is a pure function of the snapshot: stable field order, no
/// maps, no clock reads beyond the timestamp the snapshot already carries.
/// Where the document ends up (file, stdout) is the caller's concern.
pub struct SnapshotExporter;

impl SnapshotExporter {
    pub fn to_json(snapshot: &Snapshot) -> Result<String, ExportError> {
        serde_json::to_string_pretty(snapshot).map_err(ExportError::Encode)
    }

    pub fn from_json(document: &str) -> Result<Snapshot, ExportError> {
        serde_json::from_str(document).map_err(ExportError::Decode)
    }

    /// Conventional export filename, e.g. `connect_inventory_20260824_153000.json`.
    pub fn default_file_name(snapshot: &Snapshot) -> String {
        format!(
            "connect_inventory_{}.json",
            snapshot.collected_at.format("%Y%m%d_%H%M%S")
        )
    }
}
