use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::models::{
    ContactFlow, HoursOfOperation, InstanceDetail, InstanceSummary, PhoneNumber, Queue, User,
};
use crate::error::ApiError;

/// The resource taxonomy an inventory run walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Instances,
    InstanceDetails,
    Queues,
    Users,
    ContactFlows,
    PhoneNumbers,
    HoursOfOperations,
}

impl ResourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Instances => "instances",
            ResourceKind::InstanceDetails => "instance details",
            ResourceKind::Queues => "queues",
            ResourceKind::Users => "users",
            ResourceKind::ContactFlows => "contact flows",
            ResourceKind::PhoneNumbers => "phone numbers",
            ResourceKind::HoursOfOperations => "hours of operations",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured description of one failed sub-query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: ResourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    pub cause: String,
}

impl Diagnostic {
    pub fn from_api(kind: ResourceKind, instance_id: Option<&str>, error: &ApiError) -> Self {
        Diagnostic {
            kind,
            instance_id: instance_id.map(str::to_string),
            cause: error.to_string(),
        }
    }
}

/// Tagged outcome of a single sub-query. Failures are data here, not
/// control flow: an empty listing and a failed listing serialize to
/// distinguishable forms, and the diagnostic survives export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CollectionResult<T> {
    Ok { value: T },
    Err { error: Diagnostic },
}

impl<T> CollectionResult<T> {
    pub fn from_api(
        kind: ResourceKind,
        instance_id: Option<&str>,
        result: Result<T, ApiError>,
    ) -> Self {
        match result {
            Ok(value) => CollectionResult::Ok { value },
            Err(error) => CollectionResult::Err {
                error: Diagnostic::from_api(kind, instance_id, &error),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CollectionResult::Ok { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            CollectionResult::Ok { value } => Some(value),
            CollectionResult::Err { .. } => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            CollectionResult::Ok { .. } => None,
            CollectionResult::Err { error } => Some(error),
        }
    }
}

impl<T> CollectionResult<Vec<T>> {
    /// Number of successfully listed items; a failed listing counts zero
    /// without pretending to be an empty success.
    pub fn count(&self) -> usize {
        self.value().map(Vec::len).unwrap_or(0)
    }
}

/// Everything collected for one discovered instance. Assembled once from
/// the six independent call outcomes, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub summary: InstanceSummary,
    pub details: CollectionResult<InstanceDetail>,
    pub queues: CollectionResult<Vec<Queue>>,
    pub users: CollectionResult<Vec<User>>,
    pub contact_flows: CollectionResult<Vec<ContactFlow>>,
    pub phone_numbers: CollectionResult<Vec<PhoneNumber>>,
    pub hours_of_operations: CollectionResult<Vec<HoursOfOperation>>,
}

/// Per-kind sums of successfully listed sub-resources across all instances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotTotals {
    pub instances: usize,
    pub queues: usize,
    pub users: usize,
    pub contact_flows: usize,
    pub phone_numbers: usize,
    pub hours_of_operations: usize,
}

impl SnapshotTotals {
    pub fn compute(records: &[InstanceRecord]) -> Self {
        records.iter().fold(
            SnapshotTotals {
                instances: records.len(),
                ..SnapshotTotals::default()
            },
            |mut totals, record| {
                totals.queues += record.queues.count();
                totals.users += record.users.count();
                totals.contact_flows += record.contact_flows.count();
                totals.phone_numbers += record.phone_numbers.count();
                totals.hours_of_operations += record.hours_of_operations.count();
                totals
            },
        )
    }
}

/// The complete, immutable result of one inventory run. Instances appear
/// in discovery order regardless of how collection was scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub collected_at: DateTime<Utc>,
    pub region: String,
    /// True when cancellation skipped at least one discovered instance.
    pub partial: bool,
    pub totals: SnapshotTotals,
    pub instances: Vec<InstanceRecord>,
}

impl Snapshot {
    pub fn assemble(region: impl Into<String>, instances: Vec<InstanceRecord>, partial: bool) -> Self {
        let totals = SnapshotTotals::compute(&instances);
        Snapshot {
            collected_at: Utc::now(),
            region: region.into(),
            partial,
            totals,
            instances,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn summary(id: &str, alias: &str) -> InstanceSummary {
        serde_json::from_value(serde_json::json!({
            "Id": id,
            "InstanceAlias": alias,
            "InstanceStatus": "ACTIVE"
        }))
        .unwrap()
    }

    fn queue(id: &str) -> Queue {
        serde_json::from_value(serde_json::json!({"Id": id, "Name": id})).unwrap()
    }

    fn record_with_queues(id: &str, queues: Vec<Queue>) -> InstanceRecord {
        InstanceRecord {
            summary: summary(id, id),
            details: CollectionResult::Err {
                error: Diagnostic {
                    kind: ResourceKind::InstanceDetails,
                    instance_id: Some(id.to_string()),
                    cause: "denied".to_string(),
                },
            },
            queues: CollectionResult::Ok { value: queues },
            users: CollectionResult::Ok { value: vec![] },
            contact_flows: CollectionResult::Ok { value: vec![] },
            phone_numbers: CollectionResult::Ok { value: vec![] },
            hours_of_operations: CollectionResult::Ok { value: vec![] },
        }
    }

    #[test]
    fn test_empty_success_and_failure_serialize_differently() {
        let ok: CollectionResult<Vec<Queue>> = CollectionResult::Ok { value: vec![] };
        let err: CollectionResult<Vec<Queue>> = CollectionResult::Err {
            error: Diagnostic {
                kind: ResourceKind::Queues,
                instance_id: Some("i-1".to_string()),
                cause: "Access denied for list_queues: denied".to_string(),
            },
        };

        let ok_json = serde_json::to_value(&ok).unwrap();
        let err_json = serde_json::to_value(&err).unwrap();
        assert_eq!(ok_json["status"], "ok");
        assert_eq!(err_json["status"], "err");
        assert_eq!(err_json["error"]["kind"], "queues");
        assert_eq!(err_json["error"]["instance_id"], "i-1");
        assert_ne!(ok_json, err_json);
    }

    #[test]
    fn test_collection_result_from_api() {
        let ok = CollectionResult::from_api(
            ResourceKind::Queues,
            Some("i-1"),
            Ok(vec![queue("q1")]),
        );
        assert!(ok.is_ok());
        assert_eq!(ok.count(), 1);

        let err: CollectionResult<Vec<Queue>> = CollectionResult::from_api(
            ResourceKind::Queues,
            Some("i-1"),
            Err(ApiError::Throttled {
                endpoint: "list_queues".to_string(),
                message: "rate exceeded".to_string(),
            }),
        );
        assert!(!err.is_ok());
        assert_eq!(err.count(), 0);
        let diagnostic = err.diagnostic().unwrap();
        assert_eq!(diagnostic.kind, ResourceKind::Queues);
        assert_eq!(diagnostic.instance_id.as_deref(), Some("i-1"));
        assert!(diagnostic.cause.contains("rate exceeded"));
    }

    #[test]
    fn test_totals_match_per_record_counts() {
        let records = vec![
            record_with_queues("i-1", vec![queue("q1"), queue("q2"), queue("q3")]),
            record_with_queues("i-2", vec![]),
        ];
        let totals = SnapshotTotals::compute(&records);
        assert_eq!(totals.instances, 2);
        assert_eq!(totals.queues, 3);
        assert_eq!(totals.users, 0);

        // The aggregate never diverges from a recount over the Ok results
        let recounted: usize = records.iter().map(|r| r.queues.count()).sum();
        assert_eq!(totals.queues, recounted);
    }

    #[test]
    fn test_failed_listing_does_not_count() {
        let mut record = record_with_queues("i-1", vec![queue("q1")]);
        record.queues = CollectionResult::Err {
            error: Diagnostic {
                kind: ResourceKind::Queues,
                instance_id: Some("i-1".to_string()),
                cause: "denied".to_string(),
            },
        };
        let totals = SnapshotTotals::compute(std::slice::from_ref(&record));
        assert_eq!(totals.queues, 0);
    }

    #[test]
    fn test_snapshot_assemble_preserves_order() {
        let records = vec![
            record_with_queues("i-1", vec![queue("q1")]),
            record_with_queues("i-2", vec![]),
        ];
        let snapshot = Snapshot::assemble("us-east-1", records, false);
        assert_eq!(snapshot.region, "us-east-1");
        assert!(!snapshot.partial);
        let ids: Vec<_> = snapshot
            .instances
            .iter()
            .map(|r| r.summary.instance_id().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["i-1", "i-2"]);
    }

    #[test]
    fn test_resource_kind_labels() {
        assert_eq!(ResourceKind::Queues.to_string(), "queues");
        assert_eq!(ResourceKind::HoursOfOperations.to_string(), "hours of operations");
    }
}
