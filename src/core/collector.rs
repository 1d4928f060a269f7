use std::sync::Arc;

use futures::StreamExt;
use futures::stream;

use crate::api::ConnectApi;
use crate::api::models::InstanceSummary;
use crate::core::cancel::CancelToken;
use crate::core::snapshot::{CollectionResult, InstanceRecord, ResourceKind, Snapshot};
use crate::error::CollectError;
use crate::utils::logging::log_warning;

const DEFAULT_CONCURRENCY: usize = 4;

/// Walks the Connect resource hierarchy and assembles a [`Snapshot`].
///
/// Per-instance work units are independent: a failing sub-query degrades
/// exactly one snapshot field, and no instance's outcome influences
/// another's. Only the root instance listing can abort a run.
pub struct InventoryCollector<C> {
    client: Arc<C>,
    region: String,
    concurrency: usize,
    cancel: CancelToken,
}

impl<C: ConnectApi> InventoryCollector<C> {
    pub fn new(client: Arc<C>, region: impl Into<String>) -> Self {
        InventoryCollector {
            client,
            region: region.into(),
            concurrency: DEFAULT_CONCURRENCY,
            cancel: CancelToken::new(),
        }
    }

    /// Bound on instances processed at once, protecting the remote API.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Handle for stopping the run early; see [`CancelToken`].
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run the inventory. Fails only if the root listing fails; every other
    /// error is folded into the snapshot as a per-field diagnostic.
    pub async fn collect(&self) -> Result<Snapshot, CollectError> {
        let summaries = self
            .client
            .list_instances()
            .await
            .map_err(|source| CollectError::InstanceListing { source })?;

        let discovered = discovered_instances(summaries);
        let discovered_count = discovered.len();

        let mut indexed: Vec<(usize, Option<InstanceRecord>)> =
            stream::iter(discovered.into_iter().enumerate())
                .map(|(index, summary)| {
                    let client = Arc::clone(&self.client);
                    let cancel = self.cancel.clone();
                    async move {
                        if cancel.is_cancelled() {
                            return (index, None);
                        }
                        (index, Some(collect_instance(client.as_ref(), summary).await))
                    }
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        // Completion order is arbitrary under concurrency; the snapshot
        // always lists instances in discovery order.
        indexed.sort_by_key(|(index, _)| *index);
        let records: Vec<InstanceRecord> =
            indexed.into_iter().filter_map(|(_, record)| record).collect();

        let partial = records.len() < discovered_count;
        Ok(Snapshot::assemble(&self.region, records, partial))
    }
}

/// Summaries without a usable id cannot be described or queried, so they
/// are dropped from the run rather than recorded as six failures sharing
/// one root cause.
fn discovered_instances(summaries: Vec<InstanceSummary>) -> Vec<InstanceSummary> {
    summaries
        .into_iter()
        .filter(|summary| {
            if summary.instance_id().is_some() {
                true
            } else {
                log_warning(&format!(
                    "Skipping instance summary without an id (arn: {})",
                    summary.arn.as_deref().unwrap_or("unknown")
                ));
                false
            }
        })
        .collect()
}

/// Issue the describe call and the five listings for one instance, all
/// concurrently, and assemble the record from whatever came back.
async fn collect_instance<C: ConnectApi + ?Sized>(
    client: &C,
    summary: InstanceSummary,
) -> InstanceRecord {
    let id = summary.instance_id().unwrap_or_default().to_string();

    let (details, queues, users, contact_flows, phone_numbers, hours_of_operations) = tokio::join!(
        client.describe_instance(&id),
        client.list_queues(&id),
        client.list_users(&id),
        client.list_contact_flows(&id),
        client.list_phone_numbers(&id),
        client.list_hours_of_operations(&id),
    );

    InstanceRecord {
        details: CollectionResult::from_api(ResourceKind::InstanceDetails, Some(&id), details),
        queues: CollectionResult::from_api(ResourceKind::Queues, Some(&id), queues),
        users: CollectionResult::from_api(ResourceKind::Users, Some(&id), users),
        contact_flows: CollectionResult::from_api(
            ResourceKind::ContactFlows,
            Some(&id),
            contact_flows,
        ),
        phone_numbers: CollectionResult::from_api(
            ResourceKind::PhoneNumbers,
            Some(&id),
            phone_numbers,
        ),
        hours_of_operations: CollectionResult::from_api(
            ResourceKind::HoursOfOperations,
            Some(&id),
            hours_of_operations,
        ),
        summary,
    }
}
