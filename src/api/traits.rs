use async_trait::async_trait;

use crate::api::models::{
    ContactFlow, HoursOfOperation, InstanceDetail, InstanceSummary, PhoneNumber, Queue, User,
};
use crate::error::ApiError;

/// Capability surface the inventory collector consumes.
///
/// Every call is independently failable; the collector never infers the
/// outcome of one call from another. Implementations must be safe for
/// concurrent use and own any retry/backoff policy themselves — callers only
/// see final outcomes.
#[async_trait]
pub trait ConnectApi: Send + Sync {
    /// Root of the traversal. The one call whose failure aborts a run.
    async fn list_instances(&self) -> Result<Vec<InstanceSummary>, ApiError>;

    async fn describe_instance(&self, instance_id: &str) -> Result<InstanceDetail, ApiError>;

    async fn list_queues(&self, instance_id: &str) -> Result<Vec<Queue>, ApiError>;

    async fn list_users(&self, instance_id: &str) -> Result<Vec<User>, ApiError>;

    async fn list_contact_flows(&self, instance_id: &str) -> Result<Vec<ContactFlow>, ApiError>;

    async fn list_phone_numbers(&self, instance_id: &str) -> Result<Vec<PhoneNumber>, ApiError>;

    async fn list_hours_of_operations(
        &self,
        instance_id: &str,
    ) -> Result<Vec<HoursOfOperation>, ApiError>;
}
