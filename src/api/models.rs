use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Custom deserializer for AWS timestamps. The Connect REST API emits
/// creation times as (possibly fractional) epoch seconds; re-imported
/// snapshots carry them as RFC 3339 strings.
fn deserialize_aws_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        Some(Value::Number(n)) => Ok(n.as_f64().and_then(|secs| {
            let whole = secs.trunc() as i64;
            let nanos = (secs.fract() * 1_000_000_000.0) as u32;
            DateTime::from_timestamp(whole, nanos)
        })),
        Some(Value::String(s)) => Ok(DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))),
        _ => Ok(None),
    }
}

/// One entry of the root instance listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub arn: Option<String>,
    #[serde(default)]
    pub instance_alias: Option<String>,
    #[serde(default)]
    pub instance_status: Option<String>,
    #[serde(default)]
    pub identity_management_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_aws_timestamp")]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub instance_access_url: Option<String>,
    #[serde(default)]
    pub inbound_calls_enabled: Option<bool>,
    #[serde(default)]
    pub outbound_calls_enabled: Option<bool>,
    #[serde(default)]
    pub service_role: Option<String>,
}

impl InstanceSummary {
    /// The id this summary can be queried under, if the API returned one.
    pub fn instance_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Alias for human-facing output, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.instance_alias
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("(no alias)")
    }
}

/// Full instance description from the describe call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceDetail {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub arn: Option<String>,
    #[serde(default)]
    pub instance_alias: Option<String>,
    #[serde(default)]
    pub instance_status: Option<String>,
    #[serde(default)]
    pub identity_management_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_aws_timestamp")]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub instance_access_url: Option<String>,
    #[serde(default)]
    pub inbound_calls_enabled: Option<bool>,
    #[serde(default)]
    pub outbound_calls_enabled: Option<bool>,
    #[serde(default)]
    pub service_role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Queue {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub arn: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub queue_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub arn: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ContactFlow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub arn: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub contact_flow_type: Option<String>,
    #[serde(default)]
    pub contact_flow_state: Option<String>,
}

impl ContactFlow {
    pub fn is_active(&self) -> bool {
        self.contact_flow_state.as_deref() == Some("ACTIVE")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PhoneNumber {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub arn: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub phone_number_type: Option<String>,
    #[serde(default)]
    pub phone_number_country_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct HoursOfOperation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub arn: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A paginated list response: items plus the continuation token.
pub trait Page {
    type Item;
    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

macro_rules! page_response {
    ($response:ident, $field:ident, $item:ty) => {
        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "PascalCase")]
        pub struct $response {
            #[serde(default)]
            pub $field: Vec<$item>,
            #[serde(default)]
            pub next_token: Option<String>,
        }

        impl Page for $response {
            type Item = $item;
            fn into_parts(self) -> (Vec<Self::Item>, Option<String>) {
                (self.$field, self.next_token)
            }
        }
    };
}

page_response!(ListInstancesResponse, instance_summary_list, InstanceSummary);
page_response!(ListQueuesResponse, queue_summary_list, Queue);
page_response!(ListUsersResponse, user_summary_list, User);
page_response!(ListContactFlowsResponse, contact_flow_summary_list, ContactFlow);
page_response!(ListPhoneNumbersResponse, phone_number_summary_list, PhoneNumber);
page_response!(
    ListHoursOfOperationsResponse,
    hours_of_operation_summary_list,
    HoursOfOperation
);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeInstanceResponse {
    pub instance: InstanceDetail,
}
