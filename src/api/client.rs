use std::time::Duration;

use async_trait::async_trait;
use aws_credential_types::Credentials;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::api::models::{
    ContactFlow, DescribeInstanceResponse, HoursOfOperation, InstanceDetail, InstanceSummary,
    ListContactFlowsResponse, ListHoursOfOperationsResponse, ListInstancesResponse,
    ListPhoneNumbersResponse, ListQueuesResponse, ListUsersResponse, Page, PhoneNumber, Queue,
    User,
};
use crate::api::sign::sign_request;
use crate::api::traits::ConnectApi;
use crate::error::ApiError;
use crate::utils::retry::{RetryConfig, RetryExecutor};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("connect-audit/", env!("CARGO_PKG_VERSION"));

/// SigV4-signed HTTP client for the Amazon Connect REST endpoints.
///
/// Transient failures (throttling, timeouts, 5xx, network) are retried here
/// with bounded exponential backoff; callers only ever see final outcomes.
#[derive(Debug)]
pub struct ConnectClient {
    client: Client,
    base_url: String,
    region: String,
    credentials: Credentials,
    retry: RetryExecutor,
    timeout_secs: u64,
}

impl ConnectClient {
    pub fn new(region: &str, credentials: Credentials) -> Result<Self, ApiError> {
        Self::with_timeout(region, credentials, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(
        region: &str,
        credentials: Credentials,
        timeout_secs: u64,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Http {
                status: 0,
                endpoint: "client_init".to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(ConnectClient {
            client,
            base_url: format!("https://connect.{}.amazonaws.com", region),
            region: region.to_string(),
            credentials,
            retry: RetryExecutor::new(RetryConfig::default()),
            timeout_secs,
        })
    }

    /// Point the client at a different endpoint (local stacks, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry = RetryExecutor::new(config);
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    fn endpoint_url(&self, path: &str, endpoint: &str) -> Result<Url, ApiError> {
        Url::parse(&format!("{}{}", self.base_url, path)).map_err(|e| ApiError::Http {
            status: 0,
            endpoint: endpoint.to_string(),
            message: format!("Invalid request URL: {}", e),
        })
    }

    /// Fetch every page of a listing, following `NextToken` continuations.
    async fn get_all<P>(&self, path: &str, endpoint: &str) -> Result<Vec<P::Item>, ApiError>
    where
        P: Page + DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut url = self.endpoint_url(path, endpoint)?;
            if let Some(token) = &next_token {
                url.query_pairs_mut().append_pair("nextToken", token);
            }

            let page: P = self.get_json(&url, endpoint).await?;
            let (batch, token) = page.into_parts();
            items.extend(batch);

            match token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url, endpoint: &str) -> Result<T, ApiError> {
        self.retry.execute(|| self.fetch_once(url, endpoint)).await
    }

    async fn fetch_once<T: DeserializeOwned>(
        &self,
        url: &Url,
        endpoint: &str,
    ) -> Result<T, ApiError> {
        // SigV4 signs the host header, so it has to be set before signing
        // rather than left for the transport to fill in.
        let host = match url.port() {
            Some(port) => format!("{}:{}", url.host_str().unwrap_or_default(), port),
            None => url.host_str().unwrap_or_default().to_string(),
        };
        let mut request = http::Request::builder()
            .method(http::Method::GET)
            .uri(url.as_str())
            .header(http::header::HOST, host)
            .header(http::header::ACCEPT, "application/json")
            .body(Vec::new())
            .map_err(|e| ApiError::Http {
                status: 0,
                endpoint: endpoint.to_string(),
                message: format!("Failed to build request: {}", e),
            })?;

        sign_request(&mut request, &self.credentials, &self.region)?;

        let request = reqwest::Request::try_from(request).map_err(|e| ApiError::Http {
            status: 0,
            endpoint: endpoint.to_string(),
            message: format!("Failed to convert request: {}", e),
        })?;

        let response = self.client.execute(request).await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    timeout_secs: self.timeout_secs,
                    endpoint: endpoint.to_string(),
                }
            } else {
                ApiError::Network {
                    endpoint: endpoint.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        self.handle_response(response, endpoint).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        endpoint: &str,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if status.is_success() {
            response.json::<T>().await.map_err(|e| ApiError::Http {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            let header_code = response
                .headers()
                .get("x-amzn-errortype")
                .and_then(|v| v.to_str().ok())
                .map(normalize_error_code);
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let body: Option<AwsErrorBody> = serde_json::from_str(&error_text).ok();
            let code = header_code.or_else(|| {
                body.as_ref()
                    .and_then(|b| b.error_type.as_deref())
                    .map(normalize_error_code)
            });
            let message = body
                .and_then(|b| b.message)
                .unwrap_or(error_text);

            Err(classify_aws_error(
                status.as_u16(),
                code.as_deref(),
                message,
                endpoint,
                self.timeout_secs,
            ))
        }
    }
}

/// Wire shape of an AWS error body.
#[derive(Debug, Deserialize)]
struct AwsErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

/// Strip the namespace/URI decoration AWS attaches to error codes, e.g.
/// `com.amazonaws.connect#AccessDeniedException` or
/// `ThrottlingException:http://internal/`.
fn normalize_error_code(raw: &str) -> String {
    let code = raw.split(':').next().unwrap_or(raw);
    code.rsplit('#').next().unwrap_or(code).to_string()
}

fn classify_aws_error(
    status: u16,
    code: Option<&str>,
    message: String,
    endpoint: &str,
    timeout_secs: u64,
) -> ApiError {
    match (code, status) {
        (Some("AccessDeniedException" | "UnauthorizedException"), _) | (None, 403) => {
            ApiError::AccessDenied {
                endpoint: endpoint.to_string(),
                message,
            }
        }
        (Some("ResourceNotFoundException"), _) | (None, 404) => ApiError::NotFound {
            endpoint: endpoint.to_string(),
            message,
        },
        (Some("ThrottlingException" | "TooManyRequestsException"), _) | (_, 429) => {
            ApiError::Throttled {
                endpoint: endpoint.to_string(),
                message,
            }
        }
        (_, 408 | 504) => ApiError::Timeout {
            timeout_secs,
            endpoint: endpoint.to_string(),
        },
        _ => ApiError::Http {
            status,
            endpoint: endpoint.to_string(),
            message,
        },
    }
}

#[async_trait]
impl ConnectApi for ConnectClient {
    async fn list_instances(&self) -> Result<Vec<InstanceSummary>, ApiError> {
        self.get_all::<ListInstancesResponse>("/instance", "list_instances")
            .await
    }

    async fn describe_instance(&self, instance_id: &str) -> Result<InstanceDetail, ApiError> {
        let url = self.endpoint_url(&format!("/instance/{}", instance_id), "describe_instance")?;
        let response: DescribeInstanceResponse =
            self.get_json(&url, "describe_instance").await?;
        Ok(response.instance)
    }

    async fn list_queues(&self, instance_id: &str) -> Result<Vec<Queue>, ApiError> {
        self.get_all::<ListQueuesResponse>(&format!("/queues-summary/{}", instance_id), "list_queues")
            .await
    }

    async fn list_users(&self, instance_id: &str) -> Result<Vec<User>, ApiError> {
        self.get_all::<ListUsersResponse>(&format!("/users-summary/{}", instance_id), "list_users")
            .await
    }

    async fn list_contact_flows(&self, instance_id: &str) -> Result<Vec<ContactFlow>, ApiError> {
        self.get_all::<ListContactFlowsResponse>(
            &format!("/contact-flows-summary/{}", instance_id),
            "list_contact_flows",
        )
        .await
    }

    async fn list_phone_numbers(&self, instance_id: &str) -> Result<Vec<PhoneNumber>, ApiError> {
        self.get_all::<ListPhoneNumbersResponse>(
            &format!("/phone-numbers-summary/{}", instance_id),
            "list_phone_numbers",
        )
        .await
    }

    async fn list_hours_of_operations(
        &self,
        instance_id: &str,
    ) -> Result<Vec<HoursOfOperation>, ApiError> {
        self.get_all::<ListHoursOfOperationsResponse>(
            &format!("/hours-of-operations-summary/{}", instance_id),
            "list_hours_of_operations",
        )
        .await
    }
}
