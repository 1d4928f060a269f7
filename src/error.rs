use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("ApiError: {0}")]
    Api(#[from] ApiError),
    #[error("CollectError: {0}")]
    Collect(#[from] CollectError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
    #[error("ExportError: {0}")]
    Export(#[from] ExportError),
    #[error("DisplayError: {0}")]
    Display(#[from] DisplayError),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("AWS credentials unavailable: {message}")]
    CredentialsUnavailable { message: String, hint: String },
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Remote API failure taxonomy. `is_transient` drives the client-side retry
/// policy; the collector treats every variant the same way (a diagnostic).
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied for {endpoint}: {message}")]
    AccessDenied { endpoint: String, message: String },
    #[error("Resource not found at {endpoint}: {message}")]
    NotFound { endpoint: String, message: String },
    #[error("Request throttled at {endpoint}: {message}")]
    Throttled { endpoint: String, message: String },
    #[error("Request timed out after {timeout_secs}s at {endpoint}")]
    Timeout { timeout_secs: u64, endpoint: String },
    #[error("Network error at {endpoint}: {message}")]
    Network { endpoint: String, message: String },
    #[error("HTTP error: {status} {endpoint}: {message}")]
    Http {
        status: u16,
        endpoint: String,
        message: String,
    },
}

impl ApiError {
    /// Safe to retry with backoff. Access and not-found failures are final.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Throttled { .. } => true,
            ApiError::Timeout { .. } => true,
            ApiError::Network { .. } => true,
            ApiError::Http {
                status: 500..=599, ..
            } => true,
            _ => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum CollectError {
    /// The root instance listing failed. Nothing to iterate, so the whole
    /// run aborts; every other failure degrades a single snapshot field.
    #[error("Instance listing failed, aborting inventory run: {source}")]
    InstanceListing { source: ApiError },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration field '{field}' is missing")]
    MissingField { field: String, hint: String },
    #[error("Invalid configuration value for '{field}': {value}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    #[error("Unknown configuration key: {key}")]
    UnknownKey { key: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },
    #[error("Configuration save failed: {message}")]
    ConfigSaveFailed { message: String },
    #[error("Configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Snapshot encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Snapshot decoding failed: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Table formatting failed: {0}")]
    TableFormat(String),
    #[error("Terminal output error: {0}")]
    TerminalOutput(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl AppError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Cli(_) => ErrorSeverity::Medium,
            AppError::Api(api_error) => match api_error {
                ApiError::AccessDenied { .. } => ErrorSeverity::High,
                ApiError::Http { status, .. } if *status >= 500 => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            AppError::Collect(_) => ErrorSeverity::Critical,
            AppError::Config(_) => ErrorSeverity::High,
            AppError::Storage(_) => ErrorSeverity::Medium,
            AppError::Export(_) => ErrorSeverity::Medium,
            AppError::Display(_) => ErrorSeverity::Low,
        }
    }

    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Cli(CliError::CredentialsUnavailable { hint, .. }) => Some(hint.clone()),
            AppError::Api(ApiError::AccessDenied { .. }) => Some(
                "Check that the active IAM identity has the connect:List* and connect:Describe* permissions".to_string(),
            ),
            AppError::Api(ApiError::Throttled { .. } | ApiError::Timeout { .. }) => {
                Some("The Connect API is rate limiting; lower --concurrency and try again".to_string())
            }
            AppError::Collect(CollectError::InstanceListing { .. }) => Some(
                "Verify the region and that the credentials can call connect:ListInstances".to_string(),
            ),
            AppError::Config(ConfigError::MissingField { hint, .. }) => Some(hint.clone()),
            _ => None,
        }
    }
}
