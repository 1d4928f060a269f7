use std::time::SystemTime;

use aws_credential_types::Credentials;
use aws_sigv4::http_request::{SignableBody, SignableRequest, SigningParams, SigningSettings, sign};
use aws_sigv4::sign::v4;

use crate::error::ApiError;

/// Signing name of the Amazon Connect service.
const SERVICE_NAME: &str = "connect";

/// Sign a request with SigV4 in place, adding the `Authorization`,
/// `x-amz-date` and (for session credentials) `x-amz-security-token` headers.
pub fn sign_request(
    request: &mut http::Request<Vec<u8>>,
    credentials: &Credentials,
    region: &str,
) -> Result<(), ApiError> {
    let identity = credentials.clone().into();
    let params = v4::SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name(SERVICE_NAME)
        .time(SystemTime::now())
        .settings(SigningSettings::default())
        .build()
        .map_err(signing_error)?;
    let params: SigningParams = params.into();

    let signable = SignableRequest::new(
        request.method().as_str(),
        request.uri().to_string(),
        request
            .headers()
            .iter()
            .map(|(name, value)| (name.as_str(), value.to_str().unwrap_or_default())),
        SignableBody::Bytes(request.body().as_slice()),
    )
    .map_err(signing_error)?;

    let (instructions, _signature) = sign(signable, &params).map_err(signing_error)?.into_parts();
    instructions.apply_to_request_http1x(request);
    Ok(())
}

fn signing_error(err: impl std::fmt::Display) -> ApiError {
    ApiError::Http {
        status: 0,
        endpoint: "request_signing".to_string(),
        message: format!("Failed to sign request: {}", err),
    }
}
