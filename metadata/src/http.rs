use crate::error::MetadataError;
use recommend_common::Credentials;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, MetadataError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| MetadataError::Initialization(e.to_string()))
}

/// Issue a GET request with the caller's credentials applied: bearer token
/// as `Authorization` header, API key as `wskey` query parameter.
/// A 404 maps to `NotFound(what)`, any other non-success status to `Service`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
    credentials: &Credentials,
    what: &str,
) -> Result<T, MetadataError> {
    let mut request = http.get(url);
    if !query.is_empty() {
        request = request.query(query);
    }
    if let Some(authorization) = credentials.authorization() {
        request = request.header(AUTHORIZATION, authorization);
    }
    if let Some(api_key) = credentials.api_key() {
        request = request.query(&[("wskey", api_key)]);
    }

    let response = request.send().await?;
    if response.status() == StatusCode::NOT_FOUND {
        return Err(MetadataError::NotFound(what.to_string()));
    }
    if !response.status().is_success() {
        return Err(MetadataError::Service(format!(
            "{what}: service answered with status {}",
            response.status()
        )));
    }
    Ok(response.json().await?)
}
