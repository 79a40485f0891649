use std::{
    future::Future,
    time::{Duration, Instant},
};

use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use crate::integrations::error::{
    IntegrationResult, ServiceId, decode_error, timeout_error, transport_error, upstream_status,
};

pub fn build_client() -> Client {
    Client::builder()
        .pool_idle_timeout(Duration::from_secs(30))
        .build()
        .expect("reqwest client must build")
}

pub fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Runs `call` under `deadline`. An elapsed deadline drops the in-flight
/// future, which cancels the underlying request.
pub async fn with_deadline<T, F>(
    service: ServiceId,
    deadline: Duration,
    call: F,
) -> IntegrationResult<T>
where
    F: Future<Output = IntegrationResult<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!(
                target: "integrations.http",
                service = %service,
                timeout_ms = deadline.as_millis() as u64,
                "outbound_call_timed_out"
            );
            Err(timeout_error(service, deadline.as_millis()))
        }
    }
}

/// Sends the request and rejects non-2xx responses. The body is left unread.
pub async fn send_checked(service: ServiceId, request: RequestBuilder) -> IntegrationResult<Response> {
    let request_id = Uuid::now_v7().to_string();
    let started_at = Instant::now();
    let request = request.header("x-request-id", request_id.clone());

    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => {
            tracing::debug!(
                target: "integrations.http",
                service = %service,
                request_id = %request_id,
                elapsed_ms = started_at.elapsed().as_millis() as u64,
                error = %err,
                "outbound_call_transport_error"
            );
            return Err(transport_error(service, err));
        }
    };

    let status = response.status();
    tracing::debug!(
        target: "integrations.http",
        service = %service,
        request_id = %request_id,
        url = %response.url(),
        status = status.as_u16(),
        elapsed_ms = started_at.elapsed().as_millis() as u64,
        "outbound_call_completed"
    );

    if !status.is_success() {
        return Err(upstream_status(service, status.as_u16()));
    }

    Ok(response)
}

/// Timeout-bounded call whose 2xx body is decoded as JSON into `T`.
pub async fn call_json<T>(
    service: ServiceId,
    request: RequestBuilder,
    deadline: Duration,
) -> IntegrationResult<T>
where
    T: DeserializeOwned,
{
    with_deadline(service, deadline, async move {
        let response = send_checked(service, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| transport_error(service, err))?;
        serde_json::from_slice::<T>(&bytes).map_err(|err| decode_error(service, err))
    })
    .await
}

/// Timeout-bounded call where only the status matters.
pub async fn call_status_only(
    service: ServiceId,
    request: RequestBuilder,
    deadline: Duration,
) -> IntegrationResult<()> {
    with_deadline(service, deadline, async move {
        send_checked(service, request).await.map(|_| ())
    })
    .await
}

/// Accepts ids sent either as JSON strings or numbers.
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| id_to_string(&value)))
}

pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_optional_id(deserializer)?.unwrap_or_default())
}

/// Reads a string field that the upstream may send as `null`.
pub fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
