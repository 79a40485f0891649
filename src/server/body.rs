use axum::{
    Json,
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};

/// JSON request body. A request without a JSON content type or with an empty
/// body reads as `{}`. Malformed JSON is a 400 and a body over the configured
/// limit is a 413; neither reaches a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(&request) {
            return Ok(Self::empty());
        }

        let bytes = Bytes::from_request(request, state).await.map_err(|rejection| {
            tracing::debug!(
                target: "portal.router",
                status = rejection.status().as_u16(),
                reason = %rejection.body_text(),
                "request_body_rejected"
            );
            reject(rejection.status(), &rejection.body_text())
        })?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::empty());
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => Ok(Self(value)),
            Ok(_) => Err(reject(
                StatusCode::BAD_REQUEST,
                "request body must be a JSON object or array",
            )),
            Err(err) => {
                tracing::debug!(target: "portal.router", error = %err, "request_body_malformed");
                Err(reject(StatusCode::BAD_REQUEST, "request body is not valid JSON"))
            }
        }
    }
}

impl JsonBody {
    fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }
}

fn has_json_content_type(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase())
        .is_some_and(|mime| mime == "application/json" || mime.ends_with("+json"))
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
