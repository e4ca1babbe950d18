use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::convert::Infallible;
use tracing::{debug, warn};

/// JSON body extractor for voice-agent tool calls.
///
/// Some agents send the JSON object double-encoded as a JSON string. Anything
/// that still is not an object, or does not fit `T`, becomes `T::default()`
/// so the handler can answer with a not-found message instead of a 4xx.
pub struct LenientJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for LenientJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Bytes::from_request(req, state).await {
            Ok(body) => Ok(LenientJson(parse_lenient(&body))),
            Err(e) => {
                warn!(error = %e, "voice request body could not be read");
                Ok(LenientJson(T::default()))
            }
        }
    }
}

pub fn parse_lenient<T>(body: &[u8]) -> T
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        debug!("voice request with empty body");
        return T::default();
    }

    let value = match serde_json::from_slice::<Value>(body) {
        Ok(Value::String(inner)) => {
            debug!("voice request body is a JSON string, parsing again");
            match serde_json::from_str::<Value>(&inner) {
                Ok(value) => value,
                Err(e) => {
                    warn!(error = %e, "double-encoded voice request body is not JSON");
                    return T::default();
                }
            }
        }
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, bytes = body.len(), "voice request body is not JSON");
            return T::default();
        }
    };

    if !value.is_object() {
        warn!(kind = json_kind(&value), "voice request body is not an object");
        return T::default();
    }

    serde_json::from_value(value).unwrap_or_else(|e| {
        warn!(error = %e, "voice request body does not match the expected fields");
        T::default()
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insurance_service::{AuthenticateNpiRequest, ClaimsRequest};

    #[test]
    fn test_plain_object() {
        let request: AuthenticateNpiRequest = parse_lenient(br#"{"npi": "1234567890"}"#);
        assert_eq!(request.npi.as_deref(), Some("1234567890"));
    }

    #[test]
    fn test_double_encoded_object() {
        let body = serde_json::to_vec(&Value::String(r#"{"claim_number": "CLM-00482100"}"#.to_string())).unwrap();
        let request: ClaimsRequest = parse_lenient(&body);
        assert_eq!(request.claim_number.as_deref(), Some("CLM-00482100"));
    }

    #[test]
    fn test_garbage_becomes_default() {
        let request: AuthenticateNpiRequest = parse_lenient(b"npi=123");
        assert!(request.npi.is_none());
        let request: AuthenticateNpiRequest = parse_lenient(b"[1, 2]");
        assert!(request.npi.is_none());
        let request: AuthenticateNpiRequest = parse_lenient(b"  ");
        assert!(request.npi.is_none());
    }
}
