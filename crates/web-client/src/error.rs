use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0} not available")]
    Unavailable(&'static str),
    #[error("element not found: {0}")]
    MissingElement(String),
    #[error("javascript error: {0}")]
    Js(String),
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0} is not supported by this browser")]
    Unsupported(&'static str),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

impl From<JsValue> for ClientError {
    fn from(value: JsValue) -> Self {
        ClientError::Js(describe_js(&value))
    }
}

impl From<ClientError> for JsValue {
    fn from(err: ClientError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

/// Render a thrown JS value as text, preferring `Error.message`.
pub(crate) fn describe_js(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    js_sys::Reflect::get(value, &"message".into())
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_reads_like_a_fetch_failure() {
        assert_eq!(ClientError::Status(502).to_string(), "HTTP error! status: 502");
    }

    #[test]
    fn decode_errors_convert_from_serde() {
        let err = serde_json::from_str::<bool>("nope").unwrap_err();
        let err: ClientError = err.into();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
