//! Session expiry polling.
//!
//! The server answers `/api/session_exp` with a bare JSON value; anything
//! JavaScript would treat as falsy means the session is gone. Failures to
//! reach the server leave the user on the page.

use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::http;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Valid,
    Expired,
}

impl SessionStatus {
    pub fn from_body(body: &Value) -> Self {
        if is_truthy(body) {
            SessionStatus::Valid
        } else {
            SessionStatus::Expired
        }
    }

    /// Where the page should go, if anywhere.
    pub fn redirect<'a>(self, config: &'a ClientConfig) -> Option<&'a str> {
        match self {
            SessionStatus::Valid => None,
            SessionStatus::Expired => Some(&config.routes.login),
        }
    }
}

/// JavaScript truthiness for a decoded JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

async fn fetch_status(config: &ClientConfig) -> Result<SessionStatus> {
    let resp = http::get(&config.endpoints.session_exp).await?;
    let body: Value = http::read_json(&resp).await?;
    Ok(SessionStatus::from_body(&body))
}

/// One poll: redirect to the login page when the session has expired.
pub async fn check_session(config: &ClientConfig) {
    let status = match fetch_status(config).await {
        Ok(status) => status,
        Err(err) => {
            log::error!("session check failed: {err}");
            return;
        }
    };

    if let Some(target) = status.redirect(config) {
        log::info!("session expired, redirecting to {target}");
        if let Err(err) = http::navigate(target) {
            log::error!("redirect failed: {err}");
        }
    }
}

/// Interval-driven session check. Dropping the poller stops it.
pub struct SessionPoller {
    handle: i32,
    _tick: Closure<dyn FnMut()>,
}

impl SessionPoller {
    pub fn start(config: &ClientConfig) -> Result<Self> {
        let window = http::window()?;
        let tick_config = config.clone();
        let tick = Closure::<dyn FnMut()>::new(move || {
            let config = tick_config.clone();
            wasm_bindgen_futures::spawn_local(async move {
                check_session(&config).await;
            });
        });

        let timeout = i32::try_from(config.session_poll_interval_ms).unwrap_or(i32::MAX);
        let handle = window.set_interval_with_callback_and_timeout_and_arguments_0(
            tick.as_ref().unchecked_ref(),
            timeout,
        )?;

        Ok(Self {
            handle,
            _tick: tick,
        })
    }
}

impl Drop for SessionPoller {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(self.handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn false_body_redirects_to_login() {
        let config = ClientConfig::default();
        let status = SessionStatus::from_body(&json!(false));
        assert_eq!(status, SessionStatus::Expired);
        assert_eq!(status.redirect(&config), Some("/login"));
    }

    #[test]
    fn true_body_stays_on_page() {
        let config = ClientConfig::default();
        let status = SessionStatus::from_body(&json!(true));
        assert_eq!(status, SessionStatus::Valid);
        assert_eq!(status.redirect(&config), None);
    }

    #[test]
    fn truthiness_follows_javascript() {
        for falsy in [json!(null), json!(0), json!(0.0), json!(""), json!(false)] {
            assert!(!is_truthy(&falsy), "{falsy}");
        }
        for truthy in [json!(1), json!(-3.5), json!("no"), json!([]), json!({}), json!(true)] {
            assert!(is_truthy(&truthy), "{truthy}");
        }
    }

    #[test]
    fn redirect_target_follows_config() {
        let mut config = ClientConfig::default();
        config.routes.login = "/signin".to_string();
        assert_eq!(SessionStatus::Expired.redirect(&config), Some("/signin"));
    }
}
