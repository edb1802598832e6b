//! Client configuration.
//!
//! Defaults match the server routes and page markup. A page can override any
//! subset by defining `window.L7X_CLIENT_CONFIG` before the module loads.

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

pub const CONFIG_GLOBAL: &str = "L7X_CLIENT_CONFIG";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    pub routes: Routes,
    pub selectors: Selectors,
    pub session_poll_interval_ms: u32,
    pub default_download_name: String,
    /// The server can report a password-specific error, but the page does
    /// not show it unless this is set.
    pub show_password_errors: bool,
    pub log_level: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub conversation_data: String,
    pub text_data: String,
    pub session_exp: String,
    pub authorization: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Routes {
    pub home: String,
    pub login: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub page_container: String,
    pub login_form_container: String,
    pub chat_container: String,
    pub chat_window: String,
    pub company_logo: String,
    pub language_menu: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            routes: Routes::default(),
            selectors: Selectors::default(),
            session_poll_interval_ms: 10_000,
            default_download_name: "conversation.zip".to_string(),
            show_password_errors: false,
            log_level: "info".to_string(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            conversation_data: "/api/conversation_data".to_string(),
            text_data: "/api/text_data".to_string(),
            session_exp: "/api/session_exp".to_string(),
            authorization: "/api/authorization".to_string(),
        }
    }
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            home: "/".to_string(),
            login: "/login".to_string(),
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            page_container: ".my-page-container".to_string(),
            login_form_container: ".login-form-container".to_string(),
            chat_container: ".chat-container".to_string(),
            chat_window: ".chat-window".to_string(),
            company_logo: ".company-logo".to_string(),
            language_menu: ".q-menu".to_string(),
        }
    }
}

impl ClientConfig {
    /// Read `window.L7X_CLIENT_CONFIG`, falling back to defaults.
    pub fn from_window() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };
        let value = match js_sys::Reflect::get(&window, &JsValue::from_str(CONFIG_GLOBAL)) {
            Ok(value) => value,
            Err(_) => return Self::default(),
        };
        if value.is_undefined() || value.is_null() {
            return Self::default();
        }

        match serde_wasm_bindgen::from_value(value) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring {CONFIG_GLOBAL}: {err}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_server_routes() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoints.session_exp, "/api/session_exp");
        assert_eq!(config.endpoints.authorization, "/api/authorization");
        assert_eq!(config.routes.login, "/login");
        assert_eq!(config.session_poll_interval_ms, 10_000);
        assert_eq!(config.default_download_name, "conversation.zip");
        assert!(!config.show_password_errors);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"session_poll_interval_ms": 2500, "selectors": {"chat_window": ".thread"}}"#,
        )
        .unwrap();

        assert_eq!(config.session_poll_interval_ms, 2500);
        assert_eq!(config.selectors.chat_window, ".thread");
        assert_eq!(config.selectors.chat_container, ".chat-container");
        assert_eq!(config.endpoints, Endpoints::default());
    }
}
