//! Report downloads for the admin panel.
//!
//! The server answers an export request with the report bytes and a
//! `Content-Disposition` header naming the file; the browser save is
//! triggered through a throwaway anchor over an object URL.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, HtmlAnchorElement, Url};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::http;

static FILENAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"filename="(.+)""#).expect("filename pattern is valid"));

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
    Conversation,
    Text,
}

impl ExportKind {
    pub fn endpoint(self, config: &ClientConfig) -> &str {
        match self {
            ExportKind::Conversation => &config.endpoints.conversation_data,
            ExportKind::Text => &config.endpoints.text_data,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Csv,
    #[default]
    Xlsx,
}

/// Body the admin panel sends for a conversation report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationExportRequest {
    pub primary_uuid: Vec<String>,
    pub is_download_audio: bool,
    pub report_format: ReportFormat,
}

/// Body the admin panel sends for a text analysis report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextExportRequest {
    pub primary_uuid: Vec<String>,
    pub report_format: ReportFormat,
}

pub fn filename_from_disposition(header: Option<&str>, fallback: &str) -> String {
    header
        .and_then(|value| FILENAME_PATTERN.captures(value))
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

/// POST `payload` to the export endpoint and save the response as a file.
pub async fn download_export(
    kind: ExportKind,
    payload: &str,
    config: &ClientConfig,
) -> Result<String> {
    let resp = http::post_json(kind.endpoint(config), payload).await?;
    http::ensure_ok(&resp)?;

    let disposition = resp.headers().get("Content-Disposition")?;
    let filename = filename_from_disposition(disposition.as_deref(), &config.default_download_name);

    let blob = http::read_blob(&resp).await?;
    save_blob(&blob, &filename)?;
    log::debug!("saved {filename}");
    Ok(filename)
}

/// Request a conversation report and save it.
pub async fn download_conversations(
    request: &ConversationExportRequest,
    config: &ClientConfig,
) -> Result<String> {
    let payload = serde_json::to_string(request)?;
    download_export(ExportKind::Conversation, &payload, config).await
}

/// Request a text analysis report and save it.
pub async fn download_texts(request: &TextExportRequest, config: &ClientConfig) -> Result<String> {
    let payload = serde_json::to_string(request)?;
    download_export(ExportKind::Text, &payload, config).await
}

fn save_blob(blob: &Blob, filename: &str) -> Result<()> {
    let document = http::document()?;
    let body = document.body().ok_or(ClientError::Unavailable("document body"))?;

    let anchor = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(JsValue::from)?;
    let url = Url::create_object_url_with_blob(blob)?;
    anchor.style().set_property("display", "none")?;
    anchor.set_href(&url);
    anchor.set_download(filename);

    body.append_child(&anchor)?;
    anchor.click();
    anchor.remove();
    Url::revoke_object_url(&url)?;
    Ok(())
}

async fn run_export(kind: ExportKind, event_data: JsValue) {
    let config = ClientConfig::from_window();
    let payload = match js_sys::JSON::stringify(&event_data) {
        Ok(payload) => String::from(payload),
        Err(err) => {
            log::error!("Error: {}", ClientError::from(err));
            return;
        }
    };
    if let Err(err) = download_export(kind, &payload, &config).await {
        log::error!("Error: {err}");
    }
}

#[wasm_bindgen(js_name = downloadConvData)]
pub async fn download_conv_data(event_data: JsValue) {
    run_export(ExportKind::Conversation, event_data).await;
}

#[wasm_bindgen(js_name = downloadTextData)]
pub async fn download_text_data(event_data: JsValue) {
    run_export(ExportKind::Text, event_data).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: &str = "conversation.zip";

    #[test]
    fn quoted_filename_is_extracted() {
        assert_eq!(
            filename_from_disposition(Some(r#"filename="report.zip""#), FALLBACK),
            "report.zip"
        );
        assert_eq!(
            filename_from_disposition(Some(r#"attachment; filename="conv_2024.xlsx""#), FALLBACK),
            "conv_2024.xlsx"
        );
    }

    #[test]
    fn missing_header_uses_fallback() {
        assert_eq!(filename_from_disposition(None, FALLBACK), "conversation.zip");
    }

    #[test]
    fn unmatched_header_uses_fallback() {
        for header in ["attachment", "attachment; filename=report.zip", r#"filename="""#, ""] {
            assert_eq!(filename_from_disposition(Some(header), FALLBACK), FALLBACK, "{header}");
        }
    }

    #[test]
    fn export_kinds_use_their_endpoints() {
        let config = ClientConfig::default();
        assert_eq!(ExportKind::Conversation.endpoint(&config), "/api/conversation_data");
        assert_eq!(ExportKind::Text.endpoint(&config), "/api/text_data");
    }

    #[test]
    fn conversation_request_serializes_like_the_admin_panel() {
        let request = ConversationExportRequest {
            primary_uuid: vec!["a1".into(), "b2".into()],
            is_download_audio: true,
            report_format: ReportFormat::Csv,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "primary_uuid": ["a1", "b2"],
                "is_download_audio": true,
                "report_format": "csv",
            })
        );
    }
}
