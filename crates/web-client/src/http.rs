use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, FormData, Request, RequestInit, Response};

use crate::error::{ClientError, Result};

pub(crate) fn window() -> Result<web_sys::Window> {
    web_sys::window().ok_or(ClientError::Unavailable("window"))
}

pub(crate) fn document() -> Result<web_sys::Document> {
    window()?
        .document()
        .ok_or(ClientError::Unavailable("document"))
}

async fn send(request: &Request) -> Result<Response> {
    let resp_value = JsFuture::from(window()?.fetch_with_request(request)).await?;
    Ok(resp_value.dyn_into()?)
}

pub(crate) async fn get(url: &str) -> Result<Response> {
    let init = RequestInit::new();
    init.set_method("GET");
    let request = Request::new_with_str_and_init(url, &init)?;
    send(&request).await
}

pub(crate) async fn post_json(url: &str, body: &str) -> Result<Response> {
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&JsValue::from_str(body));
    let request = Request::new_with_str_and_init(url, &init)?;
    request.headers().set("Content-Type", "application/json")?;
    send(&request).await
}

/// Multipart POST; the browser picks the boundary.
pub(crate) async fn post_form(url: &str, form: &FormData) -> Result<Response> {
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(form.as_ref());
    let request = Request::new_with_str_and_init(url, &init)?;
    send(&request).await
}

pub(crate) fn ensure_ok(resp: &Response) -> Result<()> {
    if resp.ok() {
        Ok(())
    } else {
        Err(ClientError::Status(resp.status()))
    }
}

pub(crate) async fn read_json<T: DeserializeOwned>(resp: &Response) -> Result<T> {
    let text = JsFuture::from(resp.text()?).await?;
    let text = text.as_string().unwrap_or_default();
    Ok(serde_json::from_str(&text)?)
}

pub(crate) async fn read_blob(resp: &Response) -> Result<Blob> {
    let blob = JsFuture::from(resp.blob()?).await?;
    Ok(blob.dyn_into()?)
}

pub(crate) fn navigate(href: &str) -> Result<()> {
    window()?.location().set_href(href)?;
    Ok(())
}
