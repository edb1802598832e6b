//! Login form for the `/login` page.

use std::rc::Rc;

use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, FormData, HtmlButtonElement, HtmlElement, HtmlFormElement,
    HtmlInputElement,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::http;

pub const FORM_ID: &str = "loginForm";

/// Localized text supplied by the page.
#[derive(Clone, Debug)]
pub struct LoginLabels {
    pub login: String,
    pub password: String,
    pub submit: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    Ok,
    LoginError,
    PasswordError,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthorizationResponse {
    pub resp_status: AuthStatus,
    #[serde(default)]
    pub err_msg: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    Navigate(String),
    ShowLoginError(String),
    ShowPasswordError(String),
    Nothing,
}

impl LoginOutcome {
    pub fn decide(response: &AuthorizationResponse, config: &ClientConfig) -> Self {
        let message = || response.err_msg.clone().unwrap_or_default();
        match response.resp_status {
            AuthStatus::Ok => LoginOutcome::Navigate(config.routes.home.clone()),
            AuthStatus::LoginError => LoginOutcome::ShowLoginError(message()),
            AuthStatus::PasswordError if config.show_password_errors => {
                LoginOutcome::ShowPasswordError(message())
            }
            AuthStatus::PasswordError | AuthStatus::Other => LoginOutcome::Nothing,
        }
    }
}

/// Elements of a built login form.
#[derive(Clone)]
pub struct LoginForm {
    pub form: HtmlFormElement,
    pub login_input: HtmlInputElement,
    pub password_input: HtmlInputElement,
    pub submit: HtmlButtonElement,
    pub login_error: HtmlElement,
    pub password_error: HtmlElement,
    pub spinner: HtmlElement,
}

fn create<T: JsCast>(document: &Document, tag: &str) -> Result<T> {
    Ok(document
        .create_element(tag)?
        .dyn_into::<T>()
        .map_err(JsValue::from)?)
}

fn create_input(
    document: &Document,
    kind: &str,
    id: &str,
    name: &str,
    placeholder: &str,
    class: &str,
) -> Result<HtmlInputElement> {
    let input: HtmlInputElement = create(document, "input")?;
    input.set_attribute("type", kind)?;
    input.set_attribute("id", id)?;
    input.set_attribute("name", name)?;
    input.set_attribute("required", "true")?;
    input.set_attribute("placeholder", placeholder)?;
    input.class_list().add_1(class)?;
    Ok(input)
}

fn error_slot(document: &Document) -> Result<HtmlElement> {
    let span: HtmlElement = create(document, "span")?;
    span.class_list().add_1("login-error-txt")?;
    Ok(span)
}

impl LoginForm {
    /// Build the form into `form_container` and the spinner into
    /// `page_container`. Returns `None` if the page already has a form.
    pub fn build(
        document: &Document,
        form_container: &Element,
        page_container: &Element,
        labels: &LoginLabels,
        config: &ClientConfig,
    ) -> Result<Option<Self>> {
        if document.get_element_by_id(FORM_ID).is_some() {
            return Ok(None);
        }

        let form: HtmlFormElement = create(document, "form")?;
        form.set_attribute("id", FORM_ID)?;
        form.set_attribute("action", &config.endpoints.authorization)?;
        form.set_attribute("type", "POST")?;

        let login_input = create_input(
            document,
            "text",
            "formLogin",
            "login",
            &labels.login,
            "login-input",
        )?;
        let password_input = create_input(
            document,
            "password",
            "formPassword",
            "password",
            &labels.password,
            "password-input",
        )?;

        let submit: HtmlButtonElement = create(document, "button")?;
        submit.set_attribute("type", "submit")?;
        submit.set_inner_text(&labels.submit);
        submit.class_list().add_2("next-btn", "login-btn")?;

        let login_error = error_slot(document)?;
        let password_error = error_slot(document)?;

        let spinner: HtmlElement = create(document, "span")?;
        spinner.class_list().add_1("login-spinner")?;

        form.append_child(&login_input)?;
        form.append_child(&login_error)?;
        form.append_child(&password_input)?;
        form.append_child(&password_error)?;
        form.append_child(&submit)?;
        form_container.append_child(&form)?;
        page_container.append_child(&spinner)?;

        Ok(Some(Self {
            form,
            login_input,
            password_input,
            submit,
            login_error,
            password_error,
            spinner,
        }))
    }

    pub fn clear_errors(&self) {
        self.login_error.set_inner_text("");
        self.password_error.set_inner_text("");
    }

    /// Show the spinner and lock the button until the guard drops.
    pub fn busy(&self) -> BusyGuard<'_> {
        set_display(&self.spinner, "block");
        self.submit.set_disabled(true);
        BusyGuard { form: self }
    }

    pub fn apply(&self, outcome: &LoginOutcome) -> Result<()> {
        match outcome {
            LoginOutcome::Navigate(target) => http::navigate(target),
            LoginOutcome::ShowLoginError(message) => {
                self.login_error.set_inner_text(message);
                Ok(())
            }
            LoginOutcome::ShowPasswordError(message) => {
                self.password_error.set_inner_text(message);
                Ok(())
            }
            LoginOutcome::Nothing => Ok(()),
        }
    }

    async fn submit_once(&self, config: &ClientConfig) -> Result<()> {
        let data = FormData::new_with_form(&self.form)?;
        let resp = http::post_form(&config.endpoints.authorization, &data).await?;
        let body: AuthorizationResponse = http::read_json(&resp).await?;
        self.apply(&LoginOutcome::decide(&body, config))
    }

    /// Run one submission with the busy state held across the request.
    pub async fn submit(&self, config: &ClientConfig) {
        self.clear_errors();
        let _busy = self.busy();
        if let Err(err) = self.submit_once(config).await {
            log::error!("login failed: {err}");
        }
    }

    /// Intercept the native submit and post the form asynchronously.
    pub fn attach(self, config: ClientConfig) -> Result<()> {
        let form = Rc::new(self);
        let config = Rc::new(config);
        let target = form.form.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: Event| {
            event.prevent_default();
            let form = form.clone();
            let config = config.clone();
            wasm_bindgen_futures::spawn_local(async move {
                form.submit(&config).await;
            });
        });
        target.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }
}

/// Restores the idle form state on drop, whatever the request outcome.
pub struct BusyGuard<'a> {
    form: &'a LoginForm,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        set_display(&self.form.spinner, "none");
        self.form.submit.set_disabled(false);
    }
}

fn set_display(element: &HtmlElement, value: &str) {
    let _ = element.style().set_property("display", value);
}

fn query(document: &Document, selector: &str) -> Result<Element> {
    document
        .query_selector(selector)?
        .ok_or_else(|| ClientError::MissingElement(selector.to_string()))
}

/// Build the login form from page-supplied labels and wire its submit.
#[wasm_bindgen(js_name = displayLoginForm)]
pub fn display_login_form(login: String, password: String, enter_txt: String) -> Result<(), JsValue> {
    let config = ClientConfig::from_window();
    let document = http::document()?;
    let page_container = query(&document, &config.selectors.page_container)?;
    let form_container = query(&document, &config.selectors.login_form_container)?;

    let labels = LoginLabels {
        login,
        password,
        submit: enter_txt,
    };
    match LoginForm::build(&document, &form_container, &page_container, &labels, &config)? {
        Some(form) => form.attach(config)?,
        None => log::warn!("login form already present"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> AuthorizationResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn ok_navigates_home() {
        let config = ClientConfig::default();
        let outcome = LoginOutcome::decide(&response(r#"{"resp_status":"ok"}"#), &config);
        assert_eq!(outcome, LoginOutcome::Navigate("/".to_string()));
    }

    #[test]
    fn login_error_shows_server_message() {
        let config = ClientConfig::default();
        let outcome = LoginOutcome::decide(
            &response(r#"{"resp_status":"login_error","err_msg":"bad password"}"#),
            &config,
        );
        assert_eq!(outcome, LoginOutcome::ShowLoginError("bad password".to_string()));
    }

    #[test]
    fn login_error_without_message_clears_slot() {
        let config = ClientConfig::default();
        let outcome =
            LoginOutcome::decide(&response(r#"{"resp_status":"login_error"}"#), &config);
        assert_eq!(outcome, LoginOutcome::ShowLoginError(String::new()));
    }

    #[test]
    fn password_error_is_hidden_by_default() {
        let body = response(r#"{"resp_status":"password_error","err_msg":"wrong"}"#);
        let mut config = ClientConfig::default();
        assert_eq!(LoginOutcome::decide(&body, &config), LoginOutcome::Nothing);

        config.show_password_errors = true;
        assert_eq!(
            LoginOutcome::decide(&body, &config),
            LoginOutcome::ShowPasswordError("wrong".to_string())
        );
    }

    #[test]
    fn unknown_status_does_nothing() {
        let config = ClientConfig::default();
        let body = response(r#"{"resp_status":"locked","err_msg":"later"}"#);
        assert_eq!(body.resp_status, AuthStatus::Other);
        assert_eq!(LoginOutcome::decide(&body, &config), LoginOutcome::Nothing);
    }
}
