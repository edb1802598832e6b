//! Page entry points. Each page calls its initializer once; the page context
//! it builds lives until the browser navigates away.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Document;

use crate::chat::{PageWatcher, ScrollFollower};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::fullscreen::{self, DocumentFullscreen, FullscreenToggle};
use crate::http;
use crate::session::SessionPoller;

pub struct AdminPage {
    _poller: SessionPoller,
}

impl AdminPage {
    pub fn start(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            _poller: SessionPoller::start(config)?,
        })
    }
}

pub struct MainPage {
    _fullscreen: Option<Rc<FullscreenToggle<DocumentFullscreen>>>,
    _scroll: Rc<RefCell<ScrollFollower>>,
    _watcher: Option<PageWatcher>,
    _poller: SessionPoller,
}

impl MainPage {
    pub fn start(document: &Document, config: &ClientConfig) -> Result<Self> {
        let fullscreen = match document.query_selector(&config.selectors.company_logo)? {
            Some(logo) => {
                let toggle = Rc::new(FullscreenToggle::new(DocumentFullscreen::new(document)?));
                fullscreen::attach_context_menu(&logo, toggle.clone())?;
                fullscreen::track_browser_state(toggle.clone())?;
                Some(toggle)
            }
            None => {
                log::error!("{} not found, fullscreen toggle disabled", config.selectors.company_logo);
                None
            }
        };

        let poller = SessionPoller::start(config)?;

        let scroll = Rc::new(RefCell::new(ScrollFollower::new(&config.selectors)));
        let watcher = PageWatcher::start(document, &config.selectors, scroll.clone())?;
        scroll.borrow_mut().arm(document)?;

        Ok(Self {
            _fullscreen: fullscreen,
            _scroll: scroll,
            _watcher: watcher,
            _poller: poller,
        })
    }
}

enum PageContext {
    Admin(AdminPage),
    Main(MainPage),
}

thread_local! {
    static PAGE: RefCell<Option<PageContext>> = const { RefCell::new(None) };
}

/// Build into an empty `slot`. An occupied slot is left alone and `build`
/// never runs. Returns whether a context was installed.
fn init_once<T>(slot: &RefCell<Option<T>>, build: impl FnOnce() -> Result<T>) -> Result<bool> {
    if slot.borrow().is_some() {
        log::warn!("page already initialized");
        return Ok(false);
    }
    let context = build()?;
    *slot.borrow_mut() = Some(context);
    Ok(true)
}

fn install(build: impl FnOnce() -> Result<PageContext>) {
    if let Err(err) = PAGE.with(|page| init_once(page, build)) {
        log::error!("page init failed: {err}");
    }
}

/// Run `init` once the DOM is parsed.
fn on_dom_ready(init: impl FnOnce() + 'static) -> Result<()> {
    let document = http::document()?;
    let ready_state = js_sys::Reflect::get(&document, &"readyState".into())?
        .as_string()
        .unwrap_or_default();
    if ready_state != "loading" {
        init();
        return Ok(());
    }

    let closure = Closure::once(init);
    document.add_event_listener_with_callback(
        "DOMContentLoaded",
        closure.as_ref().unchecked_ref(),
    )?;
    closure.forget();
    Ok(())
}

#[wasm_bindgen(js_name = initAdminPage)]
pub fn init_admin_page() -> Result<(), JsValue> {
    on_dom_ready(|| {
        install(|| {
            let config = ClientConfig::from_window();
            AdminPage::start(&config).map(PageContext::Admin)
        });
    })?;
    Ok(())
}

#[wasm_bindgen(js_name = initMainPage)]
pub fn init_main_page() -> Result<(), JsValue> {
    on_dom_ready(|| {
        install(|| {
            let config = ClientConfig::from_window();
            let document = http::document()?;
            MainPage::start(&document, &config).map(PageContext::Main)
        });
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    #[test]
    fn second_init_does_not_build_again() {
        let slot = RefCell::new(None);
        assert!(init_once(&slot, || Ok(1)).unwrap());
        let installed = init_once(&slot, || -> Result<i32> {
            panic!("an initialized page must not be built twice")
        })
        .unwrap();
        assert!(!installed);
        assert_eq!(*slot.borrow(), Some(1));
    }

    #[test]
    fn failed_build_leaves_slot_empty() {
        let slot: RefCell<Option<i32>> = RefCell::new(None);
        let err = init_once(&slot, || Err(ClientError::Unavailable("document"))).unwrap_err();
        assert!(matches!(err, ClientError::Unavailable("document")));
        assert!(slot.borrow().is_none());
        assert!(init_once(&slot, || Ok(2)).unwrap());
    }
}
