//! Fullscreen toggle bound to the company logo's context menu.
//!
//! Browsers expose fullscreen under different names; the first vendor whose
//! method exists wins. The toggle keeps its own flag and flips it whether or
//! not the browser honoured the request. Fullscreen change events pull the
//! flag back in line when the user leaves fullscreen some other way.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, Event};

use crate::error::{ClientError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FullscreenVendor {
    Standard,
    Webkit,
    Ms,
}

impl FullscreenVendor {
    pub const PROBE_ORDER: [FullscreenVendor; 3] = [
        FullscreenVendor::Standard,
        FullscreenVendor::Webkit,
        FullscreenVendor::Ms,
    ];

    pub fn request_method(self) -> &'static str {
        match self {
            FullscreenVendor::Standard => "requestFullscreen",
            FullscreenVendor::Webkit => "webkitRequestFullscreen",
            FullscreenVendor::Ms => "msRequestFullscreen",
        }
    }

    pub fn exit_method(self) -> &'static str {
        match self {
            FullscreenVendor::Standard => "exitFullscreen",
            FullscreenVendor::Webkit => "webkitExitFullscreen",
            FullscreenVendor::Ms => "msExitFullscreen",
        }
    }

    pub fn element_property(self) -> &'static str {
        match self {
            FullscreenVendor::Standard => "fullscreenElement",
            FullscreenVendor::Webkit => "webkitFullscreenElement",
            FullscreenVendor::Ms => "msFullscreenElement",
        }
    }

    pub fn change_event(self) -> &'static str {
        match self {
            FullscreenVendor::Standard => "fullscreenchange",
            FullscreenVendor::Webkit => "webkitfullscreenchange",
            FullscreenVendor::Ms => "MSFullscreenChange",
        }
    }
}

pub fn first_supported(
    mut has_method: impl FnMut(FullscreenVendor) -> bool,
) -> Option<FullscreenVendor> {
    FullscreenVendor::PROBE_ORDER
        .into_iter()
        .find(|vendor| has_method(*vendor))
}

#[allow(async_fn_in_trait)]
pub trait FullscreenBackend {
    async fn enter(&self) -> Result<()>;
    async fn exit(&self) -> Result<()>;
}

/// Fullscreen over `document.documentElement`.
pub struct DocumentFullscreen {
    document: Document,
    root: Element,
}

impl DocumentFullscreen {
    pub fn new(document: &Document) -> Result<Self> {
        let root = document
            .document_element()
            .ok_or(ClientError::Unavailable("document element"))?;
        Ok(Self {
            document: document.clone(),
            root,
        })
    }

    /// Whether the browser currently reports a fullscreen element.
    pub fn is_active(&self) -> bool {
        FullscreenVendor::PROBE_ORDER.into_iter().any(|vendor| {
            js_sys::Reflect::get(&self.document, &vendor.element_property().into())
                .map(|element| !element.is_undefined() && !element.is_null())
                .unwrap_or(false)
        })
    }

    fn document(&self) -> &Document {
        &self.document
    }
}

fn method(target: &JsValue, name: &str) -> Option<js_sys::Function> {
    js_sys::Reflect::get(target, &name.into())
        .ok()
        .and_then(|value| value.dyn_into::<js_sys::Function>().ok())
}

async fn invoke_first(
    target: &JsValue,
    name_of: impl Fn(FullscreenVendor) -> &'static str,
) -> Result<()> {
    let vendor = first_supported(|vendor| method(target, name_of(vendor)).is_some())
        .ok_or(ClientError::Unsupported("fullscreen"))?;
    let function = method(target, name_of(vendor)).ok_or(ClientError::Unsupported("fullscreen"))?;

    let result = function.call0(target)?;
    if let Ok(promise) = result.dyn_into::<js_sys::Promise>() {
        JsFuture::from(promise).await?;
    }
    Ok(())
}

impl FullscreenBackend for DocumentFullscreen {
    async fn enter(&self) -> Result<()> {
        invoke_first(self.root.as_ref(), FullscreenVendor::request_method).await
    }

    async fn exit(&self) -> Result<()> {
        invoke_first(self.document.as_ref(), FullscreenVendor::exit_method).await
    }
}

pub struct FullscreenToggle<B> {
    backend: B,
    active: Cell<bool>,
}

impl<B: FullscreenBackend> FullscreenToggle<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            active: Cell::new(false),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn sync(&self, active: bool) {
        self.active.set(active);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Leave fullscreen if the flag is set, enter otherwise. Returns the new
    /// flag.
    pub async fn toggle(&self) -> bool {
        let leaving = self.active.get();
        let result = if leaving {
            self.backend.exit().await
        } else {
            self.backend.enter().await
        };
        if let Err(err) = result {
            log::error!("fullscreen toggle failed: {err}");
        }
        self.active.set(!leaving);
        !leaving
    }
}

/// Right-click on `logo` toggles fullscreen instead of opening the menu.
pub fn attach_context_menu(
    logo: &Element,
    toggle: Rc<FullscreenToggle<DocumentFullscreen>>,
) -> Result<()> {
    let closure = Closure::<dyn FnMut(_)>::new(move |event: Event| {
        event.prevent_default();
        let toggle = toggle.clone();
        wasm_bindgen_futures::spawn_local(async move {
            toggle.toggle().await;
        });
    });
    logo.add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Keep the flag in line with the browser's actual fullscreen state.
pub fn track_browser_state(toggle: Rc<FullscreenToggle<DocumentFullscreen>>) -> Result<()> {
    let document = toggle.backend().document().clone();
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
        let active = toggle.backend().is_active();
        toggle.sync(active);
    });
    for vendor in FullscreenVendor::PROBE_ORDER {
        document
            .add_event_listener_with_callback(vendor.change_event(), closure.as_ref().unchecked_ref())?;
    }
    closure.forget();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeBackend {
        fail: bool,
        calls: RefCell<Vec<&'static str>>,
    }

    impl FullscreenBackend for FakeBackend {
        async fn enter(&self) -> Result<()> {
            self.calls.borrow_mut().push("enter");
            if self.fail {
                Err(ClientError::Unsupported("fullscreen"))
            } else {
                Ok(())
            }
        }

        async fn exit(&self) -> Result<()> {
            self.calls.borrow_mut().push("exit");
            if self.fail {
                Err(ClientError::Unsupported("fullscreen"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn two_toggles_restore_the_flag() {
        let toggle = FullscreenToggle::new(FakeBackend::default());
        assert!(block_on(toggle.toggle()));
        assert!(!block_on(toggle.toggle()));
        assert!(!toggle.is_active());
        assert_eq!(*toggle.backend().calls.borrow(), vec!["enter", "exit"]);
    }

    #[test]
    fn failed_requests_still_flip_the_flag() {
        let toggle = FullscreenToggle::new(FakeBackend {
            fail: true,
            ..FakeBackend::default()
        });
        block_on(toggle.toggle());
        assert!(toggle.is_active());
        block_on(toggle.toggle());
        assert!(!toggle.is_active());
    }

    #[test]
    fn sync_decides_the_next_direction() {
        let toggle = FullscreenToggle::new(FakeBackend::default());
        toggle.sync(true);
        block_on(toggle.toggle());
        assert_eq!(*toggle.backend().calls.borrow(), vec!["exit"]);
    }

    #[test]
    fn probing_prefers_the_standard_api() {
        assert_eq!(first_supported(|_| true), Some(FullscreenVendor::Standard));
        assert_eq!(
            first_supported(|vendor| vendor != FullscreenVendor::Standard),
            Some(FullscreenVendor::Webkit)
        );
        assert_eq!(
            first_supported(|vendor| vendor == FullscreenVendor::Ms),
            Some(FullscreenVendor::Ms)
        );
        assert_eq!(first_supported(|_| false), None);
    }

    #[test]
    fn vendor_names_pair_up() {
        assert_eq!(FullscreenVendor::Webkit.request_method(), "webkitRequestFullscreen");
        assert_eq!(FullscreenVendor::Webkit.exit_method(), "webkitExitFullscreen");
        assert_eq!(FullscreenVendor::Ms.change_event(), "MSFullscreenChange");
    }
}
