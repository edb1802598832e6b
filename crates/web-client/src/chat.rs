//! Chat window behavior on the main page: keep the message list scrolled to
//! the newest message and let language menu entries pick their own text
//! direction.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Node};

use crate::config::Selectors;
use crate::error::Result;
use crate::observer::{MutationSubscription, ObserveScope};

pub fn scroll_to_bottom(chat_window: &Element) {
    chat_window.set_scroll_top(chat_window.scroll_height());
}

/// Follows the chat container and pins the chat window to the bottom
/// whenever messages are added.
pub struct ScrollFollower {
    container_selector: String,
    window_selector: String,
    chat_window: Option<Element>,
    subscription: Option<MutationSubscription>,
}

impl ScrollFollower {
    pub fn new(selectors: &Selectors) -> Self {
        Self {
            container_selector: selectors.chat_container.clone(),
            window_selector: selectors.chat_window.clone(),
            chat_window: None,
            subscription: None,
        }
    }

    /// Scroll to the bottom and make sure the current container is observed.
    /// Returns `false` when the chat markup is not on the page yet.
    pub fn arm(&mut self, document: &Document) -> Result<bool> {
        let container = document.query_selector(&self.container_selector)?;
        let chat_window = document.query_selector(&self.window_selector)?;
        let (Some(container), Some(chat_window)) = (container, chat_window) else {
            return Ok(false);
        };

        scroll_to_bottom(&chat_window);

        let window_node: &Node = &chat_window;
        let same_window = self
            .chat_window
            .as_ref()
            .is_some_and(|current| current.is_same_node(Some(window_node)));
        let same_container = self
            .subscription
            .as_ref()
            .is_some_and(|subscription| subscription.is_observing(&container));
        if same_window && same_container {
            return Ok(true);
        }

        let scrolled = chat_window.clone();
        let subscription = MutationSubscription::observe(
            &container,
            ObserveScope::Children,
            move |_changes| scroll_to_bottom(&scrolled),
        )?;
        self.chat_window = Some(chat_window);
        self.subscription = Some(subscription);
        Ok(true)
    }
}

/// The pass is skipped once the first entry already carries `dir="auto"`.
pub fn needs_auto_direction(first_dir: Option<&str>) -> bool {
    first_dir != Some("auto")
}

/// Set `dir="auto"` on the language menu entries. Returns how many entries
/// were updated.
pub fn apply_auto_direction(document: &Document, menu_selector: &str) -> Result<u32> {
    let Some(menu) = document.query_selector(menu_selector)? else {
        return Ok(0);
    };
    let entries = menu.query_selector_all("div")?;
    let Some(first) = entries.get(0).and_then(|node| node.dyn_into::<Element>().ok()) else {
        return Ok(0);
    };
    if !needs_auto_direction(first.get_attribute("dir").as_deref()) {
        return Ok(0);
    }

    let mut updated = 0;
    for index in 0..entries.length() {
        if let Some(entry) = entries.get(index).and_then(|node| node.dyn_into::<Element>().ok()) {
            entry.set_attribute("dir", "auto")?;
            updated += 1;
        }
    }
    Ok(updated)
}

/// Watches the whole page and keeps chat scrolling and menu direction current
/// as the page re-renders.
pub struct PageWatcher {
    _subscription: MutationSubscription,
}

impl PageWatcher {
    pub fn start(
        document: &Document,
        selectors: &Selectors,
        follower: Rc<RefCell<ScrollFollower>>,
    ) -> Result<Option<Self>> {
        let Some(page) = document.query_selector(&selectors.page_container)? else {
            log::warn!("{} not found, chat watcher not started", selectors.page_container);
            return Ok(None);
        };

        let document = document.clone();
        let menu_selector = selectors.language_menu.clone();
        let subscription = MutationSubscription::observe(
            &page,
            ObserveScope::Subtree,
            move |_changes| {
                match follower.try_borrow_mut() {
                    Ok(mut follower) => {
                        if let Err(err) = follower.arm(&document) {
                            log::error!("scroll follower: {err}");
                        }
                    }
                    Err(_) => log::debug!("scroll follower busy"),
                }
                if let Err(err) = apply_auto_direction(&document, &menu_selector) {
                    log::error!("auto direction: {err}");
                }
            },
        )?;

        Ok(Some(Self {
            _subscription: subscription,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_pass_runs_until_first_entry_is_auto() {
        assert!(needs_auto_direction(None));
        assert!(needs_auto_direction(Some("rtl")));
        assert!(needs_auto_direction(Some("")));
        assert!(!needs_auto_direction(Some("auto")));
    }
}
