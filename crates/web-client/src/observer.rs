use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{MutationObserver, MutationObserverInit, MutationRecord, Node};

use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObserveScope {
    /// Direct children of the target only.
    Children,
    /// Children anywhere under the target.
    Subtree,
}

/// A live child-list subscription on one node. Dropping it disconnects the
/// observer.
pub struct MutationSubscription {
    observer: MutationObserver,
    target: Node,
    _callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

impl MutationSubscription {
    /// Call `handler` with the number of child-list records in each batch
    /// that has at least one.
    pub fn observe(
        target: &Node,
        scope: ObserveScope,
        mut handler: impl FnMut(usize) + 'static,
    ) -> Result<Self> {
        let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
            move |records: js_sys::Array, _observer: MutationObserver| {
                let changes = count_child_list(&records);
                if changes > 0 {
                    handler(changes);
                }
            },
        );

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(scope == ObserveScope::Subtree);
        observer.observe_with_options(target, &options)?;

        Ok(Self {
            observer,
            target: target.clone(),
            _callback: callback,
        })
    }

    pub fn is_observing(&self, node: &Node) -> bool {
        self.target.is_same_node(Some(node))
    }
}

impl Drop for MutationSubscription {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

fn count_child_list(records: &js_sys::Array) -> usize {
    records
        .iter()
        .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
        .filter(|record| record.type_() == "childList")
        .count()
}
