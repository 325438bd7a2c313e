use std::time::Duration;

use header_offset::{Callback, DomError, ElementSource, Px, ReadyState, Scheduler, Task};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, EventTarget, HtmlElement, MutationObserver, MutationObserverInit, Window};

fn describe(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|err| String::from(err.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"))
}

/// Wraps a one-shot task for APIs that take a reusable JS callback.
fn once(task: Task) -> Closure<dyn FnMut()> {
    let mut task = Some(task);
    Closure::wrap(Box::new(move || {
        if let Some(task) = task.take() {
            task();
        }
    }) as Box<dyn FnMut()>)
}

/// The live page: `window` timers and events, `document` elements.
pub struct WebHost {
    window: Window,
    document: Document,
}

/// Pending `setTimeout`. Keeps its callback alive until dropped.
pub struct WebTimer {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

/// Registered listener or running observer; unregistered on drop.
pub enum WebSubscription {
    Listener {
        target: EventTarget,
        kind: &'static str,
        callback: Closure<dyn FnMut()>,
    },
    Observer {
        observer: MutationObserver,
        _callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
    },
}

impl Drop for WebSubscription {
    fn drop(&mut self) {
        match self {
            WebSubscription::Listener {
                target,
                kind,
                callback,
            } => {
                target
                    .remove_event_listener_with_callback(*kind, callback.as_ref().unchecked_ref())
                    .ok();
            }
            WebSubscription::Observer { observer, .. } => observer.disconnect(),
        }
    }
}

impl WebHost {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        Ok(Self { window, document })
    }

    fn listen(
        &self,
        target: &EventTarget,
        kind: &'static str,
        callback: Closure<dyn FnMut()>,
    ) -> Result<WebSubscription, DomError> {
        target
            .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            .map_err(|err| DomError::Subscribe {
                event: kind.to_string(),
                reason: describe(&err),
            })?;
        Ok(WebSubscription::Listener {
            target: target.clone(),
            kind,
            callback,
        })
    }

    fn has_mutation_observer(&self) -> bool {
        js_sys::Reflect::has(&self.window, &JsValue::from_str("MutationObserver")).unwrap_or(false)
    }
}

impl ElementSource for WebHost {
    type Element = HtmlElement;

    fn ready_state(&self) -> ReadyState {
        js_sys::Reflect::get(&self.document, &JsValue::from_str("readyState"))
            .ok()
            .and_then(|state| state.as_string())
            .map_or(ReadyState::Complete, |state| {
                ReadyState::from_document_state(&state)
            })
    }

    fn find(&self, selector: &str) -> Result<Option<HtmlElement>, DomError> {
        let found = self
            .document
            .query_selector(selector)
            .map_err(|err| DomError::Query {
                selector: selector.to_string(),
                reason: describe(&err),
            })?;
        // non-html matches (e.g. svg) have no offset box
        Ok(found.and_then(|element| element.dyn_into::<HtmlElement>().ok()))
    }

    fn root(&self) -> Result<HtmlElement, DomError> {
        self.document
            .document_element()
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
            .ok_or(DomError::NoRoot)
    }

    fn outer_height(&self, element: &HtmlElement) -> Result<Px, DomError> {
        Ok(Px::clamped(element.offset_height()))
    }

    fn style_property(&self, element: &HtmlElement, name: &str) -> Result<Option<String>, DomError> {
        let value = element
            .style()
            .get_property_value(name)
            .map_err(|err| DomError::Style {
                property: name.to_string(),
                reason: describe(&err),
            })?;
        Ok((!value.is_empty()).then_some(value))
    }

    fn set_style_property(
        &self,
        element: &HtmlElement,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        element
            .style()
            .set_property(name, value)
            .map_err(|err| DomError::Style {
                property: name.to_string(),
                reason: describe(&err),
            })
    }
}

impl Scheduler for WebHost {
    type Target = HtmlElement;
    type Timer = WebTimer;
    type Subscription = WebSubscription;

    fn schedule_after(&self, delay: Duration, task: Task) -> Result<WebTimer, DomError> {
        let callback = once(task);
        let timeout = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let handle = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                timeout,
            )
            .map_err(|err| DomError::Timer {
                reason: describe(&err),
            })?;
        Ok(WebTimer {
            handle,
            _callback: callback,
        })
    }

    fn cancel(&self, timer: WebTimer) {
        self.window.clear_timeout_with_handle(timer.handle);
    }

    fn on_resize(&self, callback: Callback) -> Result<WebSubscription, DomError> {
        self.listen(&self.window, "resize", Closure::wrap(callback))
    }

    fn on_change(
        &self,
        target: &HtmlElement,
        mut callback: Callback,
    ) -> Result<Option<WebSubscription>, DomError> {
        if !self.has_mutation_observer() {
            return Ok(None);
        }

        let callback = Closure::wrap(Box::new(
            move |_records: js_sys::Array, _observer: MutationObserver| callback(),
        )
            as Box<dyn FnMut(js_sys::Array, MutationObserver)>);
        let subscribe_error = |err: JsValue| DomError::Subscribe {
            event: "mutation".to_string(),
            reason: describe(&err),
        };

        let observer =
            MutationObserver::new(callback.as_ref().unchecked_ref()).map_err(subscribe_error)?;
        let init = MutationObserverInit::new();
        init.set_attributes(true);
        init.set_child_list(true);
        init.set_subtree(true);
        observer
            .observe_with_options(target, &init)
            .map_err(subscribe_error)?;

        Ok(Some(WebSubscription::Observer {
            observer,
            _callback: callback,
        }))
    }

    fn on_ready(&self, task: Task) -> Result<WebSubscription, DomError> {
        self.listen(&self.document, "DOMContentLoaded", once(task))
    }
}
