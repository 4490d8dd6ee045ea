//! Graphics context loss on the web canvas
//!
//! A lost context is logged and its default action prevented so the browser
//! may restore it. Restoration is logged too. GPU buffers are not rebuilt
//! afterwards; the galaxy stays blank until reload.

use std::cell::Cell;
use std::rc::Rc;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlCanvasElement};

const LOST: &str = "webglcontextlost";
const RESTORED: &str = "webglcontextrestored";

/// Keeps both listeners registered; removes them on drop.
pub struct ContextLossWatch {
    canvas: HtmlCanvasElement,
    lost: Rc<Cell<bool>>,
    on_lost: Closure<dyn Fn(Event)>,
    on_restored: Closure<dyn Fn(Event)>,
}

impl ContextLossWatch {
    pub fn attach(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let lost = Rc::new(Cell::new(false));

        let flag = lost.clone();
        let on_lost = Closure::wrap(Box::new(move |e: Event| {
            e.prevent_default();
            flag.set(true);
            warn!("Graphics context lost");
        }) as Box<dyn Fn(Event)>);
        canvas.add_event_listener_with_callback(LOST, on_lost.as_ref().unchecked_ref())?;

        let flag = lost.clone();
        let on_restored = Closure::wrap(Box::new(move |_e: Event| {
            flag.set(false);
            info!("Graphics context restored");
        }) as Box<dyn Fn(Event)>);
        canvas.add_event_listener_with_callback(RESTORED, on_restored.as_ref().unchecked_ref())?;

        Ok(Self {
            canvas: canvas.clone(),
            lost,
            on_lost,
            on_restored,
        })
    }

    pub fn is_lost(&self) -> bool {
        self.lost.get()
    }
}

impl Drop for ContextLossWatch {
    fn drop(&mut self) {
        let _ = self
            .canvas
            .remove_event_listener_with_callback(LOST, self.on_lost.as_ref().unchecked_ref());
        let _ = self.canvas.remove_event_listener_with_callback(
            RESTORED,
            self.on_restored.as_ref().unchecked_ref(),
        );
    }
}
