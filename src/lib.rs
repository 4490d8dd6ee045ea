//! Galaxy visualizer - a rotating particle galaxy
//!
//! A spiral core field and a spherical nebula shell drawn as additive point
//! sprites, shaded procedurally and animated by a per-frame driver with
//! looping camera and light timelines.
//!
//! The field generator, shader math, animator and scene build and test
//! without any feature. The egui app and GPU renderer need `native` or `wasm`.

pub mod anim;
pub mod boundary;
pub mod camera;
pub mod error;
pub mod field;
pub mod params;
pub mod scene;
pub mod shader;
pub mod time;

#[cfg(feature = "ui")]
pub mod app;
#[cfg(feature = "ui")]
pub mod render;
#[cfg(feature = "ui")]
pub mod theme;

#[cfg(target_arch = "wasm32")]
mod context_loss;

pub use error::{ConfigError, SceneError};

#[cfg(target_arch = "wasm32")]
mod web {
    use tracing::{error, warn};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use crate::app::GalaxyApp;
    use crate::context_loss::ContextLossWatch;

    const CANVAS_ID: &str = "canvas";

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();

        // Initialize tracing for browser console
        tracing_wasm::set_as_global_default();

        wasm_bindgen_futures::spawn_local(async {
            let Some(canvas) = find_canvas() else {
                error!(id = CANVAS_ID, "No canvas element to render into");
                return;
            };

            let watch = match ContextLossWatch::attach(&canvas) {
                Ok(watch) => Some(watch),
                Err(e) => {
                    warn!(?e, "Could not watch for context loss");
                    None
                }
            };

            let started = eframe::WebRunner::new()
                .start(
                    canvas,
                    eframe::WebOptions::default(),
                    Box::new(move |cc| Ok(Box::new(GalaxyApp::new(cc, watch)))),
                )
                .await;
            if let Err(e) = started {
                error!(?e, "Failed to start eframe");
            }
        });
    }

    fn find_canvas() -> Option<web_sys::HtmlCanvasElement> {
        web_sys::window()?
            .document()?
            .get_element_by_id(CANVAS_ID)?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .ok()
    }
}
