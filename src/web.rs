//! Browser entry point.

use wasm_bindgen::prelude::*;

use crate::desktop::SmokeApp;

/// Runs the smoke canvas inside the `<canvas>` element with id `canvas_id`.
#[wasm_bindgen]
pub async fn start(canvas_id: String) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    // A second call would find the logger already installed.
    let _ = console_log::init_with_level(log::Level::Info);

    log::info!("starting smokeflow on #{canvas_id}");
    eframe::WebRunner::new()
        .start(
            &canvas_id,
            eframe::WebOptions::default(),
            Box::new(|cc| Box::new(SmokeApp::new(cc))),
        )
        .await
}
