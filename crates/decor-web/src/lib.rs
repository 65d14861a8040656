//! decor storefront Web Frontend
//!
//! Leptos-based WASM frontend: pricing widget with gated checkout and the
//! published-article viewer.

mod api;
mod app;
mod browser;
mod components;
mod logging;
mod pages;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    logging::init();
    leptos::mount::mount_to_body(App);
}
