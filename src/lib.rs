/// Domain Tab Grouper - Chrome Extension that groups tabs by site
/// Built with Rust + WASM

pub mod bridge;
pub mod cache;
pub mod domain;
pub mod engine;
pub mod error;
pub mod group_style;
pub mod host;
pub mod messages;
pub mod settings;
pub mod tab_data;

#[cfg(test)]
mod testing;

use std::collections::HashMap;

use futures::future::LocalBoxFuture;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::bridge::{ChromeStorage, ChromeTabs};
use crate::engine::GroupingEngine;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Entry point for the background service worker
#[wasm_bindgen]
pub fn start_background() {
    let engine = GroupingEngine::new(
        ChromeTabs,
        ChromeStorage,
        Box::new(|task: LocalBoxFuture<'static, ()>| spawn_local(task)),
    );

    spawn_local(async move {
        log::info!("Domain Tab Grouper: Initializing...");
        engine.load_settings().await;
        bridge::register_listeners(&engine);
        engine.group_existing_tabs().await;
        log::info!("Domain Tab Grouper: Initialization complete");
    });
}

// Re-export the derivations so the settings page lists domains exactly as they are grouped
#[wasm_bindgen]
pub fn extract_domain(url: &str, group_subdomains: bool) -> Option<String> {
    domain::extract_domain(url, group_subdomains)
}

#[wasm_bindgen]
pub fn group_color(domain: &str) -> String {
    group_style::color_for_domain(domain, &HashMap::new())
}

#[wasm_bindgen]
pub fn group_title(domain: &str) -> String {
    group_style::title_for_domain(domain, &HashMap::new())
}
