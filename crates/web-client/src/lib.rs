//! l7x web client
//!
//! WebAssembly module shared by the admin panel, the login page and the main
//! chat page. Each page calls its own exports; the pages do not talk to each
//! other.

pub mod chat;
pub mod config;
pub mod console;
pub mod download;
pub mod error;
pub mod fullscreen;
mod http;
pub mod login;
pub mod observer;
pub mod pages;
pub mod session;

use wasm_bindgen::prelude::*;

pub use config::ClientConfig;
pub use error::ClientError;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    let config = ClientConfig::from_window();
    console::init(&config.log_level);
    log::debug!("l7x client initialized");
}
