//! Embedded static assets.
//!
//! The stylesheet and the sample catalog are baked into the binary so a fresh
//! install can serve pages and seed data with no files beside it.

use rust_embed::RustEmbed;
use std::borrow::Cow;

#[derive(RustEmbed)]
#[folder = "assets/"]
#[include = "stylesheets/*.css"]
#[include = "seed/*.toml"]
struct Assets;

pub const STYLESHEET_PATH: &str = "stylesheets/style.css";
pub const SEED_CATALOG_PATH: &str = "seed/catalog.toml";

pub fn get_asset(path: &str) -> Option<Cow<'static, [u8]>> {
    Assets::get(path).map(|file| file.data)
}

pub fn get_text(path: &str) -> Option<String> {
    get_asset(path).map(|data| String::from_utf8_lossy(&data).into_owned())
}

/// Content type for the handful of extensions shipped in `assets/`.
pub fn content_type(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("css") => "text/css; charset=utf-8",
        Some("toml") => "application/toml",
        _ => "application/octet-stream",
    }
}
