//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Word supply for Touch Typing (HTTP in the browser, built-in list natively)
//! - Mounting a game onto the page canvas with its listeners (wasm)

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::games::typing::WordSource;

/// Word source for this platform
#[cfg(not(target_arch = "wasm32"))]
pub fn word_source(seed: u64) -> Box<dyn WordSource> {
    Box::new(crate::games::typing::WordList::new(seed))
}

/// Word source for this platform
#[cfg(target_arch = "wasm32")]
pub fn word_source(_seed: u64) -> Box<dyn WordSource> {
    Box::new(web::HttpWordSource::new())
}
