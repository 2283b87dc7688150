// Post generation: template resolution, caption and image requests, and the
// per-platform orchestration that ties them together.
// All upstream calls go through the `GenerativeBackend` trait.

pub mod backend;
pub mod caption;
pub mod error;
pub mod handlers;
pub mod images;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod templates;

#[cfg(test)]
pub mod testing;
