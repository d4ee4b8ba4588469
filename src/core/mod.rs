// Internal modules - not part of public API
pub(crate) mod config;
pub(crate) mod discovery;
pub(crate) mod pool;
pub(crate) mod progress;
pub(crate) mod report;


// Public API - curated exports only
pub mod api;

// Re-export key items at module level for convenience
pub use api::*;
