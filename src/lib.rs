//! # repos-update
//!
//! `repos-update` is a library for bulk maintenance of many Git repositories.
//! It powers the `repos-update` CLI tool.
//!
//! ## Core Features
//!
//! - **Fast Discovery**: Parallel repository scanning using `ignore` and `rayon`.
//! - **Bounded Concurrency**: Pull, fetch and inspect hundreds of repos with at most `-j` in flight.
//! - **Deterministic Reports**: Results always print in discovery order.
//!
//! ## Example
//!
//! ```rust,no_run
//! use repos_update::core::find_repos_from_path;
//!
//! fn main() {
//!     for repo in find_repos_from_path(".") {
//!         println!("{}: {}", repo.display, repo.path.display());
//!     }
//! }
//! ```

pub mod commands;
pub mod core;
pub mod git;
pub mod utils;
