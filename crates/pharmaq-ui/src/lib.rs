//! Pharmaq UI crate - the embedded browser page.
//!
//! The page is a single self-contained HTML file with CSS and JavaScript
//! inline, embedded at compile time via `include_str!`.

pub mod page;
