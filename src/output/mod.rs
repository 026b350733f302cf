//! Output formatting for template documents.
//!
//! This module handles rendering the finished document:
//! - [`json`] - JSON rendering to a string or writer

mod json;

pub use json::{render_document, write_document};
