//! Core types for entity-browser.
//!
//! [`models`] holds the entity data as the backend serves it, [`render`]
//! turns an entity into the HTML fragment shown in the result container.
//! Nothing in this crate performs I/O.

pub mod models;
pub mod render;

pub use models::*;
pub use render::{escape_html, fragment_class, render_entity, render_parameters};
