//! Domain models for entity-browser.
//!
//! # Core Concepts
//!
//! - [`Entity`]: a server-managed record with an id, a type label and opaque
//!   parameter data. Entities are transient on the client: they exist while
//!   their rendered fragment is visible.
//! - [`EntityId`]: the identifier used both in `/entity/{id}` paths and as the
//!   addressing key of a rendered fragment.
//! - [`Params`]: parameter payload, either pre-formatted text or the backend's
//!   name/value dictionary.
//! - [`DataAttachment`]: descriptor of binary data attached to an entity.

mod entity;
mod id;
mod params;

pub use entity::*;
pub use id::*;
pub use params::*;

use thiserror::Error;

/// Errors raised while decoding backend payloads.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered `{"res": null}`, its way of saying "no such entity".
    #[error("no entity in response")]
    Missing,
}
