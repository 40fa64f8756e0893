pub mod client;
pub mod config;
pub mod controller;
pub mod events;
pub mod view;

pub use entity_core::{models, render};
