//! Template roots and the engine that writes them out
//!
//! This module provides:
//! - Template manifest types (classification lists, root-level vars)
//! - A store reading roots from the binary or a local directory
//! - Rendering of content and destination paths
//! - The collision policy and the materializer applying it
//! - Version compatibility checking

pub mod manifest;
pub mod materializer;
pub mod policy;
pub mod render;
pub mod report;
pub mod store;
pub mod version;

pub use manifest::{Classification, TemplateManifest};
pub use materializer::materialize;
pub use policy::{decide, CollisionFlags, Decision};
pub use render::Renderer;
pub use report::{summarize, Action, ActionRecord, Reporter, Summary};
pub use store::{EntryKind, TemplateEntry, TemplateRoot, TemplateSource, TemplateStore};
pub use version::check_compatibility;
