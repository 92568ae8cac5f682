//! Creator Core - scaffolding engine for Ansible content
//!
//! Writes bundled template trees (collections, playbook projects, execution
//! environments, plugins and smaller resources) into a destination directory,
//! substituting variables into file contents and file names.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Engine** - template store, variable resolution, rendering,
//!   collision policy, materializer and action reporting
//! - **Layer 2: Commands** - `init` and `add` handlers choosing which template
//!   roots a request needs
//! - **Layer 3: Interfaces** - a static command registry and the `V1`
//!   programmatic API built on it (the CLI lives in its own crate)
//!
//! # Example Usage
//!
//! ```ignore
//! use creator_core::{execute, Output, Request, ResourceKind, TemplateStore, UserParams};
//!
//! let params = UserParams {
//!     collection: Some("testns.testname".to_string()),
//!     ..Default::default()
//! };
//! let request = Request::new(ResourceKind::Collection, params, "./testns/testname");
//! let mut output = Output::terminal(0, true);
//! let execution = execute(&TemplateStore::embedded(), &request, &mut output);
//! println!("{}", execution.summary());
//! ```

pub mod api;
pub mod commands;
pub mod context;
pub mod error;
pub mod output;
pub mod registry;
pub mod templates;

// Re-export main types for convenience
pub use api::{CreatorResult, ResultStatus, V1};
pub use commands::{execute, Execution, Request, Status};
pub use context::{resolve, PluginType, ResourceKind, UserParams, VariableContext};
pub use error::{CreatorError, ErrorCategory, Result};
pub use output::{Level, Output};
pub use templates::{
    ActionRecord, CollisionFlags, Summary, TemplateSource, TemplateStore,
};

/// Version of this library, compared against template root versions
pub const CREATOR_VERSION: &str = env!("CARGO_PKG_VERSION");
