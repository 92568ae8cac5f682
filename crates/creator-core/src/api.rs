//! Programmatic interface
//!
//! Runs the same commands as the CLI without a process boundary. Every call
//! returns a [`CreatorResult`]; validation errors are reported in it rather
//! than raised.
//!
//! ```ignore
//! use creator_core::api::V1;
//! use serde_json::json;
//!
//! let result = V1::new().run(
//!     &["init", "collection"],
//!     json!({"collection": "testns.testname"}).as_object().cloned().unwrap_or_default(),
//! );
//! println!("{} -> {:?}", result.message, result.path);
//! ```

use crate::commands::execute;
use crate::error::{CreatorError, Result};
use crate::output::Output;
use crate::registry;
use crate::templates::{ActionRecord, TemplateStore};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

const TEMP_DIR_PREFIX: &str = "ansible-creator-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Error,
}

/// Outcome of one API call
#[derive(Debug, Clone, Serialize)]
pub struct CreatorResult {
    pub status: ResultStatus,
    /// Where content was written; absent when validation failed first
    pub path: Option<PathBuf>,
    /// Captured messages as `"<Level>: <message>"`
    pub logs: Vec<String>,
    pub message: String,
    pub records: Vec<ActionRecord>,
}

impl CreatorResult {
    fn early_error(err: CreatorError, output: &Output) -> Self {
        Self {
            status: ResultStatus::Error,
            path: None,
            logs: output.lines(),
            message: err.to_string(),
            records: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }
}

/// Version 1 of the programmatic interface
#[derive(Debug, Clone, Default)]
pub struct V1 {
    verbosity: u8,
    store: TemplateStore,
}

impl V1 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages kept in `logs`: 0 notes and warnings, 1 adds info, 2 adds debug
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_store(mut self, store: TemplateStore) -> Self {
        self.store = store;
        self
    }

    /// The whole command tree as JSON
    pub fn schema(&self) -> Value {
        registry::schema()
    }

    /// One node of the command tree, e.g. `["add", "plugin"]`
    pub fn schema_for(&self, path: &[&str]) -> Result<Value> {
        registry::schema_for(path)
    }

    /// Run the command at `path` with `params`
    ///
    /// Without a `path`/`init_path` parameter content goes to a fresh
    /// temporary directory that the caller is expected to remove.
    pub fn run(&self, path: &[&str], params: Map<String, Value>) -> CreatorResult {
        let mut output = Output::capture(self.verbosity);

        let command = match registry::find_leaf(path) {
            Ok(command) => command,
            Err(e) => return CreatorResult::early_error(e, &output),
        };
        if let Err(e) = registry::validate_params(command, &params) {
            return CreatorResult::early_error(e, &output);
        }

        let explicit_path = params
            .iter()
            .any(|(k, v)| !v.is_null() && command.param(k).is_some_and(|p| p.name == command.path_param()));
        // Every parameter is checked before a temporary directory exists
        let mut request = match registry::build_request(command, &params, PathBuf::new()) {
            Ok(request) => request,
            Err(e) => return CreatorResult::early_error(e, &output),
        };
        if !explicit_path {
            request.path = match make_temp_dir() {
                Ok(dir) => dir,
                Err(e) => return CreatorResult::early_error(e, &output),
            };
            // A fresh temporary directory can never hold a collection
            request.skip_collection_check = true;
        }

        output.debug(format!(
            "Running '{}' in {}",
            path.join(" "),
            request.path.display()
        ));
        let execution = execute(&self.store, &request, &mut output);

        let (status, message) = match &execution.result {
            Ok(()) => (
                ResultStatus::Success,
                output.last_note().unwrap_or_default().to_string(),
            ),
            Err(e) => (ResultStatus::Error, e.to_string()),
        };

        CreatorResult {
            status,
            path: execution.destination.or(Some(request.path)),
            logs: output.lines(),
            message,
            records: execution.records,
        }
    }
}

fn make_temp_dir() -> Result<PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix(TEMP_DIR_PREFIX)
        .tempdir()
        .map_err(|e| CreatorError::io(std::env::temp_dir(), e))?;
    Ok(dir.keep())
}
