//! Command handlers: `init` for projects, `add` for resources and plugins
//!
//! A handler resolves the variable context first, so input errors surface
//! before anything is written, then materializes one or more template roots
//! through a [`Session`] that carries the per-invocation state.

mod add;
mod init;

use crate::context::{ResourceKind, UserParams, VariableContext};
use crate::error::{CreatorError, Result};
use crate::output::Output;
use crate::templates::{
    check_compatibility, materialize, summarize, ActionRecord, CollisionFlags, Renderer, Reporter,
    Summary, TemplateStore,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One fully parsed scaffolding request
#[derive(Debug, Clone)]
pub struct Request {
    pub kind: ResourceKind,
    pub params: UserParams,
    /// Project directory for `init`, existing target directory for `add`
    pub path: PathBuf,
    pub flags: CollisionFlags,
    /// Allow `add plugin`/`add resource role` outside a collection
    pub skip_collection_check: bool,
}

impl Request {
    pub fn new(kind: ResourceKind, params: UserParams, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            params,
            path: path.into(),
            flags: CollisionFlags::default(),
            skip_collection_check: false,
        }
    }

    pub fn with_flags(mut self, flags: CollisionFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// How an invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Completed,
    Rejected,
    Failed,
}

/// Result of [`execute`]; records are kept even when the invocation failed
#[derive(Debug)]
pub struct Execution {
    /// Final destination, once it was known
    pub destination: Option<PathBuf>,
    pub records: Vec<ActionRecord>,
    pub result: Result<()>,
}

impl Execution {
    pub fn status(&self) -> Status {
        match &self.result {
            Ok(()) => Status::Completed,
            Err(e) if e.is_rejection() => Status::Rejected,
            Err(_) => Status::Failed,
        }
    }

    pub fn summary(&self) -> Summary {
        summarize(&self.records)
    }

    pub fn error(&self) -> Option<&CreatorError> {
        self.result.as_ref().err()
    }
}

/// State scoped to one invocation
struct Session<'a> {
    store: &'a TemplateStore,
    renderer: Renderer,
    flags: CollisionFlags,
    reporter: Reporter,
    output: &'a mut Output,
    destination: Option<PathBuf>,
}

impl<'a> Session<'a> {
    fn new(store: &'a TemplateStore, flags: CollisionFlags, output: &'a mut Output) -> Self {
        Self {
            store,
            renderer: Renderer::new(),
            flags,
            reporter: Reporter::new(),
            output,
            destination: None,
        }
    }

    /// Load one template root and write it under `destination`
    fn scaffold(&mut self, root_name: &str, destination: &Path, ctx: &VariableContext) -> Result<()> {
        let root = self.store.load(root_name)?;
        if let Some(version) = root.manifest.version.as_deref() {
            if let Some(warning) = check_compatibility(crate::CREATOR_VERSION, version, root_name) {
                self.output.warning(warning);
            }
        }
        self.output.debug(format!(
            "Materializing '{}' into {}",
            root_name,
            destination.display()
        ));
        materialize(
            &root,
            destination,
            ctx,
            &self.flags,
            &self.renderer,
            &mut self.reporter,
        )
    }
}

/// Run one request against a template store
pub fn execute(store: &TemplateStore, request: &Request, output: &mut Output) -> Execution {
    tracing::debug!(kind = request.kind.label(), path = %request.path.display(), "executing request");

    let mut session = Session::new(store, request.flags, output);
    let result = request.flags.validate().and_then(|()| match request.kind {
        ResourceKind::Collection | ResourceKind::Playbook | ResourceKind::ExecutionEnvProject => {
            init::run(&mut session, request)
        }
        ResourceKind::Devcontainer
        | ResourceKind::Devfile
        | ResourceKind::ExecutionEnvironment
        | ResourceKind::Role => add::resource(&mut session, request),
        ResourceKind::Plugin(plugin_type) => add::plugin(&mut session, request, plugin_type),
    });

    if let Err(e) = &result {
        session.output.error(e.full_message());
    }

    Execution {
        destination: session.destination,
        records: session.reporter.into_records(),
        result,
    }
}

/// Fill in a devfile suffix when the caller did not supply one
fn with_unique_suffix(params: &UserParams) -> UserParams {
    let mut params = params.clone();
    if params.unique_suffix.is_none() {
        let id = Uuid::new_v4().simple().to_string();
        params.unique_suffix = Some(id[..8].to_string());
    }
    params
}
