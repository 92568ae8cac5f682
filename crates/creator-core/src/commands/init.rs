//! `init`: new collection, playbook or execution environment projects

use super::{with_unique_suffix, Request, Session};
use crate::context::{resolve, PluginType, ResourceKind, VariableContext};
use crate::error::{CreatorError, Result};
use std::path::{Path, PathBuf};

/// Shared roots added to collection and playbook projects
const COMMON_ROOTS: &[&str] = &[
    "common/devcontainer",
    "common/devfile",
    "common/gitignore",
    "common/vscode",
];

/// Sample plugins shipped in a new collection
///
/// Action plugins bring their own module, which would collide with the
/// module sample, so they are left out.
const SAMPLE_PLUGINS: &[PluginType] = &[
    PluginType::Filter,
    PluginType::Lookup,
    PluginType::Module,
    PluginType::Test,
];

pub(super) fn run(session: &mut Session<'_>, request: &Request) -> Result<()> {
    if request.flags.force {
        session.output.warning(
            "The `force` flag is deprecated and will be removed soon. \
             Please start using `overwrite` flag.",
        );
    }

    let params = with_unique_suffix(&request.params);
    let ctx = resolve(request.kind, &params)?;
    let destination = init_destination(&request.path, request.kind, &ctx);

    if destination.is_file() {
        return Err(CreatorError::InvalidDestination(format!(
            "the path {} already exists, but is a file - aborting",
            destination.display()
        )));
    }
    session.destination = Some(destination.clone());

    let project_root = match request.kind {
        ResourceKind::Collection => "collection_project",
        ResourceKind::Playbook => "playbook_project",
        _ => "execution_env_project",
    };
    session.scaffold(project_root, &destination, &ctx)?;

    if request.kind != ResourceKind::ExecutionEnvProject {
        for root in COMMON_ROOTS {
            session.scaffold(root, &destination, &ctx)?;
        }
    }

    if request.kind == ResourceKind::Collection {
        scaffold_samples(session, &destination, &ctx)?;
    }

    session.output.note(format!(
        "{} project created at {}",
        request.kind.label(),
        destination.display()
    ));
    Ok(())
}

fn scaffold_samples(session: &mut Session<'_>, destination: &Path, ctx: &VariableContext) -> Result<()> {
    let plugins = destination.join("plugins");
    for plugin_type in SAMPLE_PLUGINS {
        session.scaffold(&plugin_type.template_root(), &plugins, ctx)?;
    }
    Ok(())
}

/// A collection initialized inside `collections/ansible_collections` gets
/// the usual `<namespace>/<name>` layout below it
fn init_destination(path: &Path, kind: ResourceKind, ctx: &VariableContext) -> PathBuf {
    if kind == ResourceKind::Collection && path.ends_with("collections/ansible_collections") {
        if let (Some(namespace), Some(name)) = (ctx.get_str("namespace"), ctx.get_str("collection_name")) {
            return path.join(namespace).join(name);
        }
    }
    path.to_path_buf()
}
