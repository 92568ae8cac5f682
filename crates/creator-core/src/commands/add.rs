//! `add`: resources and plugins inside an existing directory

use super::{with_unique_suffix, Request, Session};
use crate::context::{resolve, PluginType, ResourceKind};
use crate::error::{CreatorError, Result};
use crate::templates::Action;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Component, Path};

const GALAXY_FILE: &str = "galaxy.yml";

/// Collection an action plugin needs at runtime
const ACTION_DEPENDENCY: (&str, &str) = ("ansible.utils", "*");

/// `add resource <devcontainer|devfile|execution-environment|role>`
pub(super) fn resource(session: &mut Session<'_>, request: &Request) -> Result<()> {
    let path = &request.path;
    check_existing_dir(path)?;

    let mut params = with_unique_suffix(&request.params);
    if params.project_name.is_none() {
        params.project_name = Some(project_name_from_path(path));
    }
    let ctx = resolve(request.kind, &params)?;

    if request.kind == ResourceKind::Role {
        check_collection(path, request.skip_collection_check)?;
    }
    session.destination = Some(path.clone());

    session.scaffold(&format!("common/{}", request.kind.label()), path, &ctx)?;

    session
        .output
        .note(format!("Resource added to {}", path.display()));
    Ok(())
}

/// `add plugin <type> <name>`
pub(super) fn plugin(session: &mut Session<'_>, request: &Request, plugin_type: PluginType) -> Result<()> {
    let path = &request.path;
    check_existing_dir(path)?;

    let params = with_unique_suffix(&request.params);
    let ctx = resolve(request.kind, &params)?;
    check_collection(path, request.skip_collection_check)?;
    session.destination = Some(path.clone());

    if plugin_type == PluginType::Action {
        add_action_dependency(session, &path.join(GALAXY_FILE))?;
    }

    let plugins = path.join("plugins");
    session.scaffold(&plugin_type.template_root(), &plugins, &ctx)?;

    session.output.note(format!(
        "{} plugin added to {}",
        plugin_type.display_name(),
        plugins.join(plugin_type.dir_name()).display()
    ));
    Ok(())
}

fn check_existing_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(CreatorError::InvalidDestination(format!(
            "The path {} does not exist. Please provide an existing directory.",
            path.display()
        )))
    }
}

fn check_collection(path: &Path, skip: bool) -> Result<()> {
    if skip || path.join(GALAXY_FILE).is_file() {
        return Ok(());
    }
    Err(CreatorError::InvalidDestination(format!(
        "The path {} is not a valid Ansible collection path. \
         Please provide the root path of a valid ansible collection.",
        path.display()
    )))
}

/// Devfile name for a directory outside any known collection: its last two
/// path components joined with a dot
fn project_name_from_path(path: &Path) -> String {
    let parts: Vec<_> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let start = parts.len().saturating_sub(2);
    parts[start..].join(".")
}

/// Add the action plugin dependency to `galaxy.yml`, if it is not there yet
fn add_action_dependency(session: &mut Session<'_>, galaxy: &Path) -> Result<()> {
    if !galaxy.is_file() {
        session
            .output
            .debug(format!("No {} found; dependency not recorded", GALAXY_FILE));
        return Ok(());
    }

    let invalid = |detail: String| {
        CreatorError::InvalidDestination(format!("{}: {}", galaxy.display(), detail))
    };

    let text = fs::read_to_string(galaxy).map_err(|e| CreatorError::io(galaxy, e))?;
    let mut doc: Value = serde_yaml::from_str(&text).map_err(|e| invalid(e.to_string()))?;
    let root = doc
        .as_mapping_mut()
        .ok_or_else(|| invalid("expected a YAML mapping".to_string()))?;

    let deps = root
        .entry(Value::from("dependencies"))
        .or_insert(Value::Mapping(Mapping::new()));
    if deps.is_null() {
        *deps = Value::Mapping(Mapping::new());
    }
    let deps = deps
        .as_mapping_mut()
        .ok_or_else(|| invalid("'dependencies' must be a mapping".to_string()))?;

    let (name, version) = ACTION_DEPENDENCY;
    if deps.contains_key(name) {
        return Ok(());
    }
    deps.insert(Value::from(name), Value::from(version));

    let updated = serde_yaml::to_string(&doc).map_err(|e| invalid(e.to_string()))?;
    fs::write(galaxy, &updated).map_err(|e| CreatorError::io(galaxy, e))?;
    session
        .reporter
        .record(galaxy, Action::Overwritten, Some(updated.len() as u64));
    session
        .output
        .info(format!("Added dependency '{}' to {}", name, galaxy.display()));
    Ok(())
}
