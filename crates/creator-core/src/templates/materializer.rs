//! Writes a template root into a destination directory

use super::policy::{decide, CollisionFlags, Decision};
use super::render::Renderer;
use super::report::{Action, Reporter};
use super::store::{EntryKind, TemplateRoot};
use crate::context::VariableContext;
use crate::error::{CreatorError, Result};
use std::fs;
use std::path::Path;

/// Materialize every entry of `root` under `destination`
///
/// Entries are visited in lexicographic order of their template path. A
/// rejected file aborts the walk; whatever was written before it stays.
pub fn materialize(
    root: &TemplateRoot,
    destination: &Path,
    ctx: &VariableContext,
    flags: &CollisionFlags,
    renderer: &Renderer,
    reporter: &mut Reporter,
) -> Result<()> {
    let ctx = renderer.root_context(&root.name, &root.manifest, ctx)?;
    tracing::debug!(
        root = %root.name,
        destination = %destination.display(),
        entries = root.entries.len(),
        "materializing template root"
    );

    ensure_dir(destination, reporter)?;

    for entry in &root.entries {
        let target = destination.join(renderer.render_path(entry, &ctx)?);

        if entry.kind == EntryKind::Directory {
            ensure_dir(&target, reporter)?;
            continue;
        }

        let exists = target.exists();
        match decide(root.classify(entry), exists, flags) {
            Decision::Write => {
                let content = renderer.render(entry, &ctx)?;
                if let Some(parent) = target.parent() {
                    ensure_dir(parent, reporter)?;
                }
                fs::write(&target, &content).map_err(|e| CreatorError::io(&target, e))?;

                let action = if exists {
                    Action::Overwritten
                } else {
                    Action::Created
                };
                reporter.record(&target, action, Some(content.len() as u64));
            }
            Decision::Skip => {
                tracing::debug!(path = %target.display(), "keeping existing file");
                reporter.record(&target, Action::Skipped, None);
            }
            Decision::Reject => {
                return Err(CreatorError::DestinationConflict { path: target });
            }
        }
    }

    Ok(())
}

fn ensure_dir(path: &Path, reporter: &mut Reporter) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| CreatorError::io(path, e))?;
    reporter.record(path, Action::DirectoryCreated, None);
    Ok(())
}
