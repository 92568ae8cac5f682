//! Rendering of template content and destination paths

use super::manifest::TemplateManifest;
use super::store::{slash_path, EntryKind, TemplateEntry, TEMPLATE_SUFFIX};
use crate::context::VariableContext;
use crate::error::{CreatorError, Result};
use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use std::borrow::Cow;
use std::path::{Component, PathBuf};

/// Tokens replaced inside path segments, and the context key supplying each
pub const PATH_TOKENS: &[(&str, &str)] = &[
    ("project_org", "namespace"),
    ("project_repo", "collection_name"),
    ("sample_action", "plugin_name"),
    ("sample_filter", "plugin_name"),
    ("sample_lookup", "plugin_name"),
    ("sample_module", "plugin_name"),
    ("sample_test", "plugin_name"),
    ("role_name", "role_name"),
];

/// Substitutes placeholders in template content and file names
///
/// Undefined variables are errors, never silently blank.
pub struct Renderer {
    env: Environment<'static>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        Self { env }
    }

    /// Render one text template; `name` identifies it in error messages
    pub fn render_str(&self, name: &str, source: &str, ctx: &VariableContext) -> Result<String> {
        self.env
            .render_str(source, ctx)
            .map_err(|err| Self::map_error(name, err))
    }

    /// Final bytes for an entry: verbatim for copy entries, substituted for render entries
    pub fn render<'a>(&self, entry: &'a TemplateEntry, ctx: &VariableContext) -> Result<Cow<'a, [u8]>> {
        match entry.kind {
            EntryKind::Copy => Ok(Cow::Borrowed(entry.content.as_ref())),
            EntryKind::Directory => Ok(Cow::Borrowed(&[])),
            EntryKind::Render => {
                let source = std::str::from_utf8(&entry.content).map_err(|e| {
                    CreatorError::TemplateStore(format!(
                        "template '{}' is not valid UTF-8: {}",
                        entry.rel_str(),
                        e
                    ))
                })?;
                let text = self.render_str(&entry.rel_str(), source, ctx)?;
                Ok(Cow::Owned(text.into_bytes()))
            }
        }
    }

    /// Destination path for an entry, relative to the destination base
    pub fn render_path(&self, entry: &TemplateEntry, ctx: &VariableContext) -> Result<PathBuf> {
        let template = entry.rel_str();
        let mut out = PathBuf::new();
        for component in entry.rel_path.components() {
            let Component::Normal(segment) = component else {
                continue;
            };
            out.push(substitute_tokens(&segment.to_string_lossy(), ctx, &template)?);
        }

        if entry.kind == EntryKind::Render {
            let rendered = slash_path(&out);
            if let Some(stripped) = rendered.strip_suffix(TEMPLATE_SUFFIX) {
                out = PathBuf::from(stripped);
            }
        }
        Ok(out)
    }

    /// Context for one root: the invocation context plus the root's own vars
    pub fn root_context(
        &self,
        root_name: &str,
        manifest: &TemplateManifest,
        ctx: &VariableContext,
    ) -> Result<VariableContext> {
        let mut merged = ctx.clone();
        for (key, var) in &manifest.vars {
            let value = if var.template {
                let serialized = serde_yaml::to_string(&var.value).map_err(|source| {
                    CreatorError::Manifest {
                        root: root_name.to_string(),
                        source,
                    }
                })?;
                let rendered = self.render_str(&format!("{}:vars.{}", root_name, key), &serialized, ctx)?;
                serde_yaml::from_str::<serde_yaml::Value>(&rendered).map_err(|source| {
                    CreatorError::Manifest {
                        root: root_name.to_string(),
                        source,
                    }
                })?
            } else {
                var.value.clone()
            };
            let json = serde_json::to_value(&value).map_err(|e| {
                CreatorError::TemplateStore(format!(
                    "variable '{}' of root '{}' cannot be used: {}",
                    key, root_name, e
                ))
            })?;
            merged.insert(key.clone(), json);
        }
        Ok(merged)
    }

    fn map_error(name: &str, err: minijinja::Error) -> CreatorError {
        if err.kind() == ErrorKind::UndefinedError {
            CreatorError::UnresolvedPlaceholder {
                template: name.to_string(),
                detail: err.to_string(),
            }
        } else {
            CreatorError::Render {
                template: name.to_string(),
                source: err,
            }
        }
    }
}

/// Replace path tokens in one segment, scanning the template text once
///
/// Substituted values are never searched again, so a user value that happens
/// to contain a token name is written as given.
fn substitute_tokens(segment: &str, ctx: &VariableContext, template: &str) -> Result<String> {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;
    loop {
        // Earliest match wins; the longer token wins at the same offset
        let next = PATH_TOKENS
            .iter()
            .filter_map(|(token, key)| rest.find(token).map(|at| (at, *token, *key)))
            .min_by_key(|(at, token, _)| (*at, std::cmp::Reverse(token.len())));
        let Some((at, token, key)) = next else {
            out.push_str(rest);
            return Ok(out);
        };
        let value = ctx
            .get_str(key)
            .ok_or_else(|| CreatorError::UnresolvedPlaceholder {
                template: template.to_string(),
                detail: format!("path token '{}' needs a value for '{}'", token, key),
            })?;
        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + token.len()..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::manifest::MetaVar;
    use std::borrow::Cow;

    fn ctx() -> VariableContext {
        let mut ctx = VariableContext::new();
        ctx.insert("namespace", "testns");
        ctx.insert("collection_name", "testname");
        ctx.insert("fqcn", "testns.testname");
        ctx.insert("plugin_name", "my_filter");
        ctx
    }

    fn file(rel: &str, content: &'static [u8]) -> TemplateEntry {
        let kind = if rel.ends_with(TEMPLATE_SUFFIX) {
            EntryKind::Render
        } else {
            EntryKind::Copy
        };
        TemplateEntry {
            rel_path: PathBuf::from(rel),
            kind,
            content: Cow::Borrowed(content),
        }
    }

    #[test]
    fn test_copy_returns_original_bytes() {
        let renderer = Renderer::new();
        let bytes: &'static [u8] = &[0xff, 0x00, b'{', b'{', b' ', b'x', 0xfe, b'}', b'}'];
        let entry = file("icon.png", bytes);
        let out = renderer.render(&entry, &ctx()).unwrap();
        assert_eq!(out.as_ref(), bytes);

        let out = renderer.render(&entry, &VariableContext::new()).unwrap();
        assert_eq!(out.as_ref(), bytes);
    }

    #[test]
    fn test_render_substitutes_placeholders() {
        let renderer = Renderer::new();
        let entry = file("galaxy.yml.j2", b"name: {{ collection_name }}\nfqcn: {{ fqcn }}\n");
        let out = renderer.render(&entry, &ctx()).unwrap();
        assert_eq!(
            String::from_utf8(out.into_owned()).unwrap(),
            "name: testname\nfqcn: testns.testname\n"
        );
    }

    #[test]
    fn test_unresolved_placeholder() {
        let renderer = Renderer::new();
        let entry = file("README.md.j2", b"{{ not_there }}");
        let err = renderer.render(&entry, &ctx()).unwrap_err();
        match err {
            CreatorError::UnresolvedPlaceholder { template, .. } => {
                assert_eq!(template, "README.md.j2")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_syntax_error_is_render_error() {
        let renderer = Renderer::new();
        let entry = file("broken.j2", b"{% if %}");
        assert!(matches!(
            renderer.render(&entry, &ctx()),
            Err(CreatorError::Render { .. })
        ));
    }

    #[test]
    fn test_render_path_substitutes_tokens() {
        let renderer = Renderer::new();
        let entry = file("sample_filter.py.j2", b"");
        assert_eq!(
            renderer.render_path(&entry, &ctx()).unwrap(),
            PathBuf::from("my_filter.py")
        );

        let entry = file("collections/ansible_collections/project_org/project_repo/README.md", b"");
        assert_eq!(
            renderer.render_path(&entry, &ctx()).unwrap(),
            PathBuf::from("collections/ansible_collections/testns/testname/README.md")
        );
    }

    #[test]
    fn test_render_path_values_are_not_rescanned() {
        let renderer = Renderer::new();
        let mut ctx = ctx();
        ctx.insert("plugin_name", "role_name_filter");
        let entry = file("filter/sample_filter.py.j2", b"");
        assert_eq!(
            renderer.render_path(&entry, &ctx).unwrap(),
            PathBuf::from("filter/role_name_filter.py")
        );

        let mut ctx = VariableContext::new();
        ctx.insert("namespace", "project_repo");
        ctx.insert("collection_name", "demo");
        let entry = file("collections/ansible_collections/project_org/project_repo/galaxy.yml.j2", b"");
        assert_eq!(
            renderer.render_path(&entry, &ctx).unwrap(),
            PathBuf::from("collections/ansible_collections/project_repo/demo/galaxy.yml")
        );
    }

    #[test]
    fn test_render_path_keeps_j2_on_copy_entries() {
        let renderer = Renderer::new();
        let entry = file("docs/example.j2.txt", b"");
        assert_eq!(
            renderer.render_path(&entry, &ctx()).unwrap(),
            PathBuf::from("docs/example.j2.txt")
        );
    }

    #[test]
    fn test_render_path_missing_token_value() {
        let renderer = Renderer::new();
        let entry = file("roles/role_name/tasks/main.yml.j2", b"");
        assert!(matches!(
            renderer.render_path(&entry, &ctx()),
            Err(CreatorError::UnresolvedPlaceholder { .. })
        ));
    }

    #[test]
    fn test_root_context_merges_vars() {
        let renderer = Renderer::new();
        let mut manifest = TemplateManifest::default();
        manifest.vars.insert(
            "greeting".to_string(),
            MetaVar {
                value: serde_yaml::Value::String("hello {{ fqcn }}".to_string()),
                template: true,
            },
        );
        manifest.vars.insert(
            "raw".to_string(),
            MetaVar {
                value: serde_yaml::Value::String("{{ untouched }}".to_string()),
                template: false,
            },
        );
        let merged = renderer.root_context("demo", &manifest, &ctx()).unwrap();
        assert_eq!(merged.get_str("greeting"), Some("hello testns.testname"));
        assert_eq!(merged.get_str("raw"), Some("{{ untouched }}"));
        assert_eq!(merged.get_str("fqcn"), Some("testns.testname"));
    }
}
