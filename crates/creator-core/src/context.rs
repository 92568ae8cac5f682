//! Variable resolution: user parameters in, substitution context out

use crate::error::{CreatorError, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

pub const DEFAULT_AUTHOR: &str = "Your Name <example@domain.com>";
pub const DEFAULT_DESCRIPTION: &str = "your collection description";
pub const DEFAULT_LICENSE: &str = "GPL-2.0-or-later";
pub const DEFAULT_PLUGIN_NAME: &str = "hello_world";

pub const DEV_CONTAINER_IMAGE: &str = "ghcr.io/ansible/community-ansible-dev-tools:latest";
pub const DEV_CONTAINER_UPSTREAM_IMAGE: &str = "ghcr.io/ansible/community-ansible-dev-tools:latest";
pub const DEV_CONTAINER_DOWNSTREAM_IMAGE: &str =
    "registry.redhat.io/ansible-automation-platform-25/ansible-dev-tools-rhel8:latest";
pub const DEV_FILE_IMAGE: &str = "ghcr.io/ansible/ansible-devspaces:latest";
pub const EXECUTION_ENVIRONMENT_IMAGE: &str = "quay.io/fedora/fedora:41";
pub const RECOMMENDED_EXTENSIONS: &[&str] = &["redhat.ansible", "redhat.vscode-redhat-account"];

/// Namespace and name parts must be longer than this
const MIN_COLLECTION_PART_LEN: usize = 2;

static COLLECTION_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid regex"));

static CONTENT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("valid regex"));

/// Plugin types that can be added to a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginType {
    Action,
    Filter,
    Lookup,
    Module,
    Test,
}

impl PluginType {
    pub const ALL: [PluginType; 5] = [
        PluginType::Action,
        PluginType::Filter,
        PluginType::Lookup,
        PluginType::Module,
        PluginType::Test,
    ];

    /// Name used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginType::Action => "action",
            PluginType::Filter => "filter",
            PluginType::Lookup => "lookup",
            PluginType::Module => "module",
            PluginType::Test => "test",
        }
    }

    /// Directory under `plugins/` the plugin lands in
    pub fn dir_name(&self) -> &'static str {
        match self {
            PluginType::Module => "modules",
            other => other.as_str(),
        }
    }

    /// Label used in summary messages
    pub fn display_name(&self) -> &'static str {
        match self {
            PluginType::Action => "Action",
            PluginType::Filter => "Filter",
            PluginType::Lookup => "Lookup",
            PluginType::Module => "Module",
            PluginType::Test => "Test",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "action" => Some(PluginType::Action),
            "filter" => Some(PluginType::Filter),
            "lookup" => Some(PluginType::Lookup),
            "module" | "modules" => Some(PluginType::Module),
            "test" => Some(PluginType::Test),
            _ => None,
        }
    }

    /// Template root holding the plugin stub
    pub fn template_root(&self) -> String {
        format!("plugins/{}", self.as_str())
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything that can be scaffolded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Collection,
    Playbook,
    ExecutionEnvProject,
    Devcontainer,
    Devfile,
    ExecutionEnvironment,
    Role,
    Plugin(PluginType),
}

impl ResourceKind {
    /// Project kinds take a `<namespace>.<name>` identifier
    pub fn needs_collection(&self) -> bool {
        matches!(self, ResourceKind::Collection | ResourceKind::Playbook)
    }

    /// Label used in log messages and as `resource_type`
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Collection => "collection",
            ResourceKind::Playbook => "playbook",
            ResourceKind::ExecutionEnvProject => "execution_env",
            ResourceKind::Devcontainer => "devcontainer",
            ResourceKind::Devfile => "devfile",
            ResourceKind::ExecutionEnvironment => "execution-environment",
            ResourceKind::Role => "role",
            ResourceKind::Plugin(_) => "plugin",
        }
    }
}

/// Raw, unvalidated parameters supplied by a front end
#[derive(Debug, Clone, Default)]
pub struct UserParams {
    /// `<namespace>.<name>`
    pub collection: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub license: Option<String>,
    pub plugin_name: Option<String>,
    pub role_name: Option<String>,
    /// Devcontainer image alias (`auto`, `upstream`, `aap`) or a literal image
    pub image: Option<String>,
    /// Suffix that makes the devfile name unique; generated by the caller
    pub unique_suffix: Option<String>,
    /// Fallback name for the devfile when no collection is known
    pub project_name: Option<String>,
    pub creator_version: Option<String>,
}

/// Mapping from placeholder name to resolved value
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VariableContext {
    values: BTreeMap<String, Value>,
}

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// String value for a key; `None` when absent, empty or not a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Split and validate a `<namespace>.<name>` identifier
pub fn parse_collection(collection: &str) -> Result<(String, String)> {
    let invalid = |reason: &str| CreatorError::InvalidIdentifier {
        what: "collection name",
        value: collection.to_string(),
        reason: reason.to_string(),
    };

    let (namespace, name) = collection
        .split_once('.')
        .ok_or_else(|| invalid("must be in the format '<namespace>.<name>'"))?;

    for part in [namespace, name] {
        if part.is_empty() {
            return Err(invalid("must be in the format '<namespace>.<name>'"));
        }
        if !COLLECTION_PART.is_match(part) {
            return Err(invalid(
                "can only contain lower case letters, underscores, and numbers \
                 and must begin with a letter",
            ));
        }
        if part.len() <= MIN_COLLECTION_PART_LEN {
            return Err(invalid(
                "both the namespace and name must be longer than 2 characters",
            ));
        }
    }

    Ok((namespace.to_string(), name.to_string()))
}

/// Validate a plugin or role name
pub fn validate_content_name(what: &'static str, value: &str) -> Result<()> {
    if CONTENT_NAME.is_match(value) {
        Ok(())
    } else {
        Err(CreatorError::InvalidIdentifier {
            what,
            value: value.to_string(),
            reason: "can only contain lower case letters, underscores, and numbers \
                     and cannot begin with a number"
                .to_string(),
        })
    }
}

/// Map a devcontainer image alias to a concrete image
pub fn resolve_image(image: Option<&str>) -> String {
    match image.unwrap_or("auto") {
        "auto" => DEV_CONTAINER_IMAGE.to_string(),
        "upstream" => DEV_CONTAINER_UPSTREAM_IMAGE.to_string(),
        "aap" => DEV_CONTAINER_DOWNSTREAM_IMAGE.to_string(),
        other => other.to_string(),
    }
}

/// Build the substitution context for one invocation
///
/// Pure: the same inputs always produce the same context.
pub fn resolve(kind: ResourceKind, params: &UserParams) -> Result<VariableContext> {
    let mut ctx = VariableContext::new();

    let mut devfile_base = params.project_name.clone().unwrap_or_default();

    if kind.needs_collection() {
        let collection = params
            .collection
            .as_deref()
            .ok_or_else(|| CreatorError::MissingParameter("collection".to_string()))?;
        let (namespace, name) = parse_collection(collection)?;
        let fqcn = format!("{}.{}", namespace, name);

        ctx.insert("namespace_upper", namespace.to_uppercase());
        ctx.insert("collection_name_upper", name.to_uppercase());
        ctx.insert("fqcn_slug", format!("{}-{}", namespace, name));
        ctx.insert("fqcn", fqcn.clone());
        ctx.insert("namespace", namespace);
        ctx.insert("collection_name", name);
        devfile_base = fqcn;
    }

    ctx.insert("resource_type", kind.label());
    ctx.insert(
        "author",
        params.author.as_deref().unwrap_or(DEFAULT_AUTHOR),
    );
    ctx.insert(
        "description",
        params.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION),
    );
    ctx.insert("license", params.license.as_deref().unwrap_or(DEFAULT_LICENSE));
    ctx.insert(
        "creator_version",
        params
            .creator_version
            .as_deref()
            .unwrap_or(crate::CREATOR_VERSION),
    );

    let dev_file_name = match params.unique_suffix.as_deref() {
        Some(suffix) if !suffix.is_empty() => format!("{}-{}", devfile_base, suffix),
        _ => devfile_base,
    };
    ctx.insert("dev_file_name", dev_file_name);
    ctx.insert("dev_container_image", resolve_image(params.image.as_deref()));
    ctx.insert("dev_file_image", DEV_FILE_IMAGE);
    ctx.insert("execution_environment_image", EXECUTION_ENVIRONMENT_IMAGE);
    ctx.insert(
        "recommended_extensions",
        RECOMMENDED_EXTENSIONS
            .iter()
            .map(|e| Value::from(*e))
            .collect::<Vec<_>>(),
    );

    let plugin_name = params.plugin_name.as_deref().unwrap_or(DEFAULT_PLUGIN_NAME);
    if let ResourceKind::Plugin(plugin_type) = kind {
        if params.plugin_name.is_none() {
            return Err(CreatorError::MissingParameter("plugin_name".to_string()));
        }
        validate_content_name("plugin name", plugin_name)?;
        ctx.insert("plugin_type", plugin_type.dir_name());
    } else {
        ctx.insert("plugin_type", "");
    }
    ctx.insert("plugin_name", plugin_name);

    if kind == ResourceKind::Role {
        let role_name = params
            .role_name
            .as_deref()
            .ok_or_else(|| CreatorError::MissingParameter("role_name".to_string()))?;
        validate_content_name("role name", role_name)?;
        ctx.insert("role_name", role_name);
    }

    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection_params(collection: &str) -> UserParams {
        UserParams {
            collection: Some(collection.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_fqcn_is_namespace_dot_name() {
        for (ns, name) in [("testns", "testname"), ("abc", "a_b_c"), ("ns1", "col_2")] {
            let ctx = resolve(
                ResourceKind::Collection,
                &collection_params(&format!("{}.{}", ns, name)),
            )
            .unwrap();
            assert_eq!(ctx.get_str("fqcn"), Some(format!("{}.{}", ns, name).as_str()));
            assert_eq!(ctx.get_str("namespace"), Some(ns));
            assert_eq!(ctx.get_str("collection_name"), Some(name));
        }
    }

    #[test]
    fn test_derived_values() {
        let ctx = resolve(ResourceKind::Playbook, &collection_params("testns.testname")).unwrap();
        assert_eq!(ctx.get_str("namespace_upper"), Some("TESTNS"));
        assert_eq!(ctx.get_str("collection_name_upper"), Some("TESTNAME"));
        assert_eq!(ctx.get_str("fqcn_slug"), Some("testns-testname"));
        assert_eq!(ctx.get_str("resource_type"), Some("playbook"));
    }

    #[test]
    fn test_defaults_applied() {
        let ctx = resolve(ResourceKind::Collection, &collection_params("testns.testname")).unwrap();
        assert_eq!(ctx.get_str("author"), Some(DEFAULT_AUTHOR));
        assert_eq!(ctx.get_str("description"), Some(DEFAULT_DESCRIPTION));
        assert_eq!(ctx.get_str("license"), Some(DEFAULT_LICENSE));
        assert_eq!(ctx.get_str("plugin_name"), Some(DEFAULT_PLUGIN_NAME));
        assert_eq!(ctx.get_str("dev_file_name"), Some("testns.testname"));
    }

    #[test]
    fn test_user_values_override_defaults() {
        let params = UserParams {
            collection: Some("testns.testname".to_string()),
            author: Some("Jane Doe".to_string()),
            license: Some("MIT".to_string()),
            unique_suffix: Some("1a2b3c4d".to_string()),
            ..Default::default()
        };
        let ctx = resolve(ResourceKind::Collection, &params).unwrap();
        assert_eq!(ctx.get_str("author"), Some("Jane Doe"));
        assert_eq!(ctx.get_str("license"), Some("MIT"));
        assert_eq!(ctx.get_str("dev_file_name"), Some("testns.testname-1a2b3c4d"));
    }

    #[test]
    fn test_resolve_is_pure() {
        let params = collection_params("testns.testname");
        assert_eq!(
            resolve(ResourceKind::Collection, &params).unwrap(),
            resolve(ResourceKind::Collection, &params).unwrap()
        );
    }

    #[test]
    fn test_invalid_collection_names() {
        for bad in [
            "nodot",
            ".name",
            "namespace.",
            "Upper.case",
            "1abc.name",
            "_abc.name",
            "abc.na-me",
            "ab.name",
            "abc.xy",
        ] {
            let err = resolve(ResourceKind::Collection, &collection_params(bad)).unwrap_err();
            assert!(
                matches!(err, CreatorError::InvalidIdentifier { .. }),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_missing_collection() {
        let err = resolve(ResourceKind::Collection, &UserParams::default()).unwrap_err();
        assert!(matches!(err, CreatorError::MissingParameter(ref p) if p == "collection"));
    }

    #[test]
    fn test_execution_env_needs_no_collection() {
        let ctx = resolve(ResourceKind::ExecutionEnvProject, &UserParams::default()).unwrap();
        assert!(!ctx.contains("fqcn"));
        assert_eq!(
            ctx.get_str("execution_environment_image"),
            Some(EXECUTION_ENVIRONMENT_IMAGE)
        );
    }

    #[test]
    fn test_plugin_context() {
        let params = UserParams {
            plugin_name: Some("my_filter".to_string()),
            ..Default::default()
        };
        let ctx = resolve(ResourceKind::Plugin(PluginType::Module), &params).unwrap();
        assert_eq!(ctx.get_str("plugin_name"), Some("my_filter"));
        assert_eq!(ctx.get_str("plugin_type"), Some("modules"));

        let bad = UserParams {
            plugin_name: Some("My-Filter".to_string()),
            ..Default::default()
        };
        assert!(resolve(ResourceKind::Plugin(PluginType::Filter), &bad).is_err());

        let missing = resolve(ResourceKind::Plugin(PluginType::Filter), &UserParams::default());
        assert!(matches!(missing, Err(CreatorError::MissingParameter(_))));
    }

    #[test]
    fn test_role_context() {
        let params = UserParams {
            role_name: Some("web_server".to_string()),
            ..Default::default()
        };
        let ctx = resolve(ResourceKind::Role, &params).unwrap();
        assert_eq!(ctx.get_str("role_name"), Some("web_server"));
        assert!(resolve(ResourceKind::Role, &UserParams::default()).is_err());
    }

    #[test]
    fn test_image_aliases() {
        assert_eq!(resolve_image(None), DEV_CONTAINER_IMAGE);
        assert_eq!(resolve_image(Some("aap")), DEV_CONTAINER_DOWNSTREAM_IMAGE);
        assert_eq!(resolve_image(Some("quay.io/me/img:1")), "quay.io/me/img:1");
    }

    #[test]
    fn test_plugin_type_names() {
        assert_eq!(PluginType::Module.dir_name(), "modules");
        assert_eq!(PluginType::parse("modules"), Some(PluginType::Module));
        assert_eq!(PluginType::Filter.template_root(), "plugins/filter");
        assert_eq!(PluginType::parse("callback"), None);
    }
}
