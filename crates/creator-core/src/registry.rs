//! Static command registry
//!
//! Every command path, its parameters and the resource kind it scaffolds,
//! declared once. The schema served by the API and the parameter checks it
//! runs are both derived from this table.

use crate::commands::Request;
use crate::context::{PluginType, ResourceKind, UserParams};
use crate::error::{CreatorError, Result};
use crate::templates::CollisionFlags;
use serde_json::{json, Map, Value};
use std::path::PathBuf;

/// Parameters that select the command rather than configure it
pub const ROUTING_KEYS: &[&str] = &["subcommand", "project", "type", "resource_type", "plugin_type"];

pub const PROGRAM_NAME: &str = "ansible-creator";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Boolean,
}

impl ParamType {
    fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Str(&'static str),
    Bool(bool),
}

impl DefaultValue {
    fn to_json(self) -> Value {
        match self {
            DefaultValue::Str(s) => Value::from(s),
            DefaultValue::Bool(b) => Value::from(b),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamType,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<DefaultValue>,
    pub aliases: &'static [&'static str],
}

impl ParamSpec {
    const fn string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamType::String,
            description,
            required: false,
            default: None,
            aliases: &[],
        }
    }

    const fn flag(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamType::Boolean,
            description,
            required: false,
            default: Some(DefaultValue::Bool(false)),
            aliases: &[],
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn default_str(mut self, value: &'static str) -> Self {
        self.default = Some(DefaultValue::Str(value));
        self
    }

    const fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    fn accepts(&self, key: &str) -> bool {
        self.name == key || self.aliases.contains(&key)
    }

    fn schema(&self) -> Value {
        let mut prop = Map::new();
        prop.insert("type".into(), Value::from(self.kind.as_str()));
        prop.insert("description".into(), Value::from(self.description));
        if let Some(default) = self.default {
            prop.insert("default".into(), default.to_json());
        }
        if !self.aliases.is_empty() {
            prop.insert("aliases".into(), json!(self.aliases));
        }
        Value::Object(prop)
    }
}

/// A node in the command tree; leaves carry the kind they scaffold
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    pub subcommands: &'static [CommandSpec],
    pub kind: Option<ResourceKind>,
}

impl CommandSpec {
    const fn group(
        name: &'static str,
        description: &'static str,
        subcommands: &'static [CommandSpec],
    ) -> Self {
        Self {
            name,
            description,
            params: &[],
            subcommands,
            kind: None,
        }
    }

    const fn leaf(
        name: &'static str,
        description: &'static str,
        kind: ResourceKind,
        params: &'static [ParamSpec],
    ) -> Self {
        Self {
            name,
            description,
            params,
            subcommands: &[],
            kind: Some(kind),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.kind.is_some()
    }

    pub fn param(&self, key: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.accepts(key))
    }

    /// Name of the parameter holding the destination directory
    pub fn path_param(&self) -> &'static str {
        match self.kind {
            Some(ResourceKind::Collection | ResourceKind::Playbook | ResourceKind::ExecutionEnvProject) => {
                "init_path"
            }
            _ => "path",
        }
    }

    fn subcommand_names(&self) -> Vec<String> {
        self.subcommands.iter().map(|c| c.name.to_string()).collect()
    }

    /// Nested JSON description of this node and everything below it
    pub fn schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();
        let subcommands: Map<String, Value> = self
            .subcommands
            .iter()
            .map(|c| (c.name.to_string(), c.schema()))
            .collect();

        json!({
            "name": self.name,
            "description": self.description,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required,
            },
            "subcommands": subcommands,
        })
    }
}

const OVERWRITE: ParamSpec = ParamSpec::flag(
    "overwrite",
    "Overwrite existing files or directories.",
);
const NO_OVERWRITE: ParamSpec = ParamSpec::flag(
    "no_overwrite",
    "Flag that restricts overwriting operation.",
);
const FORCE: ParamSpec = ParamSpec::flag(
    "force",
    "Force re-initialize the specified directory. This flag is deprecated.",
);
const COLLECTION: ParamSpec = ParamSpec::string(
    "collection",
    "The collection name in the format '<namespace>.<collection>'.",
)
.required();
const INIT_PATH: ParamSpec = ParamSpec::string(
    "init_path",
    "The path in which the project will be created.",
)
.default_str("./")
.aliases(&["path"]);
const ADD_PATH: ParamSpec = ParamSpec::string(
    "path",
    "The path to the target directory. Defaults to the current working directory.",
)
.default_str("./");
const PLUGIN_NAME: ParamSpec = ParamSpec::string("plugin_name", "The name of the plugin.").required();
const ROLE_NAME: ParamSpec = ParamSpec::string("role_name", "The name of the role.").required();
const IMAGE: ParamSpec = ParamSpec::string(
    "image",
    "The image to use: 'auto', 'upstream', 'aap' or a full image reference.",
)
.default_str("auto");

const COLLECTION_PARAMS: &[ParamSpec] = &[COLLECTION, INIT_PATH, FORCE, OVERWRITE, NO_OVERWRITE];
const PLUGIN_PARAMS: &[ParamSpec] = &[PLUGIN_NAME, ADD_PATH, OVERWRITE, NO_OVERWRITE];
const EXECUTION_ENV_PARAMS: &[ParamSpec] = &[INIT_PATH, FORCE, OVERWRITE, NO_OVERWRITE];
const RESOURCE_PARAMS: &[ParamSpec] = &[ADD_PATH, OVERWRITE, NO_OVERWRITE];
const DEVCONTAINER_PARAMS: &[ParamSpec] = &[ADD_PATH, IMAGE, OVERWRITE, NO_OVERWRITE];
const ROLE_PARAMS: &[ParamSpec] = &[ROLE_NAME, ADD_PATH, OVERWRITE, NO_OVERWRITE];

const INIT: &[CommandSpec] = &[
    CommandSpec::leaf(
        "collection",
        "Create a new Ansible collection project.",
        ResourceKind::Collection,
        COLLECTION_PARAMS,
    ),
    CommandSpec::leaf(
        "playbook",
        "Create a new Ansible playbook project.",
        ResourceKind::Playbook,
        COLLECTION_PARAMS,
    ),
    CommandSpec::leaf(
        "execution_env",
        "Create a new execution environment project.",
        ResourceKind::ExecutionEnvProject,
        EXECUTION_ENV_PARAMS,
    ),
];

const RESOURCES: &[CommandSpec] = &[
    CommandSpec::leaf(
        "devcontainer",
        "Add devcontainer files to an existing Ansible project.",
        ResourceKind::Devcontainer,
        DEVCONTAINER_PARAMS,
    ),
    CommandSpec::leaf(
        "devfile",
        "Add a devfile to an existing Ansible project.",
        ResourceKind::Devfile,
        RESOURCE_PARAMS,
    ),
    CommandSpec::leaf(
        "execution-environment",
        "Add a sample execution-environment.yml file to an existing path.",
        ResourceKind::ExecutionEnvironment,
        RESOURCE_PARAMS,
    ),
    CommandSpec::leaf(
        "role",
        "Add a role to an existing Ansible collection.",
        ResourceKind::Role,
        ROLE_PARAMS,
    ),
];

const PLUGINS: &[CommandSpec] = &[
    CommandSpec::leaf(
        "action",
        "Add an action plugin to an existing collection.",
        ResourceKind::Plugin(PluginType::Action),
        PLUGIN_PARAMS,
    ),
    CommandSpec::leaf(
        "filter",
        "Add a filter plugin to an existing collection.",
        ResourceKind::Plugin(PluginType::Filter),
        PLUGIN_PARAMS,
    ),
    CommandSpec::leaf(
        "lookup",
        "Add a lookup plugin to an existing collection.",
        ResourceKind::Plugin(PluginType::Lookup),
        PLUGIN_PARAMS,
    ),
    CommandSpec::leaf(
        "module",
        "Add a generic module to an existing collection.",
        ResourceKind::Plugin(PluginType::Module),
        PLUGIN_PARAMS,
    ),
    CommandSpec::leaf(
        "test",
        "Add a test plugin to an existing collection.",
        ResourceKind::Plugin(PluginType::Test),
        PLUGIN_PARAMS,
    ),
];

const ADD: &[CommandSpec] = &[
    CommandSpec::group(
        "resource",
        "Add resources to an existing Ansible project.",
        RESOURCES,
    ),
    CommandSpec::group(
        "plugin",
        "Add a plugin to an existing Ansible collection.",
        PLUGINS,
    ),
];

const COMMANDS: &[CommandSpec] = &[
    CommandSpec::group("init", "Initialize a new Ansible project.", INIT),
    CommandSpec::group("add", "Add resources to an existing Ansible project.", ADD),
];

/// Root of the command tree
pub static ROOT: CommandSpec = CommandSpec::group(
    PROGRAM_NAME,
    "The fastest way to generate all your ansible content.",
    COMMANDS,
);

/// Find the node at `path`; an empty path is the root
pub fn find(path: &[&str]) -> Result<&'static CommandSpec> {
    let mut node: &'static CommandSpec = &ROOT;
    for segment in path {
        node = node
            .subcommands
            .iter()
            .find(|c| c.name == *segment)
            .ok_or_else(|| CreatorError::UnknownCommand {
                segment: segment.to_string(),
                available: node.subcommand_names(),
            })?;
    }
    Ok(node)
}

/// Find the runnable command at `path`
pub fn find_leaf(path: &[&str]) -> Result<&'static CommandSpec> {
    if path.is_empty() {
        return Err(CreatorError::EmptyCommandPath);
    }
    let node = find(path)?;
    if node.is_leaf() {
        Ok(node)
    } else {
        Err(CreatorError::IncompleteCommand {
            path: path.join(" "),
            available: node.subcommand_names(),
        })
    }
}

pub fn schema() -> Value {
    ROOT.schema()
}

pub fn schema_for(path: &[&str]) -> Result<Value> {
    find(path).map(CommandSpec::schema)
}

/// Check raw parameters against a leaf's declaration
///
/// Checks run in a fixed order: routing keys, unknown names, then missing
/// required parameters.
pub fn validate_params(command: &CommandSpec, params: &Map<String, Value>) -> Result<()> {
    let mut routing: Vec<String> = params
        .keys()
        .filter(|k| ROUTING_KEYS.contains(&k.as_str()))
        .cloned()
        .collect();
    if !routing.is_empty() {
        routing.sort();
        return Err(CreatorError::RoutingKeyOverride(routing));
    }

    let mut unknown: Vec<String> = params
        .keys()
        .filter(|k| command.param(k).is_none())
        .cloned()
        .collect();
    if !unknown.is_empty() {
        unknown.sort();
        return Err(CreatorError::UnknownParameters(unknown));
    }

    for spec in command.params.iter().filter(|p| p.required) {
        let supplied = params
            .iter()
            .any(|(k, v)| spec.accepts(k) && !v.is_null());
        if !supplied {
            return Err(CreatorError::MissingParameter(spec.name.to_string()));
        }
    }
    Ok(())
}

/// Build a request for a leaf from validated parameters
///
/// `destination` is used when the parameters name no path of their own.
pub fn build_request(
    command: &CommandSpec,
    params: &Map<String, Value>,
    destination: PathBuf,
) -> Result<Request> {
    let kind = command.kind.ok_or_else(|| CreatorError::IncompleteCommand {
        path: command.name.to_string(),
        available: command.subcommand_names(),
    })?;

    let params_out = UserParams {
        collection: string_param(command, params, "collection")?,
        plugin_name: string_param(command, params, "plugin_name")?,
        role_name: string_param(command, params, "role_name")?,
        image: string_param(command, params, "image")?,
        ..Default::default()
    };
    let flags = CollisionFlags {
        force: flag_param(command, params, "force")?,
        overwrite: flag_param(command, params, "overwrite")?,
        no_overwrite: flag_param(command, params, "no_overwrite")?,
    };
    let path = string_param(command, params, command.path_param())?
        .map(PathBuf::from)
        .unwrap_or(destination);

    Ok(Request::new(kind, params_out, path).with_flags(flags))
}

/// Value supplied for `name` under its own name or an alias; nulls count as absent
fn lookup<'a>(command: &CommandSpec, params: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    params
        .iter()
        .find(|(k, v)| !v.is_null() && command.param(k).is_some_and(|p| p.name == name))
        .map(|(_, v)| v)
}

fn string_param(command: &CommandSpec, params: &Map<String, Value>, name: &str) -> Result<Option<String>> {
    match lookup(command, params, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(CreatorError::InvalidParameter {
            name: name.to_string(),
            expected: "string",
        }),
    }
}

fn flag_param(command: &CommandSpec, params: &Map<String, Value>, name: &str) -> Result<bool> {
    match lookup(command, params, name) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(CreatorError::InvalidParameter {
            name: name.to_string(),
            expected: "boolean",
        }),
    }
}
