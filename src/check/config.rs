use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::types::{Normalizer, TypeRules};

pub const CONFIG_ENV: &str = "MSGCHECK_CONFIG";

/// Settings for the call-site validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// Record type whose dispatch slot is checked, with or without `struct`.
    pub context_type: String,
    pub dispatch_field: String,
    /// Host pass after which indirect calls have their final shape.
    pub analysis_stage: String,
    /// Functions whose result is an element name mapped onto one of
    /// `candidate_messages`.
    pub name_helpers: Vec<String>,
    pub candidate_messages: Vec<String>,
    pub int_backed_enums: Vec<String>,
    /// Extra domain aliases, spelling to canonical spelling.
    pub type_aliases: BTreeMap<String, String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            context_type: "pcmk__output_t".into(),
            dispatch_field: "message".into(),
            analysis_stage: "*warn_function_return".into(),
            name_helpers: strings(&[
                "crm_element_name",
                "crm_map_element_name",
                "pcmk__map_element_name",
            ]),
            candidate_messages: strings(&["bundle", "clone", "group", "primitive"]),
            int_backed_enums: strings(crate::types::DEFAULT_INT_BACKED_ENUMS),
            type_aliases: BTreeMap::new(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

impl CheckConfig {
    pub fn apply_layer(&mut self, layer: CheckConfigLayer) {
        if let Some(value) = layer.context_type {
            self.context_type = value;
        }
        if let Some(value) = layer.dispatch_field {
            self.dispatch_field = value;
        }
        if let Some(value) = layer.analysis_stage {
            self.analysis_stage = value;
        }
        if let Some(value) = layer.name_helpers {
            self.name_helpers = value;
        }
        if let Some(value) = layer.candidate_messages {
            self.candidate_messages = value;
        }
        if let Some(value) = layer.int_backed_enums {
            self.int_backed_enums = value;
        }
        self.type_aliases.extend(layer.type_aliases);
    }

    /// Whether `record` names the output-context type.
    #[must_use]
    pub fn is_context_record(&self, record: &str) -> bool {
        strip_struct_tag(record) == strip_struct_tag(&self.context_type)
    }

    #[must_use]
    pub fn type_rules(&self) -> TypeRules {
        TypeRules::new(
            Normalizer::with_aliases(&self.type_aliases),
            &self.int_backed_enums,
        )
    }
}

fn strip_struct_tag(name: &str) -> &str {
    name.trim().strip_prefix("struct ").unwrap_or(name.trim())
}

/// Values set by one configuration file. Absent keys leave earlier layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckConfigLayer {
    pub context_type: Option<String>,
    pub dispatch_field: Option<String>,
    pub analysis_stage: Option<String>,
    pub name_helpers: Option<Vec<String>>,
    pub candidate_messages: Option<Vec<String>>,
    pub int_backed_enums: Option<Vec<String>>,
    pub type_aliases: BTreeMap<String, String>,
}

/// Parse one YAML configuration file. Settings may sit at the top level or
/// under a `msgcheck` section.
///
/// # Errors
///
/// Fails when the file cannot be read or a known key has the wrong shape.
pub fn parse_layer(path: &Path) -> Result<CheckConfigLayer> {
    let contents = fs::read_to_string(path).map_err(|err| {
        Error::config(format!(
            "failed to read check config `{}`: {err}",
            path.display()
        ))
    })?;
    let yaml: Value = serde_yaml::from_str(&contents).map_err(|err| {
        Error::config(format!(
            "failed to parse check config `{}`: {err}",
            path.display()
        ))
    })?;
    let section = match yaml {
        Value::Mapping(mut mapping) => match mapping.remove("msgcheck") {
            Some(Value::Mapping(section)) => section,
            Some(_) | None => mapping,
        },
        Value::Null => return Ok(CheckConfigLayer::default()),
        _ => {
            return Err(Error::config(format!(
                "check config `{}` must be a mapping",
                path.display()
            )));
        }
    };

    let mut layer = CheckConfigLayer::default();
    for (key, value) in section {
        let Some(key) = key.as_str().map(str::to_string) else {
            tracing::warn!(
                target: "check-config",
                "ignored non-string key in {}",
                path.display()
            );
            continue;
        };
        match key.replace('-', "_").as_str() {
            "context_type" => layer.context_type = Some(field(path, &key, value)?),
            "dispatch_field" => layer.dispatch_field = Some(field(path, &key, value)?),
            "analysis_stage" => layer.analysis_stage = Some(field(path, &key, value)?),
            "name_helpers" => layer.name_helpers = Some(field(path, &key, value)?),
            "candidate_messages" => layer.candidate_messages = Some(field(path, &key, value)?),
            "int_backed_enums" => layer.int_backed_enums = Some(field(path, &key, value)?),
            "type_aliases" => layer.type_aliases = field(path, &key, value)?,
            _ => tracing::warn!(
                target: "check-config",
                "ignored unknown entry `{key}` in {}",
                path.display()
            ),
        }
    }
    Ok(layer)
}

fn field<T: DeserializeOwned>(path: &Path, key: &str, value: Value) -> Result<T> {
    serde_yaml::from_value(value).map_err(|err| {
        Error::config(format!(
            "invalid `{key}` in check config `{}`: {err}",
            path.display()
        ))
    })
}

/// Defaults, then the explicit `--config` file, then the file named by
/// [`CONFIG_ENV`].
///
/// # Errors
///
/// Fails when a named configuration file cannot be parsed.
pub fn load(explicit: Option<&Path>) -> Result<CheckConfig> {
    let from_env = std::env::var_os(CONFIG_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    load_layers(explicit, from_env.as_deref())
}

fn load_layers(explicit: Option<&Path>, from_env: Option<&Path>) -> Result<CheckConfig> {
    let mut config = CheckConfig::default();
    if let Some(path) = explicit {
        config.apply_layer(parse_layer(path)?);
    }
    if let Some(path) = from_env {
        if path.is_file() {
            config.apply_layer(parse_layer(path)?);
        } else {
            tracing::warn!(
                target: "check-config",
                "{CONFIG_ENV} points at missing file {}",
                path.display()
            );
        }
    }
    Ok(config)
}
