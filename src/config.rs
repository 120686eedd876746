// In: src/config.rs

//! The single source of truth for the bridge configuration.
//!
//! `BridgeConfig` mirrors the JSON document that sits next to the host-loaded
//! library. It is parsed once at the application boundary; [`BridgeConfig::schema`]
//! turns its loosely-typed parameter lists into the immutable [`Schema`] that the
//! decoder and encoder use for every call.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::GspyError;
use crate::observability::{LogLevel, LogSettings};
use crate::schema::Schema;
use crate::types::{ParameterDescriptor, ParameterKind};

//==================================================================================
// I. Raw Configuration Document
//==================================================================================

/// One entry of the `inputs` or `outputs` list, as written in the document.
///
/// Every field is optional at this level so that a missing key surfaces as a
/// `Config` error naming the key, not as an opaque parse failure.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawParameter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub dimensions: Vec<usize>,
    #[serde(default)]
    pub dimensions_from: Option<serde_json::Value>,
    #[serde(default)]
    pub max_points: Option<usize>,
    #[serde(default)]
    pub max_elements: Option<usize>,
}

/// The unified bridge configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct BridgeConfig {
    /// Home directory of the scripting runtime.
    #[serde(default)]
    pub python_path: Option<String>,

    /// Path of the script file holding the calculation.
    #[serde(default)]
    pub script_path: Option<String>,

    /// Name of the function to call on every step.
    #[serde(default)]
    pub function_name: Option<String>,

    /// If set, names the log file `<script_name>_log.txt`.
    #[serde(default)]
    pub script_name: Option<String>,

    /// 0 = error, 1 = warning, 2 = info, 3 = debug.
    #[serde(default = "default_log_level")]
    pub log_level: i64,

    #[serde(default)]
    pub inputs: Option<Vec<RawParameter>>,

    #[serde(default)]
    pub outputs: Option<Vec<RawParameter>>,

    /// Where the document was loaded from, if it came from a file.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

/// Helper for `serde` to default the log level to INFO.
fn default_log_level() -> i64 {
    2
}

/// The script entry point named by the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    pub script_path: String,
    /// `script_path` with a trailing `.py` removed, as imported by the runtime.
    pub module_name: String,
    pub function_name: String,
}

//==================================================================================
// II. Loading & Conversion
//==================================================================================

impl BridgeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, GspyError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GspyError> {
        let path = path.as_ref();
        log::debug!("Reading config file: {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_json_str(&contents)?;
        config.source_path = Some(path.to_path_buf());
        log::debug!("Config file parsed successfully.");
        Ok(config)
    }

    /// Builds the schema. Fails with `Config` when a required key is absent.
    /// Structural rules are left to the validator.
    pub fn schema(&self) -> Result<Schema, GspyError> {
        let inputs = convert_list("inputs", self.inputs.as_deref())?;
        let outputs = convert_list("outputs", self.outputs.as_deref())?;
        Ok(Schema::new(inputs, outputs))
    }

    /// Returns the script entry point, failing if either key is absent.
    pub fn script_entry(&self) -> Result<ScriptEntry, GspyError> {
        let script_path = self
            .script_path
            .clone()
            .ok_or_else(|| missing_key("script_path"))?;
        let function_name = self
            .function_name
            .clone()
            .ok_or_else(|| missing_key("function_name"))?;
        let module_name = script_path
            .strip_suffix(".py")
            .unwrap_or(&script_path)
            .to_string();
        Ok(ScriptEntry {
            script_path,
            module_name,
            function_name,
        })
    }

    /// The log file to use: `<script_name>_log.txt` if a script name is set,
    /// otherwise `<config stem>_log.txt` next to the config file.
    pub fn log_filename(&self) -> Option<PathBuf> {
        if let Some(script_name) = &self.script_name {
            return Some(PathBuf::from(format!("{}_log.txt", script_name)));
        }
        let source = self.source_path.as_ref()?;
        let stem = source.file_stem()?.to_string_lossy();
        Some(source.with_file_name(format!("{}_log.txt", stem)))
    }

    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            level: LogLevel::from_int(self.log_level),
            file: self.log_filename(),
        }
    }
}

fn missing_key(key: &str) -> GspyError {
    GspyError::Config(format!("'{}' key is missing from the config file", key))
}

fn convert_list(
    key: &str,
    list: Option<&[RawParameter]>,
) -> Result<Vec<ParameterDescriptor>, GspyError> {
    let list = list.ok_or_else(|| missing_key(key))?;
    list.iter()
        .enumerate()
        .map(|(i, raw)| convert_parameter(key, i, raw))
        .collect()
}

fn convert_parameter(
    list: &str,
    index: usize,
    raw: &RawParameter,
) -> Result<ParameterDescriptor, GspyError> {
    let name = raw
        .name
        .clone()
        .ok_or_else(|| GspyError::Config(format!("{}[{}] is missing 'name'", list, index)))?;
    let kind: ParameterKind = raw
        .kind
        .as_deref()
        .ok_or_else(|| GspyError::Config(format!("{} '{}' is missing 'type'", list, name)))?
        .parse()
        .map_err(|e| GspyError::Config(format!("{} '{}': {}", list, name, e)))?;
    let dimension_sources = raw
        .dimensions_from
        .as_ref()
        .map(|value| parse_dimension_sources(&name, value))
        .transpose()?
        .flatten();

    Ok(ParameterDescriptor {
        name,
        kind,
        dimensions: raw.dimensions.clone(),
        dimension_sources,
        max_points: raw.max_points,
        max_elements: raw.max_elements,
    })
}

/// `dimensions_from` must be an array of input names; `null` means absent.
fn parse_dimension_sources(
    name: &str,
    value: &serde_json::Value,
) -> Result<Option<Vec<String>>, GspyError> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    GspyError::Config(format!(
                        "'dimensions_from' of '{}' must contain only input names",
                        name
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        _ => Err(GspyError::Config(format!(
            "'dimensions_from' of '{}' must be an array of input names",
            name
        ))),
    }
}
