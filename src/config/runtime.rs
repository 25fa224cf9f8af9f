//! Validated runtime settings backed by a JSON file.
//!
//! The raw JSON object is the source of truth, so a loaded document serializes back to
//! exactly what was read. A typed `Settings` view is rebuilt after every accepted change.
//! Every mutation validates the fully merged document first and only commits on success.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{error::config::ConfigError, util::prefix::validate_prefix};

/// Recognized settings keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    Token,
    DefPrefix,
    ShardCount,
    OwnerId,
    OwnerIds,
    ActivityText,
    Description,
    CaseInsensitive,
    StripAfterPrefix,
}

impl ConfigField {
    pub const ALL: [ConfigField; 9] = [
        ConfigField::Token,
        ConfigField::DefPrefix,
        ConfigField::ShardCount,
        ConfigField::OwnerId,
        ConfigField::OwnerIds,
        ConfigField::ActivityText,
        ConfigField::Description,
        ConfigField::CaseInsensitive,
        ConfigField::StripAfterPrefix,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ConfigField::Token => "token",
            ConfigField::DefPrefix => "def_prefix",
            ConfigField::ShardCount => "shard_count",
            ConfigField::OwnerId => "owner_id",
            ConfigField::OwnerIds => "owner_ids",
            ConfigField::ActivityText => "activity_text",
            ConfigField::Description => "description",
            ConfigField::CaseInsensitive => "case_insensitive",
            ConfigField::StripAfterPrefix => "strip_after_prefix",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(
            self,
            ConfigField::Token | ConfigField::DefPrefix | ConfigField::ShardCount
        )
    }
}

impl FromStr for ConfigField {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigField::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| ConfigError::AttributeUnknown(s.to_string()))
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Typed view over the settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub token: String,
    pub def_prefix: String,
    pub shard_count: u32,
    #[serde(default)]
    pub owner_id: Option<u64>,
    #[serde(default)]
    pub owner_ids: Option<Vec<u64>>,
    #[serde(default)]
    pub activity_text: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub case_insensitive: Option<bool>,
    #[serde(default)]
    pub strip_after_prefix: Option<bool>,
}

impl Settings {
    /// Owners configured explicitly, if any.
    pub fn configured_owners(&self) -> Option<Vec<u64>> {
        match (self.owner_id, &self.owner_ids) {
            (Some(id), _) => Some(vec![id]),
            (None, Some(ids)) => Some(ids.clone()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    path: Option<PathBuf>,
    raw: Map<String, Value>,
    settings: Settings,
    dirty: bool,
}

impl RuntimeConfig {
    /// Reads and validates the settings file at `path`.
    ///
    /// # Returns
    /// - `Ok(RuntimeConfig)` - Valid settings bound to `path` for later persistence
    /// - `Err(ConfigError::Io | Json)` - The file is unreadable or not JSON
    /// - `Err(ConfigError::InvalidConfiguration)` - Missing, unknown or conflicting fields,
    ///   or an invalid default prefix
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&contents)?;

        let mut config = Self::from_value(value)?;
        config.path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validates an in-memory settings document that has no backing file.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let Value::Object(raw) = value else {
            return Err(ConfigError::InvalidConfiguration(
                "The config document must be a JSON object.".to_string(),
            ));
        };

        let settings = validate(&raw)?;

        Ok(Self {
            path: None,
            raw,
            settings,
            dirty: false,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the stored value of `field`, `None` when an optional field is unset.
    pub fn get(&self, field: &str) -> Result<Option<&Value>, ConfigError> {
        let field: ConfigField = field.parse()?;

        Ok(self.raw.get(field.key()).filter(|value| !value.is_null()))
    }

    /// Updates a single field.
    ///
    /// Setting a field to its current value changes nothing and leaves the record clean.
    ///
    /// # Returns
    /// - `Ok(true)` - The value changed and the record is now dirty
    /// - `Ok(false)` - The value was already current
    /// - `Err(ConfigError::AttributeUnknown)` - `field` is not a recognized setting
    /// - `Err(ConfigError::InvalidConfiguration)` - The updated document would be invalid;
    ///   nothing was changed
    pub fn set(&mut self, field: &str, value: Value) -> Result<bool, ConfigError> {
        let field: ConfigField = field.parse()?;

        let mut partial = Map::new();
        partial.insert(field.key().to_string(), value);

        self.commit(partial)
    }

    /// Applies several fields at once, all or nothing.
    pub fn merge(&mut self, partial: Map<String, Value>) -> Result<bool, ConfigError> {
        for key in partial.keys() {
            key.parse::<ConfigField>()?;
        }

        self.commit(partial)
    }

    /// Settings can never be removed once present.
    pub fn delete(&mut self, field: &str) -> Result<(), ConfigError> {
        let field: ConfigField = field.parse()?;

        Err(ConfigError::DeletionUnsupported(field.key().to_string()))
    }

    /// The full settings document as it would be written to disk.
    pub fn to_value(&self) -> Value {
        Value::Object(self.raw.clone())
    }

    /// Writes the document to its backing file when it has unsaved changes.
    ///
    /// # Returns
    /// - `Ok(true)` - The file was rewritten and the record is clean again
    /// - `Ok(false)` - Nothing to write
    /// - `Err(ConfigError::Io)` - Writing failed, or the record has no backing file
    pub fn persist_if_dirty(&mut self) -> Result<bool, ConfigError> {
        if !self.dirty {
            return Ok(false);
        }

        let Some(path) = self.path.as_ref() else {
            return Err(ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "config has no backing file",
            )));
        };

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.to_value().serialize(&mut serializer)?;

        std::fs::write(path, buffer)?;
        self.dirty = false;

        tracing::info!("Saved config to {}", path.display());

        Ok(true)
    }

    fn commit(&mut self, partial: Map<String, Value>) -> Result<bool, ConfigError> {
        let mut candidate = self.raw.clone();
        for (key, value) in partial {
            candidate.insert(key, value);
        }

        if candidate == self.raw {
            return Ok(false);
        }

        let settings = validate(&candidate)?;

        self.raw = candidate;
        self.settings = settings;
        self.dirty = true;

        Ok(true)
    }
}

/// Checks a settings document and builds its typed view.
fn validate(raw: &Map<String, Value>) -> Result<Settings, ConfigError> {
    let mut problems = Vec::new();

    let unknown: Vec<&str> = raw
        .keys()
        .filter(|key| key.parse::<ConfigField>().is_err())
        .map(String::as_str)
        .collect();
    for key in &unknown {
        problems.push(format!("Unknown config setting '{}'.", key));
    }

    let missing: Vec<&str> = ConfigField::ALL
        .into_iter()
        .filter(|field| field.is_required())
        .filter(|field| raw.get(field.key()).is_none_or(Value::is_null))
        .map(ConfigField::key)
        .collect();
    if !missing.is_empty() {
        problems.push(format!(
            "Missing required config settings: {}.",
            missing.join(", ")
        ));
    }

    let is_set = |field: ConfigField| raw.get(field.key()).is_some_and(|v| !v.is_null());
    if is_set(ConfigField::OwnerId) && is_set(ConfigField::OwnerIds) {
        problems.push(
            "Two mutually exclusive config settings are used at once: 'owner_id' and 'owner_ids'."
                .to_string(),
        );
    }

    if !problems.is_empty() {
        return Err(ConfigError::InvalidConfiguration(problems.join(" ")));
    }

    let mut settings: Settings = serde_json::from_value(Value::Object(raw.clone()))
        .map_err(|e| ConfigError::InvalidConfiguration(format!("Malformed config settings: {}", e)))?;

    settings.def_prefix = validate_prefix(&settings.def_prefix).map_err(|e| {
        ConfigError::InvalidConfiguration(format!("Setting 'def_prefix' is invalid: {}", e))
    })?;

    if settings.shard_count == 0 {
        return Err(ConfigError::InvalidConfiguration(
            "Setting 'shard_count' must be at least 1.".to_string(),
        ));
    }

    Ok(settings)
}

/// Safe nested lookup into a JSON value.
///
/// Walks `path` one object key at a time and yields `None` at the first depth where the key
/// is missing or the current value is not an object.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
}
