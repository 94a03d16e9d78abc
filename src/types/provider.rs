//! Provider definitions: external service descriptors with credential schemas.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Input type of a provider configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Free-form text.
    #[default]
    Text,
    /// Secret value, masked in the UI.
    Password,
    /// An endpoint URL.
    Url,
    /// A numeric value.
    Number,
    /// An on/off toggle.
    Boolean,
    /// One of a fixed set of [`ConfigField::options`].
    Select,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text => write!(f, "text"),
            FieldType::Password => write!(f, "password"),
            FieldType::Url => write!(f, "url"),
            FieldType::Number => write!(f, "number"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Select => write!(f, "select"),
        }
    }
}

/// Descriptor for one configuration field a provider requires (API key, base URL, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigField {
    key: String,
    label: String,
    #[serde(default)]
    field_type: FieldType,
    #[serde(default)]
    required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    options: Vec<String>,
}

impl ConfigField {
    /// Creates an optional text field.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type: FieldType::Text,
            required: false,
            placeholder: None,
            default_value: None,
            options: Vec::new(),
        }
    }

    /// Sets the field type.
    #[must_use]
    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the placeholder text.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Sets the allowed values of a `select` field.
    #[must_use]
    pub fn with_options(mut self, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the field key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the field type.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns `true` if the field must be filled in.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the placeholder text.
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Returns the default value.
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Returns the allowed values of a `select` field.
    pub fn options(&self) -> &[String] {
        &self.options
    }
}

/// An external service descriptor: identity, available models, and the
/// configuration fields needed to talk to it.
///
/// Definitions are immutable once built. Containers hand out clones, so
/// holding a definition never aliases the container's storage.
///
/// ## Example
///
/// ```rust
/// use provider_config::{ConfigField, FieldType, ProviderDefinition};
///
/// let openai = ProviderDefinition::new("openai", "OpenAI")
///     .with_model("gpt-4o", "GPT-4o")
///     .with_field(ConfigField::new("apiKey", "API Key").with_type(FieldType::Password).required());
///
/// assert_eq!(openai.id(), "openai");
/// assert_eq!(openai.models().get("gpt-4o").map(String::as_str), Some("GPT-4o"));
/// assert!(openai.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDefinition {
    id: String,
    name: String,
    #[serde(default)]
    models: BTreeMap<String, String>,
    #[serde(default)]
    config_fields: Vec<ConfigField>,
}

impl ProviderDefinition {
    /// Creates a definition with no models and no fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            models: BTreeMap::new(),
            config_fields: Vec::new(),
        }
    }

    /// Adds a model.
    #[must_use]
    pub fn with_model(mut self, model_id: impl Into<String>, display: impl Into<String>) -> Self {
        self.models.insert(model_id.into(), display.into());
        self
    }

    /// Appends a configuration field.
    #[must_use]
    pub fn with_field(mut self, field: ConfigField) -> Self {
        self.config_fields.push(field);
        self
    }

    /// Returns the unique identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the model-id → display-name mapping.
    pub fn models(&self) -> &BTreeMap<String, String> {
        &self.models
    }

    /// Returns the ordered configuration field schema.
    pub fn config_fields(&self) -> &[ConfigField] {
        &self.config_fields
    }

    /// Checks the definition for structural problems.
    ///
    /// Fails on an empty id or name, empty or duplicate field keys, and
    /// `select` fields without options.
    pub fn validate(&self) -> Result<(), Error> {
        if self.id.trim().is_empty() {
            return Err(Error::validation("provider id cannot be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(Error::validation(format!("provider '{}' has an empty name", self.id)));
        }

        let mut keys = HashSet::new();
        for field in &self.config_fields {
            if field.key.trim().is_empty() {
                return Err(Error::validation(format!(
                    "provider '{}' has a field with an empty key",
                    self.id
                )));
            }
            if !keys.insert(field.key.as_str()) {
                return Err(Error::validation(format!(
                    "provider '{}' declares field '{}' more than once",
                    self.id, field.key
                )));
            }
            if field.field_type == FieldType::Select && field.options.is_empty() {
                return Err(Error::validation(format!(
                    "provider '{}' field '{}' is a select without options",
                    self.id, field.key
                )));
            }
        }

        Ok(())
    }
}

/// Validates a full provider list: each definition, plus id uniqueness.
pub fn validate_providers(providers: &[ProviderDefinition]) -> Result<(), Error> {
    let mut ids = HashSet::new();
    for provider in providers {
        provider.validate()?;
        if !ids.insert(provider.id()) {
            return Err(Error::validation(format!("duplicate provider id '{}'", provider.id())));
        }
    }
    Ok(())
}
