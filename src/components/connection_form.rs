//! # Connection Form
//!
//! Editable configuration for a connection. When the connector declares schema
//! properties the form renders one input per property; otherwise it falls back
//! to a raw JSON editor. Either way the form emits a [`ConfigPayload`].
//!
//! Schema inputs convert back to JSON by the property's declared type. A field
//! the user left untouched is sent back with its initial value.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;

use minijinja::context;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::models::{ConnectionCreate, ConnectionUpdate, Connector, SchemaProperty};
use crate::templates::render_template;

pub type ConfigMap = Map<String, Value>;

/// Form field name carrying the raw JSON editor text.
pub const CONFIG_JSON_FIELD: &str = "config_json";
/// Prefix of form field names carrying schema inputs (`field.<key>`).
pub const SCHEMA_FIELD_PREFIX: &str = "field.";

/// Configuration produced by the form
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigPayload {
    /// Values typed against the connector's declared schema
    Schema(ConfigMap),
    /// Freeform JSON object from the raw editor
    Raw(ConfigMap),
}

impl ConfigPayload {
    pub fn as_map(&self) -> &ConfigMap {
        match self {
            ConfigPayload::Schema(map) | ConfigPayload::Raw(map) => map,
        }
    }

    pub fn into_map(self) -> ConfigMap {
        match self {
            ConfigPayload::Schema(map) | ConfigPayload::Raw(map) => map,
        }
    }
}

/// Malformed configuration input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigInputError {
    #[error("Invalid JSON in config")]
    InvalidJson,
    #[error("Config must be a JSON object")]
    NotAnObject,
    #[error("{label} must be a number")]
    NotANumber { label: String },
    #[error("{label} must be a whole number")]
    NotAnInteger { label: String },
    #[error("{label} must be true or false")]
    NotABoolean { label: String },
    #[error("{label} must be a JSON {expected}")]
    WrongJsonType {
        label: String,
        expected: &'static str,
    },
}

/// Raw JSON editor state.
///
/// The live config only changes when the text parses to a JSON object; the
/// text itself is always kept as typed.
#[derive(Debug, Clone)]
pub struct JsonEditor {
    text: String,
    config: ConfigMap,
    error: Option<ConfigInputError>,
}

impl JsonEditor {
    pub fn new(initial: &ConfigMap) -> Self {
        Self {
            text: serde_json::to_string_pretty(initial).unwrap_or_else(|_| "{}".to_string()),
            config: initial.clone(),
            error: None,
        }
    }

    /// Replace the editor text and try to parse it. Empty text counts as `{}`.
    pub fn input(&mut self, text: impl Into<String>) {
        self.text = text.into();
        let source = if self.text.trim().is_empty() {
            "{}"
        } else {
            self.text.as_str()
        };

        match serde_json::from_str::<Value>(source) {
            Ok(Value::Object(map)) => {
                self.config = map;
                self.error = None;
            }
            Ok(_) => self.error = Some(ConfigInputError::NotAnObject),
            Err(_) => self.error = Some(ConfigInputError::InvalidJson),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Last successfully parsed config.
    pub fn config(&self) -> &ConfigMap {
        &self.config
    }

    pub fn error(&self) -> Option<&ConfigInputError> {
        self.error.as_ref()
    }
}

/// Declared type of a schema property, as far as the form cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl FieldKind {
    /// Unknown or missing types are edited as strings.
    pub fn of(property: &SchemaProperty) -> Self {
        match property.kind() {
            "integer" => FieldKind::Integer,
            "number" => FieldKind::Number,
            "boolean" => FieldKind::Boolean,
            "object" => FieldKind::Object,
            "array" => FieldKind::Array,
            _ => FieldKind::String,
        }
    }

    /// Input control used by `connection_form.html`.
    fn input(self) -> &'static str {
        match self {
            FieldKind::Integer | FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Object | FieldKind::Array => "json",
            FieldKind::String => "text",
        }
    }
}

/// One schema-driven input
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub key: String,
    pub label: String,
    pub placeholder: String,
    pub kind: FieldKind,
    pub value: String,
    /// Value the form was seeded with
    initial: Option<Value>,
}

impl SchemaField {
    fn new(key: &str, property: &SchemaProperty, initial: Option<&Value>) -> Self {
        let initial = initial.filter(|value| !value.is_null()).cloned();
        Self {
            key: key.to_string(),
            label: property.title.clone().unwrap_or_else(|| key.to_string()),
            placeholder: property.description.clone().unwrap_or_default(),
            kind: FieldKind::of(property),
            value: initial.as_ref().map(display_value).unwrap_or_default(),
            initial,
        }
    }

    /// Typed value, or `None` when the input is empty.
    fn typed_value(&self) -> Result<Option<Value>, ConfigInputError> {
        if let Some(initial) = &self.initial
            && self.value == display_value(initial)
        {
            return Ok(Some(initial.clone()));
        }

        let raw = self.value.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let label = || self.label.clone();
        let value = match self.kind {
            FieldKind::String => Value::String(self.value.clone()),
            FieldKind::Integer => raw
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| ConfigInputError::NotAnInteger { label: label() })?,
            FieldKind::Number => raw
                .parse::<i64>()
                .map(Number::from)
                .ok()
                .or_else(|| raw.parse::<f64>().ok().and_then(Number::from_f64))
                .map(Value::Number)
                .ok_or_else(|| ConfigInputError::NotANumber { label: label() })?,
            FieldKind::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err(ConfigInputError::NotABoolean { label: label() }),
            },
            FieldKind::Object => match serde_json::from_str(raw) {
                Ok(value @ Value::Object(_)) => value,
                _ => {
                    return Err(ConfigInputError::WrongJsonType {
                        label: label(),
                        expected: "object",
                    });
                }
            },
            FieldKind::Array => match serde_json::from_str(raw) {
                Ok(value @ Value::Array(_)) => value,
                _ => {
                    return Err(ConfigInputError::WrongJsonType {
                        label: label(),
                        expected: "array",
                    });
                }
            },
        };
        Ok(Some(value))
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Template view of one schema input
#[derive(Serialize)]
struct FieldView<'a> {
    id: String,
    key: &'a str,
    label: &'a str,
    placeholder: &'a str,
    input: &'static str,
    step: &'static str,
    value: &'a str,
}

/// Template view of the raw JSON editor
#[derive(Serialize)]
struct EditorView<'a> {
    id: String,
    text: &'a str,
}

#[derive(Debug, Clone)]
enum Inputs {
    Schema {
        fields: Vec<SchemaField>,
        /// Initial keys the schema does not describe; carried through untouched
        passthrough: ConfigMap,
    },
    Raw(JsonEditor),
}

/// Whether the form creates a new connection or updates an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update { connection_id: i64 },
}

/// Payload handed to the caller's submit function
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub connector_key: String,
    pub config: ConfigPayload,
}

impl FormSubmission {
    pub fn into_create(self) -> ConnectionCreate {
        ConnectionCreate {
            connector_key: self.connector_key,
            config_data: Some(self.config.into_map()),
        }
    }

    pub fn into_update(self) -> ConnectionUpdate {
        ConnectionUpdate {
            config_data: Some(self.config.into_map()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionForm {
    connector: Connector,
    mode: FormMode,
    inputs: Inputs,
    submit_label: String,
    oauth_action: Option<String>,
    submitting: bool,
    error: Option<String>,
}

impl ConnectionForm {
    pub fn new(connector: &Connector, initial: &ConfigMap, mode: FormMode) -> Self {
        let inputs = match connector.schema_properties() {
            Some(properties) => {
                let fields = properties
                    .iter()
                    .map(|(key, property)| SchemaField::new(key, property, initial.get(key)))
                    .collect();
                let passthrough = initial
                    .iter()
                    .filter(|(key, _)| !properties.contains_key(*key))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                Inputs::Schema {
                    fields,
                    passthrough,
                }
            }
            None => Inputs::Raw(JsonEditor::new(initial)),
        };

        let submit_label = match mode {
            FormMode::Create => "Create",
            FormMode::Update { .. } => "Update",
        };

        Self {
            connector: connector.clone(),
            mode,
            inputs,
            submit_label: submit_label.to_string(),
            oauth_action: None,
            submitting: false,
            error: None,
        }
    }

    pub fn with_submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = label.into();
        self
    }

    /// Render a secondary "Connect OAuth" button posting to `action`.
    /// Ignored for connectors without OAuth support.
    pub fn with_oauth_action(mut self, action: impl Into<String>) -> Self {
        self.oauth_action = Some(action.into());
        self
    }

    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn schema_fields(&self) -> &[SchemaField] {
        match &self.inputs {
            Inputs::Schema { fields, .. } => fields,
            Inputs::Raw(_) => &[],
        }
    }

    pub fn json_editor(&self) -> Option<&JsonEditor> {
        match &self.inputs {
            Inputs::Raw(editor) => Some(editor),
            Inputs::Schema { .. } => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Inline error: a rejected submission, or the raw editor's parse error.
    pub fn error(&self) -> Option<String> {
        self.error.clone().or_else(|| {
            self.json_editor()
                .and_then(|editor| editor.error())
                .map(|err| err.to_string())
        })
    }

    /// Update one schema input. Unknown keys are ignored.
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) {
        if let Inputs::Schema { fields, .. } = &mut self.inputs
            && let Some(field) = fields.iter_mut().find(|f| f.key == key)
        {
            field.value = value.into();
        }
    }

    /// Feed new text into the raw JSON editor.
    pub fn input_json(&mut self, text: impl Into<String>) {
        if let Inputs::Raw(editor) = &mut self.inputs {
            editor.input(text);
        }
    }

    /// Apply the fields of a posted HTML form.
    pub fn apply_form(&mut self, form: &HashMap<String, String>) {
        match &mut self.inputs {
            Inputs::Schema { fields, .. } => {
                for field in fields.iter_mut() {
                    if let Some(value) = form.get(&format!("{}{}", SCHEMA_FIELD_PREFIX, field.key))
                    {
                        field.value = value.clone();
                    }
                }
            }
            Inputs::Raw(editor) => {
                if let Some(text) = form.get(CONFIG_JSON_FIELD) {
                    editor.input(text.clone());
                }
            }
        }
    }

    /// The live configuration.
    pub fn config(&self) -> Result<ConfigPayload, ConfigInputError> {
        match &self.inputs {
            Inputs::Schema {
                fields,
                passthrough,
            } => {
                let mut config = passthrough.clone();
                for field in fields {
                    if let Some(value) = field.typed_value()? {
                        config.insert(field.key.clone(), value);
                    }
                }
                Ok(ConfigPayload::Schema(config))
            }
            Inputs::Raw(editor) => match editor.error() {
                Some(err) => Err(err.clone()),
                None => Ok(ConfigPayload::Raw(editor.config().clone())),
            },
        }
    }

    /// Start a submission. Returns `None` while another submission is pending
    /// or when the current input does not form a valid config.
    pub fn begin_submit(&mut self) -> Option<FormSubmission> {
        if self.submitting {
            return None;
        }
        self.error = None;

        match self.config() {
            Ok(config) => {
                self.submitting = true;
                Some(FormSubmission {
                    connector_key: self.connector.key.clone(),
                    config,
                })
            }
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }

    /// Settle a submission started with [`begin_submit`](Self::begin_submit).
    pub fn finish_submit(&mut self, result: Result<(), String>) {
        self.submitting = false;
        if let Err(message) = result {
            self.error = Some(message);
        }
    }

    /// Run `submit` with the current payload, keeping the form disabled until it settles.
    /// Returns whether the submission succeeded.
    pub async fn submit<F, Fut, E>(&mut self, submit: F) -> bool
    where
        F: FnOnce(FormSubmission) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let Some(submission) = self.begin_submit() else {
            return false;
        };
        let result = submit(submission).await.map_err(|err| err.to_string());
        let succeeded = result.is_ok();
        self.finish_submit(result);
        succeeded
    }

    pub fn render(&self) -> Result<String, minijinja::Error> {
        let connector_key = &self.connector.key;
        let connection_id = match self.mode {
            FormMode::Update { connection_id } => Some(connection_id),
            FormMode::Create => None,
        };

        let (fields, editor) = match &self.inputs {
            Inputs::Schema { fields, .. } => {
                let fields: Vec<FieldView<'_>> = fields
                    .iter()
                    .map(|field| FieldView {
                        id: format!("{}-{}", connector_key, field.key),
                        key: &field.key,
                        label: &field.label,
                        placeholder: &field.placeholder,
                        input: field.kind.input(),
                        step: if field.kind == FieldKind::Integer {
                            "1"
                        } else {
                            "any"
                        },
                        value: &field.value,
                    })
                    .collect();
                (fields, None)
            }
            Inputs::Raw(editor) => (
                Vec::new(),
                Some(EditorView {
                    id: format!("{}-config-json", connector_key),
                    text: editor.text(),
                }),
            ),
        };

        let oauth_action = self
            .oauth_action
            .as_deref()
            .filter(|_| self.connector.supports_oauth);

        render_template(
            "connection_form.html",
            context! {
                connector_key => connector_key,
                connection_id => connection_id,
                fields => fields,
                editor => editor,
                error => self.error(),
                submitting => self.submitting,
                submit_label => &self.submit_label,
                oauth_action => oauth_action,
            },
        )
    }
}
