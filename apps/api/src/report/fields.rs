//! Preparing backend notice data for layout.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::layout::label::display_label;
use crate::layout::Field;

/// Keys that hold image locations rather than printable text (compared case-insensitively).
const IMAGE_PATH_KEYS: [&str; 2] = ["structureimagepath", "structure_image_url"];

/// A notice ready for layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    /// Identifying name: DCI, else INN, else what the user typed.
    pub name: String,
    pub title: String,
    pub file_name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Serialize)]
pub struct FieldPreview {
    pub label: String,
    pub display_label: String,
    pub value: String,
}

impl Notice {
    /// Builds a notice from the backend object for the drug the user asked for.
    pub fn from_backend(query: &str, data: &Map<String, Value>) -> Self {
        let name = identifying_name(query, data);
        Notice {
            title: notice_title(&name),
            file_name: notice_file_name(&name),
            fields: report_fields(data),
            name,
        }
    }

    pub fn preview(&self) -> Vec<FieldPreview> {
        self.fields
            .iter()
            .map(|f| FieldPreview {
                label: f.label.clone(),
                display_label: display_label(&f.label),
                value: f.value.clone(),
            })
            .collect()
    }
}

/// Keeps printable fields in backend order.
///
/// Drops image-path keys, `null`, booleans, objects and empty strings. Numbers keep
/// their JSON text; arrays of scalars are joined with `", "`.
pub fn report_fields(data: &Map<String, Value>) -> Vec<Field> {
    data.iter()
        .filter(|(key, _)| !is_image_path_key(key))
        .filter_map(|(key, value)| printable_value(value).map(|v| Field::new(key.as_str(), v)))
        .collect()
}

fn is_image_path_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    IMAGE_PATH_KEYS.contains(&lower.as_str())
}

fn printable_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null | Value::Bool(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// DCI, else INN, else the query as typed.
pub fn identifying_name(query: &str, data: &Map<String, Value>) -> String {
    ["DCI", "INN"]
        .iter()
        .filter_map(|key| data.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or(query)
        .to_string()
}

pub fn notice_title(name: &str) -> String {
    format!("Notice du médicament : {name}")
}

/// `notice-<lower-cased name>.pdf`.
pub fn notice_file_name(name: &str) -> String {
    format!("notice-{}.pdf", name.to_lowercase())
}
