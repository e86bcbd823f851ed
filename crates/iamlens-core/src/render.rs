//! Output rendering
//!
//! Every listing has two forms: plain text for people, one item per line,
//! and JSON for scripts. Rendered strings never carry a trailing newline and
//! an empty listing renders as `""` (plain) or `[]` (JSON).

use serde::Serialize;
use serde_json::Value;

use crate::definition::{ConditionKey, ResourceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Plain
        }
    }
}

/// Render action names. JSON output qualifies each as `<service>:<action>`.
pub fn render_actions<S: AsRef<str>>(names: &[S], service: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Plain => lines(names.iter().map(|n| n.as_ref())),
        OutputFormat::Json => {
            let qualified: Vec<String> = names
                .iter()
                .map(|n| format!("{}:{}", service, n.as_ref()))
                .collect();
            to_json(&qualified)
        }
    }
}

pub fn render_condition_keys(keys: &[ConditionKey], format: OutputFormat) -> String {
    let names = keys.iter().map(|k| k.name.as_str());
    match format {
        OutputFormat::Plain => lines(names),
        OutputFormat::Json => to_json(&names.collect::<Vec<_>>()),
    }
}

/// Full detail for one resource type
pub fn render_resource(resource: &ResourceType, format: OutputFormat) -> String {
    match format {
        OutputFormat::Plain => resource_block(resource),
        OutputFormat::Json => to_json(resource),
    }
}

/// Full detail for several resource types; JSON form is an array
pub fn render_resource_details(resources: &[ResourceType], format: OutputFormat) -> String {
    match format {
        OutputFormat::Plain => resources
            .iter()
            .map(resource_block)
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Json => to_json(&resources),
    }
}

fn lines<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join("\n")
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn resource_block(resource: &ResourceType) -> String {
    let mut out = format!("Name: {}", resource.name);
    for (key, value) in &resource.attributes {
        match value {
            Value::Array(items) => {
                out.push_str(&format!("\n{}:", key));
                for item in items {
                    out.push_str(&format!("\n  {}", scalar(item)));
                }
            }
            other => out.push_str(&format!("\n{}: {}", key, scalar(other))),
        }
    }
    out
}

/// Strings print bare; everything else as compact JSON
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
