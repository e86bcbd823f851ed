//! Service definition documents
//!
//! One document per service, listing its actions, the resource types it
//! defines and its condition keys. Only the fields the selector needs are
//! typed; everything else on resources and condition keys is kept as an
//! opaque JSON object so it can be shown back to the operator untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LensError, Result};

/// A parsed service definition. Immutable once loaded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceDefinition {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Version", default)]
    pub version: Option<String>,
    #[serde(rename = "Actions", default)]
    pub actions: Vec<Action>,
    #[serde(rename = "Resources", default)]
    pub resources: Vec<ResourceType>,
    #[serde(rename = "ConditionKeys", default)]
    pub condition_keys: Vec<ConditionKey>,
}

impl ServiceDefinition {
    /// Parse a definition document fetched from `url`
    pub fn from_slice(bytes: &[u8], url: &str) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|source| LensError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Look up a resource type by exact name
    pub fn resource(&self, name: &str) -> Option<&ResourceType> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Names of every resource type the document defines, in document order
    pub fn resource_names(&self) -> Vec<&str> {
        self.resources.iter().map(|r| r.name.as_str()).collect()
    }
}

/// A single authorizable action
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ActionDocument")]
pub struct Action {
    pub name: String,
    /// Resource types this action can be scoped to
    pub resource_refs: Vec<String>,
    /// Boolean annotations, e.g. `IsWrite`, `IsList`
    pub capability_flags: BTreeMap<String, bool>,
}

impl Action {
    pub fn targets(&self, resource: &str) -> bool {
        self.resource_refs.iter().any(|r| r == resource)
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.capability_flags.get(flag).copied().unwrap_or(false)
    }

    /// True when no capability flag is set, including when there are none at all
    pub fn is_read_only(&self) -> bool {
        !self.capability_flags.values().any(|set| *set)
    }

    /// Flags set to `true` on this action
    pub fn set_flags(&self) -> impl Iterator<Item = &str> {
        self.capability_flags
            .iter()
            .filter(|(_, set)| **set)
            .map(|(name, _)| name.as_str())
    }
}

/// Wire shape of an action:
/// `{"Name": .., "Resources": [{"Name": ..}], "Annotations": {"Properties": {..}}}`
#[derive(Deserialize)]
struct ActionDocument {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Resources", default)]
    resources: Vec<NameRef>,
    #[serde(rename = "Annotations", default)]
    annotations: Annotations,
}

#[derive(Deserialize)]
struct NameRef {
    #[serde(rename = "Name")]
    name: String,
}

#[derive(Deserialize, Default)]
struct Annotations {
    #[serde(rename = "Properties", default)]
    properties: Map<String, Value>,
}

impl From<ActionDocument> for Action {
    fn from(doc: ActionDocument) -> Self {
        // Non-boolean properties carry no capability meaning
        let capability_flags = doc
            .annotations
            .properties
            .into_iter()
            .filter_map(|(key, value)| value.as_bool().map(|set| (key, set)))
            .collect();

        Self {
            name: doc.name,
            resource_refs: doc.resources.into_iter().map(|r| r.name).collect(),
            capability_flags,
        }
    }
}

/// A resource type. `Name` is the only field the selector reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceType {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionKey {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "Name": "s3",
        "Version": "v1.3",
        "Actions": [
            {
                "Name": "GetObject",
                "Resources": [{"Name": "object"}],
                "Annotations": {"Properties": {"IsList": false, "IsWrite": false}}
            },
            {
                "Name": "PutObject",
                "Resources": [{"Name": "object"}, {"Name": "accesspoint"}],
                "Annotations": {"Properties": {"IsWrite": true, "Note": "ignored"}}
            },
            {"Name": "ListAllMyBuckets"}
        ],
        "Resources": [
            {"Name": "object", "ARNFormats": ["arn:${Partition}:s3:::${BucketName}/${ObjectName}"]},
            {"Name": "accesspoint"}
        ],
        "ConditionKeys": [{"Name": "s3:prefix", "Types": ["String"]}]
    }"#;

    #[test]
    fn test_parse_service_document() {
        let def = ServiceDefinition::from_slice(DOC.as_bytes(), "mem://s3").unwrap();
        assert_eq!(def.name.as_deref(), Some("s3"));
        assert_eq!(def.actions.len(), 3);
        assert_eq!(def.resource_names(), vec!["object", "accesspoint"]);
        assert_eq!(def.condition_keys[0].name, "s3:prefix");
        assert_eq!(def.condition_keys[0].attributes["Types"][0], "String");
    }

    #[test]
    fn test_missing_optional_fields_are_empty() {
        let def = ServiceDefinition::from_slice(DOC.as_bytes(), "mem://s3").unwrap();
        let list = &def.actions[2];
        assert!(list.resource_refs.is_empty());
        assert!(list.capability_flags.is_empty());
        assert!(list.is_read_only());

        let bare = ServiceDefinition::from_slice(b"{}", "mem://bare").unwrap();
        assert!(bare.actions.is_empty());
        assert!(bare.resources.is_empty());
        assert!(bare.condition_keys.is_empty());
    }

    #[test]
    fn test_flags_and_targets() {
        let def = ServiceDefinition::from_slice(DOC.as_bytes(), "mem://s3").unwrap();
        let get = &def.actions[0];
        let put = &def.actions[1];

        assert!(get.is_read_only());
        assert!(!get.has_flag("IsWrite"));
        assert!(put.has_flag("IsWrite"));
        assert!(!put.capability_flags.contains_key("Note"));
        assert_eq!(put.set_flags().collect::<Vec<_>>(), vec!["IsWrite"]);
        assert!(put.targets("accesspoint"));
        assert!(!get.targets("accesspoint"));
    }

    #[test]
    fn test_resource_attributes_keep_name_first() {
        let def = ServiceDefinition::from_slice(DOC.as_bytes(), "mem://s3").unwrap();
        let object = def.resource("object").unwrap();
        let json = serde_json::to_string(object).unwrap();
        assert!(json.starts_with(r#"{"Name":"object","ARNFormats""#));
        assert!(def.resource("bucket").is_none());
    }

    #[test]
    fn test_malformed_document_reports_url() {
        let err = ServiceDefinition::from_slice(b"[1,2", "https://example.test/s3.json").unwrap_err();
        assert!(matches!(err, LensError::Decode { ref url, .. } if url == "https://example.test/s3.json"));
    }
}
