//! Selector resolver
//!
//! A resolved [`Selection`] maps onto one of four query shapes. Each shape is
//! a plain value that can be logged and evaluated against any definition;
//! results always keep the document's action order.

use std::collections::BTreeSet;
use std::fmt;

use crate::capability::Capability;
use crate::definition::{Action, ServiceDefinition};

/// Label shown for [`FilterChoice::All`] in prompts
pub const ALL_LABEL: &str = "[ All ]";

/// Value accepted on the command line for [`FilterChoice::All`]
pub const ALL_ARG: &str = "*";

/// A filter that is either "everything" or one named value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChoice<T> {
    All,
    Named(T),
}

impl<T> FilterChoice<T> {
    pub fn named(&self) -> Option<&T> {
        match self {
            FilterChoice::All => None,
            FilterChoice::Named(value) => Some(value),
        }
    }
}

impl FilterChoice<String> {
    /// Parse a resource filter given on the command line
    pub fn resource_arg(arg: &str) -> Self {
        if arg == ALL_ARG {
            FilterChoice::All
        } else {
            FilterChoice::Named(arg.to_string())
        }
    }
}

impl FilterChoice<Capability> {
    /// Parse a capability filter given on the command line
    pub fn capability_arg(arg: &str) -> Self {
        if arg == ALL_ARG {
            FilterChoice::All
        } else {
            FilterChoice::Named(Capability::parse(arg))
        }
    }
}

impl<T: fmt::Display> fmt::Display for FilterChoice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterChoice::All => f.write_str(ALL_LABEL),
            FilterChoice::Named(value) => value.fmt(f),
        }
    }
}

/// Fully resolved resource and capability filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub resource: FilterChoice<String>,
    pub capability: FilterChoice<Capability>,
}

impl Selection {
    pub fn all() -> Self {
        Self {
            resource: FilterChoice::All,
            capability: FilterChoice::All,
        }
    }
}

/// The four query shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionQuery<'s> {
    Everything,
    WithCapability(&'s Capability),
    OnResource(&'s str),
    OnResourceWithCapability(&'s str, &'s Capability),
}

impl<'s> ActionQuery<'s> {
    pub fn from_selection(selection: &'s Selection) -> Self {
        match (&selection.resource, &selection.capability) {
            (FilterChoice::All, FilterChoice::All) => ActionQuery::Everything,
            (FilterChoice::All, FilterChoice::Named(cap)) => ActionQuery::WithCapability(cap),
            (FilterChoice::Named(res), FilterChoice::All) => ActionQuery::OnResource(res),
            (FilterChoice::Named(res), FilterChoice::Named(cap)) => {
                ActionQuery::OnResourceWithCapability(res, cap)
            }
        }
    }

    pub fn matches(&self, action: &Action) -> bool {
        match *self {
            ActionQuery::Everything => true,
            ActionQuery::WithCapability(cap) => cap.matches(action),
            ActionQuery::OnResource(res) => action.targets(res),
            ActionQuery::OnResourceWithCapability(res, cap) => {
                action.targets(res) && cap.matches(action)
            }
        }
    }

    /// Names of matching actions, in document order
    pub fn run<'d>(&self, definition: &'d ServiceDefinition) -> Vec<&'d str> {
        definition
            .actions
            .iter()
            .filter(|a| self.matches(a))
            .map(|a| a.name.as_str())
            .collect()
    }
}

/// Names of the actions matching `selection`.
///
/// Unknown resource or capability names simply match nothing.
pub fn select<'d>(definition: &'d ServiceDefinition, selection: &Selection) -> Vec<&'d str> {
    let query = ActionQuery::from_selection(selection);
    let names = query.run(definition);
    tracing::debug!(?query, matched = names.len(), "selected actions");
    names
}

/// Actions that survive the resource filter alone
pub fn actions_on<'d>(
    definition: &'d ServiceDefinition,
    resource: &FilterChoice<String>,
) -> Vec<&'d Action> {
    definition
        .actions
        .iter()
        .filter(|a| resource.named().map_or(true, |r| a.targets(r)))
        .collect()
}

/// Distinct resource type names referenced by any action, sorted
pub fn referenced_resource_types(definition: &ServiceDefinition) -> Vec<&str> {
    definition
        .actions
        .iter()
        .flat_map(|a| a.resource_refs.iter().map(String::as_str))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::infer_capabilities;

    fn definition() -> ServiceDefinition {
        let doc = r#"{
            "Actions": [
                {"Name": "CreateBucket", "Resources": [{"Name": "bucket"}],
                 "Annotations": {"Properties": {"IsWrite": true}}},
                {"Name": "GetObject", "Resources": [{"Name": "object"}],
                 "Annotations": {"Properties": {"IsWrite": false}}},
                {"Name": "ListBucket", "Resources": [{"Name": "bucket"}],
                 "Annotations": {"Properties": {"IsList": true}}},
                {"Name": "ListAllMyBuckets"},
                {"Name": "PutObject", "Resources": [{"Name": "object"}, {"Name": "accesspoint"}],
                 "Annotations": {"Properties": {"IsWrite": true}}},
                {"Name": "GetBucketPolicy", "Resources": [{"Name": "bucket"}],
                 "Annotations": {"Properties": {}}}
            ]
        }"#;
        ServiceDefinition::from_slice(doc.as_bytes(), "mem://s3").unwrap()
    }

    fn selection(resource: &str, capability: &str) -> Selection {
        Selection {
            resource: FilterChoice::resource_arg(resource),
            capability: FilterChoice::capability_arg(capability),
        }
    }

    #[test]
    fn test_all_all_is_identity() {
        let def = definition();
        let all: Vec<&str> = def.actions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(select(&def, &Selection::all()), all);
    }

    #[test]
    fn test_capability_only() {
        let def = definition();
        assert_eq!(select(&def, &selection("*", "IsWrite")), vec!["CreateBucket", "PutObject"]);
        assert_eq!(
            select(&def, &selection("*", "IsReadOnly")),
            vec!["GetObject", "ListAllMyBuckets", "GetBucketPolicy"]
        );
    }

    #[test]
    fn test_resource_only() {
        let def = definition();
        let on_bucket = select(&def, &selection("bucket", "*"));
        assert_eq!(on_bucket, vec!["CreateBucket", "ListBucket", "GetBucketPolicy"]);

        let all = select(&def, &Selection::all());
        for name in &on_bucket {
            assert!(all.contains(name));
            let action = def.actions.iter().find(|a| a.name == *name).unwrap();
            assert!(action.targets("bucket"));
        }
    }

    #[test]
    fn test_resource_and_capability() {
        let def = definition();
        assert_eq!(select(&def, &selection("bucket", "IsWrite")), vec!["CreateBucket"]);
        assert_eq!(select(&def, &selection("bucket", "IsReadOnly")), vec!["GetBucketPolicy"]);
        assert_eq!(select(&def, &selection("object", "IsList")), Vec::<&str>::new());
    }

    #[test]
    fn test_unknown_names_match_nothing() {
        let def = definition();
        assert!(select(&def, &selection("table", "*")).is_empty());
        assert!(select(&def, &selection("*", "IsPermissionManagement")).is_empty());
    }

    #[test]
    fn test_select_is_idempotent() {
        let def = definition();
        let sel = selection("object", "*");
        assert_eq!(select(&def, &sel), select(&def, &sel));
    }

    #[test]
    fn test_query_shapes() {
        let sel = selection("bucket", "IsWrite");
        assert!(matches!(
            ActionQuery::from_selection(&sel),
            ActionQuery::OnResourceWithCapability("bucket", Capability::Flag(f)) if f == "IsWrite"
        ));
        assert_eq!(ActionQuery::from_selection(&Selection::all()), ActionQuery::Everything);
    }

    #[test]
    fn test_referenced_resource_types_sorted() {
        let def = definition();
        assert_eq!(referenced_resource_types(&def), vec!["accesspoint", "bucket", "object"]);

        let bare = ServiceDefinition::from_slice(br#"{"Actions": [{"Name": "Foo"}]}"#, "mem://x").unwrap();
        assert!(referenced_resource_types(&bare).is_empty());
    }

    #[test]
    fn test_capabilities_follow_resource_filter() {
        let def = definition();
        let on_object = actions_on(&def, &FilterChoice::Named("object".into()));
        assert_eq!(infer_capabilities(on_object).names(), vec!["IsReadOnly", "IsWrite"]);

        let everything = actions_on(&def, &FilterChoice::All);
        assert_eq!(everything.len(), def.actions.len());
    }

    #[test]
    fn test_scenario_single_read_only_action() {
        let def = ServiceDefinition::from_slice(
            br#"{"Actions": [{"Name": "GetX", "Resources": [{"Name": "bucket"}],
                 "Annotations": {"Properties": {}}}]}"#,
            "mem://x",
        )
        .unwrap();
        assert_eq!(infer_capabilities(&def.actions).names(), vec!["IsReadOnly"]);
        assert_eq!(select(&def, &selection("*", "IsReadOnly")), vec!["GetX"]);
    }

    #[test]
    fn test_scenario_write_flag() {
        let def = ServiceDefinition::from_slice(
            br#"{"Actions": [
                {"Name": "PutX", "Annotations": {"Properties": {"Write": true}}},
                {"Name": "GetX", "Annotations": {"Properties": {"Write": false}}}
            ]}"#,
            "mem://x",
        )
        .unwrap();
        assert_eq!(infer_capabilities(&def.actions).names(), vec!["IsReadOnly", "Write"]);
        assert_eq!(select(&def, &selection("*", "Write")), vec!["PutX"]);
    }

    #[test]
    fn test_filter_choice_display() {
        assert_eq!(FilterChoice::<String>::All.to_string(), ALL_LABEL);
        assert_eq!(FilterChoice::capability_arg("IsReadOnly").to_string(), "IsReadOnly");
    }
}
