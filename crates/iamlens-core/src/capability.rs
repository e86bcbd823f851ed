//! Capability inference
//!
//! Capabilities come from the boolean `Annotations.Properties` of each action.
//! The vocabulary is whatever keys a service happens to use; nothing here
//! knows about `IsWrite` or `IsList`. The only capability we add ourselves is
//! `IsReadOnly`, for actions where no flag is set.

use std::collections::BTreeSet;
use std::fmt;

use crate::definition::Action;

/// Display name of the synthetic read-only capability
pub const READ_ONLY: &str = "IsReadOnly";

/// A capability an action can have.
///
/// `ReadOnly` sorts before every provider flag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    /// Synthetic: no capability flag is `true`
    ReadOnly,
    /// A provider-supplied flag such as `IsWrite`
    Flag(String),
}

impl Capability {
    /// Map a user-supplied name onto a capability
    pub fn parse(name: &str) -> Self {
        if name == READ_ONLY {
            Capability::ReadOnly
        } else {
            Capability::Flag(name.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Capability::ReadOnly => READ_ONLY,
            Capability::Flag(flag) => flag,
        }
    }

    pub fn matches(&self, action: &Action) -> bool {
        match self {
            Capability::ReadOnly => action.is_read_only(),
            Capability::Flag(flag) => action.has_flag(flag),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sorted, de-duplicated capabilities present on a set of actions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    capabilities: BTreeSet<Capability>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, cap: Capability) {
        self.capabilities.insert(cap);
    }

    pub fn has(&self, cap: &Capability) -> bool {
        self.capabilities.contains(cap)
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// The capability to use without asking, when there is exactly one
    pub fn single(&self) -> Option<&Capability> {
        if self.capabilities.len() == 1 {
            self.capabilities.iter().next()
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.capabilities.iter().map(Capability::name).collect()
    }
}

/// Collect every flag that is `true` on at least one action, plus
/// `IsReadOnly` if at least one action has no flag set.
pub fn infer_capabilities<'a, I>(actions: I) -> CapabilitySet
where
    I: IntoIterator<Item = &'a Action>,
{
    let mut set = CapabilitySet::new();
    let mut any_read_only = false;

    for action in actions {
        let mut flagged = false;
        for flag in action.set_flags() {
            flagged = true;
            set.grant(Capability::Flag(flag.to_string()));
        }
        any_read_only |= !flagged;
    }

    if any_read_only {
        set.grant(Capability::ReadOnly);
    }

    tracing::debug!(capabilities = ?set.names(), "inferred capabilities");
    set
}
