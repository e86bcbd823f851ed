//! iamlens core - catalog lookup, capability inference and action selection
//!
//! This crate contains the logic shared by every iamlens frontend. It does no
//! network or terminal I/O itself; callers plug in a [`DocumentSource`] and a
//! [`Chooser`].

pub mod capability;
pub mod catalog;
pub mod config;
pub mod definition;
pub mod error;
pub mod prompt;
pub mod render;
pub mod selector;
pub mod session;
pub mod source;

pub use capability::{infer_capabilities, Capability, CapabilitySet};
pub use catalog::{CatalogEntry, CatalogIndex};
pub use config::LensConfig;
pub use definition::{Action, ConditionKey, ResourceType, ServiceDefinition};
pub use error::{LensError, Result};
pub use prompt::Chooser;
pub use render::OutputFormat;
pub use selector::{select, FilterChoice, Selection};
pub use session::{Mode, Outcome, Session, SessionOptions};
pub use source::DocumentSource;
