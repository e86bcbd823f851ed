//! Lookup session
//!
//! One invocation: catalog → service → definition → filters → listing.
//! Frontends supply a [`DocumentSource`] and a [`Chooser`]; the session
//! decides when to prompt and what the prompts offer.

use crate::capability::{infer_capabilities, Capability};
use crate::config::LensConfig;
use crate::definition::ServiceDefinition;
use crate::error::{LensError, Result};
use crate::prompt::Chooser;
use crate::render::{self, OutputFormat};
use crate::selector::{self, FilterChoice, Selection, ALL_LABEL};
use crate::source::{self, DocumentSource};

/// What to list once the service is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Actions,
    ConditionKeys,
    /// Details for one resource type
    ResourceDetails,
    AllResourceDetails,
}

/// Everything the operator asked for on the command line.
///
/// `None` filters are resolved interactively.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub service: Option<String>,
    pub resource: Option<FilterChoice<String>>,
    pub capability: Option<FilterChoice<Capability>>,
    pub format: OutputFormat,
    pub mode: Mode,
}

impl SessionOptions {
    /// Whether the run can reach a prompt: the service, or a filter the
    /// chosen mode resolves interactively, is missing
    pub fn may_prompt(&self) -> bool {
        let filters_open = match self.mode {
            Mode::Actions => self.resource.is_none() || self.capability.is_none(),
            Mode::ResourceDetails => self.resource.is_none(),
            Mode::ConditionKeys | Mode::AllResourceDetails => false,
        };
        self.service.is_none() || filters_open
    }
}

/// Result of a successful session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Rendered listing for stdout; empty means print nothing
    pub output: String,
    /// Informational message for stderr, e.g. when nothing matched
    pub notice: Option<String>,
}

pub struct Session<'a> {
    config: &'a LensConfig,
    source: &'a dyn DocumentSource,
    chooser: &'a mut dyn Chooser,
}

impl<'a> Session<'a> {
    pub fn new(
        config: &'a LensConfig,
        source: &'a dyn DocumentSource,
        chooser: &'a mut dyn Chooser,
    ) -> Self {
        Self {
            config,
            source,
            chooser,
        }
    }

    pub async fn run(&mut self, options: &SessionOptions) -> Result<Outcome> {
        if options.may_prompt() && !self.chooser.is_available() {
            let missing = if options.service.is_none() {
                "a service name is required"
            } else {
                "filters must be given with --resource and --capability"
            };
            return Err(LensError::DependencyMissing(format!(
                "{} when not attached to a terminal",
                missing
            )));
        }

        let catalog = source::load_catalog(self.source, &self.config.catalog_url).await?;

        let entry = match &options.service {
            Some(name) => catalog.resolve(name)?,
            None => {
                let names: Vec<String> =
                    catalog.service_names().into_iter().map(String::from).collect();
                let index = self
                    .chooser
                    .choose("Service", &names)?
                    .ok_or(LensError::NoSelection("service"))?;
                catalog
                    .entries()
                    .get(index)
                    .ok_or(LensError::NoSelection("service"))?
            }
        };
        let service = entry.service_name.clone();
        tracing::info!(service = %service, url = %entry.definition_url, "resolved service");

        let definition = source::load_definition(self.source, &entry.definition_url).await?;

        match options.mode {
            Mode::Actions => self.list_actions(&service, &definition, options),
            Mode::ConditionKeys => Ok(list_condition_keys(&service, &definition, options.format)),
            Mode::ResourceDetails => self.resource_details(&service, &definition, options),
            Mode::AllResourceDetails => {
                if definition.resources.is_empty() {
                    return Err(LensError::NoResourceTypes(service));
                }
                Ok(Outcome {
                    output: render::render_resource_details(&definition.resources, options.format),
                    notice: None,
                })
            }
        }
    }

    fn list_actions(
        &mut self,
        service: &str,
        definition: &ServiceDefinition,
        options: &SessionOptions,
    ) -> Result<Outcome> {
        let resource = match &options.resource {
            Some(choice) => choice.clone(),
            None => {
                let types = selector::referenced_resource_types(definition);
                if types.is_empty() {
                    FilterChoice::All
                } else {
                    let values: Vec<String> = types.into_iter().map(String::from).collect();
                    self.pick_filter("resource type", values.clone(), values)?
                }
            }
        };

        let candidates = selector::actions_on(definition, &resource);
        if candidates.is_empty() {
            return Ok(empty_listing(service, &resource, None, options.format));
        }

        let capability = match &options.capability {
            Some(choice) => choice.clone(),
            None => {
                let caps = infer_capabilities(candidates);
                match caps.single() {
                    Some(only) => FilterChoice::Named(only.clone()),
                    None => {
                        let values: Vec<Capability> = caps.iter().cloned().collect();
                        let labels = caps.names().into_iter().map(String::from).collect();
                        self.pick_filter("capability", values, labels)?
                    }
                }
            }
        };

        let selection = Selection {
            resource,
            capability,
        };
        tracing::debug!(resource = %selection.resource, capability = %selection.capability, "resolved filters");

        let names = selector::select(definition, &selection);
        if names.is_empty() {
            return Ok(empty_listing(
                service,
                &selection.resource,
                Some(&selection.capability),
                options.format,
            ));
        }

        Ok(Outcome {
            output: render::render_actions(&names, service, options.format),
            notice: None,
        })
    }

    fn resource_details(
        &mut self,
        service: &str,
        definition: &ServiceDefinition,
        options: &SessionOptions,
    ) -> Result<Outcome> {
        if definition.resources.is_empty() {
            return Err(LensError::NoResourceTypes(service.to_string()));
        }

        let resource = match &options.resource {
            Some(FilterChoice::All) => {
                return Ok(Outcome {
                    output: render::render_resource_details(&definition.resources, options.format),
                    notice: None,
                })
            }
            Some(FilterChoice::Named(name)) => {
                definition
                    .resource(name)
                    .ok_or_else(|| LensError::UnknownResource {
                        service: service.to_string(),
                        resource: name.clone(),
                    })?
            }
            None => {
                let names: Vec<String> = definition
                    .resource_names()
                    .into_iter()
                    .map(String::from)
                    .collect();
                let index = self
                    .chooser
                    .choose("Resource type", &names)?
                    .ok_or(LensError::NoSelection("resource type"))?;
                definition
                    .resources
                    .get(index)
                    .ok_or(LensError::NoSelection("resource type"))?
            }
        };

        Ok(Outcome {
            output: render::render_resource(resource, options.format),
            notice: None,
        })
    }

    /// Offer `[ All ]` followed by `labels`; `values` line up with `labels`
    fn pick_filter<T: Clone>(
        &mut self,
        what: &'static str,
        values: Vec<T>,
        labels: Vec<String>,
    ) -> Result<FilterChoice<T>> {
        let mut options = Vec::with_capacity(labels.len() + 1);
        options.push(ALL_LABEL.to_string());
        options.extend(labels);

        let prompt = capitalize(what);
        match self.chooser.choose(&prompt, &options)? {
            None => Err(LensError::NoSelection(what)),
            Some(0) => Ok(FilterChoice::All),
            Some(i) => values
                .get(i - 1)
                .cloned()
                .map(FilterChoice::Named)
                .ok_or(LensError::NoSelection(what)),
        }
    }
}

fn list_condition_keys(service: &str, definition: &ServiceDefinition, format: OutputFormat) -> Outcome {
    let output = render::render_condition_keys(&definition.condition_keys, format);
    let notice = (definition.condition_keys.is_empty() && format == OutputFormat::Plain)
        .then(|| format!("Service '{}' defines no condition keys", service));
    Outcome { output, notice }
}

/// JSON mode gets `[]`; plain mode gets nothing on stdout and a notice
fn empty_listing(
    service: &str,
    resource: &FilterChoice<String>,
    capability: Option<&FilterChoice<Capability>>,
    format: OutputFormat,
) -> Outcome {
    let none: [&str; 0] = [];
    let notice = match format {
        OutputFormat::Json => None,
        OutputFormat::Plain => Some(match capability {
            Some(cap) => format!(
                "No actions in '{}' match resource type {} with capability {}",
                service, resource, cap
            ),
            None => format!("No actions in '{}' match resource type {}", service, resource),
        }),
    };
    Outcome {
        output: render::render_actions(&none, service, format),
        notice,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
