use std::fs;
use std::path::Path;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;
use tracing::debug;

use super::RenderError;
use super::matcher::MatchSet;
use crate::record::RecordDefinition;

/// Variable the generated function binds the model record to.
pub const MODEL_VAR: &str = "model";

const BUILTIN_NAME: &str = "model_to_rpc.go.tmpl";
const BUILTIN_SOURCE: &str = include_str!("../../templates/model_to_rpc.go.tmpl");

/// One generated `Field: value` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub field: String,
    pub value: String,
}

/// Context handed to the template.
#[derive(Debug, Clone, Serialize)]
pub struct RenderModel {
    /// Empty, or `"<pkg>."`.
    pub package_prefix: String,
    pub rpc_package: String,
    pub model_type: String,
    pub rpc_type: String,
    pub model_var: String,
    /// Sorted by `field` so output does not depend on match order.
    pub assignments: Vec<Assignment>,
}

impl RenderModel {
    pub fn build(
        model: &RecordDefinition,
        rpc: &RecordDefinition,
        rpc_package: &str,
        matches: &MatchSet<'_>,
    ) -> Self {
        let rpc_package = rpc_package.trim();
        let package_prefix = if rpc_package.is_empty() {
            String::new()
        } else {
            format!("{rpc_package}.")
        };

        let mut assignments: Vec<Assignment> = matches
            .mappings
            .iter()
            .map(|m| {
                let read = format!("{MODEL_VAR}.{}", m.source.name);
                let value = if m.types_differ() {
                    format!("{}({read})", m.target.ty)
                } else {
                    read
                };
                Assignment {
                    field: m.target.name.clone(),
                    value,
                }
            })
            .collect();
        assignments.sort_by(|a, b| a.field.cmp(&b.field));

        Self {
            package_prefix,
            rpc_package: rpc_package.to_string(),
            model_type: model.type_name.clone(),
            rpc_type: rpc.type_name.clone(),
            model_var: MODEL_VAR.to_string(),
            assignments,
        }
    }
}

/// A syntax-checked minijinja template source.
#[derive(Debug, Clone)]
pub struct MappingTemplate {
    name: String,
    source: String,
}

impl MappingTemplate {
    /// The Go template shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            name: BUILTIN_NAME.to_string(),
            source: BUILTIN_SOURCE.to_string(),
        }
    }

    pub fn from_source(
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, RenderError> {
        let template = Self {
            name: name.into(),
            source: source.into(),
        };
        template.check()?;
        Ok(template)
    }

    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        let source = fs::read_to_string(path).map_err(|source| RenderError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        debug!("Loaded template {name} from {}", path.display());
        Self::from_source(name, source)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn check(&self) -> Result<(), RenderError> {
        environment()
            .template_from_named_str(&self.name, &self.source)
            .map(|_| ())
            .map_err(|source| RenderError::TemplateSyntax {
                name: self.name.clone(),
                source,
            })
    }
}

impl Default for MappingTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Renders a [`RenderModel`] through an injected template.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    template: MappingTemplate,
}

impl Renderer {
    pub fn new(template: MappingTemplate) -> Self {
        Self { template }
    }

    pub fn render(&self, model: &RenderModel) -> Result<String, RenderError> {
        let env = environment();
        let template = env
            .template_from_named_str(&self.template.name, &self.template.source)
            .map_err(|source| RenderError::TemplateSyntax {
                name: self.template.name.clone(),
                source,
            })?;
        template.render(model).map_err(RenderError::Execution)
    }
}

fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_keep_trailing_newline(true);
    env
}
