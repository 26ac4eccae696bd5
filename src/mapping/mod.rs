/// Field matching and rendering of the generated mapping function.
///
/// Mirrors the two later pipeline stages: [`matcher`] pairs RPC fields with
/// model fields, [`render`] turns those pairs into source text.
pub mod matcher;
pub mod render;

use std::path::PathBuf;

use thiserror::Error;

pub use matcher::{FieldMapping, MatchSet, SharedSource, match_fields};
pub use render::{Assignment, MappingTemplate, RenderModel, Renderer};

/// Errors that can occur while loading or executing the mapping template.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to read template {}: {source}", path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid template {name}: {source}")]
    TemplateSyntax {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("template execution failed: {0}")]
    Execution(#[source] minijinja::Error),
}
