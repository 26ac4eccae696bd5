/// Parse → match → render pipeline behind a single call.
use std::fmt;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::mapping::{
    MappingTemplate, RenderError, RenderModel, Renderer, SharedSource, match_fields,
};
use crate::record::{ParseError, RecordDefinition, RecordParser, SkippedField};

/// Which of the two input snippets an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSide {
    Model,
    Rpc,
}

impl fmt::Display for RecordSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSide::Model => f.write_str("model struct"),
            RecordSide::Rpc => f.write_str("rpc struct"),
        }
    }
}

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("{side}: {source}")]
    Parse {
        side: RecordSide,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Generated text plus the non-fatal diagnostics gathered on the way.
#[derive(Debug, Clone)]
pub struct Generated {
    pub text: String,
    /// RPC fields left out because no model field matched them.
    pub unmatched: Vec<String>,
    pub shared_sources: Vec<SharedSource>,
    /// Declared fields that could not be mapped (unsupported or embedded).
    pub skipped: Vec<(RecordSide, SkippedField)>,
}

#[derive(Debug, Clone, Default)]
pub struct MappingGenerator {
    renderer: Renderer,
}

impl MappingGenerator {
    pub fn new(renderer: Renderer) -> Self {
        Self { renderer }
    }

    /// Uses the configured template file, or the builtin one when unset.
    pub fn from_config(config: &Config) -> Result<Self, RenderError> {
        let template = match config.template_path.as_deref() {
            Some(path) => MappingTemplate::from_file(Path::new(path))?,
            None => MappingTemplate::builtin(),
        };
        info!("Using template {}", template.name());
        Ok(Self::new(Renderer::new(template)))
    }

    pub fn generate(
        &self,
        rpc_src: &str,
        model_src: &str,
        rpc_package: &str,
    ) -> Result<Generated, GenerateError> {
        let rpc = parse_side(rpc_src, RecordSide::Rpc)?;
        let model = parse_side(model_src, RecordSide::Model)?;

        let matches = match_fields(&model, &rpc);
        let render_model = RenderModel::build(&model, &rpc, rpc_package, &matches);
        let text = self.renderer.render(&render_model)?;

        info!(
            "Generated {} -> {} mapping ({} of {} fields)",
            model.type_name,
            rpc.type_name,
            matches.mappings.len(),
            rpc.fields.len()
        );

        let skipped = model
            .skipped
            .iter()
            .map(|f| (RecordSide::Model, f.clone()))
            .chain(rpc.skipped.iter().map(|f| (RecordSide::Rpc, f.clone())))
            .collect();

        Ok(Generated {
            text,
            unmatched: matches.unmatched.iter().map(|f| f.name.clone()).collect(),
            shared_sources: matches.shared_sources,
            skipped,
        })
    }
}

fn parse_side(source: &str, side: RecordSide) -> Result<RecordDefinition, GenerateError> {
    RecordParser::new()
        .and_then(|mut parser| parser.parse(source))
        .map_err(|source| GenerateError::Parse { side, source })
}

/// Generate the mapping function with the builtin template.
pub fn generate_mapping(
    rpc_src: &str,
    model_src: &str,
    rpc_package: &str,
) -> Result<String, GenerateError> {
    MappingGenerator::default()
        .generate(rpc_src, model_src, rpc_package)
        .map(|generated| generated.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = "type User struct {\n    ID   int32\n    Name string\n}\n";
    const RPC: &str = "type UserReply struct {\n    ID   int64\n    Name string\n}\n";

    #[test]
    fn test_generate_reports_side_of_parse_error() {
        let err = generate_mapping(RPC, "type User struct {", "").unwrap_err();
        assert!(
            matches!(err, GenerateError::Parse { side: RecordSide::Model, .. }),
            "got {err:?}"
        );
        assert!(err.to_string().starts_with("model struct: "));

        let err = generate_mapping("not go at all", MODEL, "").unwrap_err();
        assert!(matches!(err, GenerateError::Parse { side: RecordSide::Rpc, .. }));
    }

    #[test]
    fn test_generate_collects_diagnostics() {
        let rpc = "type UserReply struct {\n    ID int64\n    Avatar string\n}\n";
        let generated = MappingGenerator::default().generate(rpc, MODEL, "pb").unwrap();
        assert_eq!(generated.unmatched, vec!["Avatar"]);
        assert!(generated.shared_sources.is_empty());
        assert!(generated.text.contains("ID: int64(model.ID),"));
        assert!(!generated.text.contains("Avatar"));
    }

    #[test]
    fn test_unsupported_fields_do_not_abort() {
        let rpc = "type UserReply struct {\n    ID int64\n    CreatedAt *timestamppb.Timestamp\n    Name string\n}";
        let generated = MappingGenerator::default().generate(rpc, MODEL, "pb").unwrap();
        assert!(generated.text.contains("ID: int64(model.ID),"));
        assert!(generated.text.contains("Name: model.Name,"));
        assert!(!generated.text.contains("CreatedAt"));
        assert!(generated.unmatched.is_empty());
        assert_eq!(generated.skipped.len(), 1);
        assert_eq!(generated.skipped[0].0, RecordSide::Rpc);
        assert_eq!(generated.skipped[0].1.name, "CreatedAt");
    }

    #[test]
    fn test_from_config_missing_template() {
        let config = Config {
            template_path: Some("/definitely/not/here.tmpl".into()),
            ..Config::default()
        };
        assert!(matches!(
            MappingGenerator::from_config(&config),
            Err(RenderError::TemplateRead { .. })
        ));
    }
}
