use crate::record::{Field, RecordDefinition};
use tracing::warn;

/// One RPC field paired with the model field that supplies its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldMapping<'a> {
    pub source: &'a Field,
    pub target: &'a Field,
}

impl FieldMapping<'_> {
    pub fn types_differ(&self) -> bool {
        self.source.ty != self.target.ty
    }
}

/// A model field claimed by more than one RPC field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedSource {
    pub source: String,
    /// RPC field names, in declaration order.
    pub targets: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MatchSet<'a> {
    /// At most one entry per RPC field, in RPC declaration order.
    pub mappings: Vec<FieldMapping<'a>>,
    /// RPC fields with no model counterpart; omitted from output.
    pub unmatched: Vec<&'a Field>,
    pub shared_sources: Vec<SharedSource>,
}

/// Pair every RPC field with the first model field whose name, or `rpc:`
/// override, equals the RPC field name.
pub fn match_fields<'a>(model: &'a RecordDefinition, rpc: &'a RecordDefinition) -> MatchSet<'a> {
    let mut set = MatchSet::default();

    for target in &rpc.fields {
        match find_source(&target.name, &model.fields) {
            Some(source) => set.mappings.push(FieldMapping { source, target }),
            None => {
                warn!(
                    "Field {}.{} ({}) has no counterpart in {}",
                    rpc.type_name, target.name, target.ty, model.type_name
                );
                set.unmatched.push(target);
            }
        }
    }

    set.shared_sources = shared_sources(&set.mappings);
    for shared in &set.shared_sources {
        warn!(
            "Field {}.{} is mapped to several {} fields: {}",
            model.type_name,
            shared.source,
            rpc.type_name,
            shared.targets.join(", ")
        );
    }

    set
}

fn find_source<'a>(name: &str, fields: &'a [Field]) -> Option<&'a Field> {
    fields
        .iter()
        .find(|f| f.name == name || f.override_name() == Some(name))
}

fn shared_sources(mappings: &[FieldMapping<'_>]) -> Vec<SharedSource> {
    let mut shared: Vec<SharedSource> = Vec::new();

    for (i, mapping) in mappings.iter().enumerate() {
        let source = &mapping.source.name;
        if mappings[..i].iter().any(|m| &m.source.name == source) {
            continue;
        }
        let targets: Vec<String> = mappings[i..]
            .iter()
            .filter(|m| &m.source.name == source)
            .map(|m| m.target.name.clone())
            .collect();
        if targets.len() > 1 {
            shared.push(SharedSource {
                source: source.clone(),
                targets,
            });
        }
    }

    shared
}
