use super::grammar::GrammarConfig;
use super::{
    Field, INTERNAL_FIELD_PREFIX, ParseError, RecordDefinition, SkipReason, SkippedField, TypeExpr,
};
use tracing::{debug, warn};
use tree_sitter::{Node, Parser, Query, QueryCursor, StreamingIterator};

const NEAR_TEXT_LIMIT: usize = 40;

/// Parses a single Go struct declaration into a [`RecordDefinition`].
pub struct RecordParser {
    parser: Parser,
    query: Query,
    grammar: GrammarConfig,
}

impl RecordParser {
    pub fn new() -> Result<Self, ParseError> {
        let grammar = GrammarConfig::go();

        let mut parser = Parser::new();
        parser
            .set_language(&grammar.language)
            .map_err(|e| ParseError::Setup(e.to_string()))?;

        let query = Query::new(&grammar.language, grammar.record_query)
            .map_err(|e| ParseError::Setup(e.to_string()))?;

        Ok(Self {
            parser,
            query,
            grammar,
        })
    }

    /// Parse a snippet containing exactly one `type X struct { ... }`.
    pub fn parse(&mut self, snippet: &str) -> Result<RecordDefinition, ParseError> {
        // The grammar requires a terminator after the last top-level declaration.
        let (source, line_offset) = if self.grammar.has_package_clause(snippet) {
            (format!("{snippet}\n"), 0)
        } else {
            (format!("{}{snippet}\n", self.grammar.package_clause), 1)
        };
        let src = source.as_bytes();

        let tree = self.parser.parse(src, None).ok_or_else(|| {
            ParseError::Setup(format!("{} parser produced no tree", self.grammar.name))
        })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(syntax_error(root, src, line_offset));
        }

        let (type_name, field_list) = self.find_record(root, src)?;
        let (fields, skipped) = collect_fields(field_list, src);

        for field in &skipped {
            warn!("Skipping {type_name}.{field}");
        }
        debug!("Parsed struct {type_name} with {} fields", fields.len());

        Ok(RecordDefinition {
            type_name,
            fields,
            skipped,
        })
    }

    fn find_record<'tree>(
        &self,
        root: Node<'tree>,
        src: &[u8],
    ) -> Result<(String, Node<'tree>), ParseError> {
        let mut cursor = QueryCursor::new();
        let mut records: Vec<(String, Node<'tree>)> = Vec::new();

        let mut matches = cursor.matches(&self.query, root, src);
        while let Some(m) = matches.next() {
            let mut name = None;
            let mut fields = None;

            for cap in m.captures {
                match self.query.capture_names()[cap.index as usize] {
                    "name" => name = Some(text(cap.node, src).to_string()),
                    "fields" => fields = Some(cap.node),
                    _ => {}
                }
            }

            if let (Some(name), Some(fields)) = (name, fields) {
                records.push((name, fields));
            }
        }

        match records.len() {
            0 => Err(ParseError::NoRecord),
            1 => Ok(records.remove(0)),
            _ => Err(ParseError::MultipleRecords(
                records.into_iter().map(|(name, _)| name).collect(),
            )),
        }
    }
}

fn collect_fields(list: Node, src: &[u8]) -> (Vec<Field>, Vec<SkippedField>) {
    let mut comments = Vec::new();
    collect_comments(list, src, &mut comments);

    let mut fields = Vec::new();
    let mut skipped = Vec::new();
    let mut cursor = list.walk();
    for decl in list.named_children(&mut cursor) {
        if decl.kind() != "field_declaration" {
            continue;
        }

        let type_node = decl.child_by_field_name("type");
        let mut name_cursor = decl.walk();
        let names: Vec<&str> = decl
            .children_by_field_name("name", &mut name_cursor)
            .map(|n| text(n, src))
            .collect();

        let Some(type_node) = type_node.filter(|_| !names.is_empty()) else {
            let type_text = type_node.map_or_else(|| text(decl, src), |t| text(t, src));
            skipped.push(SkippedField {
                name: type_text.to_string(),
                type_text: type_text.to_string(),
                reason: SkipReason::Embedded,
            });
            continue;
        };

        // A struct tag sits between the type and any trailing comment.
        let anchor = decl.child_by_field_name("tag").unwrap_or(type_node);
        let comment = trailing_comment(&comments, anchor, next_declaration_start(decl));
        let ty = resolve_type(type_node, src);

        for name in names {
            if name.starts_with(INTERNAL_FIELD_PREFIX) {
                debug!("Skipping internal field {name}");
                continue;
            }
            match &ty {
                Some(ty) => fields.push(Field {
                    name: name.to_string(),
                    ty: ty.clone(),
                    comment: comment.to_string(),
                }),
                None => skipped.push(SkippedField {
                    name: name.to_string(),
                    type_text: text(type_node, src).to_string(),
                    reason: SkipReason::UnsupportedType,
                }),
            }
        }
    }

    (fields, skipped)
}

struct Comment<'a> {
    row: usize,
    start_byte: usize,
    text: &'a str,
}

fn collect_comments<'a>(node: Node, src: &'a [u8], out: &mut Vec<Comment<'a>>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "comment" {
            out.push(Comment {
                row: child.start_position().row,
                start_byte: child.start_byte(),
                text: text(child, src),
            });
        } else {
            collect_comments(child, src, out);
        }
    }
}

/// Start of the next field declaration in the same list, if any.
fn next_declaration_start(decl: Node) -> usize {
    let mut next = decl.next_named_sibling();
    while let Some(node) = next {
        if node.kind() == "field_declaration" {
            return node.start_byte();
        }
        next = node.next_named_sibling();
    }
    usize::MAX
}

/// First comment on the line `anchor` ends on, between it and the next declaration.
fn trailing_comment<'a>(comments: &[Comment<'a>], anchor: Node, limit: usize) -> &'a str {
    let row = anchor.end_position().row;
    comments
        .iter()
        .find(|c| {
            c.row == row && c.start_byte >= anchor.end_byte() && c.start_byte < limit
        })
        .map(|c| c.text)
        .unwrap_or("")
}

/// `None` for types outside the supported categories.
fn resolve_type(node: Node, src: &[u8]) -> Option<TypeExpr> {
    match node.kind() {
        "type_identifier" | "qualified_type" => Some(TypeExpr::Named(named_type(node, src))),
        "struct_type" => Some(TypeExpr::AnonymousRecord),
        "slice_type" => node
            .child_by_field_name("element")
            .filter(|elem| is_named_type(*elem))
            .map(|elem| TypeExpr::SequenceOf(named_type(elem, src))),
        _ => None,
    }
}

fn is_named_type(node: Node) -> bool {
    matches!(node.kind(), "type_identifier" | "qualified_type")
}

fn named_type(node: Node, src: &[u8]) -> String {
    text(node, src).split_whitespace().collect()
}

fn syntax_error(root: Node, src: &[u8], line_offset: usize) -> ParseError {
    let node = first_error(root).unwrap_or(root);
    let pos = node.start_position();
    let near = if node.is_missing() {
        format!("missing {}", node.kind())
    } else {
        text(node, src).chars().take(NEAR_TEXT_LIMIT).collect()
    };
    ParseError::Syntax {
        line: (pos.row + 1).saturating_sub(line_offset).max(1),
        column: pos.column + 1,
        near,
    }
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}

fn text<'a>(node: Node, src: &'a [u8]) -> &'a str {
    node.utf8_text(src).unwrap_or_default()
}
