use tree_sitter::Language;

pub struct GrammarConfig {
    pub name: &'static str,
    pub language: Language,
    /// Prepended to snippets that lack one, so they parse as a source file.
    pub package_clause: &'static str,
    /// Captures `@name` and `@fields` for every named struct declaration.
    pub record_query: &'static str,
}

impl GrammarConfig {
    pub fn go() -> Self {
        GrammarConfig {
            name: "go",
            language: tree_sitter_go::LANGUAGE.into(),
            package_clause: "package main\n",
            record_query: r#"
(type_declaration
  (type_spec
    name: (type_identifier) @name
    type: (struct_type
      (field_declaration_list) @fields))) @record
"#,
        }
    }

    /// Whether `snippet` already opens with its own package clause,
    /// possibly after leading comments (generated-file headers).
    pub fn has_package_clause(&self, snippet: &str) -> bool {
        skip_leading_comments(snippet)
            .strip_prefix("package")
            .is_some_and(|rest| rest.starts_with(char::is_whitespace))
    }
}

fn skip_leading_comments(mut src: &str) -> &str {
    loop {
        src = src.trim_start();
        if let Some(rest) = src.strip_prefix("//") {
            src = rest.split_once('\n').map_or("", |(_, after)| after);
        } else if let Some(rest) = src.strip_prefix("/*") {
            src = rest.split_once("*/").map_or("", |(_, after)| after);
        } else {
            return src;
        }
    }
}
