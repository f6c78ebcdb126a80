//! Renders a `SealedTree` as a Dart map literal and wraps it in the generated
//! `EncryptedConfig` class.

use crate::tree::{SealedNode, SealedTree};

/// Indentation added per nesting level.
const INDENT_STEP: usize = 2;

/// How keys and string leaves are placed between single quotes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuotePolicy {
    /// Embedded as-is. A `'`, `$`, `\` or newline in the text ends up raw in
    /// the generated literal.
    #[default]
    Verbatim,
    /// Escaped for a Dart single-quoted string literal.
    Escaped,
}

impl QuotePolicy {
    fn quote(&self, text: &str) -> String {
        match self {
            QuotePolicy::Verbatim => format!("'{text}'"),
            QuotePolicy::Escaped => {
                let mut quoted = String::with_capacity(text.len() + 2);
                quoted.push('\'');
                for ch in text.chars() {
                    match ch {
                        '\\' => quoted.push_str("\\\\"),
                        '\'' => quoted.push_str("\\'"),
                        '$' => quoted.push_str("\\$"),
                        '\n' => quoted.push_str("\\n"),
                        '\r' => quoted.push_str("\\r"),
                        other => quoted.push(other),
                    }
                }
                quoted.push('\'');
                quoted
            }
        }
    }
}

/// Renders `tree` as a map literal. Entries of the top level sit two spaces
/// in and every nested level adds two more.
pub fn render(tree: &SealedTree, policy: QuotePolicy) -> String {
    render_map(tree, INDENT_STEP, policy)
}

/// Renders the complete generated source file for `tree`.
///
/// `path_label` is echoed in the header so readers can tell where the file
/// is expected to live.
pub fn render_source(tree: &SealedTree, path_label: &str, policy: QuotePolicy) -> String {
    let literal = render(tree, policy);
    format!(
        "// Generated by encrypt-config. Do not edit by hand.\n\
         // {path_label}\n\
         \n\
         class EncryptedConfig {{\n  \
         static const Map<String, dynamic> values = {literal};\n\
         }}"
    )
}

fn render_map(tree: &SealedTree, indent: usize, policy: QuotePolicy) -> String {
    let items: Vec<String> = tree
        .iter()
        .map(|(key, node)| {
            let rendered = match node {
                SealedNode::Token(token) => policy.quote(token),
                SealedNode::Map(nested) => render_map(nested, indent + INDENT_STEP, policy),
            };
            format!("{}{}: {}", " ".repeat(indent), policy.quote(key), rendered)
        })
        .collect();
    format!(
        "{{\n{}\n{}}}",
        items.join(",\n"),
        " ".repeat(indent - INDENT_STEP)
    )
}
