//! Best-effort textual signatures for function-definition nodes.
//!
//! Parts are collected in a fixed order and joined with single spaces:
//!
//! 1. modifiers (`static`, `const`, ...)
//! 2. return type
//! 3. name, then parameter-list text
//! 4. trailing return type
//! 5. trailing specifiers (`const`, `noexcept`, `throws ...`)
//!
//! When the node sits directly inside a template declaration,
//! `template<...>` is prepended. Any part a grammar does not expose is
//! omitted. The result is not a symbol identity: distinct functions can share
//! a signature.

use tree_sitter::Node;

use crate::chunker::languages::{GrammarSpec, NameLookup, TrailingReturn};
use crate::chunker::parser::node_text;

/// The name portion of a signature: the last token before the first `(`,
/// with pointer/reference sigils stripped.
///
/// `"static void foo (int x)"` → `"foo"`.
pub fn bare_name(signature: &str) -> String {
    let head = signature.split('(').next().unwrap_or("").trim();
    head.split_whitespace()
        .last()
        .unwrap_or("")
        .trim_start_matches(['*', '&'])
        .to_string()
}

fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn child_texts(node: Node<'_>, kinds: &[&str], content: &[u8]) -> Vec<String> {
    children(node)
        .into_iter()
        .filter(|child| kinds.contains(&child.kind()))
        .map(|child| node_text(content, child))
        .collect()
}

/// Modifier texts of `node`. A modifier node holding annotations contributes
/// only its remaining tokens.
fn modifier_texts(node: Node<'_>, spec: &GrammarSpec, content: &[u8]) -> Vec<String> {
    let mut texts = Vec::new();
    for modifier in children(node)
        .into_iter()
        .filter(|child| spec.modifier_kinds.contains(&child.kind()))
    {
        let tokens = children(modifier);
        if tokens
            .iter()
            .any(|token| spec.annotation_kinds.contains(&token.kind()))
        {
            texts.extend(
                tokens
                    .into_iter()
                    .filter(|token| !spec.annotation_kinds.contains(&token.kind()))
                    .map(|token| node_text(content, token)),
            );
        } else {
            texts.push(node_text(content, modifier));
        }
    }
    texts
}

/// Find the function declarator: a direct child of one of `kinds`, or one
/// reached by following `declarator` fields through pointer/reference
/// declarators.
fn find_declarator<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    if let Some(direct) = children(node)
        .into_iter()
        .find(|child| kinds.contains(&child.kind()))
    {
        return Some(direct);
    }
    let mut current = node.child_by_field_name("declarator");
    while let Some(candidate) = current {
        if kinds.contains(&candidate.kind()) {
            return Some(candidate);
        }
        current = candidate.child_by_field_name("declarator");
    }
    None
}

/// Depth-first search under `node` for the first identifier and the first
/// parameter list. A matched parameter list is not descended into.
fn find_identifier_and_parameters<'t>(
    node: Node<'t>,
    identifier_kinds: &[&str],
    parameter_kinds: &[&str],
    identifier: &mut Option<Node<'t>>,
    parameters: &mut Option<Node<'t>>,
) {
    for child in children(node) {
        if identifier.is_none() && identifier_kinds.contains(&child.kind()) {
            *identifier = Some(child);
        } else if parameters.is_none() && parameter_kinds.contains(&child.kind()) {
            *parameters = Some(child);
        } else {
            find_identifier_and_parameters(
                child,
                identifier_kinds,
                parameter_kinds,
                identifier,
                parameters,
            );
        }
    }
}

/// Reconstruct a signature string for `node`, a function definition of the
/// grammar described by `spec`.
pub fn synthesize(node: Node<'_>, content: &[u8], spec: &GrammarSpec) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.extend(modifier_texts(node, spec, content));

    if let Some(return_type) = spec
        .return_type_fields
        .iter()
        .find_map(|field| node.child_by_field_name(field))
    {
        parts.push(node_text(content, return_type));
    }

    let mut declarator = None;
    match &spec.name_lookup {
        NameLookup::Declarator {
            declarator_kinds,
            identifier_kinds,
            parameter_kinds,
        } => {
            declarator = find_declarator(node, declarator_kinds);
            if let Some(decl) = declarator {
                let mut identifier = None;
                let mut parameters = None;
                find_identifier_and_parameters(
                    decl,
                    identifier_kinds,
                    parameter_kinds,
                    &mut identifier,
                    &mut parameters,
                );
                if let Some(ident) = identifier {
                    parts.push(node_text(content, ident));
                }
                if let Some(params) = parameters {
                    parts.push(node_text(content, params));
                }
            }
        }
        NameLookup::Fields {
            name_field,
            parameters_field,
        } => {
            if let Some(name) = node.child_by_field_name(name_field) {
                parts.push(node_text(content, name));
            }
            if let Some(params) = node.child_by_field_name(parameters_field) {
                parts.push(node_text(content, params));
            }
        }
    }

    match &spec.trailing_return {
        Some(TrailingReturn::Node(kinds)) => {
            let trailing = children(node)
                .into_iter()
                .chain(declarator.map(children).unwrap_or_default())
                .find(|child| kinds.contains(&child.kind()));
            if let Some(trailing) = trailing {
                parts.push(node_text(content, trailing));
            }
        }
        Some(TrailingReturn::Field { field, prefix }) => {
            if let Some(trailing) = node.child_by_field_name(field) {
                parts.push(format!("{prefix} {}", node_text(content, trailing)));
            }
        }
        None => {}
    }

    // Post-parameter qualifiers live on the declarator when there is one.
    parts.extend(child_texts(
        declarator.unwrap_or(node),
        spec.specifier_kinds,
        content,
    ));

    if let Some(template_kind) = spec.template_kind {
        if let Some(parent) = node.parent().filter(|p| p.kind() == template_kind) {
            if let Some(params) = parent.child_by_field_name("parameters") {
                parts.insert(0, format!("template{}", node_text(content, params)));
            }
        }
    }

    parts.join(" ").trim().to_string()
}
