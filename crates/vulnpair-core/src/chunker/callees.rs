//! Call-target extraction from function bodies.
//!
//! Names are taken verbatim from the call expression's callee text
//! (`obj.method`, `ns::fn`, `self.helper`) and are never resolved.

use tree_sitter::Node;

use crate::chunker::languages::{CalleeTarget, GrammarSpec};
use crate::chunker::parser::{byte_range_text, node_text};

/// Callee text of a call node, or `None` when the grammar's target field is
/// missing.
fn callee_text(call: Node<'_>, content: &[u8], target: &CalleeTarget) -> Option<String> {
    match target {
        CalleeTarget::Field(field) => call
            .child_by_field_name(field)
            .map(|callee| node_text(content, callee)),
        CalleeTarget::BeforeField(field) => call.child_by_field_name(field).map(|args| {
            byte_range_text(content, call.start_byte(), args.start_byte())
                .trim()
                .to_string()
        }),
    }
}

/// Collect the callee of every call node under `node`, in pre-order.
///
/// Calls nested inside a call (in its arguments or its callee expression)
/// are collected after the enclosing call, so `f(g(x))` yields
/// `["f", "g"]`. A walk that stopped at the first call node would yield
/// only `["f"]` and miss callees passed as arguments.
pub fn find_function_calls(node: Node<'_>, content: &[u8], spec: &GrammarSpec) -> Vec<String> {
    let mut calls = Vec::new();
    collect_calls(node, content, spec, &mut calls);
    calls
}

fn collect_calls(node: Node<'_>, content: &[u8], spec: &GrammarSpec, calls: &mut Vec<String>) {
    if spec.is_call(node.kind()) {
        if let Some(name) = callee_text(node, content, &spec.callee_target) {
            calls.push(name);
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_calls(child, content, spec, calls);
    }
}

/// Callees of a function-definition node: every call found in its body
/// block, duplicates kept. A function without a body block (expression
/// bodies, declarations) has no callees.
pub fn find_callees(function_node: Node<'_>, content: &[u8], spec: &GrammarSpec) -> Vec<String> {
    let mut cursor = function_node.walk();
    let body = function_node
        .children(&mut cursor)
        .find(|child| spec.is_body(child.kind()));
    match body {
        Some(body) => find_function_calls(body, content, spec),
        None => Vec::new(),
    }
}
