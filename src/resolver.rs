//! Constant-expression resolution for annotation attribute values.
//!
//! Attribute values are kept unevaluated in the declaration model. This module
//! turns them into plain strings: literals, `a + b` concatenations and
//! references to other fields' initializers are understood, every other shape
//! resolves to the empty string. Resolution never fails.

use crate::declaration::Expression;
use log::debug;

const QUOTES: [char; 2] = ['\'', '"'];

/// Resolves an attribute value expression to a plain string.
///
/// - `Literal` yields its text with every quote character removed,
///   whitespace kept
/// - `Concatenation` joins both resolved operands, then applies
///   [`remove_quotes`] once to the joined string
/// - `FieldReference` applies [`remove_quotes`] to the resolved initializer,
///   or yields `""` when the field has none
/// - `Array` yields its first element
/// - anything else, including `None`, yields `""`
pub fn resolve(expression: Option<&Expression>) -> String {
    let Some(expression) = expression else {
        return String::new();
    };

    match expression {
        Expression::Literal(text) => text.replace(QUOTES, ""),
        Expression::Concatenation(left, right) => {
            let mut joined = resolve(Some(left.as_ref()));
            joined.push_str(&resolve(Some(right.as_ref())));
            remove_quotes(&joined)
        }
        Expression::FieldReference(field) => match &field.initializer {
            Some(initializer) => remove_quotes(&resolve(Some(initializer.as_ref()))),
            None => {
                debug!("Field '{}' has no visible initializer", field.name);
                String::new()
            }
        },
        Expression::Array(elements) => resolve(elements.first()),
        Expression::Other => String::new(),
    }
}

/// Removes every single and double quote character.
///
/// Blank input (empty or whitespace only) yields the empty string.
pub fn remove_quotes(s: &str) -> String {
    if s.trim().is_empty() {
        return String::new();
    }
    s.replace(QUOTES, "")
}

/// Removes every double quote character, leaving single quotes alone.
pub fn remove_double_quotes(s: &str) -> String {
    if s.trim().is_empty() {
        return String::new();
    }
    s.replace('"', "")
}
