//! Runtime rendering of `{}` placeholder templates.
//!
//! [`Logger::logf`](crate::Logger::logf) trims its template before the
//! arguments are substituted, which rules out compile-time `format_args!`.
//! This module does the substitution at runtime instead: positional `{}`
//! placeholders, `{{` and `}}` escapes. Rendering is total — a placeholder
//! with no remaining argument is emitted verbatim, surplus arguments are
//! ignored.

use std::fmt::{Display, Write as _};

pub(crate) fn render(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' if chars.peek() == Some(&'}') => {
                chars.next();
                match args.next() {
                    // Infallible: writing into a String cannot error
                    Some(arg) => {
                        let _ = write!(out, "{arg}");
                    }
                    None => out.push_str("{}"),
                }
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            _ => out.push(ch),
        }
    }

    out
}
