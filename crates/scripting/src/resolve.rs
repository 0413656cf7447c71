//! Variable resolver
//!
//! Expands `%name%` placeholders from a [`VarMap`]. Resolution is a single
//! left-to-right pass: substituted values are appended to the output and
//! never re-scanned, so a value containing `%` cannot trigger another
//! expansion. Unknown or malformed placeholders are left verbatim; the
//! resolver never fails.

use crate::context::VarMap;

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '*')
}

/// Substitute every well-formed `%identifier%` with its value from `vars`.
pub fn resolve_vars(text: &str, vars: &VarMap) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let end = after
            .find(|c: char| !is_ident_char(c))
            .unwrap_or(after.len());
        if end > 0 && after[end..].starts_with('%') {
            let name = &after[..end];
            match vars.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    // unknown identifier, keep it verbatim
                    out.push('%');
                    out.push_str(name);
                    out.push('%');
                }
            }
            rest = &after[end + 1..];
        } else {
            // stray '%', not a placeholder
            out.push('%');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}
