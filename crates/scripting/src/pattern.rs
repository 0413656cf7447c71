//! Group/alternation pattern grammar for the `contains` operator
//!
//! A predicate splits into whitespace-separated groups; parentheses keep a
//! group with internal spaces together. Within a group, `|` separates
//! alternatives. A group matches when any alternative occurs in the subject
//! as a case-insensitive substring; the whole pattern matches when every
//! group does. `"(a|b) c"` therefore reads: ("a" OR "b") AND "c".

use crate::error::ScriptError;
use crate::scan;

/// A compiled `contains` pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// AND across groups, OR within a group; alternatives stored lowercase
    groups: Vec<Vec<String>>,
}

impl Pattern {
    /// Parse a predicate into groups. Unbalanced parentheses are a
    /// structural error.
    pub fn parse(predicate: &str) -> Result<Self, ScriptError> {
        let tokens = scan::split_top_level_whitespace(predicate)
            .ok_or_else(|| ScriptError::UnterminatedGroup(predicate.to_string()))?;
        let mut groups = Vec::with_capacity(tokens.len());
        for token in tokens {
            let inner = if let Some(stripped) = token.strip_prefix('(') {
                stripped
                    .strip_suffix(')')
                    .ok_or_else(|| ScriptError::UnterminatedGroup(token.to_string()))?
            } else {
                token
            };
            let alternatives: Vec<String> = inner
                .split('|')
                .map(|alt| alt.trim().to_lowercase())
                .collect();
            groups.push(alternatives);
        }
        Ok(Self { groups })
    }

    /// Case-insensitive match of every group against `subject`.
    pub fn matches(&self, subject: &str) -> bool {
        let subject = subject.to_lowercase();
        self.groups
            .iter()
            .all(|alts| alts.iter().any(|alt| subject.contains(alt.as_str())))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternation_within_group() {
        let p = Pattern::parse("(a|b)").unwrap();
        assert!(p.matches("xay"));
        assert!(p.matches("zby"));
        assert!(!p.matches("czy"));
    }

    #[test]
    fn test_and_across_groups_order_independent() {
        let p = Pattern::parse("a b").unwrap();
        assert!(p.matches("abacus"));
        assert!(p.matches("b then a"));
        assert!(!p.matches("only a"));
    }

    #[test]
    fn test_plain_substring() {
        let p = Pattern::parse("c").unwrap();
        assert!(p.matches("arc"));
        assert!(!p.matches("ab"));
    }

    #[test]
    fn test_case_insensitive() {
        let p = Pattern::parse("(Hello|Hi) There").unwrap();
        assert!(p.matches("hello over there"));
        assert!(p.matches("HI THERE"));
    }

    #[test]
    fn test_group_with_spaces() {
        let p = Pattern::parse("(red wolf|grey wolf) howls").unwrap();
        assert!(p.matches("the grey wolf howls at dusk"));
        assert!(!p.matches("a red fox howls"));
    }

    #[test]
    fn test_unterminated_group_is_error() {
        assert!(matches!(
            Pattern::parse("(a|b c"),
            Err(ScriptError::UnterminatedGroup(_))
        ));
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        let p = Pattern::parse("").unwrap();
        assert!(p.is_empty());
        assert!(p.matches("anything"));
    }
}
