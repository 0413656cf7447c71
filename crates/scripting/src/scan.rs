//! Text scanning helpers shared by the resolver, evaluator and parser

/// Find the matching `)` for the `(` at byte offset `open`.
///
/// Returns the byte offset of the closing parenthesis, or `None` when the
/// call is unterminated.
pub fn find_matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on `sep` at parenthesis depth zero.
///
/// Used for function argument lists and `$if` condition triples, where an
/// argument may itself contain nested calls.
pub fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Split on whitespace at parenthesis depth zero.
///
/// Returns `None` on unbalanced parentheses; the pattern grammar treats
/// that as a structural error.
pub fn split_top_level_whitespace(s: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;
    for (i, c) in s.char_indices() {
        match c {
            '(' => {
                depth += 1;
                start.get_or_insert(i);
            }
            ')' => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
            }
            c if c.is_whitespace() && depth == 0 => {
                if let Some(st) = start.take() {
                    parts.push(&s[st..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if depth != 0 {
        return None;
    }
    if let Some(st) = start {
        parts.push(&s[st..]);
    }
    Some(parts)
}

/// Split a command line into words, keeping quoted runs together.
///
/// Quotes themselves are stripped: `say "hello there"` yields
/// `["say", "hello there"]`.
pub fn split_preserving_quotes(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in s.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    parts.push(std::mem::take(&mut current));
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            None => match c {
                '"' | '\'' => {
                    if !current.is_empty() {
                        parts.push(std::mem::take(&mut current));
                    }
                    quote = Some(c);
                }
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        parts.push(std::mem::take(&mut current));
                    }
                }
                _ => current.push(c),
            },
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_paren() {
        assert_eq!(find_matching_paren("(a(b)c)", 0), Some(6));
        assert_eq!(find_matching_paren("(a(b)c", 0), None);
        assert_eq!(find_matching_paren("x(y)", 1), Some(3));
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(split_top_level("a,b,c", ','), vec!["a", "b", "c"]);
        assert_eq!(split_top_level("f(a,b),c", ','), vec!["f(a,b)", "c"]);
        assert_eq!(split_top_level("", ','), vec![""]);
    }

    #[test]
    fn test_split_whitespace_honors_parens() {
        assert_eq!(
            split_top_level_whitespace("(red wolf|grey) howls").unwrap(),
            vec!["(red wolf|grey)", "howls"]
        );
        assert!(split_top_level_whitespace("(a b").is_none());
        assert!(split_top_level_whitespace("a) b").is_none());
    }

    #[test]
    fn test_split_preserving_quotes() {
        assert_eq!(
            split_preserving_quotes(r#"say "hello there" friend"#),
            vec!["say", "hello there", "friend"]
        );
        assert_eq!(split_preserving_quotes("  "), Vec::<String>::new());
    }
}
