//! Function evaluator
//!
//! Evaluates `$name(arg, ...)` expressions embedded in script text.
//! Arguments are themselves evaluated depth-first before the call, so
//! `$cap($name(%A%))` works as expected. Every failure mode degrades to an
//! empty string or a `"false"` token; script correctness is the content
//! author's responsibility.

use rand::Rng;
use tracing::debug;

use wyldmud_core::VarScope;

use crate::context::VarMap;
use crate::resolve::resolve_vars;
use crate::scan;

/// Read-only game-state queries reachable from script functions.
///
/// `reference` arguments are the `@`-prefixed handles produced by the
/// resolver (`%A%`, `%S%`, ...). Implementations fail soft: a reference to
/// a destroyed entity yields `None`, never an error.
pub trait WorldQuery {
    /// Display name of the referenced entity
    fn name_of(&self, reference: &str) -> Option<String>;

    /// Name of the item equipped in `slot`, if any
    fn equipped(&self, reference: &str, slot: &str) -> Option<String>;

    /// Whether the referenced entity carries an item matching `item`
    fn has_item(&self, reference: &str, item: &str) -> bool;

    /// Reference of the room the entity is in
    fn room_of(&self, reference: &str) -> Option<String>;

    /// Zone id of the entity's room
    fn zone_of(&self, reference: &str) -> Option<String>;

    /// Scoped variable lookup on the referenced entity
    fn scoped_var(&self, scope: VarScope, reference: &str, name: &str) -> Option<String>;
}

/// Lenient numeric conversion: empty counts as zero, anything unparseable
/// is `None` so comparisons can fail safely.
pub(crate) fn to_num(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0);
    }
    s.parse::<f64>().ok().map(|f| f as i64)
}

/// Resolve variables, then evaluate functions: the full text pipeline.
pub fn evaluate_text<W: WorldQuery + ?Sized>(text: &str, vars: &VarMap, world: &W) -> String {
    eval_functions(&resolve_vars(text, vars), vars, world)
}

/// Evaluate every `$name(...)` call in `line`, left to right.
///
/// An unterminated call leaves the remainder of the line verbatim; a `$`
/// not followed by `name(` is literal text.
pub fn eval_functions<W: WorldQuery + ?Sized>(line: &str, vars: &VarMap, world: &W) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let name_end = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        if name_end == 0 || !after[name_end..].starts_with('(') {
            out.push('$');
            rest = after;
            continue;
        }
        let name = &after[..name_end];
        match scan::find_matching_paren(after, name_end) {
            Some(close) => {
                let args: Vec<String> = scan::split_top_level(&after[name_end + 1..close], ',')
                    .into_iter()
                    .map(|arg| eval_functions(arg.trim(), vars, world))
                    .collect();
                out.push_str(&apply(name, &args, world));
                rest = &after[close + 1..];
            }
            None => {
                // unterminated call, keep the tail as written
                out.push('$');
                out.push_str(after);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

fn bool_token(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

fn numeric_pair(args: &[String], cmp: impl FnOnce(i64, i64) -> bool) -> String {
    match (args.first().and_then(|a| to_num(a)), args.get(1).and_then(|a| to_num(a))) {
        (Some(a), Some(b)) => bool_token(cmp(a, b)),
        _ => bool_token(false),
    }
}

fn apply<W: WorldQuery + ?Sized>(name: &str, args: &[String], world: &W) -> String {
    let arg = |i: usize| args.get(i).map(String::as_str).unwrap_or("");
    match name {
        "cap" => {
            let mut chars = arg(0).chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        "random" => match (to_num(arg(0)), to_num(arg(1))) {
            (Some(lo), Some(hi)) if lo <= hi => {
                rand::thread_rng().gen_range(lo..=hi).to_string()
            }
            _ => String::new(),
        },
        "numeq" => numeric_pair(args, |a, b| a == b),
        "numneq" => numeric_pair(args, |a, b| a != b),
        "numgt" => numeric_pair(args, |a, b| a > b),
        "numlt" => numeric_pair(args, |a, b| a < b),
        "numgte" => numeric_pair(args, |a, b| a >= b),
        "numlte" => numeric_pair(args, |a, b| a <= b),
        "between" => match (to_num(arg(0)), to_num(arg(1)), to_num(arg(2))) {
            (Some(lo), Some(v), Some(hi)) => bool_token(lo <= v && v <= hi),
            _ => bool_token(false),
        },
        "name" => world.name_of(arg(0)).unwrap_or_default(),
        "equipped" => world.equipped(arg(0), arg(1)).unwrap_or_default(),
        "hasitem" => bool_token(world.has_item(arg(0), arg(1))),
        "room" => world.room_of(arg(0)).unwrap_or_default(),
        "zone" => world.zone_of(arg(0)).unwrap_or_default(),
        "tempvar" => world
            .scoped_var(VarScope::Temporary, arg(0), arg(1))
            .unwrap_or_default(),
        "permvar" => world
            .scoped_var(VarScope::Permanent, arg(0), arg(1))
            .unwrap_or_default(),
        "questvar" => world
            .scoped_var(VarScope::Quest, arg(0), arg(1))
            .unwrap_or_default(),
        _ => {
            debug!(function = name, "unknown script function");
            String::new()
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Query stub: a handful of canned entities and variables
    #[derive(Default)]
    pub struct StubWorld {
        pub names: HashMap<String, String>,
        pub vars: HashMap<(String, String), String>,
    }

    impl WorldQuery for StubWorld {
        fn name_of(&self, reference: &str) -> Option<String> {
            self.names.get(reference).cloned()
        }
        fn equipped(&self, _reference: &str, slot: &str) -> Option<String> {
            (slot == "wield").then(|| "rusty sword".to_string())
        }
        fn has_item(&self, _reference: &str, item: &str) -> bool {
            item == "lantern"
        }
        fn room_of(&self, reference: &str) -> Option<String> {
            self.names.contains_key(reference).then(|| "@R1".to_string())
        }
        fn zone_of(&self, reference: &str) -> Option<String> {
            self.names.contains_key(reference).then(|| "old_town".to_string())
        }
        fn scoped_var(&self, _scope: VarScope, reference: &str, name: &str) -> Option<String> {
            self.vars.get(&(reference.to_string(), name.to_string())).cloned()
        }
    }

    fn world() -> StubWorld {
        let mut w = StubWorld::default();
        w.names.insert("@C1".into(), "Alia".into());
        w.vars
            .insert(("@C1".into(), "counter".into()), "3".into());
        w
    }

    #[test]
    fn test_numeric_functions_return_tokens() {
        let vars = VarMap::new();
        let w = world();
        assert_eq!(eval_functions("$numeq(2, 2)", &vars, &w), "true");
        assert_eq!(eval_functions("$numgt(2, 7)", &vars, &w), "false");
        assert_eq!(eval_functions("$numlte(abc, 7)", &vars, &w), "false");
        assert_eq!(eval_functions("$between(1, 5, 10)", &vars, &w), "true");
        assert_eq!(eval_functions("$between(1, 50, 10)", &vars, &w), "false");
    }

    #[test]
    fn test_nested_calls_depth_first() {
        let vars = VarMap::new();
        let w = world();
        assert_eq!(eval_functions("$cap($name(@C1))!", &vars, &w), "Alia!");
        assert_eq!(
            eval_functions("$numeq($tempvar(@C1, counter), 3)", &vars, &w),
            "true"
        );
    }

    #[test]
    fn test_gone_entity_fails_soft() {
        let vars = VarMap::new();
        let w = world();
        assert_eq!(eval_functions("[$name(@C99)]", &vars, &w), "[]");
        assert_eq!(eval_functions("$room(@C99)", &vars, &w), "");
    }

    #[test]
    fn test_unknown_function_empty() {
        let vars = VarMap::new();
        let w = world();
        assert_eq!(eval_functions("x$frobnicate(1)y", &vars, &w), "xy");
    }

    #[test]
    fn test_literal_dollar_kept() {
        let vars = VarMap::new();
        let w = world();
        assert_eq!(eval_functions("costs $5", &vars, &w), "costs $5");
        assert_eq!(eval_functions("$ (gap)", &vars, &w), "$ (gap)");
    }

    #[test]
    fn test_unterminated_call_left_verbatim() {
        let vars = VarMap::new();
        let w = world();
        assert_eq!(eval_functions("$numeq(1, 2", &vars, &w), "$numeq(1, 2");
    }

    #[test]
    fn test_random_in_range() {
        let vars = VarMap::new();
        let w = world();
        for _ in 0..20 {
            let out = eval_functions("$random(1, 3)", &vars, &w);
            let n: i64 = out.parse().unwrap();
            assert!((1..=3).contains(&n));
        }
        assert_eq!(eval_functions("$random(5, 1)", &vars, &w), "");
    }

    #[test]
    fn test_full_pipeline_vars_then_functions() {
        let mut vars = VarMap::new();
        vars.insert("A", "@C1");
        let w = world();
        assert_eq!(evaluate_text("$cap($name(%A%))", &vars, &w), "Alia");
    }
}
