//! Script body parser
//!
//! A body is parsed once per trigger and shared by every firing. The
//! grammar is line-oriented: each non-empty line is a command, `#` starts a
//! comment, `pause <units>` is a suspension point, and
//! `$if(subject, operator, predicate) { ... } else { ... }` opens nested
//! blocks. Structural problems (unbalanced braces, a condition that is not
//! a triple) are errors here so the loader can disable the trigger instead
//! of running corrupted logic.

use std::str::FromStr;
use std::sync::Arc;

use crate::criteria::CriterionOp;
use crate::error::{Result, ScriptError};
use crate::pattern::Pattern;
use crate::scan;

/// A parsed sequence of statements, shared between firings
pub type Block = Arc<Vec<Stmt>>;

/// One script statement
#[derive(Debug, Clone)]
pub enum Stmt {
    /// A command line, resolved and dispatched at run time
    Command(String),

    /// Conditional with one evaluated condition and at most one taken branch
    If {
        subject: String,
        /// Raw operator text; may itself contain `%var%`/`$fn(...)`
        operator: String,
        predicate: String,
        then_block: Block,
        else_block: Option<Block>,
    },

    /// Cooperative suspension for a (possibly computed) number of units
    Pause(String),
}

/// A parsed script body
#[derive(Debug, Clone)]
pub struct Script {
    pub root: Block,
}

impl Script {
    /// Parse a body. Errors are structural; evaluation-time anomalies are
    /// not detected here.
    pub fn parse(source: &str) -> Result<Self> {
        let mut parser = Parser { src: source, pos: 0 };
        let stmts = parser.parse_block(false)?;
        Ok(Self {
            root: Arc::new(stmts),
        })
    }

    /// A script with no statements; running it is a no-op
    pub fn empty() -> Self {
        Self {
            root: Arc::new(Vec::new()),
        }
    }

    /// Whether the body contains no statements at all
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn line(&self) -> usize {
        self.src[..self.pos].matches('\n').count() + 1
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn parse_block(&mut self, in_braces: bool) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            self.skip_ws();
            let rest = self.rest();
            if rest.is_empty() {
                if in_braces {
                    return Err(ScriptError::ParseError {
                        line: self.line(),
                        message: "missing closing '}'".into(),
                    });
                }
                break;
            }
            if rest.starts_with('}') {
                if in_braces {
                    self.pos += 1;
                    break;
                }
                return Err(ScriptError::ParseError {
                    line: self.line(),
                    message: "unmatched '}'".into(),
                });
            }
            if is_if_start(rest) {
                stmts.push(self.parse_if()?);
                continue;
            }
            let end = rest.find(['\n', '}']).unwrap_or(rest.len());
            let line_text = rest[..end].trim();
            self.pos += end;
            if line_text.is_empty() || line_text.starts_with('#') {
                continue;
            }
            if let Some(duration) = line_text.strip_prefix("pause") {
                if duration.is_empty() || duration.starts_with(char::is_whitespace) {
                    stmts.push(Stmt::Pause(duration.trim().to_string()));
                    continue;
                }
            }
            stmts.push(Stmt::Command(line_text.to_string()));
        }
        Ok(stmts)
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        let start_line = self.line();
        self.pos += 3; // "$if"
        self.skip_ws();
        let rest = self.rest();
        let close = scan::find_matching_paren(rest, 0).ok_or(ScriptError::ParseError {
            line: start_line,
            message: "unterminated condition".into(),
        })?;
        let condition = &rest[1..close];
        let parts = scan::split_top_level(condition, ',');
        if parts.len() != 3 {
            return Err(ScriptError::MalformedCondition(condition.to_string()));
        }
        let subject = parts[0].trim().to_string();
        let operator = parts[1].trim().to_string();
        let predicate = parts[2].trim().to_string();
        validate_static(&operator, &predicate)?;
        self.pos += close + 1;

        self.skip_ws();
        if !self.rest().starts_with('{') {
            return Err(ScriptError::ParseError {
                line: self.line(),
                message: "expected '{' after condition".into(),
            });
        }
        self.pos += 1;
        let then_block = Arc::new(self.parse_block(true)?);

        let saved = self.pos;
        self.skip_ws();
        let else_block = match self.rest().strip_prefix("else") {
            Some(after)
                if !after
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') =>
            {
                self.pos += 4;
                self.skip_ws();
                if !self.rest().starts_with('{') {
                    return Err(ScriptError::ParseError {
                        line: self.line(),
                        message: "expected '{' after else".into(),
                    });
                }
                self.pos += 1;
                Some(Arc::new(self.parse_block(true)?))
            }
            _ => {
                self.pos = saved;
                None
            }
        };

        Ok(Stmt::If {
            subject,
            operator,
            predicate,
            then_block,
            else_block,
        })
    }
}

fn is_if_start(rest: &str) -> bool {
    rest.strip_prefix("$if")
        .is_some_and(|after| after.trim_start().starts_with('('))
}

/// Pin down what can be pinned at parse time: an operator written as plain
/// text must be a known one, and a plain-text `contains` predicate must be
/// a well-formed pattern. Dynamic parts are checked at evaluation.
fn validate_static(operator: &str, predicate: &str) -> Result<()> {
    if has_dynamic_parts(operator) {
        return Ok(());
    }
    let op = CriterionOp::from_str(operator)?;
    if op == CriterionOp::Contains && !has_dynamic_parts(predicate) {
        Pattern::parse(predicate)?;
    }
    Ok(())
}

pub(crate) fn has_dynamic_parts(text: &str) -> bool {
    text.contains('%') || text.contains('$')
}
