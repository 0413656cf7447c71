//! # WyldMUD Scripting System
//!
//! This crate is the trigger-matching and script-execution core.
//!
//! ## Pipeline
//! - Variable resolution: `%name%` placeholders expanded from a per-firing
//!   context, single pass, unresolved names left verbatim
//! - Function evaluation: `$name(args)` calls, nested depth-first, soft
//!   failure on bad arguments
//! - Criteria matching: ordered (subject, operator, predicate) triples,
//!   short-circuit AND, with a group/alternation grammar for `contains`
//! - Script execution: sequential commands, `$if(...)` blocks, and `pause`
//!   suspension points, resumable across ticks
//!
//! Game state is reached only through the [`WorldQuery`] and [`ScriptHost`]
//! traits; the crate itself holds no world data.

pub mod error;
pub mod context;
pub mod scan;
pub mod resolve;
pub mod funcs;
pub mod pattern;
pub mod criteria;
pub mod script;
pub mod executor;

pub use error::{ScriptError, Result};
pub use context::{ActorBinding, ExecutionContext, VarMap};
pub use resolve::resolve_vars;
pub use funcs::{eval_functions, evaluate_text, WorldQuery};
pub use pattern::Pattern;
pub use criteria::{Criterion, CriterionOp, evaluate_condition};
pub use script::{Block, Script, Stmt};
pub use executor::{RunState, ScriptHost, ScriptRun};
