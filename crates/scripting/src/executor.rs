//! Script executor
//!
//! One [`ScriptRun`] per trigger firing. A run walks its statement frames
//! until the body completes or a `pause` suspends it; the surrounding
//! scheduler re-enters suspended runs on a later tick. Suspension is
//! cooperative: the run records a resume time and returns, so independent
//! runs interleave freely within one game loop.

use std::str::FromStr;

use tracing::{debug, warn};

use wyldmud_core::ActorId;

use crate::context::{ExecutionContext, VarMap};
use crate::criteria::{evaluate_condition, CriterionOp};
use crate::funcs::{evaluate_text, WorldQuery};
use crate::scan;
use crate::script::{Block, Script, Stmt};

/// Run lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    Running,
    Suspended { resume_at: f64 },
    Complete,
}

/// World surface a run needs while executing: read-only queries plus
/// command dispatch and the world clock. Owned by the surrounding engine.
pub trait ScriptHost: WorldQuery {
    /// Dispatch one resolved command. Returns false when the command is
    /// unknown or rejected; the executor logs and continues either way.
    fn perform(&mut self, actor: ActorId, command: &str, args: &[String]) -> bool;

    /// Monotonic world clock, in the same units `pause` counts
    fn now(&self) -> f64;

    /// Longest a single pause may suspend
    fn pause_ceiling(&self) -> f64 {
        60.0
    }
}

#[derive(Debug, Clone)]
struct Frame {
    block: Block,
    pc: usize,
}

/// A resumable execution of one script body
#[derive(Debug, Clone)]
pub struct ScriptRun {
    ctx: ExecutionContext,
    vars: VarMap,
    frames: Vec<Frame>,
    state: RunState,
}

impl ScriptRun {
    pub fn new(script: &Script, ctx: ExecutionContext) -> Self {
        let vars = ctx.var_map();
        Self {
            ctx,
            vars,
            frames: vec![Frame {
                block: script.root.clone(),
                pc: 0,
            }],
            state: RunState::Running,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Owner of the trigger this run belongs to
    pub fn actor(&self) -> ActorId {
        self.ctx.actor.id
    }

    /// Whether a suspended run's wait has elapsed
    pub fn due(&self, now: f64) -> bool {
        matches!(self.state, RunState::Suspended { resume_at } if now >= resume_at)
    }

    /// Execute statements until the body completes or suspends.
    pub fn resume<H: ScriptHost + ?Sized>(&mut self, host: &mut H) -> &RunState {
        self.state = RunState::Running;
        loop {
            let Some(frame) = self.frames.last_mut() else {
                self.state = RunState::Complete;
                break;
            };
            if frame.pc >= frame.block.len() {
                self.frames.pop();
                continue;
            }
            let stmt = frame.block[frame.pc].clone();
            frame.pc += 1;
            match stmt {
                Stmt::Command(line) => self.dispatch(&line, host),
                Stmt::If {
                    subject,
                    operator,
                    predicate,
                    then_block,
                    else_block,
                } => {
                    let taken = if self.test(&subject, &operator, &predicate, host) {
                        Some(then_block)
                    } else {
                        else_block
                    };
                    if let Some(block) = taken {
                        self.frames.push(Frame { block, pc: 0 });
                    }
                }
                Stmt::Pause(duration) => {
                    let resolved = evaluate_text(&duration, &self.vars, &*host);
                    let units = resolved.trim().parse::<f64>().unwrap_or(0.0);
                    if units > 0.0 {
                        let units = units.min(host.pause_ceiling());
                        self.state = RunState::Suspended {
                            resume_at: host.now() + units,
                        };
                        debug!(actor = %self.actor(), units, "script suspended");
                        return &self.state;
                    }
                    warn!(actor = %self.actor(), duration = %resolved, "ignoring non-positive pause");
                }
            }
        }
        &self.state
    }

    fn test<H: ScriptHost + ?Sized>(
        &self,
        subject: &str,
        operator: &str,
        predicate: &str,
        host: &H,
    ) -> bool {
        let subject = evaluate_text(subject, &self.vars, host);
        let operator = evaluate_text(operator, &self.vars, host);
        let predicate = evaluate_text(predicate, &self.vars, host);
        match CriterionOp::from_str(&operator) {
            Ok(op) => evaluate_condition(&subject, op, &predicate),
            Err(err) => {
                warn!(%err, "condition operator did not resolve, taking else branch");
                false
            }
        }
    }

    fn dispatch<H: ScriptHost + ?Sized>(&self, line: &str, host: &mut H) {
        let resolved = evaluate_text(line, &self.vars, &*host);
        let parts = scan::split_preserving_quotes(&resolved);
        let Some((command, args)) = parts.split_first() else {
            return;
        };
        if !host.perform(self.actor(), command, args) {
            warn!(actor = %self.actor(), command = %command, "script command rejected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wyldmud_core::{ActorKind, VarScope};

    use crate::context::ActorBinding;

    /// Host stub recording dispatched commands
    #[derive(Default)]
    struct RecordingHost {
        commands: Vec<(ActorId, String, Vec<String>)>,
        vars: std::collections::HashMap<(String, String), String>,
        clock: f64,
    }

    impl WorldQuery for RecordingHost {
        fn name_of(&self, _r: &str) -> Option<String> {
            None
        }
        fn equipped(&self, _r: &str, _s: &str) -> Option<String> {
            None
        }
        fn has_item(&self, _r: &str, _i: &str) -> bool {
            false
        }
        fn room_of(&self, _r: &str) -> Option<String> {
            None
        }
        fn zone_of(&self, _r: &str) -> Option<String> {
            None
        }
        fn scoped_var(&self, _scope: VarScope, reference: &str, name: &str) -> Option<String> {
            self.vars
                .get(&(reference.to_string(), name.to_string()))
                .cloned()
        }
    }

    impl ScriptHost for RecordingHost {
        fn perform(&mut self, actor: ActorId, command: &str, args: &[String]) -> bool {
            if command == "settempvar" {
                self.vars.insert(
                    (args[0].clone(), args[1].clone()),
                    args[2..].join(" "),
                );
            }
            self.commands
                .push((actor, command.to_string(), args.to_vec()));
            command != "reject_me"
        }
        fn now(&self) -> f64 {
            self.clock
        }
    }

    fn ctx(id: u64) -> ExecutionContext {
        ExecutionContext::new(ActorBinding::new(
            ActorId::new(id),
            ActorKind::Character,
            "tester",
        ))
    }

    #[test]
    fn test_sequential_commands() {
        let script = Script::parse("say one\nsay two\n").unwrap();
        let mut host = RecordingHost::default();
        let mut run = ScriptRun::new(&script, ctx(1));
        assert_eq!(run.resume(&mut host), &RunState::Complete);
        assert_eq!(host.commands.len(), 2);
        assert_eq!(host.commands[0].1, "say");
        assert_eq!(host.commands[0].2, vec!["one"]);
    }

    #[test]
    fn test_exactly_one_branch_runs() {
        let src = "$if(1, numeq, 1) { say yes } else { say no }";
        let script = Script::parse(src).unwrap();
        let mut host = RecordingHost::default();
        ScriptRun::new(&script, ctx(1)).resume(&mut host);
        assert_eq!(host.commands.len(), 1);
        assert_eq!(host.commands[0].2, vec!["yes"]);

        let src = "$if(1, numeq, 2) { say yes } else { say no }";
        let script = Script::parse(src).unwrap();
        let mut host = RecordingHost::default();
        ScriptRun::new(&script, ctx(1)).resume(&mut host);
        assert_eq!(host.commands.len(), 1);
        assert_eq!(host.commands[0].2, vec!["no"]);
    }

    #[test]
    fn test_vars_set_in_branch_visible_after_block() {
        let src = "$if(1, numeq, 1) { settempvar @C1 seen yes }\nsay $tempvar(@C1, seen)";
        let script = Script::parse(src).unwrap();
        let mut host = RecordingHost::default();
        ScriptRun::new(&script, ctx(1)).resume(&mut host);
        let last = host.commands.last().unwrap();
        assert_eq!(last.1, "say");
        assert_eq!(last.2, vec!["yes"]);
    }

    #[test]
    fn test_pause_suspends_and_resumes() {
        let script = Script::parse("say before\npause 5\nsay after\n").unwrap();
        let mut host = RecordingHost::default();
        let mut run = ScriptRun::new(&script, ctx(1));
        match run.resume(&mut host) {
            RunState::Suspended { resume_at } => assert_eq!(*resume_at, 5.0),
            other => panic!("expected suspension, got {:?}", other),
        }
        assert_eq!(host.commands.len(), 1);
        assert!(!run.due(4.0));
        assert!(run.due(5.0));

        host.clock = 5.0;
        assert_eq!(run.resume(&mut host), &RunState::Complete);
        assert_eq!(host.commands.len(), 2);
        assert_eq!(host.commands[1].2, vec!["after"]);
    }

    #[test]
    fn test_pause_capped_at_ceiling() {
        let script = Script::parse("pause 9999\n").unwrap();
        let mut host = RecordingHost::default();
        let mut run = ScriptRun::new(&script, ctx(1));
        match run.resume(&mut host) {
            RunState::Suspended { resume_at } => assert_eq!(*resume_at, 60.0),
            other => panic!("expected suspension, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_pause_skipped() {
        let script = Script::parse("pause soon\nsay done\n").unwrap();
        let mut host = RecordingHost::default();
        let mut run = ScriptRun::new(&script, ctx(1));
        assert_eq!(run.resume(&mut host), &RunState::Complete);
        assert_eq!(host.commands.len(), 1);
    }

    #[test]
    fn test_rejected_command_does_not_stop_run() {
        let script = Script::parse("reject_me now\nsay still here\n").unwrap();
        let mut host = RecordingHost::default();
        let mut run = ScriptRun::new(&script, ctx(1));
        assert_eq!(run.resume(&mut host), &RunState::Complete);
        assert_eq!(host.commands.len(), 2);
    }

    #[test]
    fn test_suspend_inside_nested_branch() {
        let src = "$if(1, numeq, 1) { say in\npause 2\nsay deep }\nsay tail";
        let script = Script::parse(src).unwrap();
        let mut host = RecordingHost::default();
        let mut run = ScriptRun::new(&script, ctx(1));
        assert!(matches!(run.resume(&mut host), RunState::Suspended { .. }));
        host.clock = 2.0;
        assert_eq!(run.resume(&mut host), &RunState::Complete);
        let said: Vec<_> = host.commands.iter().map(|c| c.2.join(" ")).collect();
        assert_eq!(said, vec!["in", "deep", "tail"]);
    }
}
