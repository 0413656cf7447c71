//! Suspended-run scheduler
//!
//! Runs that hit a `pause` park here until their resume time passes. The
//! world validates owner liveness before re-entering a run; `stop` and
//! entity destruction discard pending resumes outright.

use wyldmud_core::ActorId;
use wyldmud_scripting::ScriptRun;

#[derive(Default)]
pub struct Scheduler {
    parked: Vec<ScriptRun>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn park(&mut self, run: ScriptRun) {
        self.parked.push(run);
    }

    /// Remove and return every run whose wait has elapsed, oldest first
    pub fn take_due(&mut self, now: f64) -> Vec<ScriptRun> {
        let mut due = Vec::new();
        let mut remaining = Vec::with_capacity(self.parked.len());
        for run in self.parked.drain(..) {
            if run.due(now) {
                due.push(run);
            } else {
                remaining.push(run);
            }
        }
        self.parked = remaining;
        due
    }

    /// Drop every pending resume owned by `actor`
    pub fn discard_for(&mut self, actor: ActorId) -> usize {
        let before = self.parked.len();
        self.parked.retain(|run| run.actor() != actor);
        before - self.parked.len()
    }

    pub fn pending(&self) -> usize {
        self.parked.len()
    }
}
