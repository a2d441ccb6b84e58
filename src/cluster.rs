use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::{Context, Error, Participant, ProcessId, Result, Round, Scenario, Value};

/// The whole simulated network: every participant plus the shared context,
/// driven one synchronous round at a time.
#[derive(Debug)]
pub struct Cluster<S> {
    ctx: Rc<Context<S>>,
    procs: Vec<Participant<S>>,
}

/// One line of the end-of-run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ProcessId,
    pub is_source: bool,
    pub is_faulty: bool,
    /// `None` for faulty participants, whose decision is never consulted.
    pub decision: Option<Value>,
}

impl<S: Scenario> Cluster<S> {
    pub fn new(scenario: S) -> Result<Self> {
        let ctx = Rc::new(Context::new(scenario)?);
        let procs = (0..ctx.scenario.config().n)
            .map(|id| Participant::new(id, Rc::clone(&ctx)))
            .collect();
        Ok(Self { ctx, procs })
    }

    pub fn participants(&self) -> &[Participant<S>] {
        &self.procs
    }

    pub fn participant(&self, id: ProcessId) -> Option<&Participant<S>> {
        self.procs.get(id)
    }

    pub fn participant_mut(&mut self, id: ProcessId) -> Option<&mut Participant<S>> {
        self.procs.get_mut(id)
    }

    /// Runs one messaging round: participants send in ascending id order,
    /// and every delivery lands before the next sender runs. All of round
    /// `r` must complete before round `r + 1` starts.
    pub fn run_round(&mut self, round: Round) -> Result<()> {
        for id in 0..self.procs.len() {
            let outbound = self.procs[id].send_round(round)?;
            for message in outbound {
                let recipient = message.recipient;
                self.procs
                    .get_mut(recipient)
                    .ok_or(Error::UnknownParticipant(recipient))?
                    .receive(message.path, message.node);
            }
        }
        Ok(())
    }

    /// Runs every messaging round, 0 through m.
    pub fn run(&mut self) -> Result<()> {
        for round in 0..=self.ctx.scenario.config().m {
            self.run_round(round)?;
        }
        Ok(())
    }

    /// Decides every non-faulty participant and summarizes the run.
    pub fn report(&mut self) -> Result<Vec<Report>> {
        let mut reports = Vec::with_capacity(self.procs.len());
        for proc in self.procs.iter_mut() {
            let decision = if proc.is_faulty() {
                None
            } else {
                Some(proc.decide()?)
            };
            reports.push(Report {
                id: proc.id(),
                is_source: proc.is_source(),
                is_faulty: proc.is_faulty(),
                decision,
            });
        }
        Ok(reports)
    }
}
