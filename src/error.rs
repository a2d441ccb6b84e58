use thiserror::Error;

use crate::{Path, ProcessId, Round};

#[derive(Error, Debug)]
pub enum Error {
    #[error("We experienced an IO error")]
    IO(#[from] std::io::Error),
    #[error("The simulation requires at least one participant")]
    NoParticipants,
    #[error("Source id {source_id} is out of range for {n} participants")]
    SourceOutOfRange { source_id: ProcessId, n: usize },
    #[error("Recursion depth {m} is too deep for {n} participants")]
    DepthExceedsParticipants { m: usize, n: usize },
    #[error("Round {got} was sent out of order, expected round {expected}")]
    RoundOutOfOrder { expected: Round, got: Round },
    #[error("Participant {id} has already sent the final round {final_round}")]
    SendAfterFinalRound { id: ProcessId, final_round: Round },
    #[error("Participant {id} cannot send messages after deciding")]
    SendAfterDecide { id: ProcessId },
    #[error("Participant {id} cannot decide before completing round {final_round}")]
    DecideBeforeFinalRound { id: ProcessId, final_round: Round },
    #[error("No node recorded at path {path}, the topology and messaging schedule disagree")]
    MissingNode { path: Path },
    #[error("There is no participant with id {0}")]
    UnknownParticipant(ProcessId),
}
