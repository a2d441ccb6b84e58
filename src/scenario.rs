use serde::{Deserialize, Serialize};

use crate::{Error, Path, ProcessId, Result, TreeNode, Value};

/// Startup parameters shared by every scenario: how many participants, how
/// many messaging rounds beyond the source broadcast, which participant is
/// the source, and whether to emit per-delivery traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub n: usize,
    pub m: usize,
    pub source_id: ProcessId,
    pub debug: bool,
}

impl Config {
    pub fn new(n: usize, m: usize, source_id: ProcessId) -> Self {
        Self {
            n,
            m,
            source_id,
            debug: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(Error::NoParticipants);
        }
        if self.source_id >= self.n {
            return Err(Error::SourceOutOfRange {
                source_id: self.source_id,
                n: self.n,
            });
        }
        // A path holds m + 1 distinct ids, so the tree can never reach
        // rank m once m catches up with n.
        if self.m >= self.n {
            return Err(Error::DepthExceedsParticipants {
                m: self.m,
                n: self.n,
            });
        }
        Ok(())
    }
}

/// The injectable adversary plus run parameters. A non-faulty participant's
/// `value_to_send` must be the identity on `intended`; a faulty one may
/// return any function of the four arguments.
pub trait Scenario {
    fn config(&self) -> &Config;

    /// The true root node of the source. If the source is faulty this only
    /// defines what it was *supposed* to say.
    fn source_value(&self) -> TreeNode;

    /// The value `sender` actually delivers to `receiver` along `path` when
    /// it was supposed to forward `intended`.
    fn value_to_send(
        &self,
        intended: Value,
        sender: ProcessId,
        receiver: ProcessId,
        path: &Path,
    ) -> Value;

    /// Tie-break default, consulted only on an exact zero/one split. Must be
    /// the same fixed value for every participant.
    fn default_value(&self) -> Value;

    fn is_faulty(&self, id: ProcessId) -> bool;
}

/// Every participant forwards faithfully.
#[derive(Debug, Clone)]
pub struct HonestScenario {
    pub config: Config,
    pub value: Value,
    pub default: Value,
}

impl Scenario for HonestScenario {
    fn config(&self) -> &Config {
        &self.config
    }

    fn source_value(&self) -> TreeNode {
        TreeNode::new(self.value, Value::Unknown)
    }

    fn value_to_send(
        &self,
        intended: Value,
        _sender: ProcessId,
        _receiver: ProcessId,
        _path: &Path,
    ) -> Value {
        intended
    }

    fn default_value(&self) -> Value {
        self.default
    }

    fn is_faulty(&self, _id: ProcessId) -> bool {
        false
    }
}

/// The classic two-traitor run: the source splits its broadcast by receiver
/// parity and lieutenant 2 pushes `One` no matter what it heard. The source
/// was supposed to say `Zero`; ties break to `One`.
#[derive(Debug, Clone)]
pub struct ReferenceScenario {
    config: Config,
}

const LYING_LIEUTENANT: ProcessId = 2;

impl ReferenceScenario {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl Scenario for ReferenceScenario {
    fn config(&self) -> &Config {
        &self.config
    }

    fn source_value(&self) -> TreeNode {
        TreeNode::new(Value::Zero, Value::Unknown)
    }

    fn value_to_send(
        &self,
        intended: Value,
        sender: ProcessId,
        receiver: ProcessId,
        _path: &Path,
    ) -> Value {
        if sender == self.config.source_id {
            if receiver % 2 == 0 {
                Value::One
            } else {
                Value::Zero
            }
        } else if sender == LYING_LIEUTENANT {
            Value::One
        } else {
            intended
        }
    }

    fn default_value(&self) -> Value {
        Value::One
    }

    fn is_faulty(&self, id: ProcessId) -> bool {
        id == self.config.source_id || id == LYING_LIEUTENANT
    }
}
