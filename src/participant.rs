use std::collections::BTreeMap;
use std::rc::Rc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Error, Path, ProcessId, Result, Round, Scenario, Topology, TreeNode, Value};

/// The immutable context of a run: the scenario policy and the message-tree
/// topology, built once and shared read-only by every participant.
#[derive(Debug)]
pub struct Context<S> {
    pub scenario: S,
    pub topology: Topology,
}

impl<S: Scenario> Context<S> {
    pub fn new(scenario: S) -> Result<Self> {
        let topology = Topology::new(scenario.config())?;
        Ok(Self { scenario, topology })
    }
}

/// One delivery: `sender` tells `recipient` the value it heard along
/// `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: ProcessId,
    pub recipient: ProcessId,
    pub path: Path,
    pub node: TreeNode,
}

/// Where a participant is in its lifecycle. Rounds must arrive in order and
/// the decision is only available once round m has been sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Fresh,
    Messaged(Round),
    Decided(Value),
}

#[derive(Debug)]
pub struct Participant<S> {
    id: ProcessId,
    ctx: Rc<Context<S>>,
    nodes: BTreeMap<Path, TreeNode>,
    phase: Phase,
}

impl<S: Scenario> Participant<S> {
    pub fn new(id: ProcessId, ctx: Rc<Context<S>>) -> Self {
        let mut nodes = BTreeMap::new();
        if id == ctx.scenario.config().source_id {
            nodes.insert(ctx.topology.root().clone(), ctx.scenario.source_value());
        }
        Self {
            id,
            ctx,
            nodes,
            phase: Phase::Fresh,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn is_source(&self) -> bool {
        self.id == self.ctx.scenario.config().source_id
    }

    pub fn is_faulty(&self) -> bool {
        self.ctx.scenario.is_faulty(self.id)
    }

    /// The node recorded at `path`, if anything was ever delivered there.
    pub fn node(&self, path: &Path) -> Option<&TreeNode> {
        self.nodes.get(path)
    }

    pub(crate) fn context(&self) -> &Context<S> {
        &self.ctx
    }

    /// Produces this participant's round-`round` messages: for every path it
    /// originates this round, one delivery per recipient. The source never
    /// receives, and a sender records its own authentic view locally rather
    /// than messaging itself, so a faulty sender cannot overwrite its own
    /// record with a lie.
    pub fn send_round(&mut self, round: Round) -> Result<Vec<Message>> {
        let expected = match self.phase {
            Phase::Fresh => 0,
            Phase::Messaged(r) => r + 1,
            Phase::Decided(_) => return Err(Error::SendAfterDecide { id: self.id }),
        };
        let final_round = self.ctx.scenario.config().m;
        if round > final_round {
            return Err(Error::SendAfterFinalRound {
                id: self.id,
                final_round,
            });
        }
        if round != expected {
            return Err(Error::RoundOutOfOrder {
                expected,
                got: round,
            });
        }

        let ctx = Rc::clone(&self.ctx);
        let config = ctx.scenario.config();
        let mut outbound = Vec::new();

        for path in ctx.topology.paths_by_rank(round, self.id) {
            // What we are supposed to forward: our seeded root in round 0,
            // the node one hop up the path in every later round.
            let value_source_path = match path.parent() {
                Some(parent) if round > 0 => parent,
                _ => path.clone(),
            };
            let intended = self
                .nodes
                .get(&value_source_path)
                .ok_or_else(|| Error::MissingNode {
                    path: value_source_path.clone(),
                })?
                .input_value;

            // Our own record along this path keeps the authentic value,
            // whatever the scenario has us tell everyone else.
            self.nodes.insert(path.clone(), TreeNode::received(intended));

            for recipient in 0..config.n {
                if recipient == config.source_id || recipient == self.id {
                    continue;
                }
                let value = ctx.scenario.value_to_send(intended, self.id, recipient, path);
                if config.debug {
                    debug!(
                        "sending from process {} to {}: {{{},{},{}}}, value from source node {}",
                        self.id,
                        recipient,
                        value,
                        path,
                        Value::Unknown,
                        value_source_path
                    );
                }
                outbound.push(Message {
                    sender: self.id,
                    recipient,
                    path: path.clone(),
                    node: TreeNode::received(value),
                });
            }
        }

        self.phase = Phase::Messaged(round);
        Ok(outbound)
    }

    /// Records a delivered node, keyed by its full path. The schedule fires
    /// each (sender, recipient, path) triple exactly once, so nothing is
    /// ever overwritten in a conforming run.
    pub fn receive(&mut self, path: Path, node: TreeNode) {
        self.nodes.insert(path, node);
    }

    /// This participant's decision: the bottom-up majority reduction over
    /// its message tree, or its own seeded value if it is the source.
    /// Idempotent: the first decision is cached and later calls return it
    /// unchanged.
    pub fn decide(&mut self) -> Result<Value> {
        if let Phase::Decided(value) = self.phase {
            return Ok(value);
        }
        let final_round = self.ctx.scenario.config().m;
        match self.phase {
            Phase::Messaged(round) if round == final_round => (),
            _ => {
                return Err(Error::DecideBeforeFinalRound {
                    id: self.id,
                    final_round,
                })
            }
        }

        let ctx = Rc::clone(&self.ctx);
        let decision = if self.is_source() {
            // The source already holds the answer: its own seeded value.
            self.root_node(&ctx)?.input_value
        } else {
            self.reduce(&ctx)?
        };
        self.phase = Phase::Decided(decision);
        Ok(decision)
    }

    fn root_node(&self, ctx: &Context<S>) -> Result<&TreeNode> {
        let root = ctx.topology.root();
        self.nodes.get(root).ok_or_else(|| Error::MissingNode {
            path: root.clone(),
        })
    }

    fn reduce(&mut self, ctx: &Context<S>) -> Result<Value> {
        let config = ctx.scenario.config();

        // Leaves first: a leaf's output is whatever was delivered to it.
        for id in 0..config.n {
            for path in ctx.topology.paths_by_rank(config.m, id) {
                let node = self
                    .nodes
                    .get_mut(path)
                    .ok_or_else(|| Error::MissingNode { path: path.clone() })?;
                node.output_value = node.input_value;
            }
        }

        // Then fold majorities up the tree, one rank at a time.
        for rank in (0..config.m).rev() {
            for id in 0..config.n {
                for path in ctx.topology.paths_by_rank(rank, id) {
                    let majority = self.majority(ctx, path)?;
                    let node = self
                        .nodes
                        .get_mut(path)
                        .ok_or_else(|| Error::MissingNode { path: path.clone() })?;
                    node.output_value = majority;
                }
            }
        }

        Ok(self.root_node(ctx)?.output_value)
    }

    /// Strict majority over the children's output values. An exact
    /// zero/one split takes the scenario default; anything short of a
    /// strict majority is `Unknown`.
    fn majority(&self, ctx: &Context<S>, path: &Path) -> Result<Value> {
        let children = ctx.topology.children(path);
        let mut tally: BTreeMap<Value, usize> = BTreeMap::new();
        for child in children {
            let node = self.nodes.get(child).ok_or_else(|| Error::MissingNode {
                path: child.clone(),
            })?;
            *tally.entry(node.output_value).or_default() += 1;
        }

        let half = children.len() / 2;
        let ones = tally.get(&Value::One).copied().unwrap_or(0);
        let zeros = tally.get(&Value::Zero).copied().unwrap_or(0);
        if ones > half {
            Ok(Value::One)
        } else if zeros > half {
            Ok(Value::Zero)
        } else if ones == zeros && ones == half {
            Ok(ctx.scenario.default_value())
        } else {
            Ok(Value::Unknown)
        }
    }
}
