use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::{Config, Path, ProcessId, Result, Round};

/// The static recursion tree of the protocol, built once and shared
/// read-only by every participant.
///
/// `children` maps every internal path to its child paths in ascending id
/// order; `paths_by_rank` lists, per (round, originator), the paths whose
/// messages that originator sends in that round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    m: usize,
    root: Path,
    children: BTreeMap<Path, Vec<Path>>,
    paths_by_rank: Vec<BTreeMap<ProcessId, Vec<Path>>>,
}

impl Topology {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let mut topology = Self {
            m: config.m,
            root: Path::root(config.source_id),
            children: Default::default(),
            paths_by_rank: vec![Default::default(); config.m + 1],
        };
        let ids = BTreeSet::from_iter(0..config.n);
        topology.enumerate(ids, config.source_id, Path::default(), 0, config.debug);
        Ok(topology)
    }

    // Each recursive call owns its copy of `available`: sibling branches
    // must observe the parent's set, not one mutated by an earlier sibling.
    fn enumerate(
        &mut self,
        mut available: BTreeSet<ProcessId>,
        originator: ProcessId,
        path: Path,
        rank: Round,
        debug: bool,
    ) {
        available.remove(&originator);
        let path = path.child(originator);
        self.paths_by_rank[rank]
            .entry(originator)
            .or_default()
            .push(path.clone());
        if rank < self.m {
            let branches = Vec::from_iter(available.iter().copied());
            for id in branches {
                self.enumerate(available.clone(), id, path.clone(), rank + 1, debug);
                self.children
                    .entry(path.clone())
                    .or_default()
                    .push(path.child(id));
            }
        }
        if debug {
            debug!("{}, children = {:?}", path, self.children(&path));
        }
    }

    /// The one-element path holding the source id.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The final messaging round, m.
    pub fn final_round(&self) -> Round {
        self.m
    }

    /// Child paths of `path`, in ascending id order; empty for leaves.
    pub fn children(&self, path: &Path) -> &[Path] {
        self.children.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Paths of rank `rank` whose final element is `id`.
    pub fn paths_by_rank(&self, rank: Round, id: ProcessId) -> &[Path] {
        self.paths_by_rank
            .get(rank)
            .and_then(|by_originator| by_originator.get(&id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
