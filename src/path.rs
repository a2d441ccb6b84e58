use core::fmt;

use serde::{Deserialize, Serialize};

use crate::ProcessId;

/// An ordered sequence of participant ids with no repeats, most recent
/// sender last. A path names one node of a participant's message tree: the
/// chain of processes a value travelled through to get here.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Path(Vec<ProcessId>);

impl Path {
    /// The canonical root of the message tree: the one-element path holding
    /// the source id.
    pub fn root(source_id: ProcessId) -> Self {
        Path(vec![source_id])
    }

    pub fn child(&self, id: ProcessId) -> Self {
        let mut ids = self.0.clone();
        ids.push(id);
        Path(ids)
    }

    /// The path with its final id dropped; `None` for the empty path.
    pub fn parent(&self) -> Option<Self> {
        self.0.split_last().map(|(_, init)| Path(init.to_vec()))
    }

    /// The process whose message this path's node records.
    pub fn originator(&self) -> Option<ProcessId> {
        self.0.last().copied()
    }

    /// Rank is path length minus one: the round this path's messages are
    /// sent in.
    pub fn rank(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: ProcessId) -> bool {
        self.0.contains(&id)
    }

    pub fn ids(&self) -> &[ProcessId] {
        &self.0
    }
}

impl From<Vec<ProcessId>> for Path {
    fn from(ids: Vec<ProcessId>) -> Self {
        Path(ids)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}
