use serde::{Deserialize, Serialize};

use crate::Value;

/// One node of a participant's message tree. `input_value` is what the
/// messaging rounds delivered here; `output_value` is filled in by the
/// bottom-up reduction during the decision phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub input_value: Value,
    pub output_value: Value,
}

impl TreeNode {
    pub fn new(input_value: Value, output_value: Value) -> Self {
        Self {
            input_value,
            output_value,
        }
    }

    /// A freshly delivered node: the received value with an undecided
    /// output.
    pub fn received(value: Value) -> Self {
        Self::new(value, Value::Unknown)
    }
}
