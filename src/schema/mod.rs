//! The schema: ordered input and output parameter lists.
//!
//! A `Schema` is built once from the configuration, checked by the
//! [`validator`], and then shared read-only by every decode/encode call. Order is
//! significant: it is the on-the-wire field order.

pub mod sizing;
pub mod validator;

use serde::{Deserialize, Serialize};

use crate::types::ParameterDescriptor;

pub use sizing::{input_size, output_size, UNKNOWN_SIZE};
pub use validator::validate;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub inputs: Vec<ParameterDescriptor>,
    pub outputs: Vec<ParameterDescriptor>,
}

impl Schema {
    pub fn new(inputs: Vec<ParameterDescriptor>, outputs: Vec<ParameterDescriptor>) -> Self {
        Self { inputs, outputs }
    }

    /// Looks up an input descriptor by name.
    pub fn input(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.inputs.iter().find(|d| d.name == name)
    }
}
