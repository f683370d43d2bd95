//! Description of the pipeline a host is about to run.
//!
//! Only the dataset names each node reads and writes are modelled; the
//! lifecycle hooks need nothing else.

use std::collections::BTreeSet;

/// A single pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

impl Node {
    pub fn new<I, O>(name: impl Into<String>, inputs: I, outputs: O) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Self {
            name: name.into(),
            inputs: inputs.into_iter().map(Into::into).collect(),
            outputs: outputs.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered collection of nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    pub nodes: Vec<Node>,
}

impl Pipeline {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Every dataset read by any node, intermediate ones included.
    pub fn all_inputs(&self) -> BTreeSet<String> {
        self.nodes.iter().flat_map(|n| n.inputs.iter().cloned()).collect()
    }

    /// Every dataset written by any node.
    pub fn all_outputs(&self) -> BTreeSet<String> {
        self.nodes.iter().flat_map(|n| n.outputs.iter().cloned()).collect()
    }
}
