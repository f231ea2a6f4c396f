//! The execution engine: walks a node graph from its start node and records
//! a trace of visualization steps.

mod comparator;
pub mod context;
mod description;
mod dispatch;
mod index;
mod loops;
mod resolver;

pub use comparator::Comparator;
pub use context::{ExecutionContext, LoopFrame};

use crate::error::ExecutionError;
use crate::graph::{Connection, Graph, Node};
use crate::trace::Step;
use crate::value::Value;
use dispatch::Run;
use index::GraphIndex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Run-level settings. The default imposes no step limit.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Aborts the run with [`ExecutionError::StepLimitExceeded`] once this
    /// many steps have been recorded.
    pub step_limit: Option<usize>,
    /// Bindings present before the start node runs.
    pub initial_variables: Vec<(String, Value)>,
}

/// Everything a run leaves behind. The steps are the trace handed to
/// playback; the rest is for embedding callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    pub steps: Vec<Step>,
    /// Final bindings, sorted by name.
    pub variables: BTreeMap<String, Value>,
    pub final_array: Vec<f64>,
    pub completed: bool,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<ExecutionError>,
}

fn serialize_error<S: serde::Serializer>(
    error: &Option<ExecutionError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Executes an authored graph against an initial array.
///
/// An `Engine` holds only read-only inputs; every call to [`run`](Self::run)
/// or [`execute`](Self::execute) starts from a fresh [`ExecutionContext`].
pub struct Engine {
    graph: Graph,
    initial_array: Vec<f64>,
    config: EngineConfig,
}

pub struct EngineBuilder {
    graph: Graph,
    initial_array: Vec<f64>,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new(graph: Graph, initial_array: Vec<f64>) -> Self {
        Self {
            graph,
            initial_array,
            config: EngineConfig::default(),
        }
    }

    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.config.step_limit = Some(limit);
        self
    }

    pub fn with_initial_variable(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.config
            .initial_variables
            .push((name.to_string(), value.into()));
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            graph: self.graph,
            initial_array: self.initial_array,
            config: self.config,
        }
    }
}

impl Engine {
    pub fn new(nodes: Vec<Node>, connections: Vec<Connection>, initial_array: Vec<f64>) -> Self {
        Self::builder(Graph::from_parts(nodes, connections), initial_array).build()
    }

    pub fn builder(graph: Graph, initial_array: Vec<f64>) -> EngineBuilder {
        EngineBuilder::new(graph, initial_array)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Runs the graph and returns its trace. Never panics or fails: fatal
    /// errors end the trace with an error-flagged step.
    pub fn run(&self) -> Vec<Step> {
        self.execute().steps
    }

    /// Runs the graph and returns the trace together with the final context.
    pub fn execute(&self) -> ExecutionOutcome {
        let index = GraphIndex::new(&self.graph.nodes, &self.graph.connections);
        let mut context = ExecutionContext::new(&self.initial_array);
        for (name, value) in &self.config.initial_variables {
            context.set_variable(name.clone(), value.clone());
        }

        let run = Run::new(&index, context, self.config.step_limit);
        let (context, recorder) = run.execute(&self.graph);

        ExecutionOutcome {
            steps: recorder.into_steps(),
            completed: context.is_complete,
            final_array: context.current_array,
            variables: context.variables.into_iter().collect(),
            error: context.error,
        }
    }
}
