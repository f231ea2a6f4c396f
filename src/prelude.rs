//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the kiseki crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use kiseki::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/graph.json")?;
//! let graph = RawGraph::from_json(&json)?.into_graph()?;
//!
//! let report = validate(&graph);
//! if !report.is_valid {
//!     return Err(format!("invalid graph: {:?}", report.errors).into());
//! }
//!
//! let steps = Engine::builder(graph, vec![5.0, 2.0, 9.0]).build().run();
//! println!("{}", TraceFormatter::format_trace(&steps));
//! # Ok(())
//! # }
//! ```

// Engine
pub use crate::engine::{Engine, EngineBuilder, EngineConfig, ExecutionContext, ExecutionOutcome};

// Graph model and authoring
pub use crate::graph::{
    Connection, ConnectionProposal, Graph, IntoGraph, Node, Position, RawGraph, ValidationReport,
    validate, validate_connection,
};

// Catalog
pub use crate::catalog::{HandleKind, NodeType};

// Trace
pub use crate::trace::{ElementState, Step, StepAction, StepEvent, TraceFormatter};

// Values
pub use crate::value::Value;

// Error types
pub use crate::error::{ConnectionRejection, ExecutionError, GraphConversionError, GraphError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
