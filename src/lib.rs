//! # Kiseki - Node-Graph Execution Engine
//!
//! **Kiseki** runs small algorithms assembled from typed, connectable nodes and
//! replays their execution as a deterministic trace of visualization steps.
//! A graph mixes two kinds of edges: execution edges order control flow, data
//! edges carry values between nodes. The engine walks execution edges from the
//! start node, resolves data inputs on demand, and records an immutable
//! [`Step`](trace::Step) snapshot of the working array at every node.
//!
//! ## Core Workflow
//!
//! 1.  **Author a Graph**: Build a [`Graph`](graph::Graph) with the authoring API, or
//!     load an editor export and convert it through [`IntoGraph`](graph::IntoGraph).
//! 2.  **Validate**: [`validate`](graph::validate) reports missing start/end nodes and
//!     other authoring mistakes before anything runs.
//! 3.  **Run**: Create an [`Engine`](engine::Engine) with the graph and an initial
//!     array, then call `run()` to get the step trace.
//! 4.  **Play Back**: Hand the steps to a renderer; each step is a full snapshot, so
//!     playback can seek freely.
//!
//! ## Quick Start
//!
//! ```rust
//! use kiseki::prelude::*;
//!
//! fn main() -> std::result::Result<(), GraphError> {
//!     let mut graph = Graph::new();
//!     let start = graph.add_node(NodeType::Start, Position::new(0.0, 0.0));
//!     let swap = graph.add_node(NodeType::ArraySwap, Position::new(200.0, 0.0));
//!     let end = graph.add_node(NodeType::End, Position::new(400.0, 0.0));
//!
//!     graph.connect(&start, "exec-out", &swap, "exec-in")?;
//!     graph.connect(&swap, "exec-out", &end, "exec-in")?;
//!
//!     let steps = Engine::builder(graph, vec![3.0, 1.0, 2.0]).build().run();
//!
//!     let last = steps.last().unwrap();
//!     assert!(last.is_event(StepEvent::Completed));
//!     assert_eq!(last.values(), vec![1.0, 3.0, 2.0]);
//!     println!("{}", TraceFormatter::format_trace(&steps));
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod engine;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod trace;
pub mod value;
