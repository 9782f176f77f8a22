//! Block-diagram dataflow engine.
//!
//! Callers declare blocks with named, typed ports, wire ports together and let
//! the wavefront scheduler fire blocks until no block has all inputs
//! satisfied.
//!
//! # Architecture
//!
//! - [`Port`] / [`PortRegistry`] - per-type port templates, declared by
//!   [`Block::ports`] and inherited by building on a parent registry.
//! - [`Latch`] - one per (block, port). Holds the transient scheduling token
//!   and a [`CellId`] handle.
//! - [`ValueCell`] - the value shared by every latch wired together. At most
//!   one member may be an output. Cells live in the [`Wiring`] arena, so
//!   wiring and unwiring are handle reassignment.
//! - [`Graph`] - the registry: owns blocks, cohorts and the wiring arena for
//!   its whole lifetime.
//! - [`Graph::execute`] / [`Graph::async_execute`] - the wavefront loop.
//!
//! # Tokens
//!
//! Setting the token of an output latch marks every input latch in the same
//! cell. A block is ready once every one of its inputs holds a token.
//! Readiness is recomputed over the whole registry after each wavefront, and
//! all input tokens are cleared when a run ends.
//!
//! # Example
//!
//! ```rust
//! use syedra_core::{Block, BlockIo, Graph, PortRegistry, Result};
//!
//! struct Source;
//!
//! impl Block<i64> for Source {
//!     fn block_name(&self) -> &str {
//!         "Source"
//!     }
//!
//!     fn ports(&self) -> Result<PortRegistry<i64>> {
//!         Ok(PortRegistry::new().with_output("y", Some(0)))
//!     }
//!
//!     fn update(&mut self, io: &mut BlockIo<'_, i64>) -> Result<()> {
//!         io.set("y", 7)
//!     }
//! }
//!
//! struct Sink;
//!
//! impl Block<i64> for Sink {
//!     fn block_name(&self) -> &str {
//!         "Sink"
//!     }
//!
//!     fn ports(&self) -> Result<PortRegistry<i64>> {
//!         Ok(PortRegistry::new().with_input("x", Some(0)))
//!     }
//! }
//!
//! let mut graph = Graph::new();
//! let source = graph.add_block(Source)?;
//! let sink = graph.add_block(Sink)?;
//! graph.connect(source, "y", sink, "x")?;
//!
//! let report = graph.execute(&[source])?;
//! assert_eq!(report.wavefronts, 2);
//! assert_eq!(graph.get(sink, "x")?, Some(&7));
//! # Ok::<(), syedra_core::Error>(())
//! ```

pub mod block;
pub mod cell;
pub mod port;
mod registry;
pub mod schedule;

pub use block::{Block, BlockId, BlockIo};
pub use cell::{CellId, Latch, LatchId, ValueCell, Wiring};
pub use port::{Port, PortKind, PortRegistry};
pub use registry::Graph;
pub use schedule::{ExecuteOptions, ExecutionReport, Outcome};
