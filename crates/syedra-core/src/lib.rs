//! Syedra Core - block-diagram dataflow runtime
//!
//! This crate provides the engine behind syedra block diagrams: typed ports,
//! shared value cells, a block registry with execution cohorts, a wavefront
//! scheduler in synchronous and cooperative-asynchronous flavours, and a
//! declarative state-machine engine for sequencing inside a block.
//!
//! # Core Abstractions
//!
//! ## Blocks and Ports
//!
//! - [`Block`] - Capability contract: declared ports plus an update
//! - [`PortRegistry`] - Named [`Port`] templates (input, output, proxy)
//! - [`BlockIo`] - Port access handed to a block's update
//!
//! ## Wiring
//!
//! - [`Latch`] - Per-block instance of a port, carrying the scheduling token
//! - [`ValueCell`] - Value shared by every latch wired together
//! - [`Wiring`] - Arena of latches and cells owned by the graph
//!
//! ## Scheduling
//!
//! - [`Graph`] - Registry of blocks and their wiring
//! - [`Graph::execute`] / [`Graph::async_execute`] - Wavefront propagation
//! - [`ExecuteOptions`] - Scheduler limits
//! - [`ExecutionReport`] - Wavefront and update counts of a run
//!
//! ## State Machines
//!
//! - [`fsm::MachineBuilder`] - Declarative states, events and transitions
//! - [`fsm::Machine`] - Compiled machine with a single-step `update`
//!
//! # Features
//!
//! - `tracing` (default) - debug logging of graph mutations and wavefronts
//!
//! # Threading
//!
//! A [`Graph`] is single-threaded: value cells are unsynchronised and the
//! graph is neither `Send` nor `Sync`. The asynchronous scheduler is meant for
//! a current-thread runtime or a `LocalSet`.

pub mod error;
pub mod fsm;
pub mod graph;

pub use error::{BoxError, Error, Result};
pub use graph::{
    Block, BlockId, BlockIo, CellId, ExecuteOptions, ExecutionReport, Graph, Latch, LatchId,
    Outcome, Port, PortKind, PortRegistry, ValueCell, Wiring,
};
