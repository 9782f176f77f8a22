//! Error types for graph, scheduler and state-machine operations.

use thiserror::Error;

use crate::graph::BlockId;

/// Boxed error raised by client block code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while declaring, wiring, scheduling or running blocks
/// and state machines.
#[derive(Debug, Error)]
pub enum Error {
    /// A port was read before the registry assigned it a name.
    #[error("port has not been set up")]
    NotSetUp,

    /// Lookup of an unknown port name on a block.
    #[error("port '{port}' does not exist in block '{block}'")]
    PortDoesNotExist {
        /// Name of the block that was searched.
        block: String,
        /// Port name that was not found.
        port: String,
    },

    /// Write attempt on a port that is not an output.
    #[error("port '{port}' on block '{block}' is immutable")]
    ImmutablePort {
        /// Name of the block owning the port.
        block: String,
        /// Name of the port that rejected the write.
        port: String,
    },

    /// An initial value was supplied for a proxy port.
    #[error("proxy ports cannot be initialized")]
    CannotInitialize,

    /// A dynamically added port collides with an existing name.
    #[error("port name conflict in block '{block}': '{port}' already exists")]
    NameConflict {
        /// Name of the block receiving the port.
        block: String,
        /// Conflicting port name.
        port: String,
    },

    /// Both cells of a wire already have a driving output.
    #[error("{left} and {right} are both driven and cannot be merged")]
    FanInConflict {
        /// Label of the left-hand cell.
        left: String,
        /// Label of the right-hand cell.
        right: String,
    },

    /// A latch was detached from a cell it does not belong to.
    #[error("latch {latch} is not a member of cell {cell}")]
    NotAMember {
        /// Label of the latch.
        latch: String,
        /// Label of the cell.
        cell: String,
    },

    /// Early-stop signal raised from inside a block update.
    #[error("block system execution terminated")]
    Terminated,

    /// A state machine is missing a name or has an invalid initial state.
    #[error("improper configuration: {0}")]
    ImproperConfiguration(String),

    /// A block was added without a non-empty name.
    #[error("a non-empty block name must be assigned")]
    UnnamedBlock,

    /// A scheduler entry point was called without start blocks.
    #[error("at least one block must be specified as start block")]
    NoStartBlock,

    /// A block handle does not belong to this graph.
    #[error("block {0} not found")]
    BlockNotFound(BlockId),

    /// Failure reported by client block code.
    #[error(transparent)]
    Other(BoxError),
}

impl Error {
    /// Wraps a client error so it can be returned from a block update.
    pub fn other(err: impl Into<BoxError>) -> Self {
        Error::Other(err.into())
    }

    /// Create an improper configuration error.
    pub fn improper(message: impl Into<String>) -> Self {
        Error::ImproperConfiguration(message.into())
    }

    /// Returns true for the early-stop signal.
    pub fn is_terminated(&self) -> bool {
        matches!(self, Error::Terminated)
    }
}

/// Result type used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
