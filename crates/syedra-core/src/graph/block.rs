//! The block capability contract and the port view handed to updates.
//!
//! Client code implements [`Block`] for each computational unit. A block
//! declares its ports through [`Block::ports`], is added to a
//! [`Graph`](super::Graph), and is fired by the scheduler through
//! [`Block::update`] or [`Block::update_async`]. Both receive a [`BlockIo`]
//! that reads and writes the block's own ports.
//!
//! A block ends a scheduling run early by returning [`Error::Terminated`].

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::cell::{LatchId, Wiring};
use super::port::PortRegistry;

/// Unique identifier for a block in a graph.
///
/// Block IDs are assigned sequentially and never reused within a graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub(crate) u32);

impl BlockId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for BlockId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

/// Computational unit with named, typed ports.
///
/// # Example
///
/// ```rust
/// use syedra_core::{Block, BlockIo, Graph, PortRegistry, Result};
///
/// struct Function;
///
/// impl Block<i64> for Function {
///     fn block_name(&self) -> &str {
///         "Function"
///     }
///
///     fn ports(&self) -> Result<PortRegistry<i64>> {
///         Ok(PortRegistry::new()
///             .with_input("x", Some(0))
///             .with_output("y", Some(0)))
///     }
///
///     fn update(&mut self, io: &mut BlockIo<'_, i64>) -> Result<()> {
///         let x = io.get("x")?.copied().unwrap_or_default();
///         io.set("y", x + 1)
///     }
/// }
///
/// let mut graph = Graph::new();
/// let function = graph.add_block(Function).unwrap();
/// graph.cell_mut(function, "x").unwrap().set(4);
/// graph.execute(&[function]).unwrap();
/// assert_eq!(graph.get(function, "y").unwrap(), Some(&5));
/// ```
#[async_trait(?Send)]
pub trait Block<V: 'static> {
    /// Default instance name. An empty name must be replaced by an explicit
    /// one when the block is added.
    fn block_name(&self) -> &str {
        ""
    }

    /// Declares the block's ports.
    ///
    /// Subtypes inherit by building on the parent's registry (see
    /// [`PortRegistry::inherit`]). Called once when the block is added.
    fn ports(&self) -> Result<PortRegistry<V>> {
        Ok(PortRegistry::new())
    }

    /// Synchronous block process.
    fn update(&mut self, _io: &mut BlockIo<'_, V>) -> Result<()> {
        Ok(())
    }

    /// Cooperative asynchronous block process.
    ///
    /// Defaults to running [`update`](Self::update) to completion.
    async fn update_async(&mut self, io: &mut BlockIo<'_, V>) -> Result<()> {
        self.update(io)
    }
}

/// Per-block bookkeeping shared by the registry and [`BlockIo`].
#[derive(Debug)]
pub(crate) struct BlockMeta<V> {
    pub id: BlockId,
    pub name: String,
    pub ports: PortRegistry<V>,
    /// Latches by port name, in declaration order.
    pub latches: Vec<(String, LatchId)>,
    pub inputs: Vec<LatchId>,
    pub outputs: Vec<LatchId>,
    /// Flat execution cohort: this block followed by its sub-blocks.
    pub cohort: Vec<BlockId>,
    pub container: Option<BlockId>,
}

impl<V> BlockMeta<V> {
    pub fn latch(&self, port: &str) -> Result<LatchId> {
        self.latches
            .iter()
            .find(|(name, _)| name == port)
            .map(|&(_, id)| id)
            .ok_or_else(|| Error::PortDoesNotExist {
                block: self.name.clone(),
                port: port.to_owned(),
            })
    }
}

/// View of one block's ports, handed to its update.
pub struct BlockIo<'a, V> {
    pub(crate) meta: &'a BlockMeta<V>,
    pub(crate) wiring: &'a mut Wiring<V>,
}

impl<V> BlockIo<'_, V> {
    /// Name of the block being updated.
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Handle of the block being updated.
    pub fn id(&self) -> BlockId {
        self.meta.id
    }

    /// Reads the value of the cell a port belongs to.
    pub fn get(&self, port: &str) -> Result<Option<&V>> {
        let latch = self.meta.latch(port)?;
        self.wiring.value(latch)
    }

    /// Writes an output port.
    ///
    /// Fails with [`Error::ImmutablePort`] for inputs and proxies.
    pub fn set(&mut self, port: &str, value: V) -> Result<()> {
        let latch = self.meta.latch(port)?;
        if !self.wiring.latch(latch)?.is_output() {
            return Err(Error::ImmutablePort {
                block: self.meta.name.clone(),
                port: port.to_owned(),
            });
        }
        self.wiring.cell_of_mut(latch)?.set(value);
        Ok(())
    }

    /// True when the input latch of `port` currently holds a token.
    pub fn has_token(&self, port: &str) -> Result<bool> {
        let latch = self.meta.latch(port)?;
        self.wiring.token(latch)
    }

    /// Declared port names, in declaration order.
    pub fn port_names(&self) -> impl Iterator<Item = &str> {
        self.meta.latches.iter().map(|(name, _)| name.as_str())
    }
}
