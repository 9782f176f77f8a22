//! Block registry: construction, cohorts, ports and wiring.
//!
//! [`Graph`] is the explicit, bounded-lifetime registry of a block diagram. It
//! owns every block together with the [`Wiring`] arena of latches and value
//! cells. Dropping the graph tears the whole diagram down.
//!
//! Blocks are fired by the scheduler entry points
//! [`execute()`](Graph::execute) and [`async_execute()`](Graph::async_execute).

use std::rc::Rc;

use tokio::sync::Mutex;

use crate::error::{Error, Result};

use super::block::{Block, BlockId, BlockMeta};
use super::cell::{CellId, Latch, LatchId, ValueCell, Wiring};
use super::port::{Port, PortRegistry};
use super::schedule::ExecuteOptions;

/// A registered block: bookkeeping, behaviour and its update lock.
pub(crate) struct BlockEntry<V> {
    pub meta: BlockMeta<V>,
    pub behavior: Box<dyn Block<V>>,
    /// Serialises asynchronous updates of this block instance.
    pub lock: Rc<Mutex<()>>,
}

/// Registry of blocks and their wiring.
///
/// # Usage
///
/// 1. Create a graph with [`new()`](Self::new)
/// 2. Add blocks: [`add_block()`](Self::add_block),
///    [`add_block_named()`](Self::add_block_named),
///    [`add_sub_block()`](Self::add_sub_block)
/// 3. Wire ports: [`connect()`](Self::connect)
/// 4. Run: [`execute()`](Self::execute) or [`async_execute()`](Self::async_execute)
///
/// The graph is single-threaded: it is neither `Send` nor `Sync`.
pub struct Graph<V: 'static> {
    pub(crate) blocks: Vec<BlockEntry<V>>,
    pub(crate) wiring: Wiring<V>,
    pub(crate) options: ExecuteOptions,
}

impl<V: Clone + 'static> Default for Graph<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + 'static> Graph<V> {
    /// Creates an empty graph with default scheduler options.
    pub fn new() -> Self {
        Self::with_options(ExecuteOptions::default())
    }

    /// Creates an empty graph with the given scheduler options.
    pub fn with_options(options: ExecuteOptions) -> Self {
        Self {
            blocks: Vec::new(),
            wiring: Wiring::default(),
            options,
        }
    }

    /// Scheduler options in effect.
    pub fn options(&self) -> &ExecuteOptions {
        &self.options
    }

    /// Replaces the scheduler options.
    pub fn set_options(&mut self, options: ExecuteOptions) {
        self.options = options;
    }

    // --- Block construction ---

    /// Adds a block under its default [`block_name()`](Block::block_name).
    pub fn add_block(&mut self, block: impl Block<V> + 'static) -> Result<BlockId> {
        self.insert_block(None, None, Box::new(block))
    }

    /// Adds a block under an explicit name.
    pub fn add_block_named(
        &mut self,
        name: impl Into<String>,
        block: impl Block<V> + 'static,
    ) -> Result<BlockId> {
        self.insert_block(Some(name.into()), None, Box::new(block))
    }

    /// Adds a block as a member of `container`'s execution cohort.
    ///
    /// Firing the container also fires the sub-block.
    pub fn add_sub_block(
        &mut self,
        container: BlockId,
        block: impl Block<V> + 'static,
    ) -> Result<BlockId> {
        self.insert_block(None, Some(container), Box::new(block))
    }

    /// Adds a boxed block with an optional explicit name and container.
    ///
    /// The name falls back to the block's default name; an empty result fails
    /// with [`Error::UnnamedBlock`].
    pub fn insert_block(
        &mut self,
        name: Option<String>,
        container: Option<BlockId>,
        behavior: Box<dyn Block<V>>,
    ) -> Result<BlockId> {
        let name = name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| behavior.block_name().to_owned());
        if name.is_empty() {
            return Err(Error::UnnamedBlock);
        }
        if let Some(container) = container {
            self.entry(container)?;
        }
        let ports = behavior.ports()?;

        let id = BlockId(self.blocks.len() as u32);
        let mut meta = BlockMeta {
            id,
            name,
            ports: PortRegistry::new(),
            latches: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            cohort: vec![id],
            container,
        };
        for port in ports.iter() {
            attach_port(&mut self.wiring, &mut meta, port.name()?.to_owned(), port.clone())?;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "block_add: '{}' {id} with {} ports{}",
            meta.name,
            meta.latches.len(),
            container.map(|c| format!(" in cohort of {c}")).unwrap_or_default()
        );

        self.blocks.push(BlockEntry {
            meta,
            behavior,
            lock: Rc::new(Mutex::new(())),
        });
        if let Some(container) = container {
            self.entry_mut(container)?.meta.cohort.push(id);
        }
        Ok(id)
    }

    /// Adds a named port to an already constructed block.
    ///
    /// Fails with [`Error::NameConflict`] if the block already has a port of
    /// that name. Existing latches and their wiring are untouched.
    pub fn add_port(
        &mut self,
        block: BlockId,
        name: impl Into<String>,
        port: Port<V>,
    ) -> Result<LatchId> {
        let name = name.into();
        let Self { blocks, wiring, .. } = self;
        let meta = &mut blocks
            .get_mut(block.0 as usize)
            .ok_or(Error::BlockNotFound(block))?
            .meta;
        if meta.ports.contains(&name) {
            return Err(Error::NameConflict {
                block: meta.name.clone(),
                port: name,
            });
        }
        let latch = attach_port(wiring, meta, name, port)?;

        #[cfg(feature = "tracing")]
        tracing::debug!("port_add: {latch} on {block}");
        Ok(latch)
    }
}

impl<V: 'static> Graph<V> {
    // --- Registry accessors ---

    /// All registered blocks, in registration order.
    pub fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.iter().map(|b| b.meta.id)
    }

    /// Number of registered blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Name of a block.
    pub fn block_name(&self, block: BlockId) -> Result<&str> {
        Ok(&self.entry(block)?.meta.name)
    }

    /// Finds the first block registered under `name`.
    pub fn find_block(&self, name: &str) -> Option<BlockId> {
        self.blocks
            .iter()
            .find(|b| b.meta.name == name)
            .map(|b| b.meta.id)
    }

    /// Execution cohort of a block: itself followed by its sub-blocks.
    pub fn cohort(&self, block: BlockId) -> Result<&[BlockId]> {
        Ok(&self.entry(block)?.meta.cohort)
    }

    /// Container a block was constructed in, if any.
    pub fn container(&self, block: BlockId) -> Result<Option<BlockId>> {
        Ok(self.entry(block)?.meta.container)
    }

    /// Port registry of a block, including dynamically added ports.
    pub fn ports(&self, block: BlockId) -> Result<&PortRegistry<V>> {
        Ok(&self.entry(block)?.meta.ports)
    }

    /// Port template by name.
    pub fn port(&self, block: BlockId, port: &str) -> Result<&Port<V>> {
        let meta = &self.entry(block)?.meta;
        meta.ports.get(port).ok_or_else(|| Error::PortDoesNotExist {
            block: meta.name.clone(),
            port: port.to_owned(),
        })
    }

    /// Latch handle for a named port.
    pub fn latch_id(&self, block: BlockId, port: &str) -> Result<LatchId> {
        self.entry(block)?.meta.latch(port)
    }

    /// Latch for a named port.
    pub fn latch(&self, block: BlockId, port: &str) -> Result<&Latch> {
        let id = self.latch_id(block, port)?;
        self.wiring.latch(id)
    }

    /// Handle of the cell a named port currently belongs to.
    pub fn cell_id(&self, block: BlockId, port: &str) -> Result<CellId> {
        Ok(self.latch(block, port)?.cell())
    }

    /// Cell a named port currently belongs to.
    pub fn cell(&self, block: BlockId, port: &str) -> Result<&ValueCell<V>> {
        let id = self.latch_id(block, port)?;
        self.wiring.cell_of(id)
    }

    /// Mutable cell a named port currently belongs to.
    ///
    /// Writing through the cell bypasses the output-only check, which is how
    /// callers seed an input from outside the diagram.
    pub fn cell_mut(&mut self, block: BlockId, port: &str) -> Result<&mut ValueCell<V>> {
        let id = self.latch_id(block, port)?;
        self.wiring.cell_of_mut(id)
    }

    /// Input latches of a block.
    pub fn inputs(&self, block: BlockId) -> Result<&[LatchId]> {
        Ok(&self.entry(block)?.meta.inputs)
    }

    /// Output latches of a block.
    pub fn outputs(&self, block: BlockId) -> Result<&[LatchId]> {
        Ok(&self.entry(block)?.meta.outputs)
    }

    /// The latch and cell arena.
    pub fn wiring(&self) -> &Wiring<V> {
        &self.wiring
    }

    /// Reads the value seen through a named port.
    pub fn get(&self, block: BlockId, port: &str) -> Result<Option<&V>> {
        let id = self.latch_id(block, port)?;
        self.wiring.value(id)
    }

    /// Writes a named output port from outside the diagram.
    ///
    /// Fails with [`Error::ImmutablePort`] for inputs and proxies.
    pub fn set(&mut self, block: BlockId, port: &str, value: V) -> Result<()> {
        if !self.latch(block, port)?.is_output() {
            return Err(Error::ImmutablePort {
                block: self.entry(block)?.meta.name.clone(),
                port: port.to_owned(),
            });
        }
        self.cell_mut(block, port)?.set(value);
        Ok(())
    }

    pub(crate) fn entry(&self, block: BlockId) -> Result<&BlockEntry<V>> {
        self.blocks
            .get(block.0 as usize)
            .ok_or(Error::BlockNotFound(block))
    }

    pub(crate) fn entry_mut(&mut self, block: BlockId) -> Result<&mut BlockEntry<V>> {
        self.blocks
            .get_mut(block.0 as usize)
            .ok_or(Error::BlockNotFound(block))
    }
}

impl<V: Clone + 'static> Graph<V> {
    // --- Wiring ---

    /// Wires two ports together by merging their cells.
    ///
    /// Commutative: either side may be the output. Fails with
    /// [`Error::FanInConflict`] when both cells are already driven.
    pub fn connect(
        &mut self,
        from: BlockId,
        from_port: &str,
        to: BlockId,
        to_port: &str,
    ) -> Result<CellId> {
        let left = self.cell_id(from, from_port)?;
        let right = self.cell_id(to, to_port)?;
        self.wiring.merge(left, right)
    }

    /// Merges two cells directly.
    pub fn merge_cells(&mut self, left: CellId, right: CellId) -> Result<CellId> {
        self.wiring.merge(left, right)
    }

    /// Detaches a named port from its current cell.
    ///
    /// Returns the cell the port left behind, or `None` if it was the last
    /// member.
    pub fn disconnect(&mut self, block: BlockId, port: &str) -> Result<Option<CellId>> {
        let latch = self.latch_id(block, port)?;
        let cell = self.wiring.latch(latch)?.cell();
        self.wiring.detach(cell, latch)
    }

    /// Detaches `latch` from `cell`.
    ///
    /// Fails with [`Error::NotAMember`] if the latch is not in that cell.
    pub fn detach(&mut self, cell: CellId, latch: LatchId) -> Result<Option<CellId>> {
        self.wiring.detach(cell, latch)
    }
}

/// Registers `port` on `meta` and gives it a fresh latch.
fn attach_port<V: Clone>(
    wiring: &mut Wiring<V>,
    meta: &mut BlockMeta<V>,
    name: String,
    port: Port<V>,
) -> Result<LatchId> {
    meta.ports.insert(name.clone(), port);
    let port = meta.ports.get(&name).ok_or(Error::NotSetUp)?;
    let latch = wiring.add_latch(meta.id, &meta.name, port)?;
    if port.is_input() {
        meta.inputs.push(latch);
    } else if port.is_output() {
        meta.outputs.push(latch);
    }
    meta.latches.push((name, latch));
    Ok(latch)
}
