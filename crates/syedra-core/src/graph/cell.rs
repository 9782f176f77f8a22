//! Latches, value cells and the arena that owns them.
//!
//! Every (block, port) pair gets one [`Latch`]. A latch holds the transient
//! scheduling token and a [`CellId`] handle to the [`ValueCell`] it currently
//! belongs to. Wiring merges two cells into one; unwiring splits a latch off
//! into a fresh singleton cell. Both are handle reassignment inside
//! [`Wiring`], which owns all latch and cell storage.
//!
//! Invariant: a cell has at most one output member (its driver).

use crate::error::{Error, Result};

use super::block::BlockId;
use super::port::{Port, PortKind};

/// Handle of a latch inside a graph.
///
/// Latch IDs are assigned sequentially and never reused within a graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LatchId(pub(crate) u32);

impl LatchId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Handle of a value cell inside a graph.
///
/// Cell IDs are assigned sequentially and never reused, so a handle to a cell
/// that was merged away or emptied resolves to nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub(crate) u32);

impl CellId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for LatchId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "LatchId({})", self.0)
    }
}

impl core::fmt::Display for CellId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "CellId({})", self.0)
    }
}

/// Binding of one port to one block instance.
#[derive(Debug, Clone)]
pub struct Latch {
    block: BlockId,
    port: String,
    label: String,
    kind: PortKind,
    internal: bool,
    token: bool,
    cell: CellId,
}

impl Latch {
    /// Owning block.
    pub fn block(&self) -> BlockId {
        self.block
    }

    /// Port name.
    pub fn port(&self) -> &str {
        &self.port
    }

    /// `block:port` label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Port direction.
    pub fn kind(&self) -> PortKind {
        self.kind
    }

    /// True for input latches.
    pub fn is_input(&self) -> bool {
        self.kind == PortKind::Input
    }

    /// True for output latches.
    pub fn is_output(&self) -> bool {
        self.kind == PortKind::Output
    }

    /// True when the port was declared internal.
    pub fn is_internal(&self) -> bool {
        self.internal
    }

    /// Current scheduling token. Only input latches store one.
    pub fn token(&self) -> bool {
        self.token
    }

    /// Cell this latch currently belongs to.
    pub fn cell(&self) -> CellId {
        self.cell
    }
}

/// Shared value store joining one or more latches.
#[derive(Debug, Clone)]
pub struct ValueCell<V> {
    value: Option<V>,
    members: Vec<LatchId>,
    driven: bool,
}

impl<V> ValueCell<V> {
    /// Current value, `None` until something is written or an initial exists.
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Overwrites the value directly, regardless of which latches are members.
    pub fn set(&mut self, value: V) {
        self.value = Some(value);
    }

    /// Clears the value.
    pub fn take(&mut self) -> Option<V> {
        self.value.take()
    }

    /// Member latches in join order.
    pub fn members(&self) -> &[LatchId] {
        &self.members
    }

    /// True when an output latch is a member.
    pub fn is_driven(&self) -> bool {
        self.driven
    }

    /// True when `latch` is a member.
    pub fn contains(&self, latch: LatchId) -> bool {
        self.members.contains(&latch)
    }
}

/// Arena owning every latch and value cell of a graph.
#[derive(Debug)]
pub struct Wiring<V> {
    latches: Vec<Latch>,
    cells: Vec<Option<ValueCell<V>>>,
}

impl<V> Default for Wiring<V> {
    fn default() -> Self {
        Self {
            latches: Vec::new(),
            cells: Vec::new(),
        }
    }
}

impl<V: Clone> Wiring<V> {
    /// Creates a latch for `port` on `block`, alone in a fresh cell seeded
    /// with the port's initial value.
    pub(crate) fn add_latch(
        &mut self,
        block: BlockId,
        block_name: &str,
        port: &Port<V>,
    ) -> Result<LatchId> {
        let port_name = port.name()?;
        let id = LatchId(self.latches.len() as u32);
        let cell = self.push_cell(ValueCell {
            value: port.initial().cloned(),
            members: vec![id],
            driven: port.is_output(),
        });
        self.latches.push(Latch {
            block,
            port: port_name.to_owned(),
            label: format!("{block_name}:{port_name}"),
            kind: port.kind(),
            internal: port.is_internal(),
            token: false,
            cell,
        });
        Ok(id)
    }

    /// Merges cell `right` into cell `left` and returns the surviving cell.
    ///
    /// Fails with [`Error::FanInConflict`] if both cells are driven. The merged
    /// cell takes the value of the driven side; when neither is driven the
    /// left value is kept, or the right one if the left holds none.
    pub fn merge(&mut self, left: CellId, right: CellId) -> Result<CellId> {
        if left == right {
            self.live(left)?;
            return Ok(left);
        }
        let (left_driven, right_driven) = (self.live(left)?.driven, self.live(right)?.driven);
        if left_driven && right_driven {
            return Err(Error::FanInConflict {
                left: self.cell_label(left),
                right: self.cell_label(right),
            });
        }

        let absorbed = self.cells[right.0 as usize]
            .take()
            .ok_or_else(|| missing_cell(right))?;
        for &latch in &absorbed.members {
            self.latches[latch.0 as usize].cell = left;
        }

        let target = self.cells[left.0 as usize]
            .as_mut()
            .ok_or_else(|| Error::improper(format!("cell {left} vanished during merge")))?;
        target.members.extend_from_slice(&absorbed.members);
        if absorbed.driven {
            target.driven = true;
            target.value = absorbed.value;
        } else if target.value.is_none() {
            target.value = absorbed.value;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("cell_merge: {right} into {left} ({})", self.cell_label(left));
        Ok(left)
    }

    /// Removes `latch` from `cell`, giving it a new singleton cell seeded with
    /// the shared value.
    ///
    /// Returns the remaining cell, or `None` if `latch` was its only member
    /// and the cell was destroyed. Fails with [`Error::NotAMember`] if `latch`
    /// does not belong to `cell`.
    pub fn detach(&mut self, cell: CellId, latch: LatchId) -> Result<Option<CellId>> {
        let is_output = self.latch(latch)?.is_output();
        let source = self.live(cell)?;
        let Some(pos) = source.members.iter().position(|&m| m == latch) else {
            return Err(Error::NotAMember {
                latch: self.latches[latch.0 as usize].label.clone(),
                cell: self.cell_label(cell),
            });
        };
        let value = source.value.clone();

        let fresh = self.push_cell(ValueCell {
            value,
            members: vec![latch],
            driven: is_output,
        });
        self.latches[latch.0 as usize].cell = fresh;

        let source = self.cells[cell.0 as usize]
            .as_mut()
            .ok_or_else(|| Error::improper(format!("cell {cell} vanished during detach")))?;
        source.members.remove(pos);
        if source.members.is_empty() {
            self.cells[cell.0 as usize] = None;
            #[cfg(feature = "tracing")]
            tracing::debug!("cell_detach: {latch} emptied {cell}");
            return Ok(None);
        }
        let members = source.members.clone();
        let driven = members
            .iter()
            .any(|m| self.latches[m.0 as usize].is_output());
        if let Some(source) = self.cells[cell.0 as usize].as_mut() {
            source.driven = driven;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("cell_detach: {latch} from {cell} into {fresh}");
        Ok(Some(cell))
    }
}

impl<V> Wiring<V> {
    /// Looks up a latch.
    pub fn latch(&self, id: LatchId) -> Result<&Latch> {
        self.latches
            .get(id.0 as usize)
            .ok_or_else(|| Error::improper(format!("latch {id} does not exist")))
    }

    /// Looks up a live cell.
    pub fn cell(&self, id: CellId) -> Option<&ValueCell<V>> {
        self.cells.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Looks up a live cell mutably.
    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut ValueCell<V>> {
        self.cells.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Cell a latch currently belongs to.
    pub fn cell_of(&self, latch: LatchId) -> Result<&ValueCell<V>> {
        let cell = self.latch(latch)?.cell;
        self.live(cell)
    }

    /// Mutable cell a latch currently belongs to.
    pub fn cell_of_mut(&mut self, latch: LatchId) -> Result<&mut ValueCell<V>> {
        let cell = self.latch(latch)?.cell;
        self.cell_mut(cell).ok_or_else(|| missing_cell(cell))
    }

    /// Value seen through a latch.
    pub fn value(&self, latch: LatchId) -> Result<Option<&V>> {
        Ok(self.cell_of(latch)?.value.as_ref())
    }

    /// Number of live cells.
    pub fn cell_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Number of latches.
    pub fn latch_count(&self) -> usize {
        self.latches.len()
    }

    /// Sets a latch token.
    ///
    /// An input latch stores the token itself. Any other latch forwards it to
    /// every input latch sharing its cell.
    pub fn set_token(&mut self, id: LatchId, state: bool) -> Result<()> {
        let latch = self.latch(id)?;
        if latch.is_input() {
            self.latches[id.0 as usize].token = state;
            return Ok(());
        }
        let cell = latch.cell;
        let members = self.live(cell)?.members.clone();
        for member in members {
            let target = &mut self.latches[member.0 as usize];
            if target.is_input() {
                target.token = state;
            }
        }
        Ok(())
    }

    /// Reads a latch token.
    pub fn token(&self, id: LatchId) -> Result<bool> {
        Ok(self.latch(id)?.token)
    }

    /// `block:port|block:port` label of a cell.
    pub fn cell_label(&self, id: CellId) -> String {
        match self.cell(id) {
            Some(cell) => cell
                .members
                .iter()
                .map(|m| self.latches[m.0 as usize].label.as_str())
                .collect::<Vec<_>>()
                .join("|"),
            None => id.to_string(),
        }
    }

    fn push_cell(&mut self, cell: ValueCell<V>) -> CellId {
        let id = CellId(self.cells.len() as u32);
        self.cells.push(Some(cell));
        id
    }

    fn live(&self, id: CellId) -> Result<&ValueCell<V>> {
        self.cell(id).ok_or_else(|| missing_cell(id))
    }
}

fn missing_cell(id: CellId) -> Error {
    Error::improper(format!("cell {id} does not exist"))
}
