//! Declarative finite-state machines.
//!
//! A machine is declared once with [`MachineBuilder`] (named [`State`]s and
//! [`Event`]s plus `(source, event, target)` transitions) and compiled into a
//! [`Machine`] that owns a context value. Each [`Machine::update`] is a single
//! evaluation step, so a machine can be driven from a loop or from inside a
//! block's update to give that block internal sequencing.

mod machine;
mod state;

pub use machine::{Machine, MachineBuilder};
pub use state::{Event, State};
