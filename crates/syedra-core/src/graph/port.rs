//! Port templates and per-type port registries.
//!
//! A [`Port`] is the immutable template a block type declares for each named
//! connection point: its [`PortKind`], an optional initial value and an
//! internal flag. A [`PortRegistry`] collects a block type's ports by name.
//! Subtypes inherit by starting from the parent's registry and inserting
//! their own ports; a same-named insert overrides the inherited entry in
//! place.

use crate::error::{Error, Result};

/// Direction of a port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// Consumes a value. A block becomes ready once all inputs hold a token.
    Input,
    /// Drives a value. At most one output may join a value cell.
    Output,
    /// Forwards to whatever cell a contained sub-block connects it to.
    Proxy,
}

impl PortKind {
    /// Single-letter code used in labels.
    pub const fn code(self) -> char {
        match self {
            PortKind::Input => 'I',
            PortKind::Output => 'O',
            PortKind::Proxy => 'P',
        }
    }
}

/// Immutable port template declared on a block type.
#[derive(Clone, Debug, PartialEq)]
pub struct Port<V> {
    kind: PortKind,
    name: Option<String>,
    initial: Option<V>,
    internal: bool,
}

impl<V> Port<V> {
    /// Creates a port template.
    ///
    /// Fails with [`Error::CannotInitialize`] when an initial value is given
    /// for a proxy port.
    pub fn new(kind: PortKind, initial: Option<V>, internal: bool) -> Result<Self> {
        if initial.is_some() && kind == PortKind::Proxy {
            return Err(Error::CannotInitialize);
        }
        Ok(Self {
            kind,
            name: None,
            initial,
            internal,
        })
    }

    /// Input port without an initial value.
    pub fn input() -> Self {
        Self::bare(PortKind::Input)
    }

    /// Output port without an initial value.
    pub fn output() -> Self {
        Self::bare(PortKind::Output)
    }

    /// Proxy port. Proxies never carry an initial value.
    pub fn proxy() -> Self {
        Self::bare(PortKind::Proxy)
    }

    fn bare(kind: PortKind) -> Self {
        Self {
            kind,
            name: None,
            initial: None,
            internal: false,
        }
    }

    /// Sets the initial value.
    pub fn with_initial(mut self, initial: V) -> Result<Self> {
        if self.kind == PortKind::Proxy {
            return Err(Error::CannotInitialize);
        }
        self.initial = Some(initial);
        Ok(self)
    }

    /// Marks the port as internal to its block.
    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    /// Registered name of the port.
    ///
    /// Fails with [`Error::NotSetUp`] until the port is inserted into a
    /// [`PortRegistry`].
    pub fn name(&self) -> Result<&str> {
        self.name.as_deref().ok_or(Error::NotSetUp)
    }

    /// Port direction.
    pub fn kind(&self) -> PortKind {
        self.kind
    }

    /// Initial value seeded into the port's first cell.
    pub fn initial(&self) -> Option<&V> {
        self.initial.as_ref()
    }

    /// True for input ports.
    pub fn is_input(&self) -> bool {
        self.kind == PortKind::Input
    }

    /// True for output ports.
    pub fn is_output(&self) -> bool {
        self.kind == PortKind::Output
    }

    /// True for proxy ports.
    pub fn is_proxy(&self) -> bool {
        self.kind == PortKind::Proxy
    }

    /// True when the port was declared internal.
    pub fn is_internal(&self) -> bool {
        self.internal
    }
}

/// Name → [`Port`] catalogue of a block type, in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct PortRegistry<V> {
    ports: Vec<Port<V>>,
}

impl<V> Default for PortRegistry<V> {
    fn default() -> Self {
        Self { ports: Vec::new() }
    }
}

impl<V: Clone> PortRegistry<V> {
    /// Starts a registry from a parent type's ports.
    pub fn inherit(parent: &PortRegistry<V>) -> Self {
        parent.clone()
    }

    /// Copies every port of `other` into this registry, overriding same-named
    /// entries.
    pub fn extend(&mut self, other: &PortRegistry<V>) {
        for port in &other.ports {
            if let Some(name) = port.name.clone() {
                self.insert(name, port.clone());
            }
        }
    }
}

impl<V> PortRegistry<V> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `port` under `name`, returning the overridden port if the
    /// name was already present.
    pub fn insert(&mut self, name: impl Into<String>, mut port: Port<V>) -> Option<Port<V>> {
        let name = name.into();
        port.name = Some(name.clone());
        match self.position(&name) {
            Some(idx) => Some(core::mem::replace(&mut self.ports[idx], port)),
            None => {
                self.ports.push(port);
                None
            }
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, port: Port<V>) -> Self {
        self.insert(name, port);
        self
    }

    /// Declares an input port.
    pub fn with_input(self, name: impl Into<String>, initial: Option<V>) -> Self {
        let mut port = Port::input();
        port.initial = initial;
        self.with(name, port)
    }

    /// Declares an output port.
    pub fn with_output(self, name: impl Into<String>, initial: Option<V>) -> Self {
        let mut port = Port::output();
        port.initial = initial;
        self.with(name, port)
    }

    /// Declares a proxy port.
    pub fn with_proxy(self, name: impl Into<String>) -> Self {
        self.with(name, Port::proxy())
    }

    /// Looks up a port by name.
    pub fn get(&self, name: &str) -> Option<&Port<V>> {
        self.position(name).map(|idx| &self.ports[idx])
    }

    /// True when a port with `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// All ports in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Port<V>> {
        self.ports.iter()
    }

    /// Input ports in declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = &Port<V>> {
        self.ports.iter().filter(|p| p.is_input())
    }

    /// Output ports in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = &Port<V>> {
        self.ports.iter().filter(|p| p.is_output())
    }

    /// Number of registered ports.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// True when no port is registered.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.ports
            .iter()
            .position(|p| p.name.as_deref() == Some(name))
    }
}
