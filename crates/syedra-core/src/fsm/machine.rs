//! Machine declaration and single-step evaluation.

use crate::error::{Error, Result};

use super::state::{Event, State};

/// Declarative description of a state machine.
///
/// States and events are registered by name; re-registering a name replaces
/// the earlier entry in place. Transitions are `(source, event, target)`
/// triples kept in declaration order. Nothing is checked until
/// [`build()`](Self::build).
pub struct MachineBuilder<C> {
    name: Option<String>,
    states: Vec<(String, State<C>)>,
    events: Vec<(String, Event<C>)>,
    transitions: Vec<(String, String, String)>,
    initial: Option<String>,
}

impl<C> Default for MachineBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for MachineBuilder<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            states: self.states.clone(),
            events: self.events.clone(),
            transitions: self.transitions.clone(),
            initial: self.initial.clone(),
        }
    }
}

impl<C> MachineBuilder<C> {
    /// Empty, unnamed declaration.
    pub fn new() -> Self {
        Self {
            name: None,
            states: Vec::new(),
            events: Vec::new(),
            transitions: Vec::new(),
            initial: None,
        }
    }

    /// Empty declaration with a machine name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new().name(name)
    }

    /// Sets the machine name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declares a state.
    pub fn state(mut self, name: impl Into<String>, state: State<C>) -> Self {
        upsert(&mut self.states, name.into(), state);
        self
    }

    /// Declares an event.
    pub fn event(mut self, name: impl Into<String>, event: Event<C>) -> Self {
        upsert(&mut self.events, name.into(), event);
        self
    }

    /// Declares a transition from `source` to `target` on `event`.
    ///
    /// A second declaration for the same `(source, event)` pair keeps the
    /// first one's position and replaces its target.
    pub fn transition(
        mut self,
        source: impl Into<String>,
        event: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        let (source, event, target) = (source.into(), event.into(), target.into());
        match self
            .transitions
            .iter_mut()
            .find(|(s, e, _)| *s == source && *e == event)
        {
            Some(existing) => existing.2 = target,
            None => self.transitions.push((source, event, target)),
        }
        self
    }

    /// Sets the initial state.
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    /// Starts from a copy of `parent`'s declaration.
    ///
    /// Everything declared on `self` so far takes precedence over the parent.
    pub fn extend(self, parent: &MachineBuilder<C>) -> Self {
        let mut merged = parent.clone();
        if self.name.is_some() {
            merged.name = self.name;
        }
        if self.initial.is_some() {
            merged.initial = self.initial;
        }
        for (name, state) in self.states {
            upsert(&mut merged.states, name, state);
        }
        for (name, event) in self.events {
            upsert(&mut merged.events, name, event);
        }
        for (source, event, target) in self.transitions {
            merged = merged.transition(source, event, target);
        }
        merged
    }

    /// Compiles the declaration into a machine owning `context`.
    ///
    /// Fails with [`Error::ImproperConfiguration`] when the machine has no
    /// name, when the initial state is absent or undeclared, or when a
    /// transition names an undeclared state or event.
    pub fn build(self, context: C) -> Result<Machine<C>> {
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::improper("a non empty machine name must be assigned"))?;
        let initial = self
            .initial
            .ok_or_else(|| Error::improper("an initial state must be specified"))?;
        let initial = position(&self.states, &initial).ok_or_else(|| {
            Error::improper(format!(
                "specified initial state ({initial}) is not a machine state"
            ))
        })?;

        let mut table = vec![Vec::new(); self.states.len()];
        for (source, event, target) in &self.transitions {
            let s = position(&self.states, source)
                .ok_or_else(|| Error::improper(format!("unknown source state ({source})")))?;
            let e = position(&self.events, event)
                .ok_or_else(|| Error::improper(format!("unknown event ({event})")))?;
            let t = position(&self.states, target)
                .ok_or_else(|| Error::improper(format!("unknown target state ({target})")))?;
            table[s].push((e, t));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "fsm_build: '{name}' with {} states, {} events, {} transitions",
            self.states.len(),
            self.events.len(),
            self.transitions.len()
        );

        Ok(Machine {
            name,
            states: self.states,
            events: self.events,
            table,
            initial,
            current: None,
            context,
        })
    }
}

/// Compiled state machine.
///
/// The machine owns its context; hooks and event predicates act on it. The
/// current state is unset until the first [`update()`](Self::update).
///
/// # Example
///
/// ```rust
/// use syedra_core::fsm::{Event, MachineBuilder, State};
///
/// let mut counter = MachineBuilder::named("Counter")
///     .state("increment", State::new().on_during(|v: &mut i32| *v += 1))
///     .state("decrement", State::new().on_during(|v: &mut i32| *v -= 1))
///     .event("upper_limit", Event::new(|v: &i32| *v == 10))
///     .event("lower_limit", Event::new(|v: &i32| *v == -10))
///     .transition("increment", "upper_limit", "decrement")
///     .transition("decrement", "lower_limit", "increment")
///     .initial("increment")
///     .build(0)
///     .unwrap();
///
/// for _ in 0..11 {
///     counter.update();
/// }
/// assert_eq!(*counter.context(), 9);
/// assert_eq!(counter.current_state(), Some("decrement"));
/// ```
pub struct Machine<C> {
    name: String,
    states: Vec<(String, State<C>)>,
    events: Vec<(String, Event<C>)>,
    /// Outgoing `(event, target)` pairs per source state, in declaration order.
    table: Vec<Vec<(usize, usize)>>,
    initial: usize,
    current: Option<usize>,
    context: C,
}

impl<C> Machine<C> {
    /// Runs one evaluation step.
    ///
    /// The first call enters the initial state. Later calls take the first
    /// outgoing transition whose event occurred, running egress then ingress.
    /// Every call ends with the current state's during hook.
    pub fn update(&mut self) {
        let current = match self.current {
            None => {
                self.current = Some(self.initial);
                self.states[self.initial].1.ingress(&mut self.context);
                self.initial
            }
            Some(current) => {
                let fired = self.table[current]
                    .iter()
                    .find(|&&(event, _)| self.events[event].1.occurred(&self.context))
                    .copied();
                match fired {
                    Some((_event, target)) => {
                        #[cfg(feature = "tracing")]
                        tracing::trace!(
                            "fsm_transition: '{}' ({})-|{}|->({})",
                            self.name,
                            self.states[current].0,
                            self.events[_event].0,
                            self.states[target].0
                        );
                        self.states[current].1.egress(&mut self.context);
                        self.current = Some(target);
                        self.states[target].1.ingress(&mut self.context);
                        target
                    }
                    None => current,
                }
            }
        };
        self.states[current].1.during(&mut self.context);
    }

    /// Machine name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state, `None` before the first update.
    pub fn current_state(&self) -> Option<&str> {
        self.current.map(|i| self.states[i].0.as_str())
    }

    /// Initial state.
    pub fn initial_state(&self) -> &str {
        &self.states[self.initial].0
    }

    /// Shared context.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Mutable context, for feeding inputs between updates.
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Consumes the machine and returns its context.
    pub fn into_context(self) -> C {
        self.context
    }

    /// Compiled transitions as `(source, event, target)` names, grouped by
    /// source state.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.table.iter().enumerate().flat_map(move |(source, row)| {
            row.iter().map(move |&(event, target)| {
                (
                    self.states[source].0.as_str(),
                    self.events[event].0.as_str(),
                    self.states[target].0.as_str(),
                )
            })
        })
    }
}

impl<C> core::fmt::Display for Machine<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "-> {}", self.initial_state())?;
        for (source, event, target) in self.transitions() {
            write!(f, "\n({source})-|{event}|->({target})")?;
        }
        Ok(())
    }
}

impl<C> core::fmt::Debug for Machine<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Machine")
            .field("name", &self.name)
            .field("initial", &self.initial_state())
            .field("current", &self.current_state())
            .finish_non_exhaustive()
    }
}

fn upsert<T>(entries: &mut Vec<(String, T)>, name: String, value: T) {
    match entries.iter_mut().find(|(n, _)| *n == name) {
        Some(entry) => entry.1 = value,
        None => entries.push((name, value)),
    }
}

fn position<T>(entries: &[(String, T)], name: &str) -> Option<usize> {
    entries.iter().position(|(n, _)| n == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Counter {
        value: i32,
    }

    fn counter() -> MachineBuilder<Counter> {
        MachineBuilder::named("Counter")
            .state("increment", State::new().on_during(|c: &mut Counter| c.value += 1))
            .state("decrement", State::new().on_during(|c: &mut Counter| c.value -= 1))
            .event("upper_limit", Event::new(|c: &Counter| c.value == 10))
            .event("lower_limit", Event::new(|c: &Counter| c.value == -10))
            .transition("increment", "upper_limit", "decrement")
            .transition("decrement", "lower_limit", "increment")
            .initial("increment")
    }

    #[test]
    fn test_counter_turns_around_at_limit() {
        let mut machine = counter().build(Counter::default()).unwrap();
        assert_eq!(machine.current_state(), None);

        machine.update();
        assert_eq!(machine.current_state(), Some("increment"));
        assert_eq!(machine.context().value, 1);

        for _ in 0..10 {
            machine.update();
        }
        assert_eq!(machine.context().value, 9);
        assert_eq!(machine.current_state(), Some("decrement"));
    }

    #[test]
    fn test_counter_full_cycle() {
        let mut machine = counter().build(Counter::default()).unwrap();
        // 10 up, 20 down, back to increment at -10.
        for _ in 0..31 {
            machine.update();
        }
        assert_eq!(machine.current_state(), Some("increment"));
        assert_eq!(machine.context().value, -9);
    }

    #[test]
    fn test_hook_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let hook = |tag: &'static str| {
            let log = Rc::clone(&log);
            move |_: &mut bool| log.borrow_mut().push(tag)
        };
        let mut machine = MachineBuilder::named("Order")
            .state(
                "a",
                State::new()
                    .on_ingress(hook("a.in"))
                    .on_during(hook("a.during"))
                    .on_egress(hook("a.out")),
            )
            .state(
                "b",
                State::new()
                    .on_ingress(hook("b.in"))
                    .on_during(hook("b.during"))
                    .on_egress(hook("b.out")),
            )
            .event("go", Event::new(|go: &bool| *go))
            .transition("a", "go", "b")
            .initial("a")
            .build(false)
            .unwrap();

        machine.update();
        machine.update();
        *machine.context_mut() = true;
        machine.update();

        assert_eq!(
            *log.borrow(),
            ["a.in", "a.during", "a.during", "a.out", "b.in", "b.during"]
        );
    }

    #[test]
    fn test_state_without_transitions_keeps_running() {
        let mut machine = MachineBuilder::named("Sink")
            .state("idle", State::new().on_during(|n: &mut u32| *n += 1))
            .initial("idle")
            .build(0)
            .unwrap();
        for _ in 0..3 {
            machine.update();
        }
        assert_eq!(machine.current_state(), Some("idle"));
        assert_eq!(*machine.context(), 3);
    }

    #[test]
    fn test_first_true_event_wins() {
        let mut machine = MachineBuilder::named("Choice")
            .state("start", State::new())
            .state("left", State::new())
            .state("right", State::new())
            .event("always", Event::new(|_: &()| true))
            .event("also", Event::new(|_: &()| true))
            .event("never", Event::never())
            .transition("start", "never", "right")
            .transition("start", "always", "left")
            .transition("start", "also", "right")
            .initial("start")
            .build(())
            .unwrap();
        machine.update();
        machine.update();
        assert_eq!(machine.current_state(), Some("left"));
    }

    #[test]
    fn test_improper_configuration() {
        let unnamed = MachineBuilder::<()>::new()
            .state("a", State::new())
            .initial("a")
            .build(());
        assert!(matches!(unnamed, Err(Error::ImproperConfiguration(_))));

        let no_initial = MachineBuilder::<()>::named("M").state("a", State::new()).build(());
        assert!(matches!(no_initial, Err(Error::ImproperConfiguration(_))));

        let bad_initial = MachineBuilder::<()>::named("M")
            .state("a", State::new())
            .initial("z")
            .build(());
        assert!(
            matches!(bad_initial, Err(Error::ImproperConfiguration(msg)) if msg.contains("(z)"))
        );

        let bad_event = MachineBuilder::<()>::named("M")
            .state("a", State::new())
            .transition("a", "missing", "a")
            .initial("a")
            .build(());
        assert!(matches!(bad_event, Err(Error::ImproperConfiguration(_))));
    }

    #[test]
    fn test_display_lists_transitions() {
        let machine = counter().build(Counter::default()).unwrap();
        assert_eq!(
            machine.to_string(),
            "-> increment\n\
             (increment)-|upper_limit|->(decrement)\n\
             (decrement)-|lower_limit|->(increment)"
        );
    }

    #[test]
    fn test_redeclared_transition_replaces_target() {
        let machine = counter()
            .state("hold", State::new())
            .transition("increment", "upper_limit", "hold")
            .build(Counter::default())
            .unwrap();
        let transitions: Vec<_> = machine.transitions().collect();
        assert_eq!(transitions[0], ("increment", "upper_limit", "hold"));
        assert_eq!(transitions.len(), 2);
    }

    #[test]
    fn test_extend_overrides_parent() {
        let child = MachineBuilder::named("Fast")
            .state("increment", State::new().on_during(|c: &mut Counter| c.value += 5))
            .extend(&counter());
        let mut machine = child.build(Counter::default()).unwrap();
        assert_eq!(machine.name(), "Fast");
        assert_eq!(machine.initial_state(), "increment");

        machine.update();
        machine.update();
        assert_eq!(machine.context().value, 10);
        machine.update();
        assert_eq!(machine.current_state(), Some("decrement"));
        assert_eq!(machine.into_context().value, 9);
    }
}
