//! States and events of a state machine.
//!
//! A [`State`] carries three optional hooks run against the machine's
//! context: ingress on entry, during once per update, egress on exit. An
//! [`Event`] is a boolean predicate over the context; an event without a
//! predicate never occurs.

use std::rc::Rc;

type Hook<C> = Rc<dyn Fn(&mut C)>;
type Check<C> = Rc<dyn Fn(&C) -> bool>;

/// Named state with optional ingress, during and egress hooks.
pub struct State<C> {
    ingress: Option<Hook<C>>,
    during: Option<Hook<C>>,
    egress: Option<Hook<C>>,
}

impl<C> State<C> {
    /// State without hooks.
    pub fn new() -> Self {
        Self {
            ingress: None,
            during: None,
            egress: None,
        }
    }

    /// Hook run when the state is entered.
    pub fn on_ingress(mut self, hook: impl Fn(&mut C) + 'static) -> Self {
        self.ingress = Some(Rc::new(hook));
        self
    }

    /// Hook run once per update while the state is current.
    pub fn on_during(mut self, hook: impl Fn(&mut C) + 'static) -> Self {
        self.during = Some(Rc::new(hook));
        self
    }

    /// Hook run when the state is left.
    pub fn on_egress(mut self, hook: impl Fn(&mut C) + 'static) -> Self {
        self.egress = Some(Rc::new(hook));
        self
    }

    pub(crate) fn ingress(&self, ctx: &mut C) {
        if let Some(hook) = &self.ingress {
            hook(ctx);
        }
    }

    pub(crate) fn during(&self, ctx: &mut C) {
        if let Some(hook) = &self.during {
            hook(ctx);
        }
    }

    pub(crate) fn egress(&self, ctx: &mut C) {
        if let Some(hook) = &self.egress {
            hook(ctx);
        }
    }
}

impl<C> Default for State<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for State<C> {
    fn clone(&self) -> Self {
        Self {
            ingress: self.ingress.clone(),
            during: self.during.clone(),
            egress: self.egress.clone(),
        }
    }
}

impl<C> core::fmt::Debug for State<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("State")
            .field("ingress", &self.ingress.is_some())
            .field("during", &self.during.is_some())
            .field("egress", &self.egress.is_some())
            .finish()
    }
}

/// Named boolean predicate over the machine context.
pub struct Event<C> {
    check: Option<Check<C>>,
}

impl<C> Event<C> {
    /// Event that occurs whenever `check` returns true.
    pub fn new(check: impl Fn(&C) -> bool + 'static) -> Self {
        Self {
            check: Some(Rc::new(check)),
        }
    }

    /// Event without a predicate. It never occurs.
    pub fn never() -> Self {
        Self { check: None }
    }

    /// Evaluates the predicate.
    pub fn occurred(&self, ctx: &C) -> bool {
        self.check.as_ref().is_some_and(|check| check(ctx))
    }
}

impl<C> Clone for Event<C> {
    fn clone(&self) -> Self {
        Self {
            check: self.check.clone(),
        }
    }
}

impl<C> core::fmt::Debug for Event<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Event")
            .field("check", &self.check.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hooks_run_against_context() {
        let state = State::new()
            .on_ingress(|n: &mut i32| *n += 100)
            .on_during(|n| *n += 10)
            .on_egress(|n| *n += 1);
        let mut n = 0;
        state.ingress(&mut n);
        state.during(&mut n);
        state.egress(&mut n);
        assert_eq!(n, 111);
    }

    #[test]
    fn test_missing_hooks_are_noops() {
        let state = State::<i32>::default();
        let mut n = 5;
        state.ingress(&mut n);
        state.during(&mut n);
        state.egress(&mut n);
        assert_eq!(n, 5);
    }

    #[test]
    fn test_event_predicates() {
        let high = Event::new(|n: &i32| *n > 3);
        assert!(high.occurred(&4));
        assert!(!high.occurred(&3));
        assert!(!Event::<i32>::never().occurred(&4));
        assert!(high.clone().occurred(&9));
    }
}
