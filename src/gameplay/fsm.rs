//! Generic, type-indexed finite state machine.
//!
//! States are registered once by their concrete type and looked up by
//! [`StateId`]. The machine owns every state it knows about and keeps a
//! pointer (the id) to the active one. Dispatch takes an external context
//! `C` so states never hold references to their owner.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use bevy::prelude::*;

/// Identity of a registered state: its `TypeId` plus a short name for logs.
#[derive(Clone, Copy)]
pub struct StateId {
    type_id: TypeId,
    name: &'static str,
}

impl StateId {
    /// Id of the state type `S`.
    #[must_use]
    pub fn of<S: 'static>() -> Self {
        let full = std::any::type_name::<S>();
        Self {
            type_id: TypeId::of::<S>(),
            name: full.rsplit("::").next().unwrap_or(full),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for StateId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for StateId {}

impl std::hash::Hash for StateId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// What the active state wants after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    #[default]
    Stay,
    To(StateId),
}

impl Transition {
    /// Request a switch to state `S`.
    #[must_use]
    pub fn to<S: 'static>() -> Self {
        Self::To(StateId::of::<S>())
    }
}

/// One state of a [`StateMachine`]. Every hook defaults to a no-op.
pub trait State<C>: Send + Sync + 'static {
    fn on_enter(&mut self, _ctx: &mut C) {}

    fn on_update(&mut self, _ctx: &mut C) -> Transition {
        Transition::Stay
    }

    fn on_fixed_update(&mut self, _ctx: &mut C) {}

    fn on_exit(&mut self, _ctx: &mut C) {}
}

/// Registry of states with a single current state.
///
/// `on_exit` of the outgoing state always runs before `on_enter` of the
/// incoming one. Requests for unregistered states are rejected before any
/// hook runs, so the machine never leaves a valid state for an undefined one.
pub struct StateMachine<C> {
    states: HashMap<StateId, Box<dyn State<C>>>,
    current: Option<StateId>,
}

impl<C> Default for StateMachine<C> {
    fn default() -> Self {
        Self {
            states: HashMap::new(),
            current: None,
        }
    }
}

impl<C> fmt::Debug for StateMachine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("states", &self.states.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .finish()
    }
}

impl<C: 'static> StateMachine<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `state`, replacing any previous instance of the same type.
    pub fn register_state<S: State<C>>(&mut self, state: S) {
        self.states.insert(StateId::of::<S>(), Box::new(state));
    }

    /// Builder form of [`Self::register_state`].
    #[must_use]
    pub fn with_state<S: State<C>>(mut self, state: S) -> Self {
        self.register_state(state);
        self
    }

    #[must_use]
    pub const fn current(&self) -> Option<StateId> {
        self.current
    }

    #[must_use]
    pub fn is_in<S: 'static>(&self) -> bool {
        self.current == Some(StateId::of::<S>())
    }

    #[cfg(test)]
    #[must_use]
    pub fn is_registered<S: 'static>(&self) -> bool {
        self.states.contains_key(&StateId::of::<S>())
    }

    /// Switch to state `S`. Returns `false` (and changes nothing) if `S` was
    /// never registered.
    pub fn change_state<S: 'static>(&mut self, ctx: &mut C) -> bool {
        self.change_to(StateId::of::<S>(), ctx)
    }

    /// Switch to the state identified by `id`. See [`Self::change_state`].
    pub fn change_to(&mut self, id: StateId, ctx: &mut C) -> bool {
        if !self.states.contains_key(&id) {
            error!(
                "state machine has no `{}` state registered; staying in {:?}",
                id.name(),
                self.current
            );
            return false;
        }

        if let Some(state) = self.current.take().and_then(|old| self.states.get_mut(&old)) {
            state.on_exit(ctx);
        }

        self.current = Some(id);
        if let Some(state) = self.states.get_mut(&id) {
            state.on_enter(ctx);
        }
        true
    }

    /// Run the current state's update and apply the transition it asks for.
    pub fn tick(&mut self, ctx: &mut C) {
        let Some(id) = self.current else {
            return;
        };
        let transition = match self.states.get_mut(&id) {
            Some(state) => state.on_update(ctx),
            None => Transition::Stay,
        };
        if let Transition::To(next) = transition {
            self.change_to(next, ctx);
        }
    }

    /// Run the current state's fixed update.
    pub fn fixed_tick(&mut self, ctx: &mut C) {
        let Some(id) = self.current else {
            return;
        };
        if let Some(state) = self.states.get_mut(&id) {
            state.on_fixed_update(ctx);
        }
    }
}
