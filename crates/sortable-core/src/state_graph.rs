#![forbid(unsafe_code)]

//! Graph-constrained finite state machine with per-state event dispatch.
//!
//! A [`StateGraph`] owns the current state, a declared set of vertices with an
//! adjacency relation, and a handler table keyed by `(state, event kind)`.
//! Handlers are plain function pointers that receive a caller-owned context
//! and the event payload, and return the next state (or `None` to stay).
//!
//! # Invariants
//!
//! 1. Only a `(current state, event kind)` pair with a registered handler has
//!    any effect. Every other event is dropped silently ([`Dispatch::Ignored`]).
//! 2. A handler's returned state becomes the current state unconditionally.
//!    Leaving the declared adjacency is logged at `warn` but never refused;
//!    legality is encoded by which handlers are registered where.
//! 3. Every state named by the entry, a handler, or an edge is a declared
//!    vertex (checked by [`StateGraphBuilder::build`]).
//!
//! Handlers are synchronous. Work they start asynchronously reports back by a
//! later [`StateGraph::submit`] call; the engine has no notion of pending work.

use std::fmt;
use std::hash::Hash;

use ahash::AHashMap;

use crate::logging::GRAPH_TARGET;

/// An event that can be dispatched through a [`StateGraph`].
///
/// The kind is the tag used for handler lookup; the event itself is the
/// payload handed to the handler.
pub trait GraphEvent {
    /// Payload-free tag identifying the event variant.
    type Kind: Copy + Eq + Hash + fmt::Debug;

    /// The tag of this event.
    fn kind(&self) -> Self::Kind;
}

/// Handler invoked for a `(state, event kind)` pair.
pub type Handler<S, E, C> = fn(&mut C, E) -> Option<S>;

/// Small integer id assigned to each declared state, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub u16);

/// Outcome of a single [`StateGraph::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch<S> {
    /// No handler registered for the current state and event kind.
    Ignored,
    /// A handler ran and kept the machine in this state.
    Stayed(S),
    /// A handler ran and moved the machine.
    Transitioned { from: S, to: S },
}

impl<S> Dispatch<S> {
    /// Whether a handler ran for the event.
    #[must_use]
    pub const fn was_handled(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Where an undeclared state was referenced while building a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphRole {
    Entry,
    Handler,
    EdgeSource,
    EdgeTarget,
}

/// Errors raised while building a [`StateGraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError<S> {
    /// A state was referenced but never declared as a vertex.
    UndeclaredState { state: S, role: GraphRole },
    /// Two handlers were registered for the same state and event kind.
    DuplicateHandler { state: S, event: String },
    /// More states than [`StateId`] can address.
    TooManyStates { count: usize },
}

impl<S: fmt::Debug> fmt::Display for GraphError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndeclaredState { state, role } => {
                write!(f, "state {state:?} used as {role:?} but never declared")
            }
            Self::DuplicateHandler { state, event } => {
                write!(f, "duplicate handler for event {event} in state {state:?}")
            }
            Self::TooManyStates { count } => {
                write!(f, "{count} states exceed the addressable state id range")
            }
        }
    }
}

impl<S: fmt::Debug> std::error::Error for GraphError<S> {}

/// Builder collecting vertices, edges, and handlers for a [`StateGraph`].
pub struct StateGraphBuilder<S, E: GraphEvent, C> {
    entry: S,
    states: Vec<S>,
    edges: Vec<(S, S)>,
    handlers: Vec<(S, E::Kind, Handler<S, E, C>)>,
}

impl<S, E, C> StateGraphBuilder<S, E, C>
where
    S: Copy + Eq + Hash + fmt::Debug,
    E: GraphEvent,
{
    /// Start a graph whose machine begins in `entry`.
    #[must_use]
    pub fn new(entry: S) -> Self {
        Self {
            entry,
            states: Vec::new(),
            edges: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Declare a vertex. Declaring the same state twice is harmless.
    #[must_use]
    pub fn state(mut self, state: S) -> Self {
        if !self.states.contains(&state) {
            self.states.push(state);
        }
        self
    }

    /// Declare an allowed transition `from → to`.
    #[must_use]
    pub fn edge(mut self, from: S, to: S) -> Self {
        self.edges.push((from, to));
        self
    }

    /// Register `handler` for `kind` while the machine is in `state`.
    #[must_use]
    pub fn on(mut self, state: S, kind: E::Kind, handler: Handler<S, E, C>) -> Self {
        self.handlers.push((state, kind, handler));
        self
    }

    /// Validate the declarations and produce the machine.
    pub fn build(self) -> Result<StateGraph<S, E, C>, GraphError<S>> {
        if self.states.len() > usize::from(u16::MAX) {
            return Err(GraphError::TooManyStates {
                count: self.states.len(),
            });
        }

        let mut vertices = AHashMap::with_capacity(self.states.len());
        for (idx, state) in self.states.iter().enumerate() {
            vertices.insert(*state, StateId(idx as u16));
        }

        let lookup = |state: S, role: GraphRole| {
            vertices
                .get(&state)
                .copied()
                .ok_or(GraphError::UndeclaredState { state, role })
        };

        lookup(self.entry, GraphRole::Entry)?;

        let mut adjacency = vec![Vec::new(); self.states.len()];
        for (from, to) in &self.edges {
            let from_id = lookup(*from, GraphRole::EdgeSource)?;
            let to_id = lookup(*to, GraphRole::EdgeTarget)?;
            let neighbors: &mut Vec<StateId> = &mut adjacency[usize::from(from_id.0)];
            if !neighbors.contains(&to_id) {
                neighbors.push(to_id);
            }
        }

        let mut handlers = AHashMap::with_capacity(self.handlers.len());
        for (state, kind, handler) in self.handlers {
            lookup(state, GraphRole::Handler)?;
            if handlers.insert((state, kind), handler).is_some() {
                return Err(GraphError::DuplicateHandler {
                    state,
                    event: format!("{kind:?}"),
                });
            }
        }

        Ok(StateGraph {
            entry: self.entry,
            current: self.entry,
            vertices,
            adjacency,
            handlers,
        })
    }
}

/// Finite state machine dispatching events to per-state handlers.
pub struct StateGraph<S, E: GraphEvent, C> {
    entry: S,
    current: S,
    vertices: AHashMap<S, StateId>,
    adjacency: Vec<Vec<StateId>>,
    handlers: AHashMap<(S, E::Kind), Handler<S, E, C>>,
}

impl<S: fmt::Debug, E: GraphEvent, C> fmt::Debug for StateGraph<S, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateGraph")
            .field("current", &self.current)
            .field("states", &self.vertices.len())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl<S, E, C> StateGraph<S, E, C>
where
    S: Copy + Eq + Hash + fmt::Debug,
    E: GraphEvent,
{
    /// Shorthand for [`StateGraphBuilder::new`].
    #[must_use]
    pub fn builder(entry: S) -> StateGraphBuilder<S, E, C> {
        StateGraphBuilder::new(entry)
    }

    /// The state the machine is in.
    #[inline]
    #[must_use]
    pub fn current(&self) -> S {
        self.current
    }

    /// The id assigned to `state`, if it was declared.
    #[must_use]
    pub fn id_of(&self, state: S) -> Option<StateId> {
        self.vertices.get(&state).copied()
    }

    /// Whether `to` is in the declared adjacency of `from`.
    #[must_use]
    pub fn is_edge(&self, from: S, to: S) -> bool {
        match (self.id_of(from), self.id_of(to)) {
            (Some(from), Some(to)) => self
                .adjacency
                .get(usize::from(from.0))
                .is_some_and(|neighbors| neighbors.contains(&to)),
            _ => false,
        }
    }

    /// Whether an event of `kind` would reach a handler in the current state.
    #[must_use]
    pub fn accepts(&self, kind: E::Kind) -> bool {
        self.handlers.contains_key(&(self.current, kind))
    }

    /// Dispatch `event` to the handler registered for the current state.
    pub fn submit(&mut self, ctx: &mut C, event: E) -> Dispatch<S> {
        let from = self.current;
        let kind = event.kind();
        let Some(handler) = self.handlers.get(&(from, kind)).copied() else {
            tracing::trace!(target: GRAPH_TARGET, state = ?from, event = ?kind, "event ignored");
            return Dispatch::Ignored;
        };

        match handler(ctx, event) {
            None => Dispatch::Stayed(from),
            Some(to) => {
                if !self.is_edge(from, to) {
                    tracing::warn!(
                        target: GRAPH_TARGET,
                        from = ?from,
                        to = ?to,
                        event = ?kind,
                        "transition outside declared adjacency"
                    );
                }
                tracing::trace!(target: GRAPH_TARGET, from = ?from, to = ?to, event = ?kind, "transition");
                self.current = to;
                Dispatch::Transitioned { from, to }
            }
        }
    }

    /// Return to the entry state without running any handler.
    pub fn reset(&mut self) {
        self.current = self.entry;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Phase {
        Idle,
        Running,
        Done,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Signal {
        Start(&'static str),
        Stop,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum SignalKind {
        Start,
        Stop,
    }

    impl GraphEvent for Signal {
        type Kind = SignalKind;

        fn kind(&self) -> SignalKind {
            match self {
                Self::Start(_) => SignalKind::Start,
                Self::Stop => SignalKind::Stop,
            }
        }
    }

    #[derive(Default)]
    struct Calls(Vec<&'static str>);

    fn on_start(calls: &mut Calls, signal: Signal) -> Option<Phase> {
        let Signal::Start(payload) = signal else {
            return None;
        };
        calls.0.push(payload);
        (payload == "correct").then_some(Phase::Running)
    }

    fn machine() -> StateGraph<Phase, Signal, Calls> {
        StateGraph::builder(Phase::Idle)
            .state(Phase::Idle)
            .state(Phase::Running)
            .state(Phase::Done)
            .edge(Phase::Idle, Phase::Running)
            .edge(Phase::Running, Phase::Done)
            .on(Phase::Idle, SignalKind::Start, on_start)
            .on(Phase::Running, SignalKind::Stop, |_, _| Some(Phase::Done))
            .build()
            .expect("valid graph")
    }

    #[test]
    fn starts_in_entry_state() {
        assert_eq!(machine().current(), Phase::Idle);
    }

    #[test]
    fn unregistered_event_is_ignored() {
        let mut graph = machine();
        let mut calls = Calls::default();
        assert_eq!(graph.submit(&mut calls, Signal::Stop), Dispatch::Ignored);
        assert_eq!(graph.current(), Phase::Idle);
        assert!(calls.0.is_empty());
    }

    #[test]
    fn handler_decides_whether_to_transition() {
        let mut graph = machine();
        let mut calls = Calls::default();

        let outcome = graph.submit(&mut calls, Signal::Start("incorrect"));
        assert_eq!(outcome, Dispatch::Stayed(Phase::Idle));
        assert!(outcome.was_handled());

        let outcome = graph.submit(&mut calls, Signal::Start("correct"));
        assert_eq!(
            outcome,
            Dispatch::Transitioned {
                from: Phase::Idle,
                to: Phase::Running
            }
        );
        assert_eq!(calls.0, vec!["incorrect", "correct"]);
    }

    #[test]
    fn handlers_are_scoped_per_state() {
        let mut graph = machine();
        let mut calls = Calls::default();
        graph.submit(&mut calls, Signal::Start("correct"));

        // Start is not registered in Running.
        assert_eq!(
            graph.submit(&mut calls, Signal::Start("correct")),
            Dispatch::Ignored
        );
        assert!(graph.accepts(SignalKind::Stop));
        assert!(!graph.accepts(SignalKind::Start));

        graph.submit(&mut calls, Signal::Stop);
        assert_eq!(graph.current(), Phase::Done);
    }

    #[test]
    fn transition_outside_adjacency_still_applies() {
        let mut graph: StateGraph<Phase, Signal, Calls> = StateGraph::builder(Phase::Idle)
            .state(Phase::Idle)
            .state(Phase::Done)
            .on(Phase::Idle, SignalKind::Stop, |_, _| Some(Phase::Done))
            .build()
            .expect("valid graph");
        assert!(!graph.is_edge(Phase::Idle, Phase::Done));

        graph.submit(&mut Calls::default(), Signal::Stop);
        assert_eq!(graph.current(), Phase::Done);
    }

    #[test]
    fn reset_returns_to_entry() {
        let mut graph = machine();
        graph.submit(&mut Calls::default(), Signal::Start("correct"));
        graph.reset();
        assert_eq!(graph.current(), Phase::Idle);
    }

    #[test]
    fn ids_follow_declaration_order() {
        let graph = machine();
        assert_eq!(graph.id_of(Phase::Idle), Some(StateId(0)));
        assert_eq!(graph.id_of(Phase::Done), Some(StateId(2)));
        assert!(graph.is_edge(Phase::Idle, Phase::Running));
        assert!(!graph.is_edge(Phase::Running, Phase::Idle));
    }

    #[test]
    fn undeclared_states_are_rejected() {
        let err = StateGraph::<Phase, Signal, Calls>::builder(Phase::Idle)
            .state(Phase::Running)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::UndeclaredState {
                state: Phase::Idle,
                role: GraphRole::Entry
            }
        );

        let err = StateGraph::<Phase, Signal, Calls>::builder(Phase::Idle)
            .state(Phase::Idle)
            .edge(Phase::Idle, Phase::Done)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::UndeclaredState {
                role: GraphRole::EdgeTarget,
                ..
            }
        ));

        let err = StateGraph::<Phase, Signal, Calls>::builder(Phase::Idle)
            .state(Phase::Idle)
            .on(Phase::Running, SignalKind::Stop, |_, _| None)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Running"));
    }

    #[test]
    fn duplicate_handlers_are_rejected() {
        let err = StateGraph::<Phase, Signal, Calls>::builder(Phase::Idle)
            .state(Phase::Idle)
            .on(Phase::Idle, SignalKind::Stop, |_, _| None)
            .on(Phase::Idle, SignalKind::Stop, |_, _| None)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::DuplicateHandler {
                state: Phase::Idle,
                event: "Stop".to_string()
            }
        );
    }
}
