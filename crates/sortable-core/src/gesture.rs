#![forbid(unsafe_code)]

//! Gesture classification: turns one item's contact stream into gestures.
//!
//! [`GestureClassifier`] is a [`StateGraph`] over [`TouchState`] driven by
//! [`ContactSample`]s and a single hold timer.
//!
//! # State Machine
//!
//! ```text
//!            start(1 contact)          hold timer
//!   Idle ───────────────────► Touch ─────────────► Hold ──move──► Drag ─┐
//!    ▲                          │ move                │               move│
//!    │                          ▼                     │                 ◄┘
//!    │                        Scroll                  │
//!    └──────── end (tap / – / hold-release / drag-end)┘
//! ```
//!
//! | State  | Input       | Emits          | Next   |
//! |--------|-------------|----------------|--------|
//! | Idle   | start (1)   | –              | Touch  |
//! | Touch  | end         | `Tap`          | Idle   |
//! | Touch  | move        | `Scroll`       | Scroll |
//! | Touch  | hold timer  | `Hold`         | Hold   |
//! | Hold   | end         | `HoldRelease`  | Idle   |
//! | Hold   | move        | `DragStart`    | Drag   |
//! | Drag   | move        | `Drag`         | Drag   |
//! | Drag   | end         | `DragEnd`      | Idle   |
//! | Scroll | end         | –              | Idle   |
//!
//! # Invariants
//!
//! 1. Exactly one of `Tap`, `Hold`+`HoldRelease`, `DragStart`…`DragEnd`, or
//!    `Scroll` is emitted per contact lifetime.
//! 2. A start with zero or several contacts is ignored and leaves the
//!    classifier in `Idle`.
//! 3. The hold timer is armed only in `Touch` and is disarmed by any
//!    transition out of `Touch`.
//!
//! # Timing
//!
//! Time is injected. Arming the timer records a deadline; the host wakes up
//! at [`GestureClassifier::hold_deadline`] and calls
//! [`GestureClassifier::fire_hold`]. Wake-ups for a cancelled or not-yet-due
//! timer are ignored.

use web_time::Instant;

use crate::config::GestureConfig;
use crate::contact::{Contact, ContactSample};
use crate::geometry::Point;
use crate::logging::GESTURE_TARGET;
use crate::state_graph::{Dispatch, GraphEvent, StateGraph};

/// Classifier states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchState {
    Idle,
    Touch,
    Hold,
    Drag,
    Scroll,
}

/// A classified gesture. Every variant carries the contact position the
/// classification was made at (the last known position for `End`-driven
/// gestures).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Tap { pos: Point },
    Hold { pos: Point },
    HoldRelease { pos: Point },
    DragStart { pos: Point },
    Drag { pos: Point },
    DragEnd { pos: Point },
    Scroll { pos: Point },
}

impl Gesture {
    /// Stable lowercase name, used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Tap { .. } => "tap",
            Self::Hold { .. } => "hold",
            Self::HoldRelease { .. } => "hold-release",
            Self::DragStart { .. } => "drag-start",
            Self::Drag { .. } => "drag",
            Self::DragEnd { .. } => "drag-end",
            Self::Scroll { .. } => "scroll",
        }
    }

    /// Position the gesture was classified at.
    #[must_use]
    pub const fn pos(&self) -> Point {
        match *self {
            Self::Tap { pos }
            | Self::Hold { pos }
            | Self::HoldRelease { pos }
            | Self::DragStart { pos }
            | Self::Drag { pos }
            | Self::DragEnd { pos }
            | Self::Scroll { pos } => pos,
        }
    }
}

/// Input dispatched through the classifier's graph.
#[derive(Debug, Clone, PartialEq)]
enum TouchInput {
    Start(Vec<Contact>),
    Move(Vec<Contact>),
    End,
    HoldElapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TouchInputKind {
    Start,
    Move,
    End,
    HoldElapsed,
}

impl GraphEvent for TouchInput {
    type Kind = TouchInputKind;

    fn kind(&self) -> TouchInputKind {
        match self {
            Self::Start(_) => TouchInputKind::Start,
            Self::Move(_) => TouchInputKind::Move,
            Self::End => TouchInputKind::End,
            Self::HoldElapsed => TouchInputKind::HoldElapsed,
        }
    }
}

impl From<ContactSample> for TouchInput {
    fn from(sample: ContactSample) -> Self {
        match sample {
            ContactSample::Start(contacts) => Self::Start(contacts),
            ContactSample::Move(contacts) => Self::Move(contacts),
            ContactSample::End => Self::End,
        }
    }
}

/// Mutable state the transition handlers act on.
#[derive(Debug)]
struct TouchContext {
    config: GestureConfig,
    now: Instant,
    hold_deadline: Option<Instant>,
    last_pos: Point,
    emitted: Option<Gesture>,
}

impl TouchContext {
    fn track(&mut self, contacts: &[Contact]) {
        if let Some(contact) = contacts.first() {
            self.last_pos = contact.position;
        }
    }

    fn emit(&mut self, gesture: Gesture) {
        tracing::debug!(target: GESTURE_TARGET, gesture = gesture.name(), x = gesture.pos().x, y = gesture.pos().y, "gesture");
        self.emitted = Some(gesture);
    }
}

// ---------------------------------------------------------------------------
// Transition handlers
// ---------------------------------------------------------------------------

fn idle_on_start(ctx: &mut TouchContext, input: TouchInput) -> Option<TouchState> {
    let TouchInput::Start(contacts) = input else {
        return None;
    };
    let [contact] = contacts.as_slice() else {
        tracing::trace!(target: GESTURE_TARGET, contacts = contacts.len(), "multi-contact start ignored");
        return None;
    };
    ctx.last_pos = contact.position;
    ctx.hold_deadline = Some(ctx.now + ctx.config.min_time_to_hold);
    Some(TouchState::Touch)
}

fn touch_on_end(ctx: &mut TouchContext, _: TouchInput) -> Option<TouchState> {
    ctx.hold_deadline = None;
    ctx.emit(Gesture::Tap { pos: ctx.last_pos });
    Some(TouchState::Idle)
}

fn touch_on_move(ctx: &mut TouchContext, input: TouchInput) -> Option<TouchState> {
    if let TouchInput::Move(contacts) = &input {
        ctx.track(contacts);
    }
    ctx.hold_deadline = None;
    ctx.emit(Gesture::Scroll { pos: ctx.last_pos });
    Some(TouchState::Scroll)
}

fn touch_on_hold(ctx: &mut TouchContext, _: TouchInput) -> Option<TouchState> {
    ctx.hold_deadline = None;
    ctx.emit(Gesture::Hold { pos: ctx.last_pos });
    Some(TouchState::Hold)
}

fn hold_on_end(ctx: &mut TouchContext, _: TouchInput) -> Option<TouchState> {
    ctx.emit(Gesture::HoldRelease { pos: ctx.last_pos });
    Some(TouchState::Idle)
}

fn hold_on_move(ctx: &mut TouchContext, input: TouchInput) -> Option<TouchState> {
    if let TouchInput::Move(contacts) = &input {
        ctx.track(contacts);
    }
    ctx.emit(Gesture::DragStart { pos: ctx.last_pos });
    Some(TouchState::Drag)
}

fn drag_on_move(ctx: &mut TouchContext, input: TouchInput) -> Option<TouchState> {
    if let TouchInput::Move(contacts) = &input {
        ctx.track(contacts);
    }
    ctx.emit(Gesture::Drag { pos: ctx.last_pos });
    None
}

fn drag_on_end(ctx: &mut TouchContext, _: TouchInput) -> Option<TouchState> {
    ctx.emit(Gesture::DragEnd { pos: ctx.last_pos });
    Some(TouchState::Idle)
}

fn scroll_on_end(_: &mut TouchContext, _: TouchInput) -> Option<TouchState> {
    Some(TouchState::Idle)
}

fn touch_graph() -> StateGraph<TouchState, TouchInput, TouchContext> {
    use TouchInputKind as K;
    use TouchState as S;

    let built = StateGraph::builder(S::Idle)
        .state(S::Idle)
        .state(S::Touch)
        .state(S::Hold)
        .state(S::Drag)
        .state(S::Scroll)
        .edge(S::Idle, S::Touch)
        .edge(S::Touch, S::Idle)
        .edge(S::Touch, S::Hold)
        .edge(S::Touch, S::Scroll)
        .edge(S::Hold, S::Idle)
        .edge(S::Hold, S::Drag)
        .edge(S::Drag, S::Idle)
        .edge(S::Scroll, S::Idle)
        .on(S::Idle, K::Start, idle_on_start)
        .on(S::Touch, K::End, touch_on_end)
        .on(S::Touch, K::Move, touch_on_move)
        .on(S::Touch, K::HoldElapsed, touch_on_hold)
        .on(S::Hold, K::End, hold_on_end)
        .on(S::Hold, K::Move, hold_on_move)
        .on(S::Drag, K::Move, drag_on_move)
        .on(S::Drag, K::End, drag_on_end)
        .on(S::Scroll, K::End, scroll_on_end)
        .build();

    match built {
        Ok(graph) => graph,
        // The table above declares every state it references.
        Err(err) => unreachable!("touch graph is statically valid: {err}"),
    }
}

// ---------------------------------------------------------------------------
// GestureClassifier
// ---------------------------------------------------------------------------

/// Per-item classifier turning contact samples into [`Gesture`]s.
pub struct GestureClassifier {
    graph: StateGraph<TouchState, TouchInput, TouchContext>,
    ctx: TouchContext,
}

impl std::fmt::Debug for GestureClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureClassifier")
            .field("state", &self.state())
            .field("hold_armed", &self.ctx.hold_deadline.is_some())
            .finish()
    }
}

impl GestureClassifier {
    /// Create a classifier in `Idle`.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            graph: touch_graph(),
            ctx: TouchContext {
                config,
                now: Instant::now(),
                hold_deadline: None,
                last_pos: Point::default(),
                emitted: None,
            },
        }
    }

    /// Feed one contact sample observed at `now`.
    pub fn process(&mut self, sample: ContactSample, now: Instant) -> Option<Gesture> {
        self.dispatch(TouchInput::from(sample), now)
    }

    /// Deliver the hold timer if it is armed and due at `now`.
    pub fn fire_hold(&mut self, now: Instant) -> Option<Gesture> {
        match self.ctx.hold_deadline {
            Some(deadline) if now >= deadline => self.dispatch(TouchInput::HoldElapsed, now),
            _ => None,
        }
    }

    /// Deadline of the armed hold timer, if any.
    #[inline]
    #[must_use]
    pub fn hold_deadline(&self) -> Option<Instant> {
        self.ctx.hold_deadline
    }

    /// Current classifier state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> TouchState {
        self.graph.current()
    }

    /// Abandon any in-progress contact without emitting anything.
    pub fn reset(&mut self) {
        self.graph.reset();
        self.ctx.hold_deadline = None;
        self.ctx.emitted = None;
    }

    /// Get a reference to the current configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.ctx.config
    }

    /// Update the configuration. An armed timer keeps its deadline.
    pub fn set_config(&mut self, config: GestureConfig) {
        self.ctx.config = config;
    }

    fn dispatch(&mut self, input: TouchInput, now: Instant) -> Option<Gesture> {
        self.ctx.now = now;
        self.ctx.emitted = None;
        if let Dispatch::Ignored = self.graph.submit(&mut self.ctx, input) {
            return None;
        }
        self.ctx.emitted.take()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
