#![forbid(unsafe_code)]

//! Drag-to-reorder session coordination.
//!
//! [`SessionCoordinator`] is a [`StateGraph`] over [`SessionState`] driven by
//! [`ListEvent`]s: the gestures of every item's classifier plus swap
//! completion signals reported by the host.
//!
//! # State Machine
//!
//! | State     | Event          | Effect                                     | Next        |
//! |-----------|----------------|--------------------------------------------|-------------|
//! | Idle      | tap            | `on_tap`                                   | Idle        |
//! | Idle      | hold           | select item, `on_hold`                     | Selecting   |
//! | Idle      | drag-start     | select item, create drag visuals           | Dragging    |
//! | Selecting | tap            | toggle item, `on_tap`                      | Idle if empty |
//! | Selecting | drag-start     | select pivot, create drag visuals          | Dragging    |
//! | Dragging  | drag           | move visuals, hit test, maybe animate swap | Swapping    |
//! | Dragging  | drag-end       | tear down, deselect all, `on_swap`         | Idle        |
//! | Swapping  | drag           | move visuals only                          | Swapping    |
//! | Swapping  | swap-complete  | relocate selection, `on_swap_end`          | Dragging    |
//! | Swapping  | drag-end       | tear down without awaiting the animation   | Idle        |
//!
//! Hold-release is reported in `Idle` and `Selecting`, and only for the item
//! whose hold was reported; scroll in every state.
//! Any other `(state, event)` pair is ignored.
//!
//! # Invariants
//!
//! 1. At most one swap animation is in flight: a hover is only acted on in
//!    `Dragging`, and only a completion carrying the in-flight ticket leaves
//!    `Swapping` through the swap path.
//! 2. The order model is mutated only when a swap completes with
//!    [`SwapOutcome::Finished`].
//! 3. Leaving a drag always tears down the drag visuals and empties the
//!    selection.
//!
//! # Early drag-end
//!
//! A drag-end while `Swapping` returns to `Idle` at once. The animation
//! already requested is not awaited; its completion arrives in `Idle`, is
//! ignored, and the swap it describes is never applied to the order.

use std::fmt;
use std::time::Duration;

use sortable_core::config::SortableConfig;
use sortable_core::geometry::Point;
use sortable_core::gesture::Gesture;
use sortable_core::logging::SESSION_TARGET;
use sortable_core::state_graph::{Dispatch, GraphEvent, StateGraph};

use crate::item::ItemId;
use crate::order::{OrderError, OrderModel};
use crate::presenter::{
    DragOrigin, Observer, Presenter, SwapDirection, SwapOutcome, SwapRequest, SwapTicket,
};
use crate::selection::Selection;

/// Coordinator states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Selecting,
    Dragging,
    Swapping,
}

/// Events submitted to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListEvent {
    Tap(ItemId),
    Hold(ItemId),
    HoldRelease(ItemId),
    Scroll(ItemId),
    DragStart { item: ItemId, pointer: Point },
    Drag { item: ItemId, pointer: Point },
    DragEnd { item: ItemId, pointer: Point },
    /// The host finished (or failed) the swap animation for `ticket`.
    SwapComplete {
        ticket: SwapTicket,
        outcome: SwapOutcome,
    },
}

/// Tag of a [`ListEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListEventKind {
    Tap,
    Hold,
    HoldRelease,
    Scroll,
    DragStart,
    Drag,
    DragEnd,
    SwapComplete,
}

impl GraphEvent for ListEvent {
    type Kind = ListEventKind;

    fn kind(&self) -> ListEventKind {
        match self {
            Self::Tap(_) => ListEventKind::Tap,
            Self::Hold(_) => ListEventKind::Hold,
            Self::HoldRelease(_) => ListEventKind::HoldRelease,
            Self::Scroll(_) => ListEventKind::Scroll,
            Self::DragStart { .. } => ListEventKind::DragStart,
            Self::Drag { .. } => ListEventKind::Drag,
            Self::DragEnd { .. } => ListEventKind::DragEnd,
            Self::SwapComplete { .. } => ListEventKind::SwapComplete,
        }
    }
}

impl ListEvent {
    /// The event a gesture classified on `item` submits.
    #[must_use]
    pub fn from_gesture(item: ItemId, gesture: Gesture) -> Self {
        match gesture {
            Gesture::Tap { .. } => Self::Tap(item),
            Gesture::Hold { .. } => Self::Hold(item),
            Gesture::HoldRelease { .. } => Self::HoldRelease(item),
            Gesture::Scroll { .. } => Self::Scroll(item),
            Gesture::DragStart { pos } => Self::DragStart { item, pointer: pos },
            Gesture::Drag { pos } => Self::Drag { item, pointer: pos },
            Gesture::DragEnd { pos } => Self::DragEnd { item, pointer: pos },
        }
    }
}

/// Errors surfaced by the coordinator.
///
/// These indicate a broken contract between the host and the list (an
/// identifier outside the list), not a user-recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// An order model operation failed while handling an event.
    Order {
        op: &'static str,
        source: OrderError,
    },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Order { op, source } => write!(f, "{op} failed: {source}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Order { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingSwap {
    ticket: SwapTicket,
    target: ItemId,
}

/// Bookkeeping for the active drag.
struct DragSession<V> {
    pivot: ItemId,
    visuals: V,
    origin: DragOrigin,
    /// Selection in list order at drag start; moved as one block.
    dragged: Vec<ItemId>,
    /// Last hovered item a swap was started for.
    target: Option<ItemId>,
    pending: Option<PendingSwap>,
    order_at_start: Vec<ItemId>,
}

/// Context the transition handlers act on.
struct Session<P: Presenter, O> {
    order: OrderModel,
    selection: Selection,
    presenter: P,
    observer: O,
    drag: Option<DragSession<P::DragVisuals>>,
    /// Item whose hold was reported and whose release is still due.
    held: Option<ItemId>,
    next_ticket: u64,
    animation_duration: Duration,
    error: Option<SessionError>,
}

impl<P: Presenter, O: Observer> Session<P, O> {
    fn fail(&mut self, op: &'static str, source: OrderError) {
        tracing::warn!(target: SESSION_TARGET, op, error = %source, "order operation failed");
        self.error = Some(SessionError::Order { op, source });
    }

    fn select(&mut self, id: ItemId) {
        if self.selection.insert(id) {
            self.presenter.set_selected(id, true);
        }
    }

    fn issue_ticket(&mut self) -> SwapTicket {
        let ticket = SwapTicket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    /// Begin a drag with `pivot` as origin. Returns `false` if nothing began.
    fn begin_drag(&mut self, pivot: ItemId, pointer: Point) -> bool {
        let mut dragged: Vec<ItemId> = self.selection.iter().collect();
        if !self.selection.contains(pivot) {
            dragged.push(pivot);
        }
        if let Err(err) = self.order.sort_by_position(&mut dragged) {
            self.fail("drag start", err);
            return false;
        }
        self.select(pivot);
        self.held = None;

        let origin = DragOrigin {
            rect: self.presenter.measure_geometry(pivot),
            pointer,
        };
        let visuals = self.presenter.create_drag_visuals(&dragged, pivot, origin);
        tracing::debug!(target: SESSION_TARGET, pivot = %pivot, selected = dragged.len(), "drag started");
        self.observer.on_drag_start(pivot, &dragged);

        self.drag = Some(DragSession {
            pivot,
            visuals,
            origin,
            dragged,
            target: None,
            pending: None,
            order_at_start: self.order.ids().to_vec(),
        });
        true
    }

    fn move_visuals(&mut self, pointer: Point) {
        if let Some(drag) = self.drag.as_mut() {
            self.presenter.move_drag_visuals(&mut drag.visuals, pointer);
        }
    }

    /// Build the swap request for hovering `hovered`, if it is actionable.
    fn plan_swap(&mut self, hovered: ItemId) -> Option<SwapRequest> {
        let pivot = self.drag.as_ref()?.pivot;
        if hovered == pivot || self.selection.contains(hovered) {
            return None;
        }
        let positions = self
            .order
            .position(pivot)
            .and_then(|p| self.order.position(hovered).map(|h| (p, h)));
        let (pivot_pos, hover_pos) = match positions {
            Ok(pair) => pair,
            Err(err) => {
                self.fail("hover", err);
                return None;
            }
        };

        let (direction, run) = if hover_pos < pivot_pos {
            (SwapDirection::TowardStart, self.order.range(hovered, pivot))
        } else {
            (SwapDirection::TowardEnd, self.order.range(pivot, hovered))
        };
        let range = run.into_iter().filter(|id| *id != pivot).collect();

        Some(SwapRequest {
            ticket: self.issue_ticket(),
            pivot,
            range,
            direction,
            duration: self.animation_duration,
        })
    }

    /// Tear down the active drag and report its summary.
    fn finish_drag(&mut self) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        if let Some(pending) = drag.pending {
            tracing::warn!(
                target: SESSION_TARGET,
                ticket = pending.ticket.0,
                target_item = %pending.target,
                "drag ended with swap animation in flight; swap will not be applied"
            );
        }
        self.presenter.teardown_drag_visuals(drag.visuals);
        for id in self.selection.drain() {
            self.presenter.set_selected(id, false);
        }
        tracing::debug!(target: SESSION_TARGET, pivot = %drag.pivot, last_target = ?drag.target, "drag ended");
        self.observer.on_swap(&drag.dragged, drag.target);
        if drag.order_at_start.as_slice() != self.order.ids() {
            self.observer.on_change(&drag.order_at_start, self.order.ids());
        }
    }
}

// ---------------------------------------------------------------------------
// Transition handlers
// ---------------------------------------------------------------------------

fn on_tap_idle<P: Presenter, O: Observer>(
    s: &mut Session<P, O>,
    event: ListEvent,
) -> Option<SessionState> {
    if let ListEvent::Tap(id) = event {
        s.observer.on_tap(id);
    }
    None
}

fn on_hold_idle<P: Presenter, O: Observer>(
    s: &mut Session<P, O>,
    event: ListEvent,
) -> Option<SessionState> {
    let ListEvent::Hold(id) = event else {
        return None;
    };
    if let Err(err) = s.order.position(id) {
        s.fail("hold", err);
        return None;
    }
    s.select(id);
    s.held = Some(id);
    s.observer.on_hold(id);
    Some(SessionState::Selecting)
}

fn on_hold_release<P: Presenter, O: Observer>(
    s: &mut Session<P, O>,
    event: ListEvent,
) -> Option<SessionState> {
    if let ListEvent::HoldRelease(id) = event
        && s.held == Some(id)
    {
        s.held = None;
        s.observer.on_hold_release(id);
    }
    None
}

fn on_scroll<P: Presenter, O: Observer>(
    s: &mut Session<P, O>,
    event: ListEvent,
) -> Option<SessionState> {
    if let ListEvent::Scroll(id) = event {
        s.observer.on_scroll(id);
    }
    None
}

fn on_tap_selecting<P: Presenter, O: Observer>(
    s: &mut Session<P, O>,
    event: ListEvent,
) -> Option<SessionState> {
    let ListEvent::Tap(id) = event else {
        return None;
    };
    if let Err(err) = s.order.position(id) {
        s.fail("tap", err);
        return None;
    }
    let selected = s.selection.toggle(id);
    s.presenter.set_selected(id, selected);
    s.observer.on_tap(id);
    s.selection.is_empty().then_some(SessionState::Idle)
}

fn on_drag_start<P: Presenter, O: Observer>(
    s: &mut Session<P, O>,
    event: ListEvent,
) -> Option<SessionState> {
    let ListEvent::DragStart { item, pointer } = event else {
        return None;
    };
    s.begin_drag(item, pointer).then_some(SessionState::Dragging)
}

fn on_drag_dragging<P: Presenter, O: Observer>(
    s: &mut Session<P, O>,
    event: ListEvent,
) -> Option<SessionState> {
    let ListEvent::Drag { pointer, .. } = event else {
        return None;
    };
    s.move_visuals(pointer);

    let hovered = s.presenter.hit_test(pointer).item()?;
    let request = s.plan_swap(hovered)?;
    let ticket = request.ticket;
    let pivot = request.pivot;

    if let Some(drag) = s.drag.as_mut() {
        drag.pending = Some(PendingSwap {
            ticket,
            target: hovered,
        });
        drag.target = Some(hovered);
    }
    tracing::debug!(
        target: SESSION_TARGET,
        ticket = ticket.0,
        pivot = %pivot,
        target_item = %hovered,
        direction = ?request.direction,
        shifted = request.range.len(),
        "swap started"
    );
    s.observer.on_swap_start(pivot, hovered);
    s.presenter.animate_swap(request);
    Some(SessionState::Swapping)
}

fn on_drag_swapping<P: Presenter, O: Observer>(
    s: &mut Session<P, O>,
    event: ListEvent,
) -> Option<SessionState> {
    if let ListEvent::Drag { pointer, .. } = event {
        s.move_visuals(pointer);
    }
    None
}

fn on_swap_complete<P: Presenter, O: Observer>(
    s: &mut Session<P, O>,
    event: ListEvent,
) -> Option<SessionState> {
    let ListEvent::SwapComplete { ticket, outcome } = event else {
        return None;
    };
    let drag = s.drag.as_mut()?;
    let pending = match drag.pending {
        Some(pending) if pending.ticket == ticket => pending,
        other => {
            tracing::warn!(
                target: SESSION_TARGET,
                ticket = ticket.0,
                in_flight = ?other.map(|p| p.ticket.0),
                "stale swap completion dropped"
            );
            return None;
        }
    };
    drag.pending = None;
    let pivot = drag.pivot;

    if outcome == SwapOutcome::Finished {
        let source = drag.dragged.clone();
        match s
            .order
            .relocate_relative_to_pivot(&source, pending.target, pivot)
        {
            Ok(mode) => tracing::debug!(
                target: SESSION_TARGET,
                ticket = ticket.0,
                target_item = %pending.target,
                mode = ?mode,
                "swap applied"
            ),
            Err(err) => s.fail("swap", err),
        }
    } else {
        tracing::debug!(target: SESSION_TARGET, ticket = ticket.0, "swap animation failed; order unchanged");
    }
    s.observer.on_swap_end(outcome);
    Some(SessionState::Dragging)
}

fn on_drag_end<P: Presenter, O: Observer>(
    s: &mut Session<P, O>,
    _: ListEvent,
) -> Option<SessionState> {
    s.finish_drag();
    Some(SessionState::Idle)
}

fn session_graph<P: Presenter, O: Observer>() -> StateGraph<SessionState, ListEvent, Session<P, O>>
{
    use ListEventKind as K;
    use SessionState as S;

    let built = StateGraph::builder(S::Idle)
        .state(S::Idle)
        .state(S::Selecting)
        .state(S::Dragging)
        .state(S::Swapping)
        .edge(S::Idle, S::Selecting)
        .edge(S::Idle, S::Dragging)
        .edge(S::Selecting, S::Idle)
        .edge(S::Selecting, S::Dragging)
        .edge(S::Dragging, S::Swapping)
        .edge(S::Dragging, S::Idle)
        .edge(S::Swapping, S::Dragging)
        .edge(S::Swapping, S::Idle)
        .on(S::Idle, K::Tap, on_tap_idle::<P, O>)
        .on(S::Idle, K::Hold, on_hold_idle::<P, O>)
        .on(S::Idle, K::HoldRelease, on_hold_release::<P, O>)
        .on(S::Idle, K::DragStart, on_drag_start::<P, O>)
        .on(S::Idle, K::Scroll, on_scroll::<P, O>)
        .on(S::Selecting, K::Tap, on_tap_selecting::<P, O>)
        .on(S::Selecting, K::HoldRelease, on_hold_release::<P, O>)
        .on(S::Selecting, K::DragStart, on_drag_start::<P, O>)
        .on(S::Selecting, K::Scroll, on_scroll::<P, O>)
        .on(S::Dragging, K::Drag, on_drag_dragging::<P, O>)
        .on(S::Dragging, K::DragEnd, on_drag_end::<P, O>)
        .on(S::Dragging, K::Scroll, on_scroll::<P, O>)
        .on(S::Swapping, K::Drag, on_drag_swapping::<P, O>)
        .on(S::Swapping, K::SwapComplete, on_swap_complete::<P, O>)
        .on(S::Swapping, K::DragEnd, on_drag_end::<P, O>)
        .on(S::Swapping, K::Scroll, on_scroll::<P, O>)
        .build();

    match built {
        Ok(graph) => graph,
        // The table above declares every state it references.
        Err(err) => unreachable!("session graph is statically valid: {err}"),
    }
}

// ---------------------------------------------------------------------------
// SessionCoordinator
// ---------------------------------------------------------------------------

/// Coordinates selection, dragging, and swapping for one list.
pub struct SessionCoordinator<P: Presenter, O: Observer> {
    graph: StateGraph<SessionState, ListEvent, Session<P, O>>,
    session: Session<P, O>,
}

impl<P: Presenter, O: Observer> fmt::Debug for SessionCoordinator<P, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("state", &self.state())
            .field("order", &self.session.order.ids())
            .field("selection", &self.session.selection)
            .field("pivot", &self.pivot())
            .field("pending_swap", &self.pending_swap())
            .finish()
    }
}

impl<P: Presenter, O: Observer> SessionCoordinator<P, O> {
    /// Create a coordinator in `Idle` over `order`.
    #[must_use]
    pub fn new(order: OrderModel, presenter: P, observer: O, config: &SortableConfig) -> Self {
        Self {
            graph: session_graph(),
            session: Session {
                order,
                selection: Selection::new(),
                presenter,
                observer,
                drag: None,
                held: None,
                next_ticket: 0,
                animation_duration: config.animation_duration,
                error: None,
            },
        }
    }

    /// Dispatch one event.
    ///
    /// Returns the dispatch outcome, or the order model error raised while
    /// handling the event. On error the state reached by the handler stands.
    pub fn submit(&mut self, event: ListEvent) -> Result<Dispatch<SessionState>, SessionError> {
        let dispatch = self.graph.submit(&mut self.session, event);
        match self.session.error.take() {
            Some(err) => Err(err),
            None => Ok(dispatch),
        }
    }

    /// Report the end of the swap animation issued with `ticket`.
    pub fn complete_swap(
        &mut self,
        ticket: SwapTicket,
        outcome: SwapOutcome,
    ) -> Result<Dispatch<SessionState>, SessionError> {
        let dispatch = self.submit(ListEvent::SwapComplete { ticket, outcome })?;
        if !dispatch.was_handled() {
            tracing::warn!(
                target: SESSION_TARGET,
                ticket = ticket.0,
                state = ?self.state(),
                "swap completion arrived outside a swap; dropped"
            );
        }
        Ok(dispatch)
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.graph.current()
    }

    #[inline]
    #[must_use]
    pub fn order(&self) -> &OrderModel {
        &self.session.order
    }

    #[inline]
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.session.selection
    }

    #[must_use]
    pub fn presenter(&self) -> &P {
        &self.session.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.session.presenter
    }

    #[must_use]
    pub fn observer(&self) -> &O {
        &self.session.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.session.observer
    }

    /// Pivot of the active drag.
    #[must_use]
    pub fn pivot(&self) -> Option<ItemId> {
        self.session.drag.as_ref().map(|d| d.pivot)
    }

    /// Geometry and pointer recorded when the active drag began.
    #[must_use]
    pub fn drag_origin(&self) -> Option<DragOrigin> {
        self.session.drag.as_ref().map(|d| d.origin)
    }

    /// Last item a swap was started for during the active drag.
    #[must_use]
    pub fn target(&self) -> Option<ItemId> {
        self.session.drag.as_ref().and_then(|d| d.target)
    }

    /// Ticket of the swap animation in flight.
    #[must_use]
    pub fn pending_swap(&self) -> Option<SwapTicket> {
        self.session
            .drag
            .as_ref()
            .and_then(|d| d.pending.map(|p| p.ticket))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
