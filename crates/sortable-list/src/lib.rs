#![forbid(unsafe_code)]

//! Sortable list: order model, selection, and drag-to-reorder coordination.
//!
//! # Role in the workspace
//! `sortable-list` sits on top of `sortable-core`. It owns the logical order
//! of a list's items and coordinates multi-item selection, dragging, and
//! swap animations. All visual work goes through the [`Presenter`] trait and
//! all user-facing notifications through [`Observer`].
//!
//! # Primary responsibilities
//! - **OrderModel**: identifier sequence, cached positions, pivot-relative
//!   bulk relocation.
//! - **SessionCoordinator**: Idle / Selecting / Dragging / Swapping, with at
//!   most one swap animation in flight.
//! - **SortableList**: per-item gesture classifiers feeding the coordinator.
//!
//! [`Presenter`]: presenter::Presenter
//! [`Observer`]: presenter::Observer

pub mod item;
pub mod list;
pub mod order;
pub mod presenter;
pub mod selection;
pub mod session;

pub use item::ItemId;
pub use list::{ListError, SortableList};
pub use order::{InsertMode, OrderError, OrderModel};
pub use presenter::{
    DragOrigin, HitTest, Observer, Presenter, SwapDirection, SwapOutcome, SwapRequest, SwapTicket,
};
pub use selection::Selection;
pub use session::{ListEvent, SessionCoordinator, SessionError, SessionState};
