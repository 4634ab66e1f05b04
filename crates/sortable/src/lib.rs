#![forbid(unsafe_code)]

//! Sortable public facade crate.
//!
//! Re-exports the types a host needs to build a touch-driven sortable list
//! and a prelude for day-to-day usage. The list is driven entirely by the
//! host: contact samples in, [`Presenter`] calls and [`Observer`]
//! notifications out.
//!
//! ```
//! use sortable::prelude::*;
//!
//! struct Rows;
//!
//! impl Presenter for Rows {
//!     type DragVisuals = ();
//!     fn measure_geometry(&mut self, id: ItemId) -> Rect {
//!         Rect::new(0.0, id.0 as f32 * 40.0, 320.0, 40.0)
//!     }
//!     fn create_drag_visuals(&mut self, _: &[ItemId], _: ItemId, _: DragOrigin) {}
//!     fn hit_test(&mut self, _: Point) -> HitTest {
//!         HitTest::Miss
//!     }
//!     fn animate_swap(&mut self, _: SwapRequest) {}
//!     fn teardown_drag_visuals(&mut self, _: ()) {}
//! }
//!
//! let list = SortableList::new(vec!["A", "B", "C"], Rows, (), SortableConfig::default())?;
//! assert_eq!(list.state(), SessionState::Idle);
//! # Ok::<(), sortable::Error>(())
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use sortable_core::config::{ConfigError, GestureConfig, SortableConfig};
pub use sortable_core::contact::{Contact, ContactSample};
pub use sortable_core::geometry::{Point, Rect};
pub use sortable_core::gesture::{Gesture, GestureClassifier, TouchState};
pub use sortable_core::state_graph::{Dispatch, GraphError, StateGraph};

// --- List re-exports -------------------------------------------------------

pub use sortable_list::{
    DragOrigin, HitTest, InsertMode, ItemId, ListError, ListEvent, Observer, OrderError,
    OrderModel, Presenter, Selection, SessionCoordinator, SessionError, SessionState,
    SortableList, SwapDirection, SwapOutcome, SwapRequest, SwapTicket,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for sortable lists.
#[derive(Debug)]
pub enum Error {
    /// Configuration could not be loaded or failed validation.
    Config(ConfigError),
    /// An order model lookup or mutation failed.
    Order(OrderError),
    /// The session coordinator failed while handling an event.
    Session(SessionError),
    /// The id does not name an item of the list.
    UnknownItem(ItemId),
    /// A state graph declaration was inconsistent.
    Graph(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Order(err) => write!(f, "{err}"),
            Self::Session(err) => write!(f, "{err}"),
            Self::UnknownItem(id) => write!(f, "unknown item {id}"),
            Self::Graph(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Order(err) => Some(err),
            Self::Session(err) => Some(err),
            Self::UnknownItem(_) | Self::Graph(_) => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<OrderError> for Error {
    fn from(err: OrderError) -> Self {
        Self::Order(err)
    }
}

impl From<SessionError> for Error {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

impl From<ListError> for Error {
    fn from(err: ListError) -> Self {
        match err {
            ListError::UnknownItem(id) => Self::UnknownItem(id),
            ListError::Config(err) => Self::Config(err),
            ListError::Session(err) => Self::Session(err),
        }
    }
}

impl<S: fmt::Debug> From<GraphError<S>> for Error {
    fn from(err: GraphError<S>) -> Self {
        Self::Graph(err.to_string())
    }
}

/// Standard result type for sortable APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ContactSample, DragOrigin, Error, Gesture, HitTest, ItemId, Observer, Point, Presenter,
        Rect, Result, SessionState, SortableConfig, SortableList, SwapOutcome, SwapRequest,
        SwapTicket,
    };

    pub use crate::{core, list};
}

pub use sortable_core as core;
pub use sortable_list as list;
