#![forbid(unsafe_code)]

//! The sortable list: items, their classifiers, and the session coordinator.
//!
//! [`SortableList`] owns one [`GestureClassifier`] per item in an arena
//! indexed by [`ItemId`]. Classifiers hold no reference back to the list;
//! every gesture they return is forwarded to the [`SessionCoordinator`] here.
//!
//! # Driving the list
//!
//! The host feeds each item's contact samples to [`SortableList::contact`],
//! schedules a wake-up at [`SortableList::next_hold_deadline`] and calls
//! [`SortableList::fire_due_timers`] when it arrives, and reports every swap
//! animation back through [`SortableList::complete_swap`].

use std::fmt;

use sortable_core::config::{ConfigError, SortableConfig};
use sortable_core::contact::ContactSample;
use sortable_core::gesture::{Gesture, GestureClassifier};
use sortable_core::state_graph::Dispatch;
use web_time::Instant;

use crate::item::ItemId;
use crate::order::OrderModel;
use crate::presenter::{Observer, Presenter, SwapOutcome, SwapTicket};
use crate::selection::Selection;
use crate::session::{ListEvent, SessionCoordinator, SessionError, SessionState};

/// Errors from [`SortableList`] operations.
#[derive(Debug)]
pub enum ListError {
    /// The id does not name an item of this list.
    UnknownItem(ItemId),
    /// The configuration failed validation.
    Config(ConfigError),
    /// The coordinator raised an error while handling a gesture.
    Session(SessionError),
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownItem(id) => write!(f, "unknown item {id}"),
            Self::Config(e) => write!(f, "{e}"),
            Self::Session(e) => write!(f, "session error: {e}"),
        }
    }
}

impl std::error::Error for ListError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownItem(_) => None,
            Self::Config(e) => Some(e),
            Self::Session(e) => Some(e),
        }
    }
}

impl From<SessionError> for ListError {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

impl From<ConfigError> for ListError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// A reorderable list of `T` driven by touch gestures.
pub struct SortableList<T, P: Presenter, O: Observer = ()> {
    data: Vec<T>,
    classifiers: Vec<GestureClassifier>,
    coordinator: SessionCoordinator<P, O>,
}

impl<T, P: Presenter, O: Observer> fmt::Debug for SortableList<T, P, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortableList")
            .field("len", &self.data.len())
            .field("coordinator", &self.coordinator)
            .finish()
    }
}

impl<T, P: Presenter, O: Observer> SortableList<T, P, O> {
    /// Build a list over `data`. Items get ids `0..data.len()` in input order.
    pub fn new(
        data: Vec<T>,
        presenter: P,
        observer: O,
        config: SortableConfig,
    ) -> Result<Self, ListError> {
        let config = config.validated()?;
        let classifiers = (0..data.len())
            .map(|_| GestureClassifier::new(config.gesture.clone()))
            .collect();
        let order = OrderModel::sequential(data.len());
        Ok(Self {
            data,
            classifiers,
            coordinator: SessionCoordinator::new(order, presenter, observer, &config),
        })
    }

    /// Feed a contact sample for `item` observed at `now`.
    ///
    /// Returns the gesture it produced, after the coordinator has handled it.
    pub fn contact(
        &mut self,
        item: ItemId,
        sample: ContactSample,
        now: Instant,
    ) -> Result<Option<Gesture>, ListError> {
        let gesture = self.classifier_mut(item)?.process(sample, now);
        self.forward(item, gesture)
    }

    /// Deliver the hold timer of `item` if it is due at `now`.
    pub fn hold_elapsed(&mut self, item: ItemId, now: Instant) -> Result<Option<Gesture>, ListError> {
        let gesture = self.classifier_mut(item)?.fire_hold(now);
        self.forward(item, gesture)
    }

    /// Deliver every hold timer due at `now`, in item order.
    pub fn fire_due_timers(&mut self, now: Instant) -> Result<Vec<(ItemId, Gesture)>, ListError> {
        let due: Vec<ItemId> = self
            .classifiers
            .iter()
            .enumerate()
            .filter(|(_, c)| c.hold_deadline().is_some_and(|d| d <= now))
            .map(|(idx, _)| ItemId(idx as u32))
            .collect();

        let mut fired = Vec::with_capacity(due.len());
        for item in due {
            if let Some(gesture) = self.hold_elapsed(item, now)? {
                fired.push((item, gesture));
            }
        }
        Ok(fired)
    }

    /// Earliest armed hold deadline across all items.
    #[must_use]
    pub fn next_hold_deadline(&self) -> Option<Instant> {
        self.classifiers
            .iter()
            .filter_map(GestureClassifier::hold_deadline)
            .min()
    }

    /// Report the end of the swap animation issued with `ticket`.
    pub fn complete_swap(
        &mut self,
        ticket: SwapTicket,
        outcome: SwapOutcome,
    ) -> Result<Dispatch<SessionState>, ListError> {
        Ok(self.coordinator.complete_swap(ticket, outcome)?)
    }

    /// Current logical order of item ids.
    #[must_use]
    pub fn order(&self) -> &[ItemId] {
        self.coordinator.order().ids()
    }

    /// Items in their original (id) order.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Items in their current logical order.
    #[must_use]
    pub fn data_in_order(&self) -> Vec<&T> {
        self.order()
            .iter()
            .filter_map(|id| self.data.get(id.index()))
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&T> {
        self.data.get(id.index())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.coordinator.state()
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        self.coordinator.selection()
    }

    #[must_use]
    pub fn coordinator(&self) -> &SessionCoordinator<P, O> {
        &self.coordinator
    }

    /// The classifier of `item`.
    #[must_use]
    pub fn classifier(&self, item: ItemId) -> Option<&GestureClassifier> {
        self.classifiers.get(item.index())
    }

    #[must_use]
    pub fn presenter(&self) -> &P {
        self.coordinator.presenter()
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        self.coordinator.presenter_mut()
    }

    #[must_use]
    pub fn observer(&self) -> &O {
        self.coordinator.observer()
    }

    pub fn observer_mut(&mut self) -> &mut O {
        self.coordinator.observer_mut()
    }

    fn classifier_mut(&mut self, item: ItemId) -> Result<&mut GestureClassifier, ListError> {
        self.classifiers
            .get_mut(item.index())
            .ok_or(ListError::UnknownItem(item))
    }

    fn forward(
        &mut self,
        item: ItemId,
        gesture: Option<Gesture>,
    ) -> Result<Option<Gesture>, ListError> {
        if let Some(gesture) = gesture {
            self.coordinator
                .submit(ListEvent::from_gesture(item, gesture))?;
        }
        Ok(gesture)
    }
}
