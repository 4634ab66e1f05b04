#![forbid(unsafe_code)]

//! Collaborator boundary: visual effects and user-facing notifications.
//!
//! The session coordinator never measures or mutates visuals itself. It asks
//! a [`Presenter`] for geometry, hit tests, and animations, and reports
//! interaction milestones to an [`Observer`].
//!
//! Swap animations are asynchronous from the coordinator's point of view:
//! [`Presenter::animate_swap`] receives a [`SwapRequest`] carrying a
//! [`SwapTicket`], and the host later reports the ticket back with a
//! [`SwapOutcome`] (see `SortableList::complete_swap`). A failed animation is
//! still reported, as [`SwapOutcome::Failed`], so the session never stalls.

use std::time::Duration;

use sortable_core::geometry::{Point, Rect};

use crate::item::ItemId;

/// Identifies one requested swap animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SwapTicket(pub u64);

/// How a swap animation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapOutcome {
    /// The animation ran to completion; the order model is updated.
    Finished,
    /// The animation could not run; the order model is left as it was.
    Failed,
}

/// Direction the pivot travels in the list during a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapDirection {
    /// Toward the first item (the hovered item precedes the pivot).
    TowardStart,
    /// Toward the last item (the hovered item follows the pivot).
    TowardEnd,
}

/// Where a drag began.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOrigin {
    /// Geometry of the pivot item at drag start.
    pub rect: Rect,
    /// Pointer position of the drag-start sample.
    pub pointer: Point,
}

/// A request to animate the pivot past a run of items.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapRequest {
    pub ticket: SwapTicket,
    pub pivot: ItemId,
    /// Items between the pivot and the hovered item (hovered included, pivot
    /// excluded), in list order. These shift to make room for the pivot.
    pub range: Vec<ItemId>,
    pub direction: SwapDirection,
    /// Duration hint from configuration.
    pub duration: Duration,
}

/// Result of asking the presenter what lies under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTest {
    /// No item under the pointer.
    Miss,
    /// Exactly one item under the pointer.
    Item(ItemId),
    /// Several overlapping candidates; not actionable.
    Ambiguous,
}

impl HitTest {
    /// Collapse a list of candidates into a hit test result.
    #[must_use]
    pub fn from_candidates(candidates: impl IntoIterator<Item = ItemId>) -> Self {
        let mut iter = candidates.into_iter();
        match (iter.next(), iter.next()) {
            (None, _) => Self::Miss,
            (Some(id), None) => Self::Item(id),
            (Some(_), Some(_)) => Self::Ambiguous,
        }
    }

    /// The single hovered item, if the result is actionable.
    #[must_use]
    pub const fn item(self) -> Option<ItemId> {
        match self {
            Self::Item(id) => Some(id),
            Self::Miss | Self::Ambiguous => None,
        }
    }
}

/// Performs all visual work on behalf of the session coordinator.
pub trait Presenter {
    /// Handle to the floating visuals that follow the pointer during a drag.
    type DragVisuals;

    /// Current on-screen geometry of an item.
    fn measure_geometry(&mut self, id: ItemId) -> Rect;

    /// Materialize the selection as draggable visuals anchored at the pivot.
    ///
    /// `selection` is in list order and contains `pivot`.
    fn create_drag_visuals(
        &mut self,
        selection: &[ItemId],
        pivot: ItemId,
        origin: DragOrigin,
    ) -> Self::DragVisuals;

    /// Which item lies under `pointer`.
    fn hit_test(&mut self, pointer: Point) -> HitTest;

    /// Start a swap animation. Completion is reported back with the ticket.
    fn animate_swap(&mut self, request: SwapRequest);

    /// Remove the drag visuals.
    fn teardown_drag_visuals(&mut self, visuals: Self::DragVisuals);

    /// Move the drag visuals to follow the pointer.
    fn move_drag_visuals(&mut self, _visuals: &mut Self::DragVisuals, _pointer: Point) {}

    /// Show or clear the selected look of an item.
    fn set_selected(&mut self, _id: ItemId, _selected: bool) {}
}

/// Receives fire-and-forget interaction notifications.
///
/// Every method defaults to doing nothing.
pub trait Observer {
    fn on_tap(&mut self, _id: ItemId) {}

    fn on_hold(&mut self, _id: ItemId) {}

    /// The contact whose hold was reported through [`on_hold`](Self::on_hold)
    /// lifted. Holds on other items while selecting are not reported, and
    /// neither are their releases.
    fn on_hold_release(&mut self, _id: ItemId) {}

    /// A drag began; `selection` is in list order.
    fn on_drag_start(&mut self, _pivot: ItemId, _selection: &[ItemId]) {}

    fn on_swap_start(&mut self, _pivot: ItemId, _target: ItemId) {}

    fn on_swap_end(&mut self, _outcome: SwapOutcome) {}

    /// Summary at drag end: the dragged selection and the last swap target.
    fn on_swap(&mut self, _selection: &[ItemId], _target: Option<ItemId>) {}

    fn on_scroll(&mut self, _id: ItemId) {}

    /// The list order changed over the course of a drag.
    fn on_change(&mut self, _old: &[ItemId], _new: &[ItemId]) {}
}

/// Ignores every notification.
impl Observer for () {}
