#![forbid(unsafe_code)]

//! End-to-end drag sessions driven through raw contact samples.
//!
//! A recording presenter lays items out as a vertical stack of fixed-height
//! rows in current list order and answers hit tests from that layout; a
//! recording observer logs every notification. Each scenario drives
//! [`SortableList`] the way a host would: contact samples per item, hold
//! timers at their deadlines, and swap completions reported by ticket.
//!
//! Run:
//!   cargo test -p sortable-list --test e2e_drag_session

use std::time::Duration;

use sortable_core::config::SortableConfig;
use sortable_core::contact::{Contact, ContactSample};
use sortable_core::geometry::{Point, Rect};
use sortable_list::item::ids;
use sortable_list::{
    DragOrigin, HitTest, ItemId, Observer, Presenter, SessionState, SortableList, SwapDirection,
    SwapOutcome, SwapRequest, SwapTicket,
};
use web_time::Instant;

const ROW: f32 = 10.0;
const HOLD: Duration = Duration::from_millis(300);

// ============================================================================
// Fakes
// ============================================================================

#[derive(Debug, Default)]
struct Stack {
    /// Rows in display order; kept in sync by the test after each swap.
    rows: Vec<ItemId>,
    created: Vec<(Vec<ItemId>, ItemId, DragOrigin)>,
    moved: usize,
    swaps: Vec<SwapRequest>,
    torn_down: usize,
    selected_calls: Vec<(ItemId, bool)>,
    /// Live drag handles.
    live: usize,
}

impl Stack {
    fn new(len: u32) -> Self {
        Self {
            rows: (0..len).map(ItemId).collect(),
            ..Self::default()
        }
    }

    fn center_of(&self, id: ItemId) -> Point {
        let row = self.rows.iter().position(|r| *r == id).unwrap_or(0);
        Point::new(5.0, row as f32 * ROW + ROW / 2.0)
    }
}

impl Presenter for Stack {
    type DragVisuals = u32;

    fn measure_geometry(&mut self, id: ItemId) -> Rect {
        let row = self.rows.iter().position(|r| *r == id).unwrap_or(0);
        Rect::new(0.0, row as f32 * ROW, 100.0, ROW)
    }

    fn create_drag_visuals(
        &mut self,
        selection: &[ItemId],
        pivot: ItemId,
        origin: DragOrigin,
    ) -> u32 {
        self.created.push((selection.to_vec(), pivot, origin));
        self.live += 1;
        self.created.len() as u32
    }

    fn move_drag_visuals(&mut self, _visuals: &mut u32, _pointer: Point) {
        self.moved += 1;
    }

    fn hit_test(&mut self, pointer: Point) -> HitTest {
        HitTest::from_candidates(
            self.rows
                .iter()
                .enumerate()
                .filter(|(row, _)| {
                    Rect::new(0.0, *row as f32 * ROW, 100.0, ROW).contains(pointer)
                })
                .map(|(_, id)| *id),
        )
    }

    fn animate_swap(&mut self, request: SwapRequest) {
        self.swaps.push(request);
    }

    fn teardown_drag_visuals(&mut self, _visuals: u32) {
        self.torn_down += 1;
        self.live -= 1;
    }

    fn set_selected(&mut self, id: ItemId, selected: bool) {
        self.selected_calls.push((id, selected));
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Note {
    Tap(ItemId),
    Hold(ItemId),
    HoldRelease(ItemId),
    DragStart(ItemId, Vec<ItemId>),
    SwapStart(ItemId, ItemId),
    SwapEnd(SwapOutcome),
    Swap(Vec<ItemId>, Option<ItemId>),
    Scroll(ItemId),
    Change(Vec<ItemId>, Vec<ItemId>),
}

#[derive(Debug, Default)]
struct Log(Vec<Note>);

impl Observer for Log {
    fn on_tap(&mut self, id: ItemId) {
        self.0.push(Note::Tap(id));
    }

    fn on_hold(&mut self, id: ItemId) {
        self.0.push(Note::Hold(id));
    }

    fn on_hold_release(&mut self, id: ItemId) {
        self.0.push(Note::HoldRelease(id));
    }

    fn on_drag_start(&mut self, pivot: ItemId, selection: &[ItemId]) {
        self.0.push(Note::DragStart(pivot, selection.to_vec()));
    }

    fn on_swap_start(&mut self, pivot: ItemId, target: ItemId) {
        self.0.push(Note::SwapStart(pivot, target));
    }

    fn on_swap_end(&mut self, outcome: SwapOutcome) {
        self.0.push(Note::SwapEnd(outcome));
    }

    fn on_swap(&mut self, selection: &[ItemId], target: Option<ItemId>) {
        self.0.push(Note::Swap(selection.to_vec(), target));
    }

    fn on_scroll(&mut self, id: ItemId) {
        self.0.push(Note::Scroll(id));
    }

    fn on_change(&mut self, old: &[ItemId], new: &[ItemId]) {
        self.0.push(Note::Change(old.to_vec(), new.to_vec()));
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Host {
    list: SortableList<char, Stack, Log>,
    now: Instant,
}

impl Host {
    fn new(len: u32) -> Self {
        let data = ('a'..).take(len as usize).collect();
        let list = SortableList::new(data, Stack::new(len), Log::default(), SortableConfig::default())
            .expect("default config is valid");
        Self {
            list,
            now: Instant::now(),
        }
    }

    fn advance(&mut self, by: Duration) {
        self.now += by;
        self.list.fire_due_timers(self.now).unwrap();
    }

    fn press(&mut self, item: u32) {
        let at = self.list.presenter().center_of(ItemId(item));
        self.list
            .contact(ItemId(item), ContactSample::start_at(at), self.now)
            .unwrap();
    }

    fn release(&mut self, item: u32) {
        self.list
            .contact(ItemId(item), ContactSample::End, self.now)
            .unwrap();
    }

    fn tap(&mut self, item: u32) {
        self.press(item);
        self.advance(Duration::from_millis(50));
        self.release(item);
    }

    fn hold(&mut self, item: u32) {
        self.press(item);
        self.advance(HOLD);
    }

    /// Move the contact that began on `item` over the row `row`.
    fn move_over_row(&mut self, item: u32, row: usize) {
        let to = Point::new(5.0, row as f32 * ROW + ROW / 2.0);
        self.list
            .contact(ItemId(item), ContactSample::move_to(to), self.now)
            .unwrap();
    }

    /// Finish the latest swap and mirror the new order in the fake layout.
    fn finish_swap(&mut self, outcome: SwapOutcome) {
        let ticket = self.last_ticket();
        self.list.complete_swap(ticket, outcome).unwrap();
        let order = self.list.order().to_vec();
        self.list.presenter_mut().rows = order;
    }

    fn last_ticket(&self) -> SwapTicket {
        self.list
            .presenter()
            .swaps
            .last()
            .map(|s| s.ticket)
            .expect("a swap was requested")
    }

    fn notes(&self) -> &[Note] {
        &self.list.observer().0
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn tap_in_idle_only_notifies() {
    let mut host = Host::new(3);
    host.tap(1);
    assert_eq!(host.notes(), &[Note::Tap(ItemId(1))]);
    assert_eq!(host.list.state(), SessionState::Idle);
    assert!(host.list.selection().is_empty());
}

#[test]
fn hold_release_selects_and_reports() {
    let mut host = Host::new(3);
    host.hold(2);
    host.release(2);
    assert_eq!(
        host.notes(),
        &[Note::Hold(ItemId(2)), Note::HoldRelease(ItemId(2))]
    );
    assert_eq!(host.list.state(), SessionState::Selecting);
    assert_eq!(
        host.list.presenter().selected_calls,
        vec![(ItemId(2), true)]
    );
}

#[test]
fn taps_while_selecting_toggle_until_empty() {
    let mut host = Host::new(4);
    host.hold(0);
    host.release(0);
    host.tap(3);
    assert_eq!(host.list.selection().len(), 2);
    host.tap(0);
    host.tap(3);
    assert_eq!(host.list.state(), SessionState::Idle);
    assert_eq!(
        host.list.presenter().selected_calls,
        vec![
            (ItemId(0), true),
            (ItemId(3), true),
            (ItemId(0), false),
            (ItemId(3), false),
        ]
    );
}

#[test]
fn stationary_move_within_row_does_not_swap() {
    let mut host = Host::new(3);
    host.hold(1);
    host.move_over_row(1, 1);
    assert_eq!(host.list.state(), SessionState::Dragging);
    host.move_over_row(1, 1);
    assert!(host.list.presenter().swaps.is_empty());
    assert_eq!(host.list.presenter().moved, 1);
}

#[test]
fn single_item_drag_down_then_drop() {
    let mut host = Host::new(5);
    host.hold(1);
    host.move_over_row(1, 1);
    assert_eq!(host.list.state(), SessionState::Dragging);

    let (selection, pivot, origin) = host.list.presenter().created[0].clone();
    assert_eq!(selection, ids(&[1]));
    assert_eq!(pivot, ItemId(1));
    assert_eq!(origin.rect, Rect::new(0.0, ROW, 100.0, ROW));

    host.move_over_row(1, 3);
    assert_eq!(host.list.state(), SessionState::Swapping);
    let req = host.list.presenter().swaps[0].clone();
    assert_eq!(req.pivot, ItemId(1));
    assert_eq!(req.range, ids(&[2, 3]));
    assert_eq!(req.direction, SwapDirection::TowardEnd);

    host.finish_swap(SwapOutcome::Finished);
    assert_eq!(host.list.state(), SessionState::Dragging);
    assert_eq!(host.list.order(), ids(&[0, 2, 3, 1, 4]).as_slice());

    host.release(1);
    assert_eq!(host.list.state(), SessionState::Idle);
    assert_eq!(host.list.presenter().live, 0);
    assert_eq!(host.list.presenter().torn_down, 1);
    assert_eq!(host.list.data_in_order(), vec![&'a', &'c', &'d', &'b', &'e']);

    assert_eq!(
        host.notes(),
        &[
            Note::Hold(ItemId(1)),
            Note::DragStart(ItemId(1), ids(&[1])),
            Note::SwapStart(ItemId(1), ItemId(3)),
            Note::SwapEnd(SwapOutcome::Finished),
            Note::Swap(ids(&[1]), Some(ItemId(3))),
            Note::Change(ids(&[0, 1, 2, 3, 4]), ids(&[0, 2, 3, 1, 4])),
        ]
    );
}

#[test]
fn group_drag_gathers_selection_before_target() {
    let mut host = Host::new(5);
    // Select 1 and 3, then drag from 3 up over 0.
    host.hold(1);
    host.release(1);
    host.tap(3);
    host.hold(3);
    host.move_over_row(3, 3);
    assert_eq!(host.list.state(), SessionState::Dragging);
    assert_eq!(host.list.presenter().created[0].0, ids(&[1, 3]));

    host.move_over_row(3, 0);
    let req = host.list.presenter().swaps[0].clone();
    assert_eq!(req.range, ids(&[0, 1, 2]));
    assert_eq!(req.direction, SwapDirection::TowardStart);

    host.finish_swap(SwapOutcome::Finished);
    assert_eq!(host.list.order(), ids(&[1, 3, 0, 2, 4]).as_slice());

    host.release(3);
    assert!(host.list.selection().is_empty());
    assert!(host.list.presenter().selected_calls.ends_with(&[
        (ItemId(1), false),
        (ItemId(3), false)
    ]));
}

#[test]
fn hovering_another_selected_item_is_not_a_target() {
    let mut host = Host::new(4);
    host.hold(0);
    host.release(0);
    host.tap(1);
    host.hold(0);
    host.move_over_row(0, 0);
    host.move_over_row(0, 1);
    assert_eq!(host.list.state(), SessionState::Dragging);
    assert!(host.list.presenter().swaps.is_empty());
}

#[test]
fn hover_while_swapping_is_not_acted_on() {
    let mut host = Host::new(5);
    host.hold(0);
    host.move_over_row(0, 0);
    host.move_over_row(0, 2);
    host.move_over_row(0, 3);
    host.move_over_row(0, 4);
    assert_eq!(host.list.state(), SessionState::Swapping);
    assert_eq!(host.list.presenter().swaps.len(), 1);
    // Drag visuals keep following the pointer.
    assert_eq!(host.list.presenter().moved, 3);

    host.finish_swap(SwapOutcome::Finished);
    host.move_over_row(0, 4);
    assert_eq!(host.list.presenter().swaps.len(), 2);
}

#[test]
fn failed_animation_returns_to_dragging_unchanged() {
    let mut host = Host::new(3);
    host.hold(0);
    host.move_over_row(0, 0);
    host.move_over_row(0, 2);
    host.finish_swap(SwapOutcome::Failed);
    assert_eq!(host.list.state(), SessionState::Dragging);
    assert_eq!(host.list.order(), ids(&[0, 1, 2]).as_slice());

    host.release(0);
    assert!(
        !host
            .notes()
            .iter()
            .any(|n| matches!(n, Note::Change(..)))
    );
    assert!(host.notes().contains(&Note::Swap(ids(&[0]), Some(ItemId(2)))));
}

#[test]
fn early_drag_end_drops_the_inflight_swap() {
    let mut host = Host::new(4);
    host.hold(0);
    host.move_over_row(0, 0);
    host.move_over_row(0, 3);
    let ticket = host.last_ticket();

    host.release(0);
    assert_eq!(host.list.state(), SessionState::Idle);
    assert_eq!(host.list.presenter().live, 0);

    host.list.complete_swap(ticket, SwapOutcome::Finished).unwrap();
    assert_eq!(host.list.order(), ids(&[0, 1, 2, 3]).as_slice());
    assert_eq!(host.list.state(), SessionState::Idle);
}

#[test]
fn scroll_is_reported_in_any_state() {
    let mut host = Host::new(3);
    host.press(2);
    host.move_over_row(2, 1);
    host.release(2);
    assert_eq!(host.notes(), &[Note::Scroll(ItemId(2))]);
    assert_eq!(host.list.state(), SessionState::Idle);
}

#[test]
fn multi_contact_start_is_ignored() {
    let mut host = Host::new(2);
    let two = ContactSample::Start(vec![
        Contact::new(1, Point::new(1.0, 1.0)),
        Contact::new(2, Point::new(2.0, 2.0)),
    ]);
    host.list.contact(ItemId(0), two, host.now).unwrap();
    host.advance(HOLD * 2);
    host.release(0);
    assert!(host.notes().is_empty());
}
