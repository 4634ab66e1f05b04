#![forbid(unsafe_code)]

//! Raw touch-contact samples fed to a [`GestureClassifier`].
//!
//! A sample stream for one list item follows the platform's touch lifecycle:
//! `Start` with the active contacts, any number of `Move`s, then `End`.
//! Only a start carrying exactly one contact begins a gesture.
//!
//! [`GestureClassifier`]: crate::gesture::GestureClassifier

use crate::geometry::Point;

/// One touch point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Platform identifier of the touch point, stable for its lifetime.
    pub id: u64,
    pub position: Point,
}

impl Contact {
    #[must_use]
    pub const fn new(id: u64, position: Point) -> Self {
        Self { id, position }
    }
}

/// A raw sample from the contact stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ContactSample {
    /// Contacts went down; carries every simultaneously active contact.
    Start(Vec<Contact>),
    /// Active contacts moved.
    Move(Vec<Contact>),
    /// Contact lifted.
    End,
}

impl ContactSample {
    /// Single-contact start at `position`.
    #[must_use]
    pub fn start_at(position: Point) -> Self {
        Self::Start(vec![Contact::new(0, position)])
    }

    /// Single-contact move to `position`.
    #[must_use]
    pub fn move_to(position: Point) -> Self {
        Self::Move(vec![Contact::new(0, position)])
    }
}
