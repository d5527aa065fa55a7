//! Domain types returned by and passed to `RoomsClient`.
//!
//! These are the only public model types; the JSON shapes the service speaks
//! live in the private `wire` module.

use chrono::{DateTime, Utc};

use crate::identifier::CommunicationIdentifier;

/// A snapshot of a room as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    /// Server-assigned, opaque.
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub room_open: Option<bool>,
    /// `None` when the response carried no participant collection at all,
    /// `Some(vec![])` when it carried an empty one.
    pub participants: Option<Vec<Participant>>,
}

/// An identity with an optional role within a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub identifier: CommunicationIdentifier,
    /// Free-form. `None` lets the service apply its default role.
    pub role: Option<String>,
}

impl Participant {
    pub const PRESENTER: &'static str = "Presenter";
    pub const ATTENDEE: &'static str = "Attendee";
    pub const CONSUMER: &'static str = "Consumer";

    pub fn new(identifier: CommunicationIdentifier) -> Self {
        Self {
            identifier,
            role: None,
        }
    }

    pub fn with_role(identifier: CommunicationIdentifier, role: impl Into<String>) -> Self {
        Self {
            identifier,
            role: Some(role.into()),
        }
    }
}

/// Arguments for `RoomsClient::create_room`. Every field is optional; the
/// service fills in defaults.
#[derive(Debug, Clone, Default)]
pub struct CreateRoomOptions {
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub room_open: Option<bool>,
    pub participants: Option<Vec<Participant>>,
}

/// Arguments for `RoomsClient::update_room`. Only the fields that are `Some`
/// are sent; the rest stay unchanged on the server. `participants:
/// Some(vec![])` clears the participant list.
#[derive(Debug, Clone, Default)]
pub struct UpdateRoomOptions {
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub room_open: Option<bool>,
    pub participants: Option<Vec<Participant>>,
}
