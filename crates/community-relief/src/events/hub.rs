use std::fmt;
use std::str::FromStr;

use tokio::sync::broadcast;

use crate::coordination::domain::VolunteerId;
use crate::coordination::repository::{Audience, DashboardEvent, EventPublisher, PublishError};

const DEFAULT_CAPACITY: usize = 256;

/// Broadcast hub shared by the coordination service and the SSE endpoint.
///
/// Publishing never blocks and is a no-op when nobody is listening.
#[derive(Clone)]
pub struct EventHub {
    sender: broadcast::Sender<DashboardEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for EventHub {
    fn publish(&self, event: DashboardEvent) -> Result<(), PublishError> {
        // A send error only means there are no receivers right now.
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::debug!(delivered, "dashboard event broadcast");
        Ok(())
    }
}

/// Subscription channel chosen by an SSE client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Room {
    Public,
    Admin,
    Volunteer(VolunteerId),
}

impl Room {
    pub fn accepts(&self, audience: &Audience) -> bool {
        match audience {
            Audience::Everyone => true,
            Audience::Admins => matches!(self, Room::Admin),
            Audience::Volunteer(id) => matches!(self, Room::Volunteer(room) if room == id),
        }
    }
}

impl FromStr for Room {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" | "public" => Ok(Room::Public),
            "admin" => Ok(Room::Admin),
            other => match other.strip_prefix("volunteer-") {
                Some(id) if !id.is_empty() => Ok(Room::Volunteer(VolunteerId::from(id))),
                _ => Err(format!("unknown room '{other}'")),
            },
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::Public => f.write_str("public"),
            Room::Admin => f.write_str("admin"),
            Room::Volunteer(id) => write!(f, "volunteer-{id}"),
        }
    }
}
