//! Status listeners - observers notified of alarm, camera and sensor changes
//!
//! Notification is a synchronous fan-out: every listener registered at the
//! time of the change is called, in registration order, before the
//! triggering operation returns. Nothing is queued or retried.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::status::AlarmStatus;

/// Subscriber to security system updates
pub trait StatusListener: Send + Sync {
    /// The alarm status was written
    fn on_status_changed(&self, status: AlarmStatus);

    /// A camera frame was analyzed
    fn on_cat_detected(&self, cat_detected: bool);

    /// Sensor activation flags may have changed (for example after arming)
    fn on_sensor_status_changed(&self);
}

/// Handle returned when a listener is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener:{}", self.0)
    }
}

/// Ordered set of registered listeners
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<(ListenerId, Arc<dyn StatusListener>)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn add(&mut self, listener: Arc<dyn StatusListener>) -> ListenerId {
        let id = ListenerId::new();
        self.listeners.push((id, listener));
        tracing::debug!("Status listener registered: {}", id);
        id
    }

    /// Unregister a listener. Returns `false` if the id was not registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        let removed = self.listeners.len() != before;
        if removed {
            tracing::debug!("Status listener unregistered: {}", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn notify_status_changed(&self, status: AlarmStatus) {
        for (_, listener) in &self.listeners {
            listener.on_status_changed(status);
        }
    }

    pub fn notify_cat_detected(&self, cat_detected: bool) {
        for (_, listener) in &self.listeners {
            listener.on_cat_detected(cat_detected);
        }
    }

    pub fn notify_sensor_status_changed(&self) {
        for (_, listener) in &self.listeners {
            listener.on_sensor_status_changed();
        }
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field(
                "listeners",
                &self.listeners.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// A single notification, as delivered to a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StatusEvent {
    StatusChanged { status: AlarmStatus },
    CatDetected { cat_detected: bool },
    SensorStatusChanged,
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::StatusChanged { status } => {
                write!(f, "alarm status: {} ({})", status, status.description())
            }
            StatusEvent::CatDetected { cat_detected: true } => {
                write!(f, "camera: DANGER - CAT DETECTED")
            }
            StatusEvent::CatDetected { cat_detected: false } => {
                write!(f, "camera: no cats detected")
            }
            StatusEvent::SensorStatusChanged => write!(f, "sensors updated"),
        }
    }
}

/// Listener that keeps every notification it receives
#[derive(Debug, Default)]
pub struct StatusEventLog {
    events: Mutex<Vec<StatusEvent>>,
}

impl StatusEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events received so far
    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().clone()
    }

    /// Remove and return all events received so far
    pub fn drain(&self) -> Vec<StatusEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl StatusListener for StatusEventLog {
    fn on_status_changed(&self, status: AlarmStatus) {
        self.events.lock().push(StatusEvent::StatusChanged { status });
    }

    fn on_cat_detected(&self, cat_detected: bool) {
        self.events.lock().push(StatusEvent::CatDetected { cat_detected });
    }

    fn on_sensor_status_changed(&self) {
        self.events.lock().push(StatusEvent::SensorStatusChanged);
    }
}
