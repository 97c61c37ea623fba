//! Repository port - the persistence boundary of the security system
//!
//! The security service reads and writes all durable state through this
//! trait: the sensor set, the alarm status and the arming status. Adapters
//! decide how that state survives restarts.
//!
//! - **InMemorySecurityRepository**: process-local state, used by tests
//! - **FileSecurityRepository**: JSON document rewritten on every mutation

pub mod file;
pub mod memory;

pub use file::FileSecurityRepository;
pub use memory::InMemorySecurityRepository;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::sensor::Sensor;
use crate::status::{AlarmStatus, ArmingStatus};
use crate::Result;

/// Port for persisting security system state
///
/// Failures are returned to the security service, which propagates them to
/// its caller without retrying.
pub trait SecurityRepository {
    /// Add a sensor. Adding a sensor whose identity is already known keeps
    /// the existing entry.
    fn add_sensor(&mut self, sensor: Sensor) -> Result<()>;

    /// Remove the sensor with the same identity, if present
    fn remove_sensor(&mut self, sensor: &Sensor) -> Result<()>;

    /// Replace the stored sensor with the same identity (remove, then add)
    fn update_sensor(&mut self, sensor: &Sensor) -> Result<()>;

    /// Snapshot of all sensors. Mutating the returned set never affects
    /// the stored state.
    fn sensors(&self) -> Result<BTreeSet<Sensor>>;

    fn alarm_status(&self) -> Result<AlarmStatus>;

    fn set_alarm_status(&mut self, status: AlarmStatus) -> Result<()>;

    fn arming_status(&self) -> Result<ArmingStatus>;

    fn set_arming_status(&mut self, status: ArmingStatus) -> Result<()>;
}

/// Complete persisted state of the security system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityState {
    #[serde(default)]
    pub alarm_status: AlarmStatus,

    #[serde(default)]
    pub arming_status: ArmingStatus,

    #[serde(default)]
    pub sensors: BTreeSet<Sensor>,
}

impl SecurityState {
    pub(crate) fn upsert_sensor(&mut self, sensor: &Sensor) {
        self.sensors.remove(sensor);
        self.sensors.insert(sensor.clone());
    }
}
