//! In-memory repository adapter

use std::collections::BTreeSet;

use super::{SecurityRepository, SecurityState};
use crate::sensor::Sensor;
use crate::status::{AlarmStatus, ArmingStatus};
use crate::Result;

/// Repository that keeps all state in process memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySecurityRepository {
    state: SecurityState,
}

impl InMemorySecurityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing state
    pub fn with_state(state: SecurityState) -> Self {
        Self { state }
    }

    /// Borrow the current state
    pub fn state(&self) -> &SecurityState {
        &self.state
    }
}

impl SecurityRepository for InMemorySecurityRepository {
    fn add_sensor(&mut self, sensor: Sensor) -> Result<()> {
        self.state.sensors.insert(sensor);
        Ok(())
    }

    fn remove_sensor(&mut self, sensor: &Sensor) -> Result<()> {
        self.state.sensors.remove(sensor);
        Ok(())
    }

    fn update_sensor(&mut self, sensor: &Sensor) -> Result<()> {
        self.state.upsert_sensor(sensor);
        Ok(())
    }

    fn sensors(&self) -> Result<BTreeSet<Sensor>> {
        Ok(self.state.sensors.clone())
    }

    fn alarm_status(&self) -> Result<AlarmStatus> {
        Ok(self.state.alarm_status)
    }

    fn set_alarm_status(&mut self, status: AlarmStatus) -> Result<()> {
        self.state.alarm_status = status;
        Ok(())
    }

    fn arming_status(&self) -> Result<ArmingStatus> {
        Ok(self.state.arming_status)
    }

    fn set_arming_status(&mut self, status: ArmingStatus) -> Result<()> {
        self.state.arming_status = status;
        Ok(())
    }
}
