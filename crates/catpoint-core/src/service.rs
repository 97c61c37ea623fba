//! Security service - the alarm state machine
//!
//! Receives sensor, arming and camera events, decides the resulting alarm
//! status, writes it through the repository and notifies listeners.
//!
//! ```text
//!                  sensor on                 sensor on
//!   NO_ALARM ─────────────────► PENDING ─────────────────► ALARM
//!      ▲                          │                          │
//!      │   last sensor off        │                          │
//!      └──────────────────────────┘                          │
//!      ▲                                                     │
//!      └──────────────────── disarm ─────────────────────────┘
//!
//!   cat on camera while ARMED_HOME ──► ALARM
//!   no cat and no active sensor    ──► NO_ALARM
//! ```
//!
//! `ALARM` is sticky: sensor changes never clear it, only disarming does.

use crate::image::{CameraImage, ImageAnalyzer, CAT_CONFIDENCE_THRESHOLD};
use crate::listener::{ListenerId, ListenerRegistry, StatusListener};
use crate::repository::SecurityRepository;
use crate::sensor::{Sensor, SensorType};
use crate::status::{AlarmStatus, ArmingStatus};
use crate::{CatpointError, Result};

use std::collections::BTreeSet;
use std::sync::Arc;

/// Alarm decision engine
///
/// The repository and image analyzer are injected; the service owns them
/// for its lifetime and is the only writer of the alarm status.
#[derive(Debug)]
pub struct SecurityService<R, I> {
    repository: R,
    image_analyzer: I,
    listeners: ListenerRegistry,
    cat_detected: bool,
}

impl<R, I> SecurityService<R, I>
where
    R: SecurityRepository,
    I: ImageAnalyzer,
{
    pub fn new(repository: R, image_analyzer: I) -> Self {
        Self {
            repository,
            image_analyzer,
            listeners: ListenerRegistry::new(),
            cat_detected: false,
        }
    }

    /// Change the arming mode.
    ///
    /// Disarming clears the alarm. Arming resets every sensor to inactive
    /// and, when arming at home with a cat already on camera, raises the
    /// alarm. Listeners are told that sensors changed in both cases.
    pub fn set_arming_status(&mut self, arming_status: ArmingStatus) -> Result<()> {
        match arming_status {
            ArmingStatus::Disarmed => {
                self.set_alarm_status(AlarmStatus::NoAlarm)?;
            }
            ArmingStatus::ArmedHome | ArmingStatus::ArmedAway => {
                for mut sensor in self.repository.sensors()? {
                    sensor.set_active(false);
                    self.repository.update_sensor(&sensor)?;
                }

                if arming_status == ArmingStatus::ArmedHome && self.cat_detected {
                    self.set_alarm_status(AlarmStatus::Alarm)?;
                }
            }
        }

        self.repository.set_arming_status(arming_status)?;
        tracing::info!("Arming status set to {}", arming_status);
        self.listeners.notify_sensor_status_changed();
        Ok(())
    }

    /// Change the activation flag of `sensor` and update the alarm.
    ///
    /// Does nothing at all when the flag already has the requested value.
    pub fn change_sensor_activation_status(&mut self, sensor: &mut Sensor, active: bool) -> Result<()> {
        if sensor.is_active() == active {
            tracing::debug!("Sensor {} unchanged", sensor);
            return Ok(());
        }

        let mut updated = sensor.clone();
        updated.set_active(active);
        self.repository.update_sensor(&updated)?;
        *sensor = updated;
        tracing::debug!("Sensor updated: {}", sensor);

        if active {
            self.handle_sensor_activated()
        } else {
            self.handle_sensor_deactivated()
        }
    }

    /// Analyze a camera frame and update the alarm. Returns the verdict.
    pub fn process_image(&mut self, image: &CameraImage) -> Result<bool> {
        let cat = self
            .image_analyzer
            .image_contains_cat(image, CAT_CONFIDENCE_THRESHOLD)?;
        self.cat_detected(cat)?;
        Ok(cat)
    }

    /// Write the alarm status and notify every listener
    pub fn set_alarm_status(&mut self, status: AlarmStatus) -> Result<()> {
        self.repository.set_alarm_status(status)?;
        tracing::info!("Alarm status set to {}", status);
        self.listeners.notify_status_changed(status);
        Ok(())
    }

    fn handle_sensor_activated(&mut self) -> Result<()> {
        match self.repository.alarm_status()? {
            AlarmStatus::NoAlarm => self.set_alarm_status(AlarmStatus::PendingAlarm),
            AlarmStatus::PendingAlarm => {
                if self.any_sensor_active()? {
                    self.set_alarm_status(AlarmStatus::Alarm)
                } else {
                    Ok(())
                }
            }
            AlarmStatus::Alarm => Ok(()),
        }
    }

    fn handle_sensor_deactivated(&mut self) -> Result<()> {
        match self.repository.alarm_status()? {
            AlarmStatus::PendingAlarm => {
                if !self.any_sensor_active()? {
                    self.set_alarm_status(AlarmStatus::NoAlarm)?;
                }
                Ok(())
            }
            AlarmStatus::NoAlarm | AlarmStatus::Alarm => Ok(()),
        }
    }

    fn cat_detected(&mut self, cat: bool) -> Result<()> {
        self.cat_detected = cat;
        let any_active = self.any_sensor_active()?;

        if cat && self.repository.arming_status()? == ArmingStatus::ArmedHome {
            self.set_alarm_status(AlarmStatus::Alarm)?;
        } else if !any_active {
            self.set_alarm_status(AlarmStatus::NoAlarm)?;
        }

        self.listeners.notify_cat_detected(cat);
        Ok(())
    }

    fn any_sensor_active(&self) -> Result<bool> {
        Ok(self.repository.sensors()?.iter().any(Sensor::is_active))
    }

    /// Register a listener for alarm, camera and sensor updates
    pub fn add_status_listener(&mut self, listener: Arc<dyn StatusListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_status_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn alarm_status(&self) -> Result<AlarmStatus> {
        self.repository.alarm_status()
    }

    pub fn arming_status(&self) -> Result<ArmingStatus> {
        self.repository.arming_status()
    }

    pub fn sensors(&self) -> Result<BTreeSet<Sensor>> {
        self.repository.sensors()
    }

    /// Look up a sensor by identity
    pub fn find_sensor(&self, name: &str, sensor_type: SensorType) -> Result<Sensor> {
        self.repository
            .sensors()?
            .into_iter()
            .find(|s| s.matches(name, sensor_type))
            .ok_or_else(|| CatpointError::SensorNotFound {
                name: name.to_string(),
                sensor_type,
            })
    }

    pub fn add_sensor(&mut self, sensor: Sensor) -> Result<()> {
        tracing::info!("Sensor added: {} ({})", sensor.name(), sensor.sensor_type());
        self.repository.add_sensor(sensor)
    }

    pub fn remove_sensor(&mut self, sensor: &Sensor) -> Result<()> {
        tracing::info!("Sensor removed: {} ({})", sensor.name(), sensor.sensor_type());
        self.repository.remove_sensor(sensor)
    }

    /// Whether the most recent camera frame showed a cat
    pub fn is_cat_detected(&self) -> bool {
        self.cat_detected
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn image_analyzer(&self) -> &I {
        &self.image_analyzer
    }
}
