//! Thread-safe handle to a security service
//!
//! Each operation runs with the service locked for its whole duration, so
//! every transition is computed from a consistent view of the repository
//! and no two callers interleave their reads and writes.

use parking_lot::{Mutex, MutexGuard};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::image::{CameraImage, ImageAnalyzer};
use crate::listener::{ListenerId, StatusListener};
use crate::repository::SecurityRepository;
use crate::sensor::Sensor;
use crate::service::SecurityService;
use crate::status::{AlarmStatus, ArmingStatus};
use crate::Result;

/// Cloneable, lockable security service
pub struct SharedSecurityService<R, I> {
    inner: Arc<Mutex<SecurityService<R, I>>>,
}

impl<R, I> Clone for SharedSecurityService<R, I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, I> SharedSecurityService<R, I>
where
    R: SecurityRepository,
    I: ImageAnalyzer,
{
    pub fn new(service: SecurityService<R, I>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    /// Lock the service for a sequence of operations that must not be
    /// interleaved with other callers.
    pub fn lock(&self) -> MutexGuard<'_, SecurityService<R, I>> {
        self.inner.lock()
    }

    pub fn set_arming_status(&self, arming_status: ArmingStatus) -> Result<()> {
        self.inner.lock().set_arming_status(arming_status)
    }

    pub fn change_sensor_activation_status(&self, sensor: &mut Sensor, active: bool) -> Result<()> {
        self.inner.lock().change_sensor_activation_status(sensor, active)
    }

    pub fn process_image(&self, image: &CameraImage) -> Result<bool> {
        self.inner.lock().process_image(image)
    }

    pub fn set_alarm_status(&self, status: AlarmStatus) -> Result<()> {
        self.inner.lock().set_alarm_status(status)
    }

    pub fn add_status_listener(&self, listener: Arc<dyn StatusListener>) -> ListenerId {
        self.inner.lock().add_status_listener(listener)
    }

    pub fn remove_status_listener(&self, id: ListenerId) -> bool {
        self.inner.lock().remove_status_listener(id)
    }

    pub fn alarm_status(&self) -> Result<AlarmStatus> {
        self.inner.lock().alarm_status()
    }

    pub fn arming_status(&self) -> Result<ArmingStatus> {
        self.inner.lock().arming_status()
    }

    pub fn sensors(&self) -> Result<BTreeSet<Sensor>> {
        self.inner.lock().sensors()
    }

    pub fn add_sensor(&self, sensor: Sensor) -> Result<()> {
        self.inner.lock().add_sensor(sensor)
    }

    pub fn remove_sensor(&self, sensor: &Sensor) -> Result<()> {
        self.inner.lock().remove_sensor(sensor)
    }
}
