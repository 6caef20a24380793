//! Sensor access traits.
//!
//! The calibration and heading engines do not talk to registers directly;
//! they are written against these two traits. [`crate::device::Gy86`] is the
//! hardware implementation, and tests drive the engines with simulated
//! sensors instead.
//!
//! Implementations are expected to be exclusive owners of the device while
//! an engine runs: calibration mutates live offset registers, and any other
//! reader would observe unstable intermediate values.

use crate::{
    accel::{Accel, AccelFullScale},
    gyro::{Gyro, GyroFullScale},
    mag::{Mag, MagGain},
};
use core::fmt::Debug;

/// Access to the six motion axes and their hardware configuration.
pub trait MotionInterface {
    /// Error of the underlying transport.
    type BusError: Debug;

    /// Read one raw accelerometer + gyroscope sample.
    fn motion6(&mut self) -> Result<(Accel, Gyro), Self::BusError>;

    /// Write the accelerometer offset registers.
    ///
    /// Values take effect before the next [`Self::motion6`] read returns.
    fn set_accel_offsets(&mut self, offsets: &Accel) -> Result<(), Self::BusError>;

    /// Write the gyroscope offset registers.
    fn set_gyro_offsets(&mut self, offsets: &Gyro) -> Result<(), Self::BusError>;

    fn accel_full_scale(&mut self) -> Result<AccelFullScale, Self::BusError>;

    fn set_accel_full_scale(&mut self, scale: AccelFullScale) -> Result<(), Self::BusError>;

    fn gyro_full_scale(&mut self) -> Result<GyroFullScale, Self::BusError>;

    fn set_gyro_full_scale(&mut self, scale: GyroFullScale) -> Result<(), Self::BusError>;
}

/// Access to the magnetometer and its gain configuration.
pub trait CompassInterface {
    type BusError: Debug;

    /// Read one raw magnetic field sample, no offset correction applied.
    fn mag(&mut self) -> Result<Mag, Self::BusError>;

    fn gain(&mut self) -> Result<MagGain, Self::BusError>;

    fn set_gain(&mut self, gain: MagGain) -> Result<(), Self::BusError>;
}
