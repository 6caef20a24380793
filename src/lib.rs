#![no_std]

//! Driver core for the GY-86 10DOF breakout board.
//!
//! The board carries an InvenSense MPU6050 (accelerometer + gyroscope), a
//! Honeywell HMC5883L magnetometer reachable through the MPU's I2C bypass,
//! and an MS5611 barometer (not handled by this crate).
//!
//! What this crate provides on top of raw register access:
//! - an iterative rest-state offset calibration that drives the MPU6050
//!   hardware offset registers until the device reads "level and still"
//!   ([`calibration_blocking::calibrate`])
//! - a gain- and declination-corrected compass heading from the HMC5883L
//!   ([`heading::heading`])
//!
//! Attitude fusion (quaternion/DCM filters) is explicitly out of scope;
//! feed the calibrated output of this crate into one of those instead.

pub mod accel;
pub mod address;
pub mod calibration;
pub mod calibration_blocking;
pub mod device;
pub mod error;
pub mod gyro;
pub mod heading;
pub mod interface;
pub mod mag;
pub mod registers;
