//! Blocking offset calibration.
//!
//! This module drives the MPU6050 hardware offset registers until the device
//! reports "level and still" while it is physically level and still:
//! - a sampling averager collects per-axis means over many raw readings
//! - a closed-form first pass puts the offsets near the solution
//! - a proportional correction loop walks every axis into its deadzone
//!
//! Calibration mutates live offset registers on every iteration, so the
//! caller must hold exclusive access to the device for the whole run; any
//! concurrent reader would observe unstable intermediate values. The loop is
//! bounded by [`CalibrationParameters::max_iterations`] and fails with
//! [`Error::NoConvergence`] instead of spinning forever on a tilted or
//! vibrating device.

use crate::{
    calibration::{
        CalibrationParameters, MeanAccumulator, MeanMotion, Offsets, ACCEL_FIRST_PASS_DAMPING,
        GYRO_FIRST_PASS_DAMPING, SAMPLE_DELAY_US, SETTLE_DELAY_US,
    },
    error::Error,
    interface::MotionInterface,
};
use embedded_hal::delay::DelayNs;

/// One averaging pass: capture `warmup_count + sample_count` samples,
/// discard the warmup window, return truncating per-axis means.
///
/// A transport failure on any capture aborts the pass, partial means are
/// never returned.
pub fn collect_mean_values<M>(
    sensor: &mut M,
    delay: &mut impl DelayNs,
    parameters: &CalibrationParameters,
) -> Result<MeanMotion, Error<M::BusError>>
where
    M: MotionInterface,
{
    let mut accumulator = MeanAccumulator::new();

    for _ in 0..parameters.warmup_count {
        let _ = sensor.motion6()?;
        delay.delay_us(SAMPLE_DELAY_US);
    }

    for _ in 0..parameters.sample_count {
        let (accel, gyro) = sensor.motion6()?;
        accumulator.add(&accel, &gyro);
        delay.delay_us(SAMPLE_DELAY_US);
    }

    Ok(accumulator.means(parameters.sample_count))
}

/// Closed-form first guess from the zero-offset means.
///
/// Division, not iteration: the damped quotient jumps most of the way to the
/// solution without overshooting, the correction loop finishes the rest.
pub fn first_pass_offsets(mean: &MeanMotion, parameters: &CalibrationParameters) -> Offsets {
    Offsets {
        ax: -mean.ax / ACCEL_FIRST_PASS_DAMPING,
        ay: -mean.ay / ACCEL_FIRST_PASS_DAMPING,
        az: (parameters.accel_z_target() - mean.az) / ACCEL_FIRST_PASS_DAMPING,
        gx: -mean.gx / GYRO_FIRST_PASS_DAMPING,
        gy: -mean.gy / GYRO_FIRST_PASS_DAMPING,
        gz: -mean.gz / GYRO_FIRST_PASS_DAMPING,
    }
}

fn apply_offsets<M>(sensor: &mut M, offsets: &Offsets) -> Result<(), Error<M::BusError>>
where
    M: MotionInterface,
{
    sensor.set_accel_offsets(&offsets.accel())?;
    sensor.set_gyro_offsets(&offsets.gyro())?;
    Ok(())
}

/// Converge all six offsets, returning the final [`Offsets`].
///
/// Targets are 0 for accelerometer X/Y and all gyroscope axes, and 1 g in
/// raw units of the configured accelerometer scale for Z. On success every
/// axis mean was simultaneously inside its deadzone; on
/// [`Error::NoConvergence`] the offset registers are left at the last
/// intermediate value and no offsets are returned.
pub fn calibrate<M>(
    sensor: &mut M,
    delay: &mut impl DelayNs,
    parameters: &CalibrationParameters,
) -> Result<Offsets, Error<M::BusError>>
where
    M: MotionInterface,
{
    apply_offsets(sensor, &Offsets::ZERO)?;
    delay.delay_us(SETTLE_DELAY_US);

    let mean = collect_mean_values(sensor, delay, parameters)?;
    let mut offsets = first_pass_offsets(&mean, parameters);

    let accel_divisor = parameters.accel_deadzone.value().max(1);
    // The minimum useful gyro deadzone is 1, dividing by it verbatim would
    // make every correction step as large as the error itself.
    let gyro_divisor = parameters.gyro_deadzone.value() + 1;
    let z_target = parameters.accel_z_target();

    for _ in 0..parameters.max_iterations {
        apply_offsets(sensor, &offsets)?;
        let mean = collect_mean_values(sensor, delay, parameters)?;

        let mut ready = 0;

        if parameters.accel_deadzone.contains(mean.ax) {
            ready += 1;
        } else {
            offsets.ax -= mean.ax / accel_divisor;
        }
        if parameters.accel_deadzone.contains(mean.ay) {
            ready += 1;
        } else {
            offsets.ay -= mean.ay / accel_divisor;
        }
        let z_error = z_target - mean.az;
        if parameters.accel_deadzone.contains(z_error) {
            ready += 1;
        } else {
            offsets.az += z_error / accel_divisor;
        }

        if parameters.gyro_deadzone.contains(mean.gx) {
            ready += 1;
        } else {
            offsets.gx -= mean.gx / gyro_divisor;
        }
        if parameters.gyro_deadzone.contains(mean.gy) {
            ready += 1;
        } else {
            offsets.gy -= mean.gy / gyro_divisor;
        }
        if parameters.gyro_deadzone.contains(mean.gz) {
            ready += 1;
        } else {
            offsets.gz -= mean.gz / gyro_divisor;
        }

        if ready == 6 {
            return Ok(offsets);
        }
    }

    Err(Error::NoConvergence {
        iterations: parameters.max_iterations,
    })
}
