//! Offset calibration data types and parameters.
//!
//! The calibration loop itself lives in [`crate::calibration_blocking`];
//! this module holds everything that does not touch the hardware: deadzones,
//! the offset set written to the MPU6050 offset registers, and the running
//! mean accumulator used by the sampling averager.

use crate::accel::{Accel, AccelFullScale};
use crate::gyro::Gyro;

/// Number of samples accumulated per averaging pass.
pub(crate) const SAMPLE_COUNT: u32 = 1000;
/// Number of leading samples captured but discarded per averaging pass.
/// The first readings after an offset register write are unstable.
pub(crate) const WARMUP_COUNT: u32 = 100;
/// Pause between captures so consecutive reads do not return the same
/// conversion.
pub(crate) const SAMPLE_DELAY_US: u32 = 2;
/// Pause after zeroing the offset registers before the first averaging pass.
pub(crate) const SETTLE_DELAY_US: u32 = 1000;
/// Mean reading must land within this many LSB of the target per
/// accelerometer axis.
pub(crate) const ACCEL_DEADZONE: i32 = 8;
/// Mean reading must land within this many LSB of zero per gyroscope axis.
pub(crate) const GYRO_DEADZONE: i32 = 1;
/// Damping divisor of the closed-form first guess for accelerometer axes.
pub(crate) const ACCEL_FIRST_PASS_DAMPING: i32 = 8;
/// Damping divisor of the closed-form first guess for gyroscope axes.
pub(crate) const GYRO_FIRST_PASS_DAMPING: i32 = 4;

/// Tolerance band around a calibration target within which an axis counts
/// as converged.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Deadzone {
    value: i32,
}

impl Deadzone {
    pub const fn new(value: i32) -> Self {
        Self { value }
    }

    pub const fn value(&self) -> i32 {
        self.value
    }

    /// Check whether the error to the target is within the band.
    pub(crate) fn contains(self, error: i32) -> bool {
        error.abs() <= self.value
    }
}

/// The six offset values written to the MPU6050 hardware offset registers.
///
/// Kept as i32 because the correction arithmetic runs on i32 means; the
/// register write path saturates each value into the i16 register range.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Offsets {
    pub ax: i32,
    pub ay: i32,
    pub az: i32,
    pub gx: i32,
    pub gy: i32,
    pub gz: i32,
}

impl Offsets {
    pub const ZERO: Self = Self {
        ax: 0,
        ay: 0,
        az: 0,
        gx: 0,
        gy: 0,
        gz: 0,
    };

    /// Accelerometer half in register form.
    pub fn accel(&self) -> Accel {
        Accel::new(saturate(self.ax), saturate(self.ay), saturate(self.az))
    }

    /// Gyroscope half in register form.
    pub fn gyro(&self) -> Gyro {
        Gyro::new(saturate(self.gx), saturate(self.gy), saturate(self.gz))
    }
}

fn saturate(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Per-axis means of one averaging pass, in raw LSB.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct MeanMotion {
    pub ax: i32,
    pub ay: i32,
    pub az: i32,
    pub gx: i32,
    pub gy: i32,
    pub gz: i32,
}

/// Holds the running sums during an averaging pass.
#[derive(Debug, Default)]
pub(crate) struct MeanAccumulator {
    ax: i32,
    ay: i32,
    az: i32,
    gx: i32,
    gy: i32,
    gz: i32,
}

impl MeanAccumulator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, accel: &Accel, gyro: &Gyro) {
        self.ax += accel.x() as i32;
        self.ay += accel.y() as i32;
        self.az += accel.z() as i32;
        self.gx += gyro.x() as i32;
        self.gy += gyro.y() as i32;
        self.gz += gyro.z() as i32;
    }

    /// Truncating integer means over `sample_count` accumulated samples.
    pub(crate) fn means(self, sample_count: u32) -> MeanMotion {
        let n = sample_count as i32;
        MeanMotion {
            ax: self.ax / n,
            ay: self.ay / n,
            az: self.az / n,
            gx: self.gx / n,
            gy: self.gy / n,
            gz: self.gz / n,
        }
    }
}

/// Calibration parameters.
/// (all the values that influence calibration and do not change between
/// calibration loop runs)
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct CalibrationParameters {
    /// Accelerometer full scale the device is configured to during
    /// calibration. Its LSB/g sensitivity is the Z axis target.
    pub accel_scale: AccelFullScale,
    /// Accelerometer tolerance band (also the proportional correction
    /// divisor for accelerometer axes).
    pub accel_deadzone: Deadzone,
    /// Gyroscope tolerance band.
    pub gyro_deadzone: Deadzone,
    /// Samples accumulated per averaging pass.
    pub sample_count: u32,
    /// Samples discarded at the start of each averaging pass.
    pub warmup_count: u32,
    /// Upper bound on correction iterations. There is no safe universal
    /// default: a tilted or vibrating device never converges, so the caller
    /// decides how long to wait before giving up.
    pub max_iterations: u32,
}

impl CalibrationParameters {
    /// Create calibration parameters for the given accelerometer scale and
    /// iteration bound (sensible defaults are used for everything else).
    pub fn new(accel_scale: AccelFullScale, max_iterations: u32) -> Self {
        Self {
            accel_scale,
            accel_deadzone: Deadzone::new(ACCEL_DEADZONE),
            gyro_deadzone: Deadzone::new(GYRO_DEADZONE),
            sample_count: SAMPLE_COUNT,
            warmup_count: WARMUP_COUNT,
            max_iterations,
        }
    }

    /// Raw reading the Z accelerometer axis converges toward (1 g at the
    /// configured scale). The X/Y accelerometer and all gyroscope targets
    /// are zero.
    pub fn accel_z_target(&self) -> i32 {
        self.accel_scale.lsb_per_g() as i32
    }

    /// Change the accelerometer deadzone
    /// (consumes and returns `Self` to be callable in a "builder-like" pattern)
    pub fn with_accel_deadzone(self, value: i32) -> Self {
        Self {
            accel_deadzone: Deadzone::new(value),
            ..self
        }
    }

    /// Change the gyroscope deadzone
    /// (consumes and returns `Self` to be callable in a "builder-like" pattern)
    pub fn with_gyro_deadzone(self, value: i32) -> Self {
        Self {
            gyro_deadzone: Deadzone::new(value),
            ..self
        }
    }

    /// Change the per-pass sample count
    /// (consumes and returns `Self` to be callable in a "builder-like" pattern)
    pub fn with_sample_count(self, sample_count: u32) -> Self {
        Self {
            sample_count,
            ..self
        }
    }

    /// Change the per-pass warmup count
    /// (consumes and returns `Self` to be callable in a "builder-like" pattern)
    pub fn with_warmup_count(self, warmup_count: u32) -> Self {
        Self {
            warmup_count,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn z_target_follows_configured_scale() {
        let p = CalibrationParameters::new(AccelFullScale::G2, 10);
        assert_eq!(p.accel_z_target(), 16384);
        let p = CalibrationParameters::new(AccelFullScale::G8, 10);
        assert_eq!(p.accel_z_target(), 4096);
    }

    #[test]
    fn offsets_saturate_into_register_range() {
        let offsets = Offsets {
            ax: 40_000,
            ay: -40_000,
            az: 12,
            gx: 0,
            gy: 0,
            gz: 0,
        };
        assert_eq!(offsets.accel(), Accel::new(i16::MAX, i16::MIN, 12));
    }

    #[test]
    fn means_use_truncating_division() {
        let mut acc = MeanAccumulator::new();
        acc.add(&Accel::new(5, -5, 7), &Gyro::new(1, -1, 0));
        acc.add(&Accel::new(4, -4, 7), &Gyro::new(0, 0, 0));
        let means = acc.means(2);
        // 9 / 2 truncates to 4, -9 / 2 truncates to -4
        assert_eq!(means.ax, 4);
        assert_eq!(means.ay, -4);
        assert_eq!(means.az, 7);
        assert_eq!(means.gx, 0);
    }
}
