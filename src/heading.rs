//! Compass heading from the magnetometer.
//!
//! Heading is a 2D horizontal-plane computation: the X and Y field
//! components are offset-corrected, scaled to physical units and fed to
//! `atan2`. There is no tilt compensation, the board is assumed roughly
//! level; callers that need a tilted heading have to run a fusion filter
//! on top of [`crate::device::Gy86::motion9`] instead.

use crate::{
    error::Error,
    interface::CompassInterface,
    mag::MagOffsets,
};
use core::f32::consts::PI;

/// Compass bearing in degrees.
///
/// The raw `atan2` angle is normalized into `[0, 2π)`, converted to degrees
/// and shifted by the magnetic declination. A negative result wraps up by
/// one turn; a result pushed to 360 or above by a large positive declination
/// is returned as-is.
pub fn heading<C>(
    compass: &mut C,
    offsets: &MagOffsets,
    declination_degrees: f32,
) -> Result<f32, Error<C::BusError>>
where
    C: CompassInterface,
{
    let scale = compass.gain()?.mgauss_per_lsb();
    let mag = compass.mag()?;

    let mx = (mag.x() as i32 - offsets.x) as f32 * scale;
    let my = (mag.y() as i32 - offsets.y) as f32 * scale;

    let mut radians = libm::atan2f(my, mx);
    if radians < 0.0 {
        radians += 2.0 * PI;
    }

    let mut degrees = radians.to_degrees() + declination_degrees;
    if degrees < 0.0 {
        degrees += 360.0;
    }
    Ok(degrees)
}

/// The offset-corrected but unscaled field vector, for callers doing their
/// own fusion. Z carries no software offset, matching the heading path
/// which never uses it.
pub fn heading_vector<C>(
    compass: &mut C,
    offsets: &MagOffsets,
) -> Result<(i32, i32, i32), Error<C::BusError>>
where
    C: CompassInterface,
{
    let mag = compass.mag()?;
    Ok((
        mag.x() as i32 - offsets.x,
        mag.y() as i32 - offsets.y,
        mag.z() as i32,
    ))
}
