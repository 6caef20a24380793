use core::fmt::Debug;

/// Error for sensor and calibration operations.
///
/// `E` is the error type of the underlying bus, surfaced unmodified through
/// [`Error::Transport`]; bus failures are never retried internally.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error<E> {
    /// An I2C read or write failed. The operation that observed it is
    /// aborted with no partial result.
    Transport(E),
    /// A device identity check failed, the bus is talking to something that
    /// is not a GY-86.
    WrongDevice,
    /// An accelerometer or gyroscope full scale selector outside `0..=3`.
    InvalidFullScale(u8),
    /// A magnetometer gain selector outside `0..=7`.
    InvalidGain(u8),
    /// Offset calibration did not bring all six axes inside their deadzones
    /// within the configured iteration bound.
    NoConvergence {
        /// Number of correction iterations that were run.
        iterations: u32,
    },
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Self::Transport(e)
    }
}
