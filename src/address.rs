//! I2C addresses of the GY-86 sensors.
//!
//! The MPU6050 address is selected by its AD0 pin:
//! - 0x68 (default, AD0 low)
//! - 0x69 (alternate, AD0 high)
//!
//! The HMC5883L sits behind the MPU6050's I2C bypass at a fixed address.

/// Fixed 7-bit address of the HMC5883L magnetometer.
pub const HMC5883L_ADDRESS: u8 = 0x1E;

/// MPU6050 I2C address wrapper.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Address(pub u8);

impl Default for Address {
    /// The address used when AD0 is grounded or left floating.
    fn default() -> Self {
        Self(0x68)
    }
}

impl From<Address> for u8 {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl From<u8> for Address {
    fn from(addr: u8) -> Self {
        Self(addr)
    }
}
