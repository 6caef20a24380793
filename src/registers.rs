//! Register maps of the two sensors the calibration and heading engines use.
//!
//! Only the registers this crate actually touches are listed: power and
//! bypass control, full scale configuration, hardware offset registers and
//! the measurement data blocks. The MS5611 barometer on the same board has
//! no register map here because nothing in this crate reads it.

/// MPU6050 registers.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum MpuRegister {
    /// High byte of X-axis accelerometer offset (0x06), start of the six
    /// byte offset block
    AccelOffsetX_H = 0x06,
    /// High byte of X-axis gyroscope offset (0x13), start of the six byte
    /// offset block
    GyroOffsetX_H = 0x13,
    /// Sample Rate Divider (0x19)
    SmpRtDiv = 0x19,
    /// Gyroscope Configuration (0x1B), FS_SEL in bits 4:3
    GyroConfig = 0x1B,
    /// Accelerometer Configuration (0x1C), AFS_SEL in bits 4:3
    AccelConfig = 0x1C,
    /// INT Pin / Bypass Enable Configuration (0x37), bit 1 routes the
    /// auxiliary I2C bus to the host so the HMC5883L becomes reachable
    IntPinCfg = 0x37,
    /// High byte of X-axis acceleration (0x3B), start of the fourteen byte
    /// accel/temp/gyro data block
    AccelX_H = 0x3B,
    /// User Control (0x6A), I2C master enable must stay clear for bypass
    UserCtrl = 0x6A,
    /// Power Management 1 (0x6B), sleep bit and clock source
    PwrMgmt1 = 0x6B,
    /// Device identity (0x75), reads back 0x68
    WhoAmI = 0x75,
}

/// Value of [`MpuRegister::WhoAmI`] on a genuine MPU6050.
pub const MPU6050_DEVICE_ID: u8 = 0x68;

/// HMC5883L registers.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum MagRegister {
    /// Configuration Register A (0x00): sample averaging and output rate
    ConfigA = 0x00,
    /// Configuration Register B (0x01): gain in bits 7:5
    ConfigB = 0x01,
    /// Mode Register (0x02): continuous / single / idle
    Mode = 0x02,
    /// Start of the six byte data block (0x03), axis order X, Z, Y
    DataX_H = 0x03,
    /// Status Register (0x09)
    Status = 0x09,
    /// Identification Register A (0x0A), reads `'H'`
    IdA = 0x0A,
    /// Identification Register B (0x0B), reads `'4'`
    IdB = 0x0B,
    /// Identification Register C (0x0C), reads `'3'`
    IdC = 0x0C,
}

/// Values of the three HMC5883L identification registers.
pub const HMC5883L_DEVICE_ID: [u8; 3] = [b'H', b'4', b'3'];
