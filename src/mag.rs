//! Magnetometer data types for the HMC5883L.
//!
//! The HMC5883L measures the local magnetic field along three axes. Unlike
//! the MPU6050 it has no hardware offset registers, so hard-iron correction
//! is held in software as [`MagOffsets`] and subtracted from every reading.

/// Raw magnetic field readings vector, in ADC units (LSB).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mag {
    pub(crate) x: i16,
    pub(crate) y: i16,
    pub(crate) z: i16,
}

impl Mag {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    /// Decode the HMC5883L data register block.
    ///
    /// The device orders its output registers X, Z, Y with each axis as a
    /// big-endian signed 16-bit pair.
    pub const fn from_bytes(data: [u8; 6]) -> Self {
        let x = [data[0], data[1]];
        let z = [data[2], data[3]];
        let y = [data[4], data[5]];
        Self {
            x: i16::from_be_bytes(x),
            y: i16::from_be_bytes(y),
            z: i16::from_be_bytes(z),
        }
    }

    pub const fn to_bytes(&self) -> [u8; 6] {
        let x = self.x.to_be_bytes();
        let z = self.z.to_be_bytes();
        let y = self.y.to_be_bytes();
        [x[0], x[1], z[0], z[1], y[0], y[1]]
    }

    pub fn x(&self) -> i16 {
        self.x
    }

    pub fn y(&self) -> i16 {
        self.y
    }

    pub fn z(&self) -> i16 {
        self.z
    }
}

/// Magnetometer gain setting (CONFIG_B GN field).
///
/// Named after the recommended sensor field range of each setting; higher
/// ranges trade resolution for span, analogous to the accelerometer and
/// gyroscope full scale ranges.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum MagGain {
    Ga0_88 = 0,
    Ga1_3 = 1,
    Ga1_9 = 2,
    Ga2_5 = 3,
    Ga4_0 = 4,
    Ga4_7 = 5,
    Ga5_6 = 6,
    Ga8_1 = 7,
}

impl MagGain {
    /// Decode a raw GN index, rejecting anything outside `0..=7`.
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Ga0_88),
            1 => Some(Self::Ga1_3),
            2 => Some(Self::Ga1_9),
            3 => Some(Self::Ga2_5),
            4 => Some(Self::Ga4_0),
            5 => Some(Self::Ga4_7),
            6 => Some(Self::Ga5_6),
            7 => Some(Self::Ga8_1),
            _ => None,
        }
    }

    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Digital resolution in milligauss per LSB at this gain.
    pub const fn mgauss_per_lsb(self) -> f32 {
        match self {
            Self::Ga0_88 => 0.73,
            Self::Ga1_3 => 0.92,
            Self::Ga1_9 => 1.22,
            Self::Ga2_5 => 1.52,
            Self::Ga4_0 => 2.27,
            Self::Ga4_7 => 2.56,
            Self::Ga5_6 => 3.03,
            Self::Ga8_1 => 4.35,
        }
    }
}

/// Software hard-iron offsets for the magnetometer.
///
/// Subtracted from the X and Y axes before the heading computation; the Z
/// offset is stored for callers that want it but the heading path leaves Z
/// untouched (heading is a 2D horizontal-plane computation).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct MagOffsets {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl MagOffsets {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}
