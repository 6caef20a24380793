/// Raw acceleration readings vector, in ADC units (LSB).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Accel {
    pub(crate) x: i16,
    pub(crate) y: i16,
    pub(crate) z: i16,
}

impl Accel {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    pub const fn from_bytes(data: [u8; 6]) -> Self {
        let x = [data[0], data[1]];
        let y = [data[2], data[3]];
        let z = [data[4], data[5]];
        Self {
            x: i16::from_be_bytes(x),
            y: i16::from_be_bytes(y),
            z: i16::from_be_bytes(z),
        }
    }

    pub const fn to_bytes(&self) -> [u8; 6] {
        let x = self.x.to_be_bytes();
        let y = self.y.to_be_bytes();
        let z = self.z.to_be_bytes();
        [x[0], x[1], y[0], y[1], z[0], z[1]]
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

    /// Convert to units of `g` at the given full scale setting.
    pub fn scaled(&self, scale: AccelFullScale) -> AccelF32 {
        AccelF32 {
            x: scale.scale_value(self.x),
            y: scale.scale_value(self.y),
            z: scale.scale_value(self.z),
        }
    }
}

/// Accelerometer full scale range (ACCEL_CONFIG AFS_SEL field).
///
/// Wider ranges trade resolution for measurement span.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum AccelFullScale {
    G2 = 0,
    G4 = 1,
    G8 = 2,
    G16 = 3,
}

impl AccelFullScale {
    /// Decode a raw AFS_SEL index. Returns `None` for anything outside `0..=3`
    /// so that an unrecognized selector is rejected instead of read out of
    /// bounds.
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::G2),
            1 => Some(Self::G4),
            2 => Some(Self::G8),
            3 => Some(Self::G16),
            _ => None,
        }
    }

    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Sensitivity in LSB per g at this range.
    ///
    /// This is also the raw reading the Z axis is expected to settle at when
    /// the device lies flat, which makes it the Z target of the offset
    /// calibration.
    pub const fn lsb_per_g(self) -> i16 {
        match self {
            Self::G2 => 16384,
            Self::G4 => 8192,
            Self::G8 => 4096,
            Self::G16 => 2048,
        }
    }

    pub fn scale_value(self, value: i16) -> f32 {
        (value as f32) / (self.lsb_per_g() as f32)
    }
}

/// Acceleration in units of `g`.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct AccelF32 {
    x: f32,
    y: f32,
    z: f32,
}

impl AccelF32 {
    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn z(&self) -> f32 {
        self.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_scale_index_round_trip() {
        for index in 0..=3 {
            let scale = AccelFullScale::from_index(index).unwrap();
            assert_eq!(scale.index(), index);
        }
    }

    #[test]
    fn full_scale_rejects_unknown_index() {
        assert!(AccelFullScale::from_index(4).is_none());
        assert!(AccelFullScale::from_index(255).is_none());
    }

    #[test]
    fn sensitivity_table() {
        assert_eq!(AccelFullScale::G2.lsb_per_g(), 16384);
        assert_eq!(AccelFullScale::G4.lsb_per_g(), 8192);
        assert_eq!(AccelFullScale::G8.lsb_per_g(), 4096);
        assert_eq!(AccelFullScale::G16.lsb_per_g(), 2048);
    }

    #[test]
    fn byte_round_trip() {
        let accel = Accel::new(-1180, 512, 16384);
        assert_eq!(Accel::from_bytes(accel.to_bytes()), accel);
    }
}
