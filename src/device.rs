//! GY-86 board driver: MPU6050 plus HMC5883L behind the MPU's I2C bypass.

use crate::{
    accel::{Accel, AccelFullScale},
    address::{Address, HMC5883L_ADDRESS},
    calibration::{CalibrationParameters, MeanMotion, Offsets},
    calibration_blocking::{calibrate, collect_mean_values},
    error::Error,
    gyro::{Gyro, GyroFullScale},
    heading::{heading, heading_vector},
    interface::{CompassInterface, MotionInterface},
    mag::{Mag, MagGain, MagOffsets},
    registers::{MagRegister, MpuRegister, HMC5883L_DEVICE_ID, MPU6050_DEVICE_ID},
};
use embedded_hal::{delay::DelayNs, i2c::I2c};

/// CONFIG_A value written at startup: 8-sample averaging, 15 Hz output,
/// normal measurement bias.
const MAG_CONFIG_A: u8 = 0x70;
/// MODE value for continuous measurement.
const MAG_MODE_CONTINUOUS: u8 = 0x00;

/// Driver for the GY-86 sensor pair.
///
/// Owns the I2C bus and the software-side compass state (hard-iron offsets
/// and declination). Raw single-sensor access goes through the
/// [`MotionInterface`] and [`CompassInterface`] trait impls; the composite
/// operations (`motion9`, `heading`, `calibrate`) are inherent methods.
pub struct Gy86<I>
where
    I: I2c,
{
    i2c: I,
    mpu_address: u8,
    mag_offsets: MagOffsets,
    declination_degrees: f32,
}

impl<I> Gy86<I>
where
    I: I2c,
{
    /// Construct the driver and bring both sensors up:
    /// verify the MPU6050 identity, wake it from sleep, route the auxiliary
    /// bus to the host so the HMC5883L becomes visible, verify its identity
    /// and start it in continuous measurement at the default gain.
    pub fn new(i2c: I, address: Address) -> Result<Self, Error<I::Error>> {
        let mut device = Self {
            i2c,
            mpu_address: address.into(),
            mag_offsets: MagOffsets::default(),
            declination_degrees: 0.0,
        };

        if device.mpu_read_register(MpuRegister::WhoAmI)? != MPU6050_DEVICE_ID {
            return Err(Error::WrongDevice);
        }
        device.wake()?;
        device.enable_bypass()?;

        let mut id = [0; 3];
        device.mag_read(MagRegister::IdA, &mut id)?;
        if id != HMC5883L_DEVICE_ID {
            return Err(Error::WrongDevice);
        }
        device.mag_write_register(MagRegister::ConfigA, MAG_CONFIG_A)?;
        device.mag_write_register(MagRegister::ConfigB, (MagGain::Ga1_3 as u8) << 5)?;
        device.mag_write_register(MagRegister::Mode, MAG_MODE_CONTINUOUS)?;

        Ok(device)
    }

    /// Returns the underlying I2C peripheral, consuming this driver.
    pub fn release(self) -> I {
        self.i2c
    }

    fn wake(&mut self) -> Result<(), I::Error> {
        let mut value = self.mpu_read_register(MpuRegister::PwrMgmt1)?;
        value &= !(1 << 6);
        self.mpu_write_register(MpuRegister::PwrMgmt1, value)
    }

    /// Route the MPU's auxiliary I2C pins straight to the host bus. The
    /// internal I2C master must stay disabled for the bypass mux to engage.
    fn enable_bypass(&mut self) -> Result<(), I::Error> {
        let mut value = self.mpu_read_register(MpuRegister::UserCtrl)?;
        value &= !(1 << 5);
        self.mpu_write_register(MpuRegister::UserCtrl, value)?;
        let mut value = self.mpu_read_register(MpuRegister::IntPinCfg)?;
        value |= 1 << 1;
        self.mpu_write_register(MpuRegister::IntPinCfg, value)
    }

    fn mpu_read(&mut self, reg: MpuRegister, buf: &mut [u8]) -> Result<(), I::Error> {
        self.i2c.write_read(self.mpu_address, &[reg as u8], buf)
    }

    fn mpu_read_register(&mut self, reg: MpuRegister) -> Result<u8, I::Error> {
        let mut buf = [0; 1];
        self.mpu_read(reg, &mut buf)?;
        Ok(buf[0])
    }

    fn mpu_write(&mut self, bytes: &[u8]) -> Result<(), I::Error> {
        self.i2c.write(self.mpu_address, bytes)
    }

    fn mpu_write_register(&mut self, reg: MpuRegister, value: u8) -> Result<(), I::Error> {
        self.mpu_write(&[reg as u8, value])
    }

    fn mag_read(&mut self, reg: MagRegister, buf: &mut [u8]) -> Result<(), I::Error> {
        self.i2c.write_read(HMC5883L_ADDRESS, &[reg as u8], buf)
    }

    fn mag_read_register(&mut self, reg: MagRegister) -> Result<u8, I::Error> {
        let mut buf = [0; 1];
        self.mag_read(reg, &mut buf)?;
        Ok(buf[0])
    }

    fn mag_write_register(&mut self, reg: MagRegister, value: u8) -> Result<(), I::Error> {
        self.i2c.write(HMC5883L_ADDRESS, &[reg as u8, value])
    }

    /// Raw six-axis sample plus the magnetometer with software hard-iron
    /// offsets applied to its X and Y axes (Z is reported raw).
    pub fn motion9(&mut self) -> Result<(Accel, Gyro, (i32, i32, i32)), Error<I::Error>> {
        let (accel, gyro) = MotionInterface::motion6(self)?;
        let mag = CompassInterface::mag(self)?;
        Ok((
            accel,
            gyro,
            (
                mag.x() as i32 - self.mag_offsets.x,
                mag.y() as i32 - self.mag_offsets.y,
                mag.z() as i32,
            ),
        ))
    }

    /// Declination-corrected compass bearing in degrees, see
    /// [`crate::heading::heading`].
    pub fn heading(&mut self) -> Result<f32, Error<I::Error>> {
        let offsets = self.mag_offsets;
        let declination = self.declination_degrees;
        heading(self, &offsets, declination)
    }

    /// Offset-corrected raw field vector, see
    /// [`crate::heading::heading_vector`].
    pub fn heading_vector(&mut self) -> Result<(i32, i32, i32), Error<I::Error>> {
        let offsets = self.mag_offsets;
        heading_vector(self, &offsets)
    }

    /// Run the full offset calibration, see
    /// [`crate::calibration_blocking::calibrate`].
    ///
    /// Blocks for the whole run and requires the device to be level and
    /// still. Nothing else may touch the sensors until it returns.
    pub fn calibrate(
        &mut self,
        delay: &mut impl DelayNs,
        parameters: &CalibrationParameters,
    ) -> Result<Offsets, Error<I::Error>> {
        calibrate(self, delay, parameters)
    }

    /// One averaging pass over the motion axes, see
    /// [`crate::calibration_blocking::collect_mean_values`].
    pub fn collect_mean_values(
        &mut self,
        delay: &mut impl DelayNs,
        parameters: &CalibrationParameters,
    ) -> Result<MeanMotion, Error<I::Error>> {
        collect_mean_values(self, delay, parameters)
    }

    pub fn mag_offsets(&self) -> MagOffsets {
        self.mag_offsets
    }

    pub fn set_mag_offsets(&mut self, offsets: MagOffsets) {
        self.mag_offsets = offsets;
    }

    pub fn declination_degrees(&self) -> f32 {
        self.declination_degrees
    }

    /// Set the magnetic declination added to every heading, in degrees.
    pub fn set_declination_degrees(&mut self, declination: f32) {
        self.declination_degrees = declination;
    }

    /// Set the accelerometer full scale from a raw AFS_SEL index, rejecting
    /// unknown indices before anything is written to hardware.
    pub fn set_accel_full_scale_index(&mut self, index: u8) -> Result<(), Error<I::Error>> {
        let scale = AccelFullScale::from_index(index).ok_or(Error::InvalidFullScale(index))?;
        MotionInterface::set_accel_full_scale(self, scale)?;
        Ok(())
    }

    /// Set the gyroscope full scale from a raw FS_SEL index, rejecting
    /// unknown indices before anything is written to hardware.
    pub fn set_gyro_full_scale_index(&mut self, index: u8) -> Result<(), Error<I::Error>> {
        let scale = GyroFullScale::from_index(index).ok_or(Error::InvalidFullScale(index))?;
        MotionInterface::set_gyro_full_scale(self, scale)?;
        Ok(())
    }

    /// Set the magnetometer gain from a raw GN index, rejecting unknown
    /// indices before anything is written to hardware.
    pub fn set_mag_gain_index(&mut self, index: u8) -> Result<(), Error<I::Error>> {
        let gain = MagGain::from_index(index).ok_or(Error::InvalidGain(index))?;
        CompassInterface::set_gain(self, gain)?;
        Ok(())
    }
}

const fn decode_accel_scale(bits: u8) -> AccelFullScale {
    match bits & 0b11 {
        0 => AccelFullScale::G2,
        1 => AccelFullScale::G4,
        2 => AccelFullScale::G8,
        _ => AccelFullScale::G16,
    }
}

const fn decode_gyro_scale(bits: u8) -> GyroFullScale {
    match bits & 0b11 {
        0 => GyroFullScale::Deg250,
        1 => GyroFullScale::Deg500,
        2 => GyroFullScale::Deg1000,
        _ => GyroFullScale::Deg2000,
    }
}

const fn decode_mag_gain(bits: u8) -> MagGain {
    match bits & 0b111 {
        0 => MagGain::Ga0_88,
        1 => MagGain::Ga1_3,
        2 => MagGain::Ga1_9,
        3 => MagGain::Ga2_5,
        4 => MagGain::Ga4_0,
        5 => MagGain::Ga4_7,
        6 => MagGain::Ga5_6,
        _ => MagGain::Ga8_1,
    }
}

impl<I> MotionInterface for Gy86<I>
where
    I: I2c,
{
    type BusError = I::Error;

    fn motion6(&mut self) -> Result<(Accel, Gyro), I::Error> {
        let mut data = [0; 14];
        self.mpu_read(MpuRegister::AccelX_H, &mut data)?;
        // Bytes 6..8 are the temperature output sitting between the two
        // sensor blocks.
        let accel = Accel::from_bytes([data[0], data[1], data[2], data[3], data[4], data[5]]);
        let gyro = Gyro::from_bytes([data[8], data[9], data[10], data[11], data[12], data[13]]);
        Ok((accel, gyro))
    }

    fn set_accel_offsets(&mut self, offsets: &Accel) -> Result<(), I::Error> {
        let data = offsets.to_bytes();
        self.mpu_write(&[
            MpuRegister::AccelOffsetX_H as u8,
            data[0],
            data[1],
            data[2],
            data[3],
            data[4],
            data[5],
        ])
    }

    fn set_gyro_offsets(&mut self, offsets: &Gyro) -> Result<(), I::Error> {
        let data = offsets.to_bytes();
        self.mpu_write(&[
            MpuRegister::GyroOffsetX_H as u8,
            data[0],
            data[1],
            data[2],
            data[3],
            data[4],
            data[5],
        ])
    }

    fn accel_full_scale(&mut self) -> Result<AccelFullScale, I::Error> {
        let value = self.mpu_read_register(MpuRegister::AccelConfig)?;
        Ok(decode_accel_scale(value >> 3))
    }

    fn set_accel_full_scale(&mut self, scale: AccelFullScale) -> Result<(), I::Error> {
        let mut value = self.mpu_read_register(MpuRegister::AccelConfig)?;
        value = (value & !(0b11 << 3)) | (scale.index() << 3);
        self.mpu_write_register(MpuRegister::AccelConfig, value)
    }

    fn gyro_full_scale(&mut self) -> Result<GyroFullScale, I::Error> {
        let value = self.mpu_read_register(MpuRegister::GyroConfig)?;
        Ok(decode_gyro_scale(value >> 3))
    }

    fn set_gyro_full_scale(&mut self, scale: GyroFullScale) -> Result<(), I::Error> {
        let mut value = self.mpu_read_register(MpuRegister::GyroConfig)?;
        value = (value & !(0b11 << 3)) | (scale.index() << 3);
        self.mpu_write_register(MpuRegister::GyroConfig, value)
    }
}

impl<I> CompassInterface for Gy86<I>
where
    I: I2c,
{
    type BusError = I::Error;

    fn mag(&mut self) -> Result<Mag, I::Error> {
        let mut data = [0; 6];
        self.mag_read(MagRegister::DataX_H, &mut data)?;
        Ok(Mag::from_bytes(data))
    }

    fn gain(&mut self) -> Result<MagGain, I::Error> {
        let value = self.mag_read_register(MagRegister::ConfigB)?;
        Ok(decode_mag_gain(value >> 5))
    }

    fn set_gain(&mut self, gain: MagGain) -> Result<(), I::Error> {
        self.mag_write_register(MagRegister::ConfigB, gain.index() << 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    #[derive(Debug, PartialEq, Eq)]
    struct FakeBusError;

    impl embedded_hal::i2c::Error for FakeBusError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Register-level model of the two chips on one bus.
    struct FakeBus {
        mpu: [u8; 0x80],
        mag: [u8; 0x10],
    }

    impl FakeBus {
        fn new() -> Self {
            let mut bus = Self {
                mpu: [0; 0x80],
                mag: [0; 0x10],
            };
            bus.mpu[MpuRegister::WhoAmI as usize] = MPU6050_DEVICE_ID;
            // Sleep bit is set at power-on.
            bus.mpu[MpuRegister::PwrMgmt1 as usize] = 0x40;
            bus.mag[MagRegister::IdA as usize] = b'H';
            bus.mag[MagRegister::IdB as usize] = b'4';
            bus.mag[MagRegister::IdC as usize] = b'3';
            bus
        }

        fn store(&mut self, address: u8, reg: usize, values: &[u8]) {
            let regs = if address == HMC5883L_ADDRESS {
                &mut self.mag[..]
            } else {
                &mut self.mpu[..]
            };
            regs[reg..reg + values.len()].copy_from_slice(values);
        }
    }

    impl ErrorType for FakeBus {
        type Error = FakeBusError;
    }

    impl I2c for FakeBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), FakeBusError> {
            let regs: &mut [u8] = if address == HMC5883L_ADDRESS {
                &mut self.mag
            } else {
                &mut self.mpu
            };
            let mut pointer = 0;
            for operation in operations.iter_mut() {
                match operation {
                    Operation::Write(bytes) => {
                        pointer = bytes[0] as usize;
                        for (offset, byte) in bytes[1..].iter().enumerate() {
                            regs[pointer + offset] = *byte;
                        }
                    }
                    Operation::Read(buffer) => {
                        for byte in buffer.iter_mut() {
                            *byte = regs[pointer];
                            pointer += 1;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    fn device() -> Gy86<FakeBus> {
        Gy86::new(FakeBus::new(), Address::default()).unwrap()
    }

    #[test]
    fn new_wakes_mpu_and_starts_compass() {
        let bus = device().release();
        assert_eq!(bus.mpu[MpuRegister::PwrMgmt1 as usize] & (1 << 6), 0);
        assert_ne!(bus.mpu[MpuRegister::IntPinCfg as usize] & (1 << 1), 0);
        assert_eq!(bus.mpu[MpuRegister::UserCtrl as usize] & (1 << 5), 0);
        assert_eq!(bus.mag[MagRegister::ConfigA as usize], 0x70);
        assert_eq!(bus.mag[MagRegister::ConfigB as usize], 0x20);
        assert_eq!(bus.mag[MagRegister::Mode as usize], 0x00);
    }

    #[test]
    fn wrong_mpu_identity_is_rejected() {
        let mut bus = FakeBus::new();
        bus.mpu[MpuRegister::WhoAmI as usize] = 0x12;
        assert_eq!(
            Gy86::new(bus, Address::default()).err(),
            Some(Error::WrongDevice)
        );
    }

    #[test]
    fn wrong_compass_identity_is_rejected() {
        let mut bus = FakeBus::new();
        bus.mag[MagRegister::IdA as usize] = b'X';
        assert_eq!(
            Gy86::new(bus, Address::default()).err(),
            Some(Error::WrongDevice)
        );
    }

    #[test]
    fn full_scale_index_round_trips_through_hardware() {
        let mut device = device();
        for index in 0..=3 {
            device.set_accel_full_scale_index(index).unwrap();
            assert_eq!(device.accel_full_scale().unwrap().index(), index);
            device.set_gyro_full_scale_index(index).unwrap();
            assert_eq!(device.gyro_full_scale().unwrap().index(), index);
        }
        for index in 0..=7 {
            device.set_mag_gain_index(index).unwrap();
            assert_eq!(device.gain().unwrap().index(), index);
        }
    }

    #[test]
    fn invalid_selector_is_rejected_without_touching_hardware() {
        let mut device = device();
        device.set_accel_full_scale_index(3).unwrap();
        assert_eq!(
            device.set_accel_full_scale_index(9),
            Err(Error::InvalidFullScale(9))
        );
        assert_eq!(device.accel_full_scale().unwrap(), AccelFullScale::G16);

        device.set_mag_gain_index(5).unwrap();
        assert_eq!(device.set_mag_gain_index(8), Err(Error::InvalidGain(8)));
        assert_eq!(device.gain().unwrap(), MagGain::Ga4_7);
    }

    #[test]
    fn motion6_skips_the_temperature_words() {
        let mut bus = FakeBus::new();
        bus.store(
            0x68,
            MpuRegister::AccelX_H as usize,
            &[
                0x01, 0x02, 0x03, 0x04, 0x05, 0x06, // accel
                0xAA, 0xBB, // temperature
                0x11, 0x12, 0x13, 0x14, 0x15, 0x16, // gyro
            ],
        );
        let mut device = Gy86::new(bus, Address::default()).unwrap();
        let (accel, gyro) = MotionInterface::motion6(&mut device).unwrap();
        assert_eq!(accel, Accel::new(0x0102, 0x0304, 0x0506));
        assert_eq!(gyro, Gyro::new(0x1112, 0x1314, 0x1516));
    }

    #[test]
    fn mag_reads_device_axis_order() {
        let mut bus = FakeBus::new();
        // Register order is X, Z, Y.
        bus.store(
            HMC5883L_ADDRESS,
            MagRegister::DataX_H as usize,
            &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06],
        );
        let mut device = Gy86::new(bus, Address::default()).unwrap();
        let mag = CompassInterface::mag(&mut device).unwrap();
        assert_eq!(mag, Mag::new(0x0102, 0x0506, 0x0304));
    }

    #[test]
    fn offset_writes_land_in_the_offset_blocks() {
        let mut device = device();
        device
            .set_accel_offsets(&Accel::new(0x0102, -2, 0x0304))
            .unwrap();
        device.set_gyro_offsets(&Gyro::new(1, 2, 3)).unwrap();
        let bus = device.release();
        assert_eq!(
            &bus.mpu[MpuRegister::AccelOffsetX_H as usize..MpuRegister::AccelOffsetX_H as usize + 6],
            &[0x01, 0x02, 0xFF, 0xFE, 0x03, 0x04]
        );
        assert_eq!(
            &bus.mpu[MpuRegister::GyroOffsetX_H as usize..MpuRegister::GyroOffsetX_H as usize + 6],
            &[0x00, 0x01, 0x00, 0x02, 0x00, 0x03]
        );
    }

    #[test]
    fn motion9_applies_software_mag_offsets() {
        let mut bus = FakeBus::new();
        bus.store(
            HMC5883L_ADDRESS,
            MagRegister::DataX_H as usize,
            // x = 100, z = 300, y = 200
            &[0x00, 0x64, 0x01, 0x2C, 0x00, 0xC8],
        );
        let mut device = Gy86::new(bus, Address::default()).unwrap();
        device.set_mag_offsets(MagOffsets::new(10, 20, 999));
        let (_, _, mag) = device.motion9().unwrap();
        assert_eq!(mag, (90, 180, 300));
    }

    #[test]
    fn heading_reads_field_through_configured_gain() {
        let mut bus = FakeBus::new();
        // Pure +X field.
        bus.store(
            HMC5883L_ADDRESS,
            MagRegister::DataX_H as usize,
            &[0x00, 0x64, 0x00, 0x00, 0x00, 0x00],
        );
        let mut device = Gy86::new(bus, Address::default()).unwrap();
        assert_eq!(device.heading().unwrap(), 0.0);

        device.set_declination_degrees(-4.28);
        let degrees = device.heading().unwrap();
        assert!((degrees - 355.72).abs() < 1e-3);
    }
}
