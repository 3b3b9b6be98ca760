use std::time::Instant;

use i2cdev::core::I2CDevice;
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
use thiserror::Error;

use crate::types::RawSample;

/// Dirección I2C del sensor de movimiento (MPU-6050)
pub const DEVICE_ADDRESS: u16 = 0x68;
/// Registro de gestión de energía
pub const PWR_MGMT_1: u8 = 0x6B;
/// Base del bloque de aceleración (3 registros de eje consecutivos)
pub const ACCEL_XOUT_H: u8 = 0x3B;
/// Base del bloque de velocidad angular (3 registros de eje consecutivos)
pub const GYRO_XOUT_H: u8 = 0x43;

#[derive(Error, Debug)]
pub enum SensorError {
    #[error("I2C bus error: {0}")]
    Bus(#[from] LinuxI2CError),

    #[error("Replay data exhausted")]
    Exhausted,
}

/// Interfaz mínima sobre el sensor: pares de registros crudos de 16 bits
/// en complemento a dos.
pub trait SensorBus {
    fn init(&mut self) -> Result<(), SensorError>;
    fn read_raw(&mut self, register: u8) -> Result<i16, SensorError>;
}

/// Combina el par de registros high/low en un entero con signo
pub(crate) fn combine_register_pair(high: u8, low: u8) -> i16 {
    (((high as u16) << 8) | low as u16) as i16
}

/// Acceso real al sensor vía /dev/i2c-*
pub struct I2cSensorBus {
    dev: LinuxI2CDevice,
}

impl I2cSensorBus {
    pub fn open(path: &str) -> Result<Self, SensorError> {
        let dev = LinuxI2CDevice::new(path, DEVICE_ADDRESS)?;
        Ok(Self { dev })
    }
}

impl SensorBus for I2cSensorBus {
    fn init(&mut self) -> Result<(), SensorError> {
        // Sacar al sensor del modo sleep
        self.dev.smbus_write_byte_data(PWR_MGMT_1, 0)?;
        Ok(())
    }

    fn read_raw(&mut self, register: u8) -> Result<i16, SensorError> {
        let high = self.dev.smbus_read_byte_data(register)?;
        let low = self.dev.smbus_read_byte_data(register + 1)?;
        Ok(combine_register_pair(high, low))
    }
}

/// Adaptador fino sobre el bus: produce una muestra cruda de 6 ejes por lectura
pub struct SampleSource<B: SensorBus> {
    bus: B,
}

impl<B: SensorBus> SampleSource<B> {
    /// Inicializa el sensor y deja la fuente lista para leer
    pub fn new(mut bus: B) -> Result<Self, SensorError> {
        bus.init()?;
        Ok(Self { bus })
    }

    /// Lee los 6 ejes en orden fijo y sella la muestra con un timestamp monotónico
    pub fn read(&mut self) -> Result<RawSample, SensorError> {
        let ax = self.bus.read_raw(ACCEL_XOUT_H)?;
        let ay = self.bus.read_raw(ACCEL_XOUT_H + 2)?;
        let az = self.bus.read_raw(ACCEL_XOUT_H + 4)?;
        let gx = self.bus.read_raw(GYRO_XOUT_H)?;
        let gy = self.bus.read_raw(GYRO_XOUT_H + 2)?;
        let gz = self.bus.read_raw(GYRO_XOUT_H + 4)?;

        Ok(RawSample {
            ax,
            ay,
            az,
            gx,
            gy,
            gz,
            timestamp: Instant::now(),
        })
    }
}
