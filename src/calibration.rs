use std::thread;
use std::time::Duration;

use crate::sensor::{SampleSource, SensorBus, SensorError};
use crate::types::{RawSample, Sample, ACCEL_SCALE, GRAVITY_COUNTS, GYRO_SCALE};

/// Intervalo fijo entre lecturas durante la ráfaga de calibración
const CALIBRATION_INTERVAL: Duration = Duration::from_millis(1);

/// Offsets estacionarios por eje, en cuentas crudas.
/// Se calcula una sola vez por sesión y es de solo lectura después.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationBias {
    pub accel: [f32; 3],
    pub gyro: [f32; 3],
}

impl CalibrationBias {
    /// Resta los offsets y convierte a unidades físicas (g y °/s)
    pub fn apply(&self, raw: &RawSample) -> Sample {
        Sample {
            ax: (raw.ax as f32 - self.accel[0]) / ACCEL_SCALE,
            ay: (raw.ay as f32 - self.accel[1]) / ACCEL_SCALE,
            az: (raw.az as f32 - self.accel[2]) / ACCEL_SCALE,
            gx: (raw.gx as f32 - self.gyro[0]) / GYRO_SCALE,
            gy: (raw.gy as f32 - self.gyro[1]) / GYRO_SCALE,
            gz: (raw.gz as f32 - self.gyro[2]) / GYRO_SCALE,
            timestamp: raw.timestamp,
        }
    }
}

/// Estima el bias por eje promediando `num_samples` lecturas con el sensor
/// inmóvil. No se valida la inmovilidad: si se viola, la detección deriva
/// en silencio. El eje Z del acelerómetro se corrige por la gravedad (+1g).
pub fn calibrate<B: SensorBus>(
    source: &mut SampleSource<B>,
    num_samples: usize,
) -> Result<CalibrationBias, SensorError> {
    let mut accel_sum = [0f64; 3];
    let mut gyro_sum = [0f64; 3];

    for _ in 0..num_samples {
        let raw = source.read()?;

        accel_sum[0] += raw.ax as f64;
        accel_sum[1] += raw.ay as f64;
        accel_sum[2] += raw.az as f64;
        gyro_sum[0] += raw.gx as f64;
        gyro_sum[1] += raw.gy as f64;
        gyro_sum[2] += raw.gz as f64;

        thread::sleep(CALIBRATION_INTERVAL);
    }

    let n = num_samples as f64;
    let mut accel = [0f32; 3];
    let mut gyro = [0f32; 3];
    for axis in 0..3 {
        accel[axis] = (accel_sum[axis] / n) as f32;
        gyro[axis] = (gyro_sum[axis] / n) as f32;
    }

    // Quitar el offset de gravedad del eje vertical
    accel[2] -= GRAVITY_COUNTS;

    Ok(CalibrationBias { accel, gyro })
}
