use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;

use crate::sensor::{SensorBus, SensorError, ACCEL_XOUT_H, GYRO_XOUT_H};

/// Carga filas crudas [ax, ay, az, gx, gy, gz] desde un CSV con encabezado
/// ax,ay,az,gx,gy,gz (cuentas del sensor, enteros con signo).
pub fn load_raw_rows(path: impl AsRef<Path>) -> Result<Vec<[i16; 6]>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record =
            result.with_context(|| format!("Fila {} inválida en {:?}", row_idx + 1, path))?;
        if record.len() < 6 {
            bail!("La fila {} no tiene 6 columnas", row_idx + 1);
        }

        let mut row = [0i16; 6];
        for (col, value) in row.iter_mut().enumerate() {
            *value = record[col]
                .trim()
                .parse()
                .with_context(|| format!("Valor inválido en fila {}", row_idx + 1))?;
        }
        rows.push(row);
    }

    if rows.is_empty() {
        bail!("El CSV {:?} no contiene datos", path);
    }

    Ok(rows)
}

/// Bus de reproducción: sirve filas grabadas como si fueran registros del
/// sensor. Avanza de fila al leerse el último registro del giroscopio.
pub struct ReplayBus {
    rows: Vec<[i16; 6]>,
    idx: usize,
}

impl ReplayBus {
    pub fn new(rows: Vec<[i16; 6]>) -> Self {
        Self { rows, idx: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.rows.len().saturating_sub(self.idx)
    }
}

impl SensorBus for ReplayBus {
    fn init(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn read_raw(&mut self, register: u8) -> Result<i16, SensorError> {
        let row = self.rows.get(self.idx).ok_or(SensorError::Exhausted)?;
        let value = match register {
            r if r == ACCEL_XOUT_H => row[0],
            r if r == ACCEL_XOUT_H + 2 => row[1],
            r if r == ACCEL_XOUT_H + 4 => row[2],
            r if r == GYRO_XOUT_H => row[3],
            r if r == GYRO_XOUT_H + 2 => row[4],
            r if r == GYRO_XOUT_H + 4 => row[5],
            _ => 0,
        };

        if register == GYRO_XOUT_H + 4 {
            self.idx += 1;
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SampleSource;
    use std::io::Write;

    fn write_temp_csv(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_raw_rows() {
        let path = write_temp_csv(
            "gestomando_replay_ok.csv",
            "ax,ay,az,gx,gy,gz\n1,2,3,4,5,6\n-1,-2,-3,-4,-5,-6\n",
        );

        let rows = load_raw_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], [1, 2, 3, 4, 5, 6]);
        assert_eq!(rows[1], [-1, -2, -3, -4, -5, -6]);
    }

    #[test]
    fn test_empty_csv_rejected() {
        let path = write_temp_csv("gestomando_replay_empty.csv", "ax,ay,az,gx,gy,gz\n");
        assert!(load_raw_rows(&path).is_err());
    }

    #[test]
    fn test_replay_bus_serves_rows_in_order() {
        let bus = ReplayBus::new(vec![[1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12]]);
        let mut source = SampleSource::new(bus).unwrap();

        let first = source.read().unwrap();
        assert_eq!(first.ax, 1);
        assert_eq!(first.gz, 6);

        let second = source.read().unwrap();
        assert_eq!(second.ax, 7);
        assert_eq!(second.gz, 12);

        assert!(matches!(source.read(), Err(SensorError::Exhausted)));
    }
}
