use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};

use gestomando::calibration::calibrate;
use gestomando::delta_classifier::ThresholdClassifier;
use gestomando::replay::{load_raw_rows, ReplayBus};
use gestomando::sensor::{SampleSource, SensorError};

struct ReplayOptions {
    threshold: f32,
    calibration_rows: usize,
}

fn parse_args() -> Result<(PathBuf, ReplayOptions)> {
    let mut threshold = 1.0f32;
    let mut calibration_rows = 100usize;
    let mut csv_path: Option<PathBuf> = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--threshold" => {
                threshold = args
                    .next()
                    .ok_or_else(|| anyhow!("--threshold requiere un valor"))?
                    .parse()?;
            }
            "--calibration" => {
                calibration_rows = args
                    .next()
                    .ok_or_else(|| anyhow!("--calibration requiere un valor"))?
                    .parse()?;
            }
            _ => {
                if csv_path.is_some() {
                    bail!("Uso: replay_csv [--threshold <g>] [--calibration <n>] <archivo.csv>");
                }
                csv_path = Some(PathBuf::from(arg));
            }
        }
    }

    let csv_path = csv_path.ok_or_else(|| anyhow!("Debes especificar un archivo CSV"))?;
    Ok((
        csv_path,
        ReplayOptions {
            threshold,
            calibration_rows,
        },
    ))
}

fn main() -> Result<()> {
    let (csv_path, opts) = parse_args()?;
    println!("🎞️  Reproduciendo muestras desde {:?}", csv_path);

    let rows = load_raw_rows(&csv_path)?;
    if rows.len() <= opts.calibration_rows {
        bail!(
            "El CSV tiene {} filas; se necesitan más de {} para calibrar",
            rows.len(),
            opts.calibration_rows
        );
    }

    let mut source = SampleSource::new(ReplayBus::new(rows))?;

    // Las primeras filas deben ser estacionarias: son la ráfaga de calibración
    let bias = calibrate(&mut source, opts.calibration_rows)?;
    println!(
        "✅ Calibrado con {} filas (bias az = {:.1} cuentas)",
        opts.calibration_rows, bias.accel[2]
    );

    // Sin cooldown: la reproducción corre más rápido que el tiempo real y
    // una ventana refractaria de reloj suprimiría todo tras el primer gesto
    let mut classifier = ThresholdClassifier::new(opts.threshold);
    let mut detections = 0u32;
    let mut processed = 0u32;

    loop {
        let raw = match source.read() {
            Ok(raw) => raw,
            Err(SensorError::Exhausted) => break,
            Err(e) => return Err(e.into()),
        };

        processed += 1;
        let sample = bias.apply(&raw);

        if let Some(event) = classifier.classify(&sample) {
            detections += 1;
            println!(
                "👋 [{:05}] {} (magnitud {:.2})",
                processed, event.label, event.magnitude
            );
        }
    }

    println!(
        "\n📊 {} filas procesadas, {} gestos detectados",
        processed, detections
    );

    Ok(())
}
