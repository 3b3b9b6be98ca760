/*
Gestomando - Control de objetivos remotos por gestos

Lee un sensor de movimiento de 6 ejes por I2C, clasifica gestos cortos
(up/down/left/right/switch) y los despacha por WebSocket al objetivo
actual de una lista rotativa, reportando telemetría a un colector HTTP.

Para compilar y ejecutar:
    ./target/release/gestomando gestomando.json

El archivo de configuración elige la estrategia de detección (umbral o
modelo ONNX), los objetivos y el colector. Ctrl+C termina con limpieza:
enlace cerrado e indicadores apagados.
*/

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use gestomando::calibration::calibrate;
use gestomando::classifier::GestureClassifier;
use gestomando::config::Config;
use gestomando::connection::{ConnectionManager, WsConnector};
use gestomando::cooldown::CooldownPolicy;
use gestomando::indicator::ConsoleIndicator;
use gestomando::sensor::{I2cSensorBus, SampleSource};
use gestomando::session::Session;
use gestomando::telemetry::{spawn_collector_worker, TelemetryUplink};

const DEFAULT_CONFIG_PATH: &str = "gestomando.json";

fn main() -> Result<()> {
    println!("🎯 Gestomando - Gestos → Objetivos Remotos\n");

    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    // Errores de forma (lista de objetivos vacía, JSON inválido) se
    // reportan una vez y no se arranca
    let config = Config::load(&config_path)
        .with_context(|| format!("Configuración inválida en {}", config_path))?;
    println!("⚙️  Configuración cargada desde {}", config_path);
    println!("🎯 Objetivos: {}", config.targets.len());

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_handler = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        cancel_handler.store(true, Ordering::SeqCst);
    })
    .context("No se pudo instalar el manejador de Ctrl+C")?;

    // Sensor: su fallo es fatal, sin datos no hay nada que hacer
    let bus = I2cSensorBus::open(&config.i2c_device)
        .with_context(|| format!("No se pudo abrir el bus {}", config.i2c_device))?;
    let mut source = SampleSource::new(bus).context("No se pudo inicializar el sensor")?;
    println!("✅ Sensor inicializado en {}", config.i2c_device);

    println!(
        "🧭 Calibrando con {} muestras... mantener el sensor inmóvil",
        config.calibration_samples
    );
    let bias = calibrate(&mut source, config.calibration_samples)
        .context("Fallo leyendo muestras de calibración")?;
    println!("✅ Calibración completa");

    let classifier = GestureClassifier::from_config(&config.detector)
        .context("No se pudo construir el clasificador")?;
    let cooldown = CooldownPolicy::new(Duration::from_secs_f32(
        config.detector.cooldown_secs(),
    ));

    // Telemetría opcional: sin colector configurado no se reporta nada
    let (uplink, side_channel) = match &config.collector_url {
        Some(url) => {
            let tx = spawn_collector_worker(url.clone());
            println!("📡 Telemetría hacia {}", url);
            let uplink = TelemetryUplink::new(
                tx,
                Duration::from_secs_f32(config.telemetry_interval_secs),
            );
            let side_channel = uplink.side_channel();
            (Some(uplink), Some(side_channel))
        }
        None => (None, None),
    };

    let connection = ConnectionManager::new(
        WsConnector,
        ConsoleIndicator,
        config.targets(),
        side_channel,
    )
    .context("Lista de objetivos inválida")?;

    let mut session = Session::new(
        source,
        bias,
        classifier,
        cooldown,
        connection,
        uplink,
        Duration::from_millis(config.sample_interval_ms),
    );

    println!("🎬 Iniciando detección de gestos... (Ctrl+C para salir)\n");
    session
        .run(&cancel)
        .context("Fallo fatal del sensor durante la sesión")?;

    Ok(())
}
