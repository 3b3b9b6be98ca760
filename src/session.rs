use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::calibration::CalibrationBias;
use crate::classifier::GestureClassifier;
use crate::connection::{ConnectionManager, Connector};
use crate::cooldown::CooldownPolicy;
use crate::indicator::StatusIndicator;
use crate::sensor::{SampleSource, SensorBus, SensorError};
use crate::telemetry::TelemetryUplink;

/// Una sesión completa de la tubería: fuente → calibración → clasificador
/// → cooldown → despacho → telemetría. Todo el estado mutable vive aquí,
/// nada es global al proceso.
pub struct Session<B: SensorBus, C: Connector, I: StatusIndicator> {
    source: SampleSource<B>,
    bias: CalibrationBias,
    classifier: GestureClassifier,
    cooldown: CooldownPolicy,
    connection: ConnectionManager<C, I>,
    uplink: Option<TelemetryUplink>,
    sample_interval: Duration,
}

impl<B: SensorBus, C: Connector, I: StatusIndicator> Session<B, C, I> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: SampleSource<B>,
        bias: CalibrationBias,
        classifier: GestureClassifier,
        cooldown: CooldownPolicy,
        connection: ConnectionManager<C, I>,
        uplink: Option<TelemetryUplink>,
        sample_interval: Duration,
    ) -> Self {
        Self {
            source,
            bias,
            classifier,
            cooldown,
            connection,
            uplink,
            sample_interval,
        }
    }

    /// Corre el lazo de muestreo hasta la cancelación o un fallo fatal del
    /// sensor. La limpieza (enlace cerrado, indicadores apagados) se
    /// ejecuta en toda salida, incluidas las rutas de error.
    pub fn run(&mut self, cancel: &AtomicBool) -> Result<(), SensorError> {
        self.connection.connect_current();

        let result = self.run_loop(cancel);
        self.connection.shutdown();
        result
    }

    fn run_loop(&mut self, cancel: &AtomicBool) -> Result<(), SensorError> {
        while !cancel.load(Ordering::Relaxed) {
            let raw = self.source.read()?;
            let sample = self.bias.apply(&raw);

            let mut emitted = None;
            match self.classifier.classify(&sample) {
                Ok(Some(event)) => {
                    if self.cooldown.admit(event.timestamp) {
                        println!(
                            "👋 Gesto detectado: {} (magnitud {:.2})",
                            event.label, event.magnitude
                        );
                        emitted = Some(event.label);
                        self.connection.dispatch(&event);
                    }
                }
                Ok(None) => {}
                Err(e) => eprintln!("❌ Error clasificando: {}", e),
            }

            if let Some(uplink) = self.uplink.as_mut() {
                uplink.report(&sample, emitted);
            }

            thread::sleep(self.sample_interval);
        }

        println!("\n👋 Saliendo...");
        Ok(())
    }
}
