use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Sender};

use crate::types::{GestureLabel, Sample};

/// Capacidad del canal hacia el hilo del colector; si se llena, los
/// reportes se descartan (el más reciente gana, nunca se encola atrás)
const COLLECTOR_QUEUE: usize = 8;

/// Timeout de cada POST al colector
const COLLECTOR_TIMEOUT: Duration = Duration::from_secs(2);

/// Evento saliente hacia el colector de monitoreo
#[derive(Debug, Clone, PartialEq)]
pub enum CollectorEvent {
    /// Lectura cruda + último gesto (cadena vacía si no hubo)
    Sensor {
        ax: f32,
        ay: f32,
        az: f32,
        label: String,
    },
    /// Notificación de rotación de objetivo
    Switch,
}

/// Uplink de telemetría con límite de tasa. Nunca bloquea el lazo de
/// muestreo: el envío real ocurre en el hilo del colector y los fallos
/// se registran y descartan.
pub struct TelemetryUplink {
    tx: Sender<CollectorEvent>,
    interval: Duration,
    last_send: Option<Instant>,
}

impl TelemetryUplink {
    pub fn new(tx: Sender<CollectorEvent>, interval: Duration) -> Self {
        Self {
            tx,
            interval,
            last_send: None,
        }
    }

    /// Reporta la muestra y el último gesto. Las llamadas dentro del
    /// intervalo mínimo se descartan, no se encolan.
    pub fn report(&mut self, sample: &Sample, label: Option<GestureLabel>) {
        let now = sample.timestamp;
        if let Some(last) = self.last_send {
            if now.duration_since(last) < self.interval {
                return;
            }
        }

        let event = CollectorEvent::Sensor {
            ax: sample.ax,
            ay: sample.ay,
            az: sample.az,
            label: label.map(|l| l.as_str().to_string()).unwrap_or_default(),
        };

        // Canal lleno: el colector va atrasado, se descarta sin reintentar
        if self.tx.try_send(event).is_ok() {
            self.last_send = Some(now);
        }
    }

    /// Canal lateral para notificar rotaciones de objetivo
    pub fn side_channel(&self) -> Sender<CollectorEvent> {
        self.tx.clone()
    }
}

/// Lanza el hilo que drena eventos hacia el colector HTTP.
/// Todo fallo de red se registra y descarta; nunca se reintenta.
pub fn spawn_collector_worker(base_url: String) -> Sender<CollectorEvent> {
    let (tx, rx) = bounded::<CollectorEvent>(COLLECTOR_QUEUE);

    std::thread::spawn(move || {
        let client = match reqwest::blocking::Client::builder()
            .timeout(COLLECTOR_TIMEOUT)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                eprintln!("❌ No se pudo crear el cliente HTTP del colector: {}", e);
                return;
            }
        };

        while let Ok(event) = rx.recv() {
            let result = match &event {
                CollectorEvent::Sensor { ax, ay, az, label } => client
                    .post(format!("{}/sensor", base_url))
                    .json(&serde_json::json!({
                        "ax": ax,
                        "ay": ay,
                        "az": az,
                        "label": label,
                    }))
                    .send(),
                CollectorEvent::Switch => {
                    client.post(format!("{}/switch_device", base_url)).send()
                }
            };

            if let Err(e) = result {
                eprintln!("⚠️  Colector inaccesible: {}", e);
            }
        }
    });

    tx
}
