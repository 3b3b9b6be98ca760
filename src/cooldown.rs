use std::time::{Duration, Instant};

/// Ventana refractaria entre emisiones de gestos admitidas.
/// Los rechazos se descartan en silencio: ni cola ni reintentos.
#[derive(Debug)]
pub struct CooldownPolicy {
    cooldown: Duration,
    last_emit: Option<Instant>,
}

impl CooldownPolicy {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_emit: None,
        }
    }

    /// Admite el evento solo si pasó más de `cooldown` desde la última
    /// admisión. Al admitir, actualiza el instante de última emisión.
    pub fn admit(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_emit {
            if now.duration_since(last) <= self.cooldown {
                return false;
            }
        }
        self.last_emit = Some(now);
        true
    }
}
