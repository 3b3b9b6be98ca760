use crate::types::{GestureEvent, GestureLabel, Sample};

/// Clasificador por delta de aceleración entre muestras consecutivas.
/// Sin estado salvo los valores previos de los ejes horizontal y vertical.
#[derive(Debug)]
pub struct ThresholdClassifier {
    threshold: f32,
    prev_x: f32,
    prev_z: f32,
}

impl ThresholdClassifier {
    /// `threshold` en g; un candidato dispara cuando |delta| > 2·threshold
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            prev_x: 0.0,
            // Inicializado a 1.0: en reposo el eje vertical lee +1g
            prev_z: 1.0,
        }
    }

    pub fn classify(&mut self, sample: &Sample) -> Option<GestureEvent> {
        let delta_x = self.prev_x - sample.ax;
        let delta_z = self.prev_z - sample.az;

        // Los previos se actualizan en cada llamada, dispare o no
        self.prev_x = sample.ax;
        self.prev_z = sample.az;

        let limit = 2.0 * self.threshold;
        let mut candidates: Vec<(GestureLabel, f32)> = Vec::with_capacity(4);

        if delta_x > limit {
            candidates.push((GestureLabel::Left, delta_x));
        }
        if delta_x < -limit {
            candidates.push((GestureLabel::Right, -delta_x));
        }
        if delta_z > limit {
            candidates.push((GestureLabel::Up, delta_z));
        }
        if delta_z < -limit {
            candidates.push((GestureLabel::Down, -delta_z));
        }

        // Gana la mayor magnitud; en empate, el primero en el orden
        // left, right, up, down
        let mut best: Option<(GestureLabel, f32)> = None;
        for (label, magnitude) in candidates {
            match best {
                Some((_, current)) if magnitude <= current => {}
                _ => best = Some((label, magnitude)),
            }
        }

        best.map(|(label, magnitude)| GestureEvent {
            label,
            magnitude,
            timestamp: sample.timestamp,
        })
    }
}
