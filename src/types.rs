use std::fmt;
use std::time::Instant;

/// Escala del acelerómetro en modo ±2g (cuentas por g)
pub const ACCEL_SCALE: f32 = 16384.0;
/// Escala del giroscopio en modo ±250°/s (cuentas por grado/segundo)
pub const GYRO_SCALE: f32 = 131.0;
/// Offset de gravedad en cuentas crudas sobre el eje vertical
pub const GRAVITY_COUNTS: f32 = 16384.0;

/// Número de canales por muestra: ax, ay, az, gx, gy, gz
pub const NUM_CHANNELS: usize = 6;

/// Muestra cruda de 6 ejes tal como sale de los registros del sensor
#[derive(Debug, Clone, Copy)]
pub struct RawSample {
    pub ax: i16,
    pub ay: i16,
    pub az: i16,
    pub gx: i16,
    pub gy: i16,
    pub gz: i16,
    pub timestamp: Instant,
}

/// Muestra calibrada en unidades físicas (g y °/s)
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
    pub gx: f32,
    pub gy: f32,
    pub gz: f32,
    pub timestamp: Instant,
}

impl Sample {
    /// Canales en el orden fijo [ax, ay, az, gx, gy, gz]
    pub fn channels(&self) -> [f32; NUM_CHANNELS] {
        [self.ax, self.ay, self.az, self.gx, self.gy, self.gz]
    }
}

/// Vocabulario fijo de gestos reconocidos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureLabel {
    Left,
    Right,
    Up,
    Down,
    Switch,
}

impl GestureLabel {
    /// Nombre canónico del gesto en el protocolo de red
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureLabel::Left => "left",
            GestureLabel::Right => "right",
            GestureLabel::Up => "up",
            GestureLabel::Down => "down",
            GestureLabel::Switch => "switch",
        }
    }

    /// Conversión string → enum para las clases del modelo
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "left" => Some(GestureLabel::Left),
            "right" => Some(GestureLabel::Right),
            "up" => Some(GestureLabel::Up),
            "down" => Some(GestureLabel::Down),
            "switch" => Some(GestureLabel::Switch),
            _ => None,
        }
    }

    /// true para gestos que se envían al objetivo actual
    pub fn is_directional(&self) -> bool {
        !matches!(self, GestureLabel::Switch)
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gesto detectado por el clasificador
#[derive(Debug, Clone, Copy)]
pub struct GestureEvent {
    pub label: GestureLabel,
    pub magnitude: f32,
    pub timestamp: Instant,
}
