/// Salida booleana por objetivo configurado (los LEDs del hardware
/// original). Se enciende exactamente al conectar y se apaga exactamente
/// al desconectar, al cambiar de objetivo o al apagar.
pub trait StatusIndicator {
    fn set(&mut self, target_idx: usize, on: bool);

    /// Apaga todos los indicadores; parte del contrato de limpieza al salir
    fn all_off(&mut self, num_targets: usize) {
        for idx in 0..num_targets {
            self.set(idx, false);
        }
    }
}

/// Indicador por consola para correr sin hardware de LEDs
pub struct ConsoleIndicator;

impl StatusIndicator for ConsoleIndicator {
    fn set(&mut self, target_idx: usize, on: bool) {
        if on {
            println!("💡 Indicador {} ON", target_idx + 1);
        } else {
            println!("💡 Indicador {} OFF", target_idx + 1);
        }
    }
}
