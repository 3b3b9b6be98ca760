use crate::config::StrategyConfig;
use crate::delta_classifier::ThresholdClassifier;
use crate::model_classifier::{ClassifierError, ModelClassifier};
use crate::types::{GestureEvent, Sample};

/// Las dos estrategias intercambiables detrás de un mismo contrato:
/// clasificar una muestra entrante y, opcionalmente, emitir un gesto.
pub enum GestureClassifier {
    Threshold(ThresholdClassifier),
    Model(ModelClassifier),
}

impl GestureClassifier {
    /// Construye la estrategia elegida en la configuración. Cargar el
    /// modelo puede fallar; el clasificador por umbral nunca.
    pub fn from_config(config: &StrategyConfig) -> Result<Self, ClassifierError> {
        match config {
            StrategyConfig::Threshold { threshold_g, .. } => {
                Ok(GestureClassifier::Threshold(ThresholdClassifier::new(
                    *threshold_g,
                )))
            }
            StrategyConfig::Model {
                model_path,
                classes_path,
                scaler_path,
                window_size,
                confidence,
                ..
            } => Ok(GestureClassifier::Model(ModelClassifier::new(
                model_path,
                classes_path,
                scaler_path,
                *window_size,
                *confidence,
            )?)),
        }
    }

    /// "Sin gesto" es el caso común; la emisión es la excepción
    pub fn classify(
        &mut self,
        sample: &Sample,
    ) -> Result<Option<GestureEvent>, ClassifierError> {
        match self {
            GestureClassifier::Threshold(classifier) => Ok(classifier.classify(sample)),
            GestureClassifier::Model(classifier) => classifier.classify(sample),
        }
    }
}
