use std::collections::{HashMap, VecDeque};
use std::fs;

use ort::session::Session;
use ort::value::{TensorElementType, ValueType};
use serde::Deserialize;
use thiserror::Error;

use crate::types::{GestureEvent, GestureLabel, Sample, NUM_CHANNELS};

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("ONNX Runtime error: {0}")]
    OnnxError(#[from] ort::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid scaler size: expected {expected}, got {actual}")]
    InvalidScalerSize { expected: usize, actual: usize },

    #[error("Missing ONNX {kind}")]
    MissingIo { kind: &'static str },
}

#[derive(Debug, Deserialize)]
struct ClassesJson {
    index_to_class: HashMap<String, String>,
}

/// Parámetros de normalización precomputados en el entrenamiento.
/// Se cargan una vez al inicio; solo lectura durante la sesión.
#[derive(Debug, Clone, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f32>,
    pub scale: Vec<f32>,
}

impl ScalerParams {
    pub fn load(path: &str) -> Result<Self, ClassifierError> {
        let content = fs::read_to_string(path)?;
        let scaler: ScalerParams = serde_json::from_str(&content)?;
        if scaler.mean.len() != NUM_CHANNELS || scaler.scale.len() != NUM_CHANNELS {
            return Err(ClassifierError::InvalidScalerSize {
                expected: NUM_CHANNELS,
                actual: scaler.mean.len().min(scaler.scale.len()),
            });
        }
        Ok(scaler)
    }

    /// Estandariza los 6 canales de una muestra: (x - mean) / scale
    pub fn normalize(&self, channels: &[f32; NUM_CHANNELS]) -> [f32; NUM_CHANNELS] {
        let mut out = [0f32; NUM_CHANNELS];
        for (i, value) in channels.iter().enumerate() {
            out[i] = (value - self.mean[i]) / self.scale[i];
        }
        out
    }
}

/// Ventana deslizante de muestras normalizadas para la inferencia
#[derive(Debug)]
pub(crate) struct SampleWindow {
    frames: VecDeque<[f32; NUM_CHANNELS]>,
    size: usize,
}

impl SampleWindow {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(size),
            size,
        }
    }

    /// Añade un frame; si la ventana está llena, desliza descartando el más viejo
    pub(crate) fn push(&mut self, frame: [f32; NUM_CHANNELS]) {
        if self.frames.len() == self.size {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    pub(crate) fn is_full(&self) -> bool {
        self.frames.len() == self.size
    }

    pub(crate) fn clear(&mut self) {
        self.frames.clear();
    }

    /// Aplana la ventana a [t * 6 + canal] para el tensor de entrada
    pub(crate) fn flatten(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(self.size * NUM_CHANNELS);
        for frame in &self.frames {
            flat.extend_from_slice(frame);
        }
        flat
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }
}

/// Clasificador por modelo de secuencia: acumula una ventana de muestras
/// normalizadas y ejecuta inferencia ONNX cuando se llena.
pub struct ModelClassifier {
    session: Session,
    labels: Vec<String>,
    scaler: ScalerParams,
    window: SampleWindow,
    confidence: f32,
    input_name: String,
    prob_output_name: String,
}

impl ModelClassifier {
    pub fn new(
        model_path: &str,
        classes_path: &str,
        scaler_path: &str,
        window_size: usize,
        confidence: f32,
    ) -> Result<Self, ClassifierError> {
        let labels = Self::load_classes(classes_path)?;
        let scaler = ScalerParams::load(scaler_path)?;

        let session = Session::builder()?.commit_from_file(model_path)?;

        let input_name = session
            .inputs()
            .get(0)
            .map(|input| input.name().to_string())
            .ok_or(ClassifierError::MissingIo { kind: "input" })?;

        let prob_output_name = session
            .outputs()
            .iter()
            .find(|output| {
                matches!(
                    output.dtype(),
                    ValueType::Tensor {
                        ty: TensorElementType::Float32,
                        ..
                    }
                )
            })
            .or_else(|| session.outputs().get(0))
            .map(|output| output.name().to_string())
            .ok_or(ClassifierError::MissingIo { kind: "output" })?;

        println!("[ONNX] Modelo cargado: {}", model_path);
        println!("[ONNX] Clases: {:?}", labels);

        Ok(Self {
            session,
            labels,
            scaler,
            window: SampleWindow::new(window_size),
            confidence,
            input_name,
            prob_output_name,
        })
    }

    fn load_classes(path: &str) -> Result<Vec<String>, ClassifierError> {
        let content = fs::read_to_string(path)?;
        let data: ClassesJson = serde_json::from_str(&content)?;

        // Convertir HashMap a Vec ordenado por índice
        let mut pairs: Vec<(usize, String)> = data
            .index_to_class
            .into_iter()
            .filter_map(|(k, v)| k.parse::<usize>().ok().map(|idx| (idx, v)))
            .collect();

        pairs.sort_by_key(|(idx, _)| *idx);
        Ok(pairs.into_iter().map(|(_, name)| name).collect())
    }

    /// Desliza la ventana con la muestra y, si está llena, predice.
    /// Emite solo con confianza por encima del umbral; al emitir, la ventana
    /// se vacía (predicción no solapada) y la detección queda en pausa hasta
    /// el próximo llenado completo.
    pub fn classify(&mut self, sample: &Sample) -> Result<Option<GestureEvent>, ClassifierError> {
        self.window.push(self.scaler.normalize(&sample.channels()));

        if !self.window.is_full() {
            return Ok(None);
        }

        let (label_idx, confidence) = self.predict()?;
        if confidence <= self.confidence {
            // Sin emisión: la ventana sigue deslizando
            return Ok(None);
        }

        self.window.clear();

        let event = self
            .labels
            .get(label_idx)
            .and_then(|name| GestureLabel::parse(name))
            .map(|label| GestureEvent {
                label,
                magnitude: confidence,
                timestamp: sample.timestamp,
            });

        Ok(event)
    }

    /// Ejecuta la inferencia y devuelve (índice de clase, probabilidad máxima)
    fn predict(&mut self) -> Result<(usize, f32), ClassifierError> {
        let input_data = self.window.flatten();
        let shape_vec = vec![1_usize, self.window.len(), NUM_CHANNELS];

        let input_value = ort::value::Value::from_array((shape_vec, input_data))?;

        let outputs = self.session.run(ort::inputs![
            self.input_name.as_str() => &input_value,
        ])?;

        let (_prob_shape, prob_data) =
            outputs[self.prob_output_name.as_str()].try_extract_tensor::<f32>()?;

        let (label_idx, &confidence) = prob_data
            .iter()
            .enumerate()
            .take(self.labels.len())
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .ok_or(ClassifierError::MissingIo { kind: "output" })?;

        Ok((label_idx, confidence))
    }

    /// Etiquetas del vocabulario cargado
    pub fn get_labels(&self) -> &[String] {
        &self.labels
    }
}
