use thiserror::Error;

use crate::types::MotionSample;

#[derive(Error, Debug, PartialEq)]
pub enum EstimatorError {
    #[error("Estimación de frecuencia no implementada (no hay valor sustituto configurado)")]
    EstimationUnavailable,
}

/// Estimador de frecuencia de movimiento.
///
/// ATENCIÓN: esto es un stub deliberado, no un análisis de señal. Todavía
/// no se calcula una frecuencia real a partir del buffer: el valor queda en
/// 0.0 salvo que la ruta "usar datos de la app" inyecte el sustituto fijo
/// de 5.0 Hz. Un estimador genuino sería de cruces por cero o pico
/// espectral sobre la magnitud de aceleración.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderEstimator {
    stand_in: Option<f32>,
}

impl PlaceholderEstimator {
    /// Estimador sin valor sustituto: `estimate` devuelve siempre
    /// `EstimationUnavailable` y la sesión publica 0.0 Hz
    pub fn new() -> Self {
        Self { stand_in: None }
    }

    /// Estimador con valor sustituto fijo (la ruta del checkbox de la app)
    pub fn with_stand_in(frequency: f32) -> Self {
        Self {
            stand_in: Some(frequency),
        }
    }

    /// Reduce el buffer de una sesión completada a una frecuencia escalar.
    /// El buffer se recibe para respetar el contrato, pero el stub no lo
    /// inspecciona; solo devuelve el sustituto configurado o el sentinela.
    pub fn estimate(&self, _samples: &[MotionSample]) -> Result<f32, EstimatorError> {
        match self.stand_in {
            Some(frequency) => Ok(frequency),
            None => Err(EstimatorError::EstimationUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::STAND_IN_FREQUENCY;
    use std::time::Duration;

    fn dummy_samples(n: usize) -> Vec<MotionSample> {
        (0..n)
            .map(|i| MotionSample::new(Duration::from_millis(i as u64 * 100), [0.1, 0.2, 1.0]))
            .collect()
    }

    #[test]
    fn test_without_stand_in_returns_sentinel() {
        let estimator = PlaceholderEstimator::new();
        let result = estimator.estimate(&dummy_samples(600));
        assert_eq!(result, Err(EstimatorError::EstimationUnavailable));
    }

    #[test]
    fn test_with_stand_in_returns_fixed_value() {
        let estimator = PlaceholderEstimator::with_stand_in(STAND_IN_FREQUENCY);
        assert_eq!(estimator.estimate(&dummy_samples(600)), Ok(5.0));
        // El contenido del buffer no influye en el stub
        assert_eq!(estimator.estimate(&[]), Ok(5.0));
    }
}
