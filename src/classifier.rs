use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ClassifyError {
    #[error("Frecuencia inválida: {input} (debe ser un número no negativo)")]
    InvalidFrequency { input: String },
}

/// Las cinco categorías de severidad, en orden creciente
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub enum Classification {
    Negligible,
    Slow,
    Moderate,
    Rapid,
    TooExtreme,
}

impl Classification {
    /// Las cinco etiquetas en orden, para mostrarlas todas juntas
    pub fn all() -> [Classification; 5] {
        use Classification::*;
        [Negligible, Slow, Moderate, Rapid, TooExtreme]
    }

    /// Etiqueta visible al usuario, tal como aparece en pantalla
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Negligible => "Negligible",
            Classification::Slow => "Slow",
            Classification::Moderate => "Moderate",
            Classification::Rapid => "Rapid",
            Classification::TooExtreme => "Too extreme for app measurements",
        }
    }
}

/// Resultado de clasificar una frecuencia de movimiento.
/// Siempre se recalcula desde la frecuencia; nunca se persiste aparte.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ClassificationResult {
    pub classification: Classification,
    /// Contrapesos recomendados para el guante
    pub weights: &'static str,
    /// Mensaje de recomendación completo que ve el usuario
    pub message: &'static str,
}

/// Clasifica una frecuencia de movimiento (Hz) contra la tabla de umbrales.
///
/// Intervalos semiabiertos con el límite inferior incluido en la categoría
/// superior: [0,3) [3,5) [5,8) [8,12) [12,∞). Función pura: la misma
/// entrada produce siempre el mismo resultado, y tanto la ruta de datos de
/// la app como la de entrada manual pasan por aquí (una sola tabla).
pub fn classify(frequency: f32) -> Result<ClassificationResult, ClassifyError> {
    if !frequency.is_finite() || frequency < 0.0 {
        return Err(ClassifyError::InvalidFrequency {
            input: frequency.to_string(),
        });
    }

    let classification = if frequency < 3.0 {
        Classification::Negligible
    } else if frequency < 5.0 {
        Classification::Slow
    } else if frequency < 8.0 {
        Classification::Moderate
    } else if frequency < 12.0 {
        Classification::Rapid
    } else {
        Classification::TooExtreme
    };

    Ok(result_for(classification))
}

/// Interpreta una entrada manual del usuario ("7.5") como frecuencia.
/// Texto no numérico o valor negativo se rechazan sin mutar nada.
pub fn classify_manual_entry(input: &str) -> Result<(f32, ClassificationResult), ClassifyError> {
    let frequency: f32 = input
        .trim()
        .parse()
        .map_err(|_| ClassifyError::InvalidFrequency {
            input: input.to_string(),
        })?;

    let result = classify(frequency).map_err(|_| ClassifyError::InvalidFrequency {
        input: input.to_string(),
    })?;

    Ok((frequency, result))
}

fn result_for(classification: Classification) -> ClassificationResult {
    // Textos de la pantalla de clasificación, tal cual los ve el usuario
    let (weights, message) = match classification {
        Classification::Negligible => (
            "0 weights",
            "Based on your unique tremor measurement you should not add any weights to the Anti-Tremor Glove.",
        ),
        Classification::Slow => (
            "1-2 weights",
            "Based on your unique tremor measurement you should add 1-2 weights to the Anti-Tremor Glove.",
        ),
        Classification::Moderate => (
            "2-3 weights",
            "Based on your unique tremor measurement you should add 2-3 weights to the Anti-Tremor Glove.",
        ),
        Classification::Rapid => (
            "4-5 weights",
            "Based on your unique tremor measurement you should add 4-5 weights to the Anti-Tremor Glove.",
        ),
        Classification::TooExtreme => (
            "5 weights (if confirmed)",
            "Please ask a doctor if the Anti Tremor Glove is optimal for your tremor. If confirmed please add 5 weights to the Anti-Tremor Glove.",
        ),
    };

    ClassificationResult {
        classification,
        weights,
        message,
    }
}
