use std::time::Duration;

/// Duración fija de una sesión de muestreo (segundos)
pub const SESSION_DURATION_SECS: f32 = 60.0;

/// Intervalo de entrega de muestras de cada sensor (segundos) = 10 Hz
pub const SAMPLE_INTERVAL_SECS: f32 = 0.1;

/// Muestras de acelerómetro esperadas en una sesión completa (60 s a 10 Hz)
pub const EXPECTED_SAMPLES: usize = 600;

/// Frecuencia sustituta que inyecta la ruta "usar datos de la app"
/// mientras el estimador real no existe
pub const STAND_IN_FREQUENCY: f32 = 5.0;

/// Una muestra de movimiento capturada en un tick del acelerómetro.
/// Los campos de rotación y actitud llevan el último valor conocido
/// de giroscopio/actitud en el momento del tick (pueden no existir aún).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    /// Tiempo transcurrido desde el inicio de la sesión
    pub elapsed: Duration,

    /// Aceleración [ax, ay, az] en g
    pub accel: [f32; 3],

    /// Velocidad angular [rx, ry, rz] en rad/s (última lectura de giroscopio)
    pub rotation_rate: Option<[f32; 3]>,

    /// Actitud [pitch, roll, yaw] en rad (última lectura de device-motion)
    pub attitude: Option<[f32; 3]>,
}

impl MotionSample {
    /// Crea una muestra solo con aceleración
    pub fn new(elapsed: Duration, accel: [f32; 3]) -> Self {
        Self {
            elapsed,
            accel,
            rotation_rate: None,
            attitude: None,
        }
    }

    /// Magnitud de la aceleración en g
    pub fn accel_magnitude(&self) -> f32 {
        let [x, y, z] = self.accel;
        (x * x + y * y + z * z).sqrt()
    }
}

/// Estados de una sesión de muestreo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Sin sesión en curso
    Idle,
    /// Recolectando muestras
    Running,
    /// Ventana de 60 s cumplida, buffer entregado al estimador
    Completed,
    /// Cancelada: abort manual, buffer parcial descartado
    Aborted,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Aborted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accel_magnitude() {
        let sample = MotionSample::new(Duration::ZERO, [3.0, 0.0, 4.0]);
        assert_eq!(sample.accel_magnitude(), 5.0);
    }

    #[test]
    fn test_expected_samples_consistent_with_constants() {
        // 60 s a 10 Hz deben ser exactamente 600 muestras
        let expected = (SESSION_DURATION_SECS / SAMPLE_INTERVAL_SECS).round() as usize;
        assert_eq!(expected, EXPECTED_SAMPLES);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SessionStatus::Idle.is_terminal());
        assert!(!SessionStatus::Running.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Aborted.is_terminal());
    }
}
