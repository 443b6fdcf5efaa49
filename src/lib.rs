//! Temblómetro: núcleo de muestreo de movimiento y clasificación de temblor.
//!
//! Pipeline: una `SamplingSession` abre una ventana fija de 60 s sobre una
//! `SensorSource` (giroscopio + acelerómetro + actitud a 10 Hz), acumula
//! `MotionSample` en orden de llegada y al cierre entrega el buffer al
//! estimador de frecuencia. La frecuencia resultante (o la ingresada a mano)
//! pasa por `classifier::classify`, que la traduce a una de cinco categorías
//! con su recomendación de contrapesos para el guante anti-temblor. El
//! estado observable vive en `SessionViewModel`, inyectado a quien lo
//! consuma.

pub mod classifier;
pub mod csv_loader;
pub mod estimator;
pub mod sensor;
pub mod session;
pub mod types;
pub mod view_model;
