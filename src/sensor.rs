use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use rand::Rng;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SensorError {
    #[error("Sensores de movimiento no disponibles (giroscopio/acelerómetro/actitud)")]
    Unavailable,

    #[error("La fuente de sensores ya está entregando datos")]
    AlreadyStarted,
}

/// Una lectura individual de una de las tres modalidades de sensor.
/// El acelerómetro es el que marca el paso: cada tick suyo produce una
/// muestra nueva en la sesión; giroscopio y actitud solo sobrescriben
/// el "valor actual" que la próxima muestra llevará consigo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorReading {
    Accelerometer { x: f32, y: f32, z: f32 },
    Gyroscope { x: f32, y: f32, z: f32 },
    Attitude { pitch: f32, roll: f32, yaw: f32 },
}

/// Fuente de sensores de movimiento.
///
/// Contrato: `check_availability` debe ser verdadero antes de `start`;
/// `start` enciende las tres modalidades y empuja lecturas por el canal
/// al intervalo pedido; `stop` es idempotente y seguro de llamar cuando
/// ya está detenida. El estado del hardware es global al proceso, así
/// que solo una sesión puede tener la fuente encendida a la vez (lo
/// garantiza la máquina de estados de la sesión, no un lock).
pub trait SensorSource: Send {
    /// Verdadero solo si giroscopio, acelerómetro y actitud están presentes
    fn check_availability(&self) -> bool;

    /// Comienza la entrega de lecturas al intervalo dado
    fn start(&mut self, interval: Duration, tx: Sender<SensorReading>) -> Result<(), SensorError>;

    /// Detiene las tres modalidades; no hace nada si ya está detenida
    fn stop(&mut self);

    /// Cuántas veces se ha ejecutado una detención efectiva (para verificar
    /// que la secuencia de parada corre exactamente una vez por sesión)
    fn stop_count(&self) -> u32;
}

/// Sensor simulado: genera un temblor sinusoidal con ruido a la frecuencia
/// configurada. Sirve como modo debug para ejercitar todo el pipeline sin
/// hardware de movimiento presente.
pub struct SimulatedSensor {
    available: bool,
    tremor_hz: f32,
    running: Option<RunningDelivery>,
    stops: u32,
}

struct RunningDelivery {
    stop_flag: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl SimulatedSensor {
    pub fn new(tremor_hz: f32) -> Self {
        Self {
            available: true,
            tremor_hz,
            running: None,
            stops: 0,
        }
    }

    /// Simula hardware ausente (sesión no debe arrancar)
    pub fn unavailable() -> Self {
        Self {
            available: false,
            tremor_hz: 0.0,
            running: None,
            stops: 0,
        }
    }
}

impl SensorSource for SimulatedSensor {
    fn check_availability(&self) -> bool {
        self.available
    }

    fn start(&mut self, interval: Duration, tx: Sender<SensorReading>) -> Result<(), SensorError> {
        if !self.available {
            return Err(SensorError::Unavailable);
        }
        if self.running.is_some() {
            return Err(SensorError::AlreadyStarted);
        }

        let stop_flag = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop_flag);
        let tremor_hz = self.tremor_hz;

        // Hilo de entrega: en cada tick emite giroscopio, actitud y
        // acelerómetro, en ese orden, igual que las tres suscripciones
        // del hardware real sobre el mismo contexto serial
        let handle = std::thread::spawn(move || {
            let started = Instant::now();
            let mut rng = rand::thread_rng();

            loop {
                if flag.load(Ordering::Relaxed) {
                    break;
                }

                let t = started.elapsed().as_secs_f32();
                let phase = TAU * tremor_hz * t;
                let mut noise = || rng.gen_range(-0.02..0.02f32);

                let gyro = SensorReading::Gyroscope {
                    x: phase.cos() * 0.8,
                    y: phase.sin() * 0.5,
                    z: (phase * 0.5).sin() * 0.3,
                };
                let attitude = SensorReading::Attitude {
                    pitch: phase.sin() * 0.1,
                    roll: phase.cos() * 0.1,
                    yaw: 0.0,
                };
                let accel = SensorReading::Accelerometer {
                    x: phase.sin() * 0.4 + noise(),
                    y: phase.cos() * 0.3 + noise(),
                    z: 1.0 + (phase * 2.0).sin() * 0.1 + noise(),
                };

                if tx.send(gyro).is_err()
                    || tx.send(attitude).is_err()
                    || tx.send(accel).is_err()
                {
                    // Receptor caído: la sesión terminó sin avisarnos
                    break;
                }

                std::thread::sleep(interval);
            }
        });

        self.running = Some(RunningDelivery { stop_flag, handle });
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(delivery) = self.running.take() {
            delivery.stop_flag.store(true, Ordering::Relaxed);
            let _ = delivery.handle.join();
            self.stops += 1;
        }
    }

    fn stop_count(&self) -> u32 {
        self.stops
    }
}

impl Drop for SimulatedSensor {
    fn drop(&mut self) {
        self.stop();
    }
}
