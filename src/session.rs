use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{after, bounded, select, tick, Receiver};
use thiserror::Error;

use crate::csv_loader::write_samples_to_csv;
use crate::estimator::{EstimatorError, PlaceholderEstimator};
use crate::sensor::{SensorError, SensorReading, SensorSource};
use crate::types::{MotionSample, SessionStatus, SAMPLE_INTERVAL_SECS, SESSION_DURATION_SECS};
use crate::view_model::SessionViewModel;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Sensores de movimiento no disponibles; la sesión no puede comenzar")]
    SensorUnavailable,

    #[error("Ya hay una sesión de muestreo activa sobre esta fuente")]
    SessionAlreadyActive,

    #[error("Error de la fuente de sensores: {0}")]
    Sensor(#[from] SensorError),
}

/// Parámetros de una sesión de muestreo. Los defaults son las constantes
/// fijas del sistema: ventana de 60 s con entrega a 10 Hz.
#[derive(Debug, Clone)]
pub struct SessionParams {
    /// Duración total de la ventana de observación (default: 60.0)
    pub duration_secs: f32,
    /// Intervalo de entrega de los sensores (default: 0.1)
    pub sample_interval_secs: f32,
    /// Frecuencia sustituta para el estimador placeholder (default: None)
    pub stand_in_frequency: Option<f32>,
    /// Directorio donde archivar el CSV de la sesión completada
    pub out_dir: Option<PathBuf>,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            duration_secs: SESSION_DURATION_SECS,
            sample_interval_secs: SAMPLE_INTERVAL_SECS,
            stand_in_frequency: None,
            out_dir: None,
        }
    }
}

/// Una ventana de recolección de datos, acotada y mutuamente excluyente.
///
/// Máquina de estados: Idle -> Running -> {Completed, Aborted}. Cada objeto
/// es de un solo uso: `begin` solo funciona desde Idle. La transición
/// terminal pasa por un único guard de estado, de modo que entre el cierre
/// automático por deadline y un `abort` concurrente exactamente uno gana y
/// el sensor se detiene exactamente una vez.
pub struct SamplingSession {
    params: SessionParams,
    source: Box<dyn SensorSource>,
    view_model: Arc<SessionViewModel>,
    status: SessionStatus,
    started_at: Option<Instant>,
    elapsed: f32,
    samples: Vec<MotionSample>,
    // Último valor conocido de cada modalidad no-acelerómetro
    current_rotation: Option<[f32; 3]>,
    current_attitude: Option<[f32; 3]>,
    rx: Option<Receiver<SensorReading>>,
    final_frequency: Option<f32>,
}

impl SamplingSession {
    pub fn new(source: Box<dyn SensorSource>, view_model: Arc<SessionViewModel>) -> Self {
        Self::with_params(source, view_model, SessionParams::default())
    }

    pub fn with_params(
        source: Box<dyn SensorSource>,
        view_model: Arc<SessionViewModel>,
        params: SessionParams,
    ) -> Self {
        Self {
            params,
            source,
            view_model,
            status: SessionStatus::Idle,
            started_at: None,
            elapsed: 0.0,
            samples: Vec::new(),
            current_rotation: None,
            current_attitude: None,
            rx: None,
            final_frequency: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn samples(&self) -> &[MotionSample] {
        &self.samples
    }

    /// Frecuencia publicada al completar; None hasta entonces
    pub fn final_frequency(&self) -> Option<f32> {
        self.final_frequency
    }

    /// Segundos restantes de la ventana (para el conteo regresivo)
    pub fn remaining_secs(&self) -> f32 {
        (self.params.duration_secs - self.elapsed).max(0.0)
    }

    /// Arranca la ventana de muestreo.
    ///
    /// Falla con `SensorUnavailable` si falta alguna de las tres modalidades
    /// (el estado queda en Idle, sin buffer) y con `SessionAlreadyActive` si
    /// esta sesión ya corrió o está corriendo (la sesión existente no se toca).
    pub fn begin(&mut self) -> Result<(), SessionError> {
        if self.status != SessionStatus::Idle {
            return Err(SessionError::SessionAlreadyActive);
        }
        if !self.source.check_availability() {
            return Err(SessionError::SensorUnavailable);
        }

        let (tx, rx) = bounded::<SensorReading>(256);
        self.source
            .start(Duration::from_secs_f32(self.params.sample_interval_secs), tx)?;

        self.view_model.reset();
        self.status = SessionStatus::Running;
        self.started_at = Some(Instant::now());
        self.elapsed = 0.0;
        self.rx = Some(rx);
        self.view_model.set_status(SessionStatus::Running);
        Ok(())
    }

    /// Aplica una lectura de sensor al estado de la sesión.
    ///
    /// Asimetría deliberada entre modalidades: giroscopio y actitud solo
    /// sobrescriben el "valor actual"; únicamente el tick del acelerómetro
    /// añade una muestra nueva al buffer, llevando consigo los últimos
    /// valores conocidos de las otras dos modalidades.
    pub fn push_reading(&mut self, reading: SensorReading) {
        if self.status != SessionStatus::Running {
            // Nada puede entrar al buffer una vez iniciada la parada
            return;
        }

        match reading {
            SensorReading::Gyroscope { x, y, z } => {
                self.current_rotation = Some([x, y, z]);
                self.view_model.set_gyroscope_readout(x, y, z);
            }
            SensorReading::Attitude { pitch, roll, yaw } => {
                self.current_attitude = Some([pitch, roll, yaw]);
                self.view_model.set_attitude_readout(pitch, roll, yaw);
            }
            SensorReading::Accelerometer { x, y, z } => {
                let elapsed = self
                    .started_at
                    .map(|t| t.elapsed())
                    .unwrap_or(Duration::ZERO);
                let mut sample = MotionSample::new(elapsed, [x, y, z]);
                sample.rotation_rate = self.current_rotation;
                sample.attitude = self.current_attitude;
                self.samples.push(sample);
            }
        }
    }

    /// Avanza el conteo regresivo. Solo alimenta la interfaz; la
    /// recolección de muestras no depende de este timer.
    pub fn tick(&mut self, dt_secs: f32) {
        if self.status != SessionStatus::Running {
            return;
        }
        self.elapsed += dt_secs;
        self.view_model.set_elapsed(Duration::from_secs_f32(self.elapsed));
    }

    /// Cierre automático al cumplirse la ventana: desuscribe, detiene el
    /// hardware, marca Completed y entrega el buffer al estimador. Pasa por
    /// el guard de estado, así que es idempotente y pierde limpiamente
    /// contra un `abort` que haya llegado antes.
    pub fn complete(&mut self) {
        if self.status != SessionStatus::Running {
            return;
        }
        self.status = SessionStatus::Completed;
        self.rx = None;
        self.source.stop();

        let estimator = match self.params.stand_in_frequency {
            Some(f) => PlaceholderEstimator::with_stand_in(f),
            None => PlaceholderEstimator::new(),
        };
        // Sin estimador real la frecuencia publicada queda en su valor
        // por defecto de 0.0
        let frequency = match estimator.estimate(&self.samples) {
            Ok(f) => f,
            Err(EstimatorError::EstimationUnavailable) => 0.0,
        };

        self.final_frequency = Some(frequency);
        self.view_model.set_final_frequency(frequency);
        self.view_model.set_tracking_completed(true);
        self.view_model.set_status(SessionStatus::Completed);

        self.archive_samples();
    }

    /// Cancelación manual: detiene el sensor y descarta el buffer parcial.
    /// Salida defensiva para no dejar el hardware encendido a mitad de
    /// ventana.
    pub fn abort(&mut self) {
        if self.status != SessionStatus::Running {
            return;
        }
        self.status = SessionStatus::Aborted;
        self.rx = None;
        self.source.stop();
        self.samples.clear();
        self.current_rotation = None;
        self.current_attitude = None;
        self.view_model.set_status(SessionStatus::Aborted);
    }

    /// Conduce la sesión hasta su cierre sobre el hilo actual: un solo
    /// bucle de eventos que multiplexa las lecturas del sensor, el tick de
    /// 0.1 s del conteo regresivo y el deadline de la ventana completa.
    pub fn run_to_completion(&mut self) -> Result<(), SessionError> {
        self.begin()?;

        let rx = self
            .rx
            .as_ref()
            .expect("begin() deja el canal listo")
            .clone();
        let interval = self.params.sample_interval_secs;
        let countdown = tick(Duration::from_secs_f32(interval));
        let deadline = after(Duration::from_secs_f32(self.params.duration_secs));

        loop {
            select! {
                recv(rx) -> msg => {
                    if let Ok(reading) = msg {
                        self.push_reading(reading);
                    }
                }
                recv(countdown) -> _ => {
                    self.tick(interval);
                }
                recv(deadline) -> _ => {
                    self.complete();
                    return Ok(());
                }
            }
        }
    }

    /// Escribe el CSV de archivo de la sesión completada
    fn archive_samples(&self) {
        let Some(out_dir) = self.params.out_dir.clone() else {
            return;
        };

        if let Err(e) = std::fs::create_dir_all(&out_dir) {
            eprintln!("❌ No se pudo crear el directorio {:?}: {}", out_dir, e);
            return;
        }

        // Índice correlativo entre corridas: una sesión archivada por archivo
        let idx = std::fs::read_dir(&out_dir)
            .map(|entries| entries.filter_map(|e| e.ok()).count())
            .unwrap_or(0);
        let filename = out_dir.join(format!("sesion_{:05}.csv", idx));

        if let Err(e) = write_samples_to_csv(&filename, &self.samples) {
            eprintln!("❌ Error escribiendo CSV {:?}: {}", filename, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::Sender;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fuente de prueba: no entrega nada por sí sola; los tests alimentan
    /// la sesión directamente con push_reading
    struct MockSensor {
        available: bool,
        stops: Arc<AtomicU32>,
    }

    impl MockSensor {
        fn available() -> (Self, Arc<AtomicU32>) {
            let stops = Arc::new(AtomicU32::new(0));
            (
                Self {
                    available: true,
                    stops: Arc::clone(&stops),
                },
                stops,
            )
        }

        fn unavailable() -> Self {
            Self {
                available: false,
                stops: Arc::new(AtomicU32::new(0)),
            }
        }
    }

    impl SensorSource for MockSensor {
        fn check_availability(&self) -> bool {
            self.available
        }

        fn start(
            &mut self,
            _interval: Duration,
            _tx: Sender<SensorReading>,
        ) -> Result<(), SensorError> {
            if !self.available {
                return Err(SensorError::Unavailable);
            }
            Ok(())
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::Relaxed);
        }

        fn stop_count(&self) -> u32 {
            self.stops.load(Ordering::Relaxed)
        }
    }

    fn running_session() -> (SamplingSession, Arc<AtomicU32>) {
        let (sensor, stops) = MockSensor::available();
        let vm = Arc::new(SessionViewModel::new());
        let mut session = SamplingSession::new(Box::new(sensor), vm);
        session.begin().unwrap();
        (session, stops)
    }

    fn accel(x: f32) -> SensorReading {
        SensorReading::Accelerometer { x, y: 0.0, z: 1.0 }
    }

    #[test]
    fn test_unavailable_sensor_keeps_session_idle() {
        let sensor = MockSensor::unavailable();
        let vm = Arc::new(SessionViewModel::new());
        let mut session = SamplingSession::new(Box::new(sensor), vm);

        let result = session.begin();
        assert!(matches!(result, Err(SessionError::SensorUnavailable)));
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.samples().is_empty());
    }

    #[test]
    fn test_second_begin_rejected_and_buffer_untouched() {
        let (mut session, _) = running_session();
        session.push_reading(accel(0.1));
        session.push_reading(accel(0.2));

        let result = session.begin();
        assert!(matches!(result, Err(SessionError::SessionAlreadyActive)));
        assert_eq!(session.status(), SessionStatus::Running);
        assert_eq!(session.samples().len(), 2);
    }

    #[test]
    fn test_accelerometer_appends_gyro_and_attitude_overwrite() {
        let (mut session, _) = running_session();

        // Giroscopio y actitud antes del primer tick de acelerómetro:
        // no añaden muestras, solo actualizan el valor actual
        session.push_reading(SensorReading::Gyroscope { x: 1.0, y: 2.0, z: 3.0 });
        session.push_reading(SensorReading::Attitude { pitch: 0.1, roll: 0.2, yaw: 0.3 });
        session.push_reading(SensorReading::Gyroscope { x: 4.0, y: 5.0, z: 6.0 });
        assert!(session.samples().is_empty());

        session.push_reading(accel(0.5));
        assert_eq!(session.samples().len(), 1);

        let sample = session.samples()[0];
        // La muestra lleva el último giroscopio, no el primero
        assert_eq!(sample.rotation_rate, Some([4.0, 5.0, 6.0]));
        assert_eq!(sample.attitude, Some([0.1, 0.2, 0.3]));
    }

    #[test]
    fn test_full_window_buffers_600_samples_in_order() {
        let (mut session, _) = running_session();

        for i in 0..600 {
            session.push_reading(accel(i as f32));
        }
        session.complete();

        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.samples().len(), 600);
        // Orden de llegada preservado
        for (i, sample) in session.samples().iter().enumerate() {
            assert_eq!(sample.accel[0], i as f32);
        }
    }

    #[test]
    fn test_no_sample_enters_after_stop_begins() {
        let (mut session, _) = running_session();
        session.push_reading(accel(1.0));
        session.complete();

        session.push_reading(accel(2.0));
        assert_eq!(session.samples().len(), 1);
    }

    #[test]
    fn test_complete_publishes_default_frequency_without_stand_in() {
        let (mut session, _) = running_session();
        session.push_reading(accel(1.0));
        session.complete();

        // EstimationUnavailable se traduce al 0.0 por defecto
        assert_eq!(session.final_frequency(), Some(0.0));
    }

    #[test]
    fn test_complete_publishes_stand_in_frequency() {
        let (sensor, _) = MockSensor::available();
        let vm = Arc::new(SessionViewModel::new());
        let mut session = SamplingSession::with_params(
            Box::new(sensor),
            Arc::clone(&vm),
            SessionParams {
                stand_in_frequency: Some(5.0),
                ..SessionParams::default()
            },
        );

        session.begin().unwrap();
        session.push_reading(accel(1.0));
        session.complete();

        assert_eq!(session.final_frequency(), Some(5.0));
        let snapshot = vm.snapshot();
        assert_eq!(snapshot.final_frequency, 5.0);
        assert!(snapshot.tracking_completed);
    }

    #[test]
    fn test_abort_discards_buffer_and_stops_sensor_once() {
        let (mut session, stops) = running_session();
        session.push_reading(accel(1.0));
        session.push_reading(accel(2.0));

        session.abort();
        assert_eq!(session.status(), SessionStatus::Aborted);
        assert!(session.samples().is_empty());
        assert_eq!(stops.load(Ordering::Relaxed), 1);

        // El cierre automático que llegue después pierde contra el guard:
        // ni cambia el estado ni vuelve a detener el sensor
        session.complete();
        assert_eq!(session.status(), SessionStatus::Aborted);
        assert_eq!(stops.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_complete_wins_over_late_abort() {
        let (mut session, stops) = running_session();
        session.complete();
        session.abort();

        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(stops.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_complete_is_idempotent() {
        let (mut session, stops) = running_session();
        session.complete();
        session.complete();

        assert_eq!(stops.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_tick_only_feeds_countdown() {
        let (mut session, _) = running_session();
        session.tick(0.1);
        session.tick(0.1);

        // El timer no recolecta muestras
        assert!(session.samples().is_empty());
        assert!((session.remaining_secs() - 59.8).abs() < 1e-3);
    }

    #[test]
    fn test_run_to_completion_with_simulated_sensor() {
        use crate::sensor::SimulatedSensor;

        let vm = Arc::new(SessionViewModel::new());
        let mut session = SamplingSession::with_params(
            Box::new(SimulatedSensor::new(4.0)),
            Arc::clone(&vm),
            SessionParams {
                // Ventana corta para el test; misma mecánica que los 60 s
                duration_secs: 0.3,
                sample_interval_secs: 0.01,
                stand_in_frequency: Some(5.0),
                out_dir: None,
            },
        );

        session.run_to_completion().unwrap();

        assert_eq!(session.status(), SessionStatus::Completed);
        assert!(!session.samples().is_empty());
        // Orden de llegada: elapsed no decrece
        for pair in session.samples().windows(2) {
            assert!(pair[1].elapsed >= pair[0].elapsed);
        }
        assert_eq!(vm.snapshot().final_frequency, 5.0);
        assert!(vm.snapshot().tracking_completed);
    }

    #[test]
    fn test_completed_session_archives_csv() {
        let out_dir = std::env::temp_dir().join("temblometro_test_archivo");
        let _ = std::fs::remove_dir_all(&out_dir);

        let (sensor, _) = MockSensor::available();
        let vm = Arc::new(SessionViewModel::new());
        let mut session = SamplingSession::with_params(
            Box::new(sensor),
            vm,
            SessionParams {
                out_dir: Some(out_dir.clone()),
                ..SessionParams::default()
            },
        );

        session.begin().unwrap();
        session.push_reading(accel(0.3));
        session.complete();

        let archived = out_dir.join("sesion_00000.csv");
        assert!(archived.exists());

        let loaded = crate::csv_loader::load_samples_from_csv(&archived).unwrap();
        assert_eq!(loaded.len(), 1);
        let _ = std::fs::remove_dir_all(&out_dir);
    }
}
