use std::sync::Mutex;
use std::time::Duration;

use crate::types::SessionStatus;

/// Foto instantánea del estado observable, entregada a cada suscriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub status: SessionStatus,
    /// Lectura en vivo del giroscopio, formateada para pantalla
    pub gyroscope_readout: String,
    /// Lectura en vivo de la actitud, formateada para pantalla
    pub attitude_readout: String,
    /// Tiempo transcurrido de la sesión en curso
    pub elapsed: Duration,
    /// Frecuencia final de movimiento (0.0 hasta que termine una sesión)
    pub final_frequency: f32,
    pub tracking_completed: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            gyroscope_readout: String::new(),
            attitude_readout: String::new(),
            elapsed: Duration::ZERO,
            final_frequency: 0.0,
            tracking_completed: false,
        }
    }
}

type Subscriber = Box<dyn Fn(&Snapshot) + Send>;

/// Identificador devuelto por `subscribe`, para darse de baja después
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Estado observable de la sesión, compartido por inyección explícita
/// (`Arc<SessionViewModel>`), nunca como global ambiental.
///
/// Disciplina: un solo escritor (el hilo que conduce la sesión), muchos
/// lectores. Cada mutación notifica a todos los suscriptores con la foto
/// completa; los callbacks corren en el hilo escritor, sobre el mismo
/// contexto serial que recibe los sensores.
pub struct SessionViewModel {
    inner: Mutex<Inner>,
}

struct Inner {
    snapshot: Snapshot,
    subscribers: Vec<(u64, Subscriber)>,
    next_id: u64,
}

impl SessionViewModel {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                snapshot: Snapshot::default(),
                subscribers: Vec::new(),
                next_id: 0,
            }),
        }
    }

    /// Registra un callback que recibirá cada cambio de estado
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Snapshot) + Send + 'static,
    {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Box::new(callback)));
        SubscriptionId(id)
    }

    /// Da de baja una suscripción; ignora ids ya retirados
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.retain(|(sub_id, _)| *sub_id != id.0);
    }

    pub fn snapshot(&self) -> Snapshot {
        self.inner.lock().unwrap().snapshot.clone()
    }

    /// Vuelve todos los campos a su estado inicial (al arrancar una sesión
    /// nueva); los suscriptores se conservan
    pub fn reset(&self) {
        self.mutate(|snapshot| *snapshot = Snapshot::default());
    }

    pub fn set_status(&self, status: SessionStatus) {
        self.mutate(|snapshot| snapshot.status = status);
    }

    pub fn set_gyroscope_readout(&self, x: f32, y: f32, z: f32) {
        self.mutate(|snapshot| {
            snapshot.gyroscope_readout = format!("X: {}, Y: {}, Z: {}", x, y, z);
        });
    }

    pub fn set_attitude_readout(&self, pitch: f32, roll: f32, yaw: f32) {
        self.mutate(|snapshot| {
            snapshot.attitude_readout = format!("Pitch: {}, Roll: {}, Yaw: {}", pitch, roll, yaw);
        });
    }

    pub fn set_elapsed(&self, elapsed: Duration) {
        self.mutate(|snapshot| snapshot.elapsed = elapsed);
    }

    pub fn set_final_frequency(&self, frequency: f32) {
        self.mutate(|snapshot| snapshot.final_frequency = frequency);
    }

    pub fn set_tracking_completed(&self, completed: bool) {
        self.mutate(|snapshot| snapshot.tracking_completed = completed);
    }

    fn mutate<F: FnOnce(&mut Snapshot)>(&self, f: F) {
        let mut inner = self.inner.lock().unwrap();
        f(&mut inner.snapshot);
        let snapshot = inner.snapshot.clone();
        for (_, subscriber) in &inner.subscribers {
            subscriber(&snapshot);
        }
    }
}

impl Default for SessionViewModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_subscriber_sees_every_mutation() {
        let vm = SessionViewModel::new();
        let notifications = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notifications);

        vm.subscribe(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        vm.set_status(SessionStatus::Running);
        vm.set_final_frequency(5.0);
        vm.set_tracking_completed(true);

        assert_eq!(notifications.load(Ordering::Relaxed), 3);
        let snapshot = vm.snapshot();
        assert_eq!(snapshot.final_frequency, 5.0);
        assert!(snapshot.tracking_completed);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let vm = SessionViewModel::new();
        let notifications = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notifications);

        let id = vm.subscribe(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        vm.set_status(SessionStatus::Running);
        vm.unsubscribe(id);
        vm.set_status(SessionStatus::Completed);

        assert_eq!(notifications.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_reset_restores_defaults_but_keeps_subscribers() {
        let vm = SessionViewModel::new();
        let notifications = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notifications);
        vm.subscribe(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        vm.set_final_frequency(7.5);
        vm.set_tracking_completed(true);
        vm.reset();

        assert_eq!(vm.snapshot(), Snapshot::default());
        // set + set + reset = 3 notificaciones
        assert_eq!(notifications.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_readout_format_matches_display_contract() {
        let vm = SessionViewModel::new();
        vm.set_gyroscope_readout(0.5, -0.25, 1.0);
        assert_eq!(vm.snapshot().gyroscope_readout, "X: 0.5, Y: -0.25, Z: 1");
    }
}
