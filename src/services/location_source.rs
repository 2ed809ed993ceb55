//! Fuentes de ubicación continua
//!
//! Una `LocationSource` entrega una secuencia perezosa, infinita y
//! reiniciable de muestras (o errores) a través de un `LocationWatch`.
//! Detener el watch garantiza que ninguna muestra pendiente se observe después.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::map::RouteOverlay;
use crate::models::location::{Coordinates, LocationSample};
use crate::utils::errors::{AppError, AppResult};

/// Evento producido por una fuente de ubicación
pub type LocationEvent = Result<LocationSample, AppError>;

/// Opciones de geolocalización
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    pub high_accuracy: bool,
    /// Antigüedad máxima aceptada para una posición en caché
    pub max_cache_age: Duration,
    pub timeout: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            max_cache_age: Duration::ZERO,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Capacidad de geolocalización continua
pub trait LocationSource: Send {
    /// Iniciar una suscripción. Falla con `UnsupportedEnvironment` si no hay capacidad.
    fn start_watching(&mut self, options: &WatchOptions) -> AppResult<LocationWatch>;
}

/// Suscripción activa a una fuente de ubicación
pub struct LocationWatch {
    receiver: mpsc::UnboundedReceiver<LocationEvent>,
    cancelled: Arc<AtomicBool>,
    options: WatchOptions,
    started_at: DateTime<Utc>,
    finished: bool,
}

impl LocationWatch {
    /// Crear un watch junto con el extremo emisor que usa la fuente
    pub fn channel(options: &WatchOptions) -> (LocationWatch, WatchSender) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancelled = Arc::new(AtomicBool::new(false));

        let watch = LocationWatch {
            receiver,
            cancelled: cancelled.clone(),
            options: *options,
            started_at: Utc::now(),
            finished: false,
        };

        (watch, WatchSender { sender, cancelled })
    }

    /// Siguiente muestra o error. `None` cuando la suscripción terminó o se detuvo.
    ///
    /// Sin muestra dentro de `timeout` produce un `Timeout` terminal; los errores
    /// de la fuente también son terminales.
    pub async fn next(&mut self) -> Option<LocationEvent> {
        loop {
            if self.finished || self.is_stopped() {
                return None;
            }

            let event = match tokio::time::timeout(self.options.timeout, self.receiver.recv()).await {
                Ok(Some(event)) => event,
                Ok(None) => {
                    self.finished = true;
                    return None;
                }
                Err(_) => {
                    self.finished = true;
                    let ms = self.options.timeout.as_millis() as u64;
                    log::warn!("⏱️ Sin posición en {} ms", ms);
                    return Some(Err(AppError::Timeout(ms)));
                }
            };

            // La muestra pudo encolarse antes de la cancelación
            if self.is_stopped() {
                return None;
            }

            match event {
                Ok(sample) if self.is_stale(&sample) => {
                    log::debug!("🗑️ Muestra en caché descartada ({})", sample.captured_at);
                    continue;
                }
                Ok(sample) => return Some(Ok(sample)),
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }

    /// Cancelar la suscripción
    pub fn stop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.receiver.close();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    fn is_stale(&self, sample: &LocationSample) -> bool {
        let max_age = ChronoDuration::from_std(self.options.max_cache_age).unwrap_or(ChronoDuration::zero());
        sample.captured_at < self.started_at - max_age
    }
}

impl Drop for LocationWatch {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Extremo emisor de un `LocationWatch`
#[derive(Clone)]
pub struct WatchSender {
    sender: mpsc::UnboundedSender<LocationEvent>,
    cancelled: Arc<AtomicBool>,
}

impl WatchSender {
    /// Entregar un evento. Devuelve `false` si la suscripción ya no existe.
    pub fn send(&self, event: LocationEvent) -> bool {
        if self.is_cancelled() {
            return false;
        }
        self.sender.send(event).is_ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst) || self.sender.is_closed()
    }
}

#[derive(Default)]
struct FeedInner {
    subscription: Option<WatchSender>,
}

impl FeedInner {
    /// Sin suscripción viva el evento se descarta: nunca se reutiliza una
    /// posición ni un error de una sesión anterior.
    fn deliver(&self, event: LocationEvent) -> bool {
        match &self.subscription {
            Some(sender) if !sender.is_cancelled() => sender.send(event),
            _ => {
                log::debug!("🗑️ Evento de ubicación descartado: sin suscripción activa");
                false
            }
        }
    }
}

/// Fuente alimentada desde fuera (callbacks de la plataforma, pruebas)
pub struct FeedLocationSource {
    supported: bool,
    inner: Arc<Mutex<FeedInner>>,
}

/// Manejador para alimentar una `FeedLocationSource`
#[derive(Clone)]
pub struct LocationFeed {
    inner: Arc<Mutex<FeedInner>>,
}

impl FeedLocationSource {
    pub fn new() -> (Self, LocationFeed) {
        let inner = Arc::new(Mutex::new(FeedInner::default()));
        (
            Self {
                supported: true,
                inner: inner.clone(),
            },
            LocationFeed { inner },
        )
    }

    /// Entorno sin capacidad de geolocalización
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            inner: Arc::new(Mutex::new(FeedInner::default())),
        }
    }
}

impl LocationSource for FeedLocationSource {
    fn start_watching(&mut self, options: &WatchOptions) -> AppResult<LocationWatch> {
        if !self.supported {
            return Err(AppError::UnsupportedEnvironment(
                "geolocation capability not available".to_string(),
            ));
        }

        let (watch, sender) = LocationWatch::channel(options);
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| AppError::UnsupportedEnvironment("location feed poisoned".to_string()))?;

        inner.subscription = Some(sender);

        log::info!("📡 Suscripción de ubicación iniciada (alta precisión: {})", options.high_accuracy);
        Ok(watch)
    }
}

impl LocationFeed {
    /// Reportar una posición capturada ahora. Devuelve `false` si no hay
    /// suscripción viva; en ese caso la posición se descarta.
    pub fn push_position(&self, latitude: f64, longitude: f64) -> bool {
        self.push(Ok(LocationSample::now(latitude, longitude)))
    }

    /// Reportar una muestra con su propia hora de captura
    pub fn push_sample(&self, sample: LocationSample) -> bool {
        self.push(Ok(sample))
    }

    /// Reportar un error de la plataforma
    pub fn push_error(&self, error: AppError) -> bool {
        self.push(Err(error))
    }

    /// Hay una suscripción viva
    pub fn is_watching(&self) -> bool {
        self.inner
            .lock()
            .map(|inner| inner.subscription.as_ref().map_or(false, |s| !s.is_cancelled()))
            .unwrap_or(false)
    }

    fn push(&self, event: LocationEvent) -> bool {
        match self.inner.lock() {
            Ok(inner) => inner.deliver(event),
            Err(_) => false,
        }
    }
}

/// Intervalo mínimo entre muestras simuladas
pub const MIN_SIMULATION_INTERVAL: Duration = Duration::from_millis(1);

/// Fuente simulada que recorre una ruta ida y vuelta a intervalo fijo
pub struct SimulatedRouteSource {
    route: RouteOverlay,
    interval: Duration,
    steps_per_segment: u32,
}

impl SimulatedRouteSource {
    pub fn new(route: RouteOverlay, interval: Duration, steps_per_segment: u32) -> Self {
        Self {
            route,
            interval: interval.max(MIN_SIMULATION_INTERVAL),
            steps_per_segment: steps_per_segment.max(1),
        }
    }

    /// Puntos de un recorrido completo (ida), interpolados por segmento
    pub fn waypoints(&self) -> Vec<Coordinates> {
        let path = &self.route.path;
        let mut points = Vec::new();
        for pair in path.windows(2) {
            for step in 0..self.steps_per_segment {
                let t = step as f64 / self.steps_per_segment as f64;
                points.push(pair[0].lerp(&pair[1], t));
            }
        }
        if let Some(last) = path.last() {
            points.push(*last);
        }
        points
    }
}

impl LocationSource for SimulatedRouteSource {
    fn start_watching(&mut self, options: &WatchOptions) -> AppResult<LocationWatch> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|_| AppError::UnsupportedEnvironment("no async runtime".to_string()))?;

        let outbound = self.waypoints();
        if outbound.is_empty() {
            return Err(AppError::UnsupportedEnvironment(format!(
                "route '{}' has no points",
                self.route.name
            )));
        }
        let mut inbound = outbound.clone();
        inbound.reverse();

        let (watch, sender) = LocationWatch::channel(options);
        let interval = self.interval;
        let name = self.route.name.clone();

        handle.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            log::info!("🚌 Simulación de ruta '{}' iniciada", name);
            for point in outbound.iter().chain(inbound.iter()).cycle() {
                ticker.tick().await;
                if !sender.send(Ok(LocationSample::now(point.latitude, point.longitude))) {
                    break;
                }
            }
            log::info!("🛑 Simulación de ruta '{}' detenida", name);
        });

        Ok(watch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_options() -> WatchOptions {
        WatchOptions {
            timeout: Duration::from_millis(200),
            ..WatchOptions::default()
        }
    }

    #[tokio::test]
    async fn test_feed_delivers_in_order() {
        let (mut source, feed) = FeedLocationSource::new();
        let mut watch = source.start_watching(&fast_options()).unwrap();
        assert!(feed.push_position(1.0, 1.0));
        assert!(feed.push_position(2.0, 2.0));

        let first = watch.next().await.unwrap().unwrap();
        let second = watch.next().await.unwrap().unwrap();

        assert_eq!(first.coordinates(), Coordinates::new(1.0, 1.0));
        assert_eq!(second.coordinates(), Coordinates::new(2.0, 2.0));
        assert!(first.captured_at <= second.captured_at);
    }

    #[tokio::test]
    async fn test_stop_drops_queued_samples() {
        let (mut source, feed) = FeedLocationSource::new();
        let mut watch = source.start_watching(&fast_options()).unwrap();
        assert!(feed.push_position(1.0, 1.0));

        watch.stop();

        assert!(watch.next().await.is_none());
        assert!(!feed.is_watching());
        assert!(!feed.push_position(2.0, 2.0));
    }

    #[tokio::test]
    async fn test_timeout_is_terminal() {
        let (mut source, _feed) = FeedLocationSource::new();
        let mut watch = source.start_watching(&fast_options()).unwrap();

        match watch.next().await {
            Some(Err(AppError::Timeout(ms))) => assert_eq!(ms, 200),
            other => panic!("expected timeout, got {:?}", other),
        }
        assert!(watch.next().await.is_none());
    }

    #[tokio::test]
    async fn test_permission_denied_is_terminal() {
        let (mut source, feed) = FeedLocationSource::new();
        let mut watch = source.start_watching(&fast_options()).unwrap();
        feed.push_error(AppError::PermissionDenied("User denied Geolocation".to_string()));
        feed.push_position(1.0, 1.0);

        assert!(matches!(watch.next().await, Some(Err(AppError::PermissionDenied(_)))));
        assert!(watch.next().await.is_none());
    }

    #[tokio::test]
    async fn test_stale_fix_is_never_reused() {
        let (mut source, feed) = FeedLocationSource::new();
        let mut watch = source.start_watching(&fast_options()).unwrap();
        let cached = LocationSample::new(5.0, 5.0, Utc::now() - ChronoDuration::minutes(10));
        feed.push_sample(cached);
        feed.push_position(6.0, 6.0);

        let sample = watch.next().await.unwrap().unwrap();
        assert_eq!(sample.coordinates(), Coordinates::new(6.0, 6.0));
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let (mut source, feed) = FeedLocationSource::new();
        let mut first = source.start_watching(&fast_options()).unwrap();
        first.stop();

        let mut second = source.start_watching(&fast_options()).unwrap();
        assert!(feed.push_position(3.0, 4.0));
        let sample = second.next().await.unwrap().unwrap();
        assert_eq!(sample.coordinates(), Coordinates::new(3.0, 4.0));
    }

    #[tokio::test]
    async fn test_events_without_watch_are_dropped() {
        let (mut source, feed) = FeedLocationSource::new();
        assert!(!feed.push_position(8.0, 8.0));

        let mut first = source.start_watching(&fast_options()).unwrap();
        first.stop();
        assert!(!feed.push_position(9.0, 9.0));
        assert!(!feed.push_error(AppError::PermissionDenied("old".to_string())));

        let mut second = source.start_watching(&fast_options()).unwrap();
        assert!(feed.push_position(3.0, 4.0));
        let sample = second.next().await.unwrap().unwrap();
        assert_eq!(sample.coordinates(), Coordinates::new(3.0, 4.0));
    }

    #[test]
    fn test_unsupported_environment() {
        let mut source = FeedLocationSource::unsupported();
        assert!(matches!(
            source.start_watching(&WatchOptions::default()),
            Err(AppError::UnsupportedEnvironment(_))
        ));
    }

    #[test]
    fn test_simulated_waypoints_cover_route() {
        let source = SimulatedRouteSource::new(RouteOverlay::via_teran(), Duration::from_millis(10), 4);
        let points = source.waypoints();

        assert_eq!(points.len(), 5);
        assert_eq!(points.first(), RouteOverlay::via_teran().path.first());
        assert_eq!(points.last(), RouteOverlay::via_teran().path.last());
    }

    #[tokio::test]
    async fn test_simulated_route_emits_samples() {
        let mut source = SimulatedRouteSource::new(RouteOverlay::via_teran(), Duration::from_millis(10), 2);
        let mut watch = source.start_watching(&fast_options()).unwrap();

        let first = watch.next().await.unwrap().unwrap();
        assert_eq!(first.coordinates(), RouteOverlay::via_teran().path[0]);

        watch.stop();
        assert!(watch.next().await.is_none());
    }

    #[tokio::test]
    async fn test_simulated_zero_interval_is_clamped() {
        let mut source = SimulatedRouteSource::new(RouteOverlay::via_teran(), Duration::ZERO, 1);
        let mut watch = source.start_watching(&fast_options()).unwrap();

        for _ in 0..3 {
            assert!(matches!(watch.next().await, Some(Ok(_))));
        }
    }
}
