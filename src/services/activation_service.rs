//! Interruptor de ubicación en vivo
//!
//! Máquina de estados `Inactive -> AwaitingPermission -> Active` con dos
//! confirmaciones: permiso inicial y desactivación. El efecto de
//! `activate_location` depende solo del estado actual, nunca del número de llamadas.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::models::activation::{ActivationPhase, IndicatorColor};
use crate::models::location::LocationSample;
use crate::models::marker::DeviceId;
use crate::services::dialogs::{Dialogs, Prompt};
use crate::services::location_source::{LocationSource, LocationWatch, WatchOptions};
use crate::state::TrackingContext;
use crate::utils::errors::AppError;

pub struct ActivationToggle {
    source: Box<dyn LocationSource>,
    dialogs: Arc<dyn Dialogs>,
    options: WatchOptions,
    watch: Option<LocationWatch>,
    device_id: Option<DeviceId>,
}

impl ActivationToggle {
    pub fn new(source: Box<dyn LocationSource>, dialogs: Arc<dyn Dialogs>, options: WatchOptions) -> Self {
        Self {
            source,
            dialogs,
            options,
            watch: None,
            device_id: None,
        }
    }

    /// Opciones de geolocalización tomadas del entorno (`LOCATION_TIMEOUT_MS`)
    pub fn from_config(
        source: Box<dyn LocationSource>,
        dialogs: Arc<dyn Dialogs>,
        config: &EnvironmentConfig,
    ) -> Self {
        Self::new(source, dialogs, config.watch_options())
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    /// Comando del botón de ubicación
    pub async fn activate_location(&mut self, ctx: &mut TrackingContext) -> ActivationPhase {
        match ctx.activation.phase {
            ActivationPhase::Inactive => self.request_activation(ctx).await,
            ActivationPhase::AwaitingPermission => {
                log::debug!("⏳ Esperando respuesta de permiso, solicitud ignorada");
                ActivationPhase::AwaitingPermission
            }
            ActivationPhase::Active => self.request_deactivation(ctx).await,
        }
    }

    /// Aplicar el siguiente evento de la suscripción activa.
    ///
    /// `None` si no hay suscripción activa.
    pub async fn next_update(&mut self, ctx: &mut TrackingContext) -> Option<ActivationPhase> {
        if ctx.activation.phase != ActivationPhase::Active {
            return None;
        }
        let event = self.watch.as_mut()?.next().await;

        let phase = match event {
            Some(Ok(sample)) => {
                self.apply_sample(ctx, sample);
                ctx.activation.phase
            }
            Some(Err(e)) => self.fail(ctx, e).await,
            None => {
                log::info!("📴 La suscripción de ubicación terminó");
                self.deactivate(ctx);
                ctx.activation.phase
            }
        };
        Some(phase)
    }

    /// Dispositivo al que pertenece el marcador propio
    pub fn device_id(&self) -> Option<&DeviceId> {
        self.device_id.as_ref()
    }

    pub fn is_watching(&self) -> bool {
        self.watch.as_ref().map_or(false, |w| !w.is_stopped())
    }

    async fn request_activation(&mut self, ctx: &mut TrackingContext) -> ActivationPhase {
        ctx.activation.phase = ActivationPhase::AwaitingPermission;

        if !self.dialogs.confirm(Prompt::EnableLocation).await {
            log::info!("🚫 Acceso a la ubicación rechazado por el usuario");
            ctx.activation.set_inactive();
            return ctx.activation.phase;
        }

        let watch = match self.source.start_watching(&self.options) {
            Ok(watch) => watch,
            Err(e) => return self.fail(ctx, e).await,
        };
        let event = self.watch.insert(watch).next().await;

        match event {
            Some(Ok(sample)) => {
                log::info!("✅ Ubicación activada");
                self.apply_sample(ctx, sample);
            }
            Some(Err(e)) => return self.fail(ctx, e).await,
            None => {
                log::warn!("⚠️ La suscripción terminó sin entregar posición");
                self.deactivate(ctx);
            }
        }
        ctx.activation.phase
    }

    async fn request_deactivation(&mut self, ctx: &mut TrackingContext) -> ActivationPhase {
        if self.dialogs.confirm(Prompt::DisableLocation).await {
            log::info!("📴 Ubicación desactivada por el usuario");
            self.deactivate(ctx);
        } else {
            log::debug!("📍 El usuario mantuvo la ubicación activa");
        }
        ctx.activation.phase
    }

    fn apply_sample(&mut self, ctx: &mut TrackingContext, sample: LocationSample) {
        let device_id = self
            .device_id
            .get_or_insert_with(|| ctx.map.register_device())
            .clone();

        ctx.map.upsert_marker(&device_id, sample);
        ctx.location_accessed = true;
        ctx.activation.set_active();
    }

    /// Los errores de ubicación son terminales: rojo, aviso y vuelta a `Inactive`
    /// una vez que el usuario cierra el aviso.
    async fn fail(&mut self, ctx: &mut TrackingContext, error: AppError) -> ActivationPhase {
        log::warn!("❌ Error de ubicación [{}]: {}", error.code(), error);
        ctx.activation.color = IndicatorColor::Red;
        self.dialogs.alert(&error.user_message()).await;
        self.deactivate(ctx);
        ctx.activation.phase
    }

    fn deactivate(&mut self, ctx: &mut TrackingContext) {
        if let Some(mut watch) = self.watch.take() {
            watch.stop();
        }
        ctx.map.clear_all();
        ctx.activation.set_inactive();
    }
}
