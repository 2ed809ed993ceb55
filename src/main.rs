use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use dotenvy::dotenv;

use transport_communication::api::create_relay_router;
use transport_communication::config::environment::EnvironmentConfig;
use transport_communication::middleware::cors_layer;
use transport_communication::state::RelayState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::default();

    // Configurar logging
    let default_level = if config.is_development() { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("🚌 Transport-Communication - Relay de ubicación");
    info!("================================================");

    let addr: SocketAddr = config.server_url().parse()?;
    if config.is_production() && config.cors_origins.is_empty() {
        warn!("⚠️ CORS_ORIGINS vacío en producción: se aceptan todos los orígenes");
    }
    let cors = cors_layer(&config.cors_origins);

    let app = create_relay_router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(RelayState::new(config));

    info!("🌐 Servidor WebSocket escuchando en ws://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /     - Conexión WebSocket (ubicaciones)");
    info!("   GET  /test - Endpoint de prueba");

    // Iniciar servidor en background
    let server_handle = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                error!("❌ Error del servidor: {}", e);
                e
            })
    });

    // Esperar a que el servidor termine
    if let Err(e) = server_handle.await? {
        error!("❌ Servidor terminó con error: {}", e);
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo escuchar SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
