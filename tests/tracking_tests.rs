use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::Query, http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;

use transport_communication::config::environment::EnvironmentConfig;
use transport_communication::config::map::{MapConfig, RouteOverlay};
use transport_communication::models::activation::{ActivationPhase, IndicatorColor};
use transport_communication::services::activation_service::ActivationToggle;
use transport_communication::services::dialogs::ScriptedDialogs;
use transport_communication::services::location_source::SimulatedRouteSource;
use transport_communication::services::map_view::provider_from_config;
use transport_communication::state::TrackingContext;
use transport_communication::utils::errors::AppError;

async fn maps_script(Query(params): Query<HashMap<String, String>>) -> (StatusCode, &'static str) {
    match (params.get("key"), params.get("libraries")) {
        (Some(key), Some(libraries)) if key == "clave de prueba" && libraries == "places" => {
            (StatusCode::OK, "/* sdk */")
        }
        _ => (StatusCode::FORBIDDEN, "missing key"),
    }
}

async fn spawn_maps_server() -> SocketAddr {
    let app = Router::new().route("/maps/api/js", get(maps_script));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn maps_config(addr: SocketAddr, key: &str) -> EnvironmentConfig {
    EnvironmentConfig {
        maps_api_key: Some(key.to_string()),
        maps_script_url: format!("http://{}/maps/api/js", addr),
        location_timeout_ms: 2000,
        ..EnvironmentConfig::default()
    }
}

fn simulated_toggle(dialogs: Arc<ScriptedDialogs>) -> ActivationToggle {
    let source = SimulatedRouteSource::new(RouteOverlay::via_teran(), Duration::from_millis(10), 2);
    let config = EnvironmentConfig {
        location_timeout_ms: 2000,
        ..EnvironmentConfig::default()
    };
    ActivationToggle::from_config(Box::new(source), dialogs, &config)
}

#[tokio::test]
async fn test_live_tracking_over_simulated_route() {
    let addr = spawn_maps_server().await;
    let config = maps_config(addr, "clave de prueba");
    let provider = provider_from_config(&config).unwrap();

    let mut ctx = TrackingContext::new();
    ctx.map.initialize(provider.as_ref(), MapConfig::default()).await.unwrap();
    assert!(ctx.status().map_initialized);

    let dialogs = Arc::new(ScriptedDialogs::new([true, true]));
    let mut toggle = simulated_toggle(dialogs.clone());

    assert_eq!(toggle.activate_location(&mut ctx).await, ActivationPhase::Active);
    let status = ctx.status();
    assert_eq!(status.device_markers, 1);
    assert_eq!(status.button_color, IndicatorColor::Green);
    assert!(status.location_accessed);

    let device = toggle.device_id().cloned().unwrap();
    let first = ctx.map.marker(&device).unwrap().position.coordinates();
    for _ in 0..3 {
        assert_eq!(toggle.next_update(&mut ctx).await, Some(ActivationPhase::Active));
    }
    let moved = ctx.map.marker(&device).unwrap().position.coordinates();
    assert_ne!(first, moved);
    assert_eq!(ctx.map.marker_count(), 1);

    assert_eq!(toggle.activate_location(&mut ctx).await, ActivationPhase::Inactive);
    assert_eq!(ctx.map.marker_count(), 0);
    assert_eq!(ctx.activation.color, IndicatorColor::Red);
    assert!(!toggle.is_watching());
    assert_eq!(dialogs.shown().len(), 2);
}

#[tokio::test]
async fn test_map_load_failure_keeps_registry_working() {
    let addr = spawn_maps_server().await;
    let provider = provider_from_config(&maps_config(addr, "otra clave")).unwrap();

    let mut ctx = TrackingContext::new();
    let result = ctx.map.initialize(provider.as_ref(), MapConfig::default()).await;
    assert!(matches!(result, Err(AppError::Transport(_))));
    assert!(!ctx.map.is_initialized());

    let dialogs = Arc::new(ScriptedDialogs::new([true]));
    let mut toggle = simulated_toggle(dialogs);

    assert_eq!(toggle.activate_location(&mut ctx).await, ActivationPhase::Active);
    assert_eq!(ctx.map.marker_count(), 1);
}
