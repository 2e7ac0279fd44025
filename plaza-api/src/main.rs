use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use plaza_api::{app, AppState};
use plaza_booking::{BookingService, ExpirySweeper};
use plaza_catalog::Catalog;
use plaza_store::{EventBus, MemoryLedger};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plaza_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = plaza_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Plaza API on port {}", config.server.port);

    let catalog =
        Arc::new(Catalog::load(&config.catalog.seed_path).expect("Failed to load catalog seed"));

    let ledger = Arc::new(MemoryLedger::new());
    for container in catalog.containers() {
        ledger
            .register_container(container.id, container.units.iter().map(|u| u.id.clone()))
            .await;
        tracing::info!(
            container_id = %container.id,
            units = container.units.len(),
            "registered container"
        );
    }

    let events = EventBus::new(100);
    let booking = Arc::new(BookingService::new(
        catalog.clone(),
        ledger,
        events.clone(),
        config.booking.clone(),
    ));

    let sweeper = ExpirySweeper::new(
        booking.clone(),
        Duration::from_secs(config.booking.sweep_interval_seconds),
    );
    tokio::spawn(sweeper.run());

    let app_state = AppState {
        booking,
        catalog,
        events,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
