use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use supplydesk_api::{
    app_router,
    auth::{Actor, AuthConfig, AuthService},
    config::AppConfig,
    db::{self, DbPool},
    entities::supply::{self, SupplyCategory, SupplyUnit},
    events::{process_events, EventSender},
    handlers::AppServices,
    services::catalog::SupplyInput,
    AppState,
};
use tempfile::TempDir;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Test harness backed by a file-based SQLite database in a temp directory.
/// The pool is capped at one connection so competing transactions in
/// concurrency tests serialize the way a real backend would.
pub struct TestApp {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    pub staff: Actor,
    pub requester: Actor,
    pub config: AppConfig,
    pub event_sender: EventSender,
    pub auth_service: Arc<AuthService>,
    _event_task: tokio::task::JoinHandle<()>,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = dir.path().join("supplydesk_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        let db = Arc::new(pool);

        let (tx, rx) = mpsc::channel(100);
        let event_sender = EventSender::new(tx);
        let event_task = tokio::spawn(process_events(rx));

        let services = AppServices::new(db.clone(), event_sender.clone(), cfg.low_stock_threshold);
        let auth_service = Arc::new(AuthService::new(AuthConfig::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            cfg.auth_audience.clone(),
            Duration::from_secs(cfg.jwt_expiration),
        )));

        Self {
            db,
            services,
            staff: Actor::staff(Uuid::new_v4()),
            requester: Actor::requester(Uuid::new_v4()),
            config: cfg,
            event_sender,
            auth_service,
            _event_task: event_task,
            _dir: dir,
        }
    }

    /// Full application router with the auth extension wired, for HTTP-level
    /// tests via `tower::ServiceExt::oneshot`.
    #[allow(dead_code)]
    pub fn router(&self) -> Router {
        let state = AppState {
            db: self.db.clone(),
            config: self.config.clone(),
            event_sender: self.event_sender.clone(),
            services: self.services.clone(),
        };
        app_router(state, self.auth_service.clone())
    }

    #[allow(dead_code)]
    pub fn token_for(&self, actor: &Actor) -> String {
        self.auth_service
            .issue_token(actor.id, Some("Test User".to_string()), actor.is_staff)
            .expect("failed to issue test token")
    }

    /// Seeds one catalog entry through the catalog service so quantity
    /// derivation matches production behavior.
    #[allow(dead_code)]
    pub async fn seed_supply(
        &self,
        name: &str,
        unit: SupplyUnit,
        boxes_count: i32,
        items_per_box: i32,
    ) -> supply::Model {
        self.services
            .catalog
            .create_supply(
                &self.staff,
                SupplyInput {
                    name: name.to_string(),
                    size_spec: String::new(),
                    description: String::new(),
                    category: SupplyCategory::WritingSupplies,
                    unit,
                    boxes_count,
                    items_per_box,
                },
            )
            .await
            .expect("failed to seed supply")
    }

    #[allow(dead_code)]
    pub async fn reload_supply(&self, id: i64) -> supply::Model {
        self.services
            .catalog
            .get_supply(id)
            .await
            .expect("supply should exist")
    }
}
