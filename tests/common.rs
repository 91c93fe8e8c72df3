#![allow(dead_code, clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, clippy::must_use_candidate, missing_debug_implementations, clippy::clone_on_ref_ptr, unreachable_pub)]

use palaver_server::api;
use palaver_server::config::{AuthConfig, Config, LogFormat, ServerConfig, TelemetryConfig};
use palaver_server::domain::auth::{Claims, encode_jwt};
use palaver_server::domain::user::UserProfile;
use palaver_server::services::chat_service::ChatService;
use palaver_server::storage::memory::MemoryStore;
use palaver_server::storage::{ChatStore, MessageStore};
use std::sync::{Arc, Once};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test_secret";

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("palaver_server=debug".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

pub fn get_test_config() -> Config {
    Config {
        database_url: "postgres://unused-in-memory-tests".to_string(),
        server: ServerConfig { host: "127.0.0.1".to_string(), port: 0, mgmt_port: 0 },
        auth: AuthConfig { jwt_secret: JWT_SECRET.to_string() },
        telemetry: TelemetryConfig { log_format: LogFormat::Text },
    }
}

pub struct TestApp {
    pub api_url: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    /// Spawns the application router on an ephemeral port, backed by an
    /// in-memory store.
    pub async fn spawn() -> Self {
        setup_tracing();

        let store = Arc::new(MemoryStore::new());
        let chat_service = ChatService::new(
            Arc::clone(&store) as Arc<dyn ChatStore>,
            Arc::clone(&store) as Arc<dyn MessageStore>,
        );
        let router = api::app_router(get_test_config(), chat_service);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router.into_make_service()).await.unwrap();
        });

        Self {
            api_url: format!("http://{addr}/v1"),
            client: reqwest::Client::new(),
            store,
        }
    }

    /// Registers a user and returns (id, bearer token).
    pub fn register_user(&self, first: &str, last: &str) -> (Uuid, String) {
        let id = Uuid::new_v4();
        self.store
            .seed_user(UserProfile {
                id,
                first_name: first.to_string(),
                last_name: last.to_string(),
                profile_picture: None,
                about: None,
                email: Some(format!("{}@example.com", first.to_lowercase())),
            })
            .unwrap();
        (id, token_for(id))
    }
}

pub fn token_for(user_id: Uuid) -> String {
    let exp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() + 3600;
    encode_jwt(&Claims::new(user_id, exp), JWT_SECRET).unwrap()
}
