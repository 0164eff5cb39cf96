use std::net::SocketAddr;
use std::time::Duration;

use tempfile::TempDir;

use pythagoras_client::RankingGateway;
use pythagoras_server::build_app;
use pythagoras_server::config::{ResetSecret, ServerConfig, StoreConfig, StoreKind};

pub const RESET_SECRET: &str = "integration-secret";

pub struct TestServer {
    pub addr: SocketAddr,
    _data_dir: TempDir,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server backed by a fresh SQLite file.
    pub async fn new() -> Self {
        Self::with_store(StoreKind::Sqlite).await
    }

    /// Start a test server backed by a fresh JSON ranking file.
    pub async fn with_file_store() -> Self {
        Self::with_store(StoreKind::File).await
    }

    pub async fn with_store(kind: StoreKind) -> Self {
        let data_dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            listen_host: "127.0.0.1".to_string(),
            port: 0,
            reset_password: ResetSecret::new(RESET_SECRET),
            web_root: data_dir.path().join("web").display().to_string(),
            store: StoreConfig {
                kind,
                sqlite_path: data_dir.path().join("data.db"),
                file_path: data_dir.path().join("ranking.json"),
            },
        };
        Self::from_config(config, data_dir).await
    }

    async fn from_config(config: ServerConfig, data_dir: TempDir) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, _state) = build_app(config).unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            _data_dir: data_dir,
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }

    pub fn gateway(&self) -> RankingGateway {
        RankingGateway::new(&self.base_url()).unwrap()
    }
}
