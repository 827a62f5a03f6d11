//! HTTP server: axum router over the startup-loaded dataset. Configuration
//! comes from FINDASH_* environment variables; a dataset load failure is
//! fatal before the listener is ever bound.

pub mod api;
pub mod events;
pub mod routes;

use std::env;
use std::fmt;

use crate::data::dataset::{Dataset, DEFAULT_DATA_PATH};
use crate::data::loader::LoadError;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub data_path: String,
    /// CORS origin the API is restricted to; None allows any origin.
    pub allowed_origin: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> ServerConfig {
        ServerConfig {
            bind_addr: env::var("FINDASH_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            data_path: env::var("FINDASH_DATA_PATH")
                .unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string()),
            allowed_origin: env::var("FINDASH_ALLOWED_ORIGIN")
                .ok()
                .filter(|origin| !origin.trim().is_empty()),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> ServerConfig {
        ServerConfig {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            data_path: DEFAULT_DATA_PATH.to_string(),
            allowed_origin: None,
        }
    }
}

#[derive(Debug)]
pub enum ServerError {
    Load(LoadError),
    InvalidOrigin(String),
    Io(std::io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(err) => write!(f, "dataset load failed: {err}"),
            Self::InvalidOrigin(origin) => write!(f, "invalid allowed origin '{origin}'"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<LoadError> for ServerError {
    fn from(err: LoadError) -> Self {
        Self::Load(err)
    }
}

/// Load the dataset, then serve until the process is stopped.
pub fn run_server(config: &ServerConfig) -> Result<(), ServerError> {
    let dataset = Dataset::load(&config.data_path)?;
    println!(
        "loaded {} records ({} companies, {} metrics) from '{}'",
        dataset.records().len(),
        dataset.companies().len(),
        dataset.metrics().len(),
        config.data_path
    );

    let app = routes::router(dataset, config)?;
    let runtime = tokio::runtime::Runtime::new().map_err(ServerError::Io)?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&config.bind_addr)
            .await
            .map_err(ServerError::Io)?;
        println!("findash server listening on http://{}", config.bind_addr);
        axum::serve(listener, app).await.map_err(ServerError::Io)
    })
}
