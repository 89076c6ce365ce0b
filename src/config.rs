use std::{env, net::SocketAddr, path::PathBuf};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Json { root: PathBuf },
    Sqlite { database_url: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub storage: StorageBackend,
    pub seed_catalog: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let backend = env::var("STORAGE_BACKEND").unwrap_or_else(|_| "sqlite".to_string());
        let storage = match backend.trim().to_ascii_lowercase().as_str() {
            "memory" => StorageBackend::Memory,
            "json" => StorageBackend::Json {
                root: env::var("DATA_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("data")),
            },
            "sqlite" => StorageBackend::Sqlite {
                database_url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://itinerary.db".to_string()),
            },
            other => {
                return Err(AppError::Config(format!(
                    "unknown STORAGE_BACKEND {other:?} (expected memory, json or sqlite)"
                )))
            }
        };

        let seed_catalog = match env::var("SEED_CATALOG") {
            Ok(raw) => parse_flag(&raw)
                .ok_or_else(|| AppError::Config(format!("invalid SEED_CATALOG: {raw:?}")))?,
            Err(_) => true,
        };

        Ok(Self {
            listen_addr,
            storage,
            seed_catalog,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
