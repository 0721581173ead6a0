// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    // Object storage collaborator
    pub object_storage_url: String,
    pub object_storage_bucket: String,
    // Propagation outbox
    pub outbox_poll_secs: u64,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        let object_storage_url = std::env::var("OBJECT_STORAGE_URL")
            .unwrap_or_else(|_| "http://localhost:9000".to_string());
        let object_storage_bucket =
            std::env::var("OBJECT_STORAGE_BUCKET").unwrap_or_else(|_| "worker-documents".to_string());

        let outbox_poll_secs = std::env::var("OUTBOX_POLL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5);

        Config {
            database_url,
            port,
            object_storage_url,
            object_storage_bucket,
            outbox_poll_secs,
        }
    }
}
