use chrono::{DateTime, Utc};
use std::io;
use tracing::info;

use crate::storage::FileStore;

pub const CERTIFICATES_DIR: &str = "uploads/certificates";

/// Generated certificate files, addressed by web-root relative paths
#[derive(Debug, Clone)]
pub struct CertificateStore {
    files: FileStore,
}

impl CertificateStore {
    pub fn new(files: FileStore) -> Self {
        Self { files }
    }

    /// `Certificado_{id}_{yyyyMMddHHmmssfff}.pdf`
    pub fn file_name(record_id: i64, at: DateTime<Utc>) -> String {
        format!("Certificado_{}_{}.pdf", record_id, at.format("%Y%m%d%H%M%S%3f"))
    }

    /// Writes the document and returns its relative path, always with
    /// forward slashes
    pub async fn save(&self, record_id: i64, bytes: &[u8], at: DateTime<Utc>) -> io::Result<String> {
        let relative = format!("{}/{}", CERTIFICATES_DIR, Self::file_name(record_id, at));
        self.files.write_atomic(&relative, bytes).await?;
        info!("Saved certificate for presentation {} at {}", record_id, relative);
        Ok(relative)
    }

    pub async fn load(&self, relative: &str) -> io::Result<Vec<u8>> {
        self.files.read(relative).await
    }

    pub async fn exists(&self, relative: &str) -> bool {
        self.files.exists(relative).await
    }
}
