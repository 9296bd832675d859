//! Append-only CSV output for accepted readings.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

use sds011_protocol::Measurement;

const HEADER: &str = "ID, PM25, PM10, TIME\n";

/// Shared, append-only CSV file of accepted readings.
///
/// Every append is one full line written under a lock, so records from
/// concurrently polling links never interleave.
pub struct CsvSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl CsvSink {
    /// Open the CSV file, creating it with a header line when it does not
    /// exist yet. An existing file is appended to, so a restart on the same
    /// day continues the same file.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let fresh = !path.exists();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        if fresh {
            file.write_all(HEADER.as_bytes()).await?;
            file.flush().await?;
            info!(path = %path.display(), "created output file");
        } else {
            info!(path = %path.display(), "appending to existing output file");
        }

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one reading as a single record.
    pub async fn append(&self, m: &Measurement) -> io::Result<()> {
        let line = format!("{}, {}, {}, {}\n", m.sensor, m.pm25, m.pm10, m.timestamp);
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}
