//! Local image storage under the static directory.
//!
//! Every saved image gets a fresh `image_<uuid>.png` name, so concurrent
//! writers never touch the same file.

use crate::ai::mime;
use crate::Result;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Sub-directory of the static root holding generated images.
pub const IMAGES_DIR: &str = "images";

/// URL prefix the static root is served under.
pub const STATIC_URL_PREFIX: &str = "static";

const FILE_PREFIX: &str = "image_";
const FILE_EXTENSION: &str = "png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub file_name: String,
    /// Location on disk.
    pub path: PathBuf,
    /// Path relative to the site root, e.g. `static/images/image_<uuid>.png`.
    pub public_path: String,
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    images_dir: PathBuf,
}

impl ImageStore {
    /// Open the store, creating `<static_root>/images` if needed.
    pub fn new(static_root: impl AsRef<Path>) -> Result<Self> {
        let images_dir = static_root.as_ref().join(IMAGES_DIR);
        std::fs::create_dir_all(&images_dir)?;
        info!("Image directory ready: {}", images_dir.display());
        Ok(Self { images_dir })
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    pub async fn save(&self, bytes: &[u8]) -> Result<StoredImage> {
        if !mime::is_png(bytes) {
            warn!(
                "Storing {} bytes of {} under a .png name",
                bytes.len(),
                mime::detect_image_mime(bytes)
            );
        }

        let file_name = format!("{}{}.{}", FILE_PREFIX, Uuid::new_v4(), FILE_EXTENSION);
        let path = self.images_dir.join(&file_name);

        tokio::fs::write(&path, bytes).await?;
        info!("Image saved to: {}", path.display());

        Ok(StoredImage {
            public_path: format!("{}/{}/{}", STATIC_URL_PREFIX, IMAGES_DIR, file_name),
            file_name,
            path,
        })
    }

    /// Delete generated images last modified more than `max_age` ago.
    ///
    /// Files that don't follow the `image_*.png` naming are left alone.
    pub async fn purge_older_than(&self, max_age: Duration) -> Result<usize> {
        let now = SystemTime::now();
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.images_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !is_generated_name(&name) {
                continue;
            }

            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }

            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or_default();

            if age > max_age {
                match tokio::fs::remove_file(entry.path()).await {
                    Ok(()) => {
                        debug!("Removed expired image {}", name);
                        removed += 1;
                    }
                    // Another sweep got there first.
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        Ok(removed)
    }
}

fn is_generated_name(name: &str) -> bool {
    name.strip_prefix(FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(&format!(".{}", FILE_EXTENSION)))
        .is_some_and(|id| Uuid::parse_str(id).is_ok())
}

/// How often the sweeper runs for a given retention: at most hourly, at
/// least once a second.
pub fn sweep_period(retention: Duration) -> Duration {
    retention
        .min(Duration::from_secs(3600))
        .max(Duration::from_secs(1))
}

/// Periodically purge images older than `retention`.
///
/// The first sweep runs immediately. Runs until the returned handle is aborted.
pub fn spawn_retention_sweeper(
    store: ImageStore,
    retention: Duration,
) -> tokio::task::JoinHandle<()> {
    let period = sweep_period(retention);
    info!(
        "Image retention enabled: {:?} (sweeping every {:?})",
        retention, period
    );

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match store.purge_older_than(retention).await {
                Ok(0) => {}
                Ok(n) => info!("Purged {} expired image(s)", n),
                Err(e) => warn!("Image retention sweep failed: {}", e),
            }
        }
    })
}
