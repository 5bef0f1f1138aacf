//! Snapshot link and download endpoints

use std::path::{Path, PathBuf};
use tracing::{info, warn};
use ttadmin_core::domain::job::JobKind;
use ttadmin_core::domain::snapshot::{SnapshotLinks, SnapshotType, snapshot_file_name};
use ttadmin_core::dto::settings::LastSnapshotResponse;

use crate::AdminClient;
use crate::error::{ClientError, Result};

impl AdminClient {
    /// Link to the most recent snapshot of a type
    ///
    /// # Returns
    /// `None` when the backend has no snapshot of that type yet
    pub async fn last_snapshot_url(&self, snapshot: SnapshotType) -> Result<Option<String>> {
        let url = self.admin_url(JobKind::Snapshot.path());
        let response = self
            .authorize(self.client.get(&url), false)
            .query(&[("snapshot_type", snapshot.as_str())])
            .send()
            .await?;

        let reply: LastSnapshotResponse = self.handle_response(response).await?;
        Ok(reply.url.filter(|u| !u.is_empty()))
    }

    /// Fill `links` with the latest link of every snapshot type
    ///
    /// A type whose lookup fails keeps whatever link it had.
    ///
    /// # Returns
    /// The number of types that were looked up successfully
    pub async fn refresh_snapshot_links(&self, links: &mut SnapshotLinks) -> usize {
        let mut refreshed = 0;

        for snapshot in SnapshotType::ALL {
            match self.last_snapshot_url(snapshot).await {
                Ok(url) => {
                    links.set(snapshot, url);
                    refreshed += 1;
                }
                Err(e) => warn!("Failed to fetch last '{}' snapshot: {}", snapshot, e),
            }
        }

        refreshed
    }

    /// Download a snapshot into `dest_dir`
    ///
    /// The file is fetched from the static root and saved under the last
    /// segment of its link.
    ///
    /// # Returns
    /// Path of the written file
    pub async fn download_snapshot(&self, link: &str, dest_dir: &Path) -> Result<PathBuf> {
        let file_name = snapshot_file_name(link).ok_or_else(|| {
            ClientError::InvalidRequest(format!("snapshot link has no file name: {}", link))
        })?;

        let url = self.static_url(link);
        let response = self
            .authorize(self.client.get(&url), false)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let bytes = response.bytes().await?;
        let target = dest_dir.join(file_name);
        tokio::fs::write(&target, &bytes).await?;

        info!("Downloaded {} ({} bytes)", target.display(), bytes.len());
        Ok(target)
    }
}
