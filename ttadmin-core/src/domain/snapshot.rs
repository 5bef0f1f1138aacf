//! Snapshot and storage selectors
//!
//! The backend identifies snapshot types and storage components by their
//! display labels (in Russian). Variants here carry both that wire label
//! and a short ASCII slug for the command line.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::job::RequestError;

/// Part of the system a snapshot captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotType {
    WholeSystem,
    Database,
    GoogleDrive,
    YandexDrive,
    LocalStorage,
}

impl SnapshotType {
    pub const ALL: [SnapshotType; 5] = [
        SnapshotType::WholeSystem,
        SnapshotType::Database,
        SnapshotType::GoogleDrive,
        SnapshotType::YandexDrive,
        SnapshotType::LocalStorage,
    ];

    /// Label the backend expects
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotType::WholeSystem => "Вся система",
            SnapshotType::Database => "База данных",
            SnapshotType::GoogleDrive => "Google Drive",
            SnapshotType::YandexDrive => "Yandex Drive",
            SnapshotType::LocalStorage => "Локальное хранилище",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            SnapshotType::WholeSystem => "whole-system",
            SnapshotType::Database => "database",
            SnapshotType::GoogleDrive => "google-drive",
            SnapshotType::YandexDrive => "yandex-drive",
            SnapshotType::LocalStorage => "local-storage",
        }
    }
}

impl fmt::Display for SnapshotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnapshotType {
    type Err = RequestError;

    /// Accepts either the wire label or the slug
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SnapshotType::ALL
            .into_iter()
            .find(|t| t.as_str() == s || t.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| RequestError::InvalidParam {
                param: "snapshot",
                value: s.to_string(),
            })
    }
}

/// Storage component that can be cleansed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageComponent {
    WholeSystem,
    AllStorages,
    GoogleDrive,
    YandexDrive,
    LocalStorage,
}

impl StorageComponent {
    pub const ALL: [StorageComponent; 5] = [
        StorageComponent::WholeSystem,
        StorageComponent::AllStorages,
        StorageComponent::GoogleDrive,
        StorageComponent::YandexDrive,
        StorageComponent::LocalStorage,
    ];

    /// Label the backend expects
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageComponent::WholeSystem => "Вся система",
            StorageComponent::AllStorages => "Все хранилища",
            StorageComponent::GoogleDrive => "Google Drive",
            StorageComponent::YandexDrive => "Yandex Drive",
            StorageComponent::LocalStorage => "Локальное хранилище",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            StorageComponent::WholeSystem => "whole-system",
            StorageComponent::AllStorages => "all-storages",
            StorageComponent::GoogleDrive => "google-drive",
            StorageComponent::YandexDrive => "yandex-drive",
            StorageComponent::LocalStorage => "local-storage",
        }
    }
}

impl fmt::Display for StorageComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageComponent {
    type Err = RequestError;

    /// Accepts either the wire label or the slug
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StorageComponent::ALL
            .into_iter()
            .find(|c| c.as_str() == s || c.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| RequestError::InvalidParam {
                param: "component",
                value: s.to_string(),
            })
    }
}

/// Last known download link per snapshot type
///
/// Scoped to one admin session. An empty url from the backend means
/// "no snapshot yet" and is stored as absent.
#[derive(Debug, Clone, Default)]
pub struct SnapshotLinks {
    links: HashMap<SnapshotType, String>,
}

impl SnapshotLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the link for a snapshot type; `None` or `""` clears it
    pub fn set(&mut self, snapshot: SnapshotType, url: Option<String>) {
        match url.filter(|u| !u.is_empty()) {
            Some(url) => {
                self.links.insert(snapshot, url);
            }
            None => {
                self.links.remove(&snapshot);
            }
        }
    }

    pub fn get(&self, snapshot: SnapshotType) -> Option<&str> {
        self.links.get(&snapshot).map(String::as_str)
    }

    pub fn is_downloadable(&self, snapshot: SnapshotType) -> bool {
        self.links.contains_key(&snapshot)
    }

    /// Links in the selector's order
    pub fn iter(&self) -> impl Iterator<Item = (SnapshotType, Option<&str>)> + '_ {
        SnapshotType::ALL
            .into_iter()
            .map(move |t| (t, self.get(t)))
    }
}

/// File name a snapshot link downloads to (its last path segment)
pub fn snapshot_file_name(url: &str) -> Option<&str> {
    url.rsplit('/').next().filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_and_slug() {
        assert_eq!(
            "Локальное хранилище".parse::<SnapshotType>().unwrap(),
            SnapshotType::LocalStorage
        );
        assert_eq!(
            "GOOGLE-DRIVE".parse::<SnapshotType>().unwrap(),
            SnapshotType::GoogleDrive
        );
        assert_eq!(
            "all-storages".parse::<StorageComponent>().unwrap(),
            StorageComponent::AllStorages
        );
    }

    #[test]
    fn test_all_storages_is_not_a_snapshot_type() {
        assert!("all-storages".parse::<SnapshotType>().is_err());
        assert!("database".parse::<StorageComponent>().is_err());
    }

    #[test]
    fn test_links_treat_empty_as_absent() {
        let mut links = SnapshotLinks::new();
        links.set(SnapshotType::Database, Some("snapshots/db.zip".to_string()));
        links.set(SnapshotType::GoogleDrive, Some(String::new()));

        assert_eq!(links.get(SnapshotType::Database), Some("snapshots/db.zip"));
        assert!(!links.is_downloadable(SnapshotType::GoogleDrive));

        links.set(SnapshotType::Database, None);
        assert!(!links.is_downloadable(SnapshotType::Database));
    }

    #[test]
    fn test_links_iterate_in_selector_order() {
        let mut links = SnapshotLinks::new();
        links.set(SnapshotType::LocalStorage, Some("a/local.tar".to_string()));
        let order: Vec<_> = links.iter().map(|(t, _)| t).collect();
        assert_eq!(order, SnapshotType::ALL.to_vec());
        assert_eq!(links.iter().filter(|(_, url)| url.is_some()).count(), 1);
    }

    #[test]
    fn test_snapshot_file_name() {
        assert_eq!(snapshot_file_name("snapshots/2024/db.zip"), Some("db.zip"));
        assert_eq!(snapshot_file_name("db.zip"), Some("db.zip"));
        assert_eq!(snapshot_file_name("snapshots/"), None);
    }
}
