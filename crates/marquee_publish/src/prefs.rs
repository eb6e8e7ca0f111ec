//! Per-user preference maps persisted as JSON.

use derive_getters::Getters;
use marquee_error::{JsonError, MarqueeResult, StorageError, StorageErrorKind};
use marquee_interface::{ChatTarget, UserId};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Promo channel mention appended to captions.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct PromoConfig {
    /// Channel to advertise, e.g. `@movie_drops`
    channel: String,
    /// Optional line shown above the channel
    #[serde(default)]
    text: Option<String>,
}

impl PromoConfig {
    /// Create a promo config.
    pub fn new(channel: impl Into<String>, text: Option<String>) -> Self {
        Self {
            channel: channel.into(),
            text: text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
        }
    }

    /// Caption footer for this promo.
    ///
    /// # Examples
    ///
    /// ```
    /// use marquee_publish::PromoConfig;
    ///
    /// let promo = PromoConfig::new("@drops", None);
    /// assert_eq!(promo.footer(), "📢 Join @drops");
    /// ```
    pub fn footer(&self) -> String {
        match &self.text {
            Some(text) => format!("📢 {}\n👉 {}", text, self.channel),
            None => format!("📢 Join {}", self.channel),
        }
    }
}

/// One preference category: a user id to value map stored in a JSON file.
///
/// The whole map is loaded on open. Every change rewrites the file through a
/// temporary sibling and a rename, and returns only after the rename. Writers
/// are serialized; readers see the last successfully written map.
#[derive(Debug)]
pub struct JsonPreferenceStore<V> {
    path: PathBuf,
    entries: RwLock<BTreeMap<u64, V>>,
    writer: tokio::sync::Mutex<()>,
}

impl<V> JsonPreferenceStore<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    /// Open or create the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the file cannot
    /// be read, or its contents are not a valid map.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> MarqueeResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            })?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents).map_err(|e| {
                    StorageError::new(StorageErrorKind::Corrupt {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    })
                })?
            }
        } else {
            BTreeMap::new()
        };

        debug!(entries = entries.len(), "Loaded preference store");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
            writer: tokio::sync::Mutex::new(()),
        })
    }

    /// File backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored value for `user`.
    pub fn get(&self, user: UserId) -> Option<V> {
        self.entries.read().get(&user.0).cloned()
    }

    /// Stored value for `user`, or the default.
    pub fn get_or(&self, user: UserId, default: V) -> V {
        self.get(user).unwrap_or(default)
    }

    /// Set and persist the value for `user`.
    ///
    /// The new value becomes visible only once the file has been replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written; the store keeps its
    /// previous contents.
    pub async fn set(&self, user: UserId, value: V) -> MarqueeResult<()> {
        let _writer = self.writer.lock().await;
        let mut next = self.entries.read().clone();
        next.insert(user.0, value);
        self.persist(&next).await?;
        *self.entries.write() = next;
        info!(user_id = %user, path = %self.path.display(), "Preference saved");
        Ok(())
    }

    /// Remove and persist; whether a value existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written; the value stays.
    pub async fn remove(&self, user: UserId) -> MarqueeResult<bool> {
        let _writer = self.writer.lock().await;
        let mut next = self.entries.read().clone();
        if next.remove(&user.0).is_none() {
            return Ok(false);
        }
        self.persist(&next).await?;
        *self.entries.write() = next;
        info!(user_id = %user, path = %self.path.display(), "Preference removed");
        Ok(true)
    }

    async fn persist(&self, entries: &BTreeMap<u64, V>) -> MarqueeResult<()> {
        let contents = serde_json::to_string_pretty(entries)
            .map_err(|e| JsonError::new(format!("Failed to serialize preferences: {}", e)))?;

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        tokio::fs::write(&temp, contents).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!("{}: {}", temp.display(), e)))
        })?;
        tokio::fs::rename(&temp, &self.path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp.display(),
                self.path.display(),
                e
            )))
        })?;
        debug!(path = %self.path.display(), entries = entries.len(), "Preference file replaced");
        Ok(())
    }
}

/// All preference categories.
#[derive(Debug, Getters)]
pub struct Preferences {
    /// Destination channel for publication
    channels: JsonPreferenceStore<ChatTarget>,
    /// Ad destination override for the HTML gate
    ad_links: JsonPreferenceStore<String>,
    /// Promo footer appended to captions
    promos: JsonPreferenceStore<PromoConfig>,
}

impl Preferences {
    /// Open all stores under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if any store fails to open.
    pub fn open(dir: impl AsRef<Path>) -> MarqueeResult<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            channels: JsonPreferenceStore::open(dir.join("channels.json"))?,
            ad_links: JsonPreferenceStore::open(dir.join("ad_links.json"))?,
            promos: JsonPreferenceStore::open(dir.join("promos.json"))?,
        })
    }
}
