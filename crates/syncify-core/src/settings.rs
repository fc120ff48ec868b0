//! Local and shared settings documents
//!
//! [`LocalSettings`] lives in the per-machine directory and never leaves it.
//! [`SharedSettings`] lives at the root of the synced tree so it travels
//! with the exported configuration.

use serde::{Deserialize, Serialize};
use syncify_fs::{ConfigStore, NormalizedPath};

use crate::Result;

/// File name of [`LocalSettings`] inside the local directory.
pub const LOCAL_SETTINGS_FILE: &str = "settings.json";

/// File name of [`SharedSettings`] at the root of the synced tree.
pub const SHARED_SETTINGS_FILE: &str = "syncify.json";

/// Working tree of the version-control syncer, inside the local directory.
pub const REPO_DIR: &str = "repo";

/// Which syncer moves the configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncerKind {
    /// A git remote, one branch per profile
    #[default]
    Repo,
    /// A plain folder, one subfolder per profile
    File,
}

impl std::fmt::Display for SyncerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo => f.write_str("repo"),
            Self::File => f.write_str("file"),
        }
    }
}

impl std::str::FromStr for SyncerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "repo" => Ok(Self::Repo),
            "file" => Ok(Self::File),
            other => Err(format!("unknown syncer '{other}' (expected repo or file)")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoSettings {
    /// Remote URL
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    /// Export folder
    pub path: Option<String>,
}

/// Per-machine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSettings {
    pub syncer: SyncerKind,
    pub repo: RepoSettings,
    pub file: FileSettings,
    pub current_profile: String,
    /// Gitignore-style patterns relative to the editor user directory
    pub ignored_items: Vec<String>,
    pub hostname: String,
    /// Seconds between a detected change and the automatic upload
    pub auto_upload_delay: u64,
    pub watch_settings: bool,
    pub remove_extensions: bool,
    pub sync_extensions: bool,
    pub force_upload: bool,
    pub force_download: bool,
    /// Export `keybindings.json` per operating system
    pub separate_keybindings: bool,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            syncer: SyncerKind::default(),
            repo: RepoSettings::default(),
            file: FileSettings::default(),
            current_profile: "main".to_string(),
            ignored_items: default_ignored_items(),
            hostname: default_hostname(),
            auto_upload_delay: 20,
            watch_settings: false,
            remove_extensions: true,
            sync_extensions: true,
            force_upload: false,
            force_download: false,
            separate_keybindings: false,
        }
    }
}

pub fn default_ignored_items() -> Vec<String> {
    ["workspaceStorage/", "globalStorage/", "History/", ".git/"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Hostname from `SYNCIFY_HOSTNAME`, `HOSTNAME` or `COMPUTERNAME`, else empty.
pub fn default_hostname() -> String {
    ["SYNCIFY_HOSTNAME", "HOSTNAME", "COMPUTERNAME"]
        .into_iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

/// A named configuration variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    /// Branch for the repo syncer; folder name for the file syncer
    pub branch: String,
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl Profile {
    pub fn new(name: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            branch: branch.into(),
            extensions: Vec::new(),
        }
    }
}

/// Settings shared by every machine through the synced tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedSettings {
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Default for SharedSettings {
    fn default() -> Self {
        Self {
            profiles: vec![Profile::new("main", "main")],
        }
    }
}

impl SharedSettings {
    pub fn find(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|profile| profile.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Profile> {
        self.profiles.iter_mut().find(|profile| profile.name == name)
    }
}

/// Reads and writes both settings documents.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    local_dir: NormalizedPath,
    config: ConfigStore,
}

impl SettingsStore {
    pub fn new(local_dir: NormalizedPath) -> Self {
        Self {
            local_dir,
            config: ConfigStore::new(),
        }
    }

    pub fn local_dir(&self) -> &NormalizedPath {
        &self.local_dir
    }

    pub fn local_path(&self) -> NormalizedPath {
        self.local_dir.join(LOCAL_SETTINGS_FILE)
    }

    /// Load the local settings. On first run the defaults are written back.
    pub fn get_local(&self) -> Result<LocalSettings> {
        let path = self.local_path();
        if !path.exists() {
            let settings = LocalSettings::default();
            self.set_local(&settings)?;
            tracing::info!(path = %path, "Created default local settings");
            return Ok(settings);
        }
        Ok(self.config.load(&path)?)
    }

    pub fn set_local(&self, settings: &LocalSettings) -> Result<()> {
        self.config.save(&self.local_path(), settings)?;
        Ok(())
    }

    /// Restore the local settings to their defaults.
    pub fn reset_local(&self) -> Result<LocalSettings> {
        let settings = LocalSettings::default();
        self.set_local(&settings)?;
        Ok(settings)
    }

    /// Root of the synced tree for `local`'s syncer, if one is configured.
    pub fn shared_root(&self, local: &LocalSettings) -> Option<NormalizedPath> {
        match local.syncer {
            SyncerKind::Repo => Some(self.local_dir.join(REPO_DIR)),
            SyncerKind::File => local
                .file
                .path
                .as_deref()
                .filter(|path| !path.trim().is_empty())
                .map(NormalizedPath::new),
        }
    }

    fn shared_path(&self) -> Result<Option<NormalizedPath>> {
        let local = self.get_local()?;
        Ok(self
            .shared_root(&local)
            .map(|root| root.join(SHARED_SETTINGS_FILE)))
    }

    /// Load the shared settings; defaults when the tree has none yet.
    pub fn get_shared(&self) -> Result<SharedSettings> {
        match self.shared_path()? {
            Some(path) => Ok(self.config.load_or_default(&path)?),
            None => Ok(SharedSettings::default()),
        }
    }

    pub fn set_shared(&self, settings: &SharedSettings) -> Result<()> {
        match self.shared_path()? {
            Some(path) => {
                self.config.save(&path, settings)?;
                Ok(())
            }
            None => Err(crate::Error::not_configured("no export folder set")),
        }
    }

    /// Whether the synced tree already holds a shared settings document.
    pub fn has_shared(&self) -> Result<bool> {
        Ok(self.shared_path()?.is_some_and(|path| path.exists()))
    }
}
