//! Profile resolution and switching

use crate::settings::{Profile, SettingsStore};
use crate::surface::UserSurface;
use crate::{Error, Result};

/// Resolves the active profile and edits the profile list.
pub struct ProfileManager<'a> {
    settings: &'a SettingsStore,
}

impl<'a> ProfileManager<'a> {
    pub fn new(settings: &'a SettingsStore) -> Self {
        Self { settings }
    }

    /// The profile named by the local `current_profile`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidProfile`] when the name is blank or not in the shared
    /// profile list. Callers treat this as "not configured".
    pub fn get_current(&self) -> Result<Profile> {
        let local = self.settings.get_local()?;
        let name = local.current_profile.trim();
        if name.is_empty() {
            return Err(Error::InvalidProfile {
                name: String::new(),
                reason: "no profile selected".into(),
            });
        }

        let shared = self.settings.get_shared()?;
        shared.find(name).cloned().ok_or_else(|| Error::InvalidProfile {
            name: name.to_string(),
            reason: "not found in shared settings".into(),
        })
    }

    pub fn list(&self) -> Result<Vec<Profile>> {
        Ok(self.settings.get_shared()?.profiles)
    }

    /// Names of every profile except the current one.
    pub fn others(&self) -> Result<Vec<String>> {
        let current = self.settings.get_local()?.current_profile;
        Ok(self
            .list()?
            .into_iter()
            .map(|profile| profile.name)
            .filter(|name| *name != current)
            .collect())
    }

    /// Make `name` the current profile, or ask `surface` to pick one of the
    /// other profiles when no name is given. Returns the selected name.
    pub fn switch(&self, name: Option<&str>, surface: &dyn UserSurface) -> Result<String> {
        let name = match name {
            Some(name) => name.to_string(),
            None => {
                let others = self.others()?;
                if others.is_empty() {
                    return Err(Error::InvalidProfile {
                        name: String::new(),
                        reason: "there are no other profiles".into(),
                    });
                }
                surface.select_profile(&others).ok_or(Error::Cancelled)?
            }
        };

        if self.settings.get_shared()?.find(&name).is_none() {
            return Err(Error::InvalidProfile {
                name,
                reason: "not found in shared settings".into(),
            });
        }

        let mut local = self.settings.get_local()?;
        local.current_profile = name.clone();
        self.settings.set_local(&local)?;
        tracing::info!(profile = %name, "Switched profile");
        Ok(name)
    }

    /// Add a profile. Names are unique and branches must be valid git
    /// branch names.
    pub fn create(&self, name: &str, branch: &str) -> Result<Profile> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidProfile {
                name: String::new(),
                reason: "name is empty".into(),
            });
        }
        syncify_git::validate_branch_name(branch).map_err(|e| Error::InvalidProfile {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        let mut shared = self.settings.get_shared()?;
        if shared.find(name).is_some() {
            return Err(Error::InvalidProfile {
                name: name.to_string(),
                reason: "a profile with this name already exists".into(),
            });
        }

        let profile = Profile::new(name, branch);
        shared.profiles.push(profile.clone());
        self.settings.set_shared(&shared)?;
        tracing::info!(profile = %name, branch = %branch, "Created profile");
        Ok(profile)
    }

    /// Overwrite the current profile's extension list.
    pub fn update(&self, extensions: &[String]) -> Result<Profile> {
        let current = self.get_current()?;
        let mut shared = self.settings.get_shared()?;
        let profile = shared
            .find_mut(&current.name)
            .ok_or_else(|| Error::InvalidProfile {
                name: current.name.clone(),
                reason: "not found in shared settings".into(),
            })?;

        let mut extensions = extensions.to_vec();
        extensions.sort();
        extensions.dedup();
        profile.extensions = extensions;
        let updated = profile.clone();

        self.settings.set_shared(&shared)?;
        Ok(updated)
    }
}
