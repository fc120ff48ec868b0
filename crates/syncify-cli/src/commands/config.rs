//! Config command implementations

use colored::Colorize;
use serde_json::Value;
use syncify_core::LocalSettings;

use crate::context::AppContext;
use crate::error::{CliError, Result};

/// Print the local settings document
pub fn run_config_show(app: &AppContext) -> Result<()> {
    let local = app.sync_context().settings.get_local()?;
    println!("{}", serde_json::to_string_pretty(&local)?);
    Ok(())
}

/// Print where the local settings live
pub fn run_config_path(app: &AppContext) -> Result<()> {
    println!("{}", app.sync_context().settings.local_path());
    Ok(())
}

/// Change one setting and save
pub fn run_config_set(app: &AppContext, key: &str, value: &str) -> Result<()> {
    let ctx = app.sync_context();
    let local = ctx.settings.get_local()?;
    let updated = apply_setting(&local, key, value)?;
    ctx.settings.set_local(&updated)?;
    tracing::info!(key = %key, "Updated local setting");
    println!("{} {} = {}", "OK".green().bold(), key.cyan(), value);
    Ok(())
}

/// Set the dotted `key` of `settings` from its command-line text.
///
/// String settings take `raw` verbatim; others parse it as JSON
/// (`true`, `45`, `["a/", "b/"]`). The result must still deserialize.
pub fn apply_setting(settings: &LocalSettings, key: &str, raw: &str) -> Result<LocalSettings> {
    let mut document = serde_json::to_value(settings)?;
    let mut slot = &mut document;
    for part in key.split('.') {
        slot = slot
            .as_object_mut()
            .and_then(|fields| fields.get_mut(part))
            .ok_or_else(|| CliError::user(format!("Unknown setting '{key}'")))?;
    }

    let value = match slot {
        Value::String(_) | Value::Null => Value::String(raw.to_string()),
        _ => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
    };
    *slot = value;

    serde_json::from_value(document)
        .map_err(|e| CliError::user(format!("Invalid value for '{key}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use syncify_core::SyncerKind;

    #[test]
    fn test_set_nested_string() {
        let local = LocalSettings::default();
        let updated = apply_setting(&local, "repo.url", "git@example.com:me/s.git").unwrap();
        assert_eq!(updated.repo.url.as_deref(), Some("git@example.com:me/s.git"));
    }

    #[test]
    fn test_set_enum_and_number() {
        let local = LocalSettings::default();
        let updated = apply_setting(&local, "syncer", "file").unwrap();
        assert_eq!(updated.syncer, SyncerKind::File);
        let updated = apply_setting(&updated, "auto_upload_delay", "45").unwrap();
        assert_eq!(updated.auto_upload_delay, 45);
    }

    #[test]
    fn test_set_list() {
        let local = LocalSettings::default();
        let updated = apply_setting(&local, "ignored_items", r#"["History/", "*.log"]"#).unwrap();
        assert_eq!(updated.ignored_items, vec!["History/", "*.log"]);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let local = LocalSettings::default();
        let error = apply_setting(&local, "repo.branch", "x").unwrap_err();
        assert!(error.to_string().contains("Unknown setting"));
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let local = LocalSettings::default();
        let error = apply_setting(&local, "watch_settings", "sometimes").unwrap_err();
        assert!(error.to_string().contains("Invalid value"));
        assert!(apply_setting(&local, "syncer", "ftp").is_err());
    }
}
