use std::{fmt, fs, path::Path, str::FromStr};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const SETTINGS_FILE: &str = "mvc.toml";

/// What the resolver does when an action name only matches ignoring case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    Allow,
    #[default]
    Warn,
    Deny,
}

impl FromStr for FallbackPolicy {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "warn" => Ok(Self::Warn),
            "deny" => Ok(Self::Deny),
            other => anyhow::bail!("unknown action name fallback policy '{other}'"),
        }
    }
}

impl fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Allow => "allow",
            Self::Warn => "warn",
            Self::Deny => "deny",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MvcSettings {
    /// Controllers tried, in order, when the application starts.
    pub default_controllers: Vec<String>,
    pub controller_suffix: String,
    pub action_name_fallback: FallbackPolicy,
}

impl Default for MvcSettings {
    fn default() -> Self {
        Self {
            default_controllers: vec!["Default".into(), "Home".into()],
            controller_suffix: "Controller".into(),
            action_name_fallback: FallbackPolicy::Warn,
        }
    }
}

pub fn load_settings() -> anyhow::Result<MvcSettings> {
    load_settings_from(Path::new(SETTINGS_FILE))
}

/// Reads `path` when it exists, then applies environment overrides.
pub fn load_settings_from(path: &Path) -> anyhow::Result<MvcSettings> {
    let mut settings = if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        toml::from_str::<MvcSettings>(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?
    } else {
        MvcSettings::default()
    };

    apply_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

fn apply_overrides(settings: &mut MvcSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("APP__DEFAULT_CONTROLLERS") {
        settings.default_controllers = v
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();
    }
    if let Some(v) = lookup("MVC_DEFAULT_CONTROLLER") {
        let v = v.trim().to_string();
        if !v.is_empty() {
            settings.default_controllers.retain(|name| name != &v);
            settings.default_controllers.insert(0, v);
        }
    }

    if let Some(v) = lookup("APP__ACTION_NAME_FALLBACK") {
        match v.parse::<FallbackPolicy>() {
            Ok(policy) => settings.action_name_fallback = policy,
            Err(err) => warn!(error = %err, "ignoring APP__ACTION_NAME_FALLBACK"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, io::Write};

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = load_settings_from(&dir.path().join(SETTINGS_FILE)).expect("settings");
        assert_eq!(settings.controller_suffix, "Controller");
        assert_eq!(settings.default_controllers, vec!["Default", "Home"]);
    }

    #[test]
    fn file_values_are_read_and_partial_files_keep_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "action_name_fallback = \"deny\"").expect("write");
        writeln!(file, "default_controllers = [\"Main\"]").expect("write");

        let settings = load_settings_from(file.path()).expect("settings");
        assert_eq!(settings.action_name_fallback, FallbackPolicy::Deny);
        assert_eq!(settings.default_controllers, vec!["Main"]);
        assert_eq!(settings.controller_suffix, "Controller");
    }

    #[test]
    fn malformed_file_is_reported_with_its_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "action_name_fallback = [").expect("write");
        let err = load_settings_from(file.path()).expect_err("parse failure");
        assert!(err.to_string().contains("failed to parse settings file"));
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut settings = MvcSettings::default();
        apply_overrides(
            &mut settings,
            env(&[
                ("APP__DEFAULT_CONTROLLERS", "Start, Home"),
                ("MVC_DEFAULT_CONTROLLER", "Home"),
                ("APP__ACTION_NAME_FALLBACK", "Allow"),
            ]),
        );
        assert_eq!(settings.default_controllers, vec!["Home", "Start"]);
        assert_eq!(settings.action_name_fallback, FallbackPolicy::Allow);
    }

    #[test]
    fn invalid_policy_override_is_ignored() {
        let mut settings = MvcSettings::default();
        apply_overrides(&mut settings, env(&[("APP__ACTION_NAME_FALLBACK", "maybe")]));
        assert_eq!(settings.action_name_fallback, FallbackPolicy::Warn);
    }
}
