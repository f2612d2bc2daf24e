//! Server settings and compiler discovery.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Configuration section pulled from the editor
pub const CONFIG_SECTION: &str = "volta";

/// Executable name looked up on `PATH`
pub const COMPILER_NAME: &str = "volta";

const DEFAULT_MAX_DIAGNOSTICS: usize = 100;

/// Per-document (or global) settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(alias = "maxNumberOfProblems")]
    pub max_diagnostics: usize,
    pub compiler_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
            compiler_path: None,
        }
    }
}

impl Settings {
    /// Decode a `volta` settings object. `null` means "not configured".
    pub fn from_value(value: Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        match serde_json::from_value(value) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!("Ignoring malformed settings: {e}");
                None
            }
        }
    }

    /// Decode the payload of `workspace/didChangeConfiguration`, which may
    /// wrap the section under a `volta` key.
    pub fn from_change(mut value: Value) -> Option<Self> {
        match value.get_mut(CONFIG_SECTION) {
            Some(section) => Self::from_value(section.take()),
            None => Self::from_value(value),
        }
    }

    /// Pulled editor settings layered over `base`: an unset or blank
    /// compiler path keeps the one from `base`.
    pub fn over(mut self, base: &Settings) -> Self {
        if self.explicit_compiler().is_none() {
            self.compiler_path = base.compiler_path.clone();
        }
        self
    }

    /// Configured compiler path, ignoring blank entries
    pub fn explicit_compiler(&self) -> Option<&str> {
        self.compiler_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Resolves which compiler executable to run for a set of settings
pub trait CompilerLocator: Send + Sync {
    fn locate(&self, settings: &Settings) -> Option<PathBuf>;
}

/// Looks at the configured path, then `PATH`, then well-known install
/// locations. Only executable files are accepted.
pub struct SystemLocator {
    home: Option<PathBuf>,
}

impl SystemLocator {
    pub fn new(home: Option<PathBuf>) -> Self {
        Self { home }
    }

    pub fn from_env() -> Self {
        Self::new(dirs::home_dir())
    }

    fn expand_tilde(&self, path: &str) -> PathBuf {
        match (path.strip_prefix("~/"), &self.home) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(path),
        }
    }

    fn conventional_locations(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(home) = &self.home {
            candidates.push(home.join(".volta/bin").join(COMPILER_NAME));
            candidates.push(home.join(".local/bin").join(COMPILER_NAME));
            candidates.push(home.join(".cargo/bin").join(COMPILER_NAME));
        }
        for dir in ["/usr/local/bin", "/opt/homebrew/bin", "/usr/bin"] {
            candidates.push(Path::new(dir).join(COMPILER_NAME));
        }
        candidates
    }
}

impl CompilerLocator for SystemLocator {
    fn locate(&self, settings: &Settings) -> Option<PathBuf> {
        if let Some(explicit) = settings.explicit_compiler() {
            let path = self.expand_tilde(explicit);
            match which::which(&path) {
                Ok(found) => return Some(found),
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    "Configured compiler is not executable: {e}"
                ),
            }
        }

        if let Ok(found) = which::which(COMPILER_NAME) {
            return Some(found);
        }

        self.conventional_locations()
            .into_iter()
            .find_map(|candidate| which::which(candidate).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.max_diagnostics, 100);
        assert_eq!(settings.compiler_path, None);
    }

    #[test]
    fn test_from_value_camel_case() {
        let settings =
            Settings::from_value(json!({"maxDiagnostics": 5, "compilerPath": "/opt/volta"}))
                .unwrap();
        assert_eq!(settings.max_diagnostics, 5);
        assert_eq!(settings.explicit_compiler(), Some("/opt/volta"));
    }

    #[test]
    fn test_from_value_alias_and_defaults() {
        let settings = Settings::from_value(json!({"maxNumberOfProblems": 7})).unwrap();
        assert_eq!(settings.max_diagnostics, 7);
        assert_eq!(settings.compiler_path, None);
    }

    #[test]
    fn test_from_value_null_and_malformed() {
        assert_eq!(Settings::from_value(Value::Null), None);
        assert_eq!(Settings::from_value(json!({"maxDiagnostics": "many"})), None);
    }

    #[test]
    fn test_from_change_unwraps_section() {
        let settings =
            Settings::from_change(json!({"volta": {"compilerPath": "~/bin/volta"}})).unwrap();
        assert_eq!(settings.explicit_compiler(), Some("~/bin/volta"));

        let flat = Settings::from_change(json!({"maxDiagnostics": 3})).unwrap();
        assert_eq!(flat.max_diagnostics, 3);
    }

    #[test]
    fn test_blank_compiler_path_is_unset() {
        let settings = Settings {
            compiler_path: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.explicit_compiler(), None);
    }

    #[test]
    fn test_pulled_settings_keep_base_compiler() {
        let base = Settings {
            max_diagnostics: 100,
            compiler_path: Some("/opt/volta/bin/volta".to_string()),
        };

        let pulled = Settings::from_value(json!({"maxDiagnostics": 20, "compilerPath": null}))
            .unwrap()
            .over(&base);
        assert_eq!(pulled.max_diagnostics, 20);
        assert_eq!(pulled.explicit_compiler(), Some("/opt/volta/bin/volta"));

        let blank = Settings::from_value(json!({"compilerPath": " "})).unwrap().over(&base);
        assert_eq!(blank.explicit_compiler(), Some("/opt/volta/bin/volta"));

        let own = Settings::from_value(json!({"compilerPath": "/usr/bin/volta"}))
            .unwrap()
            .over(&base);
        assert_eq!(own.explicit_compiler(), Some("/usr/bin/volta"));
    }

    #[test]
    fn test_expand_tilde() {
        let locator = SystemLocator::new(Some(PathBuf::from("/home/dev")));
        assert_eq!(
            locator.expand_tilde("~/tools/volta"),
            PathBuf::from("/home/dev/tools/volta")
        );
        assert_eq!(locator.expand_tilde("/abs/volta"), PathBuf::from("/abs/volta"));
    }

    #[test]
    fn test_conventional_locations_order() {
        let locator = SystemLocator::new(Some(PathBuf::from("/home/dev")));
        let locations = locator.conventional_locations();
        assert_eq!(locations[0], PathBuf::from("/home/dev/.volta/bin/volta"));
        assert_eq!(locations.last(), Some(&PathBuf::from("/usr/bin/volta")));
    }

    #[cfg(unix)]
    #[test]
    fn test_explicit_executable_is_used() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("volta");
        std::fs::write(&exe, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let locator = SystemLocator::new(None);
        let settings = Settings {
            compiler_path: Some(exe.to_string_lossy().into_owned()),
            ..Default::default()
        };
        assert_eq!(locator.locate(&settings), Some(exe));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_explicit_path_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("volta");
        std::fs::write(&file, "not a program").unwrap();

        let locator = SystemLocator::new(None);
        let settings = Settings {
            compiler_path: Some(file.to_string_lossy().into_owned()),
            ..Default::default()
        };
        assert_ne!(locator.locate(&settings), Some(file));
    }
}
