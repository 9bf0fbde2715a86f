//! Profile loader
//!
//! Loads and validates YAML dialect profiles.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use vsub_core::{Syntax, SyntaxConfig};

use crate::error::ProfileError;

/// Environment variable overriding the profile directory.
pub const PROFILE_DIR_ENV: &str = "VSUB_PROFILE_DIR";

const PROFILE_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// A validated profile and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedProfile {
    pub name: String,
    pub path: PathBuf,
    pub syntax: Syntax,
}

pub struct ProfileLoader {
    profile_dir: PathBuf,
}

impl ProfileLoader {
    pub fn new(profile_dir: impl Into<PathBuf>) -> Self {
        Self {
            profile_dir: profile_dir.into(),
        }
    }

    /// Create loader from VSUB_PROFILE_DIR or default to "profiles"
    ///
    /// Path resolution order:
    /// 1. VSUB_PROFILE_DIR environment variable (explicit override)
    /// 2. Relative "profiles" path (works when running from the repo root)
    /// 3. CARGO_MANIFEST_DIR/profiles at runtime, then at compile time
    pub fn from_env() -> Self {
        if let Ok(dir) = std::env::var(PROFILE_DIR_ENV) {
            return Self::new(dir);
        }

        if Path::new("profiles").is_dir() {
            return Self::new("profiles");
        }

        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let profile_path = Path::new(&manifest_dir).join("profiles");
            if profile_path.is_dir() {
                return Self::new(profile_path);
            }
        }

        Self::new(concat!(env!("CARGO_MANIFEST_DIR"), "/profiles"))
    }

    pub fn profile_dir(&self) -> &Path {
        &self.profile_dir
    }

    /// File backing profile `name`, if any.
    pub fn path_for(&self, name: &str) -> Option<PathBuf> {
        PROFILE_EXTENSIONS
            .iter()
            .map(|ext| self.profile_dir.join(format!("{name}.{ext}")))
            .find(|path| path.is_file())
    }

    /// Profile names in the directory, sorted.
    pub fn names(&self) -> Result<Vec<String>> {
        if !self.profile_dir.is_dir() {
            return Err(ProfileError::MissingDirectory(self.profile_dir.clone()).into());
        }

        let entries = std::fs::read_dir(&self.profile_dir)
            .with_context(|| format!("Failed to read {}", self.profile_dir.display()))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to read {}", self.profile_dir.display()))?
                .path();
            let is_profile = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| PROFILE_EXTENSIONS.contains(&ext));
            if !is_profile {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Read and deserialize a profile without validating its axes.
    pub fn load_config(&self, name: &str) -> Result<SyntaxConfig> {
        let path = self.path_for(name).ok_or_else(|| ProfileError::NotFound {
            name: name.to_string(),
            dir: self.profile_dir.clone(),
        })?;
        read_config(&path)
    }

    /// Load and validate one profile.
    pub fn load(&self, name: &str) -> Result<LoadedProfile> {
        let path = self.path_for(name).ok_or_else(|| ProfileError::NotFound {
            name: name.to_string(),
            dir: self.profile_dir.clone(),
        })?;
        info!("Loading dialect profile from {}", path.display());

        let config = self.load_config(name)?;
        let syntax = Syntax::new(config).map_err(|source| ProfileError::Invalid {
            name: name.to_string(),
            source,
        })?;

        Ok(LoadedProfile {
            name: name.to_string(),
            path,
            syntax,
        })
    }

    /// Load every profile in the directory, in name order.
    pub fn load_all(&self) -> Result<Vec<LoadedProfile>> {
        let profiles = self
            .names()?
            .iter()
            .map(|name| self.load(name))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Loaded {} dialect profiles from {}",
            profiles.len(),
            self.profile_dir.display()
        );
        Ok(profiles)
    }
}

fn read_config(path: &Path) -> Result<SyntaxConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: SyntaxConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(path = %path.display(), "Profile parsed");
    Ok(config)
}

/// Parse and validate a profile held in memory.
pub fn parse_profile(name: &str, yaml: &str) -> Result<Syntax> {
    let config: SyntaxConfig = serde_yaml::from_str(yaml)
        .with_context(|| format!("Failed to parse profile '{}'", name))?;
    let syntax = Syntax::new(config).map_err(|source| ProfileError::Invalid {
        name: name.to_string(),
        source,
    })?;
    Ok(syntax)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vsub_core::{RecursiveDepth, VarAction};

    const MINIMAL: &str = r#"
named_form: true
braced_form: true
dollar_literal: use_original
var_invalid: use_original
var_unset: use_empty
"#;

    #[test]
    fn test_minimal_profile_takes_defaults() {
        let syntax = parse_profile("minimal", MINIMAL).unwrap();
        assert_eq!(syntax.dollar_escape(), None);
        assert_eq!(syntax.unclosed_brace(), VarAction::UseOriginal);
        assert_eq!(syntax.var_empty(), VarAction::UseSubstitute);
        assert_eq!(syntax.recursive_depth(), RecursiveDepth::Passes(1));
        assert!(syntax.var_case_sensitive());
    }

    #[test]
    fn test_missing_profile_is_not_found() {
        let loader = ProfileLoader::new("/nonexistent/profiles");
        let err = loader.load("compose").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProfileError>(),
            Some(ProfileError::NotFound { name, .. }) if name == "compose"
        ));
        assert!(loader.names().is_err());
    }

    #[test]
    fn test_illegal_axis_surfaces_as_syntax_error() {
        let yaml = MINIMAL.replace("var_unset: use_empty", "var_unset: use_escaped");
        let err = parse_profile("bad", &yaml).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProfileError>(),
            Some(ProfileError::Invalid { .. })
        ));
        assert!(err.to_string().contains("var_unset value is invalid"));
    }

    #[test]
    fn test_load_config_reads_raw_axes() {
        let loader = ProfileLoader::new(concat!(env!("CARGO_MANIFEST_DIR"), "/profiles"));
        let config = loader.load_config("compose").unwrap();
        assert_eq!(config.dollar_escape, Some('$'));
        assert_eq!(config.unclosed_brace, VarAction::Error);
        assert_eq!(config.var_invalid, VarAction::Error);

        let err = loader.load_config("missing").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProfileError>(),
            Some(ProfileError::NotFound { .. })
        ));
    }
}
