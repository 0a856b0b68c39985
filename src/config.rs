//! Classifier configuration and the hot-reloadable settings file
//!
//! `ClassifierConfig` is an immutable snapshot threaded explicitly into the
//! decision engine and merger. `SettingsFile` owns the JSON file on disk:
//! load-or-create on open, `reload()` picks up edits made while a batch run
//! is in progress and reports what changed.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::Domain;

// =============================================================================
// ClassifierConfig
// =============================================================================

/// Tunable knobs for classification and merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Heuristic margin at or above which the heuristic overrides the
    /// external domain.
    #[serde(default = "default_h_threshold")]
    pub h_threshold: i32,
    #[serde(default = "default_max_objects")]
    pub max_objects: usize,
    #[serde(default = "default_max_constraints")]
    pub max_constraints: usize,
    #[serde(default = "default_max_mechanisms")]
    pub max_mechanisms: usize,
    /// Domain used when neither the heuristic nor the external annotation
    /// has an opinion.
    #[serde(default = "default_fallback_domain")]
    pub fallback_domain: Domain,
    /// Output-intent label assumed when no intent pattern matches.
    #[serde(default = "default_output_intent")]
    pub default_output_intent: String,
}

fn default_h_threshold() -> i32 {
    6
}
fn default_max_objects() -> usize {
    3
}
fn default_max_constraints() -> usize {
    4
}
fn default_max_mechanisms() -> usize {
    3
}
fn default_fallback_domain() -> Domain {
    Domain::Algebra
}
fn default_output_intent() -> String {
    "exact_value".to_string()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            h_threshold: default_h_threshold(),
            max_objects: default_max_objects(),
            max_constraints: default_max_constraints(),
            max_mechanisms: default_max_mechanisms(),
            fallback_domain: default_fallback_domain(),
            default_output_intent: default_output_intent(),
        }
    }
}

// =============================================================================
// SettingsFile
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("settings io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings parse error at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Sparse file content: only keys present in the file are applied on reload.
#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    h_threshold: Option<i32>,
    max_objects: Option<usize>,
    max_constraints: Option<usize>,
    max_mechanisms: Option<usize>,
    fallback_domain: Option<Domain>,
    default_output_intent: Option<String>,
}

/// JSON settings store that can be edited while a run is in progress.
#[derive(Debug)]
pub struct SettingsFile {
    path: PathBuf,
    current: ClassifierConfig,
}

impl SettingsFile {
    /// Open the settings file: apply the file's values over the defaults if
    /// it exists, then write the full resolved config back so every
    /// recognized key is visible on disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let mut settings = SettingsFile {
            path,
            current: ClassifierConfig::default(),
        };
        if settings.path.exists() {
            settings.apply_file()?;
        }
        settings.save()?;
        Ok(settings)
    }

    /// Current immutable snapshot.
    pub fn config(&self) -> &ClassifierConfig {
        &self.current
    }

    /// Re-read the file and apply recognized keys. Returns one
    /// `"key: old -> new"` entry per changed field; read or parse failures
    /// are logged and leave the current config untouched.
    pub fn reload(&mut self) -> Vec<String> {
        let before = self.current.clone();
        if let Err(err) = self.apply_file() {
            warn!("settings reload failed: {err}");
            self.current = before;
            return Vec::new();
        }
        let changed = diff_configs(&before, &self.current);
        if !changed.is_empty() {
            info!("settings reloaded: {}", changed.join(", "));
        }
        changed
    }

    /// Write the current values back to the file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let body = serde_json::to_string_pretty(&self.current).map_err(|source| {
            ConfigError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, body + "\n").map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn apply_file(&mut self) -> Result<(), ConfigError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        let partial: PartialConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let cfg = &mut self.current;
        if let Some(v) = partial.h_threshold {
            cfg.h_threshold = v;
        }
        if let Some(v) = partial.max_objects {
            cfg.max_objects = v;
        }
        if let Some(v) = partial.max_constraints {
            cfg.max_constraints = v;
        }
        if let Some(v) = partial.max_mechanisms {
            cfg.max_mechanisms = v;
        }
        if let Some(v) = partial.fallback_domain {
            cfg.fallback_domain = v;
        }
        if let Some(v) = partial.default_output_intent {
            cfg.default_output_intent = v;
        }
        Ok(())
    }
}

fn diff_configs(old: &ClassifierConfig, new: &ClassifierConfig) -> Vec<String> {
    let mut changed = Vec::new();
    if old.h_threshold != new.h_threshold {
        changed.push(format!("h_threshold: {} -> {}", old.h_threshold, new.h_threshold));
    }
    if old.max_objects != new.max_objects {
        changed.push(format!("max_objects: {} -> {}", old.max_objects, new.max_objects));
    }
    if old.max_constraints != new.max_constraints {
        changed.push(format!(
            "max_constraints: {} -> {}",
            old.max_constraints, new.max_constraints
        ));
    }
    if old.max_mechanisms != new.max_mechanisms {
        changed.push(format!(
            "max_mechanisms: {} -> {}",
            old.max_mechanisms, new.max_mechanisms
        ));
    }
    if old.fallback_domain != new.fallback_domain {
        changed.push(format!(
            "fallback_domain: {} -> {}",
            old.fallback_domain, new.fallback_domain
        ));
    }
    if old.default_output_intent != new.default_output_intent {
        changed.push(format!(
            "default_output_intent: {} -> {}",
            old.default_output_intent, new.default_output_intent
        ));
    }
    changed
}

// =============================================================================
// Tests
// =============================================================================
