use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn from_prefers_dark(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Class set on the root `<html>` element.
    pub fn root_class(self) -> &'static str {
        match self {
            Theme::Light => "",
            Theme::Dark => "dark",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => anyhow::bail!("unknown theme {other:?} (expected dark or light)"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme: Option<Theme>,
}

/// The persisted `theme` preference.
///
/// `init` loads the file once; reads are served from memory and every write
/// goes straight back to disk.
#[derive(Debug)]
pub struct ThemeStore {
    path: PathBuf,
    current: Mutex<Theme>,
}

impl ThemeStore {
    /// Saved value if there is one, otherwise the system preference.
    pub fn init(path: impl Into<PathBuf>, prefers_dark: bool) -> anyhow::Result<Self> {
        let path = path.into();
        let saved = load(&path)?.theme;
        let theme = saved.unwrap_or_else(|| Theme::from_prefers_dark(prefers_dark));
        tracing::debug!(path = %path.display(), theme = theme.as_str(), saved = saved.is_some(), "theme store initialised");

        Ok(Self {
            path,
            current: Mutex::new(theme),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn theme(&self) -> Theme {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, theme: Theme) -> anyhow::Result<()> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        save(&self.path, theme)?;
        *current = theme;
        Ok(())
    }

    pub fn toggle(&self) -> anyhow::Result<Theme> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let next = current.toggled();
        save(&self.path, next)?;
        *current = next;
        tracing::info!(theme = next.as_str(), "theme toggled");
        Ok(next)
    }

    /// What is on disk right now, bypassing the in-memory copy.
    pub fn stored(&self) -> anyhow::Result<Option<Theme>> {
        Ok(load(&self.path)?.theme)
    }
}

fn load(path: &Path) -> anyhow::Result<PersistedSettings> {
    if !path.exists() {
        return Ok(PersistedSettings::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse settings file {}", path.display()))
}

fn save(path: &Path, theme: Theme) -> anyhow::Result<()> {
    let mut settings = load(path)?;
    settings.theme = Some(theme);

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create settings directory {}", dir.display()))?;
    }

    let content = serde_json::to_string_pretty(&settings).context("failed to serialize settings")?;

    // Write to a sibling temp file, then rename over the original.
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content)
        .with_context(|| format!("failed to write settings file {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace settings file {}", path.display()))?;
    Ok(())
}
