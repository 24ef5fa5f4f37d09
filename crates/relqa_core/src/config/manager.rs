//! Settings file handling.
//!
//! The file is created with defaults on first use and rewritten whenever it
//! is missing keys or carries tables this version does not know. Every
//! write goes through a temp file and a rename.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::DocumentMut;

use super::settings::{ConfigSection, Settings};

/// Errors from reading or writing the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config is not valid TOML: {0}")]
    Syntax(#[from] toml_edit::TomlError),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Owns the settings file path and the settings loaded from it.
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Manager for `config_path`; nothing is read until `load_or_create`.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Consume the manager, keeping the loaded settings.
    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Read the file, or write the defaults when it does not exist.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            tracing::info!("Creating default config at {}", self.config_path.display());
            self.settings = Settings::default();
            return self.save();
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;

        if needs_rewrite(&content, &self.settings)? {
            tracing::debug!("Normalizing config {}", self.config_path.display());
            self.save()?;
        }
        Ok(())
    }

    /// Create the log and diagnostics folders named in the settings.
    pub fn ensure_dirs_exist(&self) -> ConfigResult<()> {
        let paths = &self.settings.paths;
        fs::create_dir_all(&paths.logs_folder)?;
        fs::create_dir_all(&paths.diagnostics_folder)?;
        Ok(())
    }

    /// Write the current settings, one commented table per section.
    pub fn save(&self) -> ConfigResult<()> {
        let content = render(&self.settings)?;
        write_atomically(&self.config_path, &content)?;
        Ok(())
    }
}

fn section_body(settings: &Settings, section: ConfigSection) -> ConfigResult<String> {
    let body = match section {
        ConfigSection::Paths => toml::to_string_pretty(&settings.paths)?,
        ConfigSection::Logging => toml::to_string_pretty(&settings.logging)?,
        ConfigSection::Matching => toml::to_string_pretty(&settings.matching)?,
        ConfigSection::Fingerprint => toml::to_string_pretty(&settings.fingerprint)?,
        ConfigSection::Correlation => toml::to_string_pretty(&settings.correlation)?,
        ConfigSection::Tools => toml::to_string_pretty(&settings.tools)?,
        ConfigSection::Probe => toml::to_string_pretty(&settings.probe)?,
    };
    Ok(body)
}

fn render(settings: &Settings) -> ConfigResult<String> {
    let mut out = String::from("# relqa configuration\n\n");
    for section in ConfigSection::ALL {
        out.push_str(&format!(
            "# {}\n[{}]\n{}\n",
            section.description(),
            section.table_name(),
            section_body(settings, section)?.trim_end()
        ));
        out.push('\n');
    }
    Ok(out)
}

/// True when the file has unknown tables or lacks keys that were defaulted.
fn needs_rewrite(content: &str, settings: &Settings) -> ConfigResult<bool> {
    let doc: DocumentMut = content.parse()?;
    let unknown_table = doc
        .iter()
        .any(|(key, _)| !ConfigSection::ALL.iter().any(|s| s.table_name() == key));
    if unknown_table {
        return Ok(true);
    }

    for section in ConfigSection::ALL {
        let expected: DocumentMut = section_body(settings, section)?.parse()?;
        let present = doc.get(section.table_name()).and_then(|t| t.as_table_like());
        let complete = present.is_some_and(|table| {
            expected
                .as_table()
                .iter()
                .all(|(key, _)| table.contains_key(key))
        });
        if !complete {
            return Ok(true);
        }
    }
    Ok(false)
}

fn write_atomically(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("toml.tmp");
    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)
}
