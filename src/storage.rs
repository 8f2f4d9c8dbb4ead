use crate::overlay::{ExceptionOverlay, ExceptionRecord, OverlayError};
use crate::rule::RecurrenceRule;
use crate::telltime::EventTimes;
use anyhow::Context;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Événement récurrent tel qu'enregistré sur disque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFile {
    #[serde(default)]
    pub title: String,
    /// Forme textuelle `DTSTART:...\nRRULE:...`.
    pub rule: RecurrenceRule,
    #[serde(flatten)]
    pub times: EventTimes,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<ExceptionRecord>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl EventFile {
    pub fn new<S: Into<String>>(title: S, rule: RecurrenceRule, times: EventTimes) -> Self {
        Self {
            title: title.into(),
            rule,
            times,
            timezone: default_timezone(),
            records: Vec::new(),
        }
    }

    pub fn tz(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("unknown timezone {}", self.timezone))
    }

    pub fn overlay(&self) -> Result<ExceptionOverlay, OverlayError> {
        ExceptionOverlay::from_records(self.records.iter().cloned())
    }

    /// Ajoute une exception après l'avoir validée contre la règle.
    pub fn add_record(&mut self, record: ExceptionRecord) -> Result<(), OverlayError> {
        let mut overlay = self.overlay()?;
        overlay.add_for(&self.rule, record)?;
        self.records = overlay.records();
        Ok(())
    }
}

pub trait Storage {
    /// Charge un événement depuis un support.
    fn load(&self) -> anyhow::Result<EventFile>;
    /// Sauvegarde de manière atomique.
    fn save(&self, event: &EventFile) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self { path: path.as_ref().to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<EventFile> {
        let data = fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let event: EventFile = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(event)
    }

    fn save(&self, event: &EventFile) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(event)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}
