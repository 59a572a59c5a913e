//! # Configuração do Processo
//!
//! [`Settings`] reúne tudo que o binário precisa para subir. Cada campo tem
//! um padrão e pode ser sobrescrito por variável de ambiente:
//!
//! | Variável | Campo | Padrão |
//! |----------|-------|--------|
//! | `PARKING_ADDR` | `addr` | `0.0.0.0:3000` |
//! | `PARKING_KB_PATH` | `kb_path` | `data/knowledge_base.json` |
//! | `PARKING_JOURNAL_PATH` | `journal_dir` | `data` |
//! | `PARKING_JOURNAL_CAPACITY` | `journal_capacity` | `500` |
//! | `PARKING_SLOWDOWN_DISTANCE` | `derived.slowdown_distance` | `15.0` |

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::fuzzifier::DerivedSettings;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub addr: String,
    pub kb_path: PathBuf,
    /// Diretório onde os diários exportados são gravados.
    pub journal_dir: PathBuf,
    pub journal_capacity: usize,
    /// Capacidade do canal broadcast de eventos SSE.
    pub events_capacity: usize,
    pub derived: DerivedSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".into(),
            kb_path: PathBuf::from("data/knowledge_base.json"),
            journal_dir: PathBuf::from("data"),
            journal_capacity: 500,
            events_capacity: 256,
            derived: DerivedSettings::default(),
        }
    }
}

impl Settings {
    /// Padrões + variáveis de ambiente do processo.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Padrões + sobrescritas vindas de `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(addr) = lookup("PARKING_ADDR") {
            settings.addr = addr;
        }
        if let Some(path) = lookup("PARKING_KB_PATH") {
            settings.kb_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("PARKING_JOURNAL_PATH") {
            settings.journal_dir = PathBuf::from(dir);
        }
        if let Some(capacity) = lookup("PARKING_JOURNAL_CAPACITY") {
            settings.journal_capacity = capacity
                .trim()
                .parse()
                .with_context(|| format!("PARKING_JOURNAL_CAPACITY inválido: '{}'", capacity))?;
        }
        if let Some(distance) = lookup("PARKING_SLOWDOWN_DISTANCE") {
            let distance: f64 = distance
                .trim()
                .parse()
                .with_context(|| format!("PARKING_SLOWDOWN_DISTANCE inválido: '{}'", distance))?;
            anyhow::ensure!(
                distance.is_finite() && distance > 0.0,
                "PARKING_SLOWDOWN_DISTANCE deve ser positivo"
            );
            settings.derived.slowdown_distance = distance;
        }

        Ok(settings)
    }
}
