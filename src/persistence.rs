//! # Persistência — Base de Conhecimento e Diário em Disco
//!
//! - A base de conhecimento é um [`KnowledgeBaseDocument`] salvo como JSON
//!   "pretty-printed" (padrão `data/knowledge_base.json`), editável à mão.
//! - O diário de decisões é exportado sob demanda para
//!   `data/decision_log_<AAAAMMDD_HHMMSS>.json`.
//!
//! ## ⚠️ Atomicidade
//!
//! A escrita **não é atômica**: crash durante escrita pode corromper
//! o arquivo.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use crate::core::KnowledgeBaseDocument;
use crate::journal::DecisionRecord;
use crate::rules::defaults;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Falha ao criar diretório {}", parent.display()))?;
    }
    Ok(())
}

/// Salva o documento como JSON pretty-printed, criando o diretório se preciso.
pub fn save_document(path: &Path, doc: &KnowledgeBaseDocument) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(doc).context("Falha ao serializar a base de conhecimento")?;
    std::fs::write(path, json).with_context(|| format!("Falha ao escrever {}", path.display()))?;
    Ok(())
}

/// Lê o documento; `None` se o arquivo não existe.
///
/// # Erros
///
/// Arquivo existente mas ilegível ou com JSON incompatível.
pub fn load_document(path: &Path) -> Result<Option<KnowledgeBaseDocument>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path).with_context(|| format!("Falha ao ler {}", path.display()))?;
    let doc = serde_json::from_str(&json).with_context(|| format!("Falha ao desserializar {}", path.display()))?;
    Ok(Some(doc))
}

/// Lê o documento ou, se não existir, grava e devolve a base padrão.
pub fn load_or_create(path: &Path) -> Result<KnowledgeBaseDocument> {
    match load_document(path)? {
        Some(doc) => Ok(doc),
        None => {
            tracing::info!(path = %path.display(), "Nenhuma base encontrada, gravando a base padrão");
            let doc = defaults::document();
            save_document(path, &doc)?;
            Ok(doc)
        }
    }
}

/// Exporta o diário para `dir/decision_log_<timestamp>.json`.
pub fn export_journal(dir: &Path, records: &[DecisionRecord]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("Falha ao criar diretório {}", dir.display()))?;
    let filename = format!("decision_log_{}.json", Utc::now().format("%Y%m%d_%H%M%S%.3f"));
    let path = dir.join(filename);
    let json = serde_json::to_string_pretty(records).context("Falha ao serializar o diário")?;
    std::fs::write(&path, json).with_context(|| format!("Falha ao escrever {}", path.display()))?;
    tracing::info!(path = %path.display(), records = records.len(), "Diário exportado");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("parking-fuzzy-{}", Uuid::new_v4()))
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = scratch_dir();
        let path = dir.join("kb.json");
        assert!(load_document(&path).unwrap().is_none());

        let doc = load_or_create(&path).unwrap();
        assert_eq!(doc, defaults::document());
        assert_eq!(load_document(&path).unwrap(), Some(doc));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn corrupted_file_is_an_error() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("kb.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_document(&path).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn journal_export_writes_json_array() {
        let dir = scratch_dir();
        let path = export_journal(&dir, &[]).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("decision_log_") && name.ends_with(".json"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
        std::fs::remove_dir_all(&dir).ok();
    }
}
