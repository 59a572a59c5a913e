//! # Diário de Decisões
//!
//! Histórico limitado dos ciclos avaliados: qual fase, qual regra
//! dominou, o comando emitido e onde o carro estava. Serve para
//! inspeção e para exportar um log JSON ao final de uma sessão.
//!
//! ```text
//! ciclo ─► DecisionRecord ─► DecisionJournal (anel, capacidade N)
//!                                 │
//!                                 ├── rule_usage()  → contagem + %
//!                                 └── persistence::export_journal()
//! ```
//!
//! O diário é só observação: nada aqui volta para a inferência.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::controller::CycleReport;
use crate::core::ParkingPhase;
use crate::perception::{CrispSnapshot, Vec2};

/// Uma decisão registrada.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub phase: ParkingPhase,
    /// Regra de maior força no ciclo, se alguma disparou.
    pub rule: Option<String>,
    pub reasoning: String,
    pub throttle: f64,
    pub steering: f64,
    pub brake: bool,
    pub emergency: bool,
    pub degraded: bool,
    pub position: Vec2,
    pub heading: f64,
}

impl DecisionRecord {
    pub fn from_report(snapshot: &CrispSnapshot, report: &CycleReport) -> Self {
        let command = report.outcome.command();
        let dominant = report.trace.dominant_rule();

        let reasoning = match (report.outcome.reason(), dominant) {
            (Some(fault), _) => format!("Ciclo degradado: {}", fault),
            (None, Some(rule)) if !rule.description.is_empty() => rule.description.clone(),
            (None, Some(rule)) => format!("Regra '{}' com força {:.2}", rule.name, rule.strength),
            (None, None) => "Nenhuma regra disparou".to_string(),
        };

        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            phase: command.suggested_phase,
            rule: dominant.map(|r| r.name.clone()),
            reasoning,
            throttle: command.throttle,
            steering: command.steering,
            brake: command.brake,
            emergency: command.emergency_stop,
            degraded: report.outcome.is_degraded(),
            position: snapshot.position,
            heading: snapshot.heading,
        }
    }
}

/// Uso de uma regra no diário.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RuleUsage {
    pub rule: String,
    pub count: usize,
    pub percentage: f64,
}

/// Anel de decisões com capacidade fixa; a mais antiga sai primeiro.
pub struct DecisionJournal {
    records: VecDeque<DecisionRecord>,
    capacity: usize,
}

impl DecisionJournal {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, record: DecisionRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// As `n` decisões mais recentes, da mais nova para a mais antiga.
    pub fn recent(&self, n: usize) -> Vec<DecisionRecord> {
        self.records.iter().rev().take(n).cloned().collect()
    }

    /// Quantas vezes cada regra dominou, com percentual sobre o total de
    /// decisões. Ordenado por contagem decrescente, depois por nome.
    pub fn rule_usage(&self) -> Vec<RuleUsage> {
        let total = self.records.len();
        if total == 0 {
            return Vec::new();
        }

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in &self.records {
            if let Some(rule) = &record.rule {
                *counts.entry(rule.as_str()).or_insert(0) += 1;
            }
        }

        let mut usage: Vec<RuleUsage> = counts
            .into_iter()
            .map(|(rule, count)| RuleUsage {
                rule: rule.to_string(),
                count,
                percentage: count as f64 / total as f64 * 100.0,
            })
            .collect();
        usage.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.rule.cmp(&b.rule)));
        usage
    }

    pub fn phase_counts(&self) -> BTreeMap<ParkingPhase, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.phase).or_insert(0) += 1;
        }
        counts
    }

    /// Cópia de todas as decisões, da mais antiga para a mais nova.
    pub fn to_vec(&self) -> Vec<DecisionRecord> {
        self.records.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rule: Option<&str>, phase: ParkingPhase) -> DecisionRecord {
        DecisionRecord {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            phase,
            rule: rule.map(str::to_string),
            reasoning: String::new(),
            throttle: 0.0,
            steering: 0.0,
            brake: false,
            emergency: false,
            degraded: false,
            position: Vec2::default(),
            heading: 0.0,
        }
    }

    #[test]
    fn ring_evicts_oldest() {
        let mut journal = DecisionJournal::new(2);
        journal.push(record(Some("a"), ParkingPhase::Searching));
        journal.push(record(Some("b"), ParkingPhase::Searching));
        journal.push(record(Some("c"), ParkingPhase::Approaching));
        assert_eq!(journal.len(), 2);
        let rules: Vec<_> = journal.to_vec().into_iter().filter_map(|r| r.rule).collect();
        assert_eq!(rules, vec!["b", "c"]);
        assert_eq!(journal.recent(1)[0].rule.as_deref(), Some("c"));
    }

    #[test]
    fn rule_usage_counts_and_percentages() {
        let mut journal = DecisionJournal::new(10);
        journal.push(record(Some("cruise"), ParkingPhase::Searching));
        journal.push(record(Some("cruise"), ParkingPhase::Searching));
        journal.push(record(Some("stop"), ParkingPhase::Emergency));
        journal.push(record(None, ParkingPhase::Searching));

        let usage = journal.rule_usage();
        assert_eq!(usage.len(), 2);
        assert_eq!(usage[0].rule, "cruise");
        assert_eq!(usage[0].count, 2);
        assert!((usage[0].percentage - 50.0).abs() < 1e-9);
        assert!((usage[1].percentage - 25.0).abs() < 1e-9);

        let phases = journal.phase_counts();
        assert_eq!(phases[&ParkingPhase::Searching], 3);
        assert_eq!(phases[&ParkingPhase::Emergency], 1);
    }

    #[test]
    fn empty_journal_has_no_usage() {
        let journal = DecisionJournal::new(0);
        assert_eq!(journal.capacity(), 1);
        assert!(journal.rule_usage().is_empty());
    }
}
