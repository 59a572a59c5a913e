//! # Métricas do Controlador
//!
//! Contadores acumulados desde o início do processo, expostos em
//! `GET /api/metrics` e logados periodicamente.
//!
//! | Métrica | Fonte |
//! |---------|-------|
//! | Ciclos / degradados / paradas de emergência | [`CycleReport::outcome`] |
//! | Disparos por regra | `trace.fired` |
//! | Contagem por fase | `Command::suggested_phase` |
//! | Duração do último ciclo / média | [`CycleReport::duration`] |

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use crate::controller::CycleReport;
use crate::core::ParkingPhase;

#[derive(Default)]
pub struct ControllerMetrics {
    cycles: u64,
    degraded: u64,
    emergency_stops: u64,
    rule_firings: BTreeMap<String, u64>,
    phase_counts: BTreeMap<ParkingPhase, u64>,
    last_cycle: Duration,
    total_time: Duration,
}

/// Cópia serializável das métricas.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub cycles: u64,
    pub degraded_cycles: u64,
    pub emergency_stops: u64,
    pub last_cycle_us: u64,
    pub mean_cycle_us: u64,
    pub rule_firings: BTreeMap<String, u64>,
    pub phase_counts: BTreeMap<ParkingPhase, u64>,
}

impl ControllerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contabiliza um ciclo.
    pub fn record(&mut self, report: &CycleReport) {
        self.cycles += 1;
        self.last_cycle = report.duration;
        self.total_time += report.duration;

        if report.outcome.is_degraded() {
            self.degraded += 1;
            return;
        }

        let command = report.outcome.command();
        if command.emergency_stop {
            self.emergency_stops += 1;
        }
        *self.phase_counts.entry(command.suggested_phase).or_insert(0) += 1;
        for rule in &report.trace.fired {
            *self.rule_firings.entry(rule.name.clone()).or_insert(0) += 1;
        }
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn mean_cycle(&self) -> Duration {
        match u32::try_from(self.cycles) {
            Ok(n) if n > 0 => self.total_time / n,
            _ => Duration::ZERO,
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles: self.cycles,
            degraded_cycles: self.degraded,
            emergency_stops: self.emergency_stops,
            last_cycle_us: self.last_cycle.as_micros() as u64,
            mean_cycle_us: self.mean_cycle().as_micros() as u64,
            rule_firings: self.rule_firings.clone(),
            phase_counts: self.phase_counts.clone(),
        }
    }

    /// Linha de sumário para log.
    ///
    /// Formato: `"120 ciclos | 2 degradados | 1 emergências | último 85µs | média 70µs"`
    pub fn summary_line(&self) -> String {
        format!(
            "{} ciclos | {} degradados | {} emergências | último {}µs | média {}µs",
            self.cycles,
            self.degraded,
            self.emergency_stops,
            self.last_cycle.as_micros(),
            self.mean_cycle().as_micros(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, CycleFault, CycleOutcome};
    use crate::controller::{CycleTrace, FiredRuleSummary};

    fn report(outcome: CycleOutcome, fired: &[&str], micros: u64) -> CycleReport {
        let trace = CycleTrace {
            fired: fired
                .iter()
                .map(|name| FiredRuleSummary {
                    name: name.to_string(),
                    phase: ParkingPhase::Searching,
                    strength: 0.5,
                    description: String::new(),
                })
                .collect(),
            ..CycleTrace::default()
        };
        CycleReport {
            outcome,
            trace,
            duration: Duration::from_micros(micros),
        }
    }

    #[test]
    fn counts_cycles_rules_and_phases() {
        let mut metrics = ControllerMetrics::new();
        let stop = Command {
            emergency_stop: true,
            brake: true,
            suggested_phase: ParkingPhase::Emergency,
            ..Command::neutral()
        };
        metrics.record(&report(CycleOutcome::Ok(Command::neutral()), &["cruise"], 100));
        metrics.record(&report(CycleOutcome::Ok(stop), &["cruise", "stop"], 300));
        metrics.record(&report(CycleOutcome::degraded(CycleFault::NotConfigured), &[], 200));

        let snap = metrics.snapshot();
        assert_eq!(snap.cycles, 3);
        assert_eq!(snap.degraded_cycles, 1);
        assert_eq!(snap.emergency_stops, 1);
        assert_eq!(snap.rule_firings["cruise"], 2);
        assert_eq!(snap.phase_counts[&ParkingPhase::Emergency], 1);
        assert_eq!(snap.last_cycle_us, 200);
        assert_eq!(snap.mean_cycle_us, 200);
    }

    #[test]
    fn empty_metrics_have_zero_mean() {
        let metrics = ControllerMetrics::new();
        assert_eq!(metrics.mean_cycle(), Duration::ZERO);
        assert!(metrics.summary_line().starts_with("0 ciclos"));
    }
}
