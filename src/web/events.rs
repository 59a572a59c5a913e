//! # Eventos SSE do Controlador
//!
//! Define o enum [`DecisionEvent`], que reúne tudo o que é publicado no
//! canal broadcast e repassado aos clientes conectados em `GET /events`.
//!
//! ## Serialização
//!
//! Usa `#[serde(tag = "type")]` para produzir JSON com discriminador:
//!
//! ```json
//! { "type": "Decision", "phase": "Approaching", "rule": "approach_steer_left", ... }
//! ```

use serde::Serialize;

use crate::core::ParkingPhase;
use crate::inference::DefuzzificationMethod;
use crate::journal::DecisionRecord;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum DecisionEvent {
    /// Ciclo avaliado com sucesso.
    Decision {
        id: String,
        phase: ParkingPhase,
        /// Regra dominante, se alguma disparou.
        rule: Option<String>,
        throttle: f64,
        steering: f64,
        brake: bool,
        emergency: bool,
        duration_us: u64,
    },

    /// Ciclo degradado: comando neutro emitido.
    Degraded { id: String, reason: String },

    /// Nova base de conhecimento instalada via `PUT /api/knowledge-base`.
    Configured { rules: usize, warnings: usize },

    /// Regra ligada/desligada individualmente.
    RuleToggled { rule: String, enabled: bool },

    /// Fase inteira ligada/desligada.
    PhaseToggled {
        phase: ParkingPhase,
        enabled: bool,
        affected: usize,
    },

    /// Método de defuzzificação trocado.
    MethodChanged { method: DefuzzificationMethod },

    /// Diário exportado para disco.
    JournalExported { path: String, records: usize },
}

impl DecisionEvent {
    /// Evento correspondente a uma decisão registrada no diário.
    pub fn from_record(record: &DecisionRecord, duration_us: u64) -> Self {
        if record.degraded {
            return DecisionEvent::Degraded {
                id: record.id.to_string(),
                reason: record.reasoning.clone(),
            };
        }
        DecisionEvent::Decision {
            id: record.id.to_string(),
            phase: record.phase,
            rule: record.rule.clone(),
            throttle: record.throttle,
            steering: record.steering,
            brake: record.brake,
            emergency: record.emergency,
            duration_us,
        }
    }
}
