//! # Command — Intenção de Controle de um Ciclo
//!
//! [`Command`] é o que sai do controlador para a camada de atuação.
//! [`CycleOutcome`] diz se o ciclo correu normalmente ou se degradou para o
//! comando neutro por causa de uma [`CycleFault`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::ParkingPhase;

/// Comando crisp. `throttle` e `steering` em `[-1, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub throttle: f64,
    pub steering: f64,
    pub brake: bool,
    pub emergency_stop: bool,
    pub suggested_phase: ParkingPhase,
}

impl Command {
    /// Comando neutro: tudo zerado, sem freio, fase `Searching`.
    pub fn neutral() -> Self {
        Self {
            throttle: 0.0,
            steering: 0.0,
            brake: false,
            emergency_stop: false,
            suggested_phase: ParkingPhase::Searching,
        }
    }
}

impl Default for Command {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Falha local a um ciclo. Nunca persiste para o ciclo seguinte.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CycleFault {
    #[error("controlador sem base de conhecimento configurada")]
    NotConfigured,

    #[error("snapshot inválido: {0}")]
    InvalidSnapshot(String),

    #[error("falha ao avaliar a regra '{rule}': {reason}")]
    Evaluation { rule: String, reason: String },

    #[error("saída '{output}' defuzzificada para valor não finito")]
    NonFiniteOutput { output: String },
}

/// Resultado de um ciclo de controle.
#[derive(Clone, Debug, PartialEq)]
pub enum CycleOutcome {
    Ok(Command),
    /// O ciclo falhou e o comando é o neutro.
    Degraded { command: Command, reason: CycleFault },
}

impl CycleOutcome {
    pub fn degraded(reason: CycleFault) -> Self {
        CycleOutcome::Degraded {
            command: Command::neutral(),
            reason,
        }
    }

    pub fn command(&self) -> &Command {
        match self {
            CycleOutcome::Ok(command) => command,
            CycleOutcome::Degraded { command, .. } => command,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, CycleOutcome::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&CycleFault> {
        match self {
            CycleOutcome::Ok(_) => None,
            CycleOutcome::Degraded { reason, .. } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_outcome_carries_neutral_command() {
        let outcome = CycleOutcome::degraded(CycleFault::NotConfigured);
        assert!(outcome.is_degraded());
        assert_eq!(*outcome.command(), Command::neutral());
        assert_eq!(outcome.reason(), Some(&CycleFault::NotConfigured));
    }

    #[test]
    fn fault_messages() {
        let fault = CycleFault::Evaluation {
            rule: "front_emergency".into(),
            reason: "NaN".into(),
        };
        assert_eq!(fault.to_string(), "falha ao avaliar a regra 'front_emergency': NaN");
    }
}
