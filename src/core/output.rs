//! # Variáveis de Saída e Fases de Estacionamento
//!
//! O controlador produz quatro saídas fuzzy:
//!
//! | Variável | Domínio | Defuzzificação |
//! |----------|---------|----------------|
//! | `Throttle` | [-1, 1] | método configurável (centroide, ...) |
//! | `Steering` | [-1, 1] (negativo = esquerda) | método configurável |
//! | `Brake` | [0, 1] | método configurável + limiar 0.5 |
//! | `ParkingPhase` | [0, 6] | termo dominante → [`ParkingPhase`] |
//!
//! Cada termo de saída tem uma forma triangular usada **apenas** para
//! a defuzzificação: independente dos termos das variáveis de entrada.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::membership::triangular;
use super::variable::TermId;

/// Variáveis de saída: conjunto fechado.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OutputVariable {
    Throttle,
    Steering,
    Brake,
    ParkingPhase,
}

impl OutputVariable {
    pub const ALL: [OutputVariable; 4] = [
        OutputVariable::Throttle,
        OutputVariable::Steering,
        OutputVariable::Brake,
        OutputVariable::ParkingPhase,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OutputVariable::Throttle => "Throttle",
            OutputVariable::Steering => "Steering",
            OutputVariable::Brake => "Brake",
            OutputVariable::ParkingPhase => "ParkingPhase",
        }
    }

    /// Posição fixa em arrays indexados por variável de saída.
    pub fn index(&self) -> usize {
        match self {
            OutputVariable::Throttle => 0,
            OutputVariable::Steering => 1,
            OutputVariable::Brake => 2,
            OutputVariable::ParkingPhase => 3,
        }
    }
}

impl fmt::Display for OutputVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fase sugerida da manobra de estacionamento.
///
/// **Não é um estado persistido.** A cada ciclo a fase é re-derivada como
/// o termo dominante da saída `ParkingPhase`; "transições" são apenas efeito
/// da mudança dos dados de sensores entre ciclos.
///
/// ```text
/// 🔍 Searching → 🚗 Approaching → 📐 Aligning → ⏪ Reversing → 🔧 Adjusting → ✅ Completed
///                                   🚨 Emergency (a qualquer momento)
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParkingPhase {
    #[default]
    Searching,
    Approaching,
    Aligning,
    Reversing,
    Adjusting,
    Completed,
    Emergency,
}

impl ParkingPhase {
    /// Todas as fases, na ordem usada para desempate.
    pub const ALL: [ParkingPhase; 7] = [
        ParkingPhase::Searching,
        ParkingPhase::Approaching,
        ParkingPhase::Aligning,
        ParkingPhase::Reversing,
        ParkingPhase::Adjusting,
        ParkingPhase::Completed,
        ParkingPhase::Emergency,
    ];

    /// Nome do termo correspondente na saída `ParkingPhase`.
    pub fn term_name(&self) -> &'static str {
        match self {
            ParkingPhase::Searching => "Searching",
            ParkingPhase::Approaching => "Approaching",
            ParkingPhase::Aligning => "Aligning",
            ParkingPhase::Reversing => "Reversing",
            ParkingPhase::Adjusting => "Adjusting",
            ParkingPhase::Completed => "Completed",
            ParkingPhase::Emergency => "Emergency",
        }
    }

    /// Label legível em PT-BR, usado em logs e no diário de decisões.
    pub fn label(&self) -> &'static str {
        match self {
            ParkingPhase::Searching => "Procurando vaga",
            ParkingPhase::Approaching => "Aproximando",
            ParkingPhase::Aligning => "Alinhando",
            ParkingPhase::Reversing => "Manobra de ré",
            ParkingPhase::Adjusting => "Ajuste final",
            ParkingPhase::Completed => "Estacionado",
            ParkingPhase::Emergency => "Emergência",
        }
    }

    pub fn from_term_name(name: &str) -> Option<ParkingPhase> {
        ParkingPhase::ALL
            .iter()
            .copied()
            .find(|p| p.term_name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ParkingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.term_name())
    }
}

/// Termo de saída: nome + triângulo (a, b, c) usado na defuzzificação.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputTerm {
    pub name: String,
    pub points: [f64; 3],
}

impl OutputTerm {
    pub fn new(name: impl Into<String>, a: f64, b: f64, c: f64) -> Self {
        Self {
            name: name.into(),
            points: [a, b, c],
        }
    }

    /// Forma triangular do termo avaliada em `x`.
    pub fn shape(&self, x: f64) -> f64 {
        let [a, b, c] = self.points;
        triangular(x, a, b, c)
    }
}

/// Conjunto fuzzy de saída: domínio + termos triangulares.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputFuzzySet {
    variable: OutputVariable,
    min: f64,
    max: f64,
    terms: Vec<OutputTerm>,
}

impl OutputFuzzySet {
    /// Valida domínio, unicidade de nomes e ordem dos pontos de cada termo.
    pub fn new(
        variable: OutputVariable,
        min: f64,
        max: f64,
        terms: Vec<OutputTerm>,
    ) -> Result<Self, ConfigError> {
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(ConfigError::InvalidDomain {
                variable: variable.name().to_string(),
                min,
                max,
            });
        }
        for (i, term) in terms.iter().enumerate() {
            if terms[..i].iter().any(|t| t.name == term.name) {
                return Err(ConfigError::DuplicateTerm {
                    variable: variable.name().to_string(),
                    term: term.name.clone(),
                });
            }
            if term.points.iter().any(|p| !p.is_finite()) {
                return Err(ConfigError::NonFiniteParam {
                    term: term.name.clone(),
                });
            }
            if term.points[0] > term.points[1] || term.points[1] > term.points[2] {
                return Err(ConfigError::UnorderedPoints {
                    term: term.name.clone(),
                });
            }
        }
        Ok(Self {
            variable,
            min,
            max,
            terms,
        })
    }

    pub fn variable(&self) -> OutputVariable {
        self.variable
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn terms(&self) -> &[OutputTerm] {
        &self.terms
    }

    pub fn term_index(&self, name: &str) -> Option<TermId> {
        self.terms.iter().position(|t| t.name == name).map(TermId)
    }

    pub fn term(&self, id: TermId) -> Option<&OutputTerm> {
        self.terms.get(id.0)
    }
}
