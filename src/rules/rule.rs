//! # FuzzyRule — Uma Regra Linguística Ponderada
//!
//! Cada regra tem a forma:
//!
//! ```text
//! SE FrontDistance IS VeryClose E CurrentSpeed IS NOT Stopped
//! ENTÃO Brake IS EmergencyBrake (0.95), Throttle IS Zero (0.9)
//! ```
//!
//! - **Condições** são combinadas implicitamente com E (mínimo).
//! - **Ações** carregam uma confiança em `[0.1, 1.0]` que escala a
//!   contribuição da regra para o termo de saída.
//! - O **peso** da regra (`[0.1, 2.0]`) multiplica a força de disparo.
//! - A **fase** é uma etiqueta usada para filtrar/habilitar regras em bloco.
//!
//! Regras são dados puros: criadas na configuração e nunca alteradas em
//! tempo de execução, exceto `enabled` e `weight`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{InputVariable, OutputVariable, ParkingPhase};

/// Faixa válida do peso de uma regra.
pub const WEIGHT_RANGE: (f64, f64) = (0.1, 2.0);

/// Faixa válida da confiança de uma ação.
pub const CONFIDENCE_RANGE: (f64, f64) = (0.1, 1.0);

/// Operador de uma condição.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    Is,
    IsNot,
}

impl Operator {
    pub fn label(&self) -> &'static str {
        match self {
            Operator::Is => "IS",
            Operator::IsNot => "IS NOT",
        }
    }
}

/// Condição `(variável, termo, operador)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    pub variable: InputVariable,
    pub term: String,
    #[serde(default)]
    pub operator: Operator,
}

/// Ação `(variável de saída, termo de saída, confiança)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleAction {
    pub output: OutputVariable,
    pub term: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    1.0
}

fn default_weight() -> f64 {
    1.0
}

fn default_enabled() -> bool {
    true
}

/// Regra fuzzy do controlador.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FuzzyRule {
    pub name: String,
    pub phase: ParkingPhase,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub conditions: Vec<RuleCondition>,
    #[serde(default)]
    pub actions: Vec<RuleAction>,
    /// Explicação legível do raciocínio, exibida no diário de decisões.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl FuzzyRule {
    /// Cria uma regra vazia, habilitada, com peso 1.0.
    ///
    /// Use os métodos encadeados para montar condições e ações:
    ///
    /// ```rust,ignore
    /// let rule = FuzzyRule::new("front_emergency", ParkingPhase::Emergency)
    ///     .when(InputVariable::FrontDistance, "VeryClose")
    ///     .when_not(InputVariable::CurrentSpeed, "Stopped")
    ///     .then(OutputVariable::Brake, "EmergencyBrake", 0.95);
    /// ```
    pub fn new(name: impl Into<String>, phase: ParkingPhase) -> Self {
        Self {
            name: name.into(),
            phase,
            enabled: true,
            weight: 1.0,
            conditions: Vec::new(),
            actions: Vec::new(),
            description: String::new(),
        }
    }

    pub fn when(mut self, variable: InputVariable, term: &str) -> Self {
        self.conditions.push(RuleCondition {
            variable,
            term: term.to_string(),
            operator: Operator::Is,
        });
        self
    }

    pub fn when_not(mut self, variable: InputVariable, term: &str) -> Self {
        self.conditions.push(RuleCondition {
            variable,
            term: term.to_string(),
            operator: Operator::IsNot,
        });
        self
    }

    pub fn then(mut self, output: OutputVariable, term: &str, confidence: f64) -> Self {
        self.actions.push(RuleAction {
            output,
            term: term.to_string(),
            confidence,
        });
        self
    }

    pub fn weighted(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Peso efetivo, limitado a [`WEIGHT_RANGE`].
    pub fn effective_weight(&self) -> f64 {
        clamp_weight(self.weight)
    }

    /// Regras sem condições ou sem ações nunca disparam.
    pub fn is_inert(&self) -> bool {
        self.conditions.is_empty() || self.actions.is_empty()
    }
}

/// Formato textual `IF ... THEN ...`, usado em logs e no endpoint de regras.
impl fmt::Display for FuzzyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IF ")?;
        for (i, c) in self.conditions.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{} {} {}", c.variable, c.operator.label(), c.term)?;
        }
        write!(f, " THEN ")?;
        for (i, a) in self.actions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} IS {} ({:.2})", a.output, a.term, a.confidence)?;
        }
        Ok(())
    }
}

pub fn clamp_weight(weight: f64) -> f64 {
    if weight.is_nan() {
        return WEIGHT_RANGE.0;
    }
    weight.clamp(WEIGHT_RANGE.0, WEIGHT_RANGE.1)
}

pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        return CONFIDENCE_RANGE.0;
    }
    confidence.clamp(CONFIDENCE_RANGE.0, CONFIDENCE_RANGE.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_display() {
        let rule = FuzzyRule::new("front_emergency", ParkingPhase::Emergency)
            .when(InputVariable::FrontDistance, "VeryClose")
            .when_not(InputVariable::CurrentSpeed, "Stopped")
            .then(OutputVariable::Brake, "EmergencyBrake", 0.95);
        assert_eq!(
            rule.to_string(),
            "IF FrontDistance IS VeryClose AND CurrentSpeed IS NOT Stopped \
             THEN Brake IS EmergencyBrake (0.95)"
        );
        assert!(!rule.is_inert());
    }

    #[test]
    fn weight_and_confidence_are_clamped() {
        assert_eq!(clamp_weight(5.0), 2.0);
        assert_eq!(clamp_weight(0.0), 0.1);
        assert_eq!(clamp_weight(f64::NAN), 0.1);
        assert_eq!(clamp_confidence(1.5), 1.0);
        assert_eq!(clamp_confidence(0.05), 0.1);
    }

    #[test]
    fn document_defaults() {
        let json = r#"{
            "name": "r1",
            "phase": "Searching",
            "conditions": [{ "variable": "FrontDistance", "term": "Far" }],
            "actions": [{ "output": "Throttle", "term": "Medium" }]
        }"#;
        let rule: FuzzyRule = serde_json::from_str(json).unwrap();
        assert!(rule.enabled);
        assert_eq!(rule.weight, 1.0);
        assert_eq!(rule.conditions[0].operator, Operator::Is);
        assert_eq!(rule.actions[0].confidence, 1.0);
    }

    #[test]
    fn unknown_variable_is_rejected_by_document() {
        let json = r#"{
            "name": "r1",
            "phase": "Searching",
            "conditions": [{ "variable": "Altitude", "term": "High" }],
            "actions": []
        }"#;
        assert!(serde_json::from_str::<FuzzyRule>(json).is_err());
    }
}
