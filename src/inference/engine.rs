//! # InferenceEngine — Um Ciclo Mamdani Completo
//!
//! ## Avaliação de uma regra
//!
//! ```text
//! força = 1.0
//! para cada condição:
//!   variável sem dados        → força = 0 (curto-circuito)
//!   termo ausente do mapa     → μ = 0
//!   Is    → força = min(força, μ)
//!   IsNot → força = min(força, 1 - μ)
//! força *= peso
//! disparou se força > 0.01
//! ```
//!
//! Como `min` é comutativo e associativo, a ordem das condições não importa,
//! e cada condição a mais só pode baixar a força.
//!
//! ## Agregação
//!
//! Para cada regra disparada e cada ação: `contribuição = força × confiança`,
//! combinada no termo de saída pela política da base (Max por padrão).
//!
//! ## Saídas
//!
//! Throttle, Steering e Brake são defuzzificados pelo método da base.
//! ParkingPhase é discreta: vence o termo de maior grau.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::command::CycleFault;
use crate::core::knowledge_base::{CompiledAction, CompiledRule};
use crate::core::{KnowledgeBase, OutputVariable, ParkingPhase, TermId};
use crate::fuzzifier::FuzzifiedInputs;
use crate::rules::rule::Operator;

use super::defuzzify::defuzzify;

/// Força mínima para uma regra contar como disparada.
pub const TRIGGER_THRESHOLD: f64 = 0.01;

/// Regra que disparou neste ciclo.
#[derive(Clone, Debug, PartialEq)]
pub struct FiredRule {
    /// Posição na base (ordem de avaliação).
    pub index: usize,
    pub name: String,
    pub phase: ParkingPhase,
    /// Força já multiplicada pelo peso.
    pub strength: f64,
    pub actions: Vec<CompiledAction>,
}

/// Graus agregados por variável de saída, indexados por [`TermId`].
#[derive(Clone, Debug, PartialEq)]
pub struct AggregatedOutputs {
    degrees: Vec<Vec<f64>>,
}

impl AggregatedOutputs {
    /// Mapas zerados, um por variável de saída.
    pub fn empty(kb: &KnowledgeBase) -> Self {
        let degrees = OutputVariable::ALL
            .iter()
            .map(|&v| vec![0.0; kb.output(v).terms().len()])
            .collect();
        Self { degrees }
    }

    pub fn degrees(&self, variable: OutputVariable) -> &[f64] {
        &self.degrees[variable.index()]
    }

    pub fn degree(&self, variable: OutputVariable, term: TermId) -> f64 {
        self.degrees[variable.index()]
            .get(term.0)
            .copied()
            .unwrap_or(0.0)
    }

    /// `true` se nenhum termo da variável recebeu contribuição.
    pub fn is_empty(&self, variable: OutputVariable) -> bool {
        self.degrees(variable).iter().all(|&d| d <= 0.0)
    }

    pub(crate) fn accumulate(
        &mut self,
        kb: &KnowledgeBase,
        variable: OutputVariable,
        term: TermId,
        contribution: f64,
    ) {
        if let Some(slot) = self.degrees[variable.index()].get_mut(term.0) {
            *slot = kb.rule_base().aggregation.combine(*slot, contribution);
        }
    }

    /// Visão por nome (só termos com grau > 0), para traces e JSON.
    pub fn named(&self, kb: &KnowledgeBase, variable: OutputVariable) -> BTreeMap<String, f64> {
        kb.output(variable)
            .terms()
            .iter()
            .zip(self.degrees(variable))
            .filter(|(_, &d)| d > 0.0)
            .map(|(t, &d)| (t.name.clone(), d))
            .collect()
    }
}

/// Saídas crisp de um ciclo, antes da montagem do comando.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CrispOutputs {
    pub throttle: f64,
    pub steering: f64,
    pub brake: f64,
    pub phase: ParkingPhase,
    /// Grau agregado de `Brake[EmergencyBrake]`.
    pub emergency_degree: f64,
}

/// Resultado completo de uma inferência.
#[derive(Clone, Debug)]
pub struct InferenceResult {
    pub fired: Vec<FiredRule>,
    pub aggregated: AggregatedOutputs,
    pub outputs: CrispOutputs,
}

impl InferenceResult {
    /// Regra disparada de maior força (primeira em caso de empate).
    pub fn dominant_rule(&self) -> Option<&FiredRule> {
        self.fired
            .iter()
            .fold(None, |best: Option<&FiredRule>, r| match best {
                Some(b) if b.strength >= r.strength => Some(b),
                _ => Some(r),
            })
    }
}

/// Motor de inferência sem estado.
pub struct InferenceEngine;

impl InferenceEngine {
    /// Executa avaliação, agregação e defuzzificação.
    pub fn infer(kb: &KnowledgeBase, inputs: &FuzzifiedInputs) -> Result<InferenceResult, CycleFault> {
        let fired = Self::evaluate_rules(kb, inputs)?;
        let aggregated = Self::aggregate(kb, &fired);
        let outputs = Self::defuzzify(kb, &aggregated)?;

        tracing::trace!(
            fired = fired.len(),
            throttle = outputs.throttle,
            steering = outputs.steering,
            brake = outputs.brake,
            phase = %outputs.phase,
            "InferenceEngine: ciclo concluído"
        );

        Ok(InferenceResult {
            fired,
            aggregated,
            outputs,
        })
    }

    /// Avalia as regras habilitadas na ordem da base.
    pub fn evaluate_rules(kb: &KnowledgeBase, inputs: &FuzzifiedInputs) -> Result<Vec<FiredRule>, CycleFault> {
        let mut fired = Vec::new();

        for (index, (rule, compiled)) in kb
            .rule_base()
            .rules()
            .iter()
            .zip(kb.compiled_rules())
            .enumerate()
        {
            if !rule.enabled || rule.is_inert() {
                continue;
            }

            let strength = firing_strength(compiled, rule.effective_weight(), inputs);
            if !strength.is_finite() {
                return Err(CycleFault::Evaluation {
                    rule: rule.name.clone(),
                    reason: format!("força de disparo não finita ({})", strength),
                });
            }

            if strength > TRIGGER_THRESHOLD {
                tracing::trace!(rule = %rule.name, strength, "regra disparou");
                fired.push(FiredRule {
                    index,
                    name: rule.name.clone(),
                    phase: rule.phase,
                    strength,
                    actions: compiled.actions.clone(),
                });
            }
        }

        Ok(fired)
    }

    /// Combina as contribuições das regras disparadas por termo de saída.
    pub fn aggregate(kb: &KnowledgeBase, fired: &[FiredRule]) -> AggregatedOutputs {
        let mut aggregated = AggregatedOutputs::empty(kb);
        for rule in fired {
            for action in &rule.actions {
                aggregated.accumulate(kb, action.output, action.term, rule.strength * action.confidence);
            }
        }
        aggregated
    }

    /// Defuzzifica as saídas contínuas e escolhe a fase dominante.
    pub fn defuzzify(kb: &KnowledgeBase, aggregated: &AggregatedOutputs) -> Result<CrispOutputs, CycleFault> {
        let method = kb.rule_base().defuzzification;
        let crisp = |variable: OutputVariable| -> Result<f64, CycleFault> {
            let value = defuzzify(method, kb.output(variable), aggregated.degrees(variable), kb.samples());
            if value.is_finite() {
                Ok(value)
            } else {
                Err(CycleFault::NonFiniteOutput {
                    output: variable.name().to_string(),
                })
            }
        };

        Ok(CrispOutputs {
            throttle: crisp(OutputVariable::Throttle)?,
            steering: crisp(OutputVariable::Steering)?,
            brake: crisp(OutputVariable::Brake)?,
            phase: dominant_phase(kb, aggregated),
            emergency_degree: aggregated.degree(OutputVariable::Brake, kb.emergency_term()),
        })
    }
}

/// Força de disparo de uma regra compilada (mínimo das condições × peso).
pub fn firing_strength(rule: &CompiledRule, weight: f64, inputs: &FuzzifiedInputs) -> f64 {
    let mut strength: f64 = 1.0;
    for condition in &rule.conditions {
        let Some(map) = inputs.get(condition.variable) else {
            return 0.0;
        };
        let membership = map.get(condition.term).unwrap_or(0.0);
        let degree = match condition.operator {
            Operator::Is => membership,
            Operator::IsNot => 1.0 - membership,
        };
        strength = strength.min(degree);
    }
    strength * weight
}

/// Termo de fase com maior grau; empates ficam com a fase anterior na
/// ordem do enum. Sem nenhum grau positivo, `Searching`.
pub fn dominant_phase(kb: &KnowledgeBase, aggregated: &AggregatedOutputs) -> ParkingPhase {
    let mut best = (ParkingPhase::default(), 0.0);
    for &(phase, term) in kb.phase_terms() {
        let degree = aggregated.degree(OutputVariable::ParkingPhase, term);
        if degree > best.1 {
            best = (phase, degree);
        }
    }
    best.0
}
