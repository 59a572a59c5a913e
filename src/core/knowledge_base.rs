//! # KnowledgeBase — Registro de Variáveis + Base de Regras
//!
//! A [`KnowledgeBase`] é o **conhecimento completo** do controlador:
//!
//! - variáveis linguísticas de entrada (`InputVariable → LinguisticVariable`)
//! - conjuntos fuzzy de saída (Throttle, Steering, Brake, ParkingPhase)
//! - a [`RuleBase`] com os métodos de defuzzificação e agregação
//! - a resolução de amostragem da defuzzificação
//!
//! ## Documento vs Base Compilada
//!
//! ```text
//! data/knowledge_base.json
//!        │ serde_json
//!        ▼
//! KnowledgeBaseDocument   (nomes em texto, parâmetros crus)
//!        │ KnowledgeBase::compile()  ← rejeita nomes desconhecidos
//!        ▼
//! KnowledgeBase           (funções tipadas, regras com TermIds)
//! ```
//!
//! Toda referência por nome (variável, termo, fase) é resolvida **uma vez**,
//! na compilação. Um termo inexistente numa regra é um [`ConfigError`],
//! nunca um mapa vazio silencioso em tempo de ciclo.
//!
//! A base é imutável durante os ciclos; apenas `enabled`/`weight` das regras
//! e o método de defuzzificação mudam, sempre entre ciclos (exigem `&mut`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigWarning};
use super::membership::{MembershipFunction, MembershipKind};
use super::output::{OutputFuzzySet, OutputTerm, OutputVariable, ParkingPhase};
use super::variable::{FuzzySet, InputVariable, LinguisticVariable, TermId};
use crate::inference::{AggregationMethod, DefuzzificationMethod, DEFAULT_SAMPLES, MAX_SAMPLES};
use crate::rules::rule::{clamp_confidence, FuzzyRule, Operator};
use crate::rules::RuleBase;

/// Termo de `Brake` que dispara o override de segurança.
pub const EMERGENCY_BRAKE_TERM: &str = "EmergencyBrake";

// ─── Forma de documento (serde) ──────────────────────────────────

/// Termo de entrada no documento: `{ name, kind, params }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermDocument {
    pub name: String,
    pub kind: MembershipKind,
    pub params: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableDocument {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub terms: Vec<TermDocument>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub min: f64,
    pub max: f64,
    pub terms: Vec<OutputTerm>,
}

fn default_samples() -> usize {
    DEFAULT_SAMPLES
}

/// Documento estruturado da base de conhecimento (JSON em disco / HTTP).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseDocument {
    #[serde(default)]
    pub defuzzification: DefuzzificationMethod,
    #[serde(default)]
    pub aggregation: AggregationMethod,
    #[serde(default = "default_samples")]
    pub samples: usize,
    pub inputs: BTreeMap<InputVariable, VariableDocument>,
    pub outputs: BTreeMap<OutputVariable, OutputDocument>,
    #[serde(default)]
    pub rules: Vec<FuzzyRule>,
}

// ─── Forma compilada ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompiledCondition {
    pub variable: InputVariable,
    pub term: TermId,
    pub operator: Operator,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompiledAction {
    pub output: OutputVariable,
    pub term: TermId,
    /// Já limitada a `[0.1, 1.0]`.
    pub confidence: f64,
}

/// Regra com nomes resolvidos, paralela (mesmo índice) à regra da [`RuleBase`].
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledRule {
    pub conditions: Vec<CompiledCondition>,
    pub actions: Vec<CompiledAction>,
}

/// Base de conhecimento compilada, pronta para os ciclos de inferência.
pub struct KnowledgeBase {
    inputs: BTreeMap<InputVariable, LinguisticVariable>,
    /// Indexado por [`OutputVariable::index()`].
    outputs: Vec<OutputFuzzySet>,
    rule_base: RuleBase,
    compiled: Vec<CompiledRule>,
    samples: usize,
    /// TermId de cada fase no conjunto `ParkingPhase`, na ordem de [`ParkingPhase::ALL`].
    phase_terms: Vec<(ParkingPhase, TermId)>,
    emergency_term: TermId,
}

impl KnowledgeBase {
    /// Compila um documento, devolvendo a base e os avisos consultivos.
    ///
    /// # Erros
    ///
    /// Qualquer [`ConfigError`]: parâmetros inválidos, domínio invertido,
    /// termos duplicados, conjunto de saída ausente, termo obrigatório
    /// ausente (`EmergencyBrake`, uma entrada por fase), ou regra que cita
    /// variável/termo inexistente.
    pub fn compile(doc: KnowledgeBaseDocument) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        check_samples(doc.samples)?;
        let mut warnings = Vec::new();

        // Variáveis de entrada
        let mut inputs = BTreeMap::new();
        for (variable, vdoc) in doc.inputs {
            let terms = vdoc
                .terms
                .iter()
                .map(|t| {
                    MembershipFunction::from_params(&t.name, t.kind, &t.params)
                        .map(|f| FuzzySet::new(t.name.clone(), f))
                })
                .collect::<Result<Vec<_>, _>>()?;
            if terms.is_empty() {
                warnings.push(ConfigWarning::EmptyVariable {
                    variable: variable.name().to_string(),
                });
            }
            inputs.insert(
                variable,
                LinguisticVariable::new(variable.name(), vdoc.min, vdoc.max, terms)?,
            );
        }

        // Conjuntos de saída: todos obrigatórios
        let mut outputs = Vec::with_capacity(OutputVariable::ALL.len());
        for variable in OutputVariable::ALL {
            let odoc = doc.outputs.get(&variable).ok_or_else(|| ConfigError::MissingOutput {
                variable: variable.name().to_string(),
            })?;
            outputs.push(OutputFuzzySet::new(variable, odoc.min, odoc.max, odoc.terms.clone())?);
        }

        let phase_set = &outputs[OutputVariable::ParkingPhase.index()];
        let phase_terms = ParkingPhase::ALL
            .iter()
            .map(|&phase| {
                phase_set
                    .term_index(phase.term_name())
                    .map(|id| (phase, id))
                    .ok_or_else(|| ConfigError::MissingOutputTerm {
                        variable: OutputVariable::ParkingPhase.name().to_string(),
                        term: phase.term_name().to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let emergency_term = outputs[OutputVariable::Brake.index()]
            .term_index(EMERGENCY_BRAKE_TERM)
            .ok_or_else(|| ConfigError::MissingOutputTerm {
                variable: OutputVariable::Brake.name().to_string(),
                term: EMERGENCY_BRAKE_TERM.to_string(),
            })?;

        // Regras
        let rule_base = RuleBase::new(doc.rules, doc.defuzzification, doc.aggregation);
        warnings.extend(rule_base.validate());
        let compiled = rule_base
            .rules()
            .iter()
            .map(|rule| compile_rule(rule, &inputs, &outputs))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((
            Self {
                inputs,
                outputs,
                rule_base,
                compiled,
                samples: doc.samples,
                phase_terms,
                emergency_term,
            },
            warnings,
        ))
    }

    /// Reconstrói o documento (para persistência ou resposta HTTP).
    pub fn to_document(&self) -> KnowledgeBaseDocument {
        let inputs = self
            .inputs()
            .map(|(variable, lv)| {
                let terms = lv
                    .terms()
                    .iter()
                    .map(|t| TermDocument {
                        name: t.name.clone(),
                        kind: t.function.kind(),
                        params: t.function.params(),
                    })
                    .collect();
                (
                    variable,
                    VariableDocument {
                        min: lv.min(),
                        max: lv.max(),
                        terms,
                    },
                )
            })
            .collect();
        let outputs = self
            .outputs
            .iter()
            .map(|set| {
                (
                    set.variable(),
                    OutputDocument {
                        min: set.min(),
                        max: set.max(),
                        terms: set.terms().to_vec(),
                    },
                )
            })
            .collect();

        KnowledgeBaseDocument {
            defuzzification: self.rule_base.defuzzification,
            aggregation: self.rule_base.aggregation,
            samples: self.samples,
            inputs,
            outputs,
            rules: self.rule_base.rules().to_vec(),
        }
    }

    pub fn input(&self, variable: InputVariable) -> Option<&LinguisticVariable> {
        self.inputs.get(&variable)
    }

    pub fn inputs(&self) -> impl Iterator<Item = (InputVariable, &LinguisticVariable)> + '_ {
        self.inputs.iter().map(|(&v, lv)| (v, lv))
    }

    pub fn output(&self, variable: OutputVariable) -> &OutputFuzzySet {
        &self.outputs[variable.index()]
    }

    pub fn rule_base(&self) -> &RuleBase {
        &self.rule_base
    }

    /// Acesso mutável: só `enabled`, `weight` e os métodos podem mudar.
    pub fn rule_base_mut(&mut self) -> &mut RuleBase {
        &mut self.rule_base
    }

    /// Regras compiladas, no mesmo índice de `rule_base().rules()`.
    pub fn compiled_rules(&self) -> &[CompiledRule] {
        &self.compiled
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Troca a resolução da defuzzificação entre ciclos.
    pub fn set_samples(&mut self, samples: usize) -> Result<(), ConfigError> {
        check_samples(samples)?;
        self.samples = samples;
        Ok(())
    }

    pub fn phase_terms(&self) -> &[(ParkingPhase, TermId)] {
        &self.phase_terms
    }

    pub fn emergency_term(&self) -> TermId {
        self.emergency_term
    }
}

/// Resolve os nomes de uma regra para ids tipados.
fn check_samples(samples: usize) -> Result<(), ConfigError> {
    if (2..=MAX_SAMPLES).contains(&samples) {
        Ok(())
    } else {
        Err(ConfigError::InvalidSampleCount(samples))
    }
}

fn compile_rule(
    rule: &FuzzyRule,
    inputs: &BTreeMap<InputVariable, LinguisticVariable>,
    outputs: &[OutputFuzzySet],
) -> Result<CompiledRule, ConfigError> {
    let conditions = rule
        .conditions
        .iter()
        .map(|c| {
            let variable = inputs.get(&c.variable).ok_or_else(|| ConfigError::UnknownVariable {
                rule: rule.name.clone(),
                variable: c.variable.name().to_string(),
            })?;
            let term = variable.term_index(&c.term).ok_or_else(|| ConfigError::UnknownTerm {
                rule: rule.name.clone(),
                variable: c.variable.name().to_string(),
                term: c.term.clone(),
            })?;
            Ok(CompiledCondition {
                variable: c.variable,
                term,
                operator: c.operator,
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let actions = rule
        .actions
        .iter()
        .map(|a| {
            let term = outputs[a.output.index()]
                .term_index(&a.term)
                .ok_or_else(|| ConfigError::UnknownTerm {
                    rule: rule.name.clone(),
                    variable: a.output.name().to_string(),
                    term: a.term.clone(),
                })?;
            Ok(CompiledAction {
                output: a.output,
                term,
                confidence: clamp_confidence(a.confidence),
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(CompiledRule { conditions, actions })
}
