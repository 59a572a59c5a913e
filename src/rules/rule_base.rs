//! # RuleBase — Coleção Ordenada de Regras
//!
//! A [`RuleBase`] guarda as regras na ordem de declaração (que é a ordem de
//! avaliação), um índice por nome para busca O(1), e os métodos globais de
//! defuzzificação e agregação.
//!
//! ## Operações
//!
//! | Operação | Método |
//! |----------|--------|
//! | Busca por nome | [`get()`](RuleBase::get) |
//! | Filtro por fase + habilitada | [`enabled_in_phase()`](RuleBase::enabled_in_phase) |
//! | Habilitar/desabilitar uma | [`set_enabled()`](RuleBase::set_enabled) |
//! | Habilitar/desabilitar em bloco | [`set_all_enabled()`](RuleBase::set_all_enabled), [`set_phase_enabled()`](RuleBase::set_phase_enabled) |
//! | Peso em bloco | [`set_all_weights()`](RuleBase::set_all_weights) |
//! | Validação consultiva | [`validate()`](RuleBase::validate) |
//!
//! A validação nunca falha: produz [`ConfigWarning`]s que o chamador loga.

use std::collections::{HashMap, HashSet};

use super::rule::{clamp_weight, FuzzyRule, CONFIDENCE_RANGE, WEIGHT_RANGE};
use crate::core::{ConfigWarning, ParkingPhase};
use crate::inference::{AggregationMethod, DefuzzificationMethod};

pub struct RuleBase {
    rules: Vec<FuzzyRule>,
    /// Nome → índice da **primeira** regra com esse nome.
    index: HashMap<String, usize>,
    pub defuzzification: DefuzzificationMethod,
    pub aggregation: AggregationMethod,
}

impl RuleBase {
    pub fn new(
        rules: Vec<FuzzyRule>,
        defuzzification: DefuzzificationMethod,
        aggregation: AggregationMethod,
    ) -> Self {
        let mut index = HashMap::with_capacity(rules.len());
        for (i, rule) in rules.iter().enumerate() {
            index.entry(rule.name.clone()).or_insert(i);
        }
        Self {
            rules,
            index,
            defuzzification,
            aggregation,
        }
    }

    /// Base vazia: todo ciclo produz o comando neutro.
    pub fn empty() -> Self {
        Self::new(Vec::new(), DefuzzificationMethod::default(), AggregationMethod::default())
    }

    pub fn rules(&self) -> &[FuzzyRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn enabled_count(&self) -> usize {
        self.rules.iter().filter(|r| r.enabled).count()
    }

    pub fn get(&self, name: &str) -> Option<&FuzzyRule> {
        self.index.get(name).map(|&i| &self.rules[i])
    }

    /// Regras habilitadas de uma fase, na ordem da base.
    pub fn enabled_in_phase(&self, phase: ParkingPhase) -> impl Iterator<Item = &FuzzyRule> + '_ {
        self.rules
            .iter()
            .filter(move |r| r.enabled && r.phase == phase)
    }

    /// Liga/desliga uma regra. Retorna `false` se o nome não existe.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.index.get(name) {
            Some(&i) => {
                self.rules[i].enabled = enabled;
                tracing::debug!(rule = name, enabled, "RuleBase: regra alterada");
                true
            }
            None => false,
        }
    }

    pub fn set_all_enabled(&mut self, enabled: bool) {
        for rule in &mut self.rules {
            rule.enabled = enabled;
        }
    }

    /// Liga/desliga todas as regras de uma fase. Retorna quantas foram afetadas.
    pub fn set_phase_enabled(&mut self, phase: ParkingPhase, enabled: bool) -> usize {
        let mut count = 0;
        for rule in self.rules.iter_mut().filter(|r| r.phase == phase) {
            rule.enabled = enabled;
            count += 1;
        }
        count
    }

    /// Atribui o mesmo peso a todas as regras, limitado a `[0.1, 2.0]`.
    /// Retorna o peso efetivamente aplicado.
    pub fn set_all_weights(&mut self, weight: f64) -> f64 {
        let weight = clamp_weight(weight);
        for rule in &mut self.rules {
            rule.weight = weight;
        }
        weight
    }

    /// Atribui pesos por nome. Nomes desconhecidos são ignorados e devolvidos.
    pub fn set_weights<'a>(&mut self, weights: impl IntoIterator<Item = (&'a str, f64)>) -> Vec<String> {
        let mut unknown = Vec::new();
        for (name, weight) in weights {
            match self.index.get(name) {
                Some(&i) => self.rules[i].weight = clamp_weight(weight),
                None => unknown.push(name.to_string()),
            }
        }
        unknown
    }

    /// Validação consultiva: nunca rejeita a base.
    ///
    /// Sinaliza nomes duplicados, pesos e confianças fora da faixa, e
    /// regras sem condições ou sem ações.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for rule in &self.rules {
            if !seen.insert(rule.name.as_str()) {
                warnings.push(ConfigWarning::DuplicateRule {
                    name: rule.name.clone(),
                });
            }
            if !(WEIGHT_RANGE.0..=WEIGHT_RANGE.1).contains(&rule.weight) {
                warnings.push(ConfigWarning::WeightOutOfRange {
                    rule: rule.name.clone(),
                    weight: rule.weight,
                });
            }
            if rule.conditions.is_empty() {
                warnings.push(ConfigWarning::EmptyConditions {
                    rule: rule.name.clone(),
                });
            }
            if rule.actions.is_empty() {
                warnings.push(ConfigWarning::EmptyActions {
                    rule: rule.name.clone(),
                });
            }
            for action in &rule.actions {
                if !(CONFIDENCE_RANGE.0..=CONFIDENCE_RANGE.1).contains(&action.confidence) {
                    warnings.push(ConfigWarning::ConfidenceOutOfRange {
                        rule: rule.name.clone(),
                        confidence: action.confidence,
                    });
                }
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InputVariable, OutputVariable};

    fn rule(name: &str, phase: ParkingPhase) -> FuzzyRule {
        FuzzyRule::new(name, phase)
            .when(InputVariable::FrontDistance, "Far")
            .then(OutputVariable::Throttle, "Medium", 0.9)
    }

    fn base(rules: Vec<FuzzyRule>) -> RuleBase {
        RuleBase::new(rules, DefuzzificationMethod::Centroid, AggregationMethod::Max)
    }

    #[test]
    fn lookup_by_name_returns_first_duplicate() {
        let mut second = rule("cruise", ParkingPhase::Approaching);
        second.weight = 0.5;
        let rb = base(vec![rule("cruise", ParkingPhase::Searching), second]);
        assert_eq!(rb.get("cruise").unwrap().phase, ParkingPhase::Searching);
        assert!(rb.get("missing").is_none());

        let warnings = rb.validate();
        assert!(warnings.contains(&ConfigWarning::DuplicateRule { name: "cruise".into() }));
    }

    #[test]
    fn phase_filter_skips_disabled() {
        let mut rb = base(vec![
            rule("a", ParkingPhase::Searching),
            rule("b", ParkingPhase::Searching),
            rule("c", ParkingPhase::Reversing),
        ]);
        assert!(rb.set_enabled("b", false));
        assert!(!rb.set_enabled("zzz", false));
        let names: Vec<_> = rb
            .enabled_in_phase(ParkingPhase::Searching)
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["a"]);
        assert_eq!(rb.enabled_count(), 2);
    }

    #[test]
    fn bulk_enable_and_phase_enable() {
        let mut rb = base(vec![
            rule("a", ParkingPhase::Searching),
            rule("b", ParkingPhase::Reversing),
            rule("c", ParkingPhase::Reversing),
        ]);
        rb.set_all_enabled(false);
        assert_eq!(rb.enabled_count(), 0);
        assert_eq!(rb.set_phase_enabled(ParkingPhase::Reversing, true), 2);
        assert_eq!(rb.enabled_count(), 2);
    }

    #[test]
    fn bulk_weights_are_clamped() {
        let mut rb = base(vec![rule("a", ParkingPhase::Searching), rule("b", ParkingPhase::Searching)]);
        assert_eq!(rb.set_all_weights(3.5), 2.0);
        assert!(rb.rules().iter().all(|r| r.weight == 2.0));
        assert_eq!(rb.set_all_weights(0.0), 0.1);

        let unknown = rb.set_weights([("a", 0.7), ("ghost", 1.0)]);
        assert_eq!(rb.get("a").unwrap().weight, 0.7);
        assert_eq!(unknown, vec!["ghost".to_string()]);
    }

    #[test]
    fn validate_flags_malformed_rules() {
        let mut heavy = rule("heavy", ParkingPhase::Searching);
        heavy.weight = 3.0;
        heavy.actions[0].confidence = 1.4;
        let empty = FuzzyRule::new("empty", ParkingPhase::Searching);

        let warnings = base(vec![heavy, empty]).validate();
        assert!(warnings.contains(&ConfigWarning::WeightOutOfRange { rule: "heavy".into(), weight: 3.0 }));
        assert!(warnings.contains(&ConfigWarning::ConfidenceOutOfRange { rule: "heavy".into(), confidence: 1.4 }));
        assert!(warnings.contains(&ConfigWarning::EmptyConditions { rule: "empty".into() }));
        assert!(warnings.contains(&ConfigWarning::EmptyActions { rule: "empty".into() }));
    }
}
