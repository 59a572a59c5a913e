//! # Fuzzifier — Do Valor Crisp ao Mapa de Pertinência
//!
//! ```text
//! CrispSnapshot ──derived──► CrispInputs ──fuzzify──► FuzzifiedInputs
//!                            (var → valor)            (var → termo → grau)
//! ```
//!
//! Para cada variável: o valor é limitado ao domínio, cada termo é avaliado,
//! e graus `≤ 0.001` são descartados.

pub mod derived;

use std::collections::BTreeMap;

use crate::core::{FuzzyMembershipMap, InputVariable, KnowledgeBase, LinguisticVariable, TermId};

pub use derived::{crisp_inputs, normalize_angle, CrispInputs, DerivedSettings};

/// Graus iguais ou abaixo deste valor não entram no mapa.
pub const MEMBERSHIP_EPSILON: f64 = 0.001;

/// Fuzzifica um valor contra uma variável.
pub fn fuzzify(value: f64, variable: &LinguisticVariable) -> FuzzyMembershipMap {
    let mut map = FuzzyMembershipMap::new();
    if variable.terms().is_empty() {
        tracing::warn!(variable = variable.name(), "Fuzzifier: variável sem termos");
        return map;
    }

    let x = variable.clamp(value);
    for (i, term) in variable.terms().iter().enumerate() {
        let degree = term.membership(x);
        if degree > MEMBERSHIP_EPSILON {
            map.push(TermId(i), degree);
        }
    }
    map
}

/// Fuzzifica por nome de variável; nome desconhecido resulta em mapa vazio.
pub fn fuzzify_named(kb: &KnowledgeBase, name: &str, value: f64) -> FuzzyMembershipMap {
    match InputVariable::from_name(name).and_then(|v| kb.input(v)) {
        Some(variable) => fuzzify(value, variable),
        None => {
            tracing::warn!(variable = name, "Fuzzifier: variável desconhecida");
            FuzzyMembershipMap::new()
        }
    }
}

/// Mapas de pertinência de um ciclo, por variável de entrada.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FuzzifiedInputs {
    maps: BTreeMap<InputVariable, FuzzyMembershipMap>,
}

impl FuzzifiedInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fuzzifica todas as entradas crisp cuja variável está registrada.
    pub fn from_crisp(kb: &KnowledgeBase, crisp: &CrispInputs) -> Self {
        let mut inputs = Self::new();
        for (&variable, &value) in crisp {
            if let Some(lv) = kb.input(variable) {
                inputs.insert(variable, fuzzify(value, lv));
            }
        }
        inputs
    }

    pub fn insert(&mut self, variable: InputVariable, map: FuzzyMembershipMap) {
        self.maps.insert(variable, map);
    }

    pub fn get(&self, variable: InputVariable) -> Option<&FuzzyMembershipMap> {
        self.maps.get(&variable)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Visão por nome, para o trace do ciclo.
    pub fn named(&self, kb: &KnowledgeBase) -> BTreeMap<InputVariable, BTreeMap<String, f64>> {
        self.maps
            .iter()
            .filter_map(|(&v, map)| kb.input(v).map(|lv| (v, map.named(lv))))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FuzzySet, MembershipFunction};
    use crate::rules::defaults;

    fn front_distance() -> LinguisticVariable {
        LinguisticVariable::new(
            "FrontDistance",
            0.0,
            10.0,
            vec![
                FuzzySet::new("VeryClose", MembershipFunction::Triangular { a: 0.0, b: 0.0, c: 1.0 }),
                FuzzySet::new("Close", MembershipFunction::Triangular { a: 0.5, b: 1.5, c: 3.0 }),
                FuzzySet::new("Far", MembershipFunction::Trapezoidal { a: 5.0, b: 7.0, c: 10.0, d: 10.0 }),
            ],
        )
        .unwrap()
    }

    #[test]
    fn very_close_at_point_three() {
        let fd = front_distance();
        let map = fuzzify(0.3, &fd);
        assert!((map.degree_of(&fd, "VeryClose") - 0.7).abs() < 1e-12);
        assert_eq!(map.degree_of(&fd, "Far"), 0.0);
    }

    #[test]
    fn out_of_domain_values_are_clamped() {
        let fd = front_distance();
        assert_eq!(fuzzify(-4.0, &fd), fuzzify(0.0, &fd));
        assert_eq!(fuzzify(25.0, &fd), fuzzify(10.0, &fd));
        assert_eq!(fuzzify(25.0, &fd).degree_of(&fd, "Far"), 1.0);
    }

    #[test]
    fn tiny_degrees_are_dropped() {
        let fd = front_distance();
        // Close em 0.5005 vale 0.0005
        let map = fuzzify(0.5005, &fd);
        assert!(map.get(TermId(1)).is_none());
        assert!(map.get(TermId(0)).is_some());
    }

    #[test]
    fn variable_without_terms_gives_empty_map() {
        let empty = LinguisticVariable::new("X", 0.0, 1.0, vec![]).unwrap();
        assert!(fuzzify(0.5, &empty).is_empty());
    }

    #[test]
    fn unknown_name_gives_empty_map() {
        let kb = KnowledgeBase::compile(defaults::document()).unwrap().0;
        assert!(fuzzify_named(&kb, "Altitude", 3.0).is_empty());
        assert!(!fuzzify_named(&kb, "FrontDistance", 0.3).is_empty());
    }
}
