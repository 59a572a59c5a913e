//! # Variáveis Linguísticas — O Vocabulário do Controlador
//!
//! Uma [`LinguisticVariable`] é uma grandeza numérica com nome (ex:
//! `FrontDistance`), um domínio `[min, max]` e um conjunto **ordenado** de
//! termos ([`FuzzySet`]), cada um ligado a uma função de pertinência.
//!
//! ```text
//! FrontDistance ∈ [0, 10] m
//!   VeryClose ▲        Close ▲          Near ▲              Far ▲
//!            █ █            █ █           █   █          ████████
//!   ─────────────────────────────────────────────────────────────
//!            0  1          0.5 2          1.5  5          4 ... 10
//! ```
//!
//! ## Identificadores Tipados
//!
//! As variáveis de entrada formam um conjunto fechado ([`InputVariable`]):
//! nomes desconhecidos falham já na desserialização do documento. Termos são
//! resolvidos para índices ([`TermId`]) na carga da base de conhecimento, de
//! modo que o motor de inferência nunca compara strings durante um ciclo.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::membership::MembershipFunction;

/// Variáveis de entrada conhecidas pelo controlador.
///
/// As oito primeiras correspondem aos sensores de distância, na ordem do
/// array do snapshot: índice 0 = frente, seguindo no sentido horário em
/// incrementos de 45°.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InputVariable {
    FrontDistance,
    FrontRightDistance,
    RightDistance,
    RearRightDistance,
    RearDistance,
    RearLeftDistance,
    LeftDistance,
    FrontLeftDistance,
    /// Velocidade atual normalizada: `|speed| / max_speed`.
    CurrentSpeed,
    /// Razão de velocidade desejada menos a atual.
    SpeedError,
    /// +1 andando para frente, -1 em ré.
    MovingDirection,
    /// 1 se existe vaga candidata, 0 caso contrário.
    TargetAvailable,
    DistanceToTarget,
    /// Ângulo até a vaga relativo ao heading, positivo à esquerda.
    AngleToTarget,
    /// Heading do carro menos a orientação da vaga, normalizado.
    HeadingError,
    /// Deslocamento lateral em relação ao eixo da vaga, positivo à esquerda.
    LateralError,
    /// Deslocamento ao longo do eixo da vaga, positivo à frente do centro.
    LongitudinalError,
    ObstacleDistance,
    DynamicObstacleDistance,
}

impl InputVariable {
    /// Todas as variáveis, em ordem canônica.
    pub const ALL: [InputVariable; 19] = [
        InputVariable::FrontDistance,
        InputVariable::FrontRightDistance,
        InputVariable::RightDistance,
        InputVariable::RearRightDistance,
        InputVariable::RearDistance,
        InputVariable::RearLeftDistance,
        InputVariable::LeftDistance,
        InputVariable::FrontLeftDistance,
        InputVariable::CurrentSpeed,
        InputVariable::SpeedError,
        InputVariable::MovingDirection,
        InputVariable::TargetAvailable,
        InputVariable::DistanceToTarget,
        InputVariable::AngleToTarget,
        InputVariable::HeadingError,
        InputVariable::LateralError,
        InputVariable::LongitudinalError,
        InputVariable::ObstacleDistance,
        InputVariable::DynamicObstacleDistance,
    ];

    /// Variáveis de sensor indexadas como no array do snapshot.
    pub const SENSORS: [InputVariable; 8] = [
        InputVariable::FrontDistance,
        InputVariable::FrontRightDistance,
        InputVariable::RightDistance,
        InputVariable::RearRightDistance,
        InputVariable::RearDistance,
        InputVariable::RearLeftDistance,
        InputVariable::LeftDistance,
        InputVariable::FrontLeftDistance,
    ];

    /// Nome canônico (igual ao usado no documento JSON).
    pub fn name(&self) -> &'static str {
        match self {
            InputVariable::FrontDistance => "FrontDistance",
            InputVariable::FrontRightDistance => "FrontRightDistance",
            InputVariable::RightDistance => "RightDistance",
            InputVariable::RearRightDistance => "RearRightDistance",
            InputVariable::RearDistance => "RearDistance",
            InputVariable::RearLeftDistance => "RearLeftDistance",
            InputVariable::LeftDistance => "LeftDistance",
            InputVariable::FrontLeftDistance => "FrontLeftDistance",
            InputVariable::CurrentSpeed => "CurrentSpeed",
            InputVariable::SpeedError => "SpeedError",
            InputVariable::MovingDirection => "MovingDirection",
            InputVariable::TargetAvailable => "TargetAvailable",
            InputVariable::DistanceToTarget => "DistanceToTarget",
            InputVariable::AngleToTarget => "AngleToTarget",
            InputVariable::HeadingError => "HeadingError",
            InputVariable::LateralError => "LateralError",
            InputVariable::LongitudinalError => "LongitudinalError",
            InputVariable::ObstacleDistance => "ObstacleDistance",
            InputVariable::DynamicObstacleDistance => "DynamicObstacleDistance",
        }
    }

    /// Resolve um nome em texto livre (usado por `fuzzify_named`).
    pub fn from_name(name: &str) -> Option<InputVariable> {
        InputVariable::ALL.iter().copied().find(|v| v.name() == name)
    }
}

impl fmt::Display for InputVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Índice de um termo dentro da sua variável, resolvido na carga.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(pub usize);

/// Termo linguístico (conjunto fuzzy): nome + função de pertinência.
#[derive(Clone, Debug, PartialEq)]
pub struct FuzzySet {
    pub name: String,
    pub function: MembershipFunction,
}

impl FuzzySet {
    pub fn new(name: impl Into<String>, function: MembershipFunction) -> Self {
        Self {
            name: name.into(),
            function,
        }
    }

    /// Grau de pertinência de `x` neste termo.
    pub fn membership(&self, x: f64) -> f64 {
        self.function.evaluate(x)
    }
}

/// Variável linguística imutável: domínio + termos ordenados.
///
/// ## Invariantes (verificadas em [`new()`](LinguisticVariable::new))
///
/// - `min < max` (ambos finitos)
/// - nomes de termos únicos dentro da variável
#[derive(Clone, Debug, PartialEq)]
pub struct LinguisticVariable {
    name: String,
    min: f64,
    max: f64,
    terms: Vec<FuzzySet>,
}

impl LinguisticVariable {
    /// Cria uma variável validando domínio e unicidade dos termos.
    pub fn new(
        name: impl Into<String>,
        min: f64,
        max: f64,
        terms: Vec<FuzzySet>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(ConfigError::InvalidDomain {
                variable: name,
                min,
                max,
            });
        }
        let mut seen = HashSet::new();
        for term in &terms {
            if !seen.insert(term.name.as_str()) {
                return Err(ConfigError::DuplicateTerm {
                    variable: name.clone(),
                    term: term.name.clone(),
                });
            }
        }
        Ok(Self {
            name,
            min,
            max,
            terms,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn terms(&self) -> &[FuzzySet] {
        &self.terms
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Limita um valor crisp ao domínio da variável.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Busca linear pelo índice do termo: usada apenas na carga.
    pub fn term_index(&self, term: &str) -> Option<TermId> {
        self.terms.iter().position(|t| t.name == term).map(TermId)
    }

    pub fn term(&self, id: TermId) -> Option<&FuzzySet> {
        self.terms.get(id.0)
    }
}

/// Resultado da fuzzificação de um valor: `termo → grau ∈ (ε, 1]`.
///
/// Internamente indexado por [`TermId`]; termos com grau ≤ ε foram
/// descartados e são tratados como ausentes (grau 0).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FuzzyMembershipMap {
    entries: Vec<(TermId, f64)>,
}

impl FuzzyMembershipMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, term: TermId, degree: f64) {
        self.entries.push((term, degree));
    }

    /// Grau do termo, ou `None` se ausente do mapa.
    pub fn get(&self, term: TermId) -> Option<f64> {
        self.entries
            .iter()
            .find(|(id, _)| *id == term)
            .map(|(_, degree)| *degree)
    }

    /// Grau do termo por nome, resolvido contra a variável de origem.
    pub fn degree_of(&self, variable: &LinguisticVariable, term: &str) -> f64 {
        variable
            .term_index(term)
            .and_then(|id| self.get(id))
            .unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Visão por nome, para traces e respostas JSON.
    pub fn named(&self, variable: &LinguisticVariable) -> BTreeMap<String, f64> {
        self.entries
            .iter()
            .filter_map(|(id, degree)| variable.term(*id).map(|t| (t.name.clone(), *degree)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(a: f64, b: f64, c: f64) -> MembershipFunction {
        MembershipFunction::Triangular { a, b, c }
    }

    #[test]
    fn rejects_inverted_domain() {
        let err = LinguisticVariable::new("X", 5.0, 1.0, vec![]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDomain { .. }));
        assert!(LinguisticVariable::new("X", 1.0, 1.0, vec![]).is_err());
    }

    #[test]
    fn rejects_duplicate_term_names() {
        let err = LinguisticVariable::new(
            "X",
            0.0,
            1.0,
            vec![FuzzySet::new("A", tri(0.0, 0.0, 1.0)), FuzzySet::new("A", tri(0.0, 1.0, 1.0))],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateTerm {
                variable: "X".into(),
                term: "A".into()
            }
        );
    }

    #[test]
    fn term_index_follows_declaration_order() {
        let var = LinguisticVariable::new(
            "X",
            0.0,
            1.0,
            vec![FuzzySet::new("Low", tri(0.0, 0.0, 1.0)), FuzzySet::new("High", tri(0.0, 1.0, 1.0))],
        )
        .unwrap();
        assert_eq!(var.term_index("Low"), Some(TermId(0)));
        assert_eq!(var.term_index("High"), Some(TermId(1)));
        assert_eq!(var.term_index("Mid"), None);
        assert_eq!(var.clamp(3.0), 1.0);
        assert_eq!(var.midpoint(), 0.5);
    }

    #[test]
    fn input_variable_names_round_trip() {
        for v in InputVariable::ALL {
            assert_eq!(InputVariable::from_name(v.name()), Some(v));
        }
        assert_eq!(InputVariable::from_name("Altitude"), None);
    }
}
