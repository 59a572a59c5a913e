//! # Política de Agregação
//!
//! Quando várias regras votam no mesmo termo de saída, as contribuições
//! (`força × confiança`) são combinadas pela política configurada:
//!
//! | Política | Combinação | Observação |
//! |----------|------------|------------|
//! | `Max` (padrão) | `max(a, b)` | idempotente: reforça só até o voto mais forte |
//! | `BoundedSum` | `min(1, a + b)` | satura em 1 |
//! | `ProbabilisticSum` | `a + b - a·b` | OR probabilístico |

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    #[default]
    Max,
    BoundedSum,
    ProbabilisticSum,
}

impl AggregationMethod {
    /// Combina o grau já agregado com uma nova contribuição.
    pub fn combine(&self, current: f64, contribution: f64) -> f64 {
        match self {
            AggregationMethod::Max => current.max(contribution),
            AggregationMethod::BoundedSum => (current + contribution).min(1.0),
            AggregationMethod::ProbabilisticSum => current + contribution - current * contribution,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AggregationMethod::Max => "max",
            AggregationMethod::BoundedSum => "bounded_sum",
            AggregationMethod::ProbabilisticSum => "probabilistic_sum",
        }
    }
}
