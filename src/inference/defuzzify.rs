//! # Defuzzificação — Do Conjunto Agregado ao Valor Crisp
//!
//! O domínio da saída é amostrado em `N` pontos igualmente espaçados
//! (incluindo as duas bordas). Em cada ponto, a pertinência agregada é
//!
//! ```text
//! μ(x) = max sobre termos ativos de min(triângulo_termo(x), grau_termo)
//! ```
//!
//! ou seja, cada triângulo é "cortado" no grau agregado do termo e a
//! envoltória é o máximo entre termos.
//!
//! ## Métodos
//!
//! | Método | Resultado |
//! |--------|-----------|
//! | `Centroid` | `Σ(x·μ) / Σμ` |
//! | `Bisector` | primeiro `x` onde a área acumulada atinge metade da área total |
//! | `MeanOfMaximum` | média dos `x` que atingem o máximo |
//! | `Maximum` | primeiro `x` que atinge o máximo (sempre 100 amostras) |
//!
//! Em todos os métodos, um agregado vazio (`Σμ = 0`) resulta no ponto
//! médio do domínio.

use serde::{Deserialize, Serialize};

use crate::core::OutputFuzzySet;

/// Resolução padrão da amostragem.
pub const DEFAULT_SAMPLES: usize = 100;

/// `Maximum` ignora a resolução global e usa sempre esta.
pub const MAXIMUM_SAMPLES: usize = 100;

/// Teto da resolução aceita na carga da base.
pub const MAX_SAMPLES: usize = 10_000;

/// Tolerância para comparar pertinências com o máximo.
const MAX_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefuzzificationMethod {
    #[default]
    Centroid,
    Bisector,
    MeanOfMaximum,
    Maximum,
}

impl DefuzzificationMethod {
    pub const ALL: [DefuzzificationMethod; 4] = [
        DefuzzificationMethod::Centroid,
        DefuzzificationMethod::Bisector,
        DefuzzificationMethod::MeanOfMaximum,
        DefuzzificationMethod::Maximum,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DefuzzificationMethod::Centroid => "centroid",
            DefuzzificationMethod::Bisector => "bisector",
            DefuzzificationMethod::MeanOfMaximum => "mean_of_maximum",
            DefuzzificationMethod::Maximum => "maximum",
        }
    }
}

/// Pertinência agregada em `x`: envoltória dos triângulos cortados.
///
/// `degrees` é indexado pelo [`TermId`](crate::core::TermId) do conjunto.
pub fn aggregated_membership(set: &OutputFuzzySet, degrees: &[f64], x: f64) -> f64 {
    set.terms()
        .iter()
        .zip(degrees)
        .filter(|(_, &degree)| degree > 0.0)
        .map(|(term, &degree)| term.shape(x).min(degree))
        .fold(0.0, f64::max)
}

/// Amostra o domínio: `(x, μ(x))` para `samples` pontos, bordas inclusas.
///
/// O iterador é preguiçoso; `samples` é limitado a `[2, MAX_SAMPLES]`.
fn sample<'a>(
    set: &'a OutputFuzzySet,
    degrees: &'a [f64],
    samples: usize,
) -> (f64, impl Iterator<Item = (f64, f64)> + Clone + 'a) {
    let samples = samples.clamp(2, MAX_SAMPLES);
    let min = set.min();
    let step = (set.max() - min) / (samples - 1) as f64;
    let points = (0..samples).map(move |i| {
        let x = min + step * i as f64;
        (x, aggregated_membership(set, degrees, x))
    });
    (step, points)
}

/// Defuzzifica o agregado de uma saída contínua.
pub fn defuzzify(
    method: DefuzzificationMethod,
    set: &OutputFuzzySet,
    degrees: &[f64],
    samples: usize,
) -> f64 {
    let midpoint = set.midpoint();
    if degrees.iter().all(|&d| d <= 0.0) {
        return midpoint;
    }

    match method {
        DefuzzificationMethod::Centroid => {
            let (_, points) = sample(set, degrees, samples);
            let (weighted, total) = points.fold((0.0, 0.0), |(wx, w), (x, mu)| (wx + x * mu, w + mu));
            if total <= 0.0 {
                midpoint
            } else {
                weighted / total
            }
        }
        DefuzzificationMethod::Bisector => {
            let (step, points) = sample(set, degrees, samples);
            let total_area: f64 = points.clone().map(|(_, mu)| mu * step).sum();
            if total_area <= 0.0 {
                return midpoint;
            }
            let half = total_area / 2.0;
            let mut area = 0.0;
            for (x, mu) in points {
                area += mu * step;
                if area >= half {
                    return x;
                }
            }
            midpoint
        }
        DefuzzificationMethod::MeanOfMaximum => {
            let (_, points) = sample(set, degrees, samples);
            let peak = points.clone().map(|(_, mu)| mu).fold(0.0, f64::max);
            if peak <= 0.0 {
                return midpoint;
            }
            let (sum, count) = points
                .filter(|&(_, mu)| (mu - peak).abs() < MAX_TOLERANCE)
                .fold((0.0, 0usize), |(s, n), (x, _)| (s + x, n + 1));
            if count == 0 {
                midpoint
            } else {
                sum / count as f64
            }
        }
        DefuzzificationMethod::Maximum => {
            let (_, mut points) = sample(set, degrees, MAXIMUM_SAMPLES);
            let peak = points.clone().map(|(_, mu)| mu).fold(0.0, f64::max);
            if peak <= 0.0 {
                return midpoint;
            }
            points
                .find(|&(_, mu)| (mu - peak).abs() < MAX_TOLERANCE)
                .map(|(x, _)| x)
                .unwrap_or(midpoint)
        }
    }
}
