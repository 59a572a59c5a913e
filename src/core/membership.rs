//! # Funções de Pertinência — A Matemática dos Termos Linguísticos
//!
//! Cada termo de uma variável linguística (ex: "VeryClose" em `FrontDistance`)
//! é descrito por uma **função de pertinência** `μ(x) → [0, 1]`, que diz o
//! quanto um valor crisp pertence àquele termo.
//!
//! ## Formas Suportadas
//!
//! | Forma | Parâmetros | Fórmula |
//! |-------|------------|---------|
//! | `Triangular` | (a, b, c) | rampa a→b, pico em b, rampa b→c |
//! | `Trapezoidal` | (a, b, c, d) | rampa a→b, platô [b, c], rampa c→d |
//! | `Gaussian` | (mean, sigma) | `exp(-0.5 × ((x - mean) / sigma)²)` |
//! | `Bell` | (a, b, c) | `1 / (1 + |(x - c) / a|^(2b))` |
//! | `Sigmoid` | (a, c) | `1 / (1 + exp(-a × (x - c)))` |
//!
//! ## Forma de Documento vs Forma Tipada
//!
//! No documento JSON da base de conhecimento um termo aparece como
//! `{ "kind": "triangular", "params": [0, 0, 1] }`. Na carga, o par
//! ([`MembershipKind`], `params`) é convertido em [`MembershipFunction`]
//! via [`MembershipFunction::from_params()`], que valida a contagem e a
//! ordem dos parâmetros. Depois disso a avaliação nunca falha.
//!
//! ```text
//! Triangular(0, 0, 1)          Trapezoidal(1, 2, 4, 5)
//!  1 ┤█                          1 ┤   ┌───┐
//!    │ █                           │  /     \
//!  0 ┼──█────                    0 ┼─/───────\──
//!    0  1                          1 2   4   5
//! ```

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Tipo de função de pertinência, como aparece no documento de configuração.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipKind {
    Triangular,
    Trapezoidal,
    Gaussian,
    Bell,
    Sigmoid,
}

impl MembershipKind {
    /// Número de parâmetros exigido por cada forma.
    pub fn param_count(&self) -> usize {
        match self {
            MembershipKind::Triangular => 3,
            MembershipKind::Trapezoidal => 4,
            MembershipKind::Gaussian => 2,
            MembershipKind::Bell => 3,
            MembershipKind::Sigmoid => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MembershipKind::Triangular => "triangular",
            MembershipKind::Trapezoidal => "trapezoidal",
            MembershipKind::Gaussian => "gaussian",
            MembershipKind::Bell => "bell",
            MembershipKind::Sigmoid => "sigmoid",
        }
    }
}

/// Função de pertinência tipada: parâmetros já validados.
///
/// Construída apenas via [`from_params()`](MembershipFunction::from_params)
/// (ou diretamente em testes e nos defaults). A avaliação é pura, sem efeitos
/// colaterais, e tolera `x` fora do domínio da variável.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MembershipFunction {
    Triangular { a: f64, b: f64, c: f64 },
    Trapezoidal { a: f64, b: f64, c: f64, d: f64 },
    Gaussian { mean: f64, sigma: f64 },
    Bell { a: f64, b: f64, c: f64 },
    Sigmoid { a: f64, c: f64 },
}

impl MembershipFunction {
    /// Converte a forma de documento (`kind` + `params`) na forma tipada.
    ///
    /// # Erros
    ///
    /// - [`ConfigError::ParamCount`] se o número de parâmetros não bate com o tipo
    /// - [`ConfigError::NonFiniteParam`] se algum parâmetro for NaN/infinito
    /// - [`ConfigError::UnorderedPoints`] se pontos triangulares/trapezoidais decrescem
    pub fn from_params(term: &str, kind: MembershipKind, params: &[f64]) -> Result<Self, ConfigError> {
        if params.len() != kind.param_count() {
            return Err(ConfigError::ParamCount {
                term: term.to_string(),
                kind: kind.label(),
                expected: kind.param_count(),
                found: params.len(),
            });
        }
        if params.iter().any(|p| !p.is_finite()) {
            return Err(ConfigError::NonFiniteParam {
                term: term.to_string(),
            });
        }

        let function = match kind {
            MembershipKind::Triangular => MembershipFunction::Triangular {
                a: params[0],
                b: params[1],
                c: params[2],
            },
            MembershipKind::Trapezoidal => MembershipFunction::Trapezoidal {
                a: params[0],
                b: params[1],
                c: params[2],
                d: params[3],
            },
            MembershipKind::Gaussian => MembershipFunction::Gaussian {
                mean: params[0],
                sigma: params[1],
            },
            MembershipKind::Bell => MembershipFunction::Bell {
                a: params[0],
                b: params[1],
                c: params[2],
            },
            MembershipKind::Sigmoid => MembershipFunction::Sigmoid {
                a: params[0],
                c: params[1],
            },
        };

        // Pontos de controle lineares devem ser não-decrescentes
        if matches!(kind, MembershipKind::Triangular | MembershipKind::Trapezoidal)
            && params.windows(2).any(|w| w[0] > w[1])
        {
            return Err(ConfigError::UnorderedPoints {
                term: term.to_string(),
            });
        }

        Ok(function)
    }

    /// Tipo da função, para serialização de volta ao documento.
    pub fn kind(&self) -> MembershipKind {
        match self {
            MembershipFunction::Triangular { .. } => MembershipKind::Triangular,
            MembershipFunction::Trapezoidal { .. } => MembershipKind::Trapezoidal,
            MembershipFunction::Gaussian { .. } => MembershipKind::Gaussian,
            MembershipFunction::Bell { .. } => MembershipKind::Bell,
            MembershipFunction::Sigmoid { .. } => MembershipKind::Sigmoid,
        }
    }

    /// Parâmetros na ordem do documento.
    pub fn params(&self) -> Vec<f64> {
        match *self {
            MembershipFunction::Triangular { a, b, c } => vec![a, b, c],
            MembershipFunction::Trapezoidal { a, b, c, d } => vec![a, b, c, d],
            MembershipFunction::Gaussian { mean, sigma } => vec![mean, sigma],
            MembershipFunction::Bell { a, b, c } => vec![a, b, c],
            MembershipFunction::Sigmoid { a, c } => vec![a, c],
        }
    }

    /// Avalia o grau de pertinência de `x`, sempre em `[0, 1]`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let degree = match *self {
            MembershipFunction::Triangular { a, b, c } => triangular(x, a, b, c),
            MembershipFunction::Trapezoidal { a, b, c, d } => trapezoidal(x, a, b, c, d),
            MembershipFunction::Gaussian { mean, sigma } => gaussian(x, mean, sigma),
            MembershipFunction::Bell { a, b, c } => bell(x, a, b, c),
            MembershipFunction::Sigmoid { a, c } => sigmoid(x, a, c),
        };
        if degree.is_nan() {
            0.0
        } else {
            degree.clamp(0.0, 1.0)
        }
    }
}

/// Triângulo (a, b, c). Casos degenerados `a == b` ou `b == c` produzem
/// um "ombro": grau 1 na borda correspondente.
pub fn triangular(x: f64, a: f64, b: f64, c: f64) -> f64 {
    if x < a || x > c {
        return 0.0;
    }
    if x == b {
        return 1.0;
    }
    if x < b {
        (x - a) / (b - a)
    } else {
        (c - x) / (c - b)
    }
}

/// Trapézio (a, b, c, d): platô de grau 1 em `[b, c]`.
pub fn trapezoidal(x: f64, a: f64, b: f64, c: f64, d: f64) -> f64 {
    if x < a || x > d {
        return 0.0;
    }
    if x >= b && x <= c {
        return 1.0;
    }
    if x < b {
        (x - a) / (b - a)
    } else {
        (d - x) / (d - c)
    }
}

/// Gaussiana. `sigma <= 0` resulta em grau 0 (evita divisão por zero).
pub fn gaussian(x: f64, mean: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 {
        return 0.0;
    }
    let z = (x - mean) / sigma;
    (-0.5 * z * z).exp()
}

/// Sino generalizado. Com `a == 0` a curva degenera em um pico em `c`.
pub fn bell(x: f64, a: f64, b: f64, c: f64) -> f64 {
    if a == 0.0 {
        return if x == c { 1.0 } else { 0.0 };
    }
    1.0 / (1.0 + ((x - c) / a).abs().powf(2.0 * b))
}

pub fn sigmoid(x: f64, a: f64, c: f64) -> f64 {
    1.0 / (1.0 + (-a * (x - c)).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    // ─── triangular ─────────────────────────────────────────────

    #[test]
    fn triangular_endpoints_and_peak() {
        let f = MembershipFunction::Triangular { a: 1.0, b: 3.0, c: 7.0 };
        assert!(f.evaluate(1.0).abs() < EPS);
        assert!((f.evaluate(3.0) - 1.0).abs() < EPS);
        assert!(f.evaluate(7.0).abs() < EPS);
        assert_eq!(f.evaluate(0.0), 0.0);
        assert_eq!(f.evaluate(8.0), 0.0);
    }

    #[test]
    fn triangular_is_monotonic_on_each_side() {
        let f = MembershipFunction::Triangular { a: -2.0, b: 0.5, c: 4.0 };
        let mut prev = f.evaluate(-2.0);
        let mut x = -2.0;
        while x <= 0.5 {
            let mu = f.evaluate(x);
            assert!(mu + EPS >= prev, "não-decrescente em [a, b]");
            prev = mu;
            x += 0.05;
        }
        let mut prev = f.evaluate(0.5);
        let mut x = 0.5;
        while x <= 4.0 {
            let mu = f.evaluate(x);
            assert!(mu <= prev + EPS, "não-crescente em [b, c]");
            prev = mu;
            x += 0.05;
        }
    }

    #[test]
    fn triangular_left_shoulder() {
        // VeryClose = Triangular(0, 0, 1), entrada 0.3 → 0.7
        let f = MembershipFunction::Triangular { a: 0.0, b: 0.0, c: 1.0 };
        assert!((f.evaluate(0.0) - 1.0).abs() < EPS);
        assert!((f.evaluate(0.3) - 0.7).abs() < EPS);
        assert!(f.evaluate(1.0).abs() < EPS);
    }

    #[test]
    fn triangular_right_shoulder() {
        let f = MembershipFunction::Triangular { a: 9.0, b: 10.0, c: 10.0 };
        assert!((f.evaluate(10.0) - 1.0).abs() < EPS);
        assert!((f.evaluate(9.5) - 0.5).abs() < EPS);
    }

    // ─── demais formas ──────────────────────────────────────────

    #[test]
    fn trapezoidal_plateau_and_ramps() {
        let f = MembershipFunction::Trapezoidal { a: 1.0, b: 2.0, c: 4.0, d: 5.0 };
        assert_eq!(f.evaluate(1.0), 0.0);
        assert!((f.evaluate(1.5) - 0.5).abs() < EPS);
        assert_eq!(f.evaluate(3.0), 1.0);
        assert!((f.evaluate(4.5) - 0.5).abs() < EPS);
        assert_eq!(f.evaluate(5.0), 0.0);
        assert_eq!(f.evaluate(6.0), 0.0);
    }

    #[test]
    fn gaussian_peak_and_guard() {
        let f = MembershipFunction::Gaussian { mean: 2.0, sigma: 1.0 };
        assert!((f.evaluate(2.0) - 1.0).abs() < EPS);
        assert!((f.evaluate(3.0) - (-0.5f64).exp()).abs() < EPS);
        let degenerate = MembershipFunction::Gaussian { mean: 2.0, sigma: 0.0 };
        assert_eq!(degenerate.evaluate(2.0), 0.0);
    }

    #[test]
    fn bell_half_point() {
        let f = MembershipFunction::Bell { a: 2.0, b: 3.0, c: 0.0 };
        assert!((f.evaluate(0.0) - 1.0).abs() < EPS);
        assert!((f.evaluate(2.0) - 0.5).abs() < EPS);
        assert!((f.evaluate(-2.0) - 0.5).abs() < EPS);
    }

    #[test]
    fn sigmoid_crosses_half_at_center() {
        let f = MembershipFunction::Sigmoid { a: 10.0, c: 0.5 };
        assert!((f.evaluate(0.5) - 0.5).abs() < EPS);
        assert!(f.evaluate(1.0) > 0.99);
        assert!(f.evaluate(0.0) < 0.01);
    }

    // ─── from_params ────────────────────────────────────────────

    #[test]
    fn from_params_rejects_wrong_count() {
        let err = MembershipFunction::from_params("Near", MembershipKind::Triangular, &[0.0, 1.0])
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParamCount { expected: 3, found: 2, .. }));
    }

    #[test]
    fn from_params_rejects_decreasing_points() {
        let err = MembershipFunction::from_params(
            "Near",
            MembershipKind::Trapezoidal,
            &[0.0, 2.0, 1.0, 3.0],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnorderedPoints { .. }));
    }

    #[test]
    fn from_params_keeps_document_order() {
        let f = MembershipFunction::from_params("Mid", MembershipKind::Bell, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(f.kind(), MembershipKind::Bell);
        assert_eq!(f.params(), vec![1.0, 2.0, 3.0]);
    }
}
