//! # Erros e Avisos de Configuração
//!
//! Dois níveis de problema podem surgir ao carregar uma base de conhecimento:
//!
//! | Tipo | Efeito | Exemplos |
//! |------|--------|----------|
//! | [`ConfigError`] | Documento **rejeitado** na carga | termo inexistente, parâmetros inválidos |
//! | [`ConfigWarning`] | Apenas **logado** (não fatal) | nome de regra duplicado, peso fora da faixa |
//!
//! Nomes desconhecidos (variáveis e termos) são resolvidos e rejeitados na
//! carga: nunca em tempo de avaliação. Problemas "suaves" de regras viram
//! avisos: a regra simplesmente nunca dispara, ou dispara com valores
//! ajustados para a faixa válida.

use thiserror::Error;

/// Erro fatal de configuração: a base de conhecimento não é aceita.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("termo '{term}': {kind} exige {expected} parâmetros, encontrados {found}")]
    ParamCount {
        term: String,
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("termo '{term}': parâmetro não finito")]
    NonFiniteParam { term: String },

    #[error("termo '{term}': pontos de controle devem ser não-decrescentes")]
    UnorderedPoints { term: String },

    #[error("variável '{variable}': domínio inválido [{min}, {max}]")]
    InvalidDomain { variable: String, min: f64, max: f64 },

    #[error("variável '{variable}': termo '{term}' duplicado")]
    DuplicateTerm { variable: String, term: String },

    #[error("regra '{rule}': variável '{variable}' não está registrada")]
    UnknownVariable { rule: String, variable: String },

    #[error("regra '{rule}': termo '{term}' não existe na variável '{variable}'")]
    UnknownTerm {
        rule: String,
        variable: String,
        term: String,
    },

    #[error("conjunto de saída ausente para '{variable}'")]
    MissingOutput { variable: String },

    #[error("conjunto de saída '{variable}' não define o termo obrigatório '{term}'")]
    MissingOutputTerm { variable: String, term: String },

    #[error("número de amostras inválido: {0} (entre 2 e 10000)")]
    InvalidSampleCount(usize),
}

/// Aviso de configuração: logado, não impede a carga.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigWarning {
    #[error("regra '{name}' duplicada (a busca por nome retorna a primeira)")]
    DuplicateRule { name: String },

    #[error("regra '{rule}': peso {weight} fora de [0.1, 2.0], ajustado")]
    WeightOutOfRange { rule: String, weight: f64 },

    #[error("regra '{rule}': confiança {confidence} fora de [0.1, 1.0], ajustada")]
    ConfidenceOutOfRange { rule: String, confidence: f64 },

    #[error("regra '{rule}' sem condições: nunca dispara")]
    EmptyConditions { rule: String },

    #[error("regra '{rule}' sem ações: nunca dispara")]
    EmptyActions { rule: String },

    #[error("variável '{variable}' sem termos: fuzzificação sempre vazia")]
    EmptyVariable { variable: String },
}
