//! # Módulo Rules — Regras Fuzzy e Base de Regras
//!
//! - [`FuzzyRule`]: uma regra `SE ... ENTÃO ...` com fase, peso e confianças
//! - [`RuleBase`]: coleção ordenada com índice por nome e operações em bloco
//! - [`defaults`]: a base de conhecimento de estacionamento embutida

pub mod defaults;
pub mod rule;
pub mod rule_base;

pub use rule::{FuzzyRule, Operator, RuleAction, RuleCondition};
pub use rule_base::RuleBase;
