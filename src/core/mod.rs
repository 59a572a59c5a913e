//! # Módulo Core — Tipos Fundamentais do Controlador Fuzzy
//!
//! Este módulo agrupa o **modelo de dados** sobre o qual todo o pipeline
//! de controle opera:
//!
//! - [`MembershipFunction`]: curvas de pertinência (triangular, trapezoidal, ...)
//! - [`LinguisticVariable`]: variável de entrada com domínio e termos
//! - [`InputVariable`] / [`OutputVariable`]: identificadores fechados e tipados
//! - [`OutputFuzzySet`]: termos triangulares usados na defuzzificação
//! - [`ParkingPhase`]: fase sugerida da manobra
//! - [`KnowledgeBase`]: registro de variáveis + base de regras, compilado
//! - [`ConfigError`] / [`ConfigWarning`]: problemas de carga
//!
//! ## Analogia
//!
//! Pense na [`KnowledgeBase`] como o **manual do motorista**:
//! - Cada [`LinguisticVariable`] é um **sentido** ("quão perto está a parede?")
//! - Cada termo é uma **palavra** que o motorista usa ("muito perto", "longe")
//! - As regras dizem o que fazer quando as palavras se combinam

/// Erros e avisos de configuração.
pub mod error;

/// Biblioteca de funções de pertinência.
pub mod membership;

/// Variáveis linguísticas de entrada e mapas de pertinência.
pub mod variable;

/// Variáveis e conjuntos de saída, fases de estacionamento.
pub mod output;

/// Documento da base de conhecimento e sua compilação.
pub mod knowledge_base;

pub use error::{ConfigError, ConfigWarning};
pub use knowledge_base::{KnowledgeBase, KnowledgeBaseDocument};
pub use membership::{MembershipFunction, MembershipKind};
pub use output::{OutputFuzzySet, OutputTerm, OutputVariable, ParkingPhase};
pub use variable::{FuzzyMembershipMap, FuzzySet, InputVariable, LinguisticVariable, TermId};
