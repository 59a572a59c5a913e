//! # Módulo Inference — Motor de Inferência Mamdani
//!
//! Este módulo transforma entradas fuzzificadas em saídas crisp, em três
//! etapas executadas a cada ciclo de controle:
//!
//! ```text
//! FuzzifiedInputs ──► avaliação das regras ──► agregação ──► defuzzificação
//!                     (mín + peso)             (Max, ...)    (centroide, ...)
//! ```
//!
//! | Etapa | Onde | Resultado |
//! |-------|------|-----------|
//! | Avaliação | [`engine::firing_strength`] | força de disparo por regra |
//! | Agregação | [`AggregationMethod`] | grau por termo de saída |
//! | Defuzzificação | [`defuzzify::defuzzify`] | Throttle, Steering, Brake crisp |
//! | Fase | [`engine::dominant_phase`] | termo dominante de `ParkingPhase` |
//!
//! O motor não guarda estado entre ciclos: recebe a base de conhecimento
//! por referência e devolve um [`InferenceResult`] novo.

pub mod aggregation;
pub mod defuzzify;
pub mod engine;

pub use aggregation::AggregationMethod;
pub use defuzzify::{DefuzzificationMethod, DEFAULT_SAMPLES, MAX_SAMPLES};
pub use engine::{AggregatedOutputs, CrispOutputs, FiredRule, InferenceEngine, InferenceResult};
