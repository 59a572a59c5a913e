//! # FuzzyController — O Ciclo de Controle
//!
//! O [`FuzzyController`] é o **ponto de entrada** do núcleo. Ele possui a
//! base de conhecimento e expõe as duas operações do controlador:
//!
//! - [`configure()`](FuzzyController::configure): substitui a base (`&mut self`)
//! - [`evaluate()`](FuzzyController::evaluate): roda um ciclo (`&self`)
//!
//! ## Um ciclo
//!
//! ```text
//! CrispSnapshot
//!   │
//!   ├── 1. derived::crisp_inputs   → valida e calcula entradas derivadas
//!   ├── 2. FuzzifiedInputs         → termo → grau por variável
//!   ├── 3. InferenceEngine::infer  → regras, agregação, defuzzificação
//!   └── 4. assemble                → Command + override de emergência
//! ```
//!
//! Qualquer [`CycleFault`] nas etapas 1–3 vira
//! `CycleOutcome::Degraded` com o comando neutro. Nada do ciclo anterior
//! influencia o seguinte.
//!
//! ## Concorrência
//!
//! Como `evaluate` recebe `&self` e `configure` exige `&mut self`, o borrow
//! checker garante que a base só muda **entre** ciclos. Na camada web o
//! controlador fica num `Arc<RwLock<_>>`.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::command::{Command, CycleFault, CycleOutcome};
use crate::core::{ConfigError, ConfigWarning, InputVariable, KnowledgeBase, KnowledgeBaseDocument, OutputVariable, ParkingPhase};
use crate::fuzzifier::{crisp_inputs, CrispInputs, DerivedSettings, FuzzifiedInputs};
use crate::inference::{CrispOutputs, DefuzzificationMethod, InferenceEngine, InferenceResult};
use crate::perception::CrispSnapshot;

/// Freio crisp acima deste valor liga `brake`.
pub const BRAKE_THRESHOLD: f64 = 0.5;

/// Grau de `Brake[EmergencyBrake]` acima do qual o override de segurança age.
pub const EMERGENCY_THRESHOLD: f64 = 0.7;

/// Resumo de uma regra disparada, para trace e diário.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FiredRuleSummary {
    pub name: String,
    pub phase: ParkingPhase,
    pub strength: f64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Tudo que aconteceu dentro de um ciclo.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CycleTrace {
    pub crisp_inputs: CrispInputs,
    pub fuzzified: BTreeMap<InputVariable, BTreeMap<String, f64>>,
    /// Regras disparadas, em ordem decrescente de força.
    pub fired: Vec<FiredRuleSummary>,
    pub aggregated: BTreeMap<OutputVariable, BTreeMap<String, f64>>,
    pub outputs: Option<CrispOutputs>,
}

impl CycleTrace {
    pub fn dominant_rule(&self) -> Option<&FiredRuleSummary> {
        self.fired.first()
    }
}

/// Resultado de [`FuzzyController::evaluate_detailed`].
#[derive(Clone, Debug)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    pub trace: CycleTrace,
    pub duration: Duration,
}

/// Controlador fuzzy de estacionamento.
pub struct FuzzyController {
    kb: Option<KnowledgeBase>,
    derived: DerivedSettings,
}

impl Default for FuzzyController {
    fn default() -> Self {
        Self::new(DerivedSettings::default())
    }
}

impl FuzzyController {
    /// Controlador ainda sem base: todo ciclo degrada até `configure`.
    pub fn new(derived: DerivedSettings) -> Self {
        Self { kb: None, derived }
    }

    /// Compila e instala um documento.
    ///
    /// Em caso de erro a base anterior continua valendo. Os avisos
    /// consultivos são logados e devolvidos.
    pub fn configure(&mut self, doc: KnowledgeBaseDocument) -> Result<Vec<ConfigWarning>, ConfigError> {
        let (kb, warnings) = KnowledgeBase::compile(doc).map_err(|e| {
            tracing::error!(error = %e, "FuzzyController: base rejeitada, mantendo a anterior");
            e
        })?;
        for warning in &warnings {
            tracing::warn!("{}", warning);
        }
        tracing::info!(
            rules = kb.rule_base().len(),
            enabled = kb.rule_base().enabled_count(),
            method = kb.rule_base().defuzzification.label(),
            "FuzzyController: base de conhecimento configurada"
        );
        self.kb = Some(kb);
        Ok(warnings)
    }

    pub fn is_configured(&self) -> bool {
        self.kb.is_some()
    }

    pub fn knowledge_base(&self) -> Option<&KnowledgeBase> {
        self.kb.as_ref()
    }

    /// Acesso mutável para habilitar regras e ajustar pesos entre ciclos.
    pub fn knowledge_base_mut(&mut self) -> Option<&mut KnowledgeBase> {
        self.kb.as_mut()
    }

    /// Troca o método de defuzzificação. `false` se não configurado.
    pub fn set_defuzzification(&mut self, method: DefuzzificationMethod) -> bool {
        match self.kb.as_mut() {
            Some(kb) => {
                kb.rule_base_mut().defuzzification = method;
                tracing::info!(method = method.label(), "FuzzyController: defuzzificação alterada");
                true
            }
            None => false,
        }
    }

    /// Roda um ciclo completo.
    pub fn evaluate(&self, snapshot: &CrispSnapshot) -> CycleOutcome {
        self.evaluate_detailed(snapshot).outcome
    }

    /// Roda um ciclo e devolve também o trace.
    pub fn evaluate_detailed(&self, snapshot: &CrispSnapshot) -> CycleReport {
        let start = Instant::now();
        let mut trace = CycleTrace::default();

        let outcome = match self.run_cycle(snapshot, &mut trace) {
            Ok(command) => CycleOutcome::Ok(command),
            Err(fault) => {
                tracing::warn!(reason = %fault, "FuzzyController: ciclo degradado, comando neutro");
                CycleOutcome::degraded(fault)
            }
        };

        CycleReport {
            outcome,
            trace,
            duration: start.elapsed(),
        }
    }

    fn run_cycle(&self, snapshot: &CrispSnapshot, trace: &mut CycleTrace) -> Result<Command, CycleFault> {
        let kb = self.kb.as_ref().ok_or(CycleFault::NotConfigured)?;

        let crisp = crisp_inputs(snapshot, &self.derived)?;
        let fuzzified = FuzzifiedInputs::from_crisp(kb, &crisp);
        trace.fuzzified = fuzzified.named(kb);
        trace.crisp_inputs = crisp;

        let result = InferenceEngine::infer(kb, &fuzzified)?;
        fill_trace(trace, kb, &result);

        let command = assemble(&result.outputs);
        tracing::debug!(
            throttle = command.throttle,
            steering = command.steering,
            brake = command.brake,
            emergency = command.emergency_stop,
            phase = %command.suggested_phase,
            "FuzzyController: comando"
        );
        Ok(command)
    }
}

fn fill_trace(trace: &mut CycleTrace, kb: &KnowledgeBase, result: &InferenceResult) {
    let rules = kb.rule_base().rules();
    let mut fired: Vec<FiredRuleSummary> = result
        .fired
        .iter()
        .map(|f| FiredRuleSummary {
            name: f.name.clone(),
            phase: f.phase,
            strength: f.strength,
            description: rules.get(f.index).map(|r| r.description.clone()).unwrap_or_default(),
        })
        .collect();
    // sort estável: empates mantêm a ordem da base
    fired.sort_by(|a, b| b.strength.total_cmp(&a.strength));
    trace.fired = fired;

    trace.aggregated = OutputVariable::ALL
        .iter()
        .map(|&v| (v, result.aggregated.named(kb, v)))
        .filter(|(_, terms)| !terms.is_empty())
        .collect();
    trace.outputs = Some(result.outputs);
}

/// Monta o comando a partir das saídas crisp e aplica o override de
/// emergência: `Brake[EmergencyBrake] > 0.7` força parada.
pub fn assemble(outputs: &CrispOutputs) -> Command {
    let mut command = Command {
        throttle: outputs.throttle.clamp(-1.0, 1.0),
        steering: outputs.steering.clamp(-1.0, 1.0),
        brake: outputs.brake > BRAKE_THRESHOLD,
        emergency_stop: false,
        suggested_phase: outputs.phase,
    };

    if outputs.emergency_degree > EMERGENCY_THRESHOLD {
        command.emergency_stop = true;
        command.brake = true;
        command.throttle = 0.0;
    }

    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::{Direction, ParkingSpotInfo, Vec2};
    use crate::rules::defaults;

    fn controller() -> FuzzyController {
        let mut controller = FuzzyController::default();
        controller.configure(defaults::document()).unwrap();
        controller
    }

    fn open_road() -> CrispSnapshot {
        CrispSnapshot {
            position: Vec2::new(0.0, 0.0),
            heading: 0.0,
            speed: 1.0,
            max_speed: 2.5,
            direction: Direction::Forward,
            sensors: vec![10.0; 8],
            spots: vec![],
            obstacles: vec![],
        }
    }

    #[test]
    fn emergency_override_forces_stop() {
        let outputs = CrispOutputs {
            throttle: 0.8,
            steering: 0.3,
            brake: 0.2,
            phase: ParkingPhase::Approaching,
            emergency_degree: 0.8,
        };
        let command = assemble(&outputs);
        assert!(command.emergency_stop);
        assert!(command.brake);
        assert_eq!(command.throttle, 0.0);
        assert_eq!(command.steering, 0.3);
    }

    #[test]
    fn brake_threshold_and_clamping() {
        let outputs = CrispOutputs {
            throttle: 1.4,
            steering: -3.0,
            brake: 0.51,
            phase: ParkingPhase::Searching,
            emergency_degree: 0.7,
        };
        let command = assemble(&outputs);
        assert!(command.brake);
        assert!(!command.emergency_stop);
        assert_eq!(command.throttle, 1.0);
        assert_eq!(command.steering, -1.0);
    }

    #[test]
    fn unconfigured_controller_degrades() {
        let controller = FuzzyController::default();
        let outcome = controller.evaluate(&open_road());
        assert_eq!(outcome, CycleOutcome::degraded(CycleFault::NotConfigured));
    }

    #[test]
    fn invalid_snapshot_degrades_without_affecting_next_cycle() {
        let controller = controller();
        let mut broken = open_road();
        broken.sensors.truncate(3);
        let outcome = controller.evaluate(&broken);
        assert!(matches!(outcome.reason(), Some(CycleFault::InvalidSnapshot(_))));
        assert_eq!(*outcome.command(), Command::neutral());

        assert!(!controller.evaluate(&open_road()).is_degraded());
    }

    #[test]
    fn nan_reading_degrades() {
        let controller = controller();
        let mut snapshot = open_road();
        snapshot.heading = f64::NAN;
        assert!(controller.evaluate(&snapshot).is_degraded());
    }

    #[test]
    fn obstacle_dead_ahead_triggers_emergency() {
        let controller = controller();
        let mut snapshot = open_road();
        snapshot.sensors[0] = 0.1;
        let report = controller.evaluate_detailed(&snapshot);
        let command = *report.outcome.command();
        assert!(!report.outcome.is_degraded());
        assert!(command.emergency_stop);
        assert!(command.brake);
        assert_eq!(command.throttle, 0.0);
        assert_eq!(command.suggested_phase, ParkingPhase::Emergency);
        assert_eq!(report.trace.dominant_rule().unwrap().name, "front_emergency");
    }

    #[test]
    fn open_road_without_target_cruises_forward() {
        let controller = controller();
        let report = controller.evaluate_detailed(&open_road());
        let command = *report.outcome.command();
        assert!(command.throttle > 0.2, "throttle = {}", command.throttle);
        assert!(command.steering.abs() < 0.1, "steering = {}", command.steering);
        assert!(!command.brake);
        assert_eq!(command.suggested_phase, ParkingPhase::Searching);
        assert!(report.trace.fired.iter().any(|r| r.name == "search_cruise"));
    }

    #[test]
    fn target_to_the_left_steers_left() {
        let controller = controller();
        let mut snapshot = open_road();
        snapshot.spots.push(ParkingSpotInfo {
            position: Vec2::new(20.0, 10.0),
            width: 2.5,
            length: 5.0,
            orientation: 90.0,
            distance_to_car: 22.4,
        });
        let command = *controller.evaluate(&snapshot).command();
        assert!(command.steering < 0.0, "steering = {}", command.steering);
        assert_eq!(command.suggested_phase, ParkingPhase::Approaching);
    }

    #[test]
    fn all_rules_disabled_gives_neutral_command() {
        let mut controller = controller();
        controller
            .knowledge_base_mut()
            .unwrap()
            .rule_base_mut()
            .set_all_enabled(false);
        let mut snapshot = open_road();
        snapshot.sensors[0] = 0.1;
        for _ in 0..3 {
            assert_eq!(controller.evaluate(&snapshot), CycleOutcome::Ok(Command::neutral()));
        }
    }

    #[test]
    fn empty_rule_base_gives_neutral_command_every_cycle() {
        let mut doc = defaults::document();
        doc.rules = vec![];
        let mut controller = FuzzyController::default();
        controller.configure(doc).unwrap();

        let mut near_obstacle = open_road();
        near_obstacle.sensors[0] = 0.1;
        for snapshot in [open_road(), near_obstacle, open_road()] {
            assert_eq!(controller.evaluate(&snapshot), CycleOutcome::Ok(Command::neutral()));
        }
    }

    #[test]
    fn oversized_resolution_is_rejected_and_cycles_keep_running() {
        let mut controller = controller();
        let mut doc = defaults::document();
        doc.samples = usize::MAX;
        assert_eq!(
            controller.configure(doc),
            Err(ConfigError::InvalidSampleCount(usize::MAX))
        );

        let outcome = controller.evaluate(&open_road());
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.command().suggested_phase, ParkingPhase::Searching);
    }

    #[test]
    fn rejected_document_keeps_previous_base() {
        let mut controller = controller();
        let before = controller.knowledge_base().unwrap().rule_base().len();
        let mut doc = defaults::document();
        doc.samples = 0;
        assert!(controller.configure(doc).is_err());
        assert_eq!(controller.knowledge_base().unwrap().rule_base().len(), before);
    }

    #[test]
    fn defuzzification_method_can_change_between_cycles() {
        let mut controller = controller();
        for method in DefuzzificationMethod::ALL {
            assert!(controller.set_defuzzification(method));
            assert!(!controller.evaluate(&open_road()).is_degraded());
        }
        assert!(!FuzzyController::default().set_defuzzification(DefuzzificationMethod::Bisector));
    }
}
