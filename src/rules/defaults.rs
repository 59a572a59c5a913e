//! # Base de Conhecimento Padrão de Estacionamento
//!
//! Variáveis, conjuntos de saída e regras usados quando não existe
//! `data/knowledge_base.json`. O documento gerado aqui é gravado em disco
//! na primeira execução e pode ser editado livremente depois.
//!
//! ## Convenções de sinal
//!
//! | Grandeza | Positivo significa |
//! |----------|--------------------|
//! | `AngleToTarget` | alvo à **esquerda** do carro |
//! | `HeadingError` | carro girado à esquerda da orientação da vaga |
//! | `LateralError` | carro à esquerda do eixo da vaga |
//! | `LongitudinalError` | carro à frente do centro da vaga |
//! | `Steering` | direita (negativo = esquerda) |
//! | `Throttle` | frente (negativo = ré) |

use std::collections::BTreeMap;

use crate::core::knowledge_base::{KnowledgeBaseDocument, OutputDocument, TermDocument, VariableDocument};
use crate::core::{InputVariable, MembershipKind, OutputTerm, OutputVariable, ParkingPhase};
use crate::core::{InputVariable as In, OutputVariable as Out};
use crate::inference::{AggregationMethod, DefuzzificationMethod, DEFAULT_SAMPLES};

use super::rule::FuzzyRule;

fn tri(name: &str, a: f64, b: f64, c: f64) -> TermDocument {
    TermDocument {
        name: name.to_string(),
        kind: MembershipKind::Triangular,
        params: vec![a, b, c],
    }
}

fn trap(name: &str, a: f64, b: f64, c: f64, d: f64) -> TermDocument {
    TermDocument {
        name: name.to_string(),
        kind: MembershipKind::Trapezoidal,
        params: vec![a, b, c, d],
    }
}

fn sig(name: &str, a: f64, c: f64) -> TermDocument {
    TermDocument {
        name: name.to_string(),
        kind: MembershipKind::Sigmoid,
        params: vec![a, c],
    }
}

fn var(min: f64, max: f64, terms: Vec<TermDocument>) -> VariableDocument {
    VariableDocument { min, max, terms }
}

/// Documento completo: variáveis + saídas + regras, centroide, Max, 100 amostras.
pub fn document() -> KnowledgeBaseDocument {
    KnowledgeBaseDocument {
        defuzzification: DefuzzificationMethod::Centroid,
        aggregation: AggregationMethod::Max,
        samples: DEFAULT_SAMPLES,
        inputs: input_variables(),
        outputs: output_sets(),
        rules: rules(),
    }
}

/// Sensores em `[0, 10]` (metros); `VeryClose = Triangular(0, 0, 1)`.
fn sensor_terms() -> Vec<TermDocument> {
    vec![
        tri("VeryClose", 0.0, 0.0, 1.0),
        tri("Close", 0.5, 1.5, 3.0),
        tri("Medium", 2.0, 4.0, 6.0),
        trap("Far", 5.0, 7.0, 10.0, 10.0),
    ]
}

fn obstacle_terms() -> Vec<TermDocument> {
    vec![
        tri("Imminent", 0.0, 0.0, 1.5),
        tri("Near", 1.0, 3.0, 5.0),
        trap("Clear", 4.0, 8.0, 20.0, 20.0),
    ]
}

pub fn input_variables() -> BTreeMap<InputVariable, VariableDocument> {
    let mut inputs = BTreeMap::new();

    for sensor in InputVariable::SENSORS {
        inputs.insert(sensor, var(0.0, 10.0, sensor_terms()));
    }

    inputs.insert(
        In::CurrentSpeed,
        var(
            0.0,
            1.0,
            vec![
                tri("Stopped", 0.0, 0.0, 0.05),
                tri("Slow", 0.0, 0.2, 0.4),
                tri("Medium", 0.3, 0.5, 0.7),
                trap("Fast", 0.6, 0.8, 1.0, 1.0),
            ],
        ),
    );
    inputs.insert(
        In::SpeedError,
        var(
            -1.0,
            1.0,
            vec![
                trap("TooFast", -1.0, -1.0, -0.4, -0.1),
                tri("Ok", -0.2, 0.0, 0.2),
                trap("TooSlow", 0.1, 0.4, 1.0, 1.0),
            ],
        ),
    );
    inputs.insert(
        In::MovingDirection,
        var(-1.0, 1.0, vec![sig("Backward", -10.0, 0.0), sig("Forward", 10.0, 0.0)]),
    );
    inputs.insert(
        In::TargetAvailable,
        var(0.0, 1.0, vec![sig("Absent", -20.0, 0.5), sig("Present", 20.0, 0.5)]),
    );
    inputs.insert(
        In::DistanceToTarget,
        var(
            0.0,
            50.0,
            vec![
                tri("AtTarget", 0.0, 0.0, 1.0),
                tri("VeryNear", 0.5, 2.0, 4.0),
                tri("Near", 3.0, 6.0, 10.0),
                tri("Medium", 8.0, 15.0, 25.0),
                trap("Far", 20.0, 30.0, 50.0, 50.0),
            ],
        ),
    );
    inputs.insert(
        In::AngleToTarget,
        var(
            -180.0,
            180.0,
            vec![
                trap("HardRight", -180.0, -180.0, -60.0, -30.0),
                tri("Right", -45.0, -20.0, -5.0),
                tri("Ahead", -10.0, 0.0, 10.0),
                tri("Left", 5.0, 20.0, 45.0),
                trap("HardLeft", 30.0, 60.0, 180.0, 180.0),
            ],
        ),
    );
    inputs.insert(
        In::HeadingError,
        var(
            -180.0,
            180.0,
            vec![
                trap("LargeNegative", -180.0, -180.0, -45.0, -20.0),
                tri("SmallNegative", -25.0, -10.0, 0.0),
                tri("Aligned", -5.0, 0.0, 5.0),
                tri("SmallPositive", 0.0, 10.0, 25.0),
                trap("LargePositive", 20.0, 45.0, 180.0, 180.0),
            ],
        ),
    );
    inputs.insert(
        In::LateralError,
        var(
            -5.0,
            5.0,
            vec![
                trap("FarRight", -5.0, -5.0, -1.5, -0.6),
                tri("Right", -1.0, -0.4, 0.0),
                tri("Centered", -0.3, 0.0, 0.3),
                tri("Left", 0.0, 0.4, 1.0),
                trap("FarLeft", 0.6, 1.5, 5.0, 5.0),
            ],
        ),
    );
    inputs.insert(
        In::LongitudinalError,
        var(
            -10.0,
            10.0,
            vec![
                trap("Behind", -10.0, -10.0, -2.0, -0.5),
                tri("SlightlyBehind", -1.0, -0.4, 0.0),
                tri("Centered", -0.3, 0.0, 0.3),
                tri("SlightlyAhead", 0.0, 0.4, 1.0),
                trap("Ahead", 0.5, 2.0, 10.0, 10.0),
            ],
        ),
    );
    inputs.insert(In::ObstacleDistance, var(0.0, 20.0, obstacle_terms()));
    inputs.insert(In::DynamicObstacleDistance, var(0.0, 20.0, obstacle_terms()));

    inputs
}

pub fn output_sets() -> BTreeMap<OutputVariable, OutputDocument> {
    let mut outputs = BTreeMap::new();
    outputs.insert(
        Out::Throttle,
        OutputDocument {
            min: -1.0,
            max: 1.0,
            terms: vec![
                OutputTerm::new("FastReverse", -1.0, -1.0, -0.5),
                OutputTerm::new("SlowReverse", -0.6, -0.3, 0.0),
                OutputTerm::new("Zero", -0.2, 0.0, 0.2),
                OutputTerm::new("Slow", 0.0, 0.3, 0.6),
                OutputTerm::new("Medium", 0.3, 0.55, 0.8),
                OutputTerm::new("Fast", 0.6, 0.85, 1.0),
            ],
        },
    );
    outputs.insert(
        Out::Steering,
        OutputDocument {
            min: -1.0,
            max: 1.0,
            terms: vec![
                OutputTerm::new("HardLeft", -1.0, -1.0, -0.6),
                OutputTerm::new("Left", -0.8, -0.5, -0.2),
                OutputTerm::new("SlightLeft", -0.4, -0.2, 0.0),
                OutputTerm::new("Straight", -0.15, 0.0, 0.15),
                OutputTerm::new("SlightRight", 0.0, 0.2, 0.4),
                OutputTerm::new("Right", 0.2, 0.5, 0.8),
                OutputTerm::new("HardRight", 0.6, 1.0, 1.0),
            ],
        },
    );
    outputs.insert(
        Out::Brake,
        OutputDocument {
            min: 0.0,
            max: 1.0,
            terms: vec![
                OutputTerm::new("Release", 0.0, 0.0, 0.25),
                OutputTerm::new("Light", 0.1, 0.3, 0.5),
                OutputTerm::new("Moderate", 0.4, 0.6, 0.8),
                OutputTerm::new("Hard", 0.7, 0.9, 1.0),
                OutputTerm::new("EmergencyBrake", 0.85, 1.0, 1.0),
            ],
        },
    );
    outputs.insert(
        Out::ParkingPhase,
        OutputDocument {
            min: 0.0,
            max: 6.0,
            terms: ParkingPhase::ALL
                .iter()
                .enumerate()
                .map(|(i, phase)| {
                    let center = i as f64;
                    OutputTerm::new(phase.term_name(), (center - 1.0).max(0.0), center, (center + 1.0).min(6.0))
                })
                .collect(),
        },
    );
    outputs
}

/// Regras padrão, agrupadas por fase.
pub fn rules() -> Vec<FuzzyRule> {
    let mut rules = Vec::new();
    rules.extend(emergency_rules());
    rules.extend(searching_rules());
    rules.extend(approaching_rules());
    rules.extend(aligning_rules());
    rules.extend(reversing_rules());
    rules.extend(adjusting_rules());
    rules.extend(completed_rules());
    rules
}

fn emergency_rules() -> Vec<FuzzyRule> {
    use ParkingPhase::Emergency;
    vec![
        FuzzyRule::new("front_emergency", Emergency)
            .when(In::FrontDistance, "VeryClose")
            .when(In::MovingDirection, "Forward")
            .when_not(In::CurrentSpeed, "Stopped")
            .then(Out::Brake, "EmergencyBrake", 0.95)
            .then(Out::Throttle, "Zero", 0.9)
            .then(Out::ParkingPhase, "Emergency", 0.9)
            .weighted(1.5)
            .describe("Obstáculo colado à frente com o carro em movimento"),
        FuzzyRule::new("rear_emergency", Emergency)
            .when(In::RearDistance, "VeryClose")
            .when(In::MovingDirection, "Backward")
            .when_not(In::CurrentSpeed, "Stopped")
            .then(Out::Brake, "EmergencyBrake", 0.95)
            .then(Out::Throttle, "Zero", 0.9)
            .then(Out::ParkingPhase, "Emergency", 0.9)
            .weighted(1.5)
            .describe("Obstáculo colado atrás durante a ré"),
        FuzzyRule::new("dynamic_obstacle_emergency", Emergency)
            .when(In::DynamicObstacleDistance, "Imminent")
            .then(Out::Brake, "EmergencyBrake", 0.95)
            .then(Out::Throttle, "Zero", 0.9)
            .then(Out::ParkingPhase, "Emergency", 0.9)
            .weighted(1.5)
            .describe("Obstáculo móvel muito próximo"),
        FuzzyRule::new("front_left_corner_caution", Emergency)
            .when(In::FrontLeftDistance, "VeryClose")
            .when(In::MovingDirection, "Forward")
            .then(Out::Brake, "Hard", 0.8)
            .then(Out::Throttle, "Zero", 0.7)
            .then(Out::Steering, "SlightRight", 0.6)
            .describe("Quina dianteira esquerda quase tocando"),
        FuzzyRule::new("front_right_corner_caution", Emergency)
            .when(In::FrontRightDistance, "VeryClose")
            .when(In::MovingDirection, "Forward")
            .then(Out::Brake, "Hard", 0.8)
            .then(Out::Throttle, "Zero", 0.7)
            .then(Out::Steering, "SlightLeft", 0.6)
            .describe("Quina dianteira direita quase tocando"),
        FuzzyRule::new("left_side_caution", Emergency)
            .when(In::LeftDistance, "VeryClose")
            .then(Out::Steering, "SlightRight", 0.6)
            .then(Out::Brake, "Light", 0.5)
            .describe("Lateral esquerda muito próxima"),
        FuzzyRule::new("right_side_caution", Emergency)
            .when(In::RightDistance, "VeryClose")
            .then(Out::Steering, "SlightLeft", 0.6)
            .then(Out::Brake, "Light", 0.5)
            .describe("Lateral direita muito próxima"),
        FuzzyRule::new("obstacle_near_slow_down", Emergency)
            .when(In::ObstacleDistance, "Near")
            .when(In::MovingDirection, "Forward")
            .then(Out::Throttle, "Slow", 0.7)
            .then(Out::Brake, "Light", 0.5)
            .describe("Obstáculo nas proximidades, reduzir"),
    ]
}

fn searching_rules() -> Vec<FuzzyRule> {
    use ParkingPhase::Searching;
    vec![
        FuzzyRule::new("search_cruise", Searching)
            .when(In::TargetAvailable, "Absent")
            .when(In::FrontDistance, "Far")
            .then(Out::Throttle, "Medium", 0.8)
            .then(Out::Steering, "Straight", 0.8)
            .then(Out::Brake, "Release", 0.8)
            .then(Out::ParkingPhase, "Searching", 0.9)
            .describe("Pista livre, seguir procurando vaga"),
        FuzzyRule::new("search_front_medium", Searching)
            .when(In::TargetAvailable, "Absent")
            .when(In::FrontDistance, "Medium")
            .then(Out::Throttle, "Slow", 0.8)
            .then(Out::Brake, "Light", 0.4)
            .then(Out::ParkingPhase, "Searching", 0.8)
            .describe("Obstáculo à frente a meia distância, reduzir"),
        FuzzyRule::new("search_front_close_turn_right", Searching)
            .when(In::TargetAvailable, "Absent")
            .when(In::FrontDistance, "Close")
            .when(In::RightDistance, "Far")
            .then(Out::Steering, "Right", 0.8)
            .then(Out::Throttle, "Slow", 0.7)
            .then(Out::ParkingPhase, "Searching", 0.7)
            .describe("Bloqueio à frente, contornar pela direita"),
        FuzzyRule::new("search_front_close_turn_left", Searching)
            .when(In::TargetAvailable, "Absent")
            .when(In::FrontDistance, "Close")
            .when(In::LeftDistance, "Far")
            .when_not(In::RightDistance, "Far")
            .then(Out::Steering, "Left", 0.8)
            .then(Out::Throttle, "Slow", 0.7)
            .then(Out::ParkingPhase, "Searching", 0.7)
            .describe("Bloqueio à frente e direita ocupada, contornar pela esquerda"),
        FuzzyRule::new("search_too_fast", Searching)
            .when(In::TargetAvailable, "Absent")
            .when(In::CurrentSpeed, "Fast")
            .then(Out::Throttle, "Slow", 0.6)
            .then(Out::Brake, "Light", 0.6)
            .describe("Velocidade alta demais para procurar vaga"),
        FuzzyRule::new("search_keep_off_left_wall", Searching)
            .when(In::TargetAvailable, "Absent")
            .when(In::LeftDistance, "Close")
            .then(Out::Steering, "SlightRight", 0.5)
            .describe("Afastar da parede à esquerda"),
        FuzzyRule::new("search_keep_off_right_wall", Searching)
            .when(In::TargetAvailable, "Absent")
            .when(In::RightDistance, "Close")
            .then(Out::Steering, "SlightLeft", 0.5)
            .describe("Afastar da parede à direita"),
    ]
}

fn approaching_rules() -> Vec<FuzzyRule> {
    use ParkingPhase::Approaching;
    vec![
        FuzzyRule::new("approach_far", Approaching)
            .when(In::TargetAvailable, "Present")
            .when(In::DistanceToTarget, "Far")
            .when(In::AngleToTarget, "Ahead")
            .then(Out::Throttle, "Fast", 0.8)
            .then(Out::Steering, "Straight", 0.9)
            .then(Out::Brake, "Release", 0.8)
            .then(Out::ParkingPhase, "Approaching", 0.9)
            .describe("Vaga distante e alinhada, acelerar"),
        FuzzyRule::new("approach_medium", Approaching)
            .when(In::TargetAvailable, "Present")
            .when(In::DistanceToTarget, "Medium")
            .then(Out::Throttle, "Medium", 0.8)
            .then(Out::ParkingPhase, "Approaching", 0.9)
            .describe("Vaga a média distância"),
        FuzzyRule::new("approach_near", Approaching)
            .when(In::TargetAvailable, "Present")
            .when(In::DistanceToTarget, "Near")
            .then(Out::Throttle, "Slow", 0.8)
            .then(Out::ParkingPhase, "Approaching", 0.8)
            .describe("Vaga próxima, velocidade baixa"),
        FuzzyRule::new("approach_far_still", Approaching)
            .when(In::TargetAvailable, "Present")
            .when(In::DistanceToTarget, "Far")
            .then(Out::Throttle, "Medium", 0.7)
            .then(Out::ParkingPhase, "Approaching", 0.8)
            .describe("Vaga distante fora do eixo"),
        FuzzyRule::new("approach_steer_left", Approaching)
            .when(In::TargetAvailable, "Present")
            .when(In::AngleToTarget, "Left")
            .when_not(In::DistanceToTarget, "AtTarget")
            .then(Out::Steering, "Left", 0.85)
            .describe("Vaga à esquerda"),
        FuzzyRule::new("approach_steer_hard_left", Approaching)
            .when(In::TargetAvailable, "Present")
            .when(In::AngleToTarget, "HardLeft")
            .when_not(In::DistanceToTarget, "AtTarget")
            .then(Out::Steering, "HardLeft", 0.9)
            .then(Out::Throttle, "Slow", 0.7)
            .describe("Vaga bem à esquerda, curva fechada"),
        FuzzyRule::new("approach_steer_right", Approaching)
            .when(In::TargetAvailable, "Present")
            .when(In::AngleToTarget, "Right")
            .when_not(In::DistanceToTarget, "AtTarget")
            .then(Out::Steering, "Right", 0.85)
            .describe("Vaga à direita"),
        FuzzyRule::new("approach_steer_hard_right", Approaching)
            .when(In::TargetAvailable, "Present")
            .when(In::AngleToTarget, "HardRight")
            .when_not(In::DistanceToTarget, "AtTarget")
            .then(Out::Steering, "HardRight", 0.9)
            .then(Out::Throttle, "Slow", 0.7)
            .describe("Vaga bem à direita, curva fechada"),
        FuzzyRule::new("approach_hold_course", Approaching)
            .when(In::TargetAvailable, "Present")
            .when(In::AngleToTarget, "Ahead")
            .then(Out::Steering, "Straight", 0.8)
            .describe("Vaga no eixo, manter direção"),
        FuzzyRule::new("approach_slow_down", Approaching)
            .when(In::TargetAvailable, "Present")
            .when(In::SpeedError, "TooFast")
            .then(Out::Brake, "Moderate", 0.7)
            .then(Out::Throttle, "Zero", 0.6)
            .describe("Acima da velocidade desejada para a distância"),
        FuzzyRule::new("approach_speed_up", Approaching)
            .when(In::TargetAvailable, "Present")
            .when(In::SpeedError, "TooSlow")
            .when_not(In::FrontDistance, "VeryClose")
            .then(Out::Throttle, "Medium", 0.6)
            .then(Out::Brake, "Release", 0.6)
            .describe("Abaixo da velocidade desejada"),
    ]
}

fn aligning_rules() -> Vec<FuzzyRule> {
    use ParkingPhase::Aligning;
    vec![
        FuzzyRule::new("align_heading_large_positive", Aligning)
            .when(In::DistanceToTarget, "VeryNear")
            .when(In::HeadingError, "LargePositive")
            .then(Out::Steering, "Right", 0.8)
            .then(Out::Throttle, "Slow", 0.6)
            .then(Out::ParkingPhase, "Aligning", 0.85)
            .describe("Carro muito girado à esquerda da vaga"),
        FuzzyRule::new("align_heading_large_negative", Aligning)
            .when(In::DistanceToTarget, "VeryNear")
            .when(In::HeadingError, "LargeNegative")
            .then(Out::Steering, "Left", 0.8)
            .then(Out::Throttle, "Slow", 0.6)
            .then(Out::ParkingPhase, "Aligning", 0.85)
            .describe("Carro muito girado à direita da vaga"),
        FuzzyRule::new("align_heading_small_positive", Aligning)
            .when(In::DistanceToTarget, "VeryNear")
            .when(In::HeadingError, "SmallPositive")
            .then(Out::Steering, "SlightRight", 0.7)
            .then(Out::ParkingPhase, "Aligning", 0.8)
            .describe("Ajuste fino de orientação para a direita"),
        FuzzyRule::new("align_heading_small_negative", Aligning)
            .when(In::DistanceToTarget, "VeryNear")
            .when(In::HeadingError, "SmallNegative")
            .then(Out::Steering, "SlightLeft", 0.7)
            .then(Out::ParkingPhase, "Aligning", 0.8)
            .describe("Ajuste fino de orientação para a esquerda"),
        FuzzyRule::new("align_lateral_left", Aligning)
            .when(In::DistanceToTarget, "VeryNear")
            .when(In::LateralError, "Left")
            .then(Out::Steering, "SlightRight", 0.7)
            .then(Out::ParkingPhase, "Aligning", 0.75)
            .describe("Carro à esquerda do eixo da vaga"),
        FuzzyRule::new("align_lateral_right", Aligning)
            .when(In::DistanceToTarget, "VeryNear")
            .when(In::LateralError, "Right")
            .then(Out::Steering, "SlightLeft", 0.7)
            .then(Out::ParkingPhase, "Aligning", 0.75)
            .describe("Carro à direita do eixo da vaga"),
        FuzzyRule::new("align_lateral_far_left", Aligning)
            .when(In::DistanceToTarget, "VeryNear")
            .when(In::LateralError, "FarLeft")
            .then(Out::Steering, "Right", 0.8)
            .then(Out::Throttle, "Slow", 0.5)
            .then(Out::ParkingPhase, "Aligning", 0.8)
            .describe("Carro bem à esquerda do eixo da vaga"),
        FuzzyRule::new("align_lateral_far_right", Aligning)
            .when(In::DistanceToTarget, "VeryNear")
            .when(In::LateralError, "FarRight")
            .then(Out::Steering, "Left", 0.8)
            .then(Out::Throttle, "Slow", 0.5)
            .then(Out::ParkingPhase, "Aligning", 0.8)
            .describe("Carro bem à direita do eixo da vaga"),
    ]
}

fn reversing_rules() -> Vec<FuzzyRule> {
    use ParkingPhase::Reversing;
    vec![
        FuzzyRule::new("reverse_overshoot", Reversing)
            .when(In::DistanceToTarget, "VeryNear")
            .when(In::LongitudinalError, "Ahead")
            .when_not(In::RearDistance, "VeryClose")
            .then(Out::Throttle, "SlowReverse", 0.8)
            .then(Out::Brake, "Release", 0.6)
            .then(Out::ParkingPhase, "Reversing", 0.85)
            .describe("Passou do centro da vaga, voltar de ré"),
        FuzzyRule::new("reverse_blocked_front", Reversing)
            .when(In::DistanceToTarget, "VeryNear")
            .when(In::HeadingError, "LargeNegative")
            .when(In::FrontDistance, "Close")
            .then(Out::Throttle, "SlowReverse", 0.7)
            .then(Out::Steering, "Right", 0.7)
            .then(Out::ParkingPhase, "Reversing", 0.8)
            .describe("Sem espaço à frente para alinhar, manobrar de ré"),
        FuzzyRule::new("reverse_far_overshoot", Reversing)
            .when(In::TargetAvailable, "Present")
            .when(In::LongitudinalError, "Ahead")
            .when(In::DistanceToTarget, "Near")
            .when(In::RearDistance, "Far")
            .then(Out::Throttle, "FastReverse", 0.6)
            .then(Out::ParkingPhase, "Reversing", 0.7)
            .describe("Vaga ficou para trás, ré com espaço livre"),
        FuzzyRule::new("reverse_rear_close", Reversing)
            .when(In::MovingDirection, "Backward")
            .when(In::RearDistance, "Close")
            .then(Out::Brake, "Moderate", 0.8)
            .then(Out::Throttle, "Zero", 0.7)
            .then(Out::ParkingPhase, "Adjusting", 0.6)
            .describe("Traseira se aproximando de obstáculo"),
    ]
}

fn adjusting_rules() -> Vec<FuzzyRule> {
    use ParkingPhase::Adjusting;
    vec![
        FuzzyRule::new("adjust_creep_forward", Adjusting)
            .when(In::DistanceToTarget, "AtTarget")
            .when(In::LongitudinalError, "SlightlyBehind")
            .then(Out::Throttle, "Slow", 0.6)
            .then(Out::Brake, "Release", 0.6)
            .then(Out::ParkingPhase, "Adjusting", 0.85)
            .describe("Um pouco antes do centro, avançar devagar"),
        FuzzyRule::new("adjust_creep_back", Adjusting)
            .when(In::DistanceToTarget, "AtTarget")
            .when(In::LongitudinalError, "SlightlyAhead")
            .then(Out::Throttle, "SlowReverse", 0.6)
            .then(Out::Brake, "Release", 0.6)
            .then(Out::ParkingPhase, "Adjusting", 0.85)
            .describe("Um pouco além do centro, recuar devagar"),
        FuzzyRule::new("adjust_lateral_left", Adjusting)
            .when(In::DistanceToTarget, "AtTarget")
            .when(In::LateralError, "Left")
            .then(Out::Steering, "SlightRight", 0.6)
            .then(Out::ParkingPhase, "Adjusting", 0.7)
            .describe("Correção lateral para a direita"),
        FuzzyRule::new("adjust_lateral_right", Adjusting)
            .when(In::DistanceToTarget, "AtTarget")
            .when(In::LateralError, "Right")
            .then(Out::Steering, "SlightLeft", 0.6)
            .then(Out::ParkingPhase, "Adjusting", 0.7)
            .describe("Correção lateral para a esquerda"),
        FuzzyRule::new("adjust_heading_positive", Adjusting)
            .when(In::DistanceToTarget, "AtTarget")
            .when(In::HeadingError, "SmallPositive")
            .then(Out::Steering, "SlightRight", 0.6)
            .then(Out::ParkingPhase, "Adjusting", 0.7)
            .describe("Correção de orientação para a direita"),
        FuzzyRule::new("adjust_heading_negative", Adjusting)
            .when(In::DistanceToTarget, "AtTarget")
            .when(In::HeadingError, "SmallNegative")
            .then(Out::Steering, "SlightLeft", 0.6)
            .then(Out::ParkingPhase, "Adjusting", 0.7)
            .describe("Correção de orientação para a esquerda"),
    ]
}

fn completed_rules() -> Vec<FuzzyRule> {
    use ParkingPhase::Completed;
    vec![
        FuzzyRule::new("parked", Completed)
            .when(In::DistanceToTarget, "AtTarget")
            .when(In::LongitudinalError, "Centered")
            .when(In::LateralError, "Centered")
            .when(In::HeadingError, "Aligned")
            .then(Out::Throttle, "Zero", 1.0)
            .then(Out::Brake, "Hard", 0.9)
            .then(Out::Steering, "Straight", 0.9)
            .then(Out::ParkingPhase, "Completed", 1.0)
            .weighted(1.2)
            .describe("Carro centralizado e alinhado na vaga"),
        FuzzyRule::new("parked_hold", Completed)
            .when(In::DistanceToTarget, "AtTarget")
            .when(In::HeadingError, "Aligned")
            .when(In::CurrentSpeed, "Stopped")
            .then(Out::Brake, "Hard", 0.8)
            .then(Out::Throttle, "Zero", 0.9)
            .then(Out::ParkingPhase, "Completed", 0.9)
            .describe("Parado na vaga, manter freado"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_input_variable_is_registered() {
        let inputs = input_variables();
        for variable in InputVariable::ALL {
            assert!(inputs.contains_key(&variable), "{} ausente", variable);
        }
    }

    #[test]
    fn rule_names_are_unique_and_weights_in_range() {
        let rules = rules();
        let mut names = HashSet::new();
        for rule in &rules {
            assert!(names.insert(rule.name.as_str()), "duplicada: {}", rule.name);
            assert!((0.1..=2.0).contains(&rule.weight));
            assert!(!rule.is_inert());
        }
        assert!(rules.len() >= 40);
    }

    #[test]
    fn every_phase_has_rules() {
        let rules = rules();
        for phase in ParkingPhase::ALL {
            assert!(rules.iter().any(|r| r.phase == phase), "{:?} sem regras", phase);
        }
    }

    #[test]
    fn phase_output_has_a_term_per_phase() {
        let outputs = output_sets();
        let phases = &outputs[&OutputVariable::ParkingPhase];
        assert_eq!(phases.terms.len(), ParkingPhase::ALL.len());
        assert_eq!(phases.terms[0].points, [0.0, 0.0, 1.0]);
        assert_eq!(phases.terms[6].points, [5.0, 6.0, 6.0]);
    }
}
