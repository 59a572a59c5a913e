//! # Entradas Derivadas
//!
//! Aritmética pura sobre o [`CrispSnapshot`], feita **antes** da
//! fuzzificação:
//!
//! | Variável | Cálculo |
//! |----------|---------|
//! | sensores | `sensors[0..8]` |
//! | `CurrentSpeed` | `|speed| / max_speed`, limitado a `[0, 1]` |
//! | `SpeedError` | razão desejada − razão atual |
//! | `MovingDirection` | `+1` frente, `-1` ré |
//! | `TargetAvailable` | `1` se há vaga candidata |
//! | `DistanceToTarget` | distância euclidiana até o centro da vaga |
//! | `AngleToTarget` | rumo carro→vaga − heading, em `(-180, 180]` |
//! | `HeadingError` | heading − orientação da vaga, em `(-180, 180]` |
//! | `LongitudinalError` / `LateralError` | projeção de `carro − vaga` no eixo da vaga e na normal à esquerda |
//! | `ObstacleDistance` / `DynamicObstacleDistance` | mínimo entre obstáculos (dinâmicos) |
//!
//! Variáveis cuja fonte não existe (sem vaga, sem obstáculo) simplesmente
//! não são produzidas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::command::CycleFault;
use crate::core::InputVariable;
use crate::perception::{CrispSnapshot, ObstacleKind, ParkingSpotInfo, Vec2};

/// Quantidade mínima de sensores no snapshot.
pub const MIN_SENSORS: usize = 8;

/// Valores crisp por variável de entrada.
pub type CrispInputs = BTreeMap<InputVariable, f64>;

/// Parâmetros do cálculo de velocidade desejada.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DerivedSettings {
    /// Distância (m) a partir da qual o carro começa a desacelerar para a vaga.
    pub slowdown_distance: f64,
    /// Razão mínima de velocidade desejada perto da vaga.
    pub min_speed_ratio: f64,
}

impl Default for DerivedSettings {
    fn default() -> Self {
        Self {
            slowdown_distance: 15.0,
            min_speed_ratio: 0.15,
        }
    }
}

/// Normaliza um ângulo em graus para `(-180, 180]`.
pub fn normalize_angle(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Rumo absoluto (graus) de `from` para `to`.
pub fn bearing(from: Vec2, to: Vec2) -> f64 {
    let d = to.sub(from);
    d.y.atan2(d.x).to_degrees()
}

/// Geometria do carro em relação a uma vaga.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetGeometry {
    pub distance: f64,
    pub angle: f64,
    pub heading_error: f64,
    pub longitudinal: f64,
    pub lateral: f64,
}

pub fn target_geometry(position: Vec2, heading: f64, spot: &ParkingSpotInfo) -> TargetGeometry {
    let offset = position.sub(spot.position);
    let axis = Vec2::from_heading(spot.orientation);
    let left = Vec2::new(-axis.y, axis.x);

    TargetGeometry {
        distance: offset.length(),
        angle: normalize_angle(bearing(position, spot.position) - heading),
        heading_error: normalize_angle(heading - spot.orientation),
        longitudinal: offset.dot(axis),
        lateral: offset.dot(left),
    }
}

/// Rejeita snapshots que não podem alimentar um ciclo.
pub fn validate(snapshot: &CrispSnapshot) -> Result<(), CycleFault> {
    if snapshot.sensors.len() < MIN_SENSORS {
        return Err(CycleFault::InvalidSnapshot(format!(
            "{} sensores, mínimo {}",
            snapshot.sensors.len(),
            MIN_SENSORS
        )));
    }
    if let Some(i) = snapshot.sensors.iter().position(|s| !s.is_finite()) {
        return Err(CycleFault::InvalidSnapshot(format!("sensor {} não finito", i)));
    }
    if !(snapshot.position.is_finite() && snapshot.heading.is_finite() && snapshot.speed.is_finite()) {
        return Err(CycleFault::InvalidSnapshot("pose ou velocidade não finita".into()));
    }
    if !(snapshot.max_speed.is_finite() && snapshot.max_speed > 0.0) {
        return Err(CycleFault::InvalidSnapshot(format!(
            "velocidade máxima inválida: {}",
            snapshot.max_speed
        )));
    }
    let spots_ok = snapshot.spots.iter().all(|s| {
        s.position.is_finite() && s.orientation.is_finite() && s.distance_to_car.is_finite()
    });
    let obstacles_ok = snapshot
        .obstacles
        .iter()
        .all(|o| o.position.is_finite() && o.distance.is_finite());
    if !(spots_ok && obstacles_ok) {
        return Err(CycleFault::InvalidSnapshot("vaga ou obstáculo com valor não finito".into()));
    }
    Ok(())
}

/// Calcula todas as entradas crisp disponíveis no snapshot.
pub fn crisp_inputs(snapshot: &CrispSnapshot, settings: &DerivedSettings) -> Result<CrispInputs, CycleFault> {
    validate(snapshot)?;
    let mut inputs = CrispInputs::new();

    for (variable, &reading) in InputVariable::SENSORS.iter().zip(&snapshot.sensors) {
        inputs.insert(*variable, reading);
    }

    let speed_ratio = (snapshot.speed.abs() / snapshot.max_speed).clamp(0.0, 1.0);
    inputs.insert(InputVariable::CurrentSpeed, speed_ratio);
    inputs.insert(InputVariable::MovingDirection, snapshot.direction.sign());

    let desired_ratio = match snapshot.nearest_spot() {
        Some(spot) => {
            let geometry = target_geometry(snapshot.position, snapshot.heading, spot);
            inputs.insert(InputVariable::TargetAvailable, 1.0);
            inputs.insert(InputVariable::DistanceToTarget, geometry.distance);
            inputs.insert(InputVariable::AngleToTarget, geometry.angle);
            inputs.insert(InputVariable::HeadingError, geometry.heading_error);
            inputs.insert(InputVariable::LongitudinalError, geometry.longitudinal);
            inputs.insert(InputVariable::LateralError, geometry.lateral);
            (geometry.distance / settings.slowdown_distance).clamp(settings.min_speed_ratio, 1.0)
        }
        None => {
            inputs.insert(InputVariable::TargetAvailable, 0.0);
            1.0
        }
    };
    inputs.insert(InputVariable::SpeedError, desired_ratio - speed_ratio);

    if let Some(d) = snapshot.nearest_obstacle(|_| true) {
        inputs.insert(InputVariable::ObstacleDistance, d);
    }
    if let Some(d) = snapshot.nearest_obstacle(|o| o.kind == ObstacleKind::Dynamic) {
        inputs.insert(InputVariable::DynamicObstacleDistance, d);
    }

    Ok(inputs)
}
