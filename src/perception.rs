//! # Snapshot de Percepção
//!
//! Dados crisp entregues pelo simulador (ou pelo veículo) a cada ciclo.
//! O controlador não adquire sensores nem descobre vagas: apenas consome
//! este valor.
//!
//! ## Convenções
//!
//! - Posições em metros, plano `(x, y)` com `y` para cima
//! - `heading` e `orientation` em graus, 0° = eixo `+x`, sentido anti-horário
//! - `sensors[0]` = frente, seguindo no sentido horário a cada 45°

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Vetor unitário na direção `degrees`.
    pub fn from_heading(degrees: f64) -> Vec2 {
        let rad = degrees.to_radians();
        Vec2::new(rad.cos(), rad.sin())
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    /// `+1.0` para frente, `-1.0` para ré.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}

/// Vaga candidata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParkingSpotInfo {
    /// Centro da vaga.
    pub position: Vec2,
    pub width: f64,
    pub length: f64,
    /// Orientação em que o carro deve ficar estacionado (graus).
    pub orientation: f64,
    pub distance_to_car: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Static,
    Dynamic,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObstacleInfo {
    pub position: Vec2,
    pub distance: f64,
    pub kind: ObstacleKind,
}

/// Leitura completa de um ciclo.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrispSnapshot {
    pub position: Vec2,
    pub heading: f64,
    /// Velocidade atual (sinal ignorado; a direção vem de `direction`).
    pub speed: f64,
    pub max_speed: f64,
    #[serde(default)]
    pub direction: Direction,
    /// Distâncias dos sensores, pelo menos 8.
    pub sensors: Vec<f64>,
    #[serde(default)]
    pub spots: Vec<ParkingSpotInfo>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleInfo>,
}

impl CrispSnapshot {
    /// Vaga com menor `distance_to_car`.
    pub fn nearest_spot(&self) -> Option<&ParkingSpotInfo> {
        self.spots
            .iter()
            .min_by(|a, b| a.distance_to_car.total_cmp(&b.distance_to_car))
    }

    /// Menor distância entre os obstáculos que passam no filtro.
    pub fn nearest_obstacle(&self, filter: impl Fn(&ObstacleInfo) -> bool) -> Option<f64> {
        self.obstacles
            .iter()
            .filter(|o| filter(o))
            .map(|o| o.distance)
            .min_by(f64::total_cmp)
    }
}
