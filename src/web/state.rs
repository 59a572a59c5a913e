//! # Estado da Aplicação Web
//!
//! ```text
//! AppState (Clone, barato: só Arcs)
//!  ├── controller  Arc<RwLock<FuzzyController>>   ciclos: read / reconfiguração: write
//!  ├── metrics     Arc<Mutex<ControllerMetrics>>
//!  ├── journal     Arc<Mutex<DecisionJournal>>
//!  ├── events_tx   Arc<broadcast::Sender<DecisionEvent>>
//!  └── settings    Arc<Settings>
//! ```

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;

use crate::config::Settings;
use crate::controller::FuzzyController;
use crate::journal::DecisionJournal;
use crate::metrics::ControllerMetrics;
use crate::web::events::DecisionEvent;

/// Estado compartilhado da aplicação Axum.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<RwLock<FuzzyController>>,
    pub metrics: Arc<Mutex<ControllerMetrics>>,
    pub journal: Arc<Mutex<DecisionJournal>>,
    /// Canal broadcast para eventos SSE.
    pub events_tx: Arc<broadcast::Sender<DecisionEvent>>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(controller: FuzzyController, settings: Settings) -> Self {
        let (events_tx, _) = broadcast::channel(settings.events_capacity.max(1));
        Self {
            controller: Arc::new(RwLock::new(controller)),
            metrics: Arc::new(Mutex::new(ControllerMetrics::new())),
            journal: Arc::new(Mutex::new(DecisionJournal::new(settings.journal_capacity))),
            events_tx: Arc::new(events_tx),
            settings: Arc::new(settings),
        }
    }

    /// Publica um evento. Sem assinantes o envio falha e é ignorado.
    pub fn publish(&self, event: DecisionEvent) {
        let _ = self.events_tx.send(event);
    }
}
