//! # Módulo Web — API HTTP do Controlador
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ Axum Router (este módulo)                                        │
//! │  ├── GET  /status                        → JSON: configurado?     │
//! │  ├── GET  /events                        → SSE (DecisionEvent)    │
//! │  ├── POST /api/evaluate                  → snapshot → comando     │
//! │  ├── GET  /api/rules                     → resumo das regras      │
//! │  ├── POST /api/rules/{name}/enabled      → liga/desliga regra     │
//! │  ├── POST /api/phases/{phase}/enabled    → liga/desliga fase      │
//! │  ├── POST /api/rules/weights             → pesos em lote          │
//! │  ├── PUT  /api/defuzzification           → troca o método         │
//! │  ├── GET  /api/knowledge-base            → documento da base ativa│
//! │  ├── PUT  /api/knowledge-base            → nova base (configure)  │
//! │  ├── GET  /api/fuzzify/{variable}        → pertinências de um valor│
//! │  ├── GET  /api/metrics                   → ControllerMetrics      │
//! │  ├── GET  /api/journal                   → decisões + uso         │
//! │  └── POST /api/journal/export            → grava JSON em disco    │
//! ├──────────────────────────────────────────────────────────────────┤
//! │ CorsLayer::permissive (tower-http)                               │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`state`] | Estado compartilhado (`AppState`) |
//! | [`events`] | Enum de eventos SSE |
//! | [`handlers`] | Handlers Axum para cada rota |

pub mod events;
pub mod handlers;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use state::AppState;

/// Cria o router Axum com todas as rotas da aplicação.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(handlers::status))
        .route("/events", get(handlers::sse_events))
        // ── Ciclo ─────────────────────────────────────────────
        .route("/api/evaluate", post(handlers::evaluate))
        // ── Base de regras ────────────────────────────────────
        .route("/api/rules", get(handlers::list_rules))
        .route("/api/rules/weights", post(handlers::set_weights))
        .route("/api/rules/{name}/enabled", post(handlers::set_rule_enabled))
        .route("/api/phases/{phase}/enabled", post(handlers::set_phase_enabled))
        .route("/api/defuzzification", put(handlers::set_defuzzification))
        .route(
            "/api/knowledge-base",
            get(handlers::knowledge_base).put(handlers::replace_knowledge_base),
        )
        .route("/api/fuzzify/{variable}", get(handlers::fuzzify_variable))
        // ── Observação ────────────────────────────────────────
        .route("/api/metrics", get(handlers::metrics))
        .route("/api/journal", get(handlers::journal))
        .route("/api/journal/export", post(handlers::export_journal))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
