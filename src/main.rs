//! # Parking Fuzzy — Controlador de Estacionamento Autônomo
//!
//! **Ponto de entrada** do serviço. Um controlador Mamdani recebe a
//! percepção do veículo (sensores, vagas, obstáculos) e devolve
//! aceleração, esterço, freio e a fase de manobra sugerida.
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Configura tracing/logging (RUST_LOG, padrão "info")
//!   ├── Settings::from_env()
//!   ├── Carrega a base de data/knowledge_base.json (ou grava a padrão)
//!   ├── FuzzyController::configure()
//!   ├── Monta AppState e Router
//!   └── Serve HTTP em PARKING_ADDR (padrão 0.0.0.0:3000)
//! ```
//!
//! ```bash
//! RUST_LOG=debug PARKING_ADDR=127.0.0.1:8080 cargo run
//! ```

/// Tipos fundamentais: variáveis linguísticas, saídas, base de conhecimento.
mod core;

/// Avaliação de regras, agregação e defuzzificação.
mod inference;

/// Regras fuzzy, base de regras e a base padrão de estacionamento.
mod rules;

/// Entradas crisp derivadas e fuzzificação.
mod fuzzifier;

mod perception;
mod command;
mod controller;
mod config;
mod persistence;
mod metrics;
mod journal;

/// Servidor axum, handlers HTTP e SSE.
mod web;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::controller::FuzzyController;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🚗 Parking Fuzzy: Starting...");

    let settings = Settings::from_env().context("Configuração inválida")?;

    let mut controller = FuzzyController::new(settings.derived);
    let doc = persistence::load_or_create(&settings.kb_path)
        .with_context(|| format!("Falha ao carregar {}", settings.kb_path.display()))?;
    let warnings = controller
        .configure(doc)
        .with_context(|| format!("Base de conhecimento inválida em {}", settings.kb_path.display()))?;
    tracing::info!(
        path = %settings.kb_path.display(),
        warnings = warnings.len(),
        "Base de conhecimento carregada"
    );

    let addr = settings.addr.clone();
    let state = AppState::new(controller, settings);

    // sumário periódico das métricas
    let metrics = state.metrics.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            ticker.tick().await;
            let line = {
                let metrics = metrics.lock();
                (metrics.cycles() > 0).then(|| metrics.summary_line())
            };
            if let Some(line) = line {
                tracing::info!("📊 {}", line);
            }
        }
    });

    let app = web::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Falha ao fazer bind em {}", addr))?;
    tracing::info!("🚀 Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
