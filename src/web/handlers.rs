//! # Handlers HTTP — Os Endpoints da Aplicação
//!
//! Cada função pública neste módulo é um handler Axum, mapeado a uma
//! rota em [`super::create_router()`]. Todos respondem JSON.
//!
//! ## Locks
//!
//! | Handler | Controlador | Outros |
//! |---------|-------------|--------|
//! | `evaluate` | read | metrics + journal (Mutex) |
//! | `list_rules`, `status` | read | - |
//! | `set_*`, `replace_knowledge_base` | write | - |
//! | `metrics`, `journal`, `export_journal` | - | Mutex |
//!
//! Nenhum lock é mantido através de um `.await`.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::stream::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;

use super::state::AppState;
use crate::command::Command;
use crate::controller::FiredRuleSummary;
use crate::core::{InputVariable, KnowledgeBaseDocument, ParkingPhase};
use crate::fuzzifier::{fuzzify_named, CrispInputs};
use crate::inference::{CrispOutputs, DefuzzificationMethod};
use crate::journal::{DecisionRecord, RuleUsage};
use crate::metrics::MetricsSnapshot;
use crate::perception::CrispSnapshot;
use crate::persistence;
use crate::web::events::DecisionEvent;

/// Erro de API: status HTTP + mensagem em `{ "error": "..." }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_configured() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "controlador sem base de conhecimento")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ─── /status ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatusResponse {
    pub configured: bool,
    pub rules: usize,
    pub enabled_rules: usize,
    pub defuzzification: Option<DefuzzificationMethod>,
    pub aggregation: Option<&'static str>,
}

/// GET `/status`: O controlador tem base instalada?
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let controller = state.controller.read();
    let response = match controller.knowledge_base() {
        Some(kb) => StatusResponse {
            configured: controller.is_configured(),
            rules: kb.rule_base().len(),
            enabled_rules: kb.rule_base().enabled_count(),
            defuzzification: Some(kb.rule_base().defuzzification),
            aggregation: Some(kb.rule_base().aggregation.label()),
        },
        None => StatusResponse {
            configured: false,
            rules: 0,
            enabled_rules: 0,
            defuzzification: None,
            aggregation: None,
        },
    };
    Json(response)
}

// ─── /events ─────────────────────────────────────────────────────

/// GET `/events`: Stream SSE de [`DecisionEvent`]s.
///
/// Keep-alive a cada 15s. Assinantes atrasados perdem mensagens
/// silenciosamente.
pub async fn sse_events(
    State(state): State<AppState>,
) -> Sse<impl futures_util::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = state.events_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => {
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok(SseEvent::default().data(data)))
            }
            Err(_) => None,
        }
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

// ─── /api/evaluate ───────────────────────────────────────────────

#[derive(Serialize)]
pub struct EvaluateResponse {
    pub id: String,
    pub command: Command,
    pub degraded: bool,
    pub reason: Option<String>,
    pub dominant_rule: Option<String>,
    pub reasoning: String,
    pub fired: Vec<FiredRuleSummary>,
    pub crisp_inputs: CrispInputs,
    pub outputs: Option<CrispOutputs>,
    pub duration_us: u64,
}

/// POST `/api/evaluate`: Um ciclo de controle.
///
/// ```text
/// 1. read lock → evaluate_detailed → solta o lock
/// 2. métricas + diário
/// 3. publica DecisionEvent
/// ```
///
/// Ciclo degradado não é erro HTTP: responde 200 com `degraded: true`
/// e o comando neutro.
pub async fn evaluate(
    State(state): State<AppState>,
    Json(snapshot): Json<CrispSnapshot>,
) -> Json<EvaluateResponse> {
    let report = state.controller.read().evaluate_detailed(&snapshot);
    let record = DecisionRecord::from_report(&snapshot, &report);
    let duration_us = report.duration.as_micros() as u64;

    state.metrics.lock().record(&report);
    state.journal.lock().push(record.clone());
    state.publish(DecisionEvent::from_record(&record, duration_us));

    Json(EvaluateResponse {
        id: record.id.to_string(),
        command: *report.outcome.command(),
        degraded: report.outcome.is_degraded(),
        reason: report.outcome.reason().map(|r| r.to_string()),
        dominant_rule: record.rule,
        reasoning: record.reasoning,
        fired: report.trace.fired,
        crisp_inputs: report.trace.crisp_inputs,
        outputs: report.trace.outputs,
        duration_us,
    })
}

// ─── Base de regras ──────────────────────────────────────────────

#[derive(Serialize)]
pub struct RuleSummary {
    pub name: String,
    pub phase: ParkingPhase,
    pub enabled: bool,
    pub weight: f64,
    /// Forma textual `IF ... THEN ...`.
    pub text: String,
    pub description: String,
}

/// GET `/api/rules`: Todas as regras, na ordem da base.
pub async fn list_rules(State(state): State<AppState>) -> ApiResult<Vec<RuleSummary>> {
    let controller = state.controller.read();
    let kb = controller.knowledge_base().ok_or_else(ApiError::not_configured)?;
    let rules = kb
        .rule_base()
        .rules()
        .iter()
        .map(|rule| RuleSummary {
            name: rule.name.clone(),
            phase: rule.phase,
            enabled: rule.enabled,
            weight: rule.weight,
            text: rule.to_string(),
            description: rule.description.clone(),
        })
        .collect();
    Ok(Json(rules))
}

#[derive(Deserialize)]
pub struct EnabledBody {
    pub enabled: bool,
}

/// POST `/api/rules/{name}/enabled`: `{ "enabled": false }`.
pub async fn set_rule_enabled(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<EnabledBody>,
) -> ApiResult<serde_json::Value> {
    {
        let mut controller = state.controller.write();
        let kb = controller.knowledge_base_mut().ok_or_else(ApiError::not_configured)?;
        if !kb.rule_base_mut().set_enabled(&name, body.enabled) {
            return Err(ApiError::new(StatusCode::NOT_FOUND, format!("regra '{}' não existe", name)));
        }
    }
    tracing::info!(rule = %name, enabled = body.enabled, "Regra alterada via API");
    state.publish(DecisionEvent::RuleToggled {
        rule: name.clone(),
        enabled: body.enabled,
    });
    Ok(Json(serde_json::json!({ "rule": name, "enabled": body.enabled })))
}

/// POST `/api/phases/{phase}/enabled`: Liga/desliga todas as regras de uma fase.
pub async fn set_phase_enabled(
    State(state): State<AppState>,
    Path(phase): Path<String>,
    Json(body): Json<EnabledBody>,
) -> ApiResult<serde_json::Value> {
    let phase = ParkingPhase::from_term_name(&phase)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("fase '{}' não existe", phase)))?;
    let affected = {
        let mut controller = state.controller.write();
        let kb = controller.knowledge_base_mut().ok_or_else(ApiError::not_configured)?;
        kb.rule_base_mut().set_phase_enabled(phase, body.enabled)
    };
    tracing::info!(phase = %phase, enabled = body.enabled, affected, "Fase alterada via API");
    state.publish(DecisionEvent::PhaseToggled {
        phase,
        enabled: body.enabled,
        affected,
    });
    Ok(Json(serde_json::json!({ "phase": phase, "enabled": body.enabled, "affected": affected })))
}

/// Corpo de `POST /api/rules/weights`.
///
/// `all` é aplicado primeiro; depois os pesos por nome.
#[derive(Deserialize)]
pub struct WeightsBody {
    #[serde(default)]
    pub all: Option<f64>,
    #[serde(default)]
    pub rules: BTreeMap<String, f64>,
}

#[derive(Serialize)]
pub struct WeightsResponse {
    /// Peso aplicado a todas as regras, já limitado a `[0.1, 2.0]`.
    pub all: Option<f64>,
    pub updated: usize,
    pub unknown: Vec<String>,
}

/// POST `/api/rules/weights`: Atribuição de pesos em lote.
pub async fn set_weights(
    State(state): State<AppState>,
    Json(body): Json<WeightsBody>,
) -> ApiResult<WeightsResponse> {
    let mut controller = state.controller.write();
    let kb = controller.knowledge_base_mut().ok_or_else(ApiError::not_configured)?;
    let rule_base = kb.rule_base_mut();

    let all = body.all.map(|w| rule_base.set_all_weights(w));
    let unknown = rule_base.set_weights(body.rules.iter().map(|(name, w)| (name.as_str(), *w)));
    let updated = body.rules.len() - unknown.len();

    tracing::info!(all = ?all, updated, unknown = unknown.len(), "Pesos alterados via API");
    Ok(Json(WeightsResponse { all, updated, unknown }))
}

#[derive(Deserialize)]
pub struct MethodBody {
    pub method: DefuzzificationMethod,
    /// Nova resolução da amostragem, opcional.
    #[serde(default)]
    pub samples: Option<usize>,
}

/// PUT `/api/defuzzification`: `{ "method": "bisector", "samples": 200 }`.
///
/// Resolução fora de `[2, 10000]` → 422 sem alterar nada.
pub async fn set_defuzzification(
    State(state): State<AppState>,
    Json(body): Json<MethodBody>,
) -> ApiResult<serde_json::Value> {
    let samples = {
        let mut controller = state.controller.write();
        let kb = controller.knowledge_base_mut().ok_or_else(ApiError::not_configured)?;
        if let Some(samples) = body.samples {
            kb.set_samples(samples)
                .map_err(|e| ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
        }
        let samples = kb.samples();
        controller.set_defuzzification(body.method);
        samples
    };
    state.publish(DecisionEvent::MethodChanged { method: body.method });
    Ok(Json(serde_json::json!({ "method": body.method, "samples": samples })))
}

/// GET `/api/knowledge-base`: Documento da base ativa, com os ajustes
/// feitos via API (habilitação, pesos, método).
pub async fn knowledge_base(State(state): State<AppState>) -> ApiResult<KnowledgeBaseDocument> {
    let controller = state.controller.read();
    let kb = controller.knowledge_base().ok_or_else(ApiError::not_configured)?;
    Ok(Json(kb.to_document()))
}

#[derive(Deserialize)]
pub struct FuzzifyQuery {
    pub value: f64,
}

/// GET `/api/fuzzify/{variable}?value=0.3`: Pertinências de um valor
/// crisp em cada termo da variável, sem rodar um ciclo.
pub async fn fuzzify_variable(
    State(state): State<AppState>,
    Path(variable): Path<String>,
    Query(query): Query<FuzzifyQuery>,
) -> ApiResult<BTreeMap<String, f64>> {
    let controller = state.controller.read();
    let kb = controller.knowledge_base().ok_or_else(ApiError::not_configured)?;
    let linguistic = InputVariable::from_name(&variable)
        .and_then(|v| kb.input(v))
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("variável '{}' não existe", variable)))?;

    let map = fuzzify_named(kb, &variable, query.value);
    let degrees = linguistic
        .terms()
        .iter()
        .map(|term| (term.name.clone(), map.degree_of(linguistic, &term.name)))
        .filter(|(_, degree)| *degree > 0.0)
        .collect();
    Ok(Json(degrees))
}

#[derive(Serialize)]
pub struct ConfigureResponse {
    pub rules: usize,
    pub warnings: Vec<String>,
    pub persisted: bool,
}

/// PUT `/api/knowledge-base`: Substitui a base inteira.
///
/// Documento rejeitado → 422 com a mensagem do [`crate::core::ConfigError`];
/// a base anterior continua ativa. Aceito → grava em `settings.kb_path`.
pub async fn replace_knowledge_base(
    State(state): State<AppState>,
    Json(doc): Json<KnowledgeBaseDocument>,
) -> ApiResult<ConfigureResponse> {
    let (warnings, rules) = {
        let mut controller = state.controller.write();
        let warnings = controller
            .configure(doc.clone())
            .map_err(|e| ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
        let rules = controller.knowledge_base().map(|kb| kb.rule_base().len()).unwrap_or(0);
        (warnings, rules)
    };

    let persisted = match persistence::save_document(&state.settings.kb_path, &doc) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Base instalada mas não persistida");
            false
        }
    };

    state.publish(DecisionEvent::Configured {
        rules,
        warnings: warnings.len(),
    });
    Ok(Json(ConfigureResponse {
        rules,
        warnings: warnings.iter().map(|w| w.to_string()).collect(),
        persisted,
    }))
}

// ─── Observação ──────────────────────────────────────────────────

/// GET `/api/metrics`
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.lock().snapshot())
}

#[derive(Deserialize)]
pub struct JournalQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct JournalResponse {
    pub total: usize,
    pub capacity: usize,
    /// Mais recentes primeiro.
    pub records: Vec<DecisionRecord>,
    pub rule_usage: Vec<RuleUsage>,
    pub phase_counts: BTreeMap<ParkingPhase, usize>,
}

/// GET `/api/journal?limit=50`
pub async fn journal(
    State(state): State<AppState>,
    Query(query): Query<JournalQuery>,
) -> Json<JournalResponse> {
    let journal = state.journal.lock();
    Json(JournalResponse {
        total: journal.len(),
        capacity: journal.capacity(),
        records: journal.recent(query.limit.unwrap_or(50)),
        rule_usage: journal.rule_usage(),
        phase_counts: journal.phase_counts(),
    })
}

/// POST `/api/journal/export`: Grava o diário em `journal_dir`.
pub async fn export_journal(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    let records = state.journal.lock().to_vec();
    let dir = state.settings.journal_dir.clone();
    let count = records.len();

    let path = tokio::task::spawn_blocking(move || persistence::export_journal(&dir, &records))
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e)))?;

    let path = path.display().to_string();
    state.publish(DecisionEvent::JournalExported {
        path: path.clone(),
        records: count,
    });
    Ok(Json(serde_json::json!({ "path": path, "records": count })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::controller::FuzzyController;
    use crate::rules::defaults;
    use crate::web::create_router;
    use crate::web::state::AppState;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn test_state() -> AppState {
        let scratch = std::env::temp_dir().join(format!("parking-fuzzy-web-{}", Uuid::new_v4()));
        let settings = Settings {
            kb_path: scratch.join("kb.json"),
            journal_dir: scratch,
            ..Settings::default()
        };
        let mut controller = FuzzyController::new(settings.derived);
        controller.configure(defaults::document()).unwrap();
        AppState::new(controller, settings)
    }

    async fn call(state: &AppState, method: Method, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = create_router(state.clone())
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn open_road() -> serde_json::Value {
        serde_json::json!({
            "position": { "x": 0.0, "y": 0.0 },
            "heading": 0.0,
            "speed": 1.0,
            "max_speed": 2.5,
            "sensors": [10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0]
        })
    }

    #[tokio::test]
    async fn status_reports_configured_base() {
        let state = test_state();
        let (status, body) = call(&state, Method::GET, "/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["configured"], true);
        assert_eq!(body["defuzzification"], "centroid");
        assert!(body["rules"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn evaluate_round_trips_snapshot_and_records_it() {
        let state = test_state();
        let (status, body) = call(&state, Method::POST, "/api/evaluate", Some(open_road())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["degraded"], false);
        assert_eq!(body["command"]["suggested_phase"], "Searching");
        assert!(body["command"]["throttle"].as_f64().unwrap() > 0.2);

        assert_eq!(state.metrics.lock().cycles(), 1);
        assert_eq!(state.journal.lock().len(), 1);

        let (_, journal) = call(&state, Method::GET, "/api/journal?limit=5", None).await;
        assert_eq!(journal["total"], 1);
        assert_eq!(journal["records"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn short_sensor_array_degrades_with_neutral_command() {
        let state = test_state();
        let mut snapshot = open_road();
        snapshot["sensors"] = serde_json::json!([10.0, 10.0]);
        let (status, body) = call(&state, Method::POST, "/api/evaluate", Some(snapshot)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["degraded"], true);
        assert_eq!(body["command"]["throttle"], 0.0);
        assert!(body["reason"].is_string());
    }

    #[tokio::test]
    async fn toggling_unknown_rule_is_not_found() {
        let state = test_state();
        let (status, _) = call(
            &state,
            Method::POST,
            "/api/rules/nao_existe/enabled",
            Some(serde_json::json!({ "enabled": false })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn disabling_a_phase_disables_its_rules() {
        let state = test_state();
        let (status, body) = call(
            &state,
            Method::POST,
            "/api/phases/emergency/enabled",
            Some(serde_json::json!({ "enabled": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["affected"].as_u64().unwrap() > 0);

        let controller = state.controller.read();
        let kb = controller.knowledge_base().unwrap();
        assert_eq!(kb.rule_base().enabled_in_phase(ParkingPhase::Emergency).count(), 0);
    }

    #[tokio::test]
    async fn bulk_weights_are_clamped() {
        let state = test_state();
        let (status, body) = call(
            &state,
            Method::POST,
            "/api/rules/weights",
            Some(serde_json::json!({ "all": 5.0, "rules": { "search_cruise": 0.5, "fantasma": 1.0 } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["all"], 2.0);
        assert_eq!(body["updated"], 1);
        assert_eq!(body["unknown"], serde_json::json!(["fantasma"]));

        let controller = state.controller.read();
        let rule_base = controller.knowledge_base().unwrap().rule_base();
        assert_eq!(rule_base.get("search_cruise").unwrap().weight, 0.5);
        assert_eq!(rule_base.get("parked").unwrap().weight, 2.0);
    }

    #[tokio::test]
    async fn method_change_is_applied() {
        let state = test_state();
        let (status, _) = call(
            &state,
            Method::PUT,
            "/api/defuzzification",
            Some(serde_json::json!({ "method": "mean_of_maximum" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let controller = state.controller.read();
        assert_eq!(
            controller.knowledge_base().unwrap().rule_base().defuzzification,
            DefuzzificationMethod::MeanOfMaximum
        );
    }

    #[tokio::test]
    async fn invalid_knowledge_base_is_rejected_and_previous_kept() {
        let state = test_state();
        let mut doc = serde_json::to_value(defaults::document()).unwrap();
        doc["samples"] = serde_json::json!(1);
        let (status, body) = call(&state, Method::PUT, "/api/knowledge-base", Some(doc)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].is_string());
        assert!(state.controller.read().is_configured());

        let (_, body) = call(&state, Method::POST, "/api/evaluate", Some(open_road())).await;
        assert_eq!(body["degraded"], false);
    }

    #[tokio::test]
    async fn valid_knowledge_base_is_installed_and_persisted() {
        let state = test_state();
        let doc = serde_json::to_value(defaults::document()).unwrap();
        let (status, body) = call(&state, Method::PUT, "/api/knowledge-base", Some(doc)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["persisted"], true);
        assert!(state.settings.kb_path.exists());
        std::fs::remove_dir_all(&state.settings.journal_dir).ok();
    }

    #[tokio::test]
    async fn journal_export_writes_file() {
        let state = test_state();
        call(&state, Method::POST, "/api/evaluate", Some(open_road())).await;
        let (status, body) = call(&state, Method::POST, "/api/journal/export", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"], 1);
        let path = std::path::PathBuf::from(body["path"].as_str().unwrap());
        assert!(path.exists());
        std::fs::remove_dir_all(&state.settings.journal_dir).ok();
    }

    #[tokio::test]
    async fn evaluate_publishes_decision_event() {
        let state = test_state();
        let mut rx = state.events_tx.subscribe();
        call(&state, Method::POST, "/api/evaluate", Some(open_road())).await;

        match rx.try_recv().unwrap() {
            DecisionEvent::Decision { phase, rule, .. } => {
                assert_eq!(phase, ParkingPhase::Searching);
                assert!(rule.is_some());
            }
            other => panic!("evento inesperado: {:?}", other),
        }
    }

    #[tokio::test]
    async fn events_route_streams_decisions() {
        let state = test_state();
        let response = create_router(state.clone())
            .oneshot(Request::builder().uri("/events").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap(),
            "text/event-stream"
        );

        call(&state, Method::POST, "/api/evaluate", Some(open_road())).await;

        let mut stream = response.into_body().into_data_stream();
        let frame = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let text = String::from_utf8(frame.to_vec()).unwrap();
        assert!(text.starts_with("data: "), "{}", text);
        assert!(text.contains("\"type\":\"Decision\""), "{}", text);
    }

    #[tokio::test]
    async fn resolution_change_is_bounded() {
        let state = test_state();
        let (status, body) = call(
            &state,
            Method::PUT,
            "/api/defuzzification",
            Some(serde_json::json!({ "method": "centroid", "samples": 400 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["samples"], 400);

        let (status, _) = call(
            &state,
            Method::PUT,
            "/api/defuzzification",
            Some(serde_json::json!({ "method": "bisector", "samples": 1_000_000_000u64 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        {
            let controller = state.controller.read();
            let kb = controller.knowledge_base().unwrap();
            assert_eq!(kb.samples(), 400);
            assert_eq!(kb.rule_base().defuzzification, DefuzzificationMethod::Centroid);
        }

        let (_, body) = call(&state, Method::POST, "/api/evaluate", Some(open_road())).await;
        assert_eq!(body["degraded"], false);
    }

    #[tokio::test]
    async fn knowledge_base_document_reflects_api_changes() {
        let state = test_state();
        call(
            &state,
            Method::POST,
            "/api/rules/search_cruise/enabled",
            Some(serde_json::json!({ "enabled": false })),
        )
        .await;
        let (status, body) = call(&state, Method::GET, "/api/knowledge-base", None).await;
        assert_eq!(status, StatusCode::OK);

        let doc: KnowledgeBaseDocument = serde_json::from_value(body).unwrap();
        let rule = doc.rules.iter().find(|r| r.name == "search_cruise").unwrap();
        assert!(!rule.enabled);
    }

    #[tokio::test]
    async fn fuzzify_route_reports_term_degrees() {
        let state = test_state();
        let (status, body) = call(&state, Method::GET, "/api/fuzzify/FrontDistance?value=0.3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!((body["VeryClose"].as_f64().unwrap() - 0.7).abs() < 1e-9);
        assert!(body.get("Far").is_none());

        let (status, _) = call(&state, Method::GET, "/api/fuzzify/Altitude?value=1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unconfigured_controller_is_unavailable() {
        let state = AppState::new(FuzzyController::default(), Settings::default());
        let (status, _) = call(&state, Method::GET, "/api/rules", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, body) = call(&state, Method::POST, "/api/evaluate", Some(open_road())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["degraded"], true);
    }
}
