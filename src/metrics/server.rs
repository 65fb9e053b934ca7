use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use prometheus::{Encoder, Registry, TextEncoder};

use crate::health::{self, ComponentHealth, HealthCheckable};

pub type HealthSources = Arc<Vec<Arc<dyn HealthCheckable>>>;

/// Serve `/metrics` and `/health`.
///
/// Runs until the server is stopped; start it on its own thread/system.
pub async fn start_metrics_server(
    registry: Arc<Registry>,
    health_sources: HealthSources,
    port: u16,
) -> std::io::Result<()> {
    tracing::info!(port, "Starting metrics server on http://0.0.0.0:{}/metrics", port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(registry.clone()))
            .app_data(web::Data::new(health_sources.clone()))
            .route("/metrics", web::get().to(metrics_handler))
            .route("/health", web::get().to(health_handler))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

async fn metrics_handler(registry: web::Data<Arc<Registry>>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

async fn health_handler(sources: web::Data<HealthSources>) -> impl Responder {
    let components: Vec<ComponentHealth> = sources.iter().map(|s| s.check_health()).collect();
    let overall = health::aggregate(&components);

    let body = serde_json::json!({
        "service": "ordering-pipeline",
        "status": overall,
        "components": components,
    });

    if overall.is_unhealthy() {
        HttpResponse::ServiceUnavailable().json(body)
    } else {
        HttpResponse::Ok().json(body)
    }
}
