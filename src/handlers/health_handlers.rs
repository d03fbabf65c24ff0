//! Health & readiness handlers.
//!
//! - GET /healthz -> simple liveness ("ok")
//! - GET /readyz  -> readiness that checks DB connectivity and upload-dir I/O

use crate::services::image_service::ImageService;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;
use tokio::fs;
use uuid::Uuid;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// `GET /healthz` — cheap liveness probe, never performs I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz` — runs `SELECT 1` against SQLite and a best-effort
/// write/read/delete under the upload directory. 200 when both pass,
/// 503 otherwise.
pub async fn readyz(State(service): State<ImageService>) -> impl IntoResponse {
    let sqlite = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&*service.db)
        .await
    {
        Ok(1) => CheckStatus {
            ok: true,
            error: None,
        },
        Ok(other) => CheckStatus {
            ok: false,
            error: Some(format!("unexpected result: {other}")),
        },
        Err(err) => CheckStatus {
            ok: false,
            error: Some(err.to_string()),
        },
    };

    let disk = check_upload_dir(&service).await;

    let overall_ok = sqlite.ok && disk.ok;
    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let mut checks = HashMap::new();
    checks.insert("sqlite", sqlite);
    checks.insert("upload_dir", disk);

    (
        status,
        Json(ReadyResponse {
            status: if overall_ok { "ok" } else { "error" }.into(),
            checks,
        }),
    )
}

async fn check_upload_dir(service: &ImageService) -> CheckStatus {
    let tmp_path = service
        .upload_dir
        .join(format!(".readyz-{}", Uuid::new_v4()));

    let result = async {
        fs::create_dir_all(&service.upload_dir).await?;
        fs::write(&tmp_path, b"readyz").await?;
        let bytes = fs::read(&tmp_path).await?;
        if bytes != b"readyz" {
            return Err(std::io::Error::other("file content mismatch"));
        }
        Ok::<_, std::io::Error>(())
    }
    .await;

    // best-effort cleanup; a stale probe file is not a readiness failure
    let _ = fs::remove_file(&tmp_path).await;

    match result {
        Ok(()) => CheckStatus {
            ok: true,
            error: None,
        },
        Err(err) => CheckStatus {
            ok: false,
            error: Some(err.to_string()),
        },
    }
}
