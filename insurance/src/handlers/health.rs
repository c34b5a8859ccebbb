use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::AppState;

#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "database": if state.storage.mode.is_database() { "Connected" } else { "Disconnected" },
        "storage": state.storage.mode.label(),
        "emailConfigured": state.mailer.is_configured(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::test::{self, init_service};
    use serde_json::Value;

    use crate::create_test_app;

    #[actix_web::test]
    async fn health_reports_storage_mode() {
        let app = init_service(create_test_app()).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/health").to_request(),
        )
        .await;
        assert_eq!(resp.status(), 200);

        let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["status"], "OK");
        assert_eq!(body["database"], "Disconnected");
        assert_eq!(body["storage"], "File Storage");
        assert!(!body["timestamp"].as_str().unwrap().is_empty());
    }
}
