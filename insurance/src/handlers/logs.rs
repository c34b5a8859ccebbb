use actix_web::{delete, get, web, HttpResponse};
use common::{
    entities::email_log::EmailStatus,
    error::{AddCode, Result},
};
use serde_json::json;

use crate::AppState;

#[get("/logs")]
pub async fn get_logs(state: web::Data<AppState>) -> Result<HttpResponse> {
    let logs = state.storage.logs.list().await?;
    Ok(HttpResponse::Ok().json(logs))
}

#[get("/logs/status")]
pub async fn logs_status(state: web::Data<AppState>) -> Result<HttpResponse> {
    let logs = state.storage.logs.list().await?;

    let count = |status: EmailStatus| logs.iter().filter(|l| l.status == status).count();
    Ok(HttpResponse::Ok().json(json!({
        "total": logs.len(),
        "successful": count(EmailStatus::Success),
        "failed": count(EmailStatus::Failed),
        "simulated": count(EmailStatus::Simulated),
        "recent": logs.iter().take(10).collect::<Vec<_>>(),
    })))
}

#[delete("/logs/{id}")]
pub async fn delete_log(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    if !state.storage.logs.delete(&id).await? {
        return Err(anyhow::anyhow!("Log entry not found").code(404));
    }
    Ok(HttpResponse::NoContent().finish())
}

#[delete("/logs")]
pub async fn clear_logs(state: web::Data<AppState>) -> Result<HttpResponse> {
    let cleared = state.storage.logs.clear().await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "All logs cleared successfully",
        "cleared": cleared,
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::test::{self, init_service};
    use serde_json::{json, Value};

    use crate::create_test_app;

    #[actix_web::test]
    async fn logs_start_empty_and_can_be_cleared() {
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::get().uri("/logs").to_request();
        let logs: Value =
            serde_json::from_slice(&test::read_body(test::call_service(&app, req).await).await)
                .unwrap();
        assert!(logs.as_array().unwrap().is_empty());

        // a simulated send produces exactly one log entry
        let req = test::TestRequest::post()
            .uri("/send-single-reminder")
            .set_json(json!({
                "name": "Asha",
                "email": "asha@example.com",
                "expiryDate": "2025-01-10"
            }))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::get().uri("/logs/status").to_request();
        let status: Value =
            serde_json::from_slice(&test::read_body(test::call_service(&app, req).await).await)
                .unwrap();
        assert_eq!(status["total"], 1);
        assert_eq!(status["simulated"], 1);
        assert_eq!(status["failed"], 0);

        let req = test::TestRequest::delete().uri("/logs").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get().uri("/logs").to_request();
        let logs: Value =
            serde_json::from_slice(&test::read_body(test::call_service(&app, req).await).await)
                .unwrap();
        assert!(logs.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn deleting_a_missing_log_is_404() {
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::delete()
            .uri("/logs/missing-id")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn individual_logs_can_be_deleted() {
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::post()
            .uri("/send-single-reminder")
            .set_json(json!({
                "name": "Asha",
                "email": "asha@example.com",
                "expiryDate": "2025-01-10"
            }))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::get().uri("/logs").to_request();
        let logs: Value =
            serde_json::from_slice(&test::read_body(test::call_service(&app, req).await).await)
                .unwrap();
        let id = logs[0]["id"].as_str().unwrap();

        let req = test::TestRequest::delete()
            .uri(&format!("/logs/{id}"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 204);
    }
}
