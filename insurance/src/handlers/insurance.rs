use actix_web::{
    delete, get, post, put,
    web::{self, Json},
    HttpResponse,
};
use common::{
    entities::insurance::{EntryPatch, NewEntry},
    error::{AddCode, Result},
};
use serde::Deserialize;
use serde_json::json;

use crate::{service::validate, AppState};

#[get("/insurance")]
pub async fn get_entries(state: web::Data<AppState>) -> Result<HttpResponse> {
    let entries = state.storage.entries.list().await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[post("/insurance")]
pub async fn add_entry(
    state: web::Data<AppState>,
    Json(entry): web::Json<NewEntry>,
) -> Result<HttpResponse> {
    let entry = validate::validate_new(&entry)
        .map_err(|errors| anyhow::anyhow!(errors.join("; ")).code(400))?;

    let created = state.storage.entries.add(entry).await?;
    Ok(HttpResponse::Created().json(created))
}

#[put("/insurance/{id}")]
pub async fn update_entry(
    state: web::Data<AppState>,
    id: web::Path<String>,
    Json(patch): web::Json<EntryPatch>,
) -> Result<HttpResponse> {
    validate::validate_patch(&patch)
        .map_err(|errors| anyhow::anyhow!(errors.join("; ")).code(400))?;

    let Some(updated) = state.storage.entries.update(&id, patch).await? else {
        return Err(anyhow::anyhow!("Entry not found").code(404));
    };
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/insurance/{id}")]
pub async fn delete_entry(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    if !state.storage.entries.delete(&id).await? {
        return Err(anyhow::anyhow!("Entry not found").code(404));
    }
    Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

/// Bulk import with per-row validation: valid rows commit even when
/// others fail, and each failing row is reported with its position.
#[post("/insurance/bulk")]
pub async fn bulk_add_entries(
    state: web::Data<AppState>,
    Json(request): web::Json<BulkRequest>,
) -> Result<HttpResponse> {
    let (valid, errors) = validate::validate_bulk(request.data);

    if valid.is_empty() && !errors.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "all rows failed validation",
            "status": "rejected",
            "errors": errors,
        })));
    }

    let inserted = state.storage.entries.bulk_add(valid).await?;
    let status = if errors.is_empty() { "accepted" } else { "partial" };
    Ok(HttpResponse::Created().json(json!({
        "status": status,
        "inserted": inserted,
        "errors": errors,
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::test::{self, init_service};
    use serde_json::{json, Value};

    use crate::create_test_app;

    fn asha() -> Value {
        json!({
            "name": "Asha",
            "email": "asha@example.com",
            "vehicleNo": "MH12AB1234",
            "vehicleType": "Car",
            "expiryDate": "2025-01-10"
        })
    }

    #[actix_web::test]
    async fn add_then_list_round_trips() {
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::post()
            .uri("/insurance")
            .set_json(asha())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        let created: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert!(!created["id"].as_str().unwrap().is_empty());
        assert!(!created["createdAt"].as_str().unwrap().is_empty());
        assert_eq!(created["name"], "Asha");

        let req = test::TestRequest::get().uri("/insurance").to_request();
        let resp = test::call_service(&app, req).await;
        let listed: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["vehicleNo"], "MH12AB1234");
    }

    #[actix_web::test]
    async fn add_rejects_invalid_email() {
        let app = init_service(create_test_app()).await;

        let mut entry = asha();
        entry["email"] = json!("not-an-address");
        let req = test::TestRequest::post()
            .uri("/insurance")
            .set_json(entry)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
        let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert!(body["error"].as_str().unwrap().contains("email"));
    }

    #[actix_web::test]
    async fn update_merges_supplied_fields_only() {
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::post()
            .uri("/insurance")
            .set_json(asha())
            .to_request();
        let created: Value =
            serde_json::from_slice(&test::read_body(test::call_service(&app, req).await).await)
                .unwrap();
        let id = created["id"].as_str().unwrap();

        let req = test::TestRequest::put()
            .uri(&format!("/insurance/{id}"))
            .set_json(json!({"vehicleType": "Bike"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let updated: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(updated["vehicleType"], "Bike");
        assert_eq!(updated["name"], "Asha");
        assert!(!updated["updatedAt"].as_str().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn update_missing_id_is_404() {
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::put()
            .uri("/insurance/missing-id")
            .set_json(json!({"name": "X"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);

        let req = test::TestRequest::get().uri("/insurance").to_request();
        let listed: Value =
            serde_json::from_slice(&test::read_body(test::call_service(&app, req).await).await)
                .unwrap();
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn delete_is_permanent_and_not_repeatable() {
        let app = init_service(create_test_app()).await;

        let req = test::TestRequest::post()
            .uri("/insurance")
            .set_json(asha())
            .to_request();
        let created: Value =
            serde_json::from_slice(&test::read_body(test::call_service(&app, req).await).await)
                .unwrap();
        let id = created["id"].as_str().unwrap();

        let req = test::TestRequest::delete()
            .uri(&format!("/insurance/{id}"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 204);

        let req = test::TestRequest::delete()
            .uri(&format!("/insurance/{id}"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn bulk_commits_valid_rows_and_reports_failures() {
        let app = init_service(create_test_app()).await;

        let mut bad = asha();
        bad["expiryDate"] = json!("someday");
        let req = test::TestRequest::post()
            .uri("/insurance/bulk")
            .set_json(json!({"data": [asha(), bad, asha()]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["status"], "partial");
        assert_eq!(body["inserted"].as_array().unwrap().len(), 2);
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
        assert_eq!(body["errors"][0]["row"], 2);

        let req = test::TestRequest::get().uri("/insurance").to_request();
        let listed: Value =
            serde_json::from_slice(&test::read_body(test::call_service(&app, req).await).await)
                .unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn bulk_with_all_rows_invalid_is_rejected() {
        let app = init_service(create_test_app()).await;

        let mut bad = asha();
        bad["email"] = json!("broken");
        let req = test::TestRequest::post()
            .uri("/insurance/bulk")
            .set_json(json!({"data": [bad]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["status"], "rejected");
    }
}
