use actix_web::{web, HttpServer};
use common::{config::Config, repository::Storage};
use insurance::{create_app, scheduler, service::mail::Mailer, AppState};
use log::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let storage = Storage::init(&config).await;
    info!("storage mode: {}", storage.mode.label());

    let mailer = Mailer::from_config(&config);
    let port = config.port;

    let state = web::Data::new(AppState {
        storage,
        mailer,
        config,
    });

    scheduler::start(state.clone());

    info!("insurance tracker listening on port {port}");
    HttpServer::new(move || create_app(state.clone()))
        .bind(("0.0.0.0", port))?
        .run()
        .await
}
