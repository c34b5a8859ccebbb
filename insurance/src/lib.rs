use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware, web, App,
};
use common::{config::Config, repository::Storage};

use crate::service::mail::Mailer;

pub mod handlers;
pub mod scheduler;
pub mod service;

pub struct AppState {
    pub storage: Storage,
    pub mailer: Mailer,
    pub config: Config,
}

pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = actix_web::Error,
    >,
> {
    let cors = Cors::permissive();
    App::new()
        .wrap(cors)
        .wrap(middleware::Logger::default())
        .app_data(state)
        .service(handlers::insurance::get_entries)
        .service(handlers::insurance::add_entry)
        .service(handlers::insurance::bulk_add_entries)
        .service(handlers::insurance::update_entry)
        .service(handlers::insurance::delete_entry)
        .service(handlers::logs::get_logs)
        .service(handlers::logs::logs_status)
        .service(handlers::logs::delete_log)
        .service(handlers::logs::clear_logs)
        .service(handlers::email::send_reminders)
        .service(handlers::email::send_single_reminder)
        .service(handlers::health::health)
}

/// Ephemeral storage and a disabled mailer, for tests.
pub fn test_state() -> web::Data<AppState> {
    web::Data::new(AppState {
        storage: Storage::ephemeral(),
        mailer: Mailer::disabled(),
        config: Config::default(),
    })
}

pub fn create_test_app() -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = actix_web::Error,
    >,
> {
    create_app(test_state())
}
