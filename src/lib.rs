//! ISACA Silicon Valley chapter website: public pages, the events catalog
//! with registration, and the admin back-office, rendered server side on
//! top of the chapter's REST backend.

#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_files::Files;
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};
#[cfg(feature = "server")]
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
#[cfg(feature = "server")]
use tera::Tera;

#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::ApiRepository;

pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
pub mod export;
pub mod formatting;
#[cfg(feature = "server")]
pub mod forms;
pub mod models;
pub mod pagination;
#[cfg(feature = "server")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;

/// Registers every route. Fixed paths come before the parameterised
/// routes that would otherwise capture them.
#[cfg(feature = "server")]
pub fn configure(cfg: &mut web::ServiceConfig) {
    use crate::routes::{admin_events, admin_users, events, main};

    cfg.service(main::home)
        .service(main::about)
        .service(main::membership)
        .service(main::contact)
        .service(events::catalog)
        .service(events::show_event)
        .service(events::register)
        .service(admin_users::list_users)
        .service(admin_users::apply_filters)
        .service(admin_users::bulk_users)
        .service(admin_users::export_dialog)
        .service(admin_users::export_users)
        .service(admin_users::create_user)
        .service(admin_users::delete_user)
        .service(admin_users::update_user)
        .service(admin_events::list_events)
        .service(admin_events::new_event)
        .service(admin_events::edit_event)
        .service(admin_events::create_event)
        .service(admin_events::delete_event)
        .service(admin_events::upload_banner)
        .service(admin_events::remove_collection_item)
        .service(admin_events::edit_collection)
        .service(admin_events::update_event);
}

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    let repo = ApiRepository::new(
        &server_config.api_base_url,
        server_config.api_timeout(),
        server_config.api_token.clone(),
    )
    .map_err(|e| std::io::Error::other(format!("Invalid backend configuration: {e}")))?;

    let secret_key = Key::from(server_config.secret.as_bytes());
    let message_store = CookieMessageStore::builder(secret_key).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!(
        "Serving {} on {}:{} against {}",
        server_config.domain,
        bind_address.0,
        bind_address.1,
        server_config.api_base_url
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/assets", server_config.assets_dir.clone()))
            .configure(configure)
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
