use std::time::Duration;

use actix_web::cookie::Key;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use actix_web_flash_messages::storage::CookieMessageStore;
use actix_web_flash_messages::{FlashMessagesFramework, Level};
use tera::Tera;

use isaca_sv_web::configure;
use isaca_sv_web::models::config::ServerConfig;
use isaca_sv_web::repository::ApiRepository;
use isaca_sv_web::routes::alert_level_to_str;

fn flash_framework() -> FlashMessagesFramework {
    let store = CookieMessageStore::builder(Key::from(&[7u8; 64])).build();
    FlashMessagesFramework::builder(store).build()
}

fn templates() -> Tera {
    Tera::new("templates/**/*").expect("templates should parse")
}

/// Backend on a closed local port, so every call fails fast.
fn unreachable_backend() -> ApiRepository {
    ApiRepository::new("http://127.0.0.1:9/api/", Duration::from_secs(1), None)
        .expect("valid backend url")
}

fn server_config() -> ServerConfig {
    ServerConfig::load("config", "test").expect("default config should load")
}

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .wrap(flash_framework())
                .app_data(web::Data::new(templates()))
                .app_data(web::Data::new(unreachable_backend()))
                .app_data(web::Data::new(server_config()))
                .configure(configure),
        )
        .await
    };
}

#[std::prelude::v1::test]
fn test_alert_level_to_str_mappings() {
    assert_eq!(alert_level_to_str(&Level::Error), "danger");
    assert_eq!(alert_level_to_str(&Level::Warning), "warning");
    assert_eq!(alert_level_to_str(&Level::Success), "success");
    assert_eq!(alert_level_to_str(&Level::Info), "info");
    assert_eq!(alert_level_to_str(&Level::Debug), "info");
}

#[actix_web::test]
async fn static_pages_render() {
    let app = app!();

    for (path, needle) in [
        ("/about", "About the chapter"),
        ("/membership", "Premium"),
        ("/contact", "Contact us"),
    ] {
        let req = test::TestRequest::get().uri(path).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
        let body = test::read_body(resp).await;
        let body = String::from_utf8_lossy(&body);
        assert!(body.contains(needle), "{path} should mention {needle}");
    }
}

#[actix_web::test]
async fn home_page_survives_backend_outage() {
    let app = app!();

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("temporarily unavailable"));
}

#[actix_web::test]
async fn filter_panel_redirects_to_first_page_with_filters() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/admin/users/filters")
        .set_form([
            ("state", "page=3&limit=25"),
            ("action", "apply"),
            ("status", "pending"),
            ("search", ""),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("/admin/users?"));
    assert!(location.contains("status=pending"));
    assert!(location.contains("limit=25"));
    assert!(!location.contains("page=3"));
}

#[actix_web::test]
async fn unknown_collection_is_not_found() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/admin/events/evt-1/photos")
        .set_form([("name", "x")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn bulk_action_asks_for_confirmation_first() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/admin/users/bulk")
        .set_form([
            ("state", "status=active&page=4"),
            ("action", "suspend"),
            ("ids", "u1"),
            ("ids", "u2"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("Suspend 2 users?"));
    assert!(body.contains(r#"name="confirmed" value="yes""#));
    assert!(body.contains(r#"name="ids" value="u1""#));
    assert!(body.contains(r#"name="ids" value="u2""#));
}

#[actix_web::test]
async fn confirmed_bulk_action_returns_to_first_page_with_filters() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/admin/users/bulk")
        .set_form([
            ("state", "status=active&page=4&limit=25"),
            ("action", "activate"),
            ("ids", "u1"),
            ("confirmed", "yes"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("/admin/users?"));
    assert!(location.contains("status=active"));
    assert!(location.contains("page=1&limit=25"));
}

#[actix_web::test]
async fn export_without_fields_reopens_the_dialog() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/admin/users/export")
        .set_form([("state", "status=active"), ("format", "csv"), ("window", "all")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::CONTENT_DISPOSITION).is_none());
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("select at least one group of fields"));
}
