//! Public chapter pages.

use actix_web::{Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::repository::ApiRepository;
use crate::routes::{base_context, render_template};
use crate::services::main as main_service;

#[get("/")]
pub async fn home(
    repo: web::Data<ApiRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let data = main_service::load_home_page(repo.get_ref()).await;

    let mut context = base_context(&flash_messages, "home");
    context.insert("upcoming", &data.upcoming);
    context.insert("events_unavailable", &data.events_unavailable);
    render_template(&tera, "main/home.html", &context)
}

#[get("/about")]
pub async fn about(flash_messages: IncomingFlashMessages, tera: web::Data<Tera>) -> impl Responder {
    let context = base_context(&flash_messages, "about");
    render_template(&tera, "main/about.html", &context)
}

#[get("/membership")]
pub async fn membership(
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context = base_context(&flash_messages, "membership");
    context.insert("tiers", &main_service::membership_tiers());
    render_template(&tera, "main/membership.html", &context)
}

#[get("/contact")]
pub async fn contact(flash_messages: IncomingFlashMessages, tera: web::Data<Tera>) -> impl Responder {
    let context = base_context(&flash_messages, "contact");
    render_template(&tera, "main/contact.html", &context)
}
