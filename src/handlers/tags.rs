/// Tag catalog handler
use crate::services::TagCatalog;
use actix_web::{web, HttpResponse};

/// List the available tags (read-only catalog loaded at startup)
pub async fn get_tags(catalog: web::Data<TagCatalog>) -> HttpResponse {
    HttpResponse::Ok().json(catalog.tags())
}
