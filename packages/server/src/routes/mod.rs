use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn api_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(gallery_routes(config))
        .merge(upload_routes())
        .merge(health_routes())
}

fn gallery_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    use handlers::gallery::*;

    OpenApiRouter::new()
        .routes(routes!(list_galleries, create_gallery))
        .routes(routes!(gallery_stats))
        .routes(routes!(get_gallery, update_gallery, delete_gallery))
        .routes(routes!(attach_image))
        .routes(routes!(toggle_active))
        .layer(gallery_body_limit(&config.storage))
}

fn upload_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::uploads::serve_upload))
}

fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::health::health))
        .routes(routes!(handlers::health::uploads_check))
}
