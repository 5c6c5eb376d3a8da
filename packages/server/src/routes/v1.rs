use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/sections", section_routes(config))
        .nest("/content", content_routes())
        .nest("/media", media_routes())
}

fn section_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let crud = OpenApiRouter::new()
        .routes(routes!(handlers::section::list_sections))
        .routes(routes!(
            handlers::section::get_section,
            handlers::section::update_section
        ))
        .routes(routes!(handlers::section::list_revisions))
        .routes(routes!(handlers::section::restore_revision))
        .routes(routes!(handlers::section::reset_section));

    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::section::upload_section_image))
        .layer(handlers::section::image_upload_body_limit(
            config.storage.max_image_size,
        ));

    crud.merge(upload)
}

fn content_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::reset::reset_all))
        .routes(routes!(handlers::reset::reset_hero))
        .routes(routes!(handlers::reset::reset_page))
        .routes(routes!(handlers::reset::reset_type))
        .routes(routes!(handlers::reset::list_changes))
}

fn media_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::media::get_media))
}
