use utoipa::OpenApi;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(title = "mihome", description = "Xiaomi based smart home automation"),
    paths(
        handlers::bulbs_on,
        handlers::bulbs_off,
        handlers::bulbs_toggle,
        handlers::bulbs_brightness,
        handlers::bulbs_temperature,
        handlers::bulbs_color,
        handlers::bulbs_ukraine,
        handlers::bulbs_dance,
    )
)]
pub struct ApiDoc;
