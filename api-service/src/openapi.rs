use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use common::models::{AuthUser, Comment, Document, HealthReport, Post, Product};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Diesel Hub API",
        description = "Procedures are served from /api/trpc/{procedure}: queries over GET \
                       with a JSON `input` query parameter, mutations over POST with a JSON body. \
                       Add `?batch=1` and comma-separate procedure names to batch calls."
    ),
    paths(handlers::health),
    components(schemas(HealthReport, AuthUser, Product, Post, Comment, Document)),
    tags(
        (name = "rpc", description = "Procedure payloads exchanged over /api/trpc"),
    ),
)]
struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
