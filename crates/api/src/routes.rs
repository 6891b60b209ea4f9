use actix_web::{error::JsonPayloadError, web, HttpRequest};
use fitlog_domain::model::{Exercise, Resource, User, Workout};

use crate::handlers::{
    create_handler, delete_handler, fetch_handler, health_handler, update_handler, ApiError,
};

/// Registers the public API surface. `json_limit` caps request bodies.
pub fn configure(cfg: &mut web::ServiceConfig, json_limit: usize) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(json_limit)
            .error_handler(json_error_handler),
    )
    .route("/api", web::get().to(health_handler));

    resource_routes::<User>(cfg, "/api/users", "/api/users/{user_id}");
    resource_routes::<Exercise>(cfg, "/api/exercises", "/api/exercises/{exercise_id}");
    resource_routes::<Workout>(cfg, "/api/workouts", "/api/workouts/{workout_id}");
}

fn resource_routes<R: Resource>(cfg: &mut web::ServiceConfig, collection: &str, item: &str) {
    cfg.route(collection, web::post().to(create_handler::<R>))
        .service(
            web::resource(item)
                .route(web::get().to(fetch_handler::<R>))
                .route(web::patch().to(update_handler::<R>))
                .route(web::delete().to(delete_handler::<R>)),
        );
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::MalformedBody(err.to_string()).into()
}
