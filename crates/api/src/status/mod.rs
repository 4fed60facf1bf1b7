use crate::job_schedulers::NotificationScheduler;
use actix_web::{web, HttpResponse};
use deadliner_api_structs::get_service_health::*;

async fn status(scheduler: web::Data<NotificationScheduler>) -> HttpResponse {
    HttpResponse::Ok().json(APIResponse {
        message: "Deadliner is up and running".into(),
        scheduler_running: scheduler.is_running(),
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(status));
}
