mod get_notification_statistics;
pub mod send_daily_digest;
pub mod send_deadline_notifications;
mod send_test_notification;
mod templates;

use actix_web::web;
use get_notification_statistics::get_notification_statistics_controller;
use send_daily_digest::send_daily_digest_controller;
use send_deadline_notifications::send_deadline_notifications_controller;
use send_test_notification::send_test_notification_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/notifications/deadlines",
        web::post().to(send_deadline_notifications_controller),
    );
    cfg.route(
        "/notifications/daily-digest/{user_id}",
        web::post().to(send_daily_digest_controller),
    );
    cfg.route(
        "/notifications/test/{user_id}",
        web::post().to(send_test_notification_controller),
    );
    cfg.route(
        "/notifications/statistics",
        web::get().to(get_notification_statistics_controller),
    );
}
