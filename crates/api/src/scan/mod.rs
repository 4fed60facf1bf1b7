mod commit_scan_session;
mod document;
mod get_scan_session;
mod scan_document;
pub mod sweep_scan_sessions;

use actix_web::web;
use commit_scan_session::commit_scan_session_controller;
use get_scan_session::get_scan_session_controller;
use scan_document::scan_document_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/scan", web::post().to(scan_document_controller));
    cfg.route(
        "/scan/commit",
        web::post().to(commit_scan_session_controller),
    );
    cfg.route(
        "/scan/{session_id}",
        web::get().to(get_scan_session_controller),
    );
}
