mod error;
mod job_schedulers;
mod notification;
mod scan;
mod shared;
mod status;
#[cfg(test)]
mod test_utils;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use deadliner_infra::DeadlinerContext;
use job_schedulers::NotificationScheduler;
use std::net::TcpListener;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub use shared::auth::create_user_token;

/// Largest document accepted by the scan endpoint
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    notification::configure_routes(cfg);
    scan::configure_routes(cfg);
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
    scheduler: web::Data<NotificationScheduler>,
}

impl Application {
    pub async fn new(context: DeadlinerContext) -> Result<Self, std::io::Error> {
        let scheduler = web::Data::new(NotificationScheduler::new());
        let (server, port) =
            Application::configure_server(context.clone(), scheduler.clone()).await?;
        Application::start_job_schedulers(context, &scheduler);

        Ok(Self {
            server,
            port,
            scheduler,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn start_job_schedulers(context: DeadlinerContext, scheduler: &NotificationScheduler) {
        if context.config.scheduler.enabled {
            scheduler.start(context);
        } else {
            info!("Notification scheduler is disabled");
        }
    }

    async fn configure_server(
        context: DeadlinerContext,
        scheduler: web::Data<NotificationScheduler>,
    ) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
                .app_data(web::Data::new(ctx))
                .app_data(scheduler.clone())
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        let res = self.server.await;
        self.scheduler.stop();
        res
    }
}
