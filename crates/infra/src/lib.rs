mod config;
mod repos;
mod services;
mod system;

use futures::lock::Mutex;
pub use config::{Config, GeminiConfig, SchedulerConfig, SmtpConfig};
pub use repos::{IDeadlineRepo, INotificationLedgerRepo, IScanSessionRepo, IUserRepo, Repos};
pub use services::*;
use std::sync::Arc;
pub use system::{ISys, RealSys};
use tracing::warn;

/// External capabilities the use cases depend on
#[derive(Clone)]
pub struct Services {
    pub email: Arc<dyn IEmailSender>,
    pub extractor: DeadlineExtractor,
}

impl Services {
    fn create(config: &Config) -> Self {
        let email: Arc<dyn IEmailSender> = match &config.smtp {
            Some(smtp) => Arc::new(
                SmtpEmailSender::new(smtp).expect("SMTP configuration to be valid"),
            ),
            None => Arc::new(UnconfiguredEmailSender),
        };
        let extractor = match &config.gemini {
            Some(gemini) => DeadlineExtractor::new(Arc::new(GeminiTextModel::new(gemini))),
            None => DeadlineExtractor::unconfigured(),
        };

        Self { email, extractor }
    }

    pub fn create_inmemory() -> Self {
        Self {
            email: Arc::new(InMemoryEmailSender::new()),
            extractor: DeadlineExtractor::unconfigured(),
        }
    }
}

#[derive(Clone)]
pub struct DeadlinerContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub services: Services,
    /// Held for the whole of a notification or digest pass so that the
    /// scheduler and the admin routes never run overlapping passes.
    pub notification_lock: Arc<Mutex<()>>,
}

struct ContextParams {
    pub postgres_connection_string: Option<String>,
}

impl DeadlinerContext {
    async fn create(params: ContextParams) -> Self {
        let config = Config::new();
        let repos = match params.postgres_connection_string {
            Some(connection_string) => Repos::create_postgres(&connection_string)
                .await
                .expect("Postgres credentials must be set and valid"),
            None => {
                warn!("DATABASE_URL is not set. All data is kept in memory and lost on restart.");
                Repos::create_inmemory()
            }
        };
        Self {
            repos,
            services: Services::create(&config),
            config,
            sys: Arc::new(RealSys {}),
            notification_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Context without any external infrastructure, used by tests
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            services: Services::create_inmemory(),
            notification_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> DeadlinerContext {
    DeadlinerContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string(),
    })
    .await
}

fn get_psql_connection_string() -> Option<String> {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .ok()
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn email_fails_without_smtp_config() {
        let mut config = Config::new();
        config.smtp = None;
        let services = Services::create(&config);

        let message = EmailMessage {
            to: "ada@example.com".into(),
            subject: "Reminder".into(),
            text_body: "Hello".into(),
            html_body: None,
        };
        assert!(services.email.send(&message).await.is_err());
    }
}
