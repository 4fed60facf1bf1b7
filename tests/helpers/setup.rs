use deadliner_api::{create_user_token, Application};
use deadliner_domain::User;
use deadliner_infra::{
    Config, DeadlineExtractor, DeadlinerContext, ITextModel, InMemoryEmailSender,
};
use deadliner_sdk::DeadlinerSDK;
use std::sync::Arc;

/// Text model that always answers with the same output
pub struct StaticTextModel(pub String);

#[async_trait::async_trait]
impl ITextModel for StaticTextModel {
    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}

pub struct TestApp {
    pub config: Config,
    pub address: String,
    pub user: User,
    pub mailer: Arc<InMemoryEmailSender>,
}

impl TestApp {
    /// Client authenticated with the admin api key
    pub fn admin(&self) -> DeadlinerSDK {
        DeadlinerSDK::new(self.address.clone(), self.config.admin_api_key.clone())
    }

    /// Client acting on behalf of the seeded user
    pub fn user_client(&self) -> DeadlinerSDK {
        let exp = chrono::Utc::now().timestamp() + 60 * 60;
        let token = create_user_token(&self.user.id, &self.config.jwt_secret, exp)
            .expect("Token to be created");
        DeadlinerSDK::for_user(self.address.clone(), token)
    }
}

// Launch the application as a background task
pub async fn spawn_app(model_output: &str) -> TestApp {
    let mut ctx = DeadlinerContext::create_inmemory();
    ctx.config.port = 0; // Random port
    ctx.config.scheduler.enabled = false;
    ctx.services.extractor = DeadlineExtractor::new(Arc::new(StaticTextModel(
        model_output.to_string(),
    )));
    let mailer = Arc::new(InMemoryEmailSender::new());
    ctx.services.email = mailer.clone();

    let user = User::new("ada@example.com", "Ada");
    ctx.repos
        .users
        .insert(&user)
        .await
        .expect("User to be inserted");

    let config = ctx.config.clone();
    let application = Application::new(ctx)
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        config,
        address,
        user,
        mailer,
    }
}
