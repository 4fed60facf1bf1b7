use deadliner_domain::User;
use deadliner_infra::{DeadlineExtractor, DeadlinerContext, ISys, ITextModel, InMemoryEmailSender};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

pub struct StaticTimeSys(pub i64);

impl ISys for StaticTimeSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.0
    }
}

/// Text model that always answers with the same output
pub struct StaticTextModel {
    output: String,
    calls: AtomicUsize,
}

impl StaticTextModel {
    pub fn new(output: &str) -> Self {
        Self {
            output: output.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ITextModel for StaticTextModel {
    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

pub async fn setup() -> (DeadlinerContext, User) {
    let ctx = DeadlinerContext::create_inmemory();
    let user = User::new("ada@example.com", "Ada");
    ctx.repos.users.insert(&user).await.unwrap();
    (ctx, user)
}

pub async fn setup_with_model(model: Arc<StaticTextModel>) -> (DeadlinerContext, User) {
    let (mut ctx, user) = setup().await;
    ctx.services.extractor = DeadlineExtractor::new(model);
    (ctx, user)
}

/// Replaces the mailer of the context with one the test can inspect
pub fn with_mailer(ctx: &mut DeadlinerContext) -> Arc<InMemoryEmailSender> {
    let mailer = Arc::new(InMemoryEmailSender::new());
    ctx.services.email = mailer.clone();
    mailer
}
