mod email;
mod extraction;

pub use email::{
    EmailMessage, IEmailSender, InMemoryEmailSender, SmtpEmailSender, UnconfiguredEmailSender,
};
pub use extraction::{DeadlineExtractor, GeminiTextModel, ITextModel};
