use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

use crate::config::MailConfig;

/// Delivers verification codes.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, code: &str) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    subject: String,
}

impl SmtpMailer {
    pub fn new(cfg: &MailConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
            .context("smtp relay")?
            .port(cfg.port)
            .credentials(Credentials::new(cfg.from_email.clone(), cfg.password.clone()))
            .build();
        let from = Mailbox::new(
            Some(cfg.from_name.clone()),
            cfg.from_email.parse().context("sender address")?,
        );
        Ok(Self {
            transport,
            from,
            subject: cfg.subject.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, code: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse::<Mailbox>().context("recipient address")?)
            .subject(&self.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(code.to_string())
            .context("build message")?;
        self.transport.send(message).await.context("smtp send")?;
        debug!(to = %to, "verification mail sent");
        Ok(())
    }
}

/// Keeps every code instead of sending it.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingMailer {
    sent: parking_lot::Mutex<Vec<(String, String)>>,
    failing: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl RecordingMailer {
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        self.sent
            .lock()
            .iter()
            .rev()
            .find(|(addr, _)| addr == to)
            .map(|(_, code)| code.clone())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, code: &str) -> anyhow::Result<()> {
        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            anyhow::bail!("smtp unavailable");
        }
        self.sent.lock().push((to.to_string(), code.to_string()));
        Ok(())
    }
}
