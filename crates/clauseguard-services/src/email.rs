//! Email service for account notifications via SMTP.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;

use clauseguard_core::Config;

pub const PREMIUM_SUBJECT: &str = "Welcome to the Premium Plan";

/// SMTP mailer. `from_config` returns `None` when email is disabled or SMTP is not configured.
#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
}

impl EmailService {
    pub fn from_config(config: &Config) -> Option<Self> {
        if !config.email_enabled() {
            tracing::debug!("Email disabled (EMAIL_ENABLED=false)");
            return None;
        }
        let host = config.smtp_host()?;
        let from = config.smtp_from()?.to_string();
        let port = config.smtp_port().unwrap_or(587);
        let credentials = match (config.smtp_user(), config.smtp_password()) {
            (Some(u), Some(p)) => Some(Credentials::new(u.to_string(), p.to_string())),
            _ => None,
        };

        let mailer = if config.smtp_tls() {
            let b = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .ok()?
                .port(port);
            let b = match credentials {
                Some(c) => b.credentials(c),
                None => b,
            };
            tracing::info!(host = %host, port = port, "Email service initialized (SMTP with STARTTLS)");
            b.build()
        } else {
            let b = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port);
            let b = match credentials {
                Some(c) => b.credentials(c),
                None => b,
            };
            tracing::info!(host = %host, port = port, "Email service initialized (SMTP)");
            b.build()
        };

        Some(Self {
            mailer: Arc::new(mailer),
            from,
        })
    }

    /// Send an HTML email to a single recipient.
    pub async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<(), String> {
        let message = build_message(&self.from, to, subject, html)?;
        self.mailer.send(message).await.map_err(|e| e.to_string())?;
        Ok(())
    }

    pub async fn send_premium_confirmation(&self, to: &str, user_name: &str) -> Result<(), String> {
        self.send_html(to, PREMIUM_SUBJECT, premium_confirmation_html(user_name))
            .await?;
        tracing::info!("Premium confirmation email sent");
        Ok(())
    }
}

fn build_message(from: &str, to: &str, subject: &str, html: String) -> Result<Message, String> {
    let to_addr: Mailbox = to
        .parse()
        .map_err(|e| format!("Invalid recipient address: {}", e))?;
    let from_addr: Mailbox = from
        .parse()
        .map_err(|e| format!("Invalid SMTP_FROM: {}", e))?;

    Message::builder()
        .from(from_addr)
        .to(to_addr)
        .subject(subject)
        .header(ContentType::TEXT_HTML)
        .body(html)
        .map_err(|e| e.to_string())
}

pub fn premium_confirmation_html(user_name: &str) -> String {
    format!(
        "<h1>Welcome to the Premium Plan, {}!</h1>",
        escape_html(user_name)
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
