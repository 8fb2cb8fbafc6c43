//! Email channel — IMAP polling for inbound tickets, SMTP for outbound
//! resolution notifications.
//!
//! Inbound uses raw IMAP over rustls (blocking, run via
//! `spawn_blocking`); outbound uses lettre. Both directions share
//! `EmailConfig`, built from environment variables — when
//! `EMAIL_IMAP_HOST` is unset the channel is disabled entirely.

use std::io::Write as IoWrite;
use std::net::TcpStream;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use mail_parser::{MessageParser, MimeHeaders};
use uuid::Uuid;

use crate::error::ChannelError;

// ── Configuration ───────────────────────────────────────────────────

/// Email channel configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub imap_host: String,
    pub imap_port: u16,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub poll_interval_secs: u64,
    pub allowed_senders: Vec<String>,
}

impl EmailConfig {
    /// Build config from environment variables.
    /// Returns `None` if `EMAIL_IMAP_HOST` is not set (channel disabled).
    pub fn from_env() -> Option<Self> {
        let imap_host = std::env::var("EMAIL_IMAP_HOST").ok()?;

        let imap_port: u16 = std::env::var("EMAIL_IMAP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(993);

        let smtp_host =
            std::env::var("EMAIL_SMTP_HOST").unwrap_or_else(|_| imap_host.replace("imap", "smtp"));

        let smtp_port: u16 = std::env::var("EMAIL_SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        let username = std::env::var("EMAIL_USERNAME").unwrap_or_default();
        let password = std::env::var("EMAIL_PASSWORD").unwrap_or_default();
        let from_address = std::env::var("EMAIL_FROM_ADDRESS").unwrap_or_else(|_| username.clone());

        let poll_interval_secs: u64 = std::env::var("EMAIL_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        let allowed_senders: Vec<String> = std::env::var("EMAIL_ALLOWED_SENDERS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Some(Self {
            imap_host,
            imap_port,
            smtp_host,
            smtp_port,
            username,
            password,
            from_address,
            poll_interval_secs,
            allowed_senders,
        })
    }
}

// ── Outbound ────────────────────────────────────────────────────────

/// Send the resolution notification for a ticket via SMTP (blocking —
/// run in `spawn_blocking`).
pub fn send_resolution_email(
    config: &EmailConfig,
    to: &str,
    ticket_id: u64,
    message: &str,
) -> Result<(), ChannelError> {
    let subject = format!("Su ticket #{ticket_id} fue resuelto");
    let html = resolution_email_html(ticket_id, message);
    send_email(config, to, &subject, &html)
}

/// Render the resolution notification body.
fn resolution_email_html(ticket_id: u64, message: &str) -> String {
    format!(
        "<div style=\"font-family: Arial, sans-serif; padding: 25px;\">\
           <h2 style=\"margin-top:0;\">Ticket Resuelto</h2>\
           <p>Hola,</p>\
           <p>Su ticket <b>#{ticket_id}</b> ha sido resuelto por nuestro equipo.</p>\
           <p>{message}</p>\
           <p>Si necesita más ayuda, puede responder este mismo correo.</p>\
           <p>Saludos,<br><b>Equipo de Soporte</b></p>\
         </div>"
    )
}

/// Send an HTML email via SMTP.
fn send_email(
    config: &EmailConfig,
    to: &str,
    subject: &str,
    html_body: &str,
) -> Result<(), ChannelError> {
    let creds = Credentials::new(config.username.clone(), config.password.clone());

    let transport = SmtpTransport::relay(&config.smtp_host)
        .map_err(|e| ChannelError::SendFailed {
            name: "email".into(),
            reason: format!("SMTP relay error: {e}"),
        })?
        .port(config.smtp_port)
        .credentials(creds)
        .build();

    let email = Message::builder()
        .from(config.from_address.parse().map_err(|e| {
            ChannelError::SendFailed {
                name: "email".into(),
                reason: format!("Invalid from address: {e}"),
            }
        })?)
        .to(to.parse().map_err(|e| ChannelError::SendFailed {
            name: "email".into(),
            reason: format!("Invalid to address: {e}"),
        })?)
        .subject(subject)
        .header(ContentType::TEXT_HTML)
        .body(html_body.to_string())
        .map_err(|e| ChannelError::SendFailed {
            name: "email".into(),
            reason: format!("Failed to build email: {e}"),
        })?;

    transport.send(&email).map_err(|e| ChannelError::SendFailed {
        name: "email".into(),
        reason: format!("SMTP send failed: {e}"),
    })?;

    tracing::info!("Resolution email sent to {to}");
    Ok(())
}

// ── Helpers (public for testing) ────────────────────────────────────

/// Check if a sender email is in the allowlist.
///
/// - Empty list → deny all
/// - `*` in list → allow all
/// - `@domain.com` or `domain.com` → domain match
/// - `user@domain.com` → exact email match
pub fn is_sender_allowed(allowed: &[String], email: &str) -> bool {
    if allowed.is_empty() {
        return false;
    }
    if allowed.iter().any(|a| a == "*") {
        return true;
    }
    let email_lower = email.to_lowercase();
    allowed.iter().any(|a| {
        if a.starts_with('@') {
            // "@example.com" → domain match
            email_lower.ends_with(&a.to_lowercase())
        } else if a.contains('@') {
            // "user@example.com" → exact email match
            a.eq_ignore_ascii_case(email)
        } else {
            // "example.com" → domain match
            email_lower.ends_with(&format!("@{}", a.to_lowercase()))
        }
    })
}

/// Strip HTML tags from content (basic).
pub fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    // Normalize whitespace
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the sender address from a parsed email.
fn extract_sender(parsed: &mail_parser::Message) -> String {
    parsed
        .from()
        .and_then(|addr| addr.first())
        .and_then(|a| a.address())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".into())
}

/// Extract readable text from a parsed email.
fn extract_text(parsed: &mail_parser::Message) -> String {
    if let Some(text) = parsed.body_text(0) {
        return text.to_string();
    }
    if let Some(html) = parsed.body_html(0) {
        return strip_html(html.as_ref());
    }
    for part in parsed.attachments() {
        let part: &mail_parser::MessagePart = part;
        if let Some(ct) = MimeHeaders::content_type(part)
            && ct.ctype() == "text"
            && let Ok(text) = std::str::from_utf8(part.contents())
        {
            return text.to_string();
        }
    }
    "(no readable content)".to_string()
}

// ── Inbound ─────────────────────────────────────────────────────────

/// A fetched email.
#[derive(Debug, Clone)]
pub struct FetchedEmail {
    pub message_id: String,
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub timestamp: u64,
}

/// Error type for IMAP fetch operations.
type ImapError = Box<dyn std::error::Error + Send + Sync>;

/// Fetch unseen emails via raw IMAP over TLS, marking each as \Seen
/// (blocking — run in spawn_blocking).
pub fn fetch_unseen_imap(config: &EmailConfig) -> Result<Vec<FetchedEmail>, ImapError> {
    use std::sync::Arc as StdArc;

    // Connect TCP
    let tcp = TcpStream::connect((&*config.imap_host, config.imap_port))?;
    tcp.set_read_timeout(Some(Duration::from_secs(30)))?;

    // TLS via rustls
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls_config = StdArc::new(
        rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth(),
    );
    let server_name: rustls::pki_types::ServerName<'_> =
        rustls::pki_types::ServerName::try_from(config.imap_host.clone())?;
    let conn = rustls::ClientConnection::new(tls_config, server_name)?;
    let mut tls = rustls::StreamOwned::new(conn, tcp);

    // ── IMAP helpers ────────────────────────────────────────────────
    let read_line =
        |tls: &mut rustls::StreamOwned<rustls::ClientConnection, TcpStream>| -> Result<String, ImapError> {
            let mut buf = Vec::new();
            loop {
                let mut byte = [0u8; 1];
                match std::io::Read::read(tls, &mut byte) {
                    Ok(0) => return Err("IMAP connection closed".into()),
                    Ok(_) => {
                        buf.push(byte[0]);
                        if buf.ends_with(b"\r\n") {
                            return Ok(String::from_utf8_lossy(&buf).to_string());
                        }
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

    let send_cmd =
        |tls: &mut rustls::StreamOwned<rustls::ClientConnection, TcpStream>,
         tag: &str,
         cmd: &str|
         -> Result<Vec<String>, ImapError> {
            let full = format!("{tag} {cmd}\r\n");
            IoWrite::write_all(tls, full.as_bytes())?;
            IoWrite::flush(tls)?;
            let mut lines = Vec::new();
            loop {
                let line = read_line(tls)?;
                let done = line.starts_with(tag);
                lines.push(line);
                if done {
                    break;
                }
            }
            Ok(lines)
        };

    // Read greeting
    let _greeting = read_line(&mut tls)?;

    // Login
    let login_resp = send_cmd(
        &mut tls,
        "A1",
        &format!("LOGIN \"{}\" \"{}\"", config.username, config.password),
    )?;
    if !login_resp.last().is_some_and(|l| l.contains("OK")) {
        return Err("IMAP login failed".into());
    }

    // Select INBOX
    let _select = send_cmd(&mut tls, "A2", "SELECT \"INBOX\"")?;

    // Search unseen
    let search_resp = send_cmd(&mut tls, "A3", "SEARCH UNSEEN")?;
    let mut uids: Vec<&str> = Vec::new();
    for line in &search_resp {
        if line.starts_with("* SEARCH") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() > 2 {
                uids.extend_from_slice(&parts[2..]);
            }
        }
    }

    let mut results = Vec::new();
    let mut tag_counter = 4_u32;

    for uid in &uids {
        let fetch_tag = format!("A{tag_counter}");
        tag_counter += 1;
        let fetch_resp = send_cmd(&mut tls, &fetch_tag, &format!("FETCH {uid} RFC822"))?;

        let raw: String = fetch_resp
            .iter()
            .skip(1)
            .take(fetch_resp.len().saturating_sub(2))
            .cloned()
            .collect();

        if let Some(parsed) = MessageParser::default().parse(raw.as_bytes()) {
            let sender = extract_sender(&parsed);
            let subject = parsed.subject().unwrap_or("(no subject)").to_string();
            let body = extract_text(&parsed);
            let message_id = parsed
                .message_id()
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("gen-{}", Uuid::new_v4()));

            #[allow(clippy::cast_sign_loss)]
            let timestamp = parsed
                .date()
                .map(|d| {
                    let naive = chrono::NaiveDate::from_ymd_opt(
                        d.year as i32,
                        u32::from(d.month),
                        u32::from(d.day),
                    )
                    .and_then(|date| {
                        date.and_hms_opt(
                            u32::from(d.hour),
                            u32::from(d.minute),
                            u32::from(d.second),
                        )
                    });
                    naive.map_or(0, |n| n.and_utc().timestamp() as u64)
                })
                .unwrap_or_else(|| {
                    SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .map(|d| d.as_secs())
                        .unwrap_or(0)
                });

            results.push(FetchedEmail {
                message_id,
                sender,
                subject,
                body,
                timestamp,
            });
        }

        // Mark as seen
        let store_tag = format!("A{tag_counter}");
        tag_counter += 1;
        let _ = send_cmd(&mut tls, &store_tag, &format!("STORE {uid} +FLAGS (\\Seen)"));
    }

    // Logout
    let logout_tag = format!("A{tag_counter}");
    let _ = send_cmd(&mut tls, &logout_tag, "LOGOUT");

    Ok(results)
}

// ── Tests ───────────────────────────────────────────────────────────
