//! RFC 822 ingestion via mail-parser.

use chrono::{DateTime, Utc};
use mail_parser::{MessageParser, MessagePart, MimeHeaders};
use uuid::Uuid;

use super::{Email, Mailbox};
use crate::error::EmailError;

pub(super) fn parse_rfc822(raw: &[u8]) -> Result<Email, EmailError> {
    let parsed = MessageParser::default()
        .parse(raw)
        .ok_or_else(|| EmailError::Parse("not an RFC 822 message".into()))?;

    let id = parsed
        .message_id()
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("gen-{}", Uuid::new_v4()));
    let subject = parsed.subject().unwrap_or_default().to_string();

    let body = first_plain_text(&parsed);
    let full_body = (0..)
        .map_while(|i| parsed.body_text(i))
        .collect::<Vec<_>>()
        .join("\n");
    let html = parsed.body_html(0).map(|h| h.into_owned());

    let date = parsed
        .date()
        .and_then(|d| DateTime::<Utc>::from_timestamp(d.to_timestamp(), 0));

    let mut email = Email::new(id, subject, body, full_body);
    email.html = html;
    email.from = mailboxes(parsed.from());
    email.to = mailboxes(parsed.to());
    email.date = date;
    Ok(email)
}

/// First genuine text/plain body part. HTML-only messages yield an empty body
/// so the triage path falls back to `full_body`.
fn first_plain_text(parsed: &mail_parser::Message) -> String {
    parsed
        .text_bodies()
        .find(|part| !is_html(part))
        .and_then(|part| part.text_contents())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

fn is_html(part: &MessagePart) -> bool {
    MimeHeaders::content_type(part).is_some_and(|ct| {
        ct.ctype().eq_ignore_ascii_case("text")
            && ct.subtype().is_some_and(|s| s.eq_ignore_ascii_case("html"))
    })
}

fn mailboxes(address: Option<&mail_parser::Address>) -> Vec<Mailbox> {
    let Some(address) = address else {
        return Vec::new();
    };
    address
        .iter()
        .filter_map(|addr| {
            let mailbox = Mailbox::new(addr.address()?);
            Some(match addr.name() {
                Some(name) if !name.is_empty() => mailbox.with_name(name),
                _ => mailbox,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: &str = "From: Alice Smith <alice@example.com>\r\n\
To: Bob <bob@example.com>\r\n\
Subject: Invoice for March\r\n\
Message-ID: <inv-42@example.com>\r\n\
Date: Tue, 04 Mar 2025 10:15:00 +0000\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Could you confirm receipt of the attached invoice?\r\n";

    const HTML_ONLY: &str = "From: news@shop.example\r\n\
Subject: Sale\r\n\
Content-Type: text/html; charset=utf-8\r\n\
\r\n\
<html><body><p>Big <b>sale</b> today</p></body></html>\r\n";

    #[test]
    fn parses_plain_text_message() {
        let email = parse_rfc822(PLAIN.as_bytes()).unwrap();
        assert_eq!(email.id, "inv-42@example.com");
        assert_eq!(email.subject, "Invoice for March");
        assert!(email.body.contains("confirm receipt"));
        assert!(email.full_body.contains("confirm receipt"));
        assert_eq!(email.sender(), Some("alice@example.com"));
        assert_eq!(email.from[0].name.as_deref(), Some("Alice Smith"));
        assert_eq!(email.to[0].address, "bob@example.com");
        assert!(email.date.is_some());
        assert!(!email.processed);
    }

    #[test]
    fn html_only_message_has_empty_body() {
        let mut email = parse_rfc822(HTML_ONLY.as_bytes()).unwrap();
        assert!(email.body.is_empty());
        assert!(email.html.is_some());
        assert!(email.full_body.contains("sale"));
        assert!(email.id.starts_with("gen-"));
        // The triage path reads full_body
        assert!(email.resolve_body().contains("sale"));
    }
}
