//! PII redaction — reversible masking for audit, full stripping for models.
//!
//! Detection order matters: explicit credential phrases are masked first
//! so the trailing secret token is never mis-tagged by a later pattern,
//! then emails, then phone-shaped digit runs, then card-shaped runs.
//! Emails and phones get tokens embedding a short deterministic hash of
//! the original value; the hash → original mapping is returned so a
//! secured side-channel can re-identify. Cards and credentials get
//! static tokens with no map entry.
//!
//! No PII detector is perfect; false negatives are an accepted
//! limitation, not an error condition.

use std::collections::HashMap;

use regex::Regex;
use sha2::{Digest, Sha256};

/// Explicit credential phrase: keyword + delimiter ("es", ":" or "=") + token.
pub(crate) const CREDENTIAL_PATTERN: &str =
    r"(?i)\b(?:pass(?:word)?|pwd|clave|contraseña)\s*(?:es\s+|[:=]\s*)[^\s,]+";

const EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}";
const PHONE_PATTERN: &str = r"\b(?:\+?\d{1,3})?\d{7,12}\b";
const CARD_PATTERN: &str = r"\b(?:\d[ -]*?){13,19}\b";

/// Matches every redaction token this module can emit.
const TOKEN_PATTERN: &str = r"<[A-Z_]+(?::[0-9a-f]{8,16})?>";

/// Result of a redaction pass.
#[derive(Debug, Clone)]
pub struct Redaction {
    /// Text with placeholder/hash tokens — safe for audit storage.
    pub redacted_text: String,
    /// hash → original for emails and phones; cards and credentials are
    /// intentionally non-reversible.
    pub pii_map: HashMap<String, String>,
    /// Token-free, whitespace-collapsed text for model consumption.
    pub deidentified_text: String,
}

/// PII redactor with precompiled patterns.
pub struct PiiRedactor {
    credential_re: Regex,
    email_re: Regex,
    phone_re: Regex,
    card_re: Regex,
    token_re: Regex,
}

impl PiiRedactor {
    pub fn new() -> Self {
        Self {
            credential_re: Regex::new(CREDENTIAL_PATTERN).unwrap(),
            email_re: Regex::new(EMAIL_PATTERN).unwrap(),
            phone_re: Regex::new(PHONE_PATTERN).unwrap(),
            card_re: Regex::new(CARD_PATTERN).unwrap(),
            token_re: Regex::new(TOKEN_PATTERN).unwrap(),
        }
    }

    /// Redact PII and derive the model-safe deidentified form.
    pub fn redact(&self, text: &str) -> Redaction {
        let mut pii_map = HashMap::new();

        let t = self.replace_outside_tokens(text, &self.credential_re, |_| {
            "<PASSWORD_REDACTED>".to_string()
        });

        let t = self.replace_outside_tokens(&t, &self.email_re, |m| {
            let h = short_hash(m);
            let token = format!("<EMAIL_HASH:{h}>");
            pii_map.insert(h, m.to_string());
            token
        });

        let t = self.replace_outside_tokens(&t, &self.phone_re, |m| {
            let h = short_hash(m);
            let token = format!("<PHONE_HASH:{h}>");
            pii_map.insert(h, m.to_string());
            token
        });

        let redacted_text =
            self.replace_outside_tokens(&t, &self.card_re, |_| "<CARD_REDACTED>".to_string());

        // Strip every token so no hash fragment reaches a model, then
        // collapse whitespace.
        let stripped = self.token_re.replace_all(&redacted_text, "");
        let deidentified_text = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

        Redaction {
            redacted_text,
            pii_map,
            deidentified_text,
        }
    }

    /// True if the text contains an explicit credential phrase.
    pub fn contains_credential(&self, text: &str) -> bool {
        self.credential_re.is_match(text)
    }

    /// Replace matches of `re`, skipping any match that overlaps an
    /// already-emitted token span. This is what makes redaction
    /// idempotent: hash digits inside a token are never re-detected as
    /// phones or cards.
    fn replace_outside_tokens(
        &self,
        text: &str,
        re: &Regex,
        mut replacement: impl FnMut(&str) -> String,
    ) -> String {
        let token_spans: Vec<(usize, usize)> = self
            .token_re
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect();

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for m in re.find_iter(text) {
            let overlaps_token = token_spans
                .iter()
                .any(|&(s, e)| m.start() < e && m.end() > s);
            if overlaps_token {
                continue;
            }
            out.push_str(&text[last..m.start()]);
            out.push_str(&replacement(m.as_str()));
            last = m.end();
        }
        out.push_str(&text[last..]);
        out
    }
}

impl Default for PiiRedactor {
    fn default() -> Self {
        Self::new()
    }
}

/// First 16 hex chars of SHA-256 of the original value.
fn short_hash(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redactor() -> PiiRedactor {
        PiiRedactor::new()
    }

    #[test]
    fn redacts_email_with_hash_token() {
        let r = redactor().redact("Escriban a juan.perez@empresa.com por favor");
        assert!(!r.redacted_text.contains("juan.perez@empresa.com"));
        assert!(r.redacted_text.contains("<EMAIL_HASH:"));
        assert_eq!(r.pii_map.len(), 1);
        assert_eq!(
            r.pii_map.values().next().unwrap(),
            "juan.perez@empresa.com"
        );
    }

    #[test]
    fn redacted_output_has_no_email_shaped_substring() {
        let r = redactor().redact("contacto: ana+dev@mail.example.org, gracias");
        let email_re = Regex::new(EMAIL_PATTERN).unwrap();
        assert!(!email_re.is_match(&r.redacted_text));
        assert!(!r.deidentified_text.contains('@'));
    }

    #[test]
    fn hash_is_deterministic() {
        let a = redactor().redact("mail: x@y.com");
        let b = redactor().redact("mail: x@y.com");
        assert_eq!(a.redacted_text, b.redacted_text);
    }

    #[test]
    fn redacts_phone_runs() {
        let r = redactor().redact("llámenme al +573001234567 hoy");
        assert!(r.redacted_text.contains("<PHONE_HASH:"));
        assert!(!r.redacted_text.contains("3001234567"));
    }

    #[test]
    fn redacts_spaced_card_with_static_token() {
        let r = redactor().redact("mi tarjeta 4111 1111 1111 1111 no pasa");
        assert!(r.redacted_text.contains("<CARD_REDACTED>"));
        assert!(!r.redacted_text.contains("4111"));
        // Non-reversible: no map entry for cards.
        assert!(r.pii_map.is_empty());
    }

    #[test]
    fn credential_phrase_masked_before_other_patterns() {
        let r = redactor().redact("mi contraseña es Hunter2!secret y no entra");
        assert!(r.redacted_text.contains("<PASSWORD_REDACTED>"));
        assert!(!r.redacted_text.contains("Hunter2"));
        assert!(r.pii_map.is_empty());
    }

    #[test]
    fn credential_with_colon_delimiter() {
        let r = redactor().redact("password: abc123def");
        assert!(r.redacted_text.contains("<PASSWORD_REDACTED>"));
        assert!(!r.redacted_text.contains("abc123def"));
    }

    #[test]
    fn deidentified_text_has_no_tokens() {
        let r = redactor().redact(
            "Soy ana@x.com, tel 3012345678, tarjeta 4111111111111111, clave: hola123",
        );
        assert!(!r.deidentified_text.contains('<'));
        assert!(!r.deidentified_text.contains("HASH"));
        assert!(!r.deidentified_text.contains("REDACTED"));
    }

    #[test]
    fn deidentified_collapses_whitespace() {
        let r = redactor().redact("hola    ana@x.com   mundo");
        assert_eq!(r.deidentified_text, "hola mundo");
    }

    #[test]
    fn redaction_is_idempotent() {
        let first = redactor().redact("Soy ana@x.com, tel 3012345678, clave: hola123. Ayuda!");
        let second = redactor().redact(&first.redacted_text);
        assert_eq!(first.redacted_text, second.redacted_text);
        assert!(second.pii_map.is_empty());
    }

    #[test]
    fn clean_text_passes_through() {
        let r = redactor().redact("El reporte mensual no carga");
        assert_eq!(r.redacted_text, "El reporte mensual no carga");
        assert_eq!(r.deidentified_text, "El reporte mensual no carga");
        assert!(r.pii_map.is_empty());
    }

    #[test]
    fn contains_credential_detects_phrase() {
        let red = redactor();
        assert!(red.contains_credential("mi clave: secreta99"));
        assert!(!red.contains_credential("olvidé mi contraseña"));
    }
}
