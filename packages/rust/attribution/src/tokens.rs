//! Contact token extraction.
//!
//! Emails, UK phone numbers, and LinkedIn profile URLs are read from each
//! document's text. `mailto:`, `tel:` and profile links in the markup add
//! tokens the text does not already show; they are positioned at their
//! anchor text when it can be found, else at the end of the text.

use std::collections::HashSet;
use std::sync::LazyLock;

use execscout_shared::{ContactKind, ContactToken, Document, normalize_contact};
use regex::Regex;
use scraper::{Html, Selector};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("valid regex")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+44[ \t]?(?:\(0\)[ \t]?)?|\b0)\d{2,4}[ \t\-]?\d{3,4}[ \t\-]?\d{3,4}\b")
        .expect("valid regex")
});

static LINKEDIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(?:[a-z]{2,3}\.)?linkedin\.com/(in|pub)/([A-Za-z0-9_%\-]+)")
        .expect("valid regex")
});

static LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Every token in `documents`, ordered by document, then position, then kind.
pub fn extract_tokens(documents: &[Document]) -> Vec<ContactToken> {
    documents
        .iter()
        .enumerate()
        .flat_map(|(index, doc)| document_tokens(index, doc))
        .collect()
}

/// Tokens of one document.
pub fn document_tokens(index: usize, doc: &Document) -> Vec<ContactToken> {
    let text = &doc.text_content;
    let mut tokens = Vec::new();

    for m in EMAIL_RE.find_iter(text) {
        tokens.push(token(ContactKind::Email, m.as_str().to_lowercase(), index, m.start()));
    }
    for m in PHONE_RE.find_iter(text) {
        if plausible_phone(m.as_str()) {
            tokens.push(token(ContactKind::Phone, m.as_str().to_string(), index, m.start()));
        }
    }
    for caps in LINKEDIN_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let value = profile_url(&caps[1], &caps[2]);
        tokens.push(token(ContactKind::SocialProfile, value, index, whole.start()));
    }

    if !doc.raw_markup.is_empty() {
        let mut seen: HashSet<(ContactKind, String)> =
            tokens.iter().map(ContactToken::claim_key).collect();
        for (kind, value, anchor) in markup_links(&doc.raw_markup) {
            let key = (kind, normalize_contact(kind, &value));
            if key.1.is_empty() || !seen.insert(key) {
                continue;
            }
            let position = Some(anchor)
                .filter(|a| !a.is_empty())
                .and_then(|a| text.find(&a))
                .unwrap_or(text.len());
            tokens.push(token(kind, value, index, position));
        }
    }

    tokens.sort_by(|a, b| {
        a.document_position
            .cmp(&b.document_position)
            .then(a.kind.cmp(&b.kind))
    });
    tokens
}

fn token(kind: ContactKind, value: String, document_index: usize, document_position: usize) -> ContactToken {
    ContactToken {
        kind,
        value,
        document_index,
        document_position,
    }
}

/// UK numbers have ten or eleven digits once `+44` is folded to `0`.
fn plausible_phone(surface: &str) -> bool {
    let digits = normalize_contact(ContactKind::Phone, surface).len();
    (10..=11).contains(&digits)
}

fn profile_url(kind: &str, slug: &str) -> String {
    format!(
        "https://www.linkedin.com/{}/{}",
        kind.to_lowercase(),
        slug.to_lowercase()
    )
}

/// `(kind, value, anchor text)` for contact links in the markup.
fn markup_links(markup: &str) -> Vec<(ContactKind, String, String)> {
    let html = Html::parse_document(markup);
    let mut links = Vec::new();

    for el in html.select(&LINK_SEL) {
        let Some(href) = el.value().attr("href") else { continue };
        let href = href.trim();
        let anchor = el
            .text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ");

        if let Some(rest) = strip_scheme(href, "mailto:") {
            let address = rest.split('?').next().unwrap_or_default();
            if EMAIL_RE.is_match(address) {
                links.push((ContactKind::Email, address.to_lowercase(), anchor));
            }
        } else if let Some(rest) = strip_scheme(href, "tel:") {
            if plausible_phone(rest) {
                links.push((ContactKind::Phone, rest.to_string(), anchor));
            }
        } else if let Some(caps) = LINKEDIN_RE.captures(href) {
            links.push((ContactKind::SocialProfile, profile_url(&caps[1], &caps[2]), anchor));
        }
    }
    links
}

fn strip_scheme<'a>(href: &'a str, scheme: &str) -> Option<&'a str> {
    let head = href.get(..scheme.len())?;
    head.eq_ignore_ascii_case(scheme)
        .then(|| &href[scheme.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(tokens: &[ContactToken], kind: ContactKind) -> Vec<&str> {
        tokens
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.value.as_str())
            .collect()
    }

    #[test]
    fn finds_emails_and_uk_phones_in_text() {
        let doc = Document::new(
            "https://x.co.uk/",
            "Call: 0808 1929 786\nEmail: M.Zubair@MSHeatingAndPlumbing.co.uk.\nFounded 2009, 15 years.",
            "",
        );
        let tokens = document_tokens(0, &doc);
        assert_eq!(values(&tokens, ContactKind::Phone), vec!["0808 1929 786"]);
        assert_eq!(
            values(&tokens, ContactKind::Email),
            vec!["m.zubair@msheatingandplumbing.co.uk"]
        );
    }

    #[test]
    fn international_format_phones() {
        let doc = Document::new("https://x/", "Tel +44 (0)121 308 4455 or +44 20 8123 4567", "");
        let tokens = document_tokens(0, &doc);
        assert_eq!(
            values(&tokens, ContactKind::Phone),
            vec!["+44 (0)121 308 4455", "+44 20 8123 4567"]
        );
    }

    #[test]
    fn markup_links_add_missing_tokens_only() {
        let html = r#"<p>Email: <a href="mailto:m.zubair@msheatingandplumbing.co.uk">m.zubair@msheatingandplumbing.co.uk</a></p>
            <p><a href="tel:+441213084455">Ring the office</a></p>
            <p><a href="https://uk.linkedin.com/in/Gary-Thompson-0b1/">Gary on LinkedIn</a></p>"#;
        let doc = Document::from_html("https://x/", html);
        let tokens = document_tokens(3, &doc);

        assert_eq!(values(&tokens, ContactKind::Email).len(), 1);
        assert_eq!(values(&tokens, ContactKind::Phone), vec!["+441213084455"]);
        assert_eq!(
            values(&tokens, ContactKind::SocialProfile),
            vec!["https://www.linkedin.com/in/gary-thompson-0b1"]
        );
        let phone = tokens.iter().find(|t| t.kind == ContactKind::Phone).unwrap();
        assert_eq!(phone.document_position, doc.text_content.find("Ring").unwrap());
        assert!(tokens.iter().all(|t| t.document_index == 3));
    }

    #[test]
    fn tokens_follow_document_order() {
        let docs = vec![
            Document::new("https://x/a", "office@x.co.uk then 020 8123 4567", ""),
            Document::new("https://x/b", "gary@x.co.uk", ""),
        ];
        let tokens = extract_tokens(&docs);
        let order: Vec<(usize, ContactKind)> =
            tokens.iter().map(|t| (t.document_index, t.kind)).collect();
        assert_eq!(
            order,
            vec![(0, ContactKind::Email), (0, ContactKind::Phone), (1, ContactKind::Email)]
        );
    }
}
