//! Maven `settings.xml` editing
//!
//! Only the handful of elements we touch are rewritten; everything else in
//! the stored settings is carried over byte for byte.

use crate::infrastructure::credentials::ResolvedProxy;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use thiserror::Error;

/// Settings used when no maven identity provides its own
pub const EMPTY_SETTINGS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<settings xmlns="http://maven.apache.org/SETTINGS/1.0.0"
          xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
          xsi:schemaLocation="http://maven.apache.org/SETTINGS/1.0.0 https://maven.apache.org/xsd/settings-1.0.0.xsd">
</settings>
"#;

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static SETTINGS_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<settings(?:\s[^>]*)?>").expect("valid regex"));
static SETTINGS_SELF_CLOSING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<settings(\s[^>]*?)?\s*/>").expect("valid regex"));
static PROXIES_EMPTY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<proxies\s*/>").expect("valid regex"));
static LOCAL_REPOSITORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<localRepository\s*/>|<localRepository>.*?</localRepository>")
        .expect("valid regex")
});

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("settings.xml has no <settings> root element")]
    MissingRoot,
}

/// A Maven settings document being prepared for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenSettings {
    xml: String,
}

impl MavenSettings {
    pub fn parse(xml: &str) -> Result<Self, SettingsError> {
        let masked = mask_comments(xml);
        if let Some(captures) = SETTINGS_SELF_CLOSING.captures(&masked) {
            let root = captures.get(0).map(|m| m.range()).unwrap_or_default();
            let attributes = captures.get(1).map_or("", |m| &xml[m.range()]);
            let mut xml = xml.to_string();
            xml.replace_range(root, &format!("<settings{}></settings>", attributes));
            return Ok(Self { xml });
        }
        if !SETTINGS_OPEN.is_match(&masked) || !masked.contains("</settings>") {
            return Err(SettingsError::MissingRoot);
        }
        Ok(Self {
            xml: xml.to_string(),
        })
    }

    pub fn empty() -> Self {
        Self {
            xml: EMPTY_SETTINGS.to_string(),
        }
    }

    /// Append one `<proxy>` per entry to the proxy list, creating the list
    /// when the settings have none.
    pub fn inject_proxies(&mut self, proxies: &[ResolvedProxy]) {
        if proxies.is_empty() {
            return;
        }
        let entries: String = proxies.iter().map(proxy_element).collect();

        let masked = mask_comments(&self.xml);
        if let Some(at) = masked.find("</proxies>") {
            self.xml.insert_str(at, &entries);
        } else if let Some(empty) = PROXIES_EMPTY.find(&masked) {
            let list = format!("<proxies>\n{}  </proxies>", entries);
            self.xml.replace_range(empty.range(), &list);
        } else {
            self.insert_before_close(&format!("  <proxies>\n{}  </proxies>\n", entries));
        }
    }

    /// Set `<localRepository>`, replacing any existing value
    pub fn set_local_repository(&mut self, path: &Path) {
        let element = format!(
            "<localRepository>{}</localRepository>",
            escape(&path.display().to_string())
        );
        let masked = mask_comments(&self.xml);
        if let Some(existing) = LOCAL_REPOSITORY.find(&masked) {
            self.xml.replace_range(existing.range(), &element);
        } else {
            self.insert_before_close(&format!("  {}\n", element));
        }
    }

    pub fn as_str(&self) -> &str {
        &self.xml
    }

    pub fn into_string(self) -> String {
        self.xml
    }

    fn insert_before_close(&mut self, text: &str) {
        // parse() guarantees a closing tag.
        if let Some(at) = mask_comments(&self.xml).rfind("</settings>") {
            self.xml.insert_str(at, text);
        }
    }
}

/// Blank out comment bodies, keeping byte offsets aligned with `xml`
fn mask_comments(xml: &str) -> String {
    let mut masked = xml.as_bytes().to_vec();
    for comment in COMMENT.find_iter(xml) {
        masked[comment.range()].fill(b' ');
    }
    String::from_utf8_lossy(&masked).into_owned()
}

fn proxy_element(proxy: &ResolvedProxy) -> String {
    let mut element = String::from("    <proxy>\n");
    element.push_str(&format!("      <id>{}</id>\n", proxy.kind));
    element.push_str("      <active>true</active>\n");
    element.push_str(&format!("      <protocol>{}</protocol>\n", proxy.kind));
    element.push_str(&format!("      <host>{}</host>\n", escape(&proxy.host)));
    element.push_str(&format!("      <port>{}</port>\n", proxy.port));
    if let Some(auth) = &proxy.auth {
        element.push_str(&format!("      <username>{}</username>\n", escape(&auth.user)));
        element.push_str(&format!("      <password>{}</password>\n", escape(&auth.password)));
    }
    if !proxy.excluded.is_empty() {
        element.push_str(&format!(
            "      <nonProxyHosts>{}</nonProxyHosts>\n",
            escape(&proxy.excluded.join("|"))
        ));
    }
    element.push_str("    </proxy>\n");
    element
}

pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
