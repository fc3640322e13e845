//! Payload formatting.
//!
//! Each record type maps to the exact text handed to the QR encoder. An empty string means
//! there is nothing to encode yet; callers skip rendering and clear any previous output.
//!
//! Wi-Fi and vCard fields are emitted verbatim. Reserved characters (`;`, `:`, `,`, `\`)
//! are not escaped, so an SSID such as `a;b` produces a payload most scanners will split.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

// Payload kind
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum PayloadKind {
    Website,
    WiFi,
    Contact,
}

impl PayloadKind {
    /// Lowercase token used in export filenames.
    pub fn token(self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::WiFi => "wifi",
            Self::Contact => "contact",
        }
    }
}

impl Display for PayloadKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

// Wi-Fi security
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub enum WiFiSecurity {
    #[default]
    Wpa,
    Wep,
    NoPassword,
}

impl WiFiSecurity {
    pub fn token(self) -> &'static str {
        match self {
            Self::Wpa => "WPA",
            Self::Wep => "WEP",
            Self::NoPassword => "nopass",
        }
    }
}

impl FromStr for WiFiSecurity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wpa" | "wpa2" | "wpa3" => Ok(Self::Wpa),
            "wep" => Ok(Self::Wep),
            "nopass" | "none" | "open" => Ok(Self::NoPassword),
            _ => Err(format!("unknown Wi-Fi security {s:?}, expected WPA, WEP or nopass")),
        }
    }
}

// Records
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebsitePayload {
    pub url: String,
}

impl Default for WebsitePayload {
    fn default() -> Self {
        Self { url: "creativeclub.dev".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WiFiPayload {
    pub ssid: String,
    pub password: String,
    pub security: WiFiSecurity,
    /// Shown above the code and drawn into the PNG export. Never encoded.
    pub caption: String,
}

impl Default for WiFiPayload {
    fn default() -> Self {
        Self {
            ssid: "MyWiFiNetwork".to_string(),
            password: "password123".to_string(),
            security: WiFiSecurity::Wpa,
            caption: "Scan to connect to Wi-Fi".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPayload {
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl Default for ContactPayload {
    fn default() -> Self {
        Self {
            name: "John Doe".to_string(),
            phone: "+1 234 567 8900".to_string(),
            email: "john@example.com".to_string(),
        }
    }
}

/// The record currently being edited. Only one kind is live at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivePayload {
    Website(WebsitePayload),
    WiFi(WiFiPayload),
    Contact(ContactPayload),
}

impl Default for ActivePayload {
    fn default() -> Self {
        Self::Website(WebsitePayload::default())
    }
}

impl ActivePayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Website(_) => PayloadKind::Website,
            Self::WiFi(_) => PayloadKind::WiFi,
            Self::Contact(_) => PayloadKind::Contact,
        }
    }

    /// Text to encode, or an empty string when there is nothing to render.
    pub fn encode(&self) -> String {
        match self {
            Self::Website(w) => format_website(&w.url),
            Self::WiFi(w) => format_wifi(&w.ssid, &w.password, w.security),
            Self::Contact(c) => format_contact(&c.name, &c.phone, &c.email),
        }
    }

    /// Caption drawn above the code on export. Only Wi-Fi payloads carry one.
    pub fn caption(&self) -> Option<&str> {
        match self {
            Self::WiFi(w) if !w.caption.is_empty() => Some(&w.caption),
            _ => None,
        }
    }
}

// Formatters
//------------------------------------------------------------------------------

pub fn format_website(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

pub fn format_wifi(ssid: &str, password: &str, security: WiFiSecurity) -> String {
    if ssid.is_empty() {
        return String::new();
    }
    // Hidden flag is always set
    format!("WIFI:T:{};S:{ssid};P:{password};H:true;;", security.token())
}

pub fn format_contact(name: &str, phone: &str, email: &str) -> String {
    if name.is_empty() && phone.is_empty() && email.is_empty() {
        return String::new();
    }

    let mut lines = vec!["BEGIN:VCARD".to_string(), "VERSION:3.0".to_string()];
    for (tag, value) in [("FN", name), ("TEL", phone), ("EMAIL", email)] {
        if !value.is_empty() {
            lines.push(format!("{tag}:{value}"));
        }
    }
    lines.push("END:VCARD".to_string());
    lines.join("\n")
}
