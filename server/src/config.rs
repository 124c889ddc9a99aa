//! Environment-driven application configuration.

use anyhow::{Context, bail};

/// Default VAPID contact when none is configured.
const DEFAULT_CONTACT: &str = "mailto:hi@6040.work";

/// Runtime configuration populated from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    /// Base64url VAPID public key; safe to expose to clients.
    pub vapid_public_key: String,
    /// Base64url VAPID private key; server-only secret.
    pub vapid_private_key: String,
    /// Contact URI carried in the VAPID token (`mailto:` or `https:`).
    pub vapid_contact: String,
    /// Validate and encrypt pushes but log instead of delivering.
    pub dry_run_mode: bool,
    /// Product decision surfaced as configuration, never inferred from
    /// platform sniffing. Read by the demo status surface only.
    pub push_mobile_only: bool,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Missing or unusable VAPID keys fail here, at startup, rather than
    /// silently disabling push.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::load(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary lookup (env in production,
    /// a map in tests).
    pub fn load(g: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let vapid_public_key = g("PUSH_PUBLIC_KEY")
            .filter(|v| !v.is_empty())
            .context("PUSH_PUBLIC_KEY is required (base64url VAPID public key)")?;
        let vapid_private_key = g("PUSH_PRIVATE_KEY")
            .filter(|v| !v.is_empty())
            .context("PUSH_PRIVATE_KEY is required (base64url VAPID private key)")?;

        if let Err(e) = webpush::VapidKeys::from_base64(&vapid_private_key, &vapid_public_key) {
            bail!("invalid VAPID key pair: {e}");
        }

        let vapid_contact = g("PUSH_CONTACT")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTACT.into());
        if !vapid_contact.starts_with("mailto:") && !vapid_contact.starts_with("https://") {
            bail!("PUSH_CONTACT must be a mailto: or https: URI");
        }

        Ok(Self {
            server_port: parse_u16(g("SERVER_PORT").as_deref(), 8080),
            dry_run_mode: parse_bool(g("DRY_RUN_MODE").as_deref(), false),
            push_mobile_only: parse_bool(g("PUSH_MOBILE_ONLY").as_deref(), false),
            vapid_public_key,
            vapid_private_key,
            vapid_contact,
        })
    }
}

fn parse_u16(value: Option<&str>, default: u16) -> u16 {
    match value {
        Some(v) if !v.is_empty() => v.parse().unwrap_or(default),
        _ => default,
    }
}

fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value {
        Some(v) if !v.is_empty() => v == "true",
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, String> {
        let keys = webpush::VapidKeys::generate();
        HashMap::from([
            ("PUSH_PUBLIC_KEY", keys.public_key_b64().to_string()),
            ("PUSH_PRIVATE_KEY", keys.private_key_b64()),
        ])
    }

    fn load(vars: &HashMap<&'static str, String>) -> Result<AppConfig, anyhow::Error> {
        AppConfig::load(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&base_vars()).unwrap();
        assert_eq!(config.server_port, 8080);
        assert!(!config.dry_run_mode);
        assert!(!config.push_mobile_only);
        assert_eq!(config.vapid_contact, DEFAULT_CONTACT);
    }

    #[test]
    fn missing_keys_fail_fast() {
        let mut vars = base_vars();
        vars.remove("PUSH_PRIVATE_KEY");
        assert!(load(&vars).is_err());

        let mut vars = base_vars();
        vars.insert("PUSH_PUBLIC_KEY", String::new());
        assert!(load(&vars).is_err());
    }

    #[test]
    fn mismatched_key_pair_fails_fast() {
        let mut vars = base_vars();
        let other = webpush::VapidKeys::generate();
        vars.insert("PUSH_PUBLIC_KEY", other.public_key_b64().to_string());
        assert!(load(&vars).is_err());
    }

    #[test]
    fn flags_and_port_parse() {
        let mut vars = base_vars();
        vars.insert("SERVER_PORT", "9090".into());
        vars.insert("DRY_RUN_MODE", "true".into());
        vars.insert("PUSH_MOBILE_ONLY", "true".into());

        let config = load(&vars).unwrap();
        assert_eq!(config.server_port, 9090);
        assert!(config.dry_run_mode);
        assert!(config.push_mobile_only);
    }

    #[test]
    fn contact_scheme_is_validated() {
        let mut vars = base_vars();
        vars.insert("PUSH_CONTACT", "hi@6040.work".into());
        assert!(load(&vars).is_err());

        vars.insert("PUSH_CONTACT", "https://6040.work/contact".into());
        assert!(load(&vars).is_ok());
    }
}
