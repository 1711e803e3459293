use std::time::Duration;

use chrono_tz::Tz;
use comanda_printer::{DEFAULT_PORT, FontSize, PAPER_WIDTH_80MM, PrinterDestination};
use thiserror::Error;

use crate::printing::TicketLayout;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("Either PRINTER_NAME or PRINTER_HOST must be set")]
    NoPrinter,

    #[error("Invalid {key}={value}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | DATABASE_URL | required | SQLite URL of the store |
/// | PRINTER_NAME | - | Local spooler printer (wins over host) |
/// | PRINTER_HOST | - | Raw socket printer host |
/// | PRINTER_PORT | 9100 | Raw socket printer port |
/// | PRINT_TIMEOUT_MS | 4000 | Connect + write bound per job |
/// | PAPER_WIDTH | 48 | Characters per line |
/// | FEED_LINES | 4 | Lines fed before the cut |
/// | ITEM_FONT_SIZE | large | large, tall or normal |
/// | BUSINESS_NAME | POLLERIA | Ticket header |
/// | BUSINESS_SUBTITLE | COCINA | Second header line (empty to omit) |
/// | TIMEZONE | America/Lima | Timezone of printed dates |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | API_TOKEN | - | Bearer token for operator endpoints |
/// | FEED_BUFFER | 256 | Change feed capacity |
/// | LOG_LEVEL | info | Log level |
/// | LOG_DIR | - | Daily rolling log files |
///
/// # Example
///
/// ```ignore
/// DATABASE_URL=sqlite://comanda.db PRINTER_HOST=192.168.1.50 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub printer: PrinterDestination,
    pub print_timeout: Duration,
    pub ticket: TicketLayout,
    pub http_port: u16,
    /// Operator endpoints are open when unset
    pub api_token: Option<String>,
    pub feed_buffer: usize,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let printer = match (get("PRINTER_NAME"), get("PRINTER_HOST")) {
            (Some(name), _) => PrinterDestination::Spooler { name },
            (None, Some(host)) => PrinterDestination::Network {
                host,
                port: parse_or(&get, "PRINTER_PORT", DEFAULT_PORT)?,
            },
            (None, None) => return Err(ConfigError::NoPrinter),
        };

        let print_timeout_ms: u64 = parse_or(&get, "PRINT_TIMEOUT_MS", 4000)?;
        if print_timeout_ms == 0 {
            return Err(invalid("PRINT_TIMEOUT_MS", "0", "must be positive"));
        }

        let width: usize = parse_or(&get, "PAPER_WIDTH", PAPER_WIDTH_80MM)?;
        if !(16..=96).contains(&width) {
            return Err(invalid(
                "PAPER_WIDTH",
                &width.to_string(),
                "must be between 16 and 96",
            ));
        }

        let item_size = match get("ITEM_FONT_SIZE") {
            None => FontSize::LARGE,
            Some(v) => parse_font_size(&v)
                .ok_or_else(|| invalid("ITEM_FONT_SIZE", &v, "expected large, tall or normal"))?,
        };

        let timezone = match get("TIMEZONE") {
            None => chrono_tz::America::Lima,
            Some(v) => v
                .parse::<Tz>()
                .map_err(|e| invalid("TIMEZONE", &v, &e.to_string()))?,
        };

        let defaults = TicketLayout::default();
        let ticket = TicketLayout {
            width,
            business_name: get("BUSINESS_NAME").unwrap_or(defaults.business_name),
            // Set but empty means no subtitle
            subtitle: match lookup("BUSINESS_SUBTITLE") {
                Some(v) if v.trim().is_empty() => None,
                Some(v) => Some(v),
                None => defaults.subtitle,
            },
            item_size,
            feed_lines: parse_or(&get, "FEED_LINES", defaults.feed_lines)?,
            timezone,
        };

        Ok(Self {
            database_url,
            printer,
            print_timeout: Duration::from_millis(print_timeout_ms),
            ticket,
            http_port: parse_or(&get, "HTTP_PORT", 3000)?,
            api_token: get("API_TOKEN"),
            feed_buffer: parse_or(&get, "FEED_BUFFER", 256)?,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: get("LOG_DIR"),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(key, &v, &e.to_string())),
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_font_size(value: &str) -> Option<FontSize> {
    match value.trim().to_lowercase().as_str() {
        "large" | "2x2" | "double" => Some(FontSize::LARGE),
        "tall" | "1x2" => Some(FontSize::TALL),
        "normal" | "1x1" => Some(FontSize::NORMAL),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_database_url_is_required() {
        let err = load(&[("PRINTER_HOST", "10.0.0.5")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
        let err = load(&[("DATABASE_URL", "  "), ("PRINTER_HOST", "10.0.0.5")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_printer_is_required() {
        let err = load(&[("DATABASE_URL", "sqlite::memory:")]).unwrap_err();
        assert!(matches!(err, ConfigError::NoPrinter));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("PRINTER_HOST", "10.0.0.5"),
        ])
        .unwrap();
        assert_eq!(
            config.printer,
            PrinterDestination::Network {
                host: "10.0.0.5".into(),
                port: 9100
            }
        );
        assert_eq!(config.print_timeout, Duration::from_millis(4000));
        assert_eq!(config.ticket, TicketLayout::default());
        assert_eq!(config.http_port, 3000);
        assert_eq!(config.api_token, None);
    }

    #[test]
    fn test_spooler_wins_and_overrides_apply() {
        let config = load(&[
            ("DATABASE_URL", "sqlite://comanda.db"),
            ("PRINTER_NAME", "cocina"),
            ("PRINTER_HOST", "10.0.0.5"),
            ("PAPER_WIDTH", "32"),
            ("ITEM_FONT_SIZE", "tall"),
            ("BUSINESS_SUBTITLE", ""),
            ("TIMEZONE", "Europe/Madrid"),
            ("API_TOKEN", "s3cret"),
        ])
        .unwrap();
        assert_eq!(
            config.printer,
            PrinterDestination::Spooler {
                name: "cocina".into()
            }
        );
        assert_eq!(config.ticket.width, 32);
        assert_eq!(config.ticket.item_size, FontSize::TALL);
        assert_eq!(config.ticket.subtitle, None);
        assert_eq!(config.ticket.timezone, chrono_tz::Europe::Madrid);
        assert_eq!(config.api_token.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_invalid_values() {
        let base = [("DATABASE_URL", "sqlite::memory:"), ("PRINTER_HOST", "h")];
        for (key, value) in [
            ("PRINTER_PORT", "abc"),
            ("PRINT_TIMEOUT_MS", "0"),
            ("PAPER_WIDTH", "500"),
            ("ITEM_FONT_SIZE", "huge"),
            ("TIMEZONE", "Mars/Olympus"),
        ] {
            let mut vars = base.to_vec();
            vars.push((key, value));
            assert!(
                matches!(load(&vars), Err(ConfigError::Invalid { key: k, .. }) if k == key),
                "{key}={value}"
            );
        }
    }
}
