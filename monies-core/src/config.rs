//! Parser configuration passed explicitly into every decoder.

use chrono_tz::Tz;
use rust_decimal::Decimal;

use crate::error::{ParseError, Result};

/// Home zone of the supported statements.
pub const DEFAULT_ZONE: Tz = chrono_tz::Europe::Helsinki;

/// Left edge (PDF user space units) of the transaction columns on the
/// card bill. Measured from the issuer's current template; a template change
/// shows up as a reconciliation failure, not as silently wrong rows.
///
/// The bill's font encoding is the other template dependency: single-byte
/// text is read as UTF-8 falling back to Latin-1, which matches the
/// WinAnsi Courier font in use. Font `/Encoding` differences and ToUnicode
/// maps are not consulted.
pub const DEFAULT_MARGIN_X: f32 = 44.4;

#[derive(Debug, Clone, PartialEq)]
pub struct ParserConfig {
    /// Zone in which statement dates are anchored at local midnight.
    pub zone: Tz,
    /// x coordinate a PDF line must start at to be treated as a data line.
    pub margin_x: f32,
    /// Largest accepted difference between the itemized sum and the stated total.
    pub tolerance: Decimal,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            zone: DEFAULT_ZONE,
            margin_x: DEFAULT_MARGIN_X,
            // Anything a cent or more off is a misparse.
            tolerance: Decimal::new(9, 3),
        }
    }
}

impl ParserConfig {
    /// Build a config from an IANA zone name like "Europe/Helsinki".
    pub fn with_zone_name(mut self, zone: &str) -> Result<Self> {
        self.zone = zone
            .parse()
            .map_err(|_| ParseError::Format(format!("invalid timezone: {zone}")))?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ParserConfig::default();
        assert_eq!(cfg.zone, chrono_tz::Europe::Helsinki);
        assert_eq!(cfg.margin_x, 44.4);
        assert_eq!(cfg.tolerance.to_string(), "0.009");
    }

    #[test]
    fn test_zone_name() {
        let cfg = ParserConfig::default().with_zone_name("Europe/Stockholm").unwrap();
        assert_eq!(cfg.zone, chrono_tz::Europe::Stockholm);
        assert!(ParserConfig::default().with_zone_name("Mars/Olympus").is_err());
    }
}
