//! Internationalization (i18n) support
//!
//! UI labels and month names are embedded per locale as YAML tables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const PT_BR: &str = include_str!("pt-BR.yml");
const EN: &str = include_str!("en.yml");

/// Supported display locales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    PtBr,
    En,
}

impl Locale {
    /// BCP 47 tag, as used in `<html lang>`
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::PtBr => "pt-BR",
            Locale::En => "en",
        }
    }

    /// Load the string table for this locale
    pub fn strings(&self) -> Result<Strings> {
        let raw = match self {
            Locale::PtBr => PT_BR,
            Locale::En => EN,
        };
        let strings: Strings = serde_yaml::from_str(raw)
            .with_context(|| format!("Invalid string table for {}", self.tag()))?;

        if strings.months.len() != 12 {
            anyhow::bail!(
                "String table for {} has {} month names, expected 12",
                self.tag(),
                strings.months.len()
            );
        }

        Ok(strings)
    }
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Ok(Locale::PtBr),
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            other => anyhow::bail!("Unsupported language: {}. Available: pt-BR, en", other),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Translated labels for one locale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strings {
    pub load_more: String,
    pub loading: String,
    /// `%d` is replaced with the number of minutes
    pub reading_time: String,
    pub not_found: String,
    pub back_home: String,
    pub unavailable: String,
    /// Abbreviated month names, January first
    pub months: Vec<String>,
}

impl Strings {
    /// Abbreviated name of a month, 1-based
    pub fn month_abbr(&self, month: u32) -> &str {
        month
            .checked_sub(1)
            .and_then(|i| self.months.get(i as usize))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Reading time label, e.g. "4 min"
    pub fn reading_time(&self, minutes: u32) -> String {
        self.reading_time.replace("%d", &minutes.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_parse() {
        for locale in [Locale::PtBr, Locale::En] {
            let strings = locale.strings().unwrap();
            assert_eq!(strings.months.len(), 12);
        }
    }

    #[test]
    fn test_pt_br_labels() {
        let strings = Locale::PtBr.strings().unwrap();
        assert_eq!(strings.load_more, "Carregar mais posts");
        assert_eq!(strings.loading, "Carregando...");
        assert_eq!(strings.month_abbr(3), "Mar");
        assert_eq!(strings.month_abbr(12), "Dez");
        assert_eq!(strings.reading_time(4), "4 min");
    }

    #[test]
    fn test_month_out_of_range() {
        let strings = Locale::En.strings().unwrap();
        assert_eq!(strings.month_abbr(0), "");
        assert_eq!(strings.month_abbr(13), "");
    }

    #[test]
    fn test_parse_locale() {
        assert_eq!("pt-BR".parse::<Locale>().unwrap(), Locale::PtBr);
        assert_eq!("pt_br".parse::<Locale>().unwrap(), Locale::PtBr);
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
        assert!("fr".parse::<Locale>().is_err());
    }
}
