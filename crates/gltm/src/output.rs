use std::io::{self, Write};

use colored::Colorize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;
use crate::model::Token;

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// `id name created_at expires_at revoked scopes`. Never contains a secret.
pub fn format_record(token: &Token) -> String {
    format!(
        "{} {} {} {} {} {}",
        token.id,
        token.name,
        token.created_at.as_deref().unwrap_or("-"),
        token
            .expires_at
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string()),
        token.revoked,
        join_scopes(token),
    )
}

pub fn write_records<'a>(
    out: &mut dyn Write,
    tokens: impl IntoIterator<Item = &'a Token>,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => {
            for token in tokens {
                writeln!(out, "{}", format_record(token))?;
            }
        }
        OutputFormat::Json => {
            for token in tokens {
                let line = serde_json::to_string(token).map_err(io::Error::other)?;
                writeln!(out, "{line}")?;
            }
        }
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["ID", "Name", "Created", "Expires", "Revoked", "Scopes"]);
            for token in tokens {
                builder.push_record([
                    token.id.to_string(),
                    token.name.clone(),
                    token.created_at.clone().unwrap_or_else(|| "-".to_string()),
                    token
                        .expires_at
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    token.revoked.to_string(),
                    join_scopes(token),
                ]);
            }
            let table = builder.build().with(Style::rounded()).to_string();
            writeln!(out, "{table}")?;
        }
    }
    out.flush()
}

fn join_scopes(token: &Token) -> String {
    if token.scopes.is_empty() {
        return "-".to_string();
    }
    token
        .scopes
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_scopes;

    fn token() -> Token {
        Token {
            id: 42,
            name: "ci-bot".into(),
            created_at: Some("2026-10-19T08:00:00.000Z".into()),
            expires_at: Some("2026-11-19".parse().unwrap()),
            revoked: false,
            active: true,
            scopes: parse_scopes("read_repository api"),
            user_id: Some(7),
        }
    }

    #[test]
    fn record_fields_are_in_fixed_order() {
        assert_eq!(
            format_record(&token()),
            "42 ci-bot 2026-10-19T08:00:00.000Z 2026-11-19 false api,read_repository"
        );
    }

    #[test]
    fn missing_expiry_is_a_dash() {
        let mut token = token();
        token.expires_at = None;
        assert!(format_record(&token).contains(" - false "));
    }

    #[test]
    fn missing_created_at_is_a_dash() {
        let mut token = token();
        token.created_at = None;
        assert!(format_record(&token).starts_with("42 ci-bot - 2026-11-19 "));
    }

    #[test]
    fn json_records_are_one_per_line() {
        let mut out = Vec::new();
        let tokens = [token(), token()];
        write_records(&mut out, &tokens, OutputFormat::Json).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first["name"], "ci-bot");
        assert!(first.get("token").is_none());
    }

    #[test]
    fn table_has_header_and_rows() {
        let mut out = Vec::new();
        write_records(&mut out, [&token()], OutputFormat::Table).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Scopes"));
        assert!(text.contains("api,read_repository"));
    }
}
