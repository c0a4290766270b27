//! Safe SQL identifier handling.
//!
//! Table and column names reach this crate as plain strings and end up
//! interpolated into statement text, so every one of them passes through
//! [`Ident`] first:
//!
//! - Unquoted parts must match `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted parts allow any characters except NUL and escape `"` as `""`
//!
//! Table names may be schema-qualified (`public.users`). Column names coming
//! back from the catalog are rendered verbatim when they are plain
//! identifiers and double-quoted otherwise.

use crate::error::{DynError, DynResult};

/// A validated SQL identifier (table, schema-qualified table, or column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Plain(String),
    Quoted(String),
}

fn is_plain(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
}

// Unquoted identifiers fold to lowercase in Postgres, so a catalog name can
// only be rendered bare if it is already lowercase.
fn folds_to_self(s: &str) -> bool {
    is_plain(s) && !s.chars().any(|c| c.is_ascii_uppercase())
}

impl Ident {
    /// Parse a user-supplied identifier, accepting dotted and quoted forms
    /// (`users`, `public.users`, `"Mixed Case"."users"`).
    pub fn parse(s: &str) -> DynResult<Self> {
        if s.is_empty() {
            return Err(DynError::ident("identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(DynError::ident("identifier cannot contain NUL"));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            if !parts.is_empty() {
                match chars.next() {
                    Some('.') if chars.peek().is_some() => {}
                    Some('.') => return Err(DynError::ident("trailing '.' in identifier")),
                    Some(c) => {
                        return Err(DynError::ident(format!(
                            "expected '.' between identifier parts, got '{c}'"
                        )));
                    }
                    None => break,
                }
            }

            if chars.peek() == Some(&'"') {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            name.push('"');
                        }
                        Some('"') => break,
                        Some(c) => name.push(c),
                        None => return Err(DynError::ident("unclosed quoted identifier")),
                    }
                }
                if name.is_empty() {
                    return Err(DynError::ident("empty quoted identifier"));
                }
                parts.push(Part::Quoted(name));
            } else {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '.' {
                        break;
                    }
                    name.push(c);
                    chars.next();
                }
                if !is_plain(&name) {
                    return Err(DynError::ident(format!("invalid identifier segment '{name}'")));
                }
                parts.push(Part::Plain(name));
            }
        }

        Ok(Self { parts })
    }

    /// Wrap a catalog-sourced column name.
    ///
    /// Names that are already plain identifiers render as-is; anything else
    /// (mixed case, spaces) renders double-quoted. Never fails for non-empty,
    /// NUL-free input, which is what the catalog produces.
    pub fn column(name: &str) -> DynResult<Self> {
        if name.is_empty() || name.contains('\0') {
            return Err(DynError::ident(format!("invalid column name {name:?}")));
        }
        let part = if folds_to_self(name) {
            Part::Plain(name.to_string())
        } else {
            Part::Quoted(name.to_string())
        };
        Ok(Self { parts: vec![part] })
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                Part::Plain(s) => out.push_str(s),
                Part::Quoted(s) => {
                    out.push('"');
                    for ch in s.chars() {
                        if ch == '"' {
                            out.push_str("\"\"");
                        } else {
                            out.push(ch);
                        }
                    }
                    out.push('"');
                }
            }
        }
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        assert_eq!(Ident::parse("users").unwrap().to_sql(), "users");
    }

    #[test]
    fn parse_schema_qualified() {
        assert_eq!(Ident::parse("public.users").unwrap().to_sql(), "public.users");
    }

    #[test]
    fn parse_quoted() {
        let ident = Ident::parse(r#""Order Items""#).unwrap();
        assert_eq!(ident.to_sql(), r#""Order Items""#);
    }

    #[test]
    fn parse_quoted_escapes_inner_quote() {
        let ident = Ident::parse(r#""has""quote""#).unwrap();
        assert_eq!(ident.to_sql(), r#""has""quote""#);
    }

    #[test]
    fn parse_rejects_injection_payloads() {
        assert!(Ident::parse("users; DROP TABLE users").is_err());
        assert!(Ident::parse("users--").is_err());
        assert!(Ident::parse("users WHERE 1=1").is_err());
    }

    #[test]
    fn parse_rejects_empty_and_malformed() {
        assert!(Ident::parse("").is_err());
        assert!(Ident::parse("1users").is_err());
        assert!(Ident::parse("public..users").is_err());
        assert!(Ident::parse("public.").is_err());
        assert!(Ident::parse(r#""unclosed"#).is_err());
    }

    #[test]
    fn column_quotes_only_when_needed() {
        assert_eq!(Ident::column("username").unwrap().to_sql(), "username");
        assert_eq!(Ident::column("full name").unwrap().to_sql(), r#""full name""#);
        assert_eq!(Ident::column("CamelCase").unwrap().to_sql(), r#""CamelCase""#);
    }

    #[test]
    fn column_rejects_empty() {
        assert!(Ident::column("").is_err());
    }
}
