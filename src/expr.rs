//! Expression evaluator for conditionals and interpolation.
//!
//! The expression language is deliberately tiny: a bare boolean key, or an
//! equality/inequality between a key and a literal. Expressions are parsed
//! once at compile time into [`Expr`]; only evaluation runs per frame.
//!
//! Evaluation is strict about missing keys and type clashes so callers can
//! decide the recovery: the renderer maps a failed conditional to "excluded"
//! and a failed interpolation to an empty string, and never lets either
//! reach the host as a panic.

use thiserror::Error;

use crate::state::StateStore;
use crate::types::Value;

// =============================================================================
// Types
// =============================================================================

/// A compiled expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Bare key read as a boolean: `debug_enabled`.
    Key(String),
    /// Equality against a literal: `cur_config_index == 1`.
    Eq { key: String, literal: Value },
    /// Inequality against a literal: `mode != 'normal'`.
    Ne { key: String, literal: Value },
}

/// Compile-time rejection of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid expression `{text}`: {reason}")]
pub struct ExprSyntaxError {
    pub text: String,
    pub reason: &'static str,
}

/// Evaluation-time failure. Recoverable by design: callers substitute a safe
/// default and keep rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("unknown state key `{0}`")]
    UnknownKey(String),
    #[error("type mismatch on `{key}`: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse an expression from a directive attribute value.
pub fn parse(text: &str) -> Result<Expr, ExprSyntaxError> {
    let fail = |reason: &'static str| ExprSyntaxError {
        text: text.to_string(),
        reason,
    };

    let mut rest = text.trim();
    if rest.is_empty() {
        return Err(fail("empty expression"));
    }

    let key = take_ident(&mut rest).ok_or_else(|| fail("expected a state key"))?;
    rest = rest.trim_start();

    if rest.is_empty() {
        return Ok(Expr::Key(key));
    }

    let negated = if let Some(tail) = rest.strip_prefix("==") {
        rest = tail;
        false
    } else if let Some(tail) = rest.strip_prefix("!=") {
        rest = tail;
        true
    } else {
        return Err(fail("expected `==` or `!=` after the key"));
    };

    rest = rest.trim_start();
    let literal = take_literal(&mut rest).ok_or_else(|| fail("expected a literal operand"))?;
    if !rest.trim().is_empty() {
        return Err(fail("trailing input after literal"));
    }

    if negated {
        Ok(Expr::Ne { key, literal })
    } else {
        Ok(Expr::Eq { key, literal })
    }
}

/// Consume a leading identifier (`[A-Za-z_][A-Za-z0-9_]*`).
fn take_ident(rest: &mut &str) -> Option<String> {
    let s = *rest;
    let mut end = 0;
    for (i, c) in s.char_indices() {
        let ok = if i == 0 {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_'
        };
        if !ok {
            break;
        }
        end = i + c.len_utf8();
    }
    if end == 0 {
        return None;
    }
    *rest = &s[end..];
    Some(s[..end].to_string())
}

/// Consume a leading literal: number, single-quoted string, `true`/`false`.
fn take_literal(rest: &mut &str) -> Option<Value> {
    let s = *rest;

    if let Some(tail) = s.strip_prefix('\'') {
        let close = tail.find('\'')?;
        *rest = &tail[close + 1..];
        return Some(Value::Str(tail[..close].to_string()));
    }

    if let Some(tail) = s.strip_prefix("true") {
        if !starts_with_ident_char(tail) {
            *rest = tail;
            return Some(Value::Bool(true));
        }
    }
    if let Some(tail) = s.strip_prefix("false") {
        if !starts_with_ident_char(tail) {
            *rest = tail;
            return Some(Value::Bool(false));
        }
    }

    // Number: optional sign, digits, optional fraction
    let mut end = 0;
    let bytes = s.as_bytes();
    if end < bytes.len() && (bytes[end] == b'-' || bytes[end] == b'+') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end > digits_start && end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end == digits_start {
        return None;
    }
    let parsed: f64 = s[..end].parse().ok()?;
    *rest = &s[end..];
    Some(Value::Number(parsed))
}

fn starts_with_ident_char(s: &str) -> bool {
    s.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
}

// =============================================================================
// Evaluation
// =============================================================================

impl Expr {
    /// Evaluate against the current store snapshot. Read-only.
    pub fn eval_bool(&self, store: &StateStore) -> Result<bool, EvalError> {
        match self {
            Expr::Key(key) => match store.get(key) {
                None => Err(EvalError::UnknownKey(key.clone())),
                Some(Value::Bool(b)) => Ok(*b),
                Some(other) => Err(EvalError::TypeMismatch {
                    key: key.clone(),
                    expected: "boolean",
                    found: other.type_name(),
                }),
            },
            Expr::Eq { key, literal } => compare(store, key, literal),
            Expr::Ne { key, literal } => compare(store, key, literal).map(|eq| !eq),
        }
    }
}

fn compare(store: &StateStore, key: &str, literal: &Value) -> Result<bool, EvalError> {
    let value = store
        .get(key)
        .ok_or_else(|| EvalError::UnknownKey(key.to_string()))?;
    match (value, literal) {
        (Value::Number(a), Value::Number(b)) => Ok(a == b),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (Value::Str(a), Value::Str(b)) => Ok(a == b),
        _ => Err(EvalError::TypeMismatch {
            key: key.to_string(),
            expected: literal.type_name(),
            found: value.type_name(),
        }),
    }
}

/// Resolve an interpolation key to its display text.
pub fn display(store: &StateStore, key: &str) -> Result<String, EvalError> {
    store
        .get(key)
        .map(|v| v.to_string())
        .ok_or_else(|| EvalError::UnknownKey(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_key() {
        assert_eq!(parse("debug_enabled"), Ok(Expr::Key("debug_enabled".into())));
        assert_eq!(parse("  lhb  "), Ok(Expr::Key("lhb".into())));
    }

    #[test]
    fn test_parse_equality_with_number() {
        assert_eq!(
            parse("cur_config_index == 1"),
            Ok(Expr::Eq {
                key: "cur_config_index".into(),
                literal: Value::Number(1.0),
            })
        );
    }

    #[test]
    fn test_parse_inequality_with_string() {
        assert_eq!(
            parse("mode != 'normal'"),
            Ok(Expr::Ne {
                key: "mode".into(),
                literal: Value::Str("normal".into()),
            })
        );
    }

    #[test]
    fn test_parse_boolean_literal() {
        assert_eq!(
            parse("lhb == true"),
            Ok(Expr::Eq {
                key: "lhb".into(),
                literal: Value::Bool(true),
            })
        );
    }

    #[test]
    fn test_parse_negative_number() {
        assert_eq!(
            parse("offset == -2.5"),
            Ok(Expr::Eq {
                key: "offset".into(),
                literal: Value::Number(-2.5),
            })
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse("").is_err());
        assert!(parse("== 1").is_err());
        assert!(parse("key ==").is_err());
        assert!(parse("key = 1").is_err());
        assert!(parse("key == 1 extra").is_err());
        assert!(parse("key == 'unterminated").is_err());
        assert!(parse("1 == key").is_err());
    }

    #[test]
    fn test_eval_bare_key() {
        let mut store = StateStore::new();
        store.set("on", true);
        assert_eq!(Expr::Key("on".into()).eval_bool(&store), Ok(true));
    }

    #[test]
    fn test_eval_unknown_key() {
        let store = StateStore::new();
        assert_eq!(
            Expr::Key("missing".into()).eval_bool(&store),
            Err(EvalError::UnknownKey("missing".into()))
        );
    }

    #[test]
    fn test_eval_type_mismatch() {
        let mut store = StateStore::new();
        store.set("count", 3.0);
        let err = parse("count == 'three'").unwrap().eval_bool(&store);
        assert_eq!(
            err,
            Err(EvalError::TypeMismatch {
                key: "count".into(),
                expected: "string",
                found: "number",
            })
        );
    }

    #[test]
    fn test_eval_equality_and_inequality() {
        let mut store = StateStore::new();
        store.set("cur_config_index", 1.0);
        assert_eq!(parse("cur_config_index == 1").unwrap().eval_bool(&store), Ok(true));
        assert_eq!(parse("cur_config_index == 0").unwrap().eval_bool(&store), Ok(false));
        assert_eq!(parse("cur_config_index != 0").unwrap().eval_bool(&store), Ok(true));
    }

    #[test]
    fn test_display_formats_numbers_like_labels() {
        let mut store = StateStore::new();
        store.set("bgm_volume", 40.0);
        assert_eq!(display(&store, "bgm_volume"), Ok("40".to_string()));
        assert_eq!(
            display(&store, "missing"),
            Err(EvalError::UnknownKey("missing".into()))
        );
    }
}
