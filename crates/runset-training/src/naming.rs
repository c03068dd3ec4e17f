//! Run directory names derived from run specs.
//!
//! Only values nested under a top-level mapping contribute tokens. Top-level
//! scalars (epoch counts and the like) are shared settings and must not make
//! two runs look different.

use crate::job::RunSpec;
use serde_json::Value;

pub fn run_name_tokens(spec: &RunSpec) -> Vec<String> {
    let mut tokens = Vec::new();
    for value in spec.0.values() {
        let Value::Object(section) = value else {
            continue;
        };
        for field in section.values() {
            match field {
                Value::Object(leaves) => tokens.extend(
                    leaves.values().filter(|leaf| !leaf.is_null()).map(token),
                ),
                scalar => tokens.push(token(scalar)),
            }
        }
    }
    tokens
}

pub fn run_name(spec: &RunSpec) -> String {
    run_name_tokens(spec).join("_")
}

fn token(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(x) if n.is_f64() => python_float(x),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Spell a float the way Python's `repr` does: shortest round-trip digits,
/// positional for exponents in `-4..16`, otherwise `1e-05` style.
fn python_float(x: f64) -> String {
    if x == 0.0 {
        return if x.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }
    // `{:e}` already yields the shortest digits that round-trip.
    let sci = format!("{x:e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return sci;
    };
    let (sign, mantissa) = mantissa.strip_prefix('-').map_or(("", mantissa), |m| ("-", m));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (-4..16).contains(&exp) {
        if exp < 0 {
            let zeros = usize::try_from(-exp - 1).unwrap_or_default();
            return format!("{sign}0.{}{digits}", "0".repeat(zeros));
        }
        let point = usize::try_from(exp + 1).unwrap_or_default();
        if digits.len() <= point {
            return format!("{sign}{digits}{}.0", "0".repeat(point - digits.len()));
        }
        return format!("{sign}{}.{}", &digits[..point], &digits[point..]);
    }

    let mantissa = if digits.len() > 1 { format!("{}.{}", &digits[..1], &digits[1..]) } else { digits };
    let exp_sign = if exp < 0 { '-' } else { '+' };
    format!("{sign}{mantissa}e{exp_sign}{:02}", exp.unsigned_abs())
}
