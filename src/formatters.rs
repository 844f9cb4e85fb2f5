// src/formatters.rs
use chrono::NaiveDate;

const TRILLION: f64 = 1e12;
const BILLION: f64 = 1e9;
const MILLION: f64 = 1e6;
const THOUSAND: f64 = 1e3;

const CURRENCY_UNITS: [(f64, &str); 3] = [(TRILLION, "T"), (BILLION, "B"), (MILLION, "M")];
const NUMBER_UNITS: [(f64, &str); 3] = [(BILLION, "B"), (MILLION, "M"), (THOUSAND, "K")];

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `abs` in the largest unit its displayed value reaches, one decimal.
/// A value is judged by how the next smaller unit would round it, so
/// `999_960_000` is `1.0B` rather than `1000.0M`. `None` below every unit.
fn scaled(abs: f64, units: &[(f64, &str)], plain_decimals: i32) -> Option<String> {
    for (i, (scale, suffix)) in units.iter().enumerate() {
        let shown = match units.get(i + 1) {
            Some((lower, _)) => round_to(abs / lower, 1) * lower,
            None => round_to(abs, plain_decimals),
        };
        if shown >= *scale {
            return Some(format!("{:.1}{}", abs / scale, suffix));
        }
    }
    None
}

fn sign(value: f64) -> &'static str {
    if value < 0.0 {
        "-"
    } else {
        ""
    }
}

/// Currency with a unit suffix for large magnitudes: `$1.2B`, `$850.0M`, `$245.67`.
pub fn format_currency(value: impl Into<Option<f64>>) -> String {
    let Some(v) = present(value.into()) else {
        return "$0".to_string();
    };
    let abs = v.abs();
    let body = scaled(abs, &CURRENCY_UNITS, 2).unwrap_or_else(|| with_separators(abs, 2));
    format!("{}${}", sign(v), body)
}

/// Ratio rendered as a percentage with one decimal: `0.176` is `17.6%`.
pub fn format_percent(value: impl Into<Option<f64>>) -> String {
    let v = value.into().filter(|v| v.is_finite()).unwrap_or(0.0);
    format!("{:.1}%", v * 100.0)
}

pub fn format_large_number(value: impl Into<Option<f64>>) -> String {
    let Some(v) = present(value.into()) else {
        return "0".to_string();
    };
    let abs = v.abs();
    let body = scaled(abs, &NUMBER_UNITS, 0).unwrap_or_else(|| format!("{:.0}", abs));
    format!("{}{}", sign(v), body)
}

/// Whole number with thousands separators: `1,808,581`.
pub fn format_count(value: impl Into<Option<f64>>) -> String {
    let Some(v) = present(value.into()) else {
        return "0".to_string();
    };
    format!("{}{}", sign(v), with_separators(v.abs().round(), 0))
}

/// `2025-01-01` or `2025-01` becomes `Jan 2025`. Anything else is returned as given.
pub fn format_date(raw: &str) -> String {
    let trimmed = raw.trim();
    let parsed = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d"));
    match parsed {
        Ok(date) => date.format("%b %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

pub fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| "N/A".to_string())
}

fn with_separators(abs: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, abs);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (fixed, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}.{}", grouped, frac),
        None => grouped,
    }
}
