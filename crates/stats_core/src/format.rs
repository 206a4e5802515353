//! crates/stats_core/src/format.rs
//! General (`%G`-style) number formatting used for every statistics cell.
//!
//! Rules, for `precision` significant digits `P` and decimal exponent `X`
//! of the value once rounded to `P` digits:
//! - `X < -4` or `X >= P`: scientific, `d.ddddE±x` with trailing zeros
//!   removed (at least one fractional digit) and an unpadded exponent;
//! - otherwise fixed notation with trailing zeros and a bare point removed.

/// Significant digits shown in the statistics table.
pub const TABLE_PRECISION: usize = 5;

/// `%.5G` formatting of a statistic value.
#[inline]
pub fn format_g5(v: f64) -> String {
    format_g(v, TABLE_PRECISION)
}

/// `%.{precision}G` formatting. A precision of 0 is treated as 1.
pub fn format_g(v: f64, precision: usize) -> String {
    if v.is_nan() {
        return "NAN".to_string();
    }
    if v.is_infinite() {
        return if v < 0.0 { "-INF" } else { "INF" }.to_string();
    }

    let mut out = String::with_capacity(16);
    if v.is_sign_negative() {
        out.push('-');
    }
    if v == 0.0 {
        out.push('0');
        return out;
    }

    let p = precision.max(1);
    let (digits, exp) = significant_digits(v.abs(), p);
    // position of the decimal point relative to the first digit
    let decpt = exp + 1;

    if decpt < -3 || decpt > p as i32 {
        push_scientific(&mut out, &digits, exp);
    } else {
        push_fixed(&mut out, &digits, decpt);
    }
    out
}

/// Correctly rounded significant digits (trailing zeros removed) and the
/// decimal exponent of the first digit.
fn significant_digits(v: f64, p: usize) -> (String, i32) {
    let sci = format!("{:.*e}", p - 1, v);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    let mut digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }
    (digits, exp)
}

fn push_scientific(out: &mut String, digits: &str, exp: i32) {
    let (lead, rest) = digits.split_at(1);
    out.push_str(lead);
    out.push('.');
    out.push_str(if rest.is_empty() { "0" } else { rest });
    out.push('E');
    out.push(if exp < 0 { '-' } else { '+' });
    out.push_str(&exp.unsigned_abs().to_string());
}

fn push_fixed(out: &mut String, digits: &str, decpt: i32) {
    if decpt <= 0 {
        out.push_str("0.");
        for _ in decpt..0 {
            out.push('0');
        }
        out.push_str(digits);
        return;
    }
    let int_len = decpt as usize;
    if digits.len() <= int_len {
        out.push_str(digits);
        for _ in digits.len()..int_len {
            out.push('0');
        }
    } else {
        out.push_str(&digits[..int_len]);
        out.push('.');
        out.push_str(&digits[int_len..]);
    }
}
