//! Numeric values and operator semantics.
//!
//! Integers stay integers under `+ - * // % **` (with a non-negative
//! exponent) and are promoted to floats by `/`, by a negative exponent or by
//! mixing with a float. Floor division and modulo round toward negative
//! infinity, so the sign of a remainder follows the divisor.

use std::fmt;

use super::ArithError;

/// A value produced by evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

const INT_OVERFLOW: ArithError = ArithError::Overflow("integer overflow");
const OUT_OF_RANGE: ArithError = ArithError::Overflow("numeric result out of range");
const ZERO_NEGATIVE_POWER: ArithError =
    ArithError::ZeroDivision("0.0 cannot be raised to a negative power");

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    pub fn is_int(self) -> bool {
        matches!(self, Number::Int(_))
    }

    pub fn neg(self) -> Result<Number, ArithError> {
        match self {
            Number::Int(v) => v.checked_neg().map(Number::Int).ok_or(INT_OVERFLOW),
            Number::Float(v) => Ok(Number::Float(-v)),
        }
    }

    pub fn add(self, rhs: Number) -> Result<Number, ArithError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a.checked_add(b).map(Number::Int).ok_or(INT_OVERFLOW),
            (a, b) => Ok(Number::Float(a.as_f64() + b.as_f64())),
        }
    }

    pub fn sub(self, rhs: Number) -> Result<Number, ArithError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a.checked_sub(b).map(Number::Int).ok_or(INT_OVERFLOW),
            (a, b) => Ok(Number::Float(a.as_f64() - b.as_f64())),
        }
    }

    pub fn mul(self, rhs: Number) -> Result<Number, ArithError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a.checked_mul(b).map(Number::Int).ok_or(INT_OVERFLOW),
            (a, b) => Ok(Number::Float(a.as_f64() * b.as_f64())),
        }
    }

    /// True division; always a float.
    pub fn div(self, rhs: Number) -> Result<Number, ArithError> {
        if rhs.as_f64() == 0.0 {
            return Err(ArithError::ZeroDivision(if self.is_int() && rhs.is_int() {
                "division by zero"
            } else {
                "float division by zero"
            }));
        }
        Ok(Number::Float(self.as_f64() / rhs.as_f64()))
    }

    pub fn floor_div(self, rhs: Number) -> Result<Number, ArithError> {
        match (self, rhs) {
            (Number::Int(_), Number::Int(0)) => Err(ArithError::ZeroDivision(
                "integer division or modulo by zero",
            )),
            (Number::Int(a), Number::Int(b)) => {
                let q = a.checked_div(b).ok_or(INT_OVERFLOW)?;
                if a % b != 0 && ((a < 0) != (b < 0)) {
                    Ok(Number::Int(q - 1))
                } else {
                    Ok(Number::Int(q))
                }
            }
            (a, b) => {
                if b.as_f64() == 0.0 {
                    return Err(ArithError::ZeroDivision("float floor division by zero"));
                }
                Ok(Number::Float(float_divmod(a.as_f64(), b.as_f64()).0))
            }
        }
    }

    pub fn rem(self, rhs: Number) -> Result<Number, ArithError> {
        match (self, rhs) {
            (Number::Int(_), Number::Int(0)) => Err(ArithError::ZeroDivision(
                "integer division or modulo by zero",
            )),
            (Number::Int(_), Number::Int(-1)) => Ok(Number::Int(0)),
            (Number::Int(a), Number::Int(b)) => {
                let r = a % b;
                if r != 0 && ((r < 0) != (b < 0)) {
                    Ok(Number::Int(r + b))
                } else {
                    Ok(Number::Int(r))
                }
            }
            (a, b) => {
                if b.as_f64() == 0.0 {
                    return Err(ArithError::ZeroDivision("float modulo by zero"));
                }
                Ok(Number::Float(float_divmod(a.as_f64(), b.as_f64()).1))
            }
        }
    }

    pub fn pow(self, rhs: Number) -> Result<Number, ArithError> {
        match (self, rhs) {
            (Number::Int(base), Number::Int(exp)) if exp >= 0 => int_pow(base, exp),
            (Number::Int(0), Number::Int(_)) => Err(ZERO_NEGATIVE_POWER),
            (a, b) => {
                let (base, exp) = (a.as_f64(), b.as_f64());
                if base == 0.0 && exp < 0.0 {
                    return Err(ZERO_NEGATIVE_POWER);
                }
                if base < 0.0 && exp.fract() != 0.0 && exp.is_finite() {
                    return Err(ArithError::Domain(
                        "negative number cannot be raised to a fractional power",
                    ));
                }
                let value = base.powf(exp);
                if value.is_infinite() && base.is_finite() && exp.is_finite() {
                    return Err(OUT_OF_RANGE);
                }
                Ok(Number::Float(value))
            }
        }
    }
}

fn int_pow(base: i64, exp: i64) -> Result<Number, ArithError> {
    match base {
        0 => return Ok(Number::Int(if exp == 0 { 1 } else { 0 })),
        1 => return Ok(Number::Int(1)),
        -1 => return Ok(Number::Int(if exp % 2 == 0 { 1 } else { -1 })),
        _ => {}
    }
    let exp = u32::try_from(exp).map_err(|_| INT_OVERFLOW)?;
    base.checked_pow(exp).map(Number::Int).ok_or(INT_OVERFLOW)
}

/// Floor quotient and remainder of two floats, remainder signed like `b`.
fn float_divmod(a: f64, b: f64) -> (f64, f64) {
    let mut rem = a % b;
    let mut div = (a - rem) / b;
    if rem != 0.0 {
        if (b < 0.0) != (rem < 0.0) {
            rem += b;
            div -= 1.0;
        }
    } else {
        rem = 0.0_f64.copysign(b);
    }
    let floordiv = if div != 0.0 {
        let mut floordiv = div.floor();
        if div - floordiv > 0.5 {
            floordiv += 1.0;
        }
        floordiv
    } else {
        0.0_f64.copysign(a / b)
    };
    (floordiv, rem)
}

/// Shortest round-trip rendering of a float, with `.0` on integral values and
/// scientific notation outside `[1e-4, 1e16)`.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let magnitude = value.abs();
    if !(1e-4..1e16).contains(&magnitude) {
        let raw = format!("{value:e}");
        let (mantissa, exponent) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
        let exponent: i32 = exponent.parse().unwrap_or(0);
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs());
    }

    let mut out = format!("{value}");
    if !out.contains('.') {
        out.push_str(".0");
    }
    out
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{v}"),
            Number::Float(v) => f.write_str(&format_float(*v)),
        }
    }
}
