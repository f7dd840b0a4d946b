//! Batch-size growth functions.
//!
//! A growth spec is written as `lin[a,b]` (`a*x + b`) or `exp[a,b]`
//! (`a * b^x`), where `x` is the zero-based batch index.
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthSpec {
    Linear { a: u64, b: u64 },
    Exponential { a: u64, b: u64 },
}

impl GrowthSpec {
    /// Value of the function at `x`. Saturates at `u64::MAX`.
    #[must_use]
    pub fn value_at(self, x: u64) -> u64 {
        match self {
            GrowthSpec::Linear { a, b } => a.saturating_mul(x).saturating_add(b),
            GrowthSpec::Exponential { a, b } => {
                let exponent = u32::try_from(x).unwrap_or(u32::MAX);
                a.saturating_mul(b.saturating_pow(exponent))
            }
        }
    }
}

impl FromStr for GrowthSpec {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_growth(s).ok_or_else(|| ValidationError::InvalidStrategy {
            value: s.to_owned(),
        })
    }
}

impl fmt::Display for GrowthSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowthSpec::Linear { a, b } => write!(f, "lin[{},{}]", a, b),
            GrowthSpec::Exponential { a, b } => write!(f, "exp[{},{}]", a, b),
        }
    }
}

fn parse_growth(value: &str) -> Option<GrowthSpec> {
    let (name, rest) = value.split_once('[')?;
    let (a, b) = rest.strip_suffix(']')?.split_once(',')?;
    let a = parse_coefficient(a)?;
    let b = parse_coefficient(b)?;
    match name {
        "lin" => Some(GrowthSpec::Linear { a, b }),
        "exp" => Some(GrowthSpec::Exponential { a, b }),
        _ => None,
    }
}

fn parse_coefficient(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// A growth spec plus the cursor of the run that drives it.
#[derive(Debug, Clone)]
pub struct Growth {
    spec: GrowthSpec,
    cursor: u64,
}

impl Growth {
    #[must_use]
    pub const fn new(spec: GrowthSpec) -> Self {
        Self { spec, cursor: 0 }
    }

    #[must_use]
    pub const fn spec(&self) -> GrowthSpec {
        self.spec
    }

    /// Returns `f(cursor)` and advances the cursor.
    pub fn next_value(&mut self) -> u64 {
        let value = self.spec.value_at(self.cursor);
        self.cursor = self.cursor.saturating_add(1);
        value
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

impl FromStr for Growth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<GrowthSpec>().map(Growth::new)
    }
}

impl Iterator for Growth {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};

    fn parse(value: &str) -> AppResult<Growth> {
        value.parse::<Growth>().map_err(AppError::from)
    }

    #[test]
    fn parse_accepts_lin_and_exp() -> AppResult<()> {
        let lin = parse("lin[1,2]")?;
        if lin.spec() != (GrowthSpec::Linear { a: 1, b: 2 }) {
            return Err(AppError::validation("Unexpected linear spec"));
        }
        let exp = parse("exp[1,2]")?;
        if exp.spec() != (GrowthSpec::Exponential { a: 1, b: 2 }) {
            return Err(AppError::validation("Unexpected exponential spec"));
        }
        Ok(())
    }

    #[test]
    fn parse_rejects_malformed_specs() -> AppResult<()> {
        let rejected = [
            "lin[1, 2]",
            "lin[1,2,3]",
            "wrong[1,2]",
            "lin[1,2] ",
            " lin[1,2]",
            "lin[1,2]]",
            "lin[-1,2]",
            "lin[,2]",
            "lin[1,]",
            "lin(1,2)",
            "LIN[1,2]",
            "lin[1,2]exp[1,2]",
            "lin[99999999999999999999999,1]",
            "",
        ];
        for value in rejected {
            match value.parse::<GrowthSpec>() {
                Err(ValidationError::InvalidStrategy { value: reported }) if reported == value => {}
                Err(err) => {
                    return Err(AppError::validation(format!(
                        "Unexpected error for '{}': {}",
                        value, err
                    )));
                }
                Ok(spec) => {
                    return Err(AppError::validation(format!(
                        "Expected '{}' to be rejected, got {}",
                        value, spec
                    )));
                }
            }
        }
        Ok(())
    }

    #[test]
    fn linear_sequence_follows_ax_plus_b() -> AppResult<()> {
        let mut growth = parse("lin[1,1]")?;
        for k in 0..100u64 {
            let value = growth.next_value();
            if value != k.saturating_add(1) {
                return Err(AppError::validation(format!(
                    "lin[1,1] at {} was {}",
                    k, value
                )));
            }
        }
        Ok(())
    }

    #[test]
    fn exponential_sequence_follows_a_times_b_pow_x() -> AppResult<()> {
        let mut growth = parse("exp[2,2]")?;
        for k in 0..10u32 {
            let value = growth.next_value();
            if value != 2u64.saturating_mul(2u64.pow(k)) {
                return Err(AppError::validation(format!(
                    "exp[2,2] at {} was {}",
                    k, value
                )));
            }
        }
        Ok(())
    }

    #[test]
    fn reset_restarts_from_zero() -> AppResult<()> {
        let mut growth = parse("lin[3,4]")?;
        for _ in 0..17 {
            growth.next_value();
        }
        growth.reset();
        if growth.next_value() != 4 {
            return Err(AppError::validation("Expected f(0) after reset"));
        }
        if growth.next_value() != 7 {
            return Err(AppError::validation("Expected f(1) after f(0)"));
        }
        Ok(())
    }

    #[test]
    fn exponential_growth_saturates() -> AppResult<()> {
        let spec = GrowthSpec::Exponential { a: 3, b: 10 };
        if spec.value_at(40) != u64::MAX {
            return Err(AppError::validation("Expected saturation at u64::MAX"));
        }
        Ok(())
    }

    #[test]
    fn display_round_trips_through_parse() -> AppResult<()> {
        let spec: GrowthSpec = "exp[5,3]".parse()?;
        if spec.to_string() != "exp[5,3]" {
            return Err(AppError::validation(format!("Unexpected display {}", spec)));
        }
        Ok(())
    }

    #[test]
    fn iterator_yields_sequence() -> AppResult<()> {
        let values: Vec<u64> = parse("lin[2,1]")?.take(4).collect();
        if values != [1, 3, 5, 7] {
            return Err(AppError::validation(format!("Unexpected values {:?}", values)));
        }
        Ok(())
    }
}
