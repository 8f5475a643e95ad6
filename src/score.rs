// src/score.rs

use crate::error::{Error, Result};
use crate::table::Value;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::warn;

/// Upper bound of the review scale.
pub const MAX_SCORE: f64 = 100.0;

/// Raw strings known to be malformed, with the value they were meant to be.
static MANUAL_CORRECTIONS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("35/4", 87.5), // 3.5/4
        ("67/10", 67.0),
        ("87/10", 87.0),
        ("920", 92.0),
        ("76/10", 76.0),
        ("75/10", 75.0),
        ("910", 91.0),
        ("25/4", 62.5), // 2.5/4
        ("45/5", 90.0),
        ("73/10", 73.0),
    ])
});

static LETTER_GRADES: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("A+", 98.0),
        ("A", 95.0),
        ("A-", 93.0),
        ("B+", 88.0),
        ("B", 85.0),
        ("B-", 83.0),
        ("C+", 78.0),
        ("C", 75.0),
        ("C-", 73.0),
        ("D+", 68.0),
        ("D", 65.0),
        ("D-", 63.0),
        ("E", 50.0),
        ("F", 40.0),
    ])
});

/// Outcome of normalizing one score token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormalizedScore {
    Score(f64),
    /// The token is well formed but carries no usable score (e.g. `2/0`).
    Unusable,
}

impl NormalizedScore {
    pub fn value(self) -> Option<f64> {
        match self {
            NormalizedScore::Score(v) => Some(v),
            NormalizedScore::Unusable => None,
        }
    }
}

/// Cap `score` at [`MAX_SCORE`]. Values below zero pass through untouched.
pub fn clamp_score(score: f64) -> f64 {
    if score > MAX_SCORE {
        MAX_SCORE
    } else {
        score
    }
}

fn clamp_logged(score: f64, original: &str) -> NormalizedScore {
    if score.is_nan() {
        return NormalizedScore::Unusable;
    }
    if score > MAX_SCORE {
        warn!(score, original, "score greater than {}, correcting", MAX_SCORE);
    }
    NormalizedScore::Score(clamp_score(score))
}

/// Normalize a raw score token onto the 0-100 scale.
///
/// Order: manual corrections, plain number, `n/d` ratio, letter grade.
/// A zero denominator is [`NormalizedScore::Unusable`]; a token matching
/// none of the forms is [`Error::UnrecognizedScore`].
pub fn normalize(token: &str) -> Result<NormalizedScore> {
    if let Some(&v) = MANUAL_CORRECTIONS.get(token) {
        return Ok(NormalizedScore::Score(v));
    }

    if let Ok(v) = token.trim().parse::<f64>() {
        return Ok(clamp_logged(v, token));
    }

    if token.contains('/') {
        let unrecognized = || Error::UnrecognizedScore(token.to_string());
        let (num, den) = match token.split('/').collect::<Vec<_>>()[..] {
            [n, d] => (n, d),
            _ => return Err(unrecognized()),
        };
        let num: f64 = num.trim().parse().map_err(|_| unrecognized())?;
        let den: f64 = den.trim().parse().map_err(|_| unrecognized())?;
        if den == 0.0 {
            return Ok(NormalizedScore::Unusable);
        }
        return Ok(clamp_logged(num / den * 100.0, token));
    }

    let cleaned: String = token.chars().filter(|c| !c.is_whitespace()).collect();
    LETTER_GRADES
        .get(cleaned.as_str())
        .map(|&v| NormalizedScore::Score(v))
        .ok_or_else(|| Error::UnrecognizedScore(token.to_string()))
}

/// Normalize a table cell. Cells already typed as numbers skip the
/// correction table and only go through the clamp.
pub fn normalize_value(value: &Value) -> Result<NormalizedScore> {
    match value {
        Value::Null => Ok(NormalizedScore::Unusable),
        Value::Int(_) | Value::Float(_) => {
            let v = value.as_f64().unwrap_or(f64::NAN);
            Ok(clamp_logged(v, &value.to_string()))
        }
        other => normalize(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(token: &str) -> Option<f64> {
        normalize(token).unwrap().value()
    }

    #[test]
    fn test_manual_corrections_exact() {
        for (token, expected) in MANUAL_CORRECTIONS.iter() {
            assert_eq!(score(token), Some(*expected), "token {}", token);
        }
    }

    #[test]
    fn test_letter_grades_exact() {
        for (token, expected) in LETTER_GRADES.iter() {
            assert_eq!(score(token), Some(*expected), "token {}", token);
        }
        assert_eq!(score("B +"), Some(88.0));
        assert_eq!(score(" A- "), Some(93.0));
    }

    #[test]
    fn test_fractions() {
        assert_eq!(score("3/5"), Some(60.0));
        assert_eq!(score("7/10"), Some(70.0));
        assert_eq!(score("3/1"), Some(100.0));
        assert_eq!(score("3.5/4"), Some(87.5));
        for (n, d) in [(1.0, 4.0), (9.0, 10.0), (5.0, 2.0), (-1.0, 5.0)] {
            let token = format!("{}/{}", n, d);
            assert_eq!(score(&token), Some(clamp_score(n / d * 100.0)));
        }
    }

    #[test]
    fn test_zero_denominator_is_unusable() {
        assert_eq!(normalize("2/0").unwrap(), NormalizedScore::Unusable);
        assert_eq!(normalize("0/0").unwrap(), NormalizedScore::Unusable);
    }

    #[test]
    fn test_plain_numbers() {
        assert_eq!(score("110"), Some(100.0));
        assert_eq!(score("60"), Some(60.0));
        assert_eq!(score("-19"), Some(-19.0));
        assert_eq!(score("NaN"), None);
    }

    #[test]
    fn test_unrecognized_tokens() {
        for token in ["G", "some multi-word string", "**", "?/10", "3?/89", "1/2/3"] {
            match normalize(token) {
                Err(Error::UnrecognizedScore(t)) => assert_eq!(t, token),
                other => panic!("{} should be unrecognized, got {:?}", token, other),
            }
        }
    }

    #[test]
    fn test_clamp_idempotent() {
        for x in [-50.0, 0.0, 42.5, 100.0, 100.0001, 1e9, f64::INFINITY] {
            let once = clamp_score(x);
            assert_eq!(clamp_score(once), once);
            if x > 100.0 {
                assert_eq!(once, 100.0);
            } else {
                assert_eq!(once, x);
            }
        }
    }

    #[test]
    fn test_numeric_cells_skip_corrections() {
        assert_eq!(
            normalize_value(&Value::Int(920)).unwrap(),
            NormalizedScore::Score(100.0)
        );
        assert_eq!(
            normalize_value(&Value::from("920")).unwrap(),
            NormalizedScore::Score(92.0)
        );
        assert_eq!(
            normalize_value(&Value::Float(87.5)).unwrap(),
            NormalizedScore::Score(87.5)
        );
        assert_eq!(normalize_value(&Value::Null).unwrap(), NormalizedScore::Unusable);
    }
}
