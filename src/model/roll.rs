//! Roll result structures nested inside exported chat messages.
//!
//! A [`RollResult`] is the evaluated form of one roll expression. Its
//! [`Roll`] entries are individual physical roll specifications ("3d6",
//! "1d20 with modifiers"); only the `type` tag is guaranteed, everything else
//! is populated by the exporter for some roll types and not others.

use super::value::null_as_default;
use serde::Deserialize;

/// Sides count of the only die this crate collects statistics for.
pub const D20_SIDES: i64 = 20;

// ===== RollResult =====

/// Evaluated result of one roll expression.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RollResult {
    /// Result kind reported by the exporter (e.g. "sum", "success").
    #[serde(default, deserialize_with = "null_as_default", rename = "resultType")]
    pub result_type: String,
    /// Secondary type tag ("V" for evaluated rolls).
    #[serde(default, deserialize_with = "null_as_default", rename = "type")]
    pub kind: String,
    /// Grand total of the expression.
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: f64,
    /// Physical roll specifications in source order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rolls: Vec<Roll>,
}

// ===== Roll =====

/// One physical roll specification within a [`RollResult`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Roll {
    /// Type tag: "R" for dice, "M" for math, "C" for comments, "L" for labels.
    #[serde(default, deserialize_with = "null_as_default", rename = "type")]
    pub kind: String,
    #[serde(default, rename = "expr")]
    expression: Option<RollExpression>,
    /// Free text carried by comment and label entries.
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default)]
    dice: Option<i64>,
    #[serde(default)]
    sides: Option<i64>,
    #[serde(default)]
    mods: Option<Mods>,
    #[serde(default, deserialize_with = "null_as_default")]
    results: Vec<DiceResult>,
}

impl Roll {
    /// Create a dice roll specification.
    ///
    /// Smart constructor used when building rolls outside of decoding.
    pub fn dice(dice: i64, sides: i64, outcomes: impl IntoIterator<Item = i64>) -> Self {
        Self {
            kind: "R".to_string(),
            dice: Some(dice),
            sides: Some(sides),
            results: outcomes.into_iter().map(DiceResult::new).collect(),
            ..Self::default()
        }
    }

    /// Number of dice thrown, `0` when the exporter left it out.
    pub fn dice_count(&self) -> i64 {
        self.dice.unwrap_or(0)
    }

    /// Sides per die, if the exporter recorded them.
    pub fn sides(&self) -> Option<i64> {
        self.sides
    }

    /// The expression as a string, or `""` when it is numeric or missing.
    pub fn expression(&self) -> &str {
        match &self.expression {
            Some(RollExpression::Text(s)) => s,
            Some(RollExpression::Number(_)) | Some(RollExpression::Unexpected(_)) | None => "",
        }
    }

    /// Modifier data, if any.
    pub fn mods(&self) -> Option<&Mods> {
        self.mods.as_ref()
    }

    /// Individual die results in the order they were rolled.
    pub fn results(&self) -> &[DiceResult] {
        &self.results
    }

    /// Die faces as plain integers.
    pub fn outcomes(&self) -> impl Iterator<Item = i64> + '_ {
        self.results.iter().map(|r| r.value)
    }

    /// Whether this roll counts towards d20 statistics.
    ///
    /// Requires a nonzero dice count and exactly twenty sides. Multi-die d20
    /// rolls qualify; each face is an independent sample.
    pub fn is_d20(&self) -> bool {
        self.dice_count() != 0 && self.sides == Some(D20_SIDES)
    }
}

// ===== RollExpression =====

/// Roll expression, written by the exporter as either an integer or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RollExpression {
    /// Bare integer expression (e.g. a flat modifier).
    Number(i64),
    /// Textual expression such as `"1d20+5"`.
    Text(String),
    /// Anything else.
    Unexpected(serde_json::Value),
}

// ===== DiceResult =====

/// Face value of a single die.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DiceResult {
    /// Face shown.
    #[serde(default, rename = "v")]
    pub value: i64,
}

impl DiceResult {
    /// Wrap a single face value.
    pub fn new(value: i64) -> Self {
        Self { value }
    }
}

// ===== Mods =====

/// Modifiers attached to a roll. Only the kinds seen in real exports are modelled.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Mods {
    /// Custom critical-success ranges.
    #[serde(default, deserialize_with = "null_as_default", rename = "customCrit")]
    pub custom_crit: Vec<CustomCritMod>,
    /// Keep modifier, if any.
    #[serde(default)]
    pub keep: Option<KeepMod>,
}

/// Custom critical range, e.g. `cs>19`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CustomCritMod {
    /// Comparison operator (">", "<", "=").
    #[serde(default, deserialize_with = "null_as_default", rename = "comp")]
    pub comparator: String,
    /// Threshold the face is compared against.
    #[serde(default)]
    pub point: i64,
}

/// Keep-highest/lowest modifier, e.g. `2d20kh1`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KeepMod {
    /// "h" to keep the highest dice, "l" for the lowest.
    #[serde(default, deserialize_with = "null_as_default")]
    pub end: String,
    /// Number of dice kept.
    #[serde(default)]
    pub count: i64,
}
