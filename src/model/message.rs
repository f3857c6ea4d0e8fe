//! Exported chat messages.
//!
//! A [`Message`] is one chat event from the archive. Messages carry their
//! roll data in one of two ways: as pre-parsed inline rolls, or (for the
//! `rollresult`/`gmrollresult` types) as a serialized [`RollResult`] inside
//! the free-form `content` field. [`Message::ensure_roll_results`] folds the
//! second form into the first exactly once, after which the inline-roll list
//! is authoritative.

use super::error::ParseError;
use super::roll::{Roll, RollResult};
use super::value::{null_as_default, text_or_empty, MaybeText};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Message types whose roll result is embedded as serialized text in `content`.
pub const EMBEDDED_ROLL_TYPES: [&str; 2] = ["rollresult", "gmrollresult"];

/// One archive batch: opaque key to message. Keys only label diagnostics.
pub type MsgBatch = BTreeMap<String, Message>;

/// The decoded archive: a sequence of batches.
pub type MsgStream = Vec<MsgBatch>;

// ===== InlineRoll =====

/// An evaluated inline roll attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InlineRoll {
    /// Source expression, e.g. `"1d20+4"`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub expression: String,
    /// Evaluated result.
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: RollResult,
    /// Exporter-assigned roll id.
    #[serde(default, deserialize_with = "null_as_default", rename = "rollid")]
    pub roll_id: String,
    #[serde(default)]
    signature: Option<MaybeText>,
}

impl InlineRoll {
    /// Wrap a result recovered from a message's `content` field.
    ///
    /// The signature is set to the absent sentinel, as the exporter does for
    /// unsigned rolls.
    pub fn embedded(expression: impl Into<String>, results: RollResult) -> Self {
        Self {
            expression: expression.into(),
            results,
            roll_id: String::new(),
            signature: Some(MaybeText::ABSENT),
        }
    }

    /// Roll signature, or `""` when unsigned.
    pub fn signature(&self) -> &str {
        text_or_empty(self.signature.as_ref())
    }
}

// ===== RollState =====

/// Whether a message's inline rolls have been finalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum RollState {
    /// Decoded from the archive; embedded results not yet considered.
    #[default]
    Unpopulated,
    /// Inline rolls are authoritative.
    Populated,
}

// ===== Message =====

/// One exported chat event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    /// Milliseconds since the Unix epoch, with a fractional part.
    #[serde(default, deserialize_with = "null_as_default", rename = ".priority")]
    priority: f64,
    #[serde(default)]
    avatar: Option<MaybeText>,
    /// Free-form content; serialized roll data for embedded roll types.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    /// Listener id for API-generated messages.
    #[serde(default, deserialize_with = "null_as_default", rename = "listenerid")]
    pub listener_id: String,
    /// Stable player identifier.
    #[serde(default, deserialize_with = "null_as_default", rename = "playerid")]
    pub player_id: String,
    /// Roll template name, if the message was rendered from one.
    #[serde(default, deserialize_with = "null_as_default", rename = "rolltemplate")]
    pub roll_template: String,
    /// Message type tag ("general", "rollresult", "emote", ...).
    #[serde(default, deserialize_with = "null_as_default", rename = "type")]
    pub kind: String,
    /// Display name. Often blank on consecutive messages from the same player.
    #[serde(default, deserialize_with = "null_as_default")]
    pub who: String,
    #[serde(default, deserialize_with = "null_as_default", rename = "inlinerolls")]
    inline_rolls: Vec<InlineRoll>,
    /// Whisper target id.
    #[serde(default, deserialize_with = "null_as_default")]
    pub target: String,
    /// Whisper target display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_name: String,
    /// Original roll command for embedded roll types.
    #[serde(default, deserialize_with = "null_as_default", rename = "origRoll")]
    pub original_roll: String,
    #[serde(skip)]
    state: RollState,
}

impl Message {
    /// Whether this message's type carries its roll result inside `content`.
    pub fn has_embedded_roll_type(&self) -> bool {
        EMBEDDED_ROLL_TYPES.contains(&self.kind.as_str())
    }

    /// Finalize the inline-roll list and report whether it is non-empty.
    ///
    /// For embedded roll types with no inline rolls, `content` is decoded as a
    /// [`RollResult`] and wrapped in a synthetic [`InlineRoll`]. This happens at
    /// most once; later calls only inspect the list.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedEmbeddedRoll`] if `content` is not valid
    /// serialized roll data. The message stays unpopulated in that case.
    pub fn ensure_roll_results(&mut self) -> Result<bool, ParseError> {
        if self.state == RollState::Unpopulated {
            if self.inline_rolls.is_empty() && self.has_embedded_roll_type() {
                let results = crate::parser::parse_embedded_roll(&self.content, &self.kind)?;
                self.inline_rolls
                    .push(InlineRoll::embedded(self.original_roll.clone(), results));
            }
            self.state = RollState::Populated;
        }
        Ok(!self.inline_rolls.is_empty())
    }

    /// Alias of [`Message::ensure_roll_results`] named for the question callers ask.
    pub fn has_roll_results(&mut self) -> Result<bool, ParseError> {
        self.ensure_roll_results()
    }

    /// Inline rolls as currently held (populated or not).
    pub fn inline_rolls(&self) -> &[InlineRoll] {
        &self.inline_rolls
    }

    /// Lazily walk every [`Roll`] of every inline roll in source order.
    ///
    /// Populates embedded results first. Yields nothing when the message has
    /// no rolls.
    pub fn raw_rolls(&mut self) -> Result<impl Iterator<Item = &Roll> + '_, ParseError> {
        self.ensure_roll_results()?;
        Ok(self.rolls())
    }

    fn rolls(&self) -> impl Iterator<Item = &Roll> + '_ {
        self.inline_rolls
            .iter()
            .flat_map(|inline| inline.results.rolls.iter())
    }

    /// Visit every [`Roll`] in source order until `visit` returns `false`.
    ///
    /// Returns `Ok(true)` if every roll was visited, `Ok(false)` if the
    /// message has no rolls or the visitor stopped early. Stopping is not an
    /// error.
    pub fn for_each_roll<F>(&mut self, mut visit: F) -> Result<bool, ParseError>
    where
        F: FnMut(&Roll) -> bool,
    {
        if !self.ensure_roll_results()? {
            return Ok(false);
        }
        for roll in self.rolls() {
            if !visit(roll) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Message time as an absolute UTC instant.
    ///
    /// The exporter stores milliseconds with a fractional part. Whole
    /// milliseconds are split exactly into seconds and nanoseconds so that
    /// messages 1ms apart never collide; the sub-millisecond fraction is
    /// truncated to nanosecond resolution. Non-finite or out-of-range values
    /// map to the Unix epoch.
    pub fn timestamp(&self) -> DateTime<Utc> {
        if !self.priority.is_finite() {
            return DateTime::<Utc>::default();
        }
        let whole_ms = self.priority.floor();
        let fraction_ns = ((self.priority - whole_ms) * 1_000_000.0).trunc() as i64;
        let whole_ms = whole_ms as i64;

        let secs = whole_ms.div_euclid(1000);
        let nanos = whole_ms.rem_euclid(1000) * 1_000_000 + fraction_ns.clamp(0, 999_999);

        u32::try_from(nanos)
            .ok()
            .and_then(|nanos| DateTime::from_timestamp(secs, nanos))
            .unwrap_or_default()
    }

    /// One-line diagnostic summary: time, type and display name.
    pub fn brief_desc(&self) -> String {
        format!(
            "{} type {} by {}",
            self.timestamp().to_rfc2822(),
            self.kind,
            self.who
        )
    }

    /// Avatar URL, or `""` when absent.
    pub fn avatar(&self) -> &str {
        text_or_empty(self.avatar.as_ref())
    }
}
