//! Per-player aggregation of d20 outcomes.
//!
//! [`RollTally`] is the accumulator for one pass over a decoded archive. It
//! groups qualifying outcomes by player id, remembers the first non-empty
//! display name seen for each player, and finally hands every group to the
//! statistics engine.

use crate::model::{DatedResult, Message, MsgStream, ParseError, StatBlock};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

// ===== RollSighting =====

/// One accepted d20 outcome, as reported to a roll trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollSighting<'a> {
    /// Index of the batch within the archive.
    pub batch_index: usize,
    /// The message's key within its batch.
    pub key: &'a str,
    /// [`Message::brief_desc`] of the message.
    pub brief_desc: &'a str,
    /// Player the outcome is attributed to.
    pub player_id: &'a str,
    /// Face shown.
    pub value: i64,
}

impl fmt::Display for RollSighting<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: [{}] {} Rolled d20 and got: {}",
            self.batch_index, self.key, self.brief_desc, self.value
        )
    }
}

// ===== PlayerStats =====

/// Statistics for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    /// Stable player identifier.
    pub player_id: String,
    /// Display label: the first non-empty name seen, else the player id.
    pub label: String,
    /// Statistics over every d20 outcome of the player.
    pub stats: StatBlock,
}

// ===== RollTally =====

/// Callback receiving every accepted outcome.
type RollTrace<'t> = Box<dyn FnMut(&RollSighting<'_>) + 't>;

/// Accumulator for a single pass over the archive.
#[derive(Default)]
pub struct RollTally<'t> {
    /// player id -> first non-empty display name
    names: HashMap<String, String>,
    /// player id -> qualifying outcomes in stream order
    results: HashMap<String, Vec<DatedResult>>,
    trace: Option<RollTrace<'t>>,
}

impl<'t> RollTally<'t> {
    /// Create an empty tally with no trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tally that reports every accepted outcome to `trace`.
    pub fn with_trace(trace: impl FnMut(&RollSighting<'_>) + 't) -> Self {
        Self {
            trace: Some(Box::new(trace)),
            ..Self::default()
        }
    }

    /// Record every qualifying d20 outcome of one message.
    ///
    /// Messages without roll results are skipped. Returns the number of
    /// outcomes recorded.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MalformedEmbeddedRoll` if the message claims to be
    /// a roll result but its content cannot be decoded.
    pub fn record_message(
        &mut self,
        message: &mut Message,
        batch_index: usize,
        key: &str,
    ) -> Result<usize, ParseError> {
        if !message.has_roll_results()? {
            return Ok(0);
        }

        self.remember_name(&message.player_id, &message.who);

        let when = message.timestamp();
        let brief_desc = self.trace.as_ref().map(|_| message.brief_desc());
        let player_id = message.player_id.clone();
        let trace = &mut self.trace;
        let bucket = self.results.entry(player_id.clone()).or_default();
        let before = bucket.len();

        message.for_each_roll(|roll| {
            if !roll.is_d20() {
                return true;
            }
            for value in roll.outcomes() {
                debug!(player_id = %player_id, batch_index, key, value, "Accepted d20 outcome");
                bucket.push(DatedResult::new(when, value));
                if let Some(trace) = trace.as_mut() {
                    trace(&RollSighting {
                        batch_index,
                        key,
                        brief_desc: brief_desc.as_deref().unwrap_or_default(),
                        player_id: &player_id,
                        value,
                    });
                }
            }
            true
        })?;

        Ok(bucket.len() - before)
    }

    /// Record every message of a decoded archive, in stream order.
    ///
    /// # Errors
    ///
    /// Stops at the first malformed embedded roll.
    pub fn record_stream(&mut self, stream: MsgStream) -> Result<usize, ParseError> {
        let mut recorded = 0;
        for (batch_index, batch) in stream.into_iter().enumerate() {
            for (key, mut message) in batch {
                recorded += self.record_message(&mut message, batch_index, &key)?;
            }
        }
        Ok(recorded)
    }

    /// The label currently resolved for a player.
    pub fn label_for<'a>(&'a self, player_id: &'a str) -> &'a str {
        self.names
            .get(player_id)
            .map(String::as_str)
            .unwrap_or(player_id)
    }

    /// Outcomes recorded so far for a player, in stream order.
    pub fn results_for(&self, player_id: &str) -> &[DatedResult] {
        self.results
            .get(player_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Compute statistics for every player with at least one outcome.
    ///
    /// Ordered by label, then player id.
    pub fn into_player_stats(self) -> Vec<PlayerStats> {
        let RollTally { names, results, .. } = self;

        let mut players: Vec<PlayerStats> = results
            .into_iter()
            .filter(|(_, outcomes)| !outcomes.is_empty())
            .map(|(player_id, outcomes)| {
                let label = names
                    .get(&player_id)
                    .cloned()
                    .unwrap_or_else(|| player_id.clone());
                PlayerStats {
                    stats: StatBlock::compute(outcomes),
                    player_id,
                    label,
                }
            })
            .collect();

        players.sort_by(|a, b| {
            a.label
                .cmp(&b.label)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });

        info!(players = players.len(), "Player statistics computed");
        players
    }

    // First writer wins; blank names never claim or overwrite a label.
    fn remember_name(&mut self, player_id: &str, who: &str) {
        if who.is_empty() || self.names.contains_key(player_id) {
            return;
        }
        self.names.insert(player_id.to_string(), who.to_string());
    }
}

/// Run the whole aggregation over a decoded archive.
///
/// # Errors
///
/// Returns the first `ParseError` raised by a message.
pub fn collect(stream: MsgStream) -> Result<Vec<PlayerStats>, ParseError> {
    collect_with(RollTally::new(), stream)
}

/// Run the whole aggregation with a prepared tally (e.g. one with a trace).
///
/// # Errors
///
/// Returns the first `ParseError` raised by a message.
pub fn collect_with(
    mut tally: RollTally<'_>,
    stream: MsgStream,
) -> Result<Vec<PlayerStats>, ParseError> {
    let recorded = tally.record_stream(stream)?;
    info!(outcomes = recorded, "Archive aggregated");
    Ok(tally.into_player_stats())
}
