//! Report rendering.
//!
//! Produces the markdown-flavoured text block consumed by chat bots and
//! pasted into Discord. The field labels and their order are a contract with
//! existing consumers; do not change them.

use crate::aggregate::PlayerStats;
use crate::model::StatBlock;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Shown in the mode line when no single value is most frequent.
pub const NO_MODE: &str = "<none>";

/// Render the statistics block for one player, header included.
pub fn render_stat_block(label: &str, stats: &StatBlock) -> String {
    let mode = match stats.mode {
        Some(mode) => mode.to_string(),
        None => NO_MODE.to_string(),
    };

    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write!(
        out,
        "**__{label}__**\n\
         **Count:** {count}\n\
         **By time:** {by_time}\n\
         **By roll:** {by_roll}\n\
         **Median:** {median:.2}\n\
         **Mode:** {mode}\n\
         **Mean:** {mean:.2}\n\
         **Min:** {min} ({min_count})\n\
         **Max:** {max} ({max_count})\n",
        count = stats.count,
        by_time = join_values(&stats.ordered_by_time),
        by_roll = join_values(&stats.ordered_by_roll),
        median = stats.median,
        mean = stats.mean,
        min = stats.min,
        min_count = stats.occurrences(stats.min),
        max = stats.max,
        max_count = stats.occurrences(stats.max),
    );
    out
}

/// Render every player's block, separated by a blank line.
pub fn render_report(players: &[PlayerStats]) -> String {
    players
        .iter()
        .map(|player| render_stat_block(&player.label, &player.stats))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the full report to `out`.
///
/// # Errors
///
/// Propagates write failures (e.g. a closed pipe).
pub fn write_report<W: Write>(out: &mut W, players: &[PlayerStats]) -> io::Result<()> {
    out.write_all(render_report(players).as_bytes())?;
    out.flush()
}

/// Comma-separated list of outcomes.
pub fn join_values(values: &[i64]) -> String {
    values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
