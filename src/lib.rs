//! d20 roll statistics for Roll20 chat archives.
//!
//! The pipeline is decode → extract → aggregate → render:
//! - [`source`] opens a JSON or base64 archive and decodes it into batches
//! - [`model`] holds the message and roll shapes, plus [`model::StatBlock`]
//! - [`aggregate`] walks the stream and groups d20 outcomes per player
//! - [`view`] renders the per-player report

pub mod aggregate;
pub mod config;
pub mod logging;
pub mod model;
pub mod parser;
pub mod source;
pub mod view;

use model::AppError;
use source::FormatChoice;
use std::io::Write;
use std::path::Path;

/// Run the whole pipeline for one archive.
///
/// The report is written to `out` only after the archive has been fully
/// decoded and aggregated. When `trace` is given, every accepted d20 outcome
/// is written to it as it is found.
///
/// # Errors
///
/// Any decoding or extraction failure aborts the run before `out` is touched.
pub fn run<W: Write>(
    path: &Path,
    format: FormatChoice,
    out: &mut W,
    trace: Option<&mut dyn Write>,
) -> Result<(), AppError> {
    let stream = source::load_archive(path, format)?;

    let tally = match trace {
        Some(sink) => aggregate::RollTally::with_trace(move |sighting| {
            // the trace is best-effort; a closed stderr must not fail the run
            let _ = writeln!(sink, "{sighting}");
        }),
        None => aggregate::RollTally::new(),
    };
    let players = aggregate::collect_with(tally, stream)?;

    view::write_report(out, &players)?;
    Ok(())
}
