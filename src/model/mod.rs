//! Domain model types (pure).
//!
//! The record model decodes the third-party chat export as-is and contains
//! its loosely-typed fields at this boundary; the statistics engine works on
//! plain integers and instants.

pub mod error;
pub mod message;
pub mod roll;
pub mod stats;
pub mod value;

// Re-export for convenience
pub use error::{AppError, InputError, ParseError};
pub use message::{InlineRoll, Message, MsgBatch, MsgStream, EMBEDDED_ROLL_TYPES};
pub use roll::{
    CustomCritMod, DiceResult, KeepMod, Mods, Roll, RollExpression, RollResult, D20_SIDES,
};
pub use stats::{DatedResult, StatBlock};
pub use value::MaybeText;
