//! JSON parser for exported chat archives.
//!
//! This module provides pure decoding functions: a whole message stream from
//! any byte reader, and the serialized roll result embedded in the content of
//! `rollresult`-type messages.

use crate::model::{MsgStream, ParseError, RollResult};
use std::io::{BufReader, Read};

/// Decode a full message stream from a reader.
///
/// The reader is consumed incrementally; the decoded stream is fully
/// materialized before returning.
///
/// # Errors
///
/// Returns `ParseError::InvalidJson` if the bytes are not JSON of the shape
/// `[{"key": {message}, ...}, ...]`, or if the reader itself fails.
pub fn parse_stream<R: Read>(reader: R) -> Result<MsgStream, ParseError> {
    serde_json::from_reader(BufReader::new(reader)).map_err(|e| ParseError::InvalidJson {
        message: e.to_string(),
    })
}

/// Decode a full message stream from an in-memory string.
///
/// # Errors
///
/// Same as [`parse_stream`].
pub fn parse_stream_str(raw: &str) -> Result<MsgStream, ParseError> {
    serde_json::from_str(raw).map_err(|e| ParseError::InvalidJson {
        message: e.to_string(),
    })
}

/// Decode the roll result serialized inside a message's `content` field.
///
/// # Arguments
///
/// * `content` - The message's content text
/// * `message_type` - The message's type tag, for error reporting
///
/// # Errors
///
/// Returns `ParseError::MalformedEmbeddedRoll` if `content` is not a
/// serialized roll result.
pub fn parse_embedded_roll(content: &str, message_type: &str) -> Result<RollResult, ParseError> {
    serde_json::from_str(content).map_err(|e| ParseError::MalformedEmbeddedRoll {
        message_type: message_type.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_BATCHES: &str = r#"[
        {
            "-M1": {".priority": 1000.0, "type": "general", "playerid": "p1", "who": "Ann", "content": "hi"},
            "-M2": {".priority": 2000.0, "type": "rollresult", "playerid": "p1", "who": "",
                    "origRoll": "1d20", "avatar": false,
                    "content": "{\"type\":\"V\",\"rolls\":[{\"type\":\"R\",\"dice\":1,\"sides\":20,\"results\":[{\"v\":9}]}]}"}
        },
        {
            "-M3": {".priority": 3000.0, "type": "general", "playerid": "p2", "who": "Bo",
                    "inlinerolls": [{"expression": "1d20", "signature": false, "rollid": "-R1",
                                     "results": {"type": "V", "total": 4,
                                                 "rolls": [{"type": "R", "dice": 1, "sides": 20, "results": [{"v": 4}]}]}}]}
        }
    ]"#;

    #[test]
    fn parse_stream_decodes_batches_and_messages() {
        let stream = parse_stream(TWO_BATCHES.as_bytes()).unwrap();
        assert_eq!(stream.len(), 2);
        assert_eq!(stream[0].len(), 2);
        assert_eq!(stream[1].len(), 1);
        assert_eq!(stream[0]["-M1"].who, "Ann");
        assert_eq!(stream[1]["-M3"].inline_rolls().len(), 1);
    }

    #[test]
    fn batch_keys_iterate_in_sorted_order() {
        let stream = parse_stream_str(r#"[{"b": {}, "a": {}, "c": {}}]"#).unwrap();
        let keys: Vec<_> = stream[0].keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn parse_stream_str_matches_reader_form() {
        let from_str = parse_stream_str(TWO_BATCHES).unwrap();
        let from_reader = parse_stream(TWO_BATCHES.as_bytes()).unwrap();
        assert_eq!(from_str.len(), from_reader.len());
        assert_eq!(from_str[0]["-M2"].content, from_reader[0]["-M2"].content);
    }

    #[test]
    fn empty_archive_is_valid() {
        assert!(parse_stream_str("[]").unwrap().is_empty());
    }

    #[test]
    fn non_array_root_is_rejected() {
        let err = parse_stream_str(r#"{"-M1": {}}"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson { .. }));
    }

    #[test]
    fn truncated_json_is_rejected() {
        let err = parse_stream(&b"[{\"-M1\": {\"type\":"[..]).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    fn embedded_roll_decodes() {
        let rr = parse_embedded_roll(
            r#"{"type":"V","resultType":"sum","total":21,"rolls":[{"type":"R","dice":1,"sides":20,"results":[{"v":16}]},{"type":"M","expr":"+5"}]}"#,
            "rollresult",
        )
        .unwrap();
        assert_eq!(rr.total, 21.0);
        assert_eq!(rr.rolls.len(), 2);
    }

    #[test]
    fn embedded_roll_error_names_message_type() {
        let err = parse_embedded_roll("rolling 1d20...", "gmrollresult").unwrap_err();
        match err {
            ParseError::MalformedEmbeddedRoll {
                message_type,
                message,
            } => {
                assert_eq!(message_type, "gmrollresult");
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn embedded_roll_rejects_wrong_shape() {
        assert!(parse_embedded_roll(r#"{"rolls": 5}"#, "rollresult").is_err());
    }
}
