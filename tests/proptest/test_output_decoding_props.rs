//! Property-based tests for output decoding and update classification

use barked_bridge::bridge::Utf8ChunkDecoder;
use barked_bridge::models::{UpdateOutcome, RELAUNCH_SENTINEL, UP_TO_DATE_MARKER};
use proptest::prelude::*;

fn decode_in_chunks(bytes: &[u8], cuts: &[usize]) -> String {
    let mut points: Vec<usize> = cuts.iter().map(|c| c % (bytes.len() + 1)).collect();
    points.sort_unstable();

    let mut decoder = Utf8ChunkDecoder::new();
    let mut text = String::new();
    let mut start = 0;
    for point in points {
        text.push_str(&decoder.push(&bytes[start..point]));
        start = point;
    }
    text.push_str(&decoder.push(&bytes[start..]));
    text.push_str(&decoder.finish());
    text
}

proptest! {
    #[test]
    fn test_valid_utf8_survives_any_split(
        s in "\\PC{0,64}",
        cuts in prop::collection::vec(any::<usize>(), 0..8),
    ) {
        prop_assert_eq!(decode_in_chunks(s.as_bytes(), &cuts), s);
    }

    #[test]
    fn test_arbitrary_bytes_match_lossy_decoding(
        bytes in prop::collection::vec(any::<u8>(), 0..128),
    ) {
        let whole = String::from_utf8_lossy(&bytes).into_owned();
        prop_assert_eq!(decode_in_chunks(&bytes, &[]), whole);
    }

    #[test]
    fn test_pending_never_exceeds_one_partial_char(
        bytes in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut decoder = Utf8ChunkDecoder::new();
        for byte in &bytes {
            let _ = decoder.push(std::slice::from_ref(byte));
            prop_assert!(decoder.pending_len() < 4);
        }
    }

    #[test]
    fn test_sentinel_always_means_relaunch(
        before in "\\PC{0,40}",
        after in "\\PC{0,40}",
    ) {
        let output = format!("{}{}{}", before, RELAUNCH_SENTINEL, after);
        prop_assert_eq!(UpdateOutcome::classify(&output), UpdateOutcome::Relaunch);
    }

    #[test]
    fn test_output_without_markers_is_failure(s in "[a-z \\n]{0,80}") {
        prop_assume!(!s.contains(UP_TO_DATE_MARKER) && !s.contains(RELAUNCH_SENTINEL));
        prop_assert_eq!(UpdateOutcome::classify(&s), UpdateOutcome::Failed);
    }

    #[test]
    fn test_up_to_date_without_sentinel(prefix in "[a-z ]{0,20}") {
        let output = format!("{}{}\n", prefix, UP_TO_DATE_MARKER);
        prop_assert_eq!(UpdateOutcome::classify(&output), UpdateOutcome::UpToDate);
    }
}
