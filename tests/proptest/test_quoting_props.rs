//! Property-based tests for command-line quoting

use barked_bridge::bridge::quoting::{applescript_string, command_line, quote_arg};
use barked_bridge::models::catalog::join_ids;
use barked_bridge::models::{CleanCategory, HardenModule};
use proptest::prelude::*;
use std::process::Command;

/// Ask a real shell to print each argument of the quoted line on its own
/// delimited field
fn shell_echo(args: &[String]) -> String {
    let line = format!("printf '<%s>' {}", command_line(args));
    let output = Command::new("/bin/sh").arg("-c").arg(&line).output().unwrap();
    String::from_utf8(output.stdout).unwrap()
}

proptest! {
    #[test]
    fn test_quote_arg_is_single_quoted(s in "\\PC*") {
        let quoted = quote_arg(&s);
        prop_assert!(quoted.starts_with('\''));
        prop_assert!(quoted.ends_with('\''));
        prop_assert!(quoted.len() >= s.len() + 2);
    }

    #[test]
    fn test_plain_arguments_are_only_wrapped(s in "[a-zA-Z0-9_./,=-]{0,30}") {
        prop_assert_eq!(quote_arg(&s), format!("'{}'", s));
    }

    #[test]
    fn test_command_line_has_one_word_per_part(
        parts in prop::collection::vec("[a-z]{1,8}", 0..6),
    ) {
        let line = command_line(&parts);
        let words: Vec<&str> = if line.is_empty() { vec![] } else { line.split(' ').collect() };
        prop_assert_eq!(words.len(), parts.len());
    }

    #[test]
    fn test_applescript_string_has_no_bare_quotes(s in "\\PC*") {
        let escaped = applescript_string(&s);
        let inner = &escaped[1..escaped.len() - 1];
        let mut chars = inner.chars();
        while let Some(ch) = chars.next() {
            if ch == '\\' {
                let next = chars.next();
                prop_assert!(matches!(next, Some('\\') | Some('"')));
            } else {
                prop_assert_ne!(ch, '"');
            }
        }
    }

    #[test]
    fn test_clean_ids_follow_catalog_order(
        picks in prop::collection::vec(0usize..7, 0..10),
    ) {
        let selected: Vec<CleanCategory> = picks.iter().map(|&i| CleanCategory::ALL[i]).collect();
        let joined = join_ids(&selected, &CleanCategory::ALL, CleanCategory::id);

        let positions: Vec<usize> = if joined.is_empty() {
            vec![]
        } else {
            joined
                .split(',')
                .map(|id| {
                    let category = CleanCategory::from_id(id).unwrap();
                    CleanCategory::ALL.iter().position(|c| *c == category).unwrap()
                })
                .collect()
        };
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let mut unique = picks.clone();
        unique.sort_unstable();
        unique.dedup();
        prop_assert_eq!(positions, unique);
    }

    #[test]
    fn test_module_ids_are_unique_in_output(
        picks in prop::collection::vec(0usize..28, 1..40),
    ) {
        let selected: Vec<HardenModule> = picks.iter().map(|&i| HardenModule::ALL[i]).collect();
        let joined = join_ids(&selected, &HardenModule::ALL, HardenModule::id);
        let ids: Vec<&str> = joined.split(',').collect();
        let mut deduped = ids.clone();
        deduped.sort_unstable();
        deduped.dedup();
        prop_assert_eq!(ids.len(), deduped.len());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_shell_reads_back_every_argument(
        args in prop::collection::vec("[ -~]{0,12}", 1..4),
    ) {
        let expected: String = args.iter().map(|a| format!("<{}>", a)).collect();
        prop_assert_eq!(shell_echo(&args), expected);
    }
}
