//! Snapshot tests for terminal output

#[cfg(test)]
mod snapshot_tests {
    use crate::{banner_lines, ReplCommand};
    use insta::assert_debug_snapshot;

    #[test]
    fn test_banner_frame() {
        let banner = banner_lines(60).join("\n");
        assert!(banner.starts_with("┌"));
        assert!(banner.contains("Lectern - Lecture Notes Assistant"));
        assert!(banner.ends_with("┘"));
    }

    #[test]
    fn test_repl_commands_snapshot() {
        let commands: Vec<ReplCommand> = ["", "help", "stats", "quit", "What is a star?"]
            .iter()
            .map(|line| ReplCommand::parse(line))
            .collect();

        assert_debug_snapshot!(commands, @r###"
        [
            Empty,
            Help,
            Stats,
            Exit,
            Ask(
                "What is a star?",
            ),
        ]
        "###);
    }
}
