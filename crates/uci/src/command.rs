//! Parsing of GUI to engine commands.

use crate::UciError;

/// Commands sent from GUI to engine.
#[derive(Debug, Clone, PartialEq)]
pub enum GuiCommand {
    /// Initialize UCI mode.
    Uci,
    /// Check if engine is ready.
    IsReady,
    /// The next position belongs to a different game.
    UciNewGame,
    /// Set up a position: `fen` is `None` for the start position. Moves are
    /// kept as text; the engine resolves them against the position.
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    /// Start calculating.
    Go(GoOptions),
    /// Stop calculating.
    Stop,
    /// Quit the engine.
    Quit,
    /// Anything else, ignored by the engine.
    Unknown(String),
}

/// Options for the `go` command.
///
/// Values that fail to parse are treated as absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GoOptions {
    /// Search for exactly this time in milliseconds.
    pub movetime: Option<u64>,
    /// Search to this depth.
    pub depth: Option<u32>,
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movestogo: Option<u32>,
    /// Search until `stop`.
    pub infinite: bool,
}

impl GuiCommand {
    /// Parse one line of GUI input.
    pub fn parse(input: &str) -> Result<Self, UciError> {
        let input = input.trim();
        let mut parts = input.split_whitespace();

        match parts.next().unwrap_or("") {
            "uci" => Ok(GuiCommand::Uci),
            "isready" => Ok(GuiCommand::IsReady),
            "ucinewgame" => Ok(GuiCommand::UciNewGame),
            "stop" => Ok(GuiCommand::Stop),
            "quit" => Ok(GuiCommand::Quit),
            "position" => Self::parse_position(parts),
            "go" => Ok(GuiCommand::Go(Self::parse_go(parts))),
            _ => Ok(GuiCommand::Unknown(input.to_string())),
        }
    }

    fn parse_position<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        let fen = match parts.next() {
            Some("startpos") => {
                match parts.next() {
                    None | Some("moves") => {}
                    Some(other) => {
                        return Err(UciError::ParseError(format!(
                            "expected 'moves' after 'startpos', got '{}'",
                            other
                        )))
                    }
                }
                None
            }
            Some("fen") => {
                let fields: Vec<&str> = parts.by_ref().take_while(|part| *part != "moves").collect();
                if fields.is_empty() {
                    return Err(UciError::ParseError("missing FEN after 'fen'".to_string()));
                }
                Some(fields.join(" "))
            }
            Some(other) => {
                return Err(UciError::ParseError(format!(
                    "expected 'startpos' or 'fen', got '{}'",
                    other
                )));
            }
            None => {
                return Err(UciError::ParseError(
                    "expected 'startpos' or 'fen'".to_string(),
                ));
            }
        };

        // Whatever is left follows the `moves` keyword.
        let moves = parts.map(str::to_string).collect();
        Ok(GuiCommand::Position { fen, moves })
    }

    fn parse_go<'a>(mut parts: impl Iterator<Item = &'a str>) -> GoOptions {
        fn value<'a, T: std::str::FromStr>(parts: &mut impl Iterator<Item = &'a str>) -> Option<T> {
            parts.next().and_then(|v| v.parse().ok())
        }

        let mut opts = GoOptions::default();
        while let Some(token) = parts.next() {
            match token {
                "movetime" => opts.movetime = value(&mut parts),
                "depth" => opts.depth = value(&mut parts),
                "wtime" => opts.wtime = value(&mut parts),
                "btime" => opts.btime = value(&mut parts),
                "winc" => opts.winc = value(&mut parts),
                "binc" => opts.binc = value(&mut parts),
                "movestogo" => opts.movestogo = value(&mut parts),
                "infinite" => opts.infinite = true,
                _ => {}
            }
        }
        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn go(line: &str) -> GoOptions {
        match GuiCommand::parse(line).unwrap() {
            GuiCommand::Go(opts) => opts,
            other => panic!("expected go, got {:?}", other),
        }
    }

    #[test]
    fn parse_simple_commands() {
        assert_eq!(GuiCommand::parse("uci").unwrap(), GuiCommand::Uci);
        assert_eq!(GuiCommand::parse("  isready \n").unwrap(), GuiCommand::IsReady);
        assert_eq!(GuiCommand::parse("ucinewgame").unwrap(), GuiCommand::UciNewGame);
        assert_eq!(GuiCommand::parse("stop").unwrap(), GuiCommand::Stop);
        assert_eq!(GuiCommand::parse("quit").unwrap(), GuiCommand::Quit);
    }

    #[test]
    fn unknown_and_blank_lines() {
        assert_eq!(
            GuiCommand::parse("setoption name Hash value 32").unwrap(),
            GuiCommand::Unknown("setoption name Hash value 32".to_string())
        );
        assert_eq!(GuiCommand::parse("").unwrap(), GuiCommand::Unknown(String::new()));
    }

    #[test]
    fn parse_position_startpos() {
        assert_eq!(
            GuiCommand::parse("position startpos").unwrap(),
            GuiCommand::Position {
                fen: None,
                moves: vec![]
            }
        );
        assert_eq!(
            GuiCommand::parse("position startpos moves e2e4 e7e5").unwrap(),
            GuiCommand::Position {
                fen: None,
                moves: vec!["e2e4".to_string(), "e7e5".to_string()]
            }
        );
    }

    #[test]
    fn parse_position_fen_with_moves() {
        let cmd = GuiCommand::parse(
            "position fen rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1 moves c7c5 g1f3",
        )
        .unwrap();
        assert_eq!(
            cmd,
            GuiCommand::Position {
                fen: Some("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1".to_string()),
                moves: vec!["c7c5".to_string(), "g1f3".to_string()]
            }
        );
    }

    #[test]
    fn malformed_position_is_an_error() {
        assert!(GuiCommand::parse("position").is_err());
        assert!(GuiCommand::parse("position fen").is_err());
        assert!(GuiCommand::parse("position fen moves e2e4").is_err());
        assert!(GuiCommand::parse("position somewhere").is_err());
        assert!(GuiCommand::parse("position startpos e2e4").is_err());
    }

    #[test]
    fn parse_go_limits() {
        assert_eq!(go("go movetime 1000").movetime, Some(1000));
        assert_eq!(go("go depth 10").depth, Some(10));
        assert!(go("go infinite").infinite);

        let opts = go("go wtime 60000 btime 55000 winc 1000 binc 1000 movestogo 20");
        assert_eq!(opts.wtime, Some(60000));
        assert_eq!(opts.btime, Some(55000));
        assert_eq!(opts.winc, Some(1000));
        assert_eq!(opts.binc, Some(1000));
        assert_eq!(opts.movestogo, Some(20));
        assert_eq!(opts.movetime, None);
    }

    #[test]
    fn bad_go_values_are_ignored() {
        let opts = go("go depth many movetime 250");
        assert_eq!(opts.depth, None);
        assert_eq!(opts.movetime, Some(250));
        assert_eq!(go("go movetime"), GoOptions::default());
    }
}
