//! `info` lines reported while searching.

use std::fmt;

/// Score in centipawns or mate distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawn score (100 = 1 pawn advantage).
    Cp(i32),
    /// Mate in N moves (positive = engine mates, negative = engine is mated).
    Mate(i32),
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Cp(cp) => write!(f, "cp {}", cp),
            Score::Mate(moves) => write!(f, "mate {}", moves),
        }
    }
}

/// Search information from the engine. Unset fields are left out of the line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineInfo {
    /// Search depth in plies.
    pub depth: Option<u32>,
    pub score: Option<Score>,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
    /// Time spent in milliseconds.
    pub time: Option<u64>,
    /// Hash table usage (per mille).
    pub hashfull: Option<u32>,
    /// Principal variation in UCI move notation.
    pub pv: Vec<String>,
    /// Free text; always printed last since it runs to the end of the line.
    pub string: Option<String>,
}

impl EngineInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format as a UCI `info` line.
    pub fn to_uci(&self) -> String {
        let mut parts = vec!["info".to_string()];

        if let Some(d) = self.depth {
            parts.push(format!("depth {}", d));
        }
        if let Some(s) = self.score {
            parts.push(format!("score {}", s));
        }
        if let Some(n) = self.nodes {
            parts.push(format!("nodes {}", n));
        }
        if let Some(n) = self.nps {
            parts.push(format!("nps {}", n));
        }
        if let Some(t) = self.time {
            parts.push(format!("time {}", t));
        }
        if let Some(h) = self.hashfull {
            parts.push(format!("hashfull {}", h));
        }
        if !self.pv.is_empty() {
            parts.push(format!("pv {}", self.pv.join(" ")));
        }
        if let Some(ref s) = self.string {
            parts.push(format!("string {}", s));
        }

        parts.join(" ")
    }

    /// Parse a UCI `info` line. Returns `None` if the line is not one.
    pub fn parse(line: &str) -> Option<Self> {
        fn value<'a, T: std::str::FromStr>(parts: &mut std::iter::Peekable<impl Iterator<Item = &'a str>>) -> Option<T> {
            parts.next().and_then(|v| v.parse().ok())
        }

        let mut parts = line.split_whitespace().peekable();
        if parts.next() != Some("info") {
            return None;
        }

        let mut info = EngineInfo::new();
        while let Some(token) = parts.next() {
            match token {
                "depth" => info.depth = value(&mut parts),
                "nodes" => info.nodes = value(&mut parts),
                "nps" => info.nps = value(&mut parts),
                "time" => info.time = value(&mut parts),
                "hashfull" => info.hashfull = value(&mut parts),
                "score" => {
                    info.score = match parts.next() {
                        Some("cp") => value(&mut parts).map(Score::Cp),
                        Some("mate") => value(&mut parts).map(Score::Mate),
                        _ => None,
                    }
                }
                "pv" => {
                    while let Some(mv) = parts.next_if(|p| !is_info_keyword(p)) {
                        info.pv.push(mv.to_string());
                    }
                }
                "string" => {
                    info.string = Some(parts.by_ref().collect::<Vec<_>>().join(" "));
                }
                _ => {}
            }
        }

        Some(info)
    }
}

fn is_info_keyword(s: &str) -> bool {
    matches!(
        s,
        "depth" | "score" | "nodes" | "nps" | "time" | "hashfull" | "pv" | "string"
    )
}

/// Builder for [`EngineInfo`].
#[derive(Default)]
pub struct InfoBuilder {
    info: EngineInfo,
}

impl InfoBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(mut self, d: u32) -> Self {
        self.info.depth = Some(d);
        self
    }

    pub fn score(mut self, score: Score) -> Self {
        self.info.score = Some(score);
        self
    }

    pub fn score_cp(self, cp: i32) -> Self {
        self.score(Score::Cp(cp))
    }

    pub fn score_mate(self, moves: i32) -> Self {
        self.score(Score::Mate(moves))
    }

    pub fn nodes(mut self, n: u64) -> Self {
        self.info.nodes = Some(n);
        self
    }

    pub fn nps(mut self, n: u64) -> Self {
        self.info.nps = Some(n);
        self
    }

    pub fn time(mut self, ms: u64) -> Self {
        self.info.time = Some(ms);
        self
    }

    pub fn hashfull(mut self, permille: u32) -> Self {
        self.info.hashfull = Some(permille);
        self
    }

    pub fn pv(mut self, moves: Vec<String>) -> Self {
        self.info.pv = moves;
        self
    }

    pub fn string(mut self, s: &str) -> Self {
        self.info.string = Some(s.to_string());
        self
    }

    pub fn build(self) -> EngineInfo {
        self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_to_uci() {
        let info = InfoBuilder::new()
            .depth(10)
            .score_cp(35)
            .nodes(50000)
            .time(120)
            .hashfull(12)
            .pv(vec!["e2e4".to_string(), "e7e5".to_string()])
            .build();

        assert_eq!(
            info.to_uci(),
            "info depth 10 score cp 35 nodes 50000 time 120 hashfull 12 pv e2e4 e7e5"
        );
    }

    #[test]
    fn empty_info_is_just_the_keyword() {
        assert_eq!(EngineInfo::new().to_uci(), "info");
    }

    #[test]
    fn parse_info() {
        let line = "info depth 12 score cp 30 nodes 125000 nps 500000 pv e2e4 e7e5 g1f3 hashfull 7";
        let info = EngineInfo::parse(line).unwrap();

        assert_eq!(info.depth, Some(12));
        assert_eq!(info.score, Some(Score::Cp(30)));
        assert_eq!(info.nodes, Some(125000));
        assert_eq!(info.nps, Some(500000));
        assert_eq!(info.pv, vec!["e2e4", "e7e5", "g1f3"]);
        assert_eq!(info.hashfull, Some(7));
    }

    #[test]
    fn parse_mate_and_string() {
        let info = EngineInfo::parse("info depth 1 score mate -2 string mcts 1500 iterations").unwrap();
        assert_eq!(info.score, Some(Score::Mate(-2)));
        assert_eq!(info.string.as_deref(), Some("mcts 1500 iterations"));
        assert!(EngineInfo::parse("bestmove e2e4").is_none());
    }

    #[test]
    fn builder_output_parses_back() {
        let info = InfoBuilder::new()
            .depth(3)
            .score_mate(2)
            .nodes(812)
            .pv(vec!["h1h8".to_string()])
            .string("rook mate")
            .build();
        assert_eq!(EngineInfo::parse(&info.to_uci()), Some(info));
    }
}
