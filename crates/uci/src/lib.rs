//! UCI (Universal Chess Interface) protocol library.
//!
//! Parses the GUI's commands and formats the engine's replies. Knows
//! nothing about chess rules: moves and FENs travel as text.
//!
//! # Supported commands
//!
//! - `uci` - Initialize engine, get id
//! - `isready` / `readyok` - Synchronization
//! - `ucinewgame` - Start of a new game
//! - `position startpos|fen <fen> [moves <move>...]` - Set position
//! - `go [movetime <ms>] [depth <d>]` - Start search
//! - `stop` - Stop search
//! - `quit` - Exit engine

mod command;
mod info;

pub use command::{GoOptions, GuiCommand};
pub use info::{EngineInfo, InfoBuilder, Score};

use std::io::{BufRead, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UciError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Messages sent from engine to GUI.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// Engine identification.
    Id { name: Option<String>, author: Option<String> },
    UciOk,
    ReadyOk,
    Info(EngineInfo),
    /// Best move found, `0000` when there is none.
    BestMove { mv: String, ponder: Option<String> },
}

impl EngineMessage {
    /// Format message for output. May span several lines.
    pub fn to_uci(&self) -> String {
        match self {
            EngineMessage::Id { name, author } => {
                let mut parts = Vec::new();
                if let Some(n) = name {
                    parts.push(format!("id name {}", n));
                }
                if let Some(a) = author {
                    parts.push(format!("id author {}", a));
                }
                parts.join("\n")
            }
            EngineMessage::UciOk => "uciok".to_string(),
            EngineMessage::ReadyOk => "readyok".to_string(),
            EngineMessage::Info(info) => info.to_uci(),
            EngineMessage::BestMove { mv, ponder } => match ponder {
                Some(p) => format!("bestmove {} ponder {}", mv, p),
                None => format!("bestmove {}", mv),
            },
        }
    }
}

/// Line reader and writer for one engine session.
pub struct UciEngine<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> UciEngine<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Read and parse the next command from the GUI.
    ///
    /// End of input reads as [`GuiCommand::Quit`].
    pub fn read_command(&mut self) -> Result<GuiCommand, UciError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            tracing::debug!("input closed");
            return Ok(GuiCommand::Quit);
        }
        tracing::trace!(line = line.trim_end(), "received");
        GuiCommand::parse(&line)
    }

    /// Send a message to the GUI.
    pub fn send(&mut self, msg: &EngineMessage) -> Result<(), UciError> {
        let text = msg.to_uci();
        tracing::trace!(%text, "sending");
        writeln!(self.writer, "{}", text)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn send_id(&mut self, name: &str, author: &str) -> Result<(), UciError> {
        self.send(&EngineMessage::Id {
            name: Some(name.to_string()),
            author: Some(author.to_string()),
        })
    }

    pub fn send_uciok(&mut self) -> Result<(), UciError> {
        self.send(&EngineMessage::UciOk)
    }

    pub fn send_readyok(&mut self) -> Result<(), UciError> {
        self.send(&EngineMessage::ReadyOk)
    }

    pub fn send_bestmove(&mut self, mv: &str) -> Result<(), UciError> {
        self.send(&EngineMessage::BestMove {
            mv: mv.to_string(),
            ponder: None,
        })
    }

    pub fn send_info(&mut self, info: EngineInfo) -> Result<(), UciError> {
        self.send(&EngineMessage::Info(info))
    }

    /// Consumes the engine, returning the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

/// Create a UCI engine using stdin/stdout.
pub fn stdio_engine() -> UciEngine<std::io::BufReader<std::io::Stdin>, std::io::Stdout> {
    UciEngine::new(
        std::io::BufReader::new(std::io::stdin()),
        std::io::stdout(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn engine(input: &str) -> UciEngine<Cursor<Vec<u8>>, Vec<u8>> {
        UciEngine::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn reads_commands_then_quit_at_eof() {
        let mut engine = engine("uci\nposition startpos moves e2e4\n");
        assert_eq!(engine.read_command().unwrap(), GuiCommand::Uci);
        assert!(matches!(engine.read_command().unwrap(), GuiCommand::Position { .. }));
        assert_eq!(engine.read_command().unwrap(), GuiCommand::Quit);
        assert_eq!(engine.read_command().unwrap(), GuiCommand::Quit);
    }

    #[test]
    fn writes_replies_one_per_line() {
        let mut engine = engine("");
        engine.send_id("Hybrid", "Someone").unwrap();
        engine.send_uciok().unwrap();
        engine.send_readyok().unwrap();
        engine.send_info(InfoBuilder::new().depth(1).score_cp(5).build()).unwrap();
        engine.send_bestmove("0000").unwrap();

        let out = String::from_utf8(engine.into_writer()).unwrap();
        assert_eq!(
            out,
            "id name Hybrid\nid author Someone\nuciok\nreadyok\ninfo depth 1 score cp 5\nbestmove 0000\n"
        );
    }

    #[test]
    fn bestmove_with_ponder() {
        let msg = EngineMessage::BestMove {
            mv: "e2e4".to_string(),
            ponder: Some("e7e5".to_string()),
        };
        assert_eq!(msg.to_uci(), "bestmove e2e4 ponder e7e5");
    }
}
