//! Stockfish engine wrapper using UCI protocol (async I/O)

use shakmaty::fen::Fen;
use shakmaty::{Chess, EnPassantMode, Position};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use tracing::{debug, info};

use crate::engine::PositionEvaluator;
use crate::error::AccuracyError;
use crate::score::EngineScore;

/// Options applied once at startup
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Search threads inside the engine
    pub threads: u32,
    /// Transposition table size in MB
    pub hash_mb: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            hash_mb: 256,
        }
    }
}

/// Raw score from an `info` line, relative to the side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UciScore {
    Cp(i32),
    Mate(i32),
}

/// UCI conversation over any line-oriented byte stream pair
pub struct UciEngine<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> UciEngine<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// `uci` handshake, apply options and wait until the engine is ready
    pub async fn handshake(&mut self, options: &EngineOptions) -> Result<(), AccuracyError> {
        self.send("uci").await?;
        self.wait_for("uciok").await?;

        self.send(&format!("setoption name Threads value {}", options.threads))
            .await?;
        self.send(&format!("setoption name Hash value {}", options.hash_mb))
            .await?;
        self.send("setoption name UCI_AnalyseMode value true").await?;
        self.send("isready").await?;
        self.wait_for("readyok").await
    }

    /// Send a command to the engine
    async fn send(&mut self, cmd: &str) -> Result<(), AccuracyError> {
        debug!(cmd, "SF <");
        self.writer
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| AccuracyError::Engine(format!("Failed to write to engine: {e}")))?;
        self.writer
            .flush()
            .await
            .map_err(|e| AccuracyError::Engine(format!("Failed to flush stdin: {e}")))?;
        Ok(())
    }

    /// Read one line, treating EOF as a crashed engine
    async fn read_line(&mut self, line: &mut String) -> Result<(), AccuracyError> {
        line.clear();
        let n = self
            .reader
            .read_line(line)
            .await
            .map_err(|e| AccuracyError::Engine(format!("Failed to read from engine: {e}")))?;
        if n == 0 {
            return Err(AccuracyError::Engine("Engine closed its output".into()));
        }
        debug!(line = line.trim(), "SF >");
        Ok(())
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), AccuracyError> {
        let mut line = String::new();
        loop {
            self.read_line(&mut line).await?;
            if line.trim() == expected {
                return Ok(());
            }
        }
    }

    /// Search a position to a fixed depth and return the final score
    pub async fn analyse(&mut self, fen: &str, depth: u32) -> Result<UciScore, AccuracyError> {
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go depth {depth}")).await?;

        let mut score = None;
        let mut line = String::new();
        loop {
            self.read_line(&mut line).await?;
            let trimmed = line.trim();

            if trimmed.starts_with("bestmove") {
                break;
            }
            if let Some(parsed) = parse_score(trimmed) {
                score = Some(parsed);
            }
        }

        score.ok_or_else(|| AccuracyError::Engine(format!("No score reported for {fen}")))
    }
}

impl<R, W> PositionEvaluator for UciEngine<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn new_game(&mut self) -> Result<(), AccuracyError> {
        self.send("ucinewgame").await?;
        self.send("isready").await?;
        self.wait_for("readyok").await
    }

    async fn evaluate(&mut self, position: &Chess, depth: u32) -> Result<EngineScore, AccuracyError> {
        let fen = Fen::from_position(position, EnPassantMode::Legal).to_string();
        let turn = position.turn();
        Ok(match self.analyse(&fen, depth).await? {
            UciScore::Cp(cp) => EngineScore::from_relative_cp(cp, turn),
            UciScore::Mate(mate) => EngineScore::from_relative_mate(mate, turn),
        })
    }
}

/// Stockfish engine instance
pub struct StockfishEngine {
    process: Child,
    uci: UciEngine<BufReader<ChildStdout>, ChildStdin>,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process, initialize UCI and apply options
    pub async fn new(path: &str, options: &EngineOptions) -> Result<Self, AccuracyError> {
        let mut process = Command::new(path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|e| AccuracyError::Engine(format!("Failed to spawn {path}: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| AccuracyError::Engine("Engine stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| AccuracyError::Engine("Engine stdout unavailable".into()))?;

        let mut engine = Self {
            process,
            uci: UciEngine::new(stdout, stdin),
        };
        engine.uci.handshake(options).await?;

        info!(path, threads = options.threads, hash_mb = options.hash_mb, "Engine ready");
        Ok(engine)
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(&mut self) {
        let _ = self.uci.send("quit").await;
        let _ = self.process.wait().await;
    }
}

impl PositionEvaluator for StockfishEngine {
    async fn new_game(&mut self) -> Result<(), AccuracyError> {
        self.uci.new_game().await
    }

    async fn evaluate(&mut self, position: &Chess, depth: u32) -> Result<EngineScore, AccuracyError> {
        self.uci.evaluate(position, depth).await
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}

/// Parse the score of an `info` line, if it carries one
fn parse_score(line: &str) -> Option<UciScore> {
    if !line.starts_with("info") || line.starts_with("info string") {
        return None;
    }
    if let Some(cp) = parse_cp(line) {
        return Some(UciScore::Cp(cp));
    }
    parse_mate(line).map(UciScore::Mate)
}

/// Parse centipawn score from info line
fn parse_cp(line: &str) -> Option<i32> {
    parse_after(line, "cp")
}

/// Parse mate score from info line
fn parse_mate(line: &str) -> Option<i32> {
    parse_after(line, "mate")
}

fn parse_after(line: &str, keyword: &str) -> Option<i32> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    for (i, part) in parts.iter().enumerate() {
        if *part == keyword && i + 1 < parts.len() {
            return parts[i + 1].parse().ok();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cp() {
        let line = "info depth 20 seldepth 25 multipv 1 score cp 35 nodes 100000 pv e2e4";
        assert_eq!(parse_cp(line), Some(35));
        assert_eq!(parse_score(line), Some(UciScore::Cp(35)));
    }

    #[test]
    fn test_parse_mate() {
        let line = "info depth 20 score mate -3 nodes 100000 pv e2e4";
        assert_eq!(parse_mate(line), Some(-3));
        assert_eq!(parse_score(line), Some(UciScore::Mate(-3)));
    }

    #[test]
    fn test_parse_terminal_position() {
        // Stockfish reports mate 0 without a pv when the side to move is mated
        assert_eq!(parse_score("info depth 0 score mate 0"), Some(UciScore::Mate(0)));
        assert_eq!(parse_score("info depth 0 score cp 0"), Some(UciScore::Cp(0)));
    }

    #[test]
    fn test_parse_score_ignores_other_lines() {
        assert_eq!(parse_score("info string NNUE evaluation using nn.nnue"), None);
        assert_eq!(parse_score("info depth 1 currmove e2e4 currmovenumber 1"), None);
        assert_eq!(parse_score("bestmove e2e4 ponder e7e5"), None);
    }

    /// Engine fed from a canned transcript; commands are captured in `writer`
    fn scripted(output: &'static str) -> UciEngine<&'static [u8], Vec<u8>> {
        UciEngine::new(output.as_bytes(), Vec::new())
    }

    fn sent(engine: &UciEngine<&'static [u8], Vec<u8>>) -> String {
        String::from_utf8_lossy(&engine.writer).into_owned()
    }

    fn after_e4() -> Chess {
        let mv = "e4"
            .parse::<shakmaty::san::San>()
            .unwrap()
            .to_move(&Chess::default())
            .unwrap();
        Chess::default().play(mv).unwrap()
    }

    #[tokio::test]
    async fn test_handshake_applies_options() {
        let mut engine = scripted("id name Scripted\nuciok\nreadyok\n");
        let options = EngineOptions {
            threads: 3,
            hash_mb: 64,
        };
        engine.handshake(&options).await.unwrap();

        let sent = sent(&engine);
        assert!(sent.starts_with("uci\n"));
        assert!(sent.contains("setoption name Threads value 3\n"));
        assert!(sent.contains("setoption name Hash value 64\n"));
        assert!(sent.ends_with("isready\n"));
    }

    #[tokio::test]
    async fn test_evaluate_converts_to_white_pov() {
        // Black to move after 1. e4; the engine reports from Black's side
        let mut engine = scripted(
            "info depth 1 score cp 10 pv e7e5\n\
             info depth 12 score cp -35 pv e7e5 g1f3\n\
             bestmove e7e5 ponder g1f3\n",
        );
        let score = engine.evaluate(&after_e4(), 12).await.unwrap();
        assert_eq!(score, EngineScore::Centipawns(35));

        let sent = sent(&engine);
        assert!(sent.contains(
            "position fen rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1\n"
        ));
        assert!(sent.contains("go depth 12\n"));
    }

    #[tokio::test]
    async fn test_evaluate_checkmated_side_to_move() {
        // Black to move and already mated
        let mut engine = scripted("info depth 0 score mate 0\nbestmove (none)\n");
        let score = engine.evaluate(&after_e4(), 12).await.unwrap();
        assert_eq!(
            score,
            EngineScore::Mate {
                moves: 0,
                winner: shakmaty::Color::White
            }
        );
        assert_eq!(score.to_centipawns(), 1000);
    }

    #[tokio::test]
    async fn test_search_without_score_is_engine_error() {
        let mut engine = scripted("info depth 1 currmove e7e5\nbestmove e7e5\n");
        let err = engine.evaluate(&after_e4(), 12).await.unwrap_err();
        assert!(matches!(err, AccuracyError::Engine(_)));
    }

    #[tokio::test]
    async fn test_closed_output_is_engine_error() {
        let mut engine = scripted("info depth 5 score cp 20 pv e7e5\n");
        let err = engine.evaluate(&after_e4(), 12).await.unwrap_err();
        assert!(matches!(err, AccuracyError::Engine(ref msg) if msg.contains("closed")));

        let mut engine = scripted("id name Scripted\n");
        let err = engine.handshake(&EngineOptions::default()).await.unwrap_err();
        assert!(matches!(err, AccuracyError::Engine(_)));
    }

    #[tokio::test]
    async fn test_new_game_waits_for_ready() {
        let mut engine = scripted("readyok\n");
        engine.new_game().await.unwrap();
        assert_eq!(sent(&engine), "ucinewgame\nisready\n");
    }

    #[test]
    fn test_engine_options_default() {
        let options = EngineOptions::default();
        assert_eq!(options.threads, 1);
        assert_eq!(options.hash_mb, 256);
    }
}
