//! PGN reading utilities — streaming main-line reader built on pgn-reader.

use std::io::{self, Read};
use std::ops::ControlFlow;

use pgn_reader::{RawTag, Reader, SanPlus, Skip, Visitor};
use shakmaty::{fen::Fen, CastlingMode, Chess};
use thiserror::Error;

use crate::game_data::{GameMetadata, MainLine};

#[derive(Error, Debug)]
pub enum PgnError {
    #[error("I/O error while reading PGN: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid FEN tag {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },
}

/// Tags collected during header parsing.
#[derive(Default)]
struct GameTags {
    metadata: GameMetadata,
    fen: Option<String>,
}

/// Visitor that keeps the main line of each game and drops everything else.
struct MainLineVisitor;

impl MainLineVisitor {
    fn start_position(fen: Option<&str>) -> Result<Chess, PgnError> {
        let Some(fen) = fen else {
            return Ok(Chess::default());
        };

        let invalid = |reason: String| PgnError::InvalidFen {
            fen: fen.to_string(),
            reason,
        };

        let setup = Fen::from_ascii(fen.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        setup
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(e.to_string()))
    }
}

impl Visitor for MainLineVisitor {
    type Tags = GameTags;
    type Movetext = MainLine;
    type Output = Result<MainLine, PgnError>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, GameTags> {
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut GameTags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let value = value.decode_utf8_lossy().into_owned();
        match name {
            b"White" => tags.metadata.white = Some(value),
            b"Black" => tags.metadata.black = Some(value),
            b"Event" => tags.metadata.event = Some(value),
            b"Result" => tags.metadata.result = Some(value),
            b"FEN" => tags.fen = Some(value),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: GameTags) -> ControlFlow<Self::Output, MainLine> {
        match Self::start_position(tags.fen.as_deref()) {
            Ok(start) => ControlFlow::Continue(MainLine {
                metadata: tags.metadata,
                start,
                moves: Vec::new(),
            }),
            Err(e) => ControlFlow::Break(Err(e)),
        }
    }

    fn begin_variation(&mut self, _: &mut MainLine) -> ControlFlow<Self::Output, Skip> {
        // Main line only: never descend into alternatives.
        ControlFlow::Continue(Skip(true))
    }

    fn san(&mut self, game: &mut MainLine, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        game.moves.push(san_plus);
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, game: MainLine) -> Self::Output {
        Ok(game)
    }
}

/// Reads consecutive games from a PGN stream, yielding only their main lines.
///
/// Alternative variations are skipped by contract. Callers get a linear move
/// sequence per game and never need to pick a branch.
pub struct MainLineReader<R> {
    reader: Reader<R>,
    visitor: MainLineVisitor,
}

impl<R: Read> MainLineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Reader::new(reader),
            visitor: MainLineVisitor,
        }
    }

    /// Next game in the stream, or `None` once the input is exhausted.
    pub fn next_game(&mut self) -> Result<Option<MainLine>, PgnError> {
        match self.reader.read_game(&mut self.visitor)? {
            Some(game) => game.map(Some),
            None => Ok(None),
        }
    }
}

impl<R: Read> Iterator for MainLineReader<R> {
    type Item = Result<MainLine, PgnError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_game().transpose()
    }
}

/// Parse every game in an in-memory PGN string.
pub fn parse_main_lines(pgn: &str) -> Result<Vec<MainLine>, PgnError> {
    MainLineReader::new(pgn.as_bytes()).collect()
}
