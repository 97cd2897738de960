//! Text level format and the built-in levels
//!
//! A level is a string of digits `'0'..='5'` (one [`CollisionType`] per
//! tile), read row by row. The first row of text is the top row of the map.

use super::tilemap::{CollisionType, Tile, TileMap};
use crate::consts::PLAYER_COUNT;
use crate::settings::OutOfBoundsPolicy;

/// Width in tiles of the built-in levels
pub const LEVEL_WIDTH: u32 = 25;

/// Player one's course
const LEVEL_ONE: &str = concat!(
    "0000000000000000000000000",
    "0000000000000000000000000",
    "0000000000000000000000000",
    "0000000000000000000000000",
    "0000000000000000000000000",
    "0000000000000000000000000",
    "0000000000000000011000000",
    "0000000000000000011000000",
    "0000000000000001111000000",
    "0000000000000001111000000",
    "1111111111000111111111111",
    "1111111111000111111111111",
    "1111111111000111111111111",
);

/// Player two's course
const LEVEL_TWO: &str = concat!(
    "0000000000000000000000000",
    "0000000000000000000000000",
    "0000000000000000000000000",
    "0000000000000000000000000",
    "0000000000000000000110000",
    "0000000000000000000110000",
    "0000000000000000000110000",
    "0000000000000000000110000",
    "0000000000000000000110000",
    "0000000000000000000110000",
    "1111111111000111111111111",
    "1111111111000111111111111",
    "1111111111000111111111111",
);

/// One layout per player, indexed by player slot
pub const BUILTIN_LEVELS: [&str; PLAYER_COUNT] = [LEVEL_ONE, LEVEL_TWO];

/// Errors from decoding level text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("level is empty")]
    EmptyLevel,
    #[error("level length {len} is not a multiple of width {width}")]
    LengthMismatch { len: usize, width: u32 },
    #[error("invalid tile {ch:?} at index {index}")]
    InvalidTile { index: usize, ch: char },
}

/// Decode a level string of the given width; height is inferred.
///
/// Whitespace is ignored, so levels can be written one row per line.
pub fn parse_level(
    data: &str,
    width: u32,
    out_of_bounds: OutOfBoundsPolicy,
) -> Result<TileMap, LevelError> {
    let cells: Vec<char> = data.chars().filter(|c| !c.is_whitespace()).collect();

    if cells.is_empty() || width == 0 {
        return Err(LevelError::EmptyLevel);
    }
    if cells.len() % width as usize != 0 {
        return Err(LevelError::LengthMismatch {
            len: cells.len(),
            width,
        });
    }

    let height = (cells.len() / width as usize) as u32;
    let mut map = TileMap::new(width, height, out_of_bounds);

    for (index, &ch) in cells.iter().enumerate() {
        let collision =
            CollisionType::from_digit(ch).ok_or(LevelError::InvalidTile { index, ch })?;
        let x = (index % width as usize) as i32;
        let row = (index / width as usize) as i32;
        let y = height as i32 - 1 - row;
        map.set_tile(x, y, Tile::new(collision));
    }

    log::debug!(
        "Parsed {}x{} level ({} solid tiles)",
        width,
        height,
        map.solid_count()
    );

    Ok(map)
}

/// Inverse of [`parse_level`] (no line breaks)
pub fn encode_level(map: &TileMap) -> String {
    let mut out = String::with_capacity((map.width() * map.height()) as usize);
    for y in (0..map.height()).rev() {
        for x in 0..map.width() {
            out.push(map.tile(x, y).collision.to_digit());
        }
    }
    out
}

/// Decode both shipped levels
pub fn load_builtin_levels(
    out_of_bounds: OutOfBoundsPolicy,
) -> Result<[TileMap; PLAYER_COUNT], LevelError> {
    let first = parse_level(BUILTIN_LEVELS[0], LEVEL_WIDTH, out_of_bounds)?;
    let second = parse_level(BUILTIN_LEVELS[1], LEVEL_WIDTH, out_of_bounds)?;
    log::info!(
        "Loaded built-in levels ({}x{}, out of bounds: {})",
        first.width(),
        first.height(),
        out_of_bounds.as_str()
    );
    Ok([first, second])
}
