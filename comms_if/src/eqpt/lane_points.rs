//! # Lane point batch wire format
//!
//! The simulator reports the points of the current lane as one string of decimal numbers. The
//! characters `{`, `}`, `[`, `]` and `,` are decoration and are treated like whitespace. Once
//! tokenised the batch is laid out as:
//!
//! ```text
//! index:  0       1  2  3    4  5  6   ...  28 29 30   31      32 33 34  ...
//! token:  header  x0 y0 z0   x1 y1 z1  ...  x9 y9 z9   marker  x10 ...
//! ```
//!
//! Token 0 is a header which carries no coordinate. Points are read as `(x, y, z)` triples
//! starting at index 1, and every time the running index lands on a multiple of 31 one extra
//! token is skipped. The simulator frames its batches in records of 31 tokens (a marker followed
//! by ten points), so the skipped token is the marker of the next record. This rule must be kept
//! as is for compatibility with the simulator.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Index of the first coordinate token in a batch.
pub const FIRST_POINT_INDEX: usize = 1;

/// Number of tokens in one record of the batch, including the leading marker.
pub const RECORD_LEN_TOKENS: usize = 31;

/// Number of tokens making up one point.
const POINT_LEN_TOKENS: usize = 3;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised while decoding a lane point batch.
#[derive(Debug, Error, PartialEq)]
pub enum LanePointsError {
    #[error("Batch ends part way through a point: point starts at token {index} of {num_tokens}")]
    Truncated { index: usize, num_tokens: usize },

    #[error("Token {index} (\"{token}\") is not a finite decimal number")]
    InvalidToken { index: usize, token: String },
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Decode a raw lane point batch into an ordered list of `[x, y, z]` points.
///
/// A batch holding only a header (or nothing at all) decodes to an empty list.
pub fn decode(raw: &str) -> Result<Vec<[f64; 3]>, LanePointsError> {
    let tokens = tokenise(raw);
    let num_tokens = tokens.len();

    let mut points = Vec::with_capacity(num_tokens / POINT_LEN_TOKENS);
    let mut i = FIRST_POINT_INDEX;

    while i < num_tokens {
        if i + POINT_LEN_TOKENS > num_tokens {
            return Err(LanePointsError::Truncated {
                index: i,
                num_tokens,
            });
        }

        points.push([
            parse_token(&tokens, i)?,
            parse_token(&tokens, i + 1)?,
            parse_token(&tokens, i + 2)?,
        ]);

        i += POINT_LEN_TOKENS;
        if i % RECORD_LEN_TOKENS == 0 {
            i += 1;
        }
    }

    Ok(points)
}

/// Encode points into the batch wire format.
///
/// The header holds the number of points and each record marker holds the record number, neither
/// is read back by [`decode`].
pub fn encode(points: &[[f64; 3]]) -> String {
    let mut tokens: Vec<String> = Vec::with_capacity(1 + points.len() * 4);
    tokens.push(points.len().to_string());

    let mut i = FIRST_POINT_INDEX;
    for p in points {
        tokens.extend(p.iter().map(|c| c.to_string()));

        i += POINT_LEN_TOKENS;
        if i % RECORD_LEN_TOKENS == 0 {
            tokens.push((i / RECORD_LEN_TOKENS).to_string());
            i += 1;
        }
    }

    tokens.join(" ")
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Split a raw batch into its number tokens.
fn tokenise(raw: &str) -> Vec<&str> {
    raw.split(|c: char| c.is_whitespace() || matches!(c, '{' | '}' | '[' | ']' | ','))
        .filter(|t| !t.is_empty())
        .collect()
}

fn parse_token(tokens: &[&str], index: usize) -> Result<f64, LanePointsError> {
    match tokens[index].parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(LanePointsError::InvalidToken {
            index,
            token: tokens[index].to_string(),
        }),
    }
}
