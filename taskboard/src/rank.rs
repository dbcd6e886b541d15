//! Fractional ranks for task ordering.
//!
//! A [`Rank`] is a string that sorts byte by byte. The calculator treats ranks as base-62
//! fractions over the alphabet `0-9A-Za-z` (which is already in ASCII order), so a key
//! strictly between any two distinct ranks can usually be found by taking a digit
//! midpoint. Generated keys never end in `0`: a trailing zero would leave no room below
//! the key at the same length.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Base-62 digit alphabet in ascending byte order
const DIGITS: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const BASE: u8 = 62;

/// Longest key the calculator produces unless configured otherwise
pub const DEFAULT_MAX_LEN: usize = 64;

/// Ordering key of a task within its column.
///
/// The empty key marks a task the backend sent without a position; it sorts first.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rank(String);

impl Rank {
    /// Wrap an existing key (as received from the backend)
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Rank for the first task of an empty column: the middle of the alphabet
    pub fn initial() -> Self {
        Self("V".to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Rank {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Rank {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Reasons a rank cannot be produced
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RankError {
    /// The neighbors are adjacent or equal, or the only keys between them are too long
    #[error("no rank fits between {previous} and {next}")]
    RankExhausted { previous: String, next: String },

    /// The lower neighbor sorts after the upper one
    #[error("rank {previous} does not sort before {next}")]
    RankOutOfOrder { previous: String, next: String },

    /// A neighbor is empty or uses characters outside `0-9A-Za-z`
    #[error("invalid rank: {rank:?}")]
    InvalidRank { rank: String },
}

impl RankError {
    fn exhausted(previous: Option<&Rank>, next: Option<&Rank>) -> Self {
        Self::RankExhausted {
            previous: bound_label(previous, "<start>"),
            next: bound_label(next, "<end>"),
        }
    }
}

fn bound_label(rank: Option<&Rank>, open: &str) -> String {
    rank.map(|r| r.0.clone()).unwrap_or_else(|| open.to_string())
}

/// Synthesizes ranks between neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankCalculator {
    max_len: usize,
}

impl Default for RankCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl RankCalculator {
    pub fn new() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
        }
    }

    /// Calculator that refuses keys longer than `max_len` (at least one digit)
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(1),
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Rank strictly between `previous` and `next`.
    ///
    /// `None` for `previous` means "insert at the start", `None` for `next` means
    /// "insert at the end". With both absent the column is empty and
    /// [`Rank::initial`] is returned.
    pub fn between(&self, previous: Option<&Rank>, next: Option<&Rank>) -> Result<Rank, RankError> {
        let low = match previous {
            Some(rank) => decode(rank)?,
            None => Vec::new(),
        };
        let high = match next {
            Some(rank) => Some(decode(rank)?),
            None => None,
        };

        if let (Some(p), Some(n)) = (previous, next) {
            match p.cmp(n) {
                Ordering::Less => {}
                Ordering::Equal => return Err(RankError::exhausted(previous, next)),
                Ordering::Greater => {
                    return Err(RankError::RankOutOfOrder {
                        previous: p.0.clone(),
                        next: n.0.clone(),
                    })
                }
            }
        }

        let digits = midpoint(&low, high.as_deref())
            .filter(|digits| digits.len() <= self.max_len)
            .ok_or_else(|| RankError::exhausted(previous, next))?;

        Ok(encode(&digits))
    }

    /// Rank after `last` (append at the end of a column)
    pub fn after(&self, last: &Rank) -> Result<Rank, RankError> {
        self.between(Some(last), None)
    }

    /// Rank before `first` (insert at the head of a column)
    pub fn before(&self, first: &Rank) -> Result<Rank, RankError> {
        self.between(None, Some(first))
    }
}

fn digit_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'Z' => Some(byte - b'A' + 10),
        b'a'..=b'z' => Some(byte - b'a' + 36),
        _ => None,
    }
}

fn decode(rank: &Rank) -> Result<Vec<u8>, RankError> {
    let invalid = || RankError::InvalidRank {
        rank: rank.0.clone(),
    };
    if rank.0.is_empty() {
        return Err(invalid());
    }
    rank.0
        .bytes()
        .map(|b| digit_value(b).ok_or_else(invalid))
        .collect()
}

fn encode(digits: &[u8]) -> Rank {
    Rank(digits.iter().map(|&d| DIGITS[d as usize] as char).collect())
}

/// Digits of a key strictly between `low` and `high` (`None` = unbounded above).
///
/// `low` is read as if right-padded with zeros. Requires `low < high`. Returns `None`
/// when the interval contains no key at all.
fn midpoint(low: &[u8], high: Option<&[u8]>) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(low.len().max(1) + 1);
    let mut low = low;
    let mut high = high;

    loop {
        let l = low.first().copied().unwrap_or(0);
        low = low.get(1..).unwrap_or(&[]);

        let Some(h) = high else {
            // Unbounded above: any digit over `l` works
            if l < BASE - 1 {
                out.push((l + BASE) / 2);
                return Some(out);
            }
            out.push(l);
            continue;
        };

        let &hd = h.first()?;
        if l == hd {
            out.push(l);
            high = Some(&h[1..]);
            continue;
        }

        if hd - l > 1 {
            out.push((l + hd) / 2);
            return Some(out);
        }

        if h.len() > 1 {
            // A proper prefix of `high` already sorts below it
            out.push(hd);
            return Some(out);
        }

        // Adjacent digits: keep `l` and look for room above the rest of `low`
        out.push(l);
        high = None;
    }
}
