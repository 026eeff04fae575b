use serde::Serialize;
use thiserror::Error;

pub const ROWS: usize = 12;
pub const COLUMNS: [char; 4] = ['A', 'B', 'C', 'D'];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeatError {
    #[error("no such seat: {0}")]
    Unknown(String),
    #[error("seat {0} is already taken")]
    Taken(String),
}

/// A seat in the cabin, zero-based row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seat {
    row: usize,
    col: usize,
}

impl Seat {
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < ROWS && col < COLUMNS.len()).then_some(Self { row, col })
    }

    /// Parses ids like `3C` (row numbers start at 1).
    pub fn parse(id: &str) -> Result<Self, SeatError> {
        let unknown = || SeatError::Unknown(id.to_string());
        let id = id.trim();
        let letter = id.chars().last().ok_or_else(unknown)?.to_ascii_uppercase();
        let number: usize = id[..id.len() - letter.len_utf8()]
            .parse()
            .map_err(|_| unknown())?;
        let col = COLUMNS.iter().position(|c| *c == letter).ok_or_else(unknown)?;
        number
            .checked_sub(1)
            .and_then(|row| Self::new(row, col))
            .ok_or_else(unknown)
    }

    pub fn id(&self) -> String {
        format!("{}{}", self.row + 1, COLUMNS[self.col])
    }

    /// Seats pre-booked by other passengers.
    pub fn is_taken(&self) -> bool {
        (self.row + COLUMNS[self.col] as usize) % 7 == 0
    }
}

/// Picks a free seat by id.
pub fn reserve(id: &str) -> Result<Seat, SeatError> {
    let seat = Seat::parse(id)?;
    if seat.is_taken() {
        return Err(SeatError::Taken(seat.id()));
    }
    Ok(seat)
}

/// A seat as drawn on the seat map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatStatus {
    pub id: String,
    pub taken: bool,
}

impl From<Seat> for SeatStatus {
    fn from(seat: Seat) -> Self {
        Self {
            id: seat.id(),
            taken: seat.is_taken(),
        }
    }
}

/// Every seat in boarding order.
pub fn cabin() -> impl Iterator<Item = Seat> {
    (0..ROWS).flat_map(|row| (0..COLUMNS.len()).map(move |col| Seat { row, col }))
}
