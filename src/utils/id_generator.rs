// src/utils/id_generator.rs
use chrono::{DateTime, NaiveDate, Utc};

const RIDE_PREFIX: &str = "rid";
const SEQUENCE_WIDTH: usize = 5;

/// Issues ride ids of the form `rid-{YYMMDD}-{sequence}`.
///
/// The sequence never repeats for one generator, so two ids from the same
/// ledger can't collide even when they share a creation date. The width
/// grows past five digits once the counter outruns it.
#[derive(Debug, Default)]
pub struct RideIdGenerator {
    next_sequence: u64,
}

impl RideIdGenerator {
    pub fn new() -> Self {
        Self { next_sequence: 1 }
    }

    pub fn generate(&mut self) -> String {
        self.generate_with_timestamp(Utc::now())
    }

    /// Generate an id with a specific timestamp (useful for testing)
    pub fn generate_with_timestamp(&mut self, timestamp: DateTime<Utc>) -> String {
        // Default leaves the counter at zero; keep ids starting at 1 either way
        let sequence = self.next_sequence.max(1);
        self.next_sequence = sequence + 1;

        let date_part = timestamp.format("%y%m%d"); // YYMMDD format
        format!(
            "{}-{}-{:0width$}",
            RIDE_PREFIX,
            date_part,
            sequence,
            width = SEQUENCE_WIDTH
        )
    }

    /// Parse an id to extract its components
    pub fn parse_id(id: &str) -> Option<ParsedRideId> {
        let mut parts = id.split('-');
        let (prefix, date_part, sequence) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || prefix != RIDE_PREFIX {
            return None;
        }
        if date_part.len() != 6 || sequence.len() < SEQUENCE_WIDTH {
            return None;
        }

        let created_on = NaiveDate::parse_from_str(date_part, "%y%m%d").ok()?;
        let sequence = sequence.parse::<u64>().ok()?;

        Some(ParsedRideId {
            created_on,
            sequence,
        })
    }

    /// Validate if an id matches the expected format
    pub fn validate_id(id: &str) -> bool {
        Self::parse_id(id).is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRideId {
    pub created_on: NaiveDate,
    pub sequence: u64,
}
