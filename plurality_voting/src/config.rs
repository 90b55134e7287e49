// ********* Input data structures ***********

use std::collections::HashMap;

/// The three electoral districts used when tabulating by district.
///
/// Votes cast in any other district are dropped.
pub const DISTRICTS: [&str; 3] = ["District 1", "District 2", "District 3"];

/// How the tally is aggregated.
///
/// In most cases, the global mode is what you want. The districted mode
/// runs a winner-take-all aggregation over the three fixed districts.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum TabulationMode {
    /// A single pool of votes for the whole election.
    Global,
    /// One pool of votes per district, aggregated with one district
    /// point awarded to the leading official candidate of each district.
    Districted,
}

// ******** Output data structures *********

/// The outcome of an election.
///
/// `results` maps every official candidate name, plus the "Blank", "Null"
/// and "Abstention" entries, to a formatted percentage such as `"12,50%"`
/// (two decimal digits, comma as the decimal separator). The formatted
/// string is the contract: consumers compare these values bit-exact.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyOutcome {
    pub results: HashMap<String, String>,
    /// Votes cast for official candidates.
    pub valid_votes: u64,
    /// All counted votes, including blank and null ballots.
    pub total_votes: u64,
    /// Eligible voters across all the districts of the roster.
    pub total_electors: u64,
}
