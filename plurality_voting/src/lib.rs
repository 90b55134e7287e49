/*!

Plurality vote tabulation, optionally partitioned across three electoral
districts.

The [Tabulator] is built with the roster of eligible voters and a
[TabulationMode], receives votes one at a time and computes the share of
every official candidate together with the blank, null and abstention
rates:

```
use plurality_voting::{TabulationMode, Tabulator};
use std::collections::HashMap;

let mut roster: HashMap<String, Vec<String>> = HashMap::new();
roster.insert(
    "District 1".to_string(),
    vec!["anna".to_string(), "bob".to_string()],
);

let mut tally = Tabulator::new(roster, TabulationMode::Global);
tally.add_candidate("Anna");
tally.add_vote("bob", "Anna", "");

let outcome = tally.results();
assert_eq!(outcome.results["Anna"], "100,00%");
assert_eq!(outcome.results["Abstention"], "50,00%");
```

Votes for names that were never registered are accepted and reported in
the "Null" bucket ("Blank" for the empty name). In districted mode, votes
cast in an unknown district are silently dropped.

*/

mod config;
use log::debug;

use std::{
    collections::{HashMap, HashSet},
    ops::{Add, AddAssign},
};

pub use crate::config::*;

// **** Private structures ****

// The slot of a candidate in the count sequences. Allocated once per
// distinct name, in order of first sight.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct CandidateId(u32);

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
    const ONE: VoteCount = VoteCount(1);
}

impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteCount(iter.map(|vc| vc.0).sum())
    }
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

impl Add for VoteCount {
    type Output = VoteCount;
    fn add(self: VoteCount, rhs: VoteCount) -> VoteCount {
        VoteCount(self.0 + rhs.0)
    }
}

// Per-candidate counters. Invariant: every sequence has exactly one slot
// per allocated CandidateId, in id order.
#[derive(Eq, PartialEq, Debug, Clone)]
enum CountStore {
    Global(Vec<VoteCount>),
    Districted(HashMap<String, Vec<VoteCount>>),
}

/// A running tally for one election.
///
/// The roster and the mode are fixed at construction. Candidates may be
/// registered at any point, including after votes for them have been
/// cast: a vote for an unknown name allocates an unofficial slot, and a
/// later [Tabulator::add_candidate] call promotes that same slot.
#[derive(Debug, Clone)]
pub struct Tabulator {
    voters_by_district: HashMap<String, Vec<String>>,
    // Candidate names in slot order. The id of a name is its position here.
    candidates: Vec<String>,
    ids: HashMap<String, CandidateId>,
    official: HashSet<CandidateId>,
    counts: CountStore,
}

impl Tabulator {
    /// Creates an empty tally.
    ///
    /// `voters_by_district` maps each district to its eligible voters. It
    /// is only used for the total-electors count behind the "Abstention"
    /// entry, never to check individual ballots.
    pub fn new(
        voters_by_district: HashMap<String, Vec<String>>,
        mode: TabulationMode,
    ) -> Tabulator {
        let counts = match mode {
            TabulationMode::Global => CountStore::Global(Vec::new()),
            TabulationMode::Districted => CountStore::Districted(
                DISTRICTS
                    .iter()
                    .map(|d| (d.to_string(), Vec::new()))
                    .collect(),
            ),
        };
        Tabulator {
            voters_by_district,
            candidates: Vec::new(),
            ids: HashMap::new(),
            official: HashSet::new(),
            counts,
        }
    }

    /// Registers an official candidate.
    ///
    /// Only official candidates appear as named entries in the results.
    /// Registering the same name twice is a no-op; the empty string is
    /// accepted as a name like any other.
    pub fn add_candidate(&mut self, name: &str) {
        let cid = self.candidate_id(name);
        self.official.insert(cid);
    }

    /// Records one vote.
    ///
    /// `elector` is carried for tracing only: ballots are not checked
    /// against the roster and no duplicate detection is performed. In
    /// global mode `district` is ignored. In districted mode a vote cast
    /// in an unknown district is dropped without touching any count.
    pub fn add_vote(&mut self, elector: &str, candidate: &str, district: &str) {
        if let CountStore::Districted(by_district) = &self.counts {
            if !by_district.contains_key(district) {
                debug!(
                    "add_vote: dropping ballot from {:?}: unknown district {:?}",
                    elector, district
                );
                return;
            }
        }
        let cid = self.candidate_id(candidate);
        let idx = cid.0 as usize;
        match &mut self.counts {
            CountStore::Global(slots) => slots[idx] += VoteCount::ONE,
            CountStore::Districted(by_district) => {
                if let Some(slots) = by_district.get_mut(district) {
                    slots[idx] += VoteCount::ONE;
                }
            }
        }
    }

    /// Computes the outcome from the counts recorded so far.
    ///
    /// The tally is left untouched: more votes can be added and the
    /// results recomputed.
    pub fn results(&self) -> TallyOutcome {
        let valid_votes: VoteCount = self
            .official
            .iter()
            .map(|cid| self.candidate_total(*cid))
            .sum();
        debug!(
            "results: {:?} candidates ({:?} official), valid votes: {:?}",
            self.candidates.len(),
            self.official.len(),
            valid_votes
        );

        let mut results: HashMap<String, String> = HashMap::new();
        let mut blank_votes = VoteCount::EMPTY;
        let mut null_votes = VoteCount::EMPTY;

        match &self.counts {
            CountStore::Global(slots) => {
                for (idx, count) in slots.iter().enumerate() {
                    let cid = CandidateId(idx as u32);
                    let name = &self.candidates[idx];
                    if self.official.contains(&cid) {
                        results.insert(name.clone(), format_percent(percent_of(*count, valid_votes)));
                    } else if name.is_empty() {
                        blank_votes += *count;
                    } else {
                        null_votes += *count;
                    }
                }
            }
            CountStore::Districted(by_district) => {
                let mut district_points: HashMap<CandidateId, u64> =
                    self.official.iter().map(|cid| (*cid, 0)).collect();
                for district in DISTRICTS {
                    let slots = match by_district.get(district) {
                        Some(s) => s,
                        None => continue,
                    };
                    // The winner is the first official candidate, in slot
                    // order, whose share is not beaten by a strictly
                    // greater one later in the scan.
                    let mut winner: Option<(CandidateId, f64)> = None;
                    for (idx, count) in slots.iter().enumerate() {
                        let cid = CandidateId(idx as u32);
                        let name = &self.candidates[idx];
                        if self.official.contains(&cid) {
                            let share = percent_of(*count, valid_votes);
                            let beats = match winner {
                                None => true,
                                Some((_, best)) => best < share,
                            };
                            if beats {
                                winner = Some((cid, share));
                            }
                        } else if name.is_empty() {
                            blank_votes += *count;
                        } else {
                            null_votes += *count;
                        }
                    }
                    debug!("results: district {:?} winner: {:?}", district, winner);
                    if let Some((cid, _)) = winner {
                        if let Some(points) = district_points.get_mut(&cid) {
                            *points += 1;
                        }
                    }
                }
                // The share of a candidate is their district points over
                // the number of official candidates. This is the
                // historical aggregation formula: with fewer than three
                // candidates it produces shares above 100%.
                let official_count = VoteCount(self.official.len() as u64);
                for (idx, name) in self.candidates.iter().enumerate() {
                    let cid = CandidateId(idx as u32);
                    if let Some(points) = district_points.get(&cid) {
                        results.insert(
                            name.clone(),
                            format_percent(percent_of(VoteCount(*points), official_count)),
                        );
                    }
                }
            }
        }

        let total_votes = self.total_votes();
        results.insert(
            "Blank".to_string(),
            format_percent(percent_of(blank_votes, total_votes)),
        );
        results.insert(
            "Null".to_string(),
            format_percent(percent_of(null_votes, total_votes)),
        );

        let total_electors: u64 = self
            .voters_by_district
            .values()
            .map(|electors| electors.len() as u64)
            .sum();
        let abstention = if total_electors == 0 {
            0.0
        } else {
            100.0 - percent_of(total_votes, VoteCount(total_electors))
        };
        results.insert("Abstention".to_string(), format_percent(abstention));

        TallyOutcome {
            results,
            valid_votes: valid_votes.0,
            total_votes: total_votes.0,
            total_electors,
        }
    }

    // Resolves a name to its slot, allocating a fresh zeroed slot in
    // every count sequence on first sight. This is the only place where
    // the sequences grow, which keeps them aligned with the candidate
    // list.
    fn candidate_id(&mut self, name: &str) -> CandidateId {
        if let Some(cid) = self.ids.get(name) {
            return *cid;
        }
        let cid = CandidateId(self.candidates.len() as u32);
        self.candidates.push(name.to_string());
        self.ids.insert(name.to_string(), cid);
        match &mut self.counts {
            CountStore::Global(slots) => slots.push(VoteCount::EMPTY),
            CountStore::Districted(by_district) => {
                for slots in by_district.values_mut() {
                    slots.push(VoteCount::EMPTY);
                }
            }
        }
        cid
    }

    fn candidate_total(&self, cid: CandidateId) -> VoteCount {
        let idx = cid.0 as usize;
        match &self.counts {
            CountStore::Global(slots) => slots[idx],
            CountStore::Districted(by_district) => {
                by_district.values().map(|slots| slots[idx]).sum()
            }
        }
    }

    fn total_votes(&self) -> VoteCount {
        match &self.counts {
            CountStore::Global(slots) => slots.iter().cloned().sum(),
            CountStore::Districted(by_district) => by_district
                .values()
                .flat_map(|slots| slots.iter().cloned())
                .sum(),
        }
    }
}

// A percentage with a defined value for an empty denominator.
fn percent_of(count: VoteCount, total: VoteCount) -> f64 {
    if total == VoteCount::EMPTY {
        0.0
    } else {
        count.0 as f64 * 100.0 / total.0 as f64
    }
}

// French-locale rendering: two decimal digits, comma separator.
fn format_percent(value: f64) -> String {
    format!("{:.2}%", value).replace('.', ",")
}
