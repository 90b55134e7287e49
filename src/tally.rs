use log::{info, warn};

use plurality_voting::*;
use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

#[derive(Debug, Snafu)]
pub enum TallyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TallyResult<T> = Result<T, TallyError>;

// ******** Election description file *********

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "contestJurisdiction")]
    pub contest_jurisdiction: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionCandidate {
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionBallot {
    pub elector: String,
    pub candidate: String,
    // Irrelevant and commonly omitted when tabulating globally.
    #[serde(default)]
    pub district: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "votersByDistrict")]
    pub voters_by_district: HashMap<String, Vec<String>>,
    #[serde(rename = "tabulateByDistrict")]
    pub tabulate_by_district: bool,
    pub candidates: Vec<ElectionCandidate>,
    pub votes: Vec<ElectionBallot>,
}

// ******** Summary output *********

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct SummaryConfig {
    contest: String,
    date: Option<String>,
    jurisdiction: Option<String>,
    electors: Option<String>,
    #[serde(rename = "totalVotes")]
    total_votes: Option<String>,
    #[serde(rename = "validVotes")]
    valid_votes: Option<String>,
}

fn build_summary_js(config: &ElectionConfig, outcome: &TallyOutcome) -> JSValue {
    let c = SummaryConfig {
        contest: config.output_settings.contest_name.clone(),
        date: config.output_settings.contest_date.clone(),
        jurisdiction: config.output_settings.contest_jurisdiction.clone(),
        electors: Some(outcome.total_electors.to_string()),
        total_votes: Some(outcome.total_votes.to_string()),
        valid_votes: Some(outcome.valid_votes.to_string()),
    };
    let mut shares: JSMap<String, JSValue> = JSMap::new();
    for (name, share) in outcome.results.iter() {
        shares.insert(name.clone(), json!(share));
    }
    json!({
        "config": c,
        "results": shares })
}

fn read_summary(path: String) -> TallyResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn run_election(
    config_path: String,
    check_summary_path: Option<String>,
    out_path: Option<String>,
) -> TallyResult<()> {
    let config_str = fs::read_to_string(config_path.clone()).context(OpeningJsonSnafu {
        path: config_path,
    })?;
    let config: ElectionConfig = serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
    info!(
        "config: contest {:?}: {:?} districts in the roster, {:?} candidates, {:?} ballots",
        config.output_settings.contest_name,
        config.voters_by_district.len(),
        config.candidates.len(),
        config.votes.len()
    );

    let mode = if config.tabulate_by_district {
        TabulationMode::Districted
    } else {
        TabulationMode::Global
    };
    let mut tally = Tabulator::new(config.voters_by_district.clone(), mode);
    for candidate in config.candidates.iter() {
        tally.add_candidate(&candidate.name);
    }
    for ballot in config.votes.iter() {
        tally.add_vote(&ballot.elector, &ballot.candidate, &ballot.district);
    }

    let outcome = tally.results();
    info!("outcome: {:?}", outcome);

    // Assemble the final json
    let result_js = build_summary_js(&config, &outcome);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    match out_path {
        Some(path) if path != "stdout" => {
            fs::write(path.clone(), &pretty_js_stats).context(WritingSummarySnafu { path })?;
        }
        _ => println!("{}", pretty_js_stats),
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(())
}

fn run_election_test(test_name: &str, config_lpath: &str, summary_lpath: &str) {
    let test_dir = option_env!("DISTRICTVOTE_TEST_DIR").unwrap_or("tests/data");
    info!("Running test {}", test_name);
    let res = run_election(
        format!("{}/{}/{}", test_dir, test_name, config_lpath),
        Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
        None,
    );
    if let Err(e) = res {
        panic!("Test {} failed: {}", test_name, e);
    }
}

pub fn test_wrapper(test_name: &str) {
    run_election_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    )
}
