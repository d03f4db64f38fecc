// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::borrow::Borrow;
use std::borrow::BorrowMut;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use fsrs_scheduler::Card;
use fsrs_scheduler::DateInput;
use fsrs_scheduler::Fallible;
use fsrs_scheduler::Grade;
use fsrs_scheduler::Parameters;
use fsrs_scheduler::RescheduleOptions;
use fsrs_scheduler::ReviewLog;
use fsrs_scheduler::Scheduler;
use fsrs_scheduler::Timestamp;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML file with scheduler parameters.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Fixed seed for interval fuzzing.
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a new, never-reviewed card.
    NewCard {
        /// When the card is first due. Defaults to the current time.
        #[arg(long)]
        now: Option<String>,
    },
    /// Forecast the outcome of reviewing a card under every grade.
    Repeat {
        /// Path to the card, as JSON.
        #[arg(long)]
        card: PathBuf,
        #[arg(long)]
        now: Option<String>,
    },
    /// Review a card with a single grade.
    Next {
        #[arg(long)]
        card: PathBuf,
        /// Again, Hard, Good, Easy, or 1-4.
        #[arg(long)]
        grade: Grade,
        #[arg(long)]
        now: Option<String>,
    },
    /// Undo the review recorded in a log.
    Rollback {
        #[arg(long)]
        card: PathBuf,
        /// Path to the review log, as JSON.
        #[arg(long)]
        log: PathBuf,
    },
    /// Mark a card as forgotten.
    Forget {
        #[arg(long)]
        card: PathBuf,
        #[arg(long)]
        now: Option<String>,
        /// Also reset the review and lapse counts.
        #[arg(long)]
        reset_count: bool,
    },
    /// Recompute due dates for a list of cards.
    Reschedule {
        /// Path to a JSON array of cards. Extra fields are kept.
        #[arg(long)]
        cards: PathBuf,
        /// Fuzz the recomputed intervals.
        #[arg(long)]
        fuzz: bool,
    },
    /// Print the probability of recalling a card now.
    Retrievability {
        #[arg(long)]
        card: PathBuf,
        #[arg(long)]
        now: Option<String>,
    },
}

/// A card with whatever else the caller stored alongside it.
#[derive(Serialize, Deserialize)]
struct CardRecord {
    #[serde(flatten)]
    card: Card,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Borrow<Card> for CardRecord {
    fn borrow(&self) -> &Card {
        &self.card
    }
}

impl BorrowMut<Card> for CardRecord {
    fn borrow_mut(&mut self) -> &mut Card {
        &mut self.card
    }
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let params = match &cli.config {
        Some(path) => Parameters::load(path)?,
        None => Parameters::default(),
    };
    let mut scheduler = Scheduler::new(params)?;
    if let Some(seed) = cli.seed {
        scheduler = scheduler.with_seed(seed);
    }
    match cli.command {
        Command::NewCard { now } => {
            let now = resolve_now(now)?;
            print_json(&Card::new(now))
        }
        Command::Repeat { card, now } => {
            let card: Card = read_json(&card)?;
            let log = scheduler.repeat(&card, resolve_now(now)?)?;
            print_json(&log)
        }
        Command::Next { card, grade, now } => {
            let card: Card = read_json(&card)?;
            let item = scheduler.next(&card, resolve_now(now)?, grade)?;
            print_json(&item)
        }
        Command::Rollback { card, log } => {
            let card: Card = read_json(&card)?;
            let log: ReviewLog = read_json(&log)?;
            print_json(&scheduler.rollback(&card, &log)?)
        }
        Command::Forget {
            card,
            now,
            reset_count,
        } => {
            let card: Card = read_json(&card)?;
            let item = scheduler.forget(&card, resolve_now(now)?, reset_count)?;
            print_json(&item)
        }
        Command::Reschedule { cards, fuzz } => {
            let cards: Vec<CardRecord> = read_json(&cards)?;
            let options = RescheduleOptions { enable_fuzz: fuzz };
            print_json(&scheduler.reschedule(cards, options)?)
        }
        Command::Retrievability { card, now } => {
            let card: Card = read_json(&card)?;
            let r = scheduler.get_retrievability(&card, resolve_now(now)?)?;
            print_json(&r)
        }
    }
}

fn resolve_now(now: Option<String>) -> Fallible<Timestamp> {
    match now {
        Some(text) => DateInput::from(text).normalize("now"),
        None => Ok(Timestamp::now()),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Fallible<T> {
    log::debug!("Reading {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    let value: T = serde_json::from_str(&contents)?;
    Ok(value)
}

fn print_json<T: Serialize>(value: &T) -> Fallible<()> {
    let json: String = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
