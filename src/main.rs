//! Stunt Race - console front end
//!
//! Collects the participants, runs the race and prints the report.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;

use stunt_race::report::RaceReport;
use stunt_race::{RaceConfig, RaceSession, SessionError};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of participants (asked for when missing)
    #[arg(short, long)]
    participants: Option<usize>,

    /// Participant names, in order; missing names are asked for
    #[arg(short, long = "name")]
    names: Vec<String>,

    /// Race distance in km
    #[arg(short, long, default_value_t = 1000.0)]
    distance: f64,

    /// Race name
    #[arg(long, default_value = "Grand Stunt Race")]
    race_name: String,

    /// Seed for a reproducible race
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between turns in milliseconds
    #[arg(long, default_value_t = 100)]
    pace_ms: u64,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = std::str::FromStr::from_str(&args.log_level).unwrap_or(log::LevelFilter::Warn);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    let config = RaceConfig {
        name: args.race_name.clone(),
        distance: args.distance,
        pace_ms: args.pace_ms,
    };
    let mut session = RaceSession::new(config, args.seed)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let count = match args.participants {
        Some(count) => count,
        None => ask_number(&mut input, "Number of participants: ")?,
    };
    if count == 0 {
        bail!("a race needs at least one participant");
    }

    let mut given = args.names.iter();
    for index in 1..=count {
        let vehicle = match given.next() {
            Some(name) => session.enroll(name).with_context(|| format!("cannot enroll {name:?}"))?,
            None => enroll_interactively(&mut session, &mut input, index)?,
        };
        if !args.json {
            println!("\t{}", vehicle.introduction());
        }
    }

    if !args.json {
        println!("\n*** {} ***\n", session.config().name);
        println!("The race is on!");
    }
    let mut progress = Ok(());
    let results = session.run_to_finish(|_| {
        if !args.json && progress.is_ok() {
            print!(".");
            progress = io::stdout().flush();
        }
    })?;
    progress.context("writing race progress")?;

    let report = RaceReport::new(&session.config().name, session.config().distance, &results);
    if args.json {
        println!("{}", report.to_json().context("serializing results")?);
    } else {
        println!("\nRace finished!\n");
        print!("{}", report.render());
    }

    log::info!("Session stats: {:?}", session.stats());
    Ok(())
}

/// Ask until the answer parses as a whole number
fn ask_number(input: &mut impl BufRead, prompt: &str) -> Result<usize> {
    loop {
        let line = ask(input, prompt)?;
        match line.trim().parse() {
            Ok(number) => return Ok(number),
            Err(_) => println!("**Error** Please enter a whole number."),
        }
    }
}

/// Ask for names until one yields a valid vehicle
fn enroll_interactively<'s>(
    session: &'s mut RaceSession,
    input: &mut impl BufRead,
    index: usize,
) -> Result<&'s stunt_race::Vehicle> {
    loop {
        let name = ask(input, &format!("\t* Name of vehicle {index} -> "))?;
        match session.enroll(&name) {
            Ok(_) => break,
            Err(SessionError::Validation(err)) => println!("**Error** {err}"),
            Err(err) => return Err(err.into()),
        }
    }
    session
        .participants()
        .last()
        .context("enrolled vehicle missing")
}

fn ask(input: &mut impl BufRead, prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("input closed");
    }
    Ok(line)
}
