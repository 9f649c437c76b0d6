//! Example: scanning a text file for every keyword of a dictionary.
//!
//! Prints each occurrence as `{'keyword'=rank}` at the line it was found in,
//! followed by a count per keyword.
//!
//! Run with: cargo run --example scan -- <dictionary> <corpus> [--ignore-case]
//! Set `RUST_LOG=libacm=debug` to see dictionary loading and failure rebuilds.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use hashbrown::HashMap;
use libacm::acm::{Automaton, IgnoreAsciiCase, SymbolPolicy, build_automaton_from_file};
use tracing_subscriber::EnvFilter;

/// Scan a text file for every keyword of a dictionary.
#[derive(Parser, Debug)]
#[command(name = "scan")]
struct Args {
    /// Dictionary file, one keyword per line; `#` starts a comment line.
    dictionary: PathBuf,
    /// Text to scan, line by line.
    corpus: PathBuf,
    /// Compare ASCII letters case-insensitively.
    #[arg(short, long)]
    ignore_case: bool,
}

/// Copies every keyword into a case-insensitive automaton, keeping rank order.
fn fold_case(exact: &Automaton<char>) -> Automaton<char, (), IgnoreAsciiCase> {
    let mut ranked = Vec::with_capacity(exact.keyword_count());
    exact.for_each_ranked(|symbols, rank, _| ranked.push((rank, symbols.to_vec())));
    ranked.sort_unstable_by_key(|(rank, _)| *rank);

    let mut folded = Automaton::with_policy(IgnoreAsciiCase);
    folded.extend(ranked.iter().map(|(_, keyword)| keyword));
    folded
}

fn scan<P: SymbolPolicy<char>>(acm: &Automaton<char, (), P>, corpus: &str) {
    let started = Instant::now();
    acm.rebuild();
    println!("Failure function built in {:?}.", started.elapsed());

    let started = Instant::now();
    let mut counts: HashMap<usize, (String, usize)> = HashMap::new();
    let mut cursor = acm.cursor();
    for (line_no, line) in corpus.lines().enumerate() {
        cursor.reset();
        let mut found = Vec::new();
        for ch in line.chars() {
            if cursor.advance(ch) == 0 {
                continue;
            }
            for m in cursor.matches() {
                let keyword: String = m.keyword.iter().collect();
                found.push(format!("{{'{keyword}'={}}}", m.rank));
                counts.entry(m.rank).or_insert_with(|| (keyword, 0)).1 += 1;
            }
        }
        if !found.is_empty() {
            println!("{:>6}: {}", line_no + 1, found.join(" "));
        }
    }
    println!("Corpus scanned in {:?}.", started.elapsed());

    println!();
    let mut summary: Vec<_> = counts.into_iter().collect();
    summary.sort_unstable_by_key(|(rank, _)| *rank);
    for (rank, (keyword, count)) in summary {
        println!("[{rank}] '{keyword}': {count}");
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let started = Instant::now();
    let acm = build_automaton_from_file(&args.dictionary)?;
    println!(
        "[{}] keywords registered in {:?}, {} states.",
        acm.keyword_count(),
        started.elapsed(),
        acm.state_count()
    );

    let corpus = std::fs::read_to_string(&args.corpus)?;
    if args.ignore_case {
        scan(&fold_case(&acm), &corpus);
    } else {
        scan(&acm, &corpus);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
