use clap::Parser;

use pmc_rs::checker::ModelChecker;
use pmc_rs::choice::Choice;
use pmc_rs::config::Configuration;
use pmc_rs::model::Model;
use pmc_rs::Engine;

/// Knuth-Yao die: a fair six-sided die out of fair coin flips.
struct Die;

impl Model for Die {
    type State = u32;

    fn initial_state(&self) -> u32 {
        0
    }

    fn step(&self, state: &u32, choice: &mut Choice) -> u32 {
        match *state {
            0 => choice.choose(&[123, 456]),
            123 => choice.choose(&[12, 3123]),
            456 => choice.choose(&[45, 6456]),
            12 => choice.choose(&[1, 2]),
            3123 => choice.choose(&[3, 123]),
            45 => choice.choose(&[4, 5]),
            6456 => choice.choose(&[6, 456]),
            face => {
                choice.stay();
                face
            }
        }
    }

    fn evaluate(&self, state: &u32) -> bool {
        *state == 6
    }
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Largest step bound to report.
    #[arg(value_name = "INT", default_value = "10")]
    bound: usize,

    /// State-count ceiling.
    #[clap(long, value_name = "INT", default_value = "1024")]
    max_states: usize,

    /// Reject states without a declared transition.
    #[clap(long)]
    strict: bool,

    /// Write the chain in DOT format to this file.
    #[clap(long, value_name = "FILE")]
    dot: Option<std::path::PathBuf>,

    /// Log debug messages.
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    println!("args = {:?}", args);

    let engine = Engine::new(Configuration {
        max_states: args.max_states,
        strict: args.strict,
        ..Configuration::default()
    });

    let time_total = std::time::Instant::now();

    println!("six reachable: {}", engine.check_reachability(&Die, |s| *s == 6)?);

    let chain = engine.build_chain(&Die)?;
    println!("chain = {:?}", chain);

    for k in 0..=args.bound {
        let p = engine.bounded_probability(&chain, |s| *s == 6, k)?;
        println!("P(F<={} six) = {}", k, p);
    }

    let checker = ModelChecker::with_config(&chain, engine.config().clone());
    let p = checker.unbounded_finally(chain.formula_label()?)?;
    println!("P(F six) = {} (exact: 1/6)", p.value());

    if let Some(path) = args.dot {
        std::fs::write(&path, chain.to_dot()?)?;
        println!("Wrote DOT to {}", path.display());
    }

    println!("\nTotal time: {:?}", time_total.elapsed());
    Ok(())
}
