use std::io;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use clap::{Arg, ArgAction, ArgMatches, Command};
use log::{error, info, LevelFilter};
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use thiserror::Error;

use pairing_tool::{input, matcher, Matching, Population};

const PROGRAM_NAME: &str = "pairing-tool";

const ABOUT_TEXT: &str = "Draw names for a gift exchange. Nobody gives to themselves or to
someone in their own group.

Names are read one per line; a blank line starts the next group.

EXIT CODES:
     0: Everyone was paired.
     1: The draw got stuck; the partial pairings are printed.
     2: Error.";

const INPUT: &str = "INPUT";
const DEMO: &str = "DEMO";
const SEED: &str = "SEED";
const VERBOSE: &str = "VERBOSE";

/// Families used by `--demo`.
const DEMO_GROUPS: &[&[&str]] = &[
    &["Mike", "Katie", "Diane", "Rick"],
    &["Ruth", "Bob", "Linda", "John", "Karan", "Larry"],
    &["Ceil", "Bobby", "Jen"],
    &["Jean"],
    &["Denise", "George"],
];

/// Errors that stop the program before a draw can be reported.
#[derive(Debug, Error)]
enum Error {
    #[error("Failed to read names: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Input(#[from] pairing_tool::Error),
    #[error("Failed to configure logging: {0}")]
    LogConfig(String),
    #[error("Failed to install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .arg(
            Arg::new(INPUT)
                .help("File of names; `-` or nothing reads stdin")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new(DEMO)
                .long("demo")
                .help("Use a built-in list of families instead of reading names")
                .action(ArgAction::SetTrue)
                .conflicts_with(INPUT),
        )
        .arg(
            Arg::new(SEED)
                .long("seed")
                .help("Seed for a reproducible draw")
                .value_parser(clap::value_parser!(u64))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new(VERBOSE)
                .short('v')
                .long("verbose")
                .help("Log more detail to stderr (repeatable)")
                .action(ArgAction::Count),
        )
}

fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(verbosity: u8) -> Result<(), Error> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{h({l})} {t} - {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level_for(verbosity)))
        .map_err(|e| Error::LogConfig(e.to_string()))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn demo_groups() -> Vec<Vec<String>> {
    DEMO_GROUPS
        .iter()
        .map(|group| group.iter().map(|name| name.to_string()).collect())
        .collect()
}

fn load_groups(args: &ArgMatches) -> Result<Vec<Vec<String>>, Error> {
    if args.get_flag(DEMO) {
        info!("Using the demo roster");
        return Ok(demo_groups());
    }

    let groups = match args.get_one::<PathBuf>(INPUT) {
        Some(path) if path.as_os_str() != "-" => {
            info!("Reading names from {}", path.display());
            input::read_groups_from_file(path)?
        }
        _ if input::stdin_is_tty() => {
            let running = Arc::new(AtomicBool::new(true));
            let r = running.clone();

            ctrlc::set_handler(move || {
                println!("\n\nCtrl+C pressed. Press Enter to draw with the names entered so far.");
                r.store(false, Ordering::SeqCst);
            })
            .expect("Error setting Ctrl-C handler");

            input::read_groups_interactive(running)?
        }
        _ => input::parse_groups(io::stdin().lock())?,
    };
    Ok(groups)
}

fn print_pairings(matching: &Matching) {
    let mut pairs: Vec<(&str, &str)> = matching.assignment.pairs().collect();
    pairs.sort();

    println!("Giver\tReceiver");
    println!("------------------------");
    for (giver, receiver) in pairs {
        println!("{}\t{}", giver, receiver);
    }
    println!("\nTotal: {} pairs", matching.assignment.len());
}

fn report_stuck(matching: &Matching, participant: &str) {
    eprintln!("Pairings made before the draw got stuck:");
    for (giver, receiver) in matching.assignment.pairs() {
        eprintln!("  {} - {}", giver, receiver);
    }
    eprintln!(
        "Stuck: {} has nobody left to give to. Run the draw again.",
        participant
    );
}

/// Run the program, returning the exit code.
fn run(args: &ArgMatches) -> Result<i32, Error> {
    let groups = load_groups(args)?;
    let population = Population::build(&groups)?;

    let matching = match args.get_one::<u64>(SEED) {
        Some(&seed) => {
            info!("Drawing with seed {seed}");
            matcher::assign_seeded(population, seed)
        }
        None => matcher::assign_from_entropy(population),
    };

    match matching.stuck() {
        None => {
            print_pairings(&matching);
            Ok(0)
        }
        Some(participant) => {
            report_stuck(&matching, participant);
            Ok(1)
        }
    }
}

fn main() {
    let args = cli().get_matches();

    if let Err(err) = init_logging(args.get_count(VERBOSE)) {
        eprintln!("{err}");
        std::process::exit(2);
    }

    let exit_code = match run(&args) {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            2
        }
    };
    std::process::exit(exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn test_cli_parses_options() {
        let args = cli()
            .try_get_matches_from([PROGRAM_NAME, "--seed", "42", "-vv", "names.txt"])
            .unwrap();
        assert_eq!(args.get_one::<u64>(SEED), Some(&42));
        assert_eq!(args.get_count(VERBOSE), 2);
        assert_eq!(
            args.get_one::<PathBuf>(INPUT),
            Some(&PathBuf::from("names.txt"))
        );
        assert!(!args.get_flag(DEMO));
    }

    #[test]
    fn test_demo_conflicts_with_input() {
        assert!(cli()
            .try_get_matches_from([PROGRAM_NAME, "--demo", "names.txt"])
            .is_err());
    }

    #[test]
    fn test_rejects_non_numeric_seed() {
        assert!(cli()
            .try_get_matches_from([PROGRAM_NAME, "--seed", "abc"])
            .is_err());
    }

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0), LevelFilter::Warn);
        assert_eq!(level_for(1), LevelFilter::Info);
        assert_eq!(level_for(2), LevelFilter::Debug);
        assert_eq!(level_for(9), LevelFilter::Trace);
    }

    #[test]
    fn test_demo_roster_is_valid_input() {
        let groups = demo_groups();
        assert_eq!(groups.len(), 5);
        let population = Population::build(&groups).unwrap();
        assert_eq!(population.len(), 16);
    }

    /// Write `contents` to a temp file unique to this process and test.
    fn names_file(test: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "pairing-tool-{}-{}.txt",
            std::process::id(),
            test
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn args_for(path: &std::path::Path) -> ArgMatches {
        cli()
            .try_get_matches_from([
                std::ffi::OsStr::new(PROGRAM_NAME),
                std::ffi::OsStr::new("--seed"),
                std::ffi::OsStr::new("5"),
                path.as_os_str(),
            ])
            .unwrap()
    }

    #[test]
    fn test_run_with_demo_roster() {
        let args = cli()
            .try_get_matches_from([PROGRAM_NAME, "--demo", "--seed", "3"])
            .unwrap();
        let code = run(&args).unwrap();
        assert!(code == 0 || code == 1);
    }

    #[test]
    fn test_run_exits_zero_when_everyone_is_paired() {
        // Two singletons can only swap, so the draw always completes
        let path = names_file("complete", "A\n\nB\n");
        let code = run(&args_for(&path)).unwrap();
        let _ = std::fs::remove_file(path);

        assert_eq!(code, 0);
    }

    #[test]
    fn test_run_exits_one_when_the_draw_gets_stuck() {
        // A single group leaves nobody anyone may give to
        let path = names_file("stuck", "A\nB\nC\n");
        let code = run(&args_for(&path)).unwrap();
        let _ = std::fs::remove_file(path);

        assert_eq!(code, 1);
    }

    #[test]
    fn test_run_reports_invalid_input() {
        let path = names_file("duplicate", "Mike\nKatie\n\nMike\n");
        let err = run(&args_for(&path)).unwrap_err();
        let _ = std::fs::remove_file(path);

        assert!(matches!(err, Error::Input(pairing_tool::Error::InvalidInput(_))));
    }
}
