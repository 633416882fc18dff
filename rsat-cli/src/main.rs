use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::process::exit;
use std::time::{Duration, Instant};

use anyhow::{bail, Context as _, Error};
use env_logger::{fmt, Builder, Target};
use log::{info, Level, LevelFilter, Record};

use rsat::{Solver, SolverConfigUpdate};

const USAGE: &str = "\
Usage: rsat [options] <file|->

Solves a DIMACS CNF formula and exits with 10 (SATISFIABLE), 20
(UNSATISFIABLE) or 0 (INDETERMINATE).

Options:
    --version           Print version information and exit
    --help               Print this usage message and exit
    --timeout=N          Stop searching after N seconds
    --wait               Wait for a keypress before solving
    --<name>=<value>     Forwarded to the solver as a configuration override
";

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            eprintln!("Error: {}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stderr)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("RSAT_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn signature() -> String {
    format!(
        "rsat {}\n  {} build - {}",
        env!("RSAT_VERSION"),
        env!("RSAT_PROFILE"),
        env!("RSAT_RUSTC_VERSION"),
    )
}

/// A parsed but not yet applied command line.
struct Options {
    input: Option<String>,
    timeout: Option<u64>,
    wait: bool,
    config: SolverConfigUpdate,
}

fn parse_args() -> Result<Result<Options, i32>, Error> {
    let mut input = None;
    let mut timeout = None;
    let mut wait = false;
    let mut config = SolverConfigUpdate::default();

    for arg in env::args().skip(1) {
        if arg == "--version" {
            println!("{}", signature());
            return Ok(Err(0));
        } else if arg == "--help" {
            print!("{}", USAGE);
            return Ok(Err(0));
        } else if arg == "--wait" {
            wait = true;
        } else if let Some(value) = arg.strip_prefix("--timeout=") {
            let seconds: u64 = value
                .parse()
                .with_context(|| format!("invalid --timeout value '{}'", value))?;
            timeout = Some(seconds);
        } else if let Some(rest) = arg.strip_prefix("--") {
            match rest.split_once('=') {
                Some((name, value)) => config
                    .set_by_name(name, value)
                    .with_context(|| format!("in option '--{}'", rest))?,
                None => bail!("missing value for option '--{}', expected --{}=<value>", rest, rest),
            }
        } else if input.is_some() {
            bail!("unexpected extra argument '{}'", arg);
        } else {
            input = Some(arg);
        }
    }

    Ok(Ok(Options {
        input,
        timeout,
        wait,
        config,
    }))
}

fn main_with_err() -> Result<i32, Error> {
    let options = match parse_args()? {
        Err(code) => return Ok(code),
        Ok(options) => options,
    };

    init_logging();
    info!("{}", signature());

    let mut solver = Solver::new();
    solver.config(&options.config);

    if let Some(seconds) = options.timeout {
        let deadline = Instant::now() + Duration::from_secs(seconds);
        solver.set_terminate(move || Instant::now() >= deadline);
    }

    if options.wait {
        info!("press any key to continue");
        let mut buf = [0u8; 1];
        let _ = io::stdin().read(&mut buf);
    }

    let raw_input: Box<dyn io::Read> = match options.input.as_deref() {
        Some("-") | None => {
            info!("reading from stdin");
            Box::new(io::stdin())
        }
        Some(path) => {
            info!("reading file '{}'", path);
            Box::new(fs::File::open(path).with_context(|| format!("could not open '{}'", path))?)
        }
    };

    let input = rsat_dimacs::open_possibly_compressed(raw_input)
        .context("could not read input")?;

    solver.add_dimacs_cnf(input)?;

    match solver.solve() {
        Some(true) => {
            println!("SATISFIABLE");
            Ok(10)
        }
        Some(false) => {
            println!("UNSATISFIABLE");
            Ok(20)
        }
        None => {
            println!("INDETERMINATE");
            Ok(0)
        }
    }
}
