//! Purpose: CLI entry point for modpipe.
//! Exports: none (binary).
//! Role: Parse the global surface, resolve the requested module, parse its
//! own options, stream stdin (or a file) through the transform, and map
//! failures to stable exit codes.
//! Invariants: A first SIGINT unwinds between chunks to a bare newline on
//! stderr and exit 130; a second takes the default action, so a transform
//! blocked in a read cannot pin the process.
//! Invariants: Diagnostics are human text on a terminal, a JSON envelope
//! when stderr is redirected.

use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use modpipe::core::error::{to_exit_code, Error, ErrorKind};
use modpipe::core::input::{normalize, Input};
use modpipe::core::module::declared_options;
use modpipe::core::options::{bag_from_matches, module_command};
use modpipe::core::output::write_stream;
use modpipe::core::runtime::Invocation;
use modpipe::dispatch::Dispatcher;

#[derive(Parser)]
#[command(
    name = "modpipe",
    version,
    about = "Stream data through a module resolved by path",
    after_help = "Run `modpipe <MODULE> --help` for a module's own options."
)]
struct Cli {
    /// Show extra information
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Iterate input over newlines
    #[arg(short = 'i', long)]
    iterate: bool,

    /// Generate output with newlines
    #[arg(short = 'g', long)]
    generate: bool,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Read input from a file instead of stdin
    #[arg(long, value_name = "FILE", hide = true)]
    input: Option<PathBuf>,

    /// List every available module
    #[arg(long)]
    list: bool,

    /// Emit a shell completion script
    #[arg(long, hide = true, value_name = "SHELL", value_enum)]
    completions: Option<clap_complete::Shell>,

    /// Module path, followed by the module's own options
    #[arg(
        value_name = "MODULE [OPTIONS]",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    rest: Vec<String>,
}

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "modpipe", &mut io::stdout());
        return 0;
    }

    let dispatcher = Dispatcher::new();

    if cli.list {
        init_tracing(cli.verbose);
        for (path, module) in dispatcher.modules() {
            println!("{path:<16} {}", module.summary());
        }
        return 0;
    }

    let Some((path, module_args)) = cli.rest.split_first() else {
        let mut cmd = Cli::command();
        let _ = cmd.print_help();
        return to_exit_code(ErrorKind::Usage);
    };

    // Before resolution, so registry load diagnostics are not dropped. The
    // post-path position is scanned by token; the module parser validates it
    // properly later.
    init_tracing(cli.verbose || wants_verbose(module_args));

    match execute(&dispatcher, &cli, path, module_args) {
        Ok(()) => 0,
        Err(err) if err.kind() == ErrorKind::Interrupted => {
            eprintln!();
            to_exit_code(ErrorKind::Interrupted)
        }
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    }
}

fn execute(
    dispatcher: &Dispatcher,
    cli: &Cli,
    path: &str,
    module_args: &[String],
) -> Result<(), Error> {
    let module = dispatcher.resolve(path)?;
    let decls = declared_options(module.as_ref());
    let cmd = module_command(path, module.summary(), &decls);

    let matches = match cmd.try_get_matches_from(module_args) {
        Ok(matches) => matches,
        Err(err) if err.kind() == clap::error::ErrorKind::DisplayHelp => {
            let _ = err.print();
            return Ok(());
        }
        Err(err) => {
            let _ = err.print();
            return Err(Error::new(ErrorKind::Usage)
                .with_message("invalid module arguments")
                .with_module(path));
        }
    };

    // Cross-cutting flags OR across both positions so they work before or
    // after the module path.
    let iterate = cli.iterate || matches.get_flag("iterate");
    let generate = cli.generate || matches.get_flag("generate");
    let input_file = cli
        .input
        .clone()
        .or_else(|| matches.get_one::<PathBuf>("input").cloned());
    let output_file = cli
        .output
        .clone()
        .or_else(|| matches.get_one::<PathBuf>("output").cloned());

    let bag = bag_from_matches(&decls, &matches)?;

    let raw = match input_file {
        Some(file) => {
            let reader = File::open(&file).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message(format!("cannot open input file '{}'", file.display()))
                    .with_source(err)
            })?;
            Input::Reader(Box::new(reader))
        }
        None => Input::Stdin,
    };
    let input = normalize(raw, iterate);

    // First SIGINT sets the flag and delivery stops between chunks; once the
    // flag is set, the next SIGINT takes the default action, so a transform
    // blocked in a read (signal-hook installs handlers with SA_RESTART)
    // still dies on repeated Ctrl+C.
    let interrupt = Arc::new(AtomicBool::new(false));
    let hook_err = |err: io::Error| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to install the interrupt handler")
            .with_source(err)
    };
    signal_hook::flag::register_conditional_default(
        signal_hook::consts::SIGINT,
        Arc::clone(&interrupt),
    )
    .map_err(hook_err)?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&interrupt))
        .map_err(hook_err)?;

    let stream = Invocation::new(path, module).run(dispatcher.env(), input, &bag)?;

    match output_file {
        Some(file) => {
            let mut out = File::create(&file).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message(format!("cannot create output file '{}'", file.display()))
                    .with_source(err)
            })?;
            write_stream(stream, &mut out, generate, &interrupt)
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_stream(stream, &mut out, generate, &interrupt)
        }
    }
}

fn wants_verbose(args: &[String]) -> bool {
    args.iter().any(|arg| arg == "-v" || arg == "--verbose")
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("MODPIPE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("error: {err}");
        if let Some(hint) = err.hint() {
            eprintln!("hint: {hint}");
        }
    } else {
        let envelope = serde_json::json!({
            "error": {
                "kind": format!("{:?}", err.kind()),
                "message": err.message(),
                "module": err.module(),
                "hint": err.hint(),
                "exit_code": to_exit_code(err.kind()),
            }
        });
        eprintln!("{envelope}");
    }
}
