mod config;
mod error;
mod generate;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use docpage::DocError;
use sandbox::SandboxError;

use crate::config::{Config, Settings};
use crate::error::BuildError;

const SUBCOMMANDS: &[&str] = &["build", "eval", "help"];
/// `build` options whose value is the following argument.
const VALUE_OPTIONS: &[&str] = &[
    "-o",
    "--output",
    "--fragment",
    "--manifest",
    "--title",
    "--config",
];

#[derive(Parser)]
#[command(
    name = "docpage",
    version,
    about = "Render a README with doctests as a static HTML page"
)]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a document to HTML
    Build(BuildArgs),

    /// Evaluate one expression in the doctest sandbox
    Eval(EvalArgs),
}

#[derive(clap::Args)]
pub struct BuildArgs {
    /// Markdown document to render
    pub file: PathBuf,

    /// Where to write the page [default: index.html]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fragment file to splice in before rendering. Repeatable
    /// [default: custom/intro.md, custom/outro.md]
    #[arg(long = "fragment")]
    pub fragments: Vec<PathBuf>,

    /// Manifest to read the version from [default: package.json beside FILE]
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Page title
    #[arg(long)]
    pub title: Option<String>,

    /// Configuration file [default: docpage.toml, if present]
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct EvalArgs {
    /// Expression to evaluate
    expression: String,
}

fn main() {
    let args = with_subcommand(std::env::args().collect());
    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    logging::init_logging(cli.verbose, !cli.no_color);

    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let code = match cli.command {
        Command::Build(build_args) => do_build(build_args, color_choice),
        Command::Eval(eval_args) => do_eval(&eval_args.expression, color_choice),
    };
    process::exit(code);
}

/// `docpage [OPTIONS] README.md` is shorthand for `docpage build [OPTIONS]
/// README.md`: when the first positional argument is not a subcommand,
/// `build` goes in front of everything.
fn with_subcommand(mut args: Vec<String>) -> Vec<String> {
    let mut rest = args.iter().skip(1);
    let mut first = None;
    while let Some(arg) = rest.next() {
        if VALUE_OPTIONS.contains(&arg.as_str()) {
            rest.next();
        } else if !arg.starts_with('-') {
            first = Some(arg.as_str());
            break;
        }
    }

    if first.is_some_and(|arg| !SUBCOMMANDS.contains(&arg)) {
        args.insert(1, "build".to_string());
    }
    args
}

fn do_build(args: BuildArgs, color_choice: ColorChoice) -> i32 {
    let result = Config::load(args.config.as_deref())
        .map(|config| Settings::resolve(args, config))
        .and_then(|settings| generate::build(&settings));

    match result {
        Ok(output) => {
            println!("Generated {}", output.display());
            0
        }
        Err(error) => {
            report(&error, color_choice);
            1
        }
    }
}

fn report(error: &BuildError, color_choice: ColorChoice) {
    match error {
        BuildError::Doc {
            path,
            text,
            source: DocError::Splice(splice),
        } => {
            let mut files = SimpleFiles::new();
            let file_id = files.add(path.display().to_string(), text.clone());
            let writer = StandardStream::stderr(color_choice);
            let config = term::Config::default();
            let diagnostic = splice.to_diagnostic(file_id);
            let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
        }
        other => eprintln!("error: {}", other),
    }
}

fn do_eval(expression: &str, color_choice: ColorChoice) -> i32 {
    match sandbox::run(expression) {
        Ok(value) => {
            println!("{}", value.show());
            0
        }
        Err(SandboxError::Parse(error)) => {
            let mut files = SimpleFiles::new();
            let file_id = files.add("<expression>".to_string(), expression.to_string());
            let writer = StandardStream::stderr(color_choice);
            let config = term::Config::default();
            let diagnostic = error.to_diagnostic(file_id);
            let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
            1
        }
        Err(SandboxError::Runtime(error)) => {
            eprintln!("{}", error);
            1
        }
    }
}
