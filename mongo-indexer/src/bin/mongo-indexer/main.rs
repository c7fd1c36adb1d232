mod commands;
mod context;
mod examples;
mod output;
mod scanner;
mod theme;

use anyhow::Result;
use clap::{
    ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Color as ClapColor, RgbColor, Style},
    },
    error::ErrorKind,
};

use colored::{Color as ThemeColor, Colorize, control::ShouldColorize};
use std::fmt::Write;
use std::io::{self, Write as IoWrite};

#[cfg(feature = "mongodb")]
use commands::apply::{ApplyArgs, handle_apply};
use commands::{
    check::{CheckArgs, handle_check},
    plan::{PlanArgs, handle_plan},
};
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{ARROW, THEME};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("MONGODB_URI", "MongoDB connection string used by 'apply'"),
    ("MONGODB_DATABASE", "Default database for 'apply'"),
    ("RUST_LOG", "Log filter, e.g. 'mongo_indexer=debug'"),
];

#[derive(Parser)]
#[command(name = "mongo-indexer")]
#[command(version)]
#[command(
    about = "Plan, check and apply MongoDB indexes declared on Rust structs",
    long_about = r#"Index tooling for structs deriving IndexedModel:

• Scans the project for #[mongo_index(...)] annotations
• Compiles each annotation into an index specification
• Creates the indexes on MongoDB (with the 'mongodb' feature)

Commands:
  plan      Show the indexes each model declares
  check     Validate index annotations
  apply     Create the indexes on a database
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn parse_with_styles() -> Self {
        let command = build_cli_command();
        let result = command
            .styles(help_styles())
            .try_get_matches()
            .and_then(|matches| Cli::from_arg_matches(&matches));
        match result {
            Ok(cli) => cli,
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = print_blank_line_stdout();
                    if let Err(print_err) = err.print()
                        && print_err.kind() != io::ErrorKind::BrokenPipe
                    {
                        eprintln!("Failed to display help: {print_err}");
                    }
                    let _ = print_blank_line_stdout();
                    std::process::exit(0);
                }
                ErrorKind::MissingSubcommand => {
                    handle_missing_subcommand(err);
                }
                _ => {
                    let exit_code = err.exit_code();
                    let _ = print_blank_line_stderr();
                    if let Err(print_err) = err.print()
                        && print_err.kind() != io::ErrorKind::BrokenPipe
                    {
                        eprintln!("Failed to display error: {print_err}");
                    }
                    let _ = print_blank_line_stderr();
                    std::process::exit(exit_code);
                }
            },
        }
    }
}

fn handle_missing_subcommand(error: clap::error::Error) -> ! {
    let mut command = build_cli_command().styles(help_styles());
    let name = command.get_display_name().unwrap_or_else(|| command.get_name()).to_string();

    let _ = print_blank_line_stderr();
    eprintln!("error: '{name}' requires a subcommand but one was not provided");
    let _ = print_blank_line_stderr();

    let mut stderr = io::stderr();
    if command.write_long_help(&mut stderr).is_ok() {
        let _ = IoWrite::write_all(&mut stderr, b"\n");
        let _ = IoWrite::flush(&mut stderr);
    }

    let _ = print_blank_line_stderr();
    std::process::exit(error.exit_code());
}

fn build_cli_command() -> Command {
    let use_color = detect_color_support();
    let mut command = Cli::command()
        .after_long_help(render_top_level_appendix(use_color))
        .color(if use_color { ColorChoice::Auto } else { ColorChoice::Never });

    for example in command_examples() {
        if let Some(subcommand) = command.find_subcommand_mut(example.name) {
            *subcommand = subcommand.clone().after_long_help(render_examples(example.groups, use_color));
        }
    }
    command
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{}", stylize("Examples:", THEME.highlight, true, use_color));

    for (index, group) in groups.iter().enumerate() {
        if index > 0 {
            buffer.push('\n');
        }
        let _ = writeln!(buffer, "  {}", stylize(group.title, THEME.primary, true, use_color));
        for command in group.commands {
            let _ = writeln!(
                buffer,
                "    {} {}",
                stylize(ARROW, THEME.secondary, false, use_color),
                stylize(command, THEME.secondary, false, use_color)
            );
        }
    }

    buffer
}

fn render_top_level_appendix(use_color: bool) -> String {
    let mut buffer = String::new();

    let _ = writeln!(buffer, "{}", stylize("Environment Variables:", THEME.highlight, true, use_color));
    let width = ENVIRONMENT_VARIABLES.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, description) in ENVIRONMENT_VARIABLES {
        let padded = format!("{key:<width$}");
        let _ = writeln!(
            buffer,
            "  {}  {}",
            stylize(&padded, THEME.key, true, use_color),
            stylize(description, THEME.value, false, use_color)
        );
    }

    let _ = writeln!(
        buffer,
        "\n{} {}",
        stylize("Tip:", THEME.highlight, true, use_color),
        stylize(
            "Use 'mongo-indexer <command> --help' to view examples for each command.",
            THEME.secondary,
            false,
            use_color,
        )
    );

    buffer
}

fn print_blank_line_stdout() -> io::Result<()> {
    let mut stdout = io::stdout();
    IoWrite::write_all(&mut stdout, b"\n")?;
    IoWrite::flush(&mut stdout)
}

fn print_blank_line_stderr() -> io::Result<()> {
    let mut stderr = io::stderr();
    IoWrite::write_all(&mut stderr, b"\n")?;
    IoWrite::flush(&mut stderr)
}

fn stylize(text: &str, color: ThemeColor, bold: bool, use_color: bool) -> String {
    match (use_color, bold) {
        (false, _) => text.to_string(),
        (true, true) => text.color(color).bold().to_string(),
        (true, false) => text.color(color).to_string(),
    }
}

fn detect_color_support() -> bool {
    !std::env::args().any(|arg| arg == "--no-color") && ShouldColorize::from_env().should_colorize()
}

fn help_styles() -> Styles {
    let style = |color: ThemeColor| Style::new().fg_color(Some(color_to_clap_color(color)));
    Styles::styled()
        .usage(style(THEME.primary).bold())
        .header(style(THEME.highlight).bold())
        .literal(style(THEME.secondary))
        .placeholder(style(THEME.muted))
        .valid(style(THEME.success))
        .invalid(style(THEME.warning))
        .error(style(THEME.error).bold())
}

fn color_to_clap_color(color: ThemeColor) -> ClapColor {
    let ansi = match color {
        ThemeColor::Black => AnsiColor::Black,
        ThemeColor::Red => AnsiColor::Red,
        ThemeColor::Green => AnsiColor::Green,
        ThemeColor::Yellow => AnsiColor::Yellow,
        ThemeColor::Blue => AnsiColor::Blue,
        ThemeColor::Magenta => AnsiColor::Magenta,
        ThemeColor::Cyan => AnsiColor::Cyan,
        ThemeColor::White => AnsiColor::White,
        ThemeColor::BrightBlack => AnsiColor::BrightBlack,
        ThemeColor::BrightRed => AnsiColor::BrightRed,
        ThemeColor::BrightGreen => AnsiColor::BrightGreen,
        ThemeColor::BrightYellow => AnsiColor::BrightYellow,
        ThemeColor::BrightBlue => AnsiColor::BrightBlue,
        ThemeColor::BrightMagenta => AnsiColor::BrightMagenta,
        ThemeColor::BrightCyan => AnsiColor::BrightCyan,
        ThemeColor::BrightWhite => AnsiColor::BrightWhite,
        ThemeColor::TrueColor { r, g, b } => return ClapColor::Rgb(RgbColor(r, g, b)),
    };
    ClapColor::Ansi(ansi)
}

#[derive(Subcommand)]
enum Commands {
    /// Show the indexes each model declares
    Plan(PlanArgs),

    /// Validate index annotations without touching a database
    Check(CheckArgs),

    /// Create the declared indexes on MongoDB
    #[cfg(feature = "mongodb")]
    Apply(ApplyArgs),
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse_with_styles();

    let _ = print_blank_line_stdout();

    match execute(cli).await {
        Ok(()) => {
            let _ = print_blank_line_stdout();
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            let _ = print_blank_line_stdout();
            std::process::exit(1);
        }
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let global_options = GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    };

    if global_options.no_color {
        colored::control::set_override(false);
    }

    let output = OutputManager::new(global_options);

    match cli.command {
        Commands::Plan(args) => handle_plan(args, &output).await?,
        Commands::Check(args) => handle_check(args, &output).await?,
        #[cfg(feature = "mongodb")]
        Commands::Apply(args) => handle_apply(args, &output).await?,
    }

    Ok(())
}
