// Command-line interface for mdocx
//
// This binary converts documentation between DOCX and Markdown and checks round trips.
// The work is done by the mdocx-babel library; this crate only parses arguments, loads
// configuration, and prints results.
//
// Converting:
//
// The direction comes from the input extension (.docx -> Markdown, .md -> DOCX) and can
// be forced with --to. Without -o the output lands next to the input with the other
// extension; `-o -` prints Markdown to stdout.
// Usage:
//  mdocx <input> [--to <format>] [-o <file>]          - Convert a file (default)
//  mdocx convert <input> [--to <format>] [-o <file>]  - Same as above (explicit)
//  mdocx batch <input-dir> <output-dir> [--to <fmt>]  - Convert a folder tree
//  mdocx diff <old> <new> [--mode lines|ast]          - Compare files or folders
//  mdocx inspect <path> [<transform>]                 - Show a document at some stage
//  mdocx --list-formats                               - List conversion formats
//
// Configuration:
//
// Built-in defaults, then ./mdocx.toml if present, then --config <path>. Flags given on
// the command line win over all of them.

mod transforms;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::info;
use mdocx_babel::diff::{self, DiffMode, DiffOptions, ReportFormat};
use mdocx_babel::{
    convert_batch, convert_file, ConvertArtifact, ConvertSpec, FormatRegistry, RenderOptions,
};
use mdocx_config::{Loader, MdocxConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

fn conversion_args() -> [Arg; 4] {
    [
        Arg::new("to")
            .long("to")
            .help("Target format (defaults to the opposite of the input)")
            .value_parser(["docx", "markdown"])
            .value_hint(ValueHint::Other),
        Arg::new("zone-pivot")
            .long("zone-pivot")
            .value_name("PIVOT")
            .help("Keep only zones for this pivot, without markers")
            .value_hint(ValueHint::Other),
        Arg::new("plain-markdown")
            .long("plain-markdown")
            .help("Write images as plain Markdown/HTML instead of :::image::: directives")
            .action(ArgAction::SetTrue),
        Arg::new("strict")
            .long("strict")
            .help("Fail on directives missing a required attribute")
            .action(ArgAction::SetTrue),
    ]
}

fn build_cli() -> Command {
    Command::new("mdocx")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert documentation between DOCX and Markdown")
        .long_about(
            "mdocx converts documentation between Word (.docx) and platform Markdown (.md),\n\
            keeping headings, lists, tables, code, callouts, images and :::directives:::.\n\n\
            Commands:\n  \
            - convert: Convert one file (default)\n  \
            - batch:   Convert every file under a folder\n  \
            - diff:    Compare two files or folders, ignoring inert Markdown differences\n  \
            - inspect: Show a document's object model or comparison tree\n\n\
            Examples:\n  \
            mdocx guide.docx                      # Writes guide.md next to it\n  \
            mdocx guide.md -o out/guide.docx      # Markdown to DOCX\n  \
            mdocx guide.docx -o -                 # Markdown to stdout\n  \
            mdocx diff old.md new.md --mode ast   # Structural comparison",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available conversion formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a mdocx.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log progress (info level) to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a file between DOCX and Markdown (default command)")
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path, or - for stdout (Markdown only)")
                        .value_hint(ValueHint::FilePath),
                )
                .args(conversion_args()),
        )
        .subcommand(
            Command::new("batch")
                .about("Convert every DOCX and Markdown file under a folder")
                .long_about(
                    "Convert every recognized file under <input-dir> into <output-dir>, keeping\n\
                    relative paths. Files are converted one at a time; the first failure stops\n\
                    the batch after removing that file's partial output.",
                )
                .arg(
                    Arg::new("input-dir")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("output-dir")
                        .required(true)
                        .index(2)
                        .value_hint(ValueHint::DirPath),
                )
                .args(conversion_args()),
        )
        .subcommand(
            Command::new("diff")
                .about("Compare two files or two folders")
                .long_about(
                    "Compare two files, or every file pair with the same relative path in two\n\
                    folders.\n\n\
                    Modes:\n  \
                    - lines: line diff; -/* bullet and */_ emphasis swaps and blank lines are ignored\n  \
                    - ast:   positional comparison of the parsed trees (.md, .docx, .yml)",
                )
                .arg(
                    Arg::new("old")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::AnyPath),
                )
                .arg(
                    Arg::new("new")
                        .required(true)
                        .index(2)
                        .value_hint(ValueHint::AnyPath),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .value_parser(["lines", "ast"])
                        .help("Comparison mode (default from config: lines)"),
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .value_parser(["text", "csv", "markdown"])
                        .help("Report format (default from config: text)"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Write the report to a file instead of stdout")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show a document at a stage of conversion")
                .arg(
                    Arg::new("path")
                        .help("Path to a .docx or .md file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply. Defaults to 'tree'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&args) {
        Ok(m) => m,
        Err(e) => {
            // A bare file argument means "convert"
            if args.len() > 1
                && !args[1].starts_with('-')
                && !["convert", "batch", "diff", "inspect", "help"].contains(&args[1].as_str())
            {
                let mut new_args = vec![args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    init_logging(matches.get_flag("verbose"));

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));

    match matches.subcommand() {
        Some(("convert", sub_matches)) => handle_convert_command(sub_matches, &config),
        Some(("batch", sub_matches)) => handle_batch_command(sub_matches, &config),
        Some(("diff", sub_matches)) => handle_diff_command(sub_matches, &config),
        Some(("inspect", sub_matches)) => handle_inspect_command(sub_matches, &config),
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    process::exit(1);
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    match matches.get_one::<String>(name) {
        Some(value) => value,
        None => fail(format!("missing argument <{name}>")),
    }
}

/// Configured render options with command-line flags applied on top.
fn render_options(matches: &ArgMatches, config: &MdocxConfig) -> RenderOptions {
    let mut options = RenderOptions::from(&config.convert);
    if let Some(pivot) = matches.get_one::<String>("zone-pivot") {
        options.zone_pivot = Some(pivot.clone()).filter(|p| !p.trim().is_empty());
    }
    if matches.get_flag("plain-markdown") {
        options.plain_markdown = true;
    }
    if matches.get_flag("strict") {
        options.strict_directives = true;
    }
    options
}

/// Handle the convert command
fn handle_convert_command(matches: &ArgMatches, config: &MdocxConfig) {
    let input = PathBuf::from(required(matches, "input"));
    let registry = FormatRegistry::default();
    let source = registry
        .detect_format_from_filename(&input.to_string_lossy())
        .unwrap_or_else(|| fail(format!("Could not detect format from filename '{}'", input.display())));
    let target = matches
        .get_one::<String>("to")
        .cloned()
        .unwrap_or_else(|| if source == "docx" { "markdown".into() } else { "docx".into() });

    let mut spec = ConvertSpec::new(&input)
        .with_target(target.as_str())
        .with_options(render_options(matches, config));
    match matches.get_one::<String>("output").map(String::as_str) {
        Some("-") => {}
        Some(path) => spec = spec.with_output_path(path),
        None => {
            let output = default_output(&input, &target);
            if output == input {
                fail("output would overwrite the input; pass -o <path>");
            }
            spec = spec.with_output_path(output);
        }
    }

    match convert_file(&spec) {
        Ok(result) => match result.artifact {
            ConvertArtifact::InMemory(text) => print!("{text}"),
            ConvertArtifact::File(path) => {
                info!("Wrote {} ({} media files)", path.display(), result.media.len())
            }
        },
        Err(e) => fail(e),
    }
}

fn default_output(input: &Path, target: &str) -> PathBuf {
    let extension = if target == "docx" { "docx" } else { "md" };
    input.with_extension(extension)
}

/// Handle the batch command
fn handle_batch_command(matches: &ArgMatches, config: &MdocxConfig) {
    let input_dir = Path::new(required(matches, "input-dir"));
    let output_dir = Path::new(required(matches, "output-dir"));
    let target = matches.get_one::<String>("to").map(String::as_str);
    let options = render_options(matches, config);

    match convert_batch(input_dir, output_dir, target, &options) {
        Ok(results) => eprintln!("Converted {} files", results.len()),
        Err(e) => fail(e),
    }
}

/// Handle the diff command
fn handle_diff_command(matches: &ArgMatches, config: &MdocxConfig) {
    let old = Path::new(required(matches, "old"));
    let new = Path::new(required(matches, "new"));

    let mut options = DiffOptions::from(&config.diff);
    if let Some(mode) = matches.get_one::<String>("mode") {
        options.mode = mode.parse::<DiffMode>().unwrap_or_else(|e| fail(e));
    }
    let report_format = match matches.get_one::<String>("report") {
        Some(report) => report.parse::<ReportFormat>().unwrap_or_else(|e| fail(e)),
        None => ReportFormat::from(config.diff.report),
    };

    let diffs = if old.is_dir() {
        diff::compare_dirs(old, new, &options)
    } else {
        diff::compare_files(old, new, &options).map(|diff| vec![diff])
    }
    .unwrap_or_else(|e| fail(e));

    let report = diff::render_report(&diffs, report_format).unwrap_or_else(|e| fail(e));
    match matches.get_one::<String>("output") {
        Some(path) => fs::write(path, report)
            .unwrap_or_else(|e| fail(format!("writing file '{path}': {e}"))),
        None => print!("{report}"),
    }
}

/// Handle the inspect command
fn handle_inspect_command(matches: &ArgMatches, config: &MdocxConfig) {
    let path = Path::new(required(matches, "path"));
    let transform = matches
        .get_one::<String>("transform")
        .map(|s| s.as_str())
        .unwrap_or("tree");
    let options = RenderOptions::from(&config.convert);

    let output = transforms::execute_transform(path, transform, &options)
        .unwrap_or_else(|e| fail(e));
    print!("{output}");
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    println!("Conversion formats:");
    let registry = FormatRegistry::default();
    for format_name in registry.list_formats() {
        if let Ok(format) = registry.get(&format_name) {
            println!(
                "  {format_name:<10} {} (.{})",
                format.description(),
                format.file_extensions().join(", .")
            );
        }
    }
    println!("\nInspect transforms:");
    for transform_name in transforms::AVAILABLE_TRANSFORMS {
        println!("  {transform_name}");
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> MdocxConfig {
    let loader = Loader::new().with_optional_file("mdocx.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        process::exit(1);
    })
}
