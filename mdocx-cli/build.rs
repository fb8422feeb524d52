use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the transforms from src/transforms.rs
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_TRANSFORMS: &[&str] = &["ir-json", "rendered-json", "tree"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("mdocx")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert documentation between DOCX and Markdown")
        .arg_required_else_help(true)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available conversion formats")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath),
        )
        .subcommand(
            Command::new("convert")
                .arg(Arg::new("input").required(true).value_hint(ValueHint::FilePath))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                )
                .arg(Arg::new("to").long("to").value_parser(["docx", "markdown"])),
        )
        .subcommand(
            Command::new("batch")
                .arg(Arg::new("input-dir").required(true).value_hint(ValueHint::DirPath))
                .arg(Arg::new("output-dir").required(true).value_hint(ValueHint::DirPath)),
        )
        .subcommand(
            Command::new("diff")
                .arg(Arg::new("old").required(true).value_hint(ValueHint::AnyPath))
                .arg(Arg::new("new").required(true).value_hint(ValueHint::AnyPath))
                .arg(Arg::new("mode").long("mode").value_parser(["lines", "ast"]))
                .arg(
                    Arg::new("report")
                        .long("report")
                        .value_parser(["text", "csv", "markdown"]),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .arg(Arg::new("path").required(true).value_hint(ValueHint::FilePath))
                .arg(
                    Arg::new("transform").value_parser(clap::builder::PossibleValuesParser::new(
                        AVAILABLE_TRANSFORMS,
                    )),
                ),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "mdocx", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "mdocx", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "mdocx", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
