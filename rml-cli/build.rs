use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the root node names from rml-convert's RootNode::NAMES.
// We need to duplicate this here since build scripts can't access src/ modules
const ROOT_NODES: &[&str] = &["restG4", "restManager", "processes", "gases", "readouts"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("rml")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert legacy RML detector configurations to standard XML")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("convert")
                .about("Convert a legacy RML file to XML")
                .arg(
                    Arg::new("source")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("destination")
                        .help("Output file path (must not exist yet)")
                        .required(true)
                        .index(2)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("root-node")
                        .help("Tag name assigned to the root node, if one has to be added")
                        .required(true)
                        .index(3)
                        .value_parser(clap::builder::PossibleValuesParser::new(ROOT_NODES)),
                )
                .arg(
                    Arg::new("indent")
                        .long("indent")
                        .short('i')
                        .action(ArgAction::SetTrue),
                )
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("check")
                .about("Check that a file is well-formed XML")
                .arg(
                    Arg::new("path")
                        .help("File to check")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                ),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "rml", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "rml", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "rml", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
