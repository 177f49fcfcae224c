// Command-line interface for the rml toolchain
//
// The main role of the rml program is converting detector configurations
// written in the legacy RML dialect into standard XML, using the rml-convert
// crate. This binary is the shell-facing layer: it parses arguments, loads
// configuration, narrates progress, and maps library errors onto exit codes.
//
// Usage:
//  rml convert <source> <destination> <root-node> [--indent] [--quiet] [--json]
//  rml <source> <destination> <root-node>   - Same as above ("convert" is injected)
//  rml check <path>                         - Well-formedness check only
//
// Exit codes (pipeline gates key off these):
//  0  converted, or nothing to convert (destination deliberately not created)
//  1  output written but failed the well-formedness check (file is kept)
//  2  usage or structural error; no output written

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use rml_config::{Loader, RmlConfig};
use rml_convert::{
    convert_file, Checker, ConvertOutcome, ConvertSpec, ConversionReport, IndentOutcome,
    RootNode, ToolSettings,
};
use std::path::Path;
use std::process;

fn build_cli() -> Command {
    Command::new("rml")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert legacy RML detector configurations to standard XML")
        .long_about(
            "rml rewrites configuration files written in the legacy RML dialect\n\
            into XML the current analysis framework accepts:\n  \
            - the 'section' keyword is stripped from top-level tags\n  \
            - the <environment> block is moved into <globals>\n  \
            - numeric attributes absorb their separate units=\"..\" attribute\n  \
            - known tags written open (<parameter ...>) are self-closed\n  \
            - a self-closed <for .../> head is reopened (its body follows)\n  \
            - stray '<'/'>' inside attribute values are escaped\n  \
            - a root node is added when several top-level elements exist\n\n\
            Known limitations (kept on purpose; existing files depend on them):\n  \
            - a single tag per line, and a single line per tag\n  \
            - at most one '<' and one '>' escaped per line\n  \
            - units attached to ${...} variable references are left untouched\n\n\
            Examples:\n  \
            rml convert run.rml run.xml restManager      # Convert a pipeline config\n  \
            rml gases.rml gases.xml gases --indent       # Convert and re-indent\n  \
            rml check gases.xml                          # Well-formedness gate",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to an rml.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Suppress progress narration (errors still print)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a legacy RML file to XML (default command)")
                .long_about(
                    "Convert one RML file from the legacy dialect to standard XML.\n\n\
                    The destination must not exist; rml never overwrites. When the\n\
                    input turns out to be canonical already, no destination is\n\
                    created at all - downstream tooling reads the file's absence\n\
                    as 'nothing needed doing'.\n\n\
                    After writing, the output is checked for well-formedness with\n\
                    xmllint (or a built-in parser when xmllint is unavailable).\n\
                    A failed check keeps the file on disk and exits with status 1.",
                )
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
                        .value_parser(clap::builder::PossibleValuesParser::new(RootNode::NAMES)),
                )
                .arg(
                    Arg::new("indent")
                        .long("indent")
                        .short('i')
                        .help("Re-indent the output after a successful check (needs emacs)")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print a one-line JSON summary instead of narration")
                        .action(ArgAction::SetTrue),
                ),
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
        )
}

/// Whether the first user argument looks like a file rather than a
/// subcommand, in which case "convert" is injected.
fn wants_convert_injection(args: &[String]) -> bool {
    args.len() > 1
        && !args[1].starts_with('-')
        && args[1] != "convert"
        && args[1] != "check"
        && args[1] != "help"
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&args) {
        Ok(matches) => matches,
        Err(err) => {
            if wants_convert_injection(&args) {
                let mut new_args = vec![args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(matches) => matches,
                    Err(err2) => err2.exit(),
                }
            } else {
                err.exit()
            }
        }
    };

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    let quiet = matches.get_flag("quiet");

    match matches.subcommand() {
        Some(("convert", sub_matches)) => handle_convert_command(sub_matches, &config, quiet),
        Some(("check", sub_matches)) => handle_check_command(sub_matches, &config, quiet),
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            process::exit(2);
        }
    }
}

fn handle_convert_command(matches: &ArgMatches, config: &RmlConfig, quiet: bool) {
    let source = matches
        .get_one::<String>("source")
        .expect("source is required");
    let destination = matches
        .get_one::<String>("destination")
        .expect("destination is required");
    let root: RootNode = matches
        .get_one::<String>("root-node")
        .expect("root-node is required")
        .parse()
        .unwrap_or_else(|err| {
            eprintln!("rml: {err}");
            process::exit(2);
        });
    let json = matches.get_flag("json");

    let spec = ConvertSpec::new(source, destination, root)
        .with_indent(matches.get_flag("indent"))
        .with_tools(ToolSettings::from(&config.convert));

    if !quiet && !json {
        println!(" * Converting '{source}'");
    }

    match convert_file(&spec) {
        Ok(ConvertOutcome::Unmodified) => {
            if json {
                println!("{}", serde_json::json!({ "status": "unmodified" }));
            } else if !quiet {
                println!("  No modification required; '{destination}' was not created");
            }
        }
        Ok(ConvertOutcome::Written {
            report,
            check,
            indent,
        }) => {
            if json {
                println!("{}", written_summary(destination, &report, check.as_ref()));
            } else if !quiet {
                narrate(&report, root);
                match &check {
                    Some(Checker::External(bin)) => {
                        println!("  Well-formedness check passed ({})", bin.display())
                    }
                    Some(Checker::Builtin) => {
                        println!("  Well-formedness check passed (built-in parser)")
                    }
                    None => {}
                }
                println!("  Wrote '{destination}'");
            }
            match indent {
                Some(IndentOutcome::Indented(bin)) => {
                    if !quiet && !json {
                        println!("  Re-indented with {}", bin.display());
                    }
                }
                Some(IndentOutcome::ToolUnavailable) => {
                    eprintln!("rml: not indenting '{destination}': no indent tool available");
                }
                Some(IndentOutcome::ToolFailed { binary, code }) => {
                    eprintln!(
                        "rml: indent tool {} exited with status {:?}; '{destination}' kept as written",
                        binary.display(),
                        code
                    );
                }
                None => {}
            }
        }
        Err(err) => {
            eprintln!("rml: {err}");
            process::exit(err.exit_code());
        }
    }
}

fn handle_check_command(matches: &ArgMatches, config: &RmlConfig, quiet: bool) {
    let path = matches.get_one::<String>("path").expect("path is required");
    if !Path::new(path).exists() {
        eprintln!("rml: cannot read '{path}': file not found");
        process::exit(2);
    }
    let settings = ToolSettings::from(&config.convert);
    match rml_convert::validate::check_well_formed(
        Path::new(path),
        settings.checker_binary.as_deref(),
    ) {
        Ok(checker) => {
            if !quiet {
                match checker {
                    Checker::External(bin) => {
                        println!("'{path}' is well-formed ({})", bin.display())
                    }
                    Checker::Builtin => println!("'{path}' is well-formed (built-in parser)"),
                }
            }
        }
        Err(err) => {
            eprintln!("rml: {err}");
            process::exit(err.exit_code());
        }
    }
}

fn narrate(report: &ConversionReport, root: RootNode) {
    for name in &report.renamed_sections {
        println!("  Renamed section tag '{name}'");
    }
    if report.environment_moved {
        println!("  Moved <environment> block into <globals>");
    }
    if report.globals_synthesized {
        println!("  Wrapped <environment> block in a new <globals>");
    }
    let tally = &report.tally;
    if tally.unit_folds > 0 {
        println!("  {} units attribute(s) folded", tally.unit_folds);
    }
    if tally.self_closing > 0 {
        println!("  {} self-closing tag(s) processed", tally.self_closing);
    }
    if tally.bracket_escapes > 0 {
        println!(
            "  {} attribute value(s) with '<' or '>' escaped",
            tally.bracket_escapes
        );
    }
    if tally.for_loops > 0 {
        println!("  {} for loop(s) processed", tally.for_loops);
    }
    if report.root_wrapped {
        println!("  Added root node <{root}>");
    }
}

fn written_summary(
    destination: &str,
    report: &ConversionReport,
    check: Option<&Checker>,
) -> serde_json::Value {
    serde_json::json!({
        "status": "written",
        "destination": destination,
        "tally": report.tally,
        "renamed_sections": report.renamed_sections,
        "environment_moved": report.environment_moved,
        "globals_synthesized": report.globals_synthesized,
        "root_wrapped": report.root_wrapped,
        "checked": check.is_some(),
    })
}

fn load_cli_config(explicit_path: Option<&str>) -> RmlConfig {
    let loader = Loader::new().with_optional_file("rml.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        process::exit(2);
    })
}
