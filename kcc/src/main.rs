use clap::Parser;
use itertools::Itertools;
use kcc::grammer::ast::Ast;
use kcc::{lex, lower_program, Config, Error};
use std::fs;
use tracing_subscriber::EnvFilter;

#[derive(Debug, clap::Parser)]
#[clap(author, version, about)]
struct Args {
    /// Input files
    #[clap(default_value = "main.kc")]
    input: Vec<String>,

    /// Write the IR listing here instead of stdout
    #[clap(short, long)]
    output: Option<String>,

    /// YAML configuration file
    #[clap(short, long)]
    config: Option<String>,

    /// Print each function's expression tree
    #[clap(short = 't', long)]
    dump_tree: bool,

    /// Emit IR as YAML instead of text
    #[clap(short, long)]
    yaml: bool,

    /// Raise log level (repeatable)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(config: &Config, verbose: u8) {
    let level = if verbose == 0 {
        config.log_level.clone()
    } else {
        config.level(verbose)
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn dump_tree(name: &str, ast: &Ast) {
    if ast.root.is_some() {
        println!("[TREE] {}", name);
        print!("{}", ast.pretty());
    }
}

/// Compile one source text into its listing
fn compile(source: &str, config: &Config, colored: bool) -> Result<String, Error> {
    let tokens = lex(source)?;
    let program = kcc::Parser::new(&tokens).parse_program()?;

    if config.dump_tree {
        for ast in &program.functions {
            dump_tree("function", ast);
        }
        dump_tree(kcc::lower::TOPLEVEL, &program.toplevel);
    }

    let units = lower_program(&program)?;
    if config.yaml {
        return Ok(serde_yaml::to_string(&units)?);
    }
    Ok(units
        .iter()
        .map(|unit| if colored { unit.cformat() } else { unit.to_string() })
        .join("\n"))
}

fn main() {
    let args = Args::parse();

    // 1. Configuration: file first, flags override
    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                e.print_diag(path, "", true);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    config.dump_tree |= args.dump_tree;
    config.yaml |= args.yaml;
    init_tracing(&config, args.verbose);

    // 2. Compile each input
    let colored = config.color && args.output.is_none() && !config.yaml;
    let mut listing = String::new();
    for input in &args.input {
        let source = match fs::read_to_string(input) {
            Ok(source) => source,
            Err(e) => {
                Error::from(e).print_diag(input, "", config.color);
                std::process::exit(1);
            }
        };
        match compile(&source, &config, colored) {
            Ok(text) => listing.push_str(&text),
            Err(e) => {
                tracing::debug!(kind = ?e.kind(), "compile failed");
                e.print_diag(input, &source, config.color);
                std::process::exit(1);
            }
        }
    }

    // 3. Output
    match &args.output {
        Some(path) => {
            if let Err(e) = fs::write(path, &listing) {
                Error::from(e).print_diag(path, "", config.color);
                std::process::exit(1);
            }
        }
        None => print!("{}", listing),
    }
}
