use clap::Parser as CParser;
use regal_asm::{ParsePolicy, Parser};
use std::fs;
use std::path::PathBuf;

#[derive(CParser)]
#[command(name = "ras")]
#[command(about = "regal assembler, prints the resolved instruction listing")]
struct Args {
    input: PathBuf,

    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Reject lines with unknown commands instead of skipping them
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Read input file
    let input = fs::read_to_string(&args.input)?;

    let policy = if args.strict {
        ParsePolicy::Strict
    } else {
        ParsePolicy::Lenient
    };

    let program = Parser::new(&input).with_policy(policy).parse()?;

    let listing = program.to_string();

    match args.output {
        Some(path) => {
            fs::write(&path, &listing)?;
            println!("Listing written to {}", path.display());
            println!("Instruction count: {}", program.len());
        }
        None => print!("{}", listing),
    }

    Ok(())
}
