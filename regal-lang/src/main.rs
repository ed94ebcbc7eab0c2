use clap::Parser as CParser;
use regal_asm::{ParsePolicy, Parser};
use regal_lang::log::{self, Level};
use regal_lang::runtime::{Machine, MachineConfig, MachineState, disasm};
use regal_lang::{InputSource, VMError};
use regal_lang::{error, info};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(CParser)]
#[command(name = "regal")]
#[command(about = "Run a regal register-machine program")]
struct Args {
    program: PathBuf,

    /// Read `scan` values from this file instead of stdin
    #[arg(long = "input")]
    input_file: Option<PathBuf>,

    /// Abort after this many instructions
    #[arg(long)]
    max_steps: Option<u64>,

    #[arg(long, default_value_t = regal_lang::runtime::MEMORY_SIZE)]
    memory_size: usize,

    /// Reject lines with unknown commands instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Print the disassembly and final memory to stderr
    #[arg(long)]
    dump: bool,

    /// -v for info, -vv for a trace of every step
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(args: Args) -> Result<String, Box<dyn std::error::Error>> {
    let src = fs::read_to_string(&args.program)?;

    let policy = if args.strict {
        ParsePolicy::Strict
    } else {
        ParsePolicy::Lenient
    };
    let program = Parser::new(&src).with_policy(policy).parse()?;
    info!(
        "parsed {} instruction(s) from {}",
        program.len(),
        args.program.display()
    );

    if args.dump {
        eprint!("{}", disasm::disasm_program(&program, None));
    }

    let config = MachineConfig {
        memory_size: args.memory_size,
        step_limit: args.max_steps,
        trace: args.verbose >= 2,
    };

    let output = match &args.input_file {
        Some(path) => {
            let reader = BufReader::new(File::open(path)?);
            run_machine(Machine::new(&program, reader, config), args.dump)?
        }
        None => run_machine(Machine::new(&program, io::stdin().lock(), config), args.dump)?,
    };

    Ok(output)
}

fn run_machine<I: InputSource>(
    mut mach: Machine<'_, I>,
    dump: bool,
) -> Result<String, VMError> {
    let result = loop {
        match mach.step() {
            Ok(MachineState::Running) => continue,
            Ok(MachineState::Halted) => break Ok(()),
            Err(e) => break Err(e),
        }
    };

    info!("halted at {:04} after {} step(s)", mach.ip, mach.steps);
    if dump {
        eprint!("{}", disasm::dump_memory(&mach.memory, 0, mach.memory.len()));
    }

    result.map(|_| mach.output)
}

fn main() -> ExitCode {
    let args = Args::parse();

    log::set_level(match args.verbose {
        0 => Level::Warn,
        1 => Level::Info,
        _ => Level::Trace,
    });

    match run(args) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
