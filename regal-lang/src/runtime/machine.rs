//! Core of the regal VM
//! The machine walks the instruction list with an instruction pointer,
//! mutating a flat memory bank and collecting printed output.

use regal_asm::{Address, Instr, Program};

use super::input::{InputQueue, InputSource};
use super::memory::{MEMORY_SIZE, Memory};
use super::{VMError, VMResult, disasm};
use crate::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    pub memory_size: usize,
    /// Fail once this many instructions have run. `None` runs forever.
    pub step_limit: Option<u64>,
    /// Dump memory after every step at trace level.
    pub trace: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            memory_size: MEMORY_SIZE,
            step_limit: None,
            trace: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    Running,
    Halted,
}

pub struct Machine<'p, I: InputSource> {
    pub ip: usize, // instruction pointer
    pub state: MachineState,
    pub steps: u64,

    pub program: &'p Program,
    pub memory: Memory,
    pub output: String,

    input: InputQueue<I>,
    config: MachineConfig,
}

impl<'p, I: InputSource> Machine<'p, I> {
    pub fn new(program: &'p Program, input: I, config: MachineConfig) -> Self {
        Self {
            ip: 0,
            state: MachineState::Running,
            steps: 0,

            program,
            memory: Memory::new(config.memory_size),
            output: String::new(),

            input: InputQueue::new(input),
            config,
        }
    }

    fn fetch(&mut self) -> Option<Instr> {
        let instr = self.program.get(self.ip).copied();
        if instr.is_none() {
            // Ran off the end
            self.state = MachineState::Halted;
        }
        instr
    }

    fn jump_target(&self, target: Address) -> VMResult<usize> {
        usize::try_from(target.value).map_err(|_| VMError::BadJumpTarget {
            ip: self.ip,
            target: target.value,
        })
    }

    fn jump_if(&mut self, taken: bool, target: Address) -> VMResult<()> {
        if taken {
            self.ip = self.jump_target(target)?;
        } else {
            self.ip += 1;
        }
        Ok(())
    }

    fn execute(&mut self, instr: Instr) -> VMResult<()> {
        match instr {
            Instr::Inc(a) => {
                let value = self.memory.read(a)?;
                self.memory.write(a, value.wrapping_add(1))?;
                self.ip += 1;
            }
            Instr::Dec(a) => {
                let value = self.memory.read(a)?;
                self.memory.write(a, value.wrapping_sub(1))?;
                self.ip += 1;
            }
            Instr::Stop => {
                self.state = MachineState::Halted;
            }
            Instr::Print(a) => {
                let value = self.memory.read(a)?;
                self.output.push_str(&value.to_string());
                self.output.push('\n');
                self.ip += 1;
            }
            Instr::Jzero(v, target) => {
                let taken = self.memory.read(v)? == 0;
                self.jump_if(taken, target)?;
            }
            Instr::Jnzero(v, target) => {
                let taken = self.memory.read(v)? != 0;
                self.jump_if(taken, target)?;
            }
            Instr::Scan(a) => {
                let value = self.input.next_value()?;
                self.memory.write(a, value)?;
                self.ip += 1;
            }
        }

        Ok(())
    }

    /// Run a single instruction. Returns the state afterwards.
    pub fn step(&mut self) -> VMResult<MachineState> {
        if self.state == MachineState::Halted {
            return Ok(self.state);
        }

        let Some(instr) = self.fetch() else {
            return Ok(self.state);
        };

        if let Some(limit) = self.config.step_limit {
            if self.steps >= limit {
                return Err(VMError::StepLimitExceeded { limit });
            }
        }

        trace!("{:04}  {}", self.ip, instr);
        self.execute(instr)?;
        self.steps += 1;

        if self.config.trace {
            self.dump_ctx();
        }

        Ok(self.state)
    }

    pub fn dump_ctx(&self) {
        trace!(
            "ip: {:04}\tsteps: {}\tstate: {:?}\n{}",
            self.ip,
            self.steps,
            self.state,
            disasm::dump_memory(&self.memory, 0, 32)
        );
    }

    /// Run until halted and hand back everything printed.
    pub fn run(mut self) -> VMResult<String> {
        while self.step()? == MachineState::Running {}
        Ok(self.output)
    }
}

/// Run a program against fresh memory with the default configuration.
pub fn execute<I: InputSource>(program: &Program, input: I) -> VMResult<String> {
    Machine::new(program, input, MachineConfig::default()).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::input::NoInput;
    use proptest::prelude::*;
    use regal_asm::parse;
    use std::io::Cursor;

    fn run(src: &str) -> String {
        let program = parse(src).unwrap();
        execute(&program, NoInput).unwrap()
    }

    fn run_err(src: &str) -> VMError {
        let program = parse(src).unwrap();
        execute(&program, NoInput).unwrap_err()
    }

    #[test]
    fn empty_program_prints_nothing() {
        assert_eq!(run(""), "");
    }

    #[test]
    fn memory_starts_filled_with_zeros() {
        assert_eq!(run("print @0\nprint @1"), "0\n0\n");
    }

    #[test]
    fn inc_increments_value() {
        assert_eq!(run("inc @0\nprint @0"), "1\n");
    }

    #[test]
    fn dec_decrements_value() {
        assert_eq!(run("dec @0\nprint @0"), "-1\n");
    }

    #[test]
    fn program_starts_on_stop() {
        assert_eq!(run("stop\nprint @0\ninc @0\nprint @0"), "");
    }

    #[test]
    fn stop_halts_midway() {
        assert_eq!(run("print .1\nstop\nprint .2"), "1\n");
    }

    #[test]
    fn immediate_address_mode_returns_value() {
        assert_eq!(run("print .1"), "1\n");
    }

    #[test]
    fn inc_on_immediate_is_discarded() {
        assert_eq!(run("inc .5\nprint .5\nprint @5"), "5\n0\n");
    }

    #[test]
    fn indirect_address_mode_uses_referenced_cell() {
        let src = "
        inc @0
        dec *0
        print @1
        ";
        assert_eq!(run(src), "-1\n");
    }

    #[test]
    fn jzero_jumps_when_zero() {
        let src = "
        jzero .0 foo
        print @0
        label foo
        print @0
        ";
        assert_eq!(run(src), "0\n");
    }

    #[test]
    fn jzero_falls_through_when_nonzero() {
        let src = "
        jzero .1 foo
        print @0
        label foo
        print @0
        ";
        assert_eq!(run(src), "0\n0\n");
    }

    #[test]
    fn jnzero_jumps_when_nonzero() {
        let src = "
        jnzero .1 foo
        print @0
        label foo
        print @0
        ";
        assert_eq!(run(src), "0\n");
    }

    #[test]
    fn jnzero_falls_through_when_zero() {
        let src = "
        jnzero .0 foo
        print @0
        label foo
        print @0
        ";
        assert_eq!(run(src), "0\n0\n");
    }

    #[test]
    fn jumping_between_many_labels() {
        let src = "
        jzero .0 start
        label foo
        inc @0
        inc @0
        label start
        jzero @0 foo
        print @0
        ";
        assert_eq!(run(src), "2\n");
    }

    #[test]
    fn countdown_loop() {
        let src = "
        inc @0
        inc @0
        inc @0
        label loop
        print @0
        dec @0
        jnzero @0 loop
        ";
        assert_eq!(run(src), "3\n2\n1\n");
    }

    #[test]
    fn jump_to_end_halts() {
        assert_eq!(run("print .1\njzero .0 end\nprint .2\nlabel end"), "1\n");
    }

    #[test]
    fn scan_reads_from_input() {
        let program = parse("scan @0\nscan @1\nscan *1\nprint @0\nprint @1\nprint @2").unwrap();
        let out = execute(&program, Cursor::new("4 2\n9\n")).unwrap();
        assert_eq!(out, "4\n2\n9\n");
    }

    #[test]
    fn scan_without_input_fails() {
        assert!(matches!(run_err("scan @0"), VMError::InputExhausted));
    }

    #[test]
    fn out_of_bounds_is_memory_fault() {
        assert!(run_err("inc @256").is_memory_fault());
        assert!(run_err("print @-1").is_memory_fault());
        assert!(run_err("dec @0\nprint *0").is_memory_fault());
    }

    #[test]
    fn custom_memory_size() {
        let program = parse("inc @7\nprint @7").unwrap();
        let config = MachineConfig {
            memory_size: 8,
            ..MachineConfig::default()
        };
        assert_eq!(Machine::new(&program, NoInput, config.clone()).run().unwrap(), "1\n");

        let program = parse("inc @8").unwrap();
        let err = Machine::new(&program, NoInput, config).run().unwrap_err();
        assert!(matches!(err, VMError::MemoryFault { index: 8, size: 8 }));
    }

    #[test]
    fn step_limit_stops_infinite_loop() {
        let program = parse("label spin\njzero .0 spin").unwrap();
        let config = MachineConfig {
            step_limit: Some(100),
            ..MachineConfig::default()
        };

        let err = Machine::new(&program, NoInput, config).run().unwrap_err();
        assert!(matches!(err, VMError::StepLimitExceeded { limit: 100 }));
    }

    #[test]
    fn step_limit_not_hit_by_terminating_program() {
        let program = parse("inc @0\nprint @0").unwrap();
        let config = MachineConfig {
            step_limit: Some(2),
            ..MachineConfig::default()
        };
        assert_eq!(Machine::new(&program, NoInput, config).run().unwrap(), "1\n");
    }

    #[test]
    fn bad_jump_target_fails() {
        let program = Program::from(vec![Instr::Jzero(
            Address::immediate(0),
            Address::immediate(-2),
        )]);
        let err = execute(&program, NoInput).unwrap_err();
        assert!(matches!(err, VMError::BadJumpTarget { ip: 0, target: -2 }));
    }

    #[test]
    fn stepping_tracks_state() {
        let program = parse("inc @0\nstop\ninc @0").unwrap();
        let mut mach = Machine::new(&program, NoInput, MachineConfig::default());

        assert_eq!(mach.step().unwrap(), MachineState::Running);
        assert_eq!(mach.ip, 1);
        assert_eq!(mach.step().unwrap(), MachineState::Halted);
        assert_eq!(mach.step().unwrap(), MachineState::Halted);
        assert_eq!(mach.steps, 2);
        assert_eq!(mach.memory.load(0).unwrap(), 1);
    }

    proptest! {
        #[test]
        fn fresh_memory_prints_zeros(cells in proptest::collection::vec(0i64..256, 0..32)) {
            let src: String = cells.iter().map(|k| format!("print @{}\n", k)).collect();
            prop_assert_eq!(run(&src), "0\n".repeat(cells.len()));
        }

        #[test]
        fn stop_first_prints_nothing(tail in proptest::collection::vec(0i64..256, 0..16)) {
            let mut src = String::from("stop\n");
            for k in &tail {
                src.push_str(&format!("inc @{k}\nprint @{k}\n"));
            }
            prop_assert_eq!(run(&src), "");
        }

        #[test]
        fn repeated_inc_and_dec(n in 0usize..50, cell in 0i64..256) {
            let inc = format!("{}print @{cell}\n", format!("inc @{cell}\n").repeat(n));
            prop_assert_eq!(run(&inc), format!("{n}\n"));

            let dec = format!("{}print @{cell}\n", format!("dec @{cell}\n").repeat(n));
            prop_assert_eq!(run(&dec), format!("{}\n", -(n as i64)));
        }
    }
}
