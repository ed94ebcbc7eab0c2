use regal_asm::Program;

use super::memory::Memory;

const CELLS_PER_ROW: usize = 8;

/// Disassembly of a single instruction, with a marker when `ip` points at it.
pub fn disasm_instruction(program: &Program, addr: usize, ip: Option<usize>) -> String {
    let marker = if ip == Some(addr) { "->" } else { "  " };
    match program.get(addr) {
        Some(instr) => format!("{} {:04}  {}", marker, addr, instr),
        None => format!("{} {:04}  <end>", marker, addr),
    }
}

/// Disassemble the whole program, one instruction per line.
pub fn disasm_program(program: &Program, ip: Option<usize>) -> String {
    let mut out = String::new();
    for addr in 0..program.len() {
        out.push_str(&disasm_instruction(program, addr, ip));
        out.push('\n');
    }
    out
}

/// Dump `count` cells starting at `start`, eight cells per row.
pub fn dump_memory(memory: &Memory, start: usize, count: usize) -> String {
    let end = start.saturating_add(count).min(memory.len());
    let mut out = String::new();

    let mut addr = start;
    while addr < end {
        out.push_str(&format!("{:04}:", addr));

        let row_end = (addr + CELLS_PER_ROW).min(end);
        for value in &memory.cells()[addr..row_end] {
            out.push_str(&format!(" {:>6}", value));
        }

        out.push('\n');
        addr = row_end;
    }

    out
}
