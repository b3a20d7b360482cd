//! Small complete programs built from the composite builders.
//!
//! Each returns the root node; pass it to
//! [`Assembler::assemble`](crate::api::Assembler::assemble).

use crate::{
    api::AsmError,
    builders::{call_skb_load_bytes_relative, instruction_sequence, ld_map_element},
    graph::{NodeId, Program},
    isa::Register,
};

/// `BPF_HDR_START_NET` for `skb_load_bytes_relative`.
pub const HDR_START_NET: i32 = 1;

/// Look up `key` in the map whose pointer is in `map_ptr` and return 1 if the
/// element exists, 0 otherwise.
///
/// ```text
/// r1 = map_ptr
/// *(u32 *)(r10 - 4) = key
/// r2 = r10
/// r2 += -4
/// call map_lookup_elem
/// if r0 == 0 goto +1
/// r0 = 1
/// exit
/// ```
pub fn map_lookup(program: &mut Program, map_ptr: Register, key: i32) -> Result<NodeId, AsmError> {
    let lookup = ld_map_element(program, map_ptr, key, Register::R10, -4)?;

    let check = program.jeq(Register::R0, 0, 1);
    let found = program.mov64(Register::R0, 1);
    program.set_false_branch(check, found)?;

    let exit = program.exit();
    program.link(check, exit)?;
    program.link(lookup, check)?;
    Ok(lookup)
}

/// Copy `length` bytes from the start of the network header onto the stack
/// and return 1 on success. A negative helper result is returned as is.
///
/// Both continuations of the result check are generated during assembly.
pub fn skb_load(program: &mut Program, length: i32) -> Result<NodeId, AsmError> {
    let save_ctx = program.mov64(Register::R6, Register::R1);
    let load = call_skb_load_bytes_relative(
        program,
        Register::R6,
        0,
        Register::R10,
        -length,
        length,
        HDR_START_NET,
    )?;

    let check = program.jne(Register::R0, 0, 0);
    program.set_false_generator(check, |program, _| (program.mov64(Register::R0, 1), 1))?;
    program.set_true_generator(check, |program, _| program.exit())?;

    instruction_sequence(program, &[save_ctx, load, check])
}
