//! Composite builders for helper calls.
//!
//! Helpers take up to five word-sized arguments in `R1`..`R5` and return in
//! `R0`. The builders below emit the register setup for one call and return
//! the head of the resulting linear chain, ready to be linked into a larger
//! program.

use crate::{
    api::AsmError,
    graph::{NodeId, Program},
    isa::{Operand, Register, helpers},
};

/// Link `nodes` one after another and return the first.
pub fn instruction_sequence<Ctx>(
    program: &mut Program<Ctx>,
    nodes: &[NodeId],
) -> Result<NodeId, AsmError> {
    let (&head, rest) = nodes.split_first().ok_or(AsmError::EmptySequence)?;
    let mut tail = head;
    for &node in rest {
        program.link(tail, node)?;
        tail = node;
    }
    Ok(head)
}

/// Move `args` into the argument registers and call `helper`.
pub fn call_helper<Ctx>(
    program: &mut Program<Ctx>,
    helper: i32,
    args: &[Operand],
) -> Result<NodeId, AsmError> {
    if args.len() > Register::ARGS.len() {
        return Err(AsmError::TooManyArguments {
            helper,
            count: args.len(),
        });
    }
    let mut nodes: crate::Vec<NodeId> = Register::ARGS
        .iter()
        .zip(args)
        .map(|(&reg, &arg)| program.mov64(reg, arg))
        .collect();
    nodes.push(program.call(helper));
    instruction_sequence(program, &nodes)
}

/// Look up `element` in the map pointed to by `map_ptr`; `R0` receives the
/// value pointer or NULL.
///
/// The key is stored at `key_ptr + offset` as a u32:
/// - `R1 = map_ptr`
/// - `*(u32 *)(key_ptr + offset) = element`
/// - `R2 = key_ptr + offset`
/// - `call map_lookup_elem`
pub fn ld_map_element<Ctx>(
    program: &mut Program<Ctx>,
    map_ptr: Register,
    element: i32,
    key_ptr: Register,
    offset: i16,
) -> Result<NodeId, AsmError> {
    let nodes = [
        program.mov64(Register::R1, map_ptr),
        program.st_w(key_ptr, offset, element),
        program.mov64(Register::R2, key_ptr),
        program.add64(Register::R2, i32::from(offset)),
        program.call(helpers::MAP_LOOKUP_ELEM),
    ];
    instruction_sequence(program, &nodes)
}

/// Set up and call
/// `skb_load_bytes_relative(skb, skb_offset, dst + dst_offset, length, start_header)`.
pub fn call_skb_load_bytes_relative<Ctx>(
    program: &mut Program<Ctx>,
    skb: Register,
    skb_offset: impl Into<Operand>,
    dst_address: Register,
    dst_address_offset: impl Into<Operand>,
    length: impl Into<Operand>,
    start_header: impl Into<Operand>,
) -> Result<NodeId, AsmError> {
    let nodes = [
        program.mov64(Register::R1, skb),
        program.mov64(Register::R2, skb_offset),
        program.mov64(Register::R3, dst_address),
        program.add64(Register::R3, dst_address_offset),
        program.mov64(Register::R4, length),
        program.mov64(Register::R5, start_header),
        program.call(helpers::SKB_LOAD_BYTES_RELATIVE),
    ];
    instruction_sequence(program, &nodes)
}
