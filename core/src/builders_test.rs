use crate::{
    api::AsmError,
    builders::*,
    graph::Program,
    isa::{DecodedInsn, InsClass, Operand, Register, helpers},
};
use pretty_assertions::assert_eq;

#[test]
fn test_ld_map_element_listing() {
    let mut program: Program = Program::new();
    let head = ld_map_element(&mut program, Register::R6, 7, Register::R10, -4).unwrap();

    assert_eq!(
        program.poc(head).unwrap(),
        vec![
            "BPF_MOV64_REG(BPF_REG_1, BPF_REG_6)",
            "BPF_ST_MEM(BPF_W, BPF_REG_10, -4, 7)",
            "BPF_MOV64_REG(BPF_REG_2, BPF_REG_10)",
            "BPF_ALU64_IMM(BPF_ADD, BPF_REG_2, -4)",
            "BPF_CALL_FUNC(BPF_FUNC_map_lookup_elem)",
        ]
    );
}

#[test]
fn test_ld_map_element_words() {
    let mut program: Program = Program::new();
    let head = ld_map_element(&mut program, Register::R6, 7, Register::R10, -4).unwrap();
    let words = program.bytecode(head).unwrap();

    assert_eq!(
        words.iter().map(|w| w.to_le_bytes()).collect::<Vec<_>>(),
        vec![
            [0xbf, 0x61, 0, 0, 0, 0, 0, 0],
            [0x62, 0x0a, 0xfc, 0xff, 7, 0, 0, 0],
            [0xbf, 0xa2, 0, 0, 0, 0, 0, 0],
            [0x07, 0x02, 0, 0, 0xfc, 0xff, 0xff, 0xff],
            [0x85, 0, 0, 0, 1, 0, 0, 0],
        ]
    );
}

#[test]
fn test_skb_load_bytes_relative_setup() {
    let mut program: Program = Program::new();
    let head = call_skb_load_bytes_relative(
        &mut program,
        Register::R6,
        14,
        Register::R10,
        -16,
        16,
        1,
    )
    .unwrap();

    let words = program.bytecode(head).unwrap();
    assert_eq!(words.len(), 7);
    let destinations: Vec<u8> = words[..6]
        .iter()
        .map(|&w| DecodedInsn::decode(w).dst)
        .collect();
    assert_eq!(destinations, vec![1, 2, 3, 3, 4, 5]);

    let call = DecodedInsn::decode(words[6]);
    assert_eq!(call.class(), InsClass::Jmp);
    assert_eq!(call.imm, helpers::SKB_LOAD_BYTES_RELATIVE);
}

#[test]
fn test_call_helper_moves_arguments() {
    let mut program: Program = Program::new();
    let head = call_helper(
        &mut program,
        helpers::TRACE_PRINTK,
        &[Operand::Reg(Register::R10), Operand::Imm(8)],
    )
    .unwrap();

    assert_eq!(
        program.poc(head).unwrap(),
        vec![
            "BPF_MOV64_REG(BPF_REG_1, BPF_REG_10)",
            "BPF_MOV64_IMM(BPF_REG_2, 8)",
            "BPF_CALL_FUNC(BPF_FUNC_trace_printk)",
        ]
    );
}

#[test]
fn test_call_helper_argument_limit() {
    let mut program: Program = Program::new();
    let args = [Operand::Imm(0); 6];

    assert_eq!(
        call_helper(&mut program, helpers::PERF_EVENT_OUTPUT, &args),
        Err(AsmError::TooManyArguments {
            helper: helpers::PERF_EVENT_OUTPUT,
            count: 6,
        })
    );
    assert!(program.is_empty());
}

#[test]
fn test_instruction_sequence() {
    let mut program: Program = Program::new();
    let a = program.mov64(Register::R0, 0);
    let b = program.add64(Register::R0, 1);
    let c = program.exit();

    assert_eq!(instruction_sequence(&mut program, &[a, b, c]), Ok(a));
    assert_eq!(program.next(a).unwrap(), Some(b));
    assert_eq!(program.next(b).unwrap(), Some(c));
    assert_eq!(
        instruction_sequence(&mut program, &[]),
        Err(AsmError::EmptySequence)
    );
}
