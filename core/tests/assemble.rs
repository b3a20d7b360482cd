//! End-to-end assembly through the public API.

use ebpf_asm_core::{
    api::{AsmError, Assembler, AssemblerOptions},
    builders::instruction_sequence,
    graph::{NodeId, Program},
    isa::{DecodedInsn, Register},
    samples,
};
use pretty_assertions::assert_eq;

fn assembler() -> Assembler {
    Assembler::new(AssemblerOptions::default())
}

#[test]
fn test_map_lookup_sample() {
    let mut program: Program = Program::new();
    let root = samples::map_lookup(&mut program, Register::R6, 3).unwrap();
    let assembled = assembler().assemble(&mut program, root, &mut ()).unwrap();

    assert_eq!(
        assembled.listing,
        vec![
            "BPF_MOV64_REG(BPF_REG_1, BPF_REG_6)",
            "BPF_ST_MEM(BPF_W, BPF_REG_10, -4, 3)",
            "BPF_MOV64_REG(BPF_REG_2, BPF_REG_10)",
            "BPF_ALU64_IMM(BPF_ADD, BPF_REG_2, -4)",
            "BPF_CALL_FUNC(BPF_FUNC_map_lookup_elem)",
            "BPF_JMP_IMM(BPF_JEQ, /*dst=*/BPF_REG_0, /*imm=*/0, /*off=*/1, /*ins_class=*/BPF_JMP)",
            "BPF_MOV64_IMM(BPF_REG_0, 1)",
            "BPF_EXIT_INSN()",
        ]
    );
    assert_eq!(assembled.words.len(), 8);
    assert_eq!(assembled.instruction_count, 8);
    assert_eq!(assembled.words[7], 0x95);
}

#[test]
fn test_skb_load_sample_resolves_generators() {
    let mut program: Program = Program::new();
    let root = samples::skb_load(&mut program, 16).unwrap();
    let assembled = assembler().assemble(&mut program, root, &mut ()).unwrap();

    assert_eq!(
        assembled.listing,
        vec![
            "BPF_MOV64_REG(BPF_REG_6, BPF_REG_1)",
            "BPF_MOV64_REG(BPF_REG_1, BPF_REG_6)",
            "BPF_MOV64_IMM(BPF_REG_2, 0)",
            "BPF_MOV64_REG(BPF_REG_3, BPF_REG_10)",
            "BPF_ALU64_IMM(BPF_ADD, BPF_REG_3, -16)",
            "BPF_MOV64_IMM(BPF_REG_4, 16)",
            "BPF_MOV64_IMM(BPF_REG_5, 1)",
            "BPF_CALL_FUNC(BPF_FUNC_skb_load_bytes_relative)",
            "BPF_JMP_IMM(BPF_JNE, /*dst=*/BPF_REG_0, /*imm=*/0, /*off=*/1, /*ins_class=*/BPF_JMP)",
            "BPF_MOV64_IMM(BPF_REG_0, 1)",
            "BPF_EXIT_INSN()",
        ]
    );
    assert_eq!(assembled.instruction_count, 11);
    assert_eq!(DecodedInsn::decode(assembled.words[8]).offset, 1);
}

#[test]
fn test_bytes_are_little_endian_words() {
    let mut program: Program = Program::new();
    let root = samples::map_lookup(&mut program, Register::R6, 3).unwrap();
    let assembled = assembler().assemble(&mut program, root, &mut ()).unwrap();

    let bytes = assembled.to_bytes();
    assert_eq!(bytes.len(), 8 * assembled.words.len());
    assert_eq!(bytes[..8], [0xbf, 0x61, 0, 0, 0, 0, 0, 0]);
    assert_eq!(bytes[bytes.len() - 8..], [0x95, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_c_array() {
    let mut program: Program = Program::new();
    let check = program.jeq(Register::R1, 0, 1);
    let set = program.mov64(Register::R0, 1);
    let exit = program.exit();
    program.set_false_branch(check, set).unwrap();
    program.link(check, exit).unwrap();

    let assembled = assembler().assemble(&mut program, check, &mut ()).unwrap();
    assert_eq!(
        assembled.c_array("prog"),
        "struct bpf_insn prog[] = {\n\
         \tBPF_JMP_IMM(BPF_JEQ, /*dst=*/BPF_REG_1, /*imm=*/0, /*off=*/1, /*ins_class=*/BPF_JMP),\n\
         \tBPF_MOV64_IMM(BPF_REG_0, 1),\n\
         \tBPF_EXIT_INSN(),\n\
         };\n"
    );
}

#[test]
fn test_instruction_limit() {
    let mut program: Program = Program::new();
    let root = samples::map_lookup(&mut program, Register::R6, 3).unwrap();
    let options = AssemblerOptions {
        max_instructions: 4,
        ..AssemblerOptions::default()
    };

    assert_eq!(
        Assembler::new(options).assemble(&mut program, root, &mut ()),
        Err(AsmError::TooManyInstructions { count: 8, limit: 4 })
    );
}

#[test]
fn test_limit_is_checked_before_emission() {
    // Emitting this program would fail on its short false side; the size
    // limit rejects it first.
    let mut program: Program = Program::new();
    let check = program.jeq(Register::R1, 0, 5);
    let set = program.mov64(Register::R0, 1);
    let exit = program.exit();
    program.set_false_branch(check, set).unwrap();
    program.link(check, exit).unwrap();
    let options = AssemblerOptions {
        max_instructions: 6,
        ..AssemblerOptions::default()
    };

    assert_eq!(
        Assembler::new(options).assemble(&mut program, check, &mut ()),
        Err(AsmError::TooManyInstructions { count: 7, limit: 6 })
    );
}

#[test]
fn test_long_linear_program() {
    const LENGTH: usize = 200_000;
    let mut program: Program = Program::new();
    let mut nodes: Vec<NodeId> = (0..LENGTH)
        .map(|i| program.mov64(Register::R0, i as i32))
        .collect();
    nodes.push(program.exit());
    let root = instruction_sequence(&mut program, &nodes).unwrap();

    let assembled = assembler().assemble(&mut program, root, &mut ()).unwrap();

    assert_eq!(assembled.instruction_count, LENGTH + 1);
    assert_eq!(assembled.words.len(), LENGTH + 1);
    assert_eq!(assembled.listing.len(), LENGTH + 1);
    assert_eq!(assembled.listing[LENGTH - 1], "BPF_MOV64_IMM(BPF_REG_0, 199999)");
    assert_eq!(assembled.words[LENGTH], 0x95);
    assert_eq!(program.position(nodes[LENGTH]), Some(LENGTH as u32));
}

#[test]
fn test_false_size_verification_can_be_disabled() {
    let build = |program: &mut Program| {
        let check = program.jeq(Register::R1, 0, 3);
        let set = program.mov64(Register::R0, 1);
        let exit = program.exit();
        program.set_false_branch(check, set).unwrap();
        program.link(check, exit).unwrap();
        check
    };

    let mut program: Program = Program::new();
    let root = build(&mut program);
    assert!(matches!(
        assembler().assemble(&mut program, root, &mut ()),
        Err(AsmError::FalseBranchTooShort {
            declared: 3,
            actual: 1,
            ..
        })
    ));

    let mut program: Program = Program::new();
    let root = build(&mut program);
    let options = AssemblerOptions {
        verify_false_branch_sizes: false,
        ..AssemblerOptions::default()
    };
    let assembled = Assembler::new(options)
        .assemble(&mut program, root, &mut ())
        .unwrap();
    assert_eq!(assembled.words.len(), 3);
    assert_eq!(DecodedInsn::decode(assembled.words[0]).offset, 3);
}

/// Generation context deciding the exit code of every generated path.
struct ExitCodes {
    next: i32,
    generated: usize,
}

#[test]
fn test_generators_receive_context() {
    let mut program: Program<ExitCodes> = Program::new();
    let check = program.jsgt(Register::R1, 100, 0);
    program
        .set_false_generator(check, |program, codes| {
            codes.generated += 1;
            let set = program.mov64(Register::R0, codes.next);
            codes.next += 1;
            let exit = program.exit();
            program.link(set, exit).unwrap();
            (set, 2)
        })
        .unwrap();
    program
        .set_true_generator(check, |program, codes| {
            codes.generated += 1;
            let set = program.mov64(Register::R0, codes.next);
            let exit = program.exit();
            program.link(set, exit).unwrap();
            set
        })
        .unwrap();

    let mut codes = ExitCodes {
        next: 10,
        generated: 0,
    };
    let assembled = assembler()
        .assemble(&mut program, check, &mut codes)
        .unwrap();

    assert_eq!(codes.generated, 2);
    assert_eq!(
        assembled.listing,
        vec![
            "BPF_JMP_IMM(BPF_JSGT, /*dst=*/BPF_REG_1, /*imm=*/100, /*off=*/2, /*ins_class=*/BPF_JMP)",
            "BPF_MOV64_IMM(BPF_REG_0, 10)",
            "BPF_EXIT_INSN()",
            "BPF_MOV64_IMM(BPF_REG_0, 11)",
            "BPF_EXIT_INSN()",
        ]
    );
    assert_eq!(assembled.words.len(), 5);
}

#[test]
fn test_unknown_root() {
    let mut other: Program = Program::new();
    other.call(1);
    let foreign = other.call(2);

    let mut program: Program = Program::new();
    assert_eq!(
        assembler().assemble(&mut program, foreign, &mut ()),
        Err(AsmError::UnknownNode(foreign))
    );
}
