pub use ebpf_asm::*;
pub use pretty_assertions::assert_eq;

/// Assemble the graph returned by `build` and compare the listing and the
/// number of emitted words.
///
/// ```ignore
/// asm_case!(
///     name,
///     build: |program| program.exit(),
///     listing: ["BPF_EXIT_INSN()"],
///     words: 1,
/// );
/// ```
macro_rules! asm_case {
    (
        $name:ident,
        build: $build:expr,
        listing: [$($line:expr),* $(,)?],
        words: $words:expr $(,)?
    ) => {
        #[test]
        fn $name() {
            use cases::*;
            use cases::assert_eq;
            let build: fn(&mut Program) -> NodeId = $build;

            let mut program: Program = Program::new();
            let root = build(&mut program);
            let assembled = Assembler::new(AssemblerOptions::default())
                .assemble(&mut program, root, &mut ())
                .unwrap();

            let expected: Vec<&str> = vec![$($line),*];
            assert_eq!(assembled.listing, expected);
            assert_eq!(assembled.words.len(), $words);
        }
    };
    (
        $name:ident,
        build: $build:expr,
        error: $error:pat $(,)?
    ) => {
        #[test]
        fn $name() {
            use cases::*;
            let build: fn(&mut Program) -> NodeId = $build;

            let mut program: Program = Program::new();
            let root = build(&mut program);
            let result = Assembler::new(AssemblerOptions::default())
                .assemble(&mut program, root, &mut ());
            assert!(matches!(result, Err($error)), "unexpected result: {:?}", result);
        }
    };
}
