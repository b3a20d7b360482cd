//! The eBPF instruction set: registers, opcode fields, helper ids and the
//! word encoder.

pub mod encoding;
pub mod helpers;
mod opcode;
mod register;


pub use encoding::DecodedInsn;
pub use opcode::{AluOp, InsClass, JmpOp, MODE_MEM, MemSize, SRC_K, SRC_X};
pub use register::{Operand, Register};
