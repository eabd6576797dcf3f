pub mod alu;
pub mod cpu;
pub mod flags;
pub mod golden;
pub mod width;

pub use alu::{Alu, CoreAlu};
pub use cpu::{Cpu, Trap};
pub use flags::Eflags;
pub use golden::RefAlu;
pub use width::Width;
