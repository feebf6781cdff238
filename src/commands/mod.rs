pub mod callables;
pub mod check;
pub mod completions;
pub mod emit;
pub mod plugins;
