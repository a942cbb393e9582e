pub mod output;
pub mod repl;
pub mod sections;
