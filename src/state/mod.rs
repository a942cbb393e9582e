pub mod file_import;
pub mod input;
pub mod lifecycle;

pub use file_import::FileHandle;
pub use input::{Field, InputState};
pub use lifecycle::{reduce, Action, AppState, Effect, RequestLifecycle};
