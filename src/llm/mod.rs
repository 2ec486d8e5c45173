pub mod draft;

pub use draft::{build_prompt, generate, SYSTEM_PROMPT};
