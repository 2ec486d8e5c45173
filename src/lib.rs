pub mod clean;
pub mod config;
pub mod llm;
pub mod logging;
pub mod mail;
pub mod openai;

pub static TMP_DIR: &str = "/tmp/mail_drafter";
