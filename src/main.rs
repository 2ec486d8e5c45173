use anyhow::{Context, Result};
use clap::Parser;
use mail_drafter::config::{self, Contact};
use mail_drafter::openai::{Model, OpenAi};
use mail_drafter::{llm, logging, mail, TMP_DIR};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about = "Drafts personalized outreach emails for companies that do not have one yet")]
struct Cli {
	/// File with one company per line; blank lines and `#` comments are skipped
	#[arg(long)]
	companies: PathBuf,
	/// JSON backup of drafts generated so far, rewritten after every request
	#[arg(long, default_value = "email_drafts_backup.json")]
	backup: PathBuf,
	/// Print the pending companies and the prompt, then exit without calling the api
	#[arg(long)]
	dry_run: bool,
}

fn read_companies(path: &Path) -> Result<Vec<String>> {
	let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read companies file {}", path.display()))?;
	Ok(raw
		.lines()
		.map(str::trim)
		.filter(|l| !l.is_empty() && !l.starts_with('#'))
		.map(str::to_string)
		.collect())
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	config::load_dotenv();
	let _guard = logging::init(Path::new(TMP_DIR))?;

	let companies = read_companies(&cli.companies)?;
	let store = mail::load_backup(&cli.backup)?;
	let pending = mail::pending_companies(&companies, &store);
	info!(companies = companies.len(), cached = store.len(), pending = pending.len(), "Loaded companies and backup");

	let contact = Contact::from_env();
	if cli.dry_run {
		println!("Pending: {:?}\n", pending);
		println!("{}", llm::build_prompt(&contact, &pending)?);
		return Ok(());
	}

	// Nothing to draft means no api key is needed either.
	if pending.is_empty() {
		info!("All companies already have email drafts in backup");
		return Ok(());
	}
	let client = OpenAi::from_env(Model::Gpt4oMini)?;
	let store = llm::generate(&client, &contact, &pending, store, &cli.backup)?;
	info!(drafts = store.len(), "Done");
	Ok(())
}
