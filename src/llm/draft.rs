use crate::clean::clean_json;
use crate::config::Contact;
use crate::mail::{self, Draft, DraftStore};
use crate::openai::ChatModel;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

pub const SYSTEM_PROMPT: &str = "You are a professional email writer and return JSON only.";

pub fn build_prompt(contact: &Contact, pending: &[String]) -> Result<String> {
	Ok(format!(
		r#"You are a professional email writer.

For each company below, write a tailored email introducing me and asking about software development roles.

Visit the company's website, find out what they do and tailor the mail accordingly. If the website has an "about us" section, read it too. Use what you learned there to give the mail a few sentences of personal touch.

For the salutation, write just "Hello," and nothing else.

Mention the following about me:
{pitch}

Say that my resume is attached and that I would appreciate any help.

End the email with:

Best regards,
{name}

Contact: {phone}
LinkedIn: {linkedin}

Keep the mail concise and reader friendly.

Return ONLY a strict JSON object with no markdown formatting or code fences. Each key is the company name, exactly as given, and each value is an object with:
- "subject": the email subject line
- "body": the full email body, excluding the subject

Companies:
{companies}"#,
		name = contact.name,
		pitch = contact.pitch,
		phone = contact.phone,
		linkedin = contact.linkedin,
		companies = serde_json::to_string(pending)?,
	))
}

/// Only a reply that is not a JSON object fails. Entries that are not `{subject, body}` are dropped one by one.
fn parse_drafts(reply: &str) -> serde_json::Result<DraftStore> {
	// Raw first: an unfenced reply may quote code fences inside a body.
	let entries: BTreeMap<String, serde_json::Value> = serde_json::from_str(reply).or_else(|_| serde_json::from_str(&clean_json(reply)))?;
	let mut drafts = DraftStore::new();
	for (company, value) in entries {
		match serde_json::from_value::<Draft>(value) {
			Ok(draft) => {
				drafts.insert(company, draft);
			}
			Err(e) => warn!(%company, error = %e, "Dropping malformed draft"),
		}
	}
	Ok(drafts)
}

/// Drafts emails for every company in `pending` and merges them into `store`.
///
/// The backup at `path` is rewritten whenever `pending` is non-empty, even if the reply could not be parsed.
/// Errors from the model call propagate untouched.
pub fn generate(llm: &impl ChatModel, contact: &Contact, pending: &[String], mut store: DraftStore, path: &Path) -> Result<DraftStore> {
	if pending.is_empty() {
		info!("All companies already have email drafts in backup");
		return Ok(store);
	}

	let prompt = build_prompt(contact, pending)?;
	debug!(%prompt, "drafting prompt");
	info!(companies = pending.len(), "Requesting email drafts");

	let reply = llm.complete(SYSTEM_PROMPT, &prompt)?;
	debug!(%reply, "raw model reply");

	let new_drafts = match parse_drafts(&reply) {
		Ok(drafts) => {
			info!("Parsed new model response");
			drafts
		}
		Err(e) => {
			warn!(error = %e, "Failed to parse model output");
			DraftStore::new()
		}
	};

	let returned = pending.iter().filter(|c| new_drafts.contains_key(c.as_str())).count();
	if returned < pending.len() {
		info!(requested = pending.len(), returned, "Model skipped some companies");
	}

	store.extend(new_drafts);
	mail::save_backup(path, &store)?;
	info!(path = %path.display(), drafts = store.len(), "Backup file updated with new emails");

	Ok(store)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn prompt_carries_contact_and_companies() {
		let contact = Contact {
			name: "Jane Doe".to_string(),
			phone: "+1 555 0100".to_string(),
			pitch: "I build compilers.".to_string(),
			linkedin: "https://linkedin.com/in/jane".to_string(),
		};
		let prompt = build_prompt(&contact, &["Acme".to_string(), "Globex".to_string()]).unwrap();
		assert!(prompt.contains("Best regards,\nJane Doe"));
		assert!(prompt.contains("Contact: +1 555 0100"));
		assert!(prompt.contains("Mention the following about me:\nI build compilers.\n"));
		assert!(prompt.contains("LinkedIn: https://linkedin.com/in/jane"));
		assert!(prompt.ends_with(r#"["Acme","Globex"]"#));
	}

	#[test]
	fn prompt_builds_without_contact() {
		let prompt = build_prompt(&Contact::default(), &["Acme".to_string()]).unwrap();
		assert!(prompt.contains("Contact: \nLinkedIn: \n"));
	}

	#[test]
	fn malformed_entries_are_dropped_individually() {
		let drafts = parse_drafts(r#"{"Acme": {"subject": "S", "body": "B"}, "Globex": {"subject": "only subject"}, "Initech": 7}"#).unwrap();
		assert_eq!(drafts.len(), 1);
		assert_eq!(drafts["Acme"].body, "B");
	}

	#[test]
	fn unfenced_reply_quoting_a_fence_parses() {
		let reply = "{\"Acme\": {\"subject\": \"S\", \"body\": \"I wrote ```rust\\nfn main() {}\\n``` daily\"}}";
		let drafts = parse_drafts(reply).unwrap();
		assert_eq!(drafts["Acme"].body, "I wrote ```rust\nfn main() {}\n``` daily");
	}

	#[test]
	fn non_object_reply_fails() {
		assert!(parse_drafts("not json").is_err());
		assert!(parse_drafts("[1, 2]").is_err());
	}
}
