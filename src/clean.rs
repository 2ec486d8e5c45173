use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
	/// First fenced block, with an optional language tag on the opening fence.
	static ref FENCED_BLOCK: Regex = Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```").expect("static regex");
	/// Fence markers left dangling at either end of an unterminated block.
	static ref STRAY_OPENING: Regex = Regex::new(r"^```[A-Za-z0-9_-]*").expect("static regex");
	static ref STRAY_CLOSING: Regex = Regex::new(r"```$").expect("static regex");
}

/// Strips markdown wrapping from a model reply so what is left can be handed to `serde_json`.
pub fn clean_json(text: &str) -> String {
	let text = text.trim();
	if let Some(captures) = FENCED_BLOCK.captures(text) {
		// A fence after an opening brace is quoted inside the JSON, not wrapping it.
		let opens_before = captures.get(0).is_some_and(|m| text[..m.start()].contains('{'));
		if !opens_before {
			return captures[1].trim().to_string();
		}
	}
	let text = STRAY_OPENING.replace(text, "");
	let text = STRAY_CLOSING.replace(text.trim(), "");
	text.trim().to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn plain_json_is_only_trimmed() {
		assert_eq!(clean_json("  {\"a\": 1}\n"), "{\"a\": 1}");
	}

	#[test]
	fn json_fence_is_unwrapped() {
		let reply = "```json\n{\n  \"Acme\": {\"subject\": \"S\", \"body\": \"B\"}\n}\n```";
		assert_eq!(clean_json(reply), "{\n  \"Acme\": {\"subject\": \"S\", \"body\": \"B\"}\n}");
	}

	#[test]
	fn untagged_fence_with_chatter_around_it() {
		let reply = "Sure! Here you go:\n```\n{\"a\": 1}\n```\nLet me know if you need more.";
		assert_eq!(clean_json(reply), "{\"a\": 1}");
	}

	#[test]
	fn unterminated_fence_is_stripped() {
		assert_eq!(clean_json("```json\n{\"a\": 1}"), "{\"a\": 1}");
		assert_eq!(clean_json("{\"a\": 1}\n```"), "{\"a\": 1}");
	}

	#[test]
	fn fence_inside_unfenced_json_is_left_alone() {
		let reply = "{\"Acme\": {\"subject\": \"S\", \"body\": \"I wrote ```rust\\nfn main() {}\\n``` daily\"}}";
		assert_eq!(clean_json(reply), reply);
	}

	#[test]
	fn backticks_inside_a_body_survive_when_unfenced() {
		assert_eq!(clean_json("{\"a\": \"use `x`\"}"), "{\"a\": \"use `x`\"}");
	}
}
