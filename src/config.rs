use anyhow::{Context, Result};

/// Background paragraph used when `SENDER_PITCH` is unset.
pub const DEFAULT_PITCH: &str = "I'm a graduate student at NYU pursuing an MS in Computer Science, looking for software development roles.
I'm a Software Engineer with 2+ years of experience at Oracle, where I developed scalable Supply Chain Management solutions for 40,000+ global customers using Java, Spring Boot, and Oracle DB. I'm currently exploring new SDE opportunities.
I have software development experience with Spring Boot, Node.js, React and Next.js and hands-on project experience in machine learning, data science and AI (Scikit-Learn, TensorFlow, PyTorch, LLMs, RAG), and would love to work for their organization.";

/// Sender details interpolated into every prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
	pub name: String,
	pub phone: String,
	pub linkedin: String,
	pub pitch: String,
}

impl Contact {
	/// Reads `SENDER_NAME`, `CONTACT`, `LINKEDIN` and `SENDER_PITCH`.
	/// Absent values become empty strings (the pitch falls back to [`DEFAULT_PITCH`]), never an error.
	pub fn from_env() -> Self {
		Self {
			name: std::env::var("SENDER_NAME").unwrap_or_default(),
			phone: std::env::var("CONTACT").unwrap_or_default(),
			linkedin: std::env::var("LINKEDIN").unwrap_or_default(),
			pitch: std::env::var("SENDER_PITCH").unwrap_or_else(|_| DEFAULT_PITCH.to_string()),
		}
	}
}

/// Loads `.env` if present; a missing file is fine.
pub fn load_dotenv() {
	dotenvy::dotenv().ok();
}

pub fn require_env(key: &str) -> Result<String> {
	std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
