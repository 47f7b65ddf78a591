use std::fmt;

/// Coarse error taxonomy. Each kind groups failures by the phase that
/// detected them, not by the precise reason — the message string carries
/// the specifics.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TypelibErrorKind {
	InvalidHeader,
	InvalidDirectory,
	InvalidEntry,
	InvalidBlob,
	InvalidData,
}

impl fmt::Display for TypelibErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::InvalidHeader => "InvalidHeader",
			Self::InvalidDirectory => "InvalidDirectory",
			Self::InvalidEntry => "InvalidEntry",
			Self::InvalidBlob => "InvalidBlob",
			Self::InvalidData => "InvalidData",
		};
		f.write_str(name)
	}
}

/// A validation failure. Carries the section the failure was detected in
/// and, if the context stack was non-empty, a breadcrumb trail, so the
/// rendered message matches `"In <section> (Context: a/b/c): <message>"`.
#[derive(Debug, Clone)]
pub struct TypelibError {
	pub kind: TypelibErrorKind,
	section: Option<&'static str>,
	context: Vec<String>,
	message: String,
}

impl TypelibError {
	pub fn new(kind: TypelibErrorKind, message: impl Into<String>) -> Self {
		Self {
			kind,
			section: None,
			context: Vec::new(),
			message: message.into(),
		}
	}

	pub fn invalid_header(message: impl Into<String>) -> Self {
		Self::new(TypelibErrorKind::InvalidHeader, message)
	}

	pub fn invalid_directory(message: impl Into<String>) -> Self {
		Self::new(TypelibErrorKind::InvalidDirectory, message)
	}

	pub fn invalid_entry(message: impl Into<String>) -> Self {
		Self::new(TypelibErrorKind::InvalidEntry, message)
	}

	pub fn invalid_blob(message: impl Into<String>) -> Self {
		Self::new(TypelibErrorKind::InvalidBlob, message)
	}

	pub fn invalid_data(message: impl Into<String>) -> Self {
		Self::new(TypelibErrorKind::InvalidData, message)
	}

	/// Attaches the top-level section label, if one isn't already set.
	/// `validate` calls this once on the way back out of a failed pass.
	pub fn with_section(mut self, section: &'static str) -> Self {
		if self.section.is_none() {
			self.section = Some(section);
		}
		self
	}

	/// Attaches a context breadcrumb trail, if one isn't already set.
	pub fn with_context(mut self, context: &[&str]) -> Self {
		if self.context.is_empty() && !context.is_empty() {
			self.context = context.iter().map(|s| s.to_string()).collect();
		}
		self
	}

	pub fn message(&self) -> &str {
		&self.message
	}
}

impl fmt::Display for TypelibError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(section) = self.section {
			write!(f, "In {section} ")?;
		}
		if !self.context.is_empty() {
			write!(f, "(Context: {}) ", self.context.join("/"))?;
		}
		if self.section.is_some() || !self.context.is_empty() {
			write!(f, ": ")?;
		}
		write!(f, "{}", self.message)
	}
}

impl std::error::Error for TypelibError {}

impl From<std::str::Utf8Error> for TypelibError {
	fn from(_: std::str::Utf8Error) -> Self {
		Self::invalid_data("string is not valid UTF-8")
	}
}

pub type Result<T> = std::result::Result<T, TypelibError>;
