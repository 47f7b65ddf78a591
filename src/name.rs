use crate::error::{Result, TypelibError};
use crate::layout::is_name_byte;
use crate::limits::Limits;
use crate::reader::TypelibReader;

/// Validates that `offset` points to a NUL-terminated identifier of
/// bounded length over `[A-Za-z0-9_-]`. `role` is folded verbatim into the
/// failure message so callers get `"function name is too long"` etc.
/// without this module knowing about callers.
pub fn validate_name<'a>(reader: &TypelibReader<'a>, offset: usize, role: &'static str, limits: &Limits) -> Result<&'a str> {
	if offset >= reader.len() {
		return Err(TypelibError::invalid_data(format!("{role} offset is out of bounds")));
	}
	let rest = &reader.bytes()[offset..];
	// Scan only the first `max_name_len` bytes for a NUL: a name of the
	// maximum allowed length (max_name_len - 1 characters) has its
	// terminator at index max_name_len - 1, the last position inside
	// that window.
	let scan_len = rest.len().min(limits.max_name_len);
	let Some(nul_pos) = rest[..scan_len].iter().position(|&b| b == 0) else {
		return Err(TypelibError::invalid_data(format!("{role} is too long")));
	};
	if nul_pos == 0 {
		return Err(TypelibError::invalid_data(format!("{role} is empty")));
	}
	let bytes = &rest[..nul_pos];
	if !bytes.iter().copied().all(is_name_byte) {
		return Err(TypelibError::invalid_data(format!("{role} contains invalid characters")));
	}
	Ok(std::str::from_utf8(bytes)?)
}
