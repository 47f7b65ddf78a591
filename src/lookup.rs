//! Read-side navigation over an already-validated typelib (§4.10, §6.2):
//! lookup by name, GType name and error domain, plus `c_prefix` matching.
//!
//! These functions assume the directory and the entries they walk linearly
//! have already passed [`crate::directory::validate_directory`], and return
//! a not-found sentinel rather than an error when a name has no match (§7,
//! "Local recovery"). The one exception is the hashed by-name path: the
//! `DIRECTORY_INDEX` section it reads is never walked by `validate()` (it
//! sits outside the directory proper), so its bucket contents are untrusted
//! and bounds-checked on the way through — see [`crate::sections::DirectoryIndex::lookup`].

use crate::directory::{dir_entry_unchecked, BlobKind, DirEntry};
use crate::error::Result;
use crate::reader::TypelibReader;
use crate::sections::DirectoryIndex;

/// By-name lookup (§4.10): uses the perfect-hash section when one was
/// discovered at construction time, otherwise falls back to a linear
/// scan of the first `n_local_entries`. The hash, when present, is
/// authoritative — a miss there is final, it never falls back to linear.
pub fn dir_entry_by_name(
	reader: &TypelibReader,
	directory: usize,
	n_entries: u16,
	n_local_entries: u16,
	directory_index: Option<&DirectoryIndex>,
	name: &str,
) -> Result<Option<(u16, DirEntry)>> {
	if let Some(index) = directory_index {
		return match index.lookup(reader, directory, n_entries, name)? {
			// `index.lookup` already bounds-checked `i` against `n_entries`.
			Some(i) => Ok(Some((i, dir_entry_unchecked(reader, directory, i)))),
			None => Ok(None),
		};
	}

	for i in 1..=n_local_entries {
		let entry = dir_entry_unchecked(reader, directory, i);
		if reader.string_at(entry.name as usize)? == name {
			return Ok(Some((i, entry)));
		}
	}
	Ok(None)
}

/// By-GType-name lookup (§4.10): linear over local registered-type
/// entries, comparing each entry's `gtype_name` string.
pub fn dir_entry_by_gtype_name(reader: &TypelibReader, directory: usize, n_local_entries: u16, name: &str) -> Result<Option<(u16, DirEntry)>> {
	for i in 1..=n_local_entries {
		let entry = dir_entry_unchecked(reader, directory, i);
		let Some(kind) = BlobKind::from_u8(entry.blob_type) else { continue };
		if !kind.is_registered_type() {
			continue;
		}
		// The registered-type header's gtype-name offset sits 8 bytes into
		// every struct/enum/object/interface/union blob (§3).
		let gtype_name_offset: u32 = reader.view_at(entry.offset as usize + 8)?;
		if gtype_name_offset == 0 {
			continue;
		}
		if reader.string_at(gtype_name_offset as usize)? == name {
			return Ok(Some((i, entry)));
		}
	}
	Ok(None)
}

/// By-error-domain lookup (§4.10): linear over local enum entries with a
/// non-zero `error_domain`, comparing its string form to `domain`.
pub fn dir_entry_by_error_domain(reader: &TypelibReader, directory: usize, n_local_entries: u16, domain: &str) -> Result<Option<(u16, DirEntry)>> {
	for i in 1..=n_local_entries {
		let entry = dir_entry_unchecked(reader, directory, i);
		if !matches!(BlobKind::from_u8(entry.blob_type), Some(BlobKind::Enum) | Some(BlobKind::Flags)) {
			continue;
		}
		let error_domain_offset: u32 = reader.view_at(entry.offset as usize + 20)?;
		if error_domain_offset == 0 {
			continue;
		}
		if reader.string_at(error_domain_offset as usize)? == domain {
			return Ok(Some((i, entry)));
		}
	}
	Ok(None)
}

/// Prefix match (§4.10, invariant 11): `name` matches prefix `p` iff it
/// starts with `p` and the following character is an uppercase ASCII
/// letter. `c_prefix` is a comma-separated list; a match against any
/// element counts.
pub fn matches_gtype_name_prefix(c_prefix: &str, name: &str) -> bool {
	c_prefix.split(',').any(|p| {
		let p = p.trim();
		!p.is_empty() && name.strip_prefix(p).is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
	})
}
