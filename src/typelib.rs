//! The public handle type (§5, §6.2): an immutable view over a validated
//! typelib buffer, backed by nothing more than a borrowed byte slice and
//! a handful of indices computed at construction time.

use crate::context::ContextStack;
use crate::directory::{dir_entry_checked, dir_entry_unchecked, validate_directory, DirEntry};
use crate::error::Result;
use crate::header::Header;
use crate::limits::Limits;
use crate::lookup::{dir_entry_by_error_domain, dir_entry_by_gtype_name, dir_entry_by_name, matches_gtype_name_prefix};
use crate::reader::TypelibReader;
use crate::sections::{find_directory_index, DirectoryIndex};

/// An immutable, `Send + Sync` view over a typelib buffer. Construction
/// performs only the cheap header check (§4.3); call [`Typelib::validate`]
/// to run the full recursive pass before trusting any indexed access.
pub struct Typelib<'a> {
	reader: TypelibReader<'a>,
	header: Header,
	directory_index: Option<DirectoryIndex>,
	limits: Limits,
}

impl<'a> Typelib<'a> {
	/// Wraps `buffer`, performing basic header validation (§4.3) and
	/// discovering the optional `DIRECTORY_INDEX` section, if declared.
	#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
	pub fn new_from_bytes(buffer: &'a [u8]) -> Result<Self> {
		Self::new_from_bytes_with_limits(buffer, Limits::default())
	}

	/// As [`Typelib::new_from_bytes`], with caller-supplied limits in
	/// place of the compiled-in defaults.
	pub fn new_from_bytes_with_limits(buffer: &'a [u8], limits: Limits) -> Result<Self> {
		let reader = TypelibReader::new(buffer);
		let header = Header::read_basic(&reader)?;

		let directory_index = if header.sections != 0 {
			match find_directory_index(&reader, header.sections as usize)? {
				Some(offset) => Some(DirectoryIndex::read(&reader, offset as usize)?),
				None => None,
			}
		} else {
			None
		};

		Ok(Self { reader, header, directory_index, limits })
	}

	/// Runs the full recursive validation pass (§4.1–§4.11): namespace
	/// and attribute table, then every directory entry and its record.
	/// Pure function of the bytes — calling this more than once on the
	/// same handle always produces the same result (§8 property 1).
	#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
	pub fn validate(&self) -> Result<()> {
		let mut ctx = ContextStack::new();

		self.header
			.validate_full(&self.reader, &self.limits, &mut ctx)
			.map_err(|e| e.with_section("header"))?;

		validate_directory(
			&self.reader,
			self.header.directory as usize,
			self.header.n_entries,
			self.header.n_local_entries,
			&self.limits,
			&mut ctx,
		)
		.map_err(|e| e.with_section("directory"))
	}

	pub fn namespace(&self) -> Result<&'a str> {
		self.header.namespace(&self.reader)
	}

	pub fn c_prefix(&self) -> Result<Option<&'a str>> {
		self.header.c_prefix(&self.reader)
	}

	/// Unchecked by-index lookup (§4.10): caller guarantees `index` is in
	/// `1..=n_entries`.
	pub fn dir_entry(&self, index: u16) -> DirEntry {
		dir_entry_unchecked(&self.reader, self.header.directory as usize, index)
	}

	/// Checked by-index lookup (§4.10, §6.2).
	pub fn dir_entry_checked(&self, index: u16) -> Result<DirEntry> {
		dir_entry_checked(&self.reader, self.header.directory as usize, self.header.n_entries, index)
	}

	/// By-name lookup (§4.10): hashed when a `DIRECTORY_INDEX` section was
	/// discovered at construction, linear otherwise.
	pub fn dir_entry_by_name(&self, name: &str) -> Result<Option<DirEntry>> {
		let found = dir_entry_by_name(
			&self.reader,
			self.header.directory as usize,
			self.header.n_entries,
			self.header.n_local_entries,
			self.directory_index.as_ref(),
			name,
		)?;
		Ok(found.map(|(_, entry)| entry))
	}

	/// By-GType-name lookup (§4.10): linear over local registered-type
	/// entries.
	pub fn dir_entry_by_gtype_name(&self, name: &str) -> Result<Option<DirEntry>> {
		let found = dir_entry_by_gtype_name(&self.reader, self.header.directory as usize, self.header.n_local_entries, name)?;
		Ok(found.map(|(_, entry)| entry))
	}

	/// By-error-domain lookup (§4.10): linear over local enum entries
	/// with a non-zero `error_domain`.
	pub fn dir_entry_by_error_domain(&self, domain: &str) -> Result<Option<DirEntry>> {
		let found = dir_entry_by_error_domain(&self.reader, self.header.directory as usize, self.header.n_local_entries, domain)?;
		Ok(found.map(|(_, entry)| entry))
	}

	/// Prefix match against `c_prefix` (§4.10, invariant 11). Returns
	/// `false` if this typelib declares no `c_prefix`.
	pub fn matches_gtype_name_prefix(&self, name: &str) -> Result<bool> {
		Ok(match self.c_prefix()? {
			Some(prefix) => matches_gtype_name_prefix(prefix, name),
			None => false,
		})
	}

	/// Clones the handle. The handle itself is trivially `Copy`-like
	/// (a borrowed slice plus small indices), so `ref_`/`unref` — the
	/// C API's refcount pair — collapse to ordinary value semantics: a
	/// fresh `Typelib` sharing the same buffer, and `drop` respectively.
	pub fn ref_(&self) -> Typelib<'a> {
		Typelib { reader: self.reader, header: self.header, directory_index: self.directory_index.clone(), limits: self.limits }
	}

	pub fn unref(self) {
		drop(self)
	}
}
