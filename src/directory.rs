use crate::blobs::composite::{validate_enum_or_flags, validate_object, validate_interface, validate_struct_or_boxed, validate_union};
use crate::blobs::constant::validate_constant;
use crate::blobs::function::{validate_callback, validate_function};
use crate::context::ContextStack;
use crate::error::{Result, TypelibError};
use crate::layout::DIR_ENTRY_SIZE;
use crate::limits::Limits;
use crate::name::validate_name;
use crate::reader::{FromBlob, TypelibReader};

/// Directory-entry blob-type tag (§3). Values above `Union` are rejected
/// outright by the directory walker.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum BlobKind {
	Invalid = 0,
	Function = 1,
	Callback = 2,
	Struct = 3,
	Boxed = 4,
	Enum = 5,
	Flags = 6,
	Object = 7,
	Interface = 8,
	Constant = 9,
	Union = 10,
}

impl BlobKind {
	pub fn from_u8(v: u8) -> Option<Self> {
		use BlobKind::*;
		Some(match v {
			0 => Invalid,
			1 => Function,
			2 => Callback,
			3 => Struct,
			4 => Boxed,
			5 => Enum,
			6 => Flags,
			7 => Object,
			8 => Interface,
			9 => Constant,
			10 => Union,
			_ => return None,
		})
	}

	/// True for the six record kinds that carry a GType (§ glossary,
	/// "Registered type").
	pub fn is_registered_type(self) -> bool {
		matches!(self, BlobKind::Struct | BlobKind::Boxed | BlobKind::Enum | BlobKind::Flags | BlobKind::Object | BlobKind::Interface)
	}
}

/// The record kind a nested function/value validator is being called
/// from, used to enforce invariant 7 (constructor/setter/getter/
/// wraps-vfunc contextual legality).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Container {
	TopLevel,
	StructOrBoxedOrUnion,
	Object,
	Interface,
}

impl Container {
	pub fn allows_constructor(self) -> bool {
		!matches!(self, Container::TopLevel)
	}

	pub fn allows_setter_getter_vfunc(self) -> bool {
		matches!(self, Container::Object | Container::Interface)
	}
}

/// The 12-byte directory entry.
#[derive(Debug, Copy, Clone)]
pub struct DirEntry {
	pub blob_type: u8,
	pub local: bool,
	pub name: u32,
	pub offset: u32,
}

impl FromBlob for DirEntry {
	const SIZE: usize = DIR_ENTRY_SIZE;

	fn from_bytes(b: &[u8]) -> Self {
		Self {
			blob_type: b[0],
			local: b[1] != 0,
			name: u32::from_le_bytes(b[4..8].try_into().unwrap()),
			offset: u32::from_le_bytes(b[8..12].try_into().unwrap()),
		}
	}
}

/// Walks directory entries `1..=n_entries`, dispatching each local entry
/// to its record validator and each foreign entry to a namespace-name
/// check (§4.10). Ordering is strictly ascending by index.
pub fn validate_directory(
	reader: &TypelibReader,
	directory: usize,
	n_entries: u16,
	n_local_entries: u16,
	limits: &Limits,
	ctx: &mut ContextStack,
) -> Result<()> {
	for index in 1..=n_entries {
		let entry_offset = directory + (index as usize - 1) * DIR_ENTRY_SIZE;
		let entry: DirEntry = reader.view_at(entry_offset)?;

		validate_name(reader, entry.name as usize, "directory entry name", limits)?;

		let is_local = index <= n_local_entries;
		if entry.blob_type == BlobKind::Invalid as u8 && is_local {
			return Err(TypelibError::invalid_directory(format!("entry {index} has an invalid blob type")));
		}
		if entry.blob_type > BlobKind::Union as u8 {
			return Err(TypelibError::invalid_directory(format!("entry {index} has an out-of-range blob type {}", entry.blob_type)));
		}

		if is_local != entry.local {
			return Err(TypelibError::invalid_directory(format!(
				"entry {index} local flag does not match its position in the directory"
			)));
		}

		if is_local {
			if !reader.is_aligned4(entry.offset as usize) {
				return Err(TypelibError::invalid_directory(format!("entry {index} blob offset is not 4-byte aligned")));
			}
			let kind = BlobKind::from_u8(entry.blob_type)
				.ok_or_else(|| TypelibError::invalid_directory(format!("entry {index} has an unrecognised blob type")))?;
			validate_local_entry(reader, kind, entry.offset as usize, directory, n_entries, limits, ctx)?;
		} else {
			validate_name(reader, entry.offset as usize, "foreign entry namespace", limits)?;
		}
	}
	Ok(())
}

fn validate_local_entry(
	reader: &TypelibReader,
	kind: BlobKind,
	offset: usize,
	directory: usize,
	n_entries: u16,
	limits: &Limits,
	ctx: &mut ContextStack,
) -> Result<()> {
	match kind {
		BlobKind::Invalid => unreachable!("rejected before dispatch"),
		BlobKind::Function => validate_function(reader, offset, n_entries, limits, ctx, Container::TopLevel),
		BlobKind::Callback => validate_callback(reader, offset, n_entries, limits, ctx),
		BlobKind::Struct | BlobKind::Boxed => validate_struct_or_boxed(reader, offset, n_entries, limits, ctx),
		BlobKind::Enum | BlobKind::Flags => validate_enum_or_flags(reader, offset, n_entries, limits, ctx),
		BlobKind::Object => validate_object(reader, offset, directory, n_entries, limits, ctx),
		BlobKind::Interface => validate_interface(reader, offset, directory, n_entries, limits, ctx),
		BlobKind::Constant => validate_constant(reader, offset, n_entries, limits, ctx, Container::TopLevel),
		BlobKind::Union => validate_union(reader, offset, n_entries, limits, ctx),
	}
}

/// Unchecked by-index lookup, exposed for hot paths that already know
/// `index` is in range.
pub fn dir_entry_unchecked<'a>(reader: &TypelibReader<'a>, directory: usize, index: u16) -> DirEntry {
	let offset = directory + (index as usize - 1) * DIR_ENTRY_SIZE;
	reader.view_at(offset).expect("caller guarantees index is in range")
}

/// Checked by-index lookup (§4.10, §6.2).
pub fn dir_entry_checked(reader: &TypelibReader, directory: usize, n_entries: u16, index: u16) -> Result<DirEntry> {
	if index == 0 || index > n_entries {
		return Err(TypelibError::invalid_blob("invalid directory index"));
	}
	Ok(dir_entry_unchecked(reader, directory, index))
}
