use crate::context::ContextStack;
use crate::error::{Result, TypelibError};
use crate::layout::*;
use crate::limits::Limits;
use crate::name::validate_name;
use crate::reader::{FromBlob, TypelibReader};

/// The 112-byte header every typelib begins with.
#[derive(Debug, Copy, Clone)]
pub struct Header {
	pub magic: [u8; 16],
	pub major_version: u8,
	pub minor_version: u8,
	pub namespace: u32,
	pub c_prefix: u32,
	pub shared_library: u32,
	pub size: u32,
	pub directory: u32,
	pub n_entries: u16,
	pub n_local_entries: u16,
	pub entry_blob_size: u16,
	pub function_blob_size: u16,
	pub callback_blob_size: u16,
	pub signal_blob_size: u16,
	pub vfunc_blob_size: u16,
	pub arg_blob_size: u16,
	pub property_blob_size: u16,
	pub field_blob_size: u16,
	pub value_blob_size: u16,
	pub constant_blob_size: u16,
	pub attribute_blob_size: u16,
	pub signature_blob_size: u16,
	pub enum_blob_size: u16,
	pub struct_blob_size: u16,
	pub object_blob_size: u16,
	pub interface_blob_size: u16,
	pub union_blob_size: u16,
	pub attributes: u32,
	pub n_attributes: u32,
	pub sections: u32,
	pub nsversion: u32,
	pub dependencies: u32,
}

impl FromBlob for Header {
	const SIZE: usize = HEADER_SIZE;

	fn from_bytes(b: &[u8]) -> Self {
		let u16_at = |o: usize| u16::from_le_bytes([b[o], b[o + 1]]);
		let u32_at = |o: usize| u32::from_le_bytes([b[o], b[o + 1], b[o + 2], b[o + 3]]);
		let mut magic = [0u8; 16];
		magic.copy_from_slice(&b[0..16]);
		Self {
			magic,
			major_version: b[16],
			minor_version: b[17],
			namespace: u32_at(20),
			c_prefix: u32_at(24),
			shared_library: u32_at(28),
			size: u32_at(32),
			directory: u32_at(36),
			n_entries: u16_at(40),
			n_local_entries: u16_at(42),
			entry_blob_size: u16_at(44),
			function_blob_size: u16_at(46),
			callback_blob_size: u16_at(48),
			signal_blob_size: u16_at(50),
			vfunc_blob_size: u16_at(52),
			arg_blob_size: u16_at(54),
			property_blob_size: u16_at(56),
			field_blob_size: u16_at(58),
			value_blob_size: u16_at(60),
			constant_blob_size: u16_at(62),
			attribute_blob_size: u16_at(64),
			signature_blob_size: u16_at(66),
			enum_blob_size: u16_at(68),
			struct_blob_size: u16_at(70),
			object_blob_size: u16_at(72),
			interface_blob_size: u16_at(74),
			union_blob_size: u16_at(76),
			attributes: u32_at(78),
			n_attributes: u32_at(82),
			sections: u32_at(86),
			nsversion: u32_at(90),
			dependencies: u32_at(94),
		}
	}
}

impl Header {
	/// Basic validation: used at construction time. No context, no
	/// namespace-name check — just enough to know the buffer is a
	/// plausible typelib before handing out a handle.
	#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
	pub fn read_basic(reader: &TypelibReader) -> Result<Header> {
		if reader.len() < HEADER_SIZE {
			return Err(TypelibError::invalid_header(format!(
				"buffer of {} bytes is too short to hold a header of {HEADER_SIZE} bytes",
				reader.len()
			)));
		}
		let header: Header = reader.view_at(0)?;

		if header.magic != MAGIC {
			return Err(TypelibError::invalid_header("Invalid magic header"));
		}
		if header.major_version != MAJOR_VERSION {
			return Err(TypelibError::invalid_header(format!(
				"Typelib major version {} does not match required version {MAJOR_VERSION}",
				header.major_version
			)));
		}
		if header.n_local_entries > header.n_entries {
			return Err(TypelibError::invalid_header(format!(
				"n_local_entries ({}) exceeds n_entries ({})",
				header.n_local_entries, header.n_entries
			)));
		}
		if header.size as usize != reader.len() {
			return Err(TypelibError::invalid_header(format!(
				"Typelib size {} does not match buffer length {}",
				header.size,
				reader.len()
			)));
		}

		macro_rules! check_size {
			($field:ident, $expected:expr, $label:literal) => {
				if header.$field as usize != $expected {
					return Err(TypelibError::invalid_header(format!(
						concat!($label, " blob size {} does not match expected size {}"),
						header.$field, $expected
					)));
				}
			};
		}
		check_size!(entry_blob_size, DIR_ENTRY_SIZE, "directory entry");
		check_size!(function_blob_size, FUNCTION_SIZE, "function");
		check_size!(callback_blob_size, CALLBACK_SIZE, "callback");
		check_size!(signal_blob_size, SIGNAL_SIZE, "signal");
		check_size!(vfunc_blob_size, VFUNC_SIZE, "vfunc");
		check_size!(arg_blob_size, ARG_SIZE, "arg");
		check_size!(property_blob_size, PROPERTY_SIZE, "property");
		check_size!(field_blob_size, FIELD_SIZE, "field");
		check_size!(value_blob_size, VALUE_SIZE, "value");
		check_size!(constant_blob_size, CONSTANT_SIZE, "constant");
		check_size!(attribute_blob_size, ATTRIBUTE_SIZE, "attribute");
		check_size!(signature_blob_size, SIGNATURE_SIZE, "signature");
		check_size!(enum_blob_size, ENUM_SIZE, "enum");
		check_size!(struct_blob_size, STRUCT_SIZE, "struct");
		check_size!(object_blob_size, OBJECT_SIZE, "object");
		check_size!(interface_blob_size, INTERFACE_SIZE, "interface");
		check_size!(union_blob_size, UNION_SIZE, "union");

		if !is_aligned4(header.directory as usize) {
			return Err(TypelibError::invalid_header("directory offset is not 4-byte aligned"));
		}
		if !is_aligned4(header.attributes as usize) {
			return Err(TypelibError::invalid_header("attributes offset is not 4-byte aligned"));
		}
		if (header.attributes == 0) != (header.n_attributes == 0) {
			return Err(TypelibError::invalid_header("attributes offset and n_attributes disagree about whether attributes are present"));
		}

		Ok(header)
	}

	/// Full validation: also checks the namespace name and walks the
	/// attribute table. Run only as part of the explicit `validate()` pass.
	#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
	pub fn validate_full(&self, reader: &TypelibReader, limits: &Limits, _ctx: &mut ContextStack) -> Result<()> {
		validate_name(reader, self.namespace as usize, "namespace", limits)?;
		if self.c_prefix != 0 {
			validate_name(reader, self.c_prefix as usize, "c_prefix", limits)?;
		}
		self.validate_attributes(reader)?;
		Ok(())
	}

	/// Walks the flat `(offset, name, value)` attribute table, validating
	/// that referenced name/value strings exist and that the table is
	/// sorted by owner offset (ascending), matching the producer's own
	/// invariant for the binary-search lookups downstream tools perform.
	fn validate_attributes(&self, reader: &TypelibReader) -> Result<()> {
		if self.n_attributes == 0 {
			return Ok(());
		}
		let base = self.attributes as usize;
		let mut previous_offset = None;
		for i in 0..self.n_attributes as usize {
			let entry_offset = base + i * ATTRIBUTE_SIZE;
			let bytes = reader.slice(entry_offset, ATTRIBUTE_SIZE)?;
			let owner = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
			let name = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
			let value = u32::from_le_bytes(bytes[8..12].try_into().unwrap());

			if let Some(prev) = previous_offset {
				if owner < prev {
					return Err(TypelibError::invalid_header("attribute table is not sorted by owner offset"));
				}
			}
			previous_offset = Some(owner);

			reader.string_at(name as usize)?;
			reader.string_at(value as usize)?;
		}
		Ok(())
	}

	pub fn namespace<'a>(&self, reader: &TypelibReader<'a>) -> Result<&'a str> {
		reader.string_at(self.namespace as usize)
	}

	pub fn c_prefix<'a>(&self, reader: &TypelibReader<'a>) -> Result<Option<&'a str>> {
		if self.c_prefix == 0 {
			return Ok(None);
		}
		Ok(Some(reader.string_at(self.c_prefix as usize)?))
	}
}
