use crate::error::{Result, TypelibError};
use crate::layout::{ARRAY_TYPE_SIZE, ERROR_TYPE_SIZE, INTERFACE_TYPE_SIZE, PARAM_TYPE_SIZE, SIMPLE_TYPE_SIZE};
use crate::limits::Limits;
use crate::reader::TypelibReader;

/// Tag space shared by simple and complex type blobs. Values 0..=14 and 21
/// are "basic" (usable directly in a simple blob); 15..=20 only ever
/// appear as the tag of a complex blob.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum TypeTag {
	Void = 0,
	Boolean = 1,
	Int8 = 2,
	UInt8 = 3,
	Int16 = 4,
	UInt16 = 5,
	Int32 = 6,
	UInt32 = 7,
	Int64 = 8,
	UInt64 = 9,
	Float = 10,
	Double = 11,
	GType = 12,
	Utf8 = 13,
	Filename = 14,
	Array = 15,
	Interface = 16,
	GList = 17,
	GSList = 18,
	GHash = 19,
	Error = 20,
	Unichar = 21,
}

impl TypeTag {
	pub fn from_u8(v: u8) -> Option<Self> {
		use TypeTag::*;
		Some(match v {
			0 => Void,
			1 => Boolean,
			2 => Int8,
			3 => UInt8,
			4 => Int16,
			5 => UInt16,
			6 => Int32,
			7 => UInt32,
			8 => Int64,
			9 => UInt64,
			10 => Float,
			11 => Double,
			12 => GType,
			13 => Utf8,
			14 => Filename,
			15 => Array,
			16 => Interface,
			17 => GList,
			18 => GSList,
			19 => GHash,
			20 => Error,
			21 => Unichar,
			_ => return None,
		})
	}

	pub fn is_basic(self) -> bool {
		!matches!(self, TypeTag::Array | TypeTag::Interface | TypeTag::GList | TypeTag::GSList | TypeTag::GHash | TypeTag::Error)
	}
}

/// The decoded shape of a 4-byte type-blob word: either an inline simple
/// type, or an offset to a complex type blob elsewhere in the buffer.
enum SimpleTypeWord {
	Simple { tag: u8, pointer: bool },
	ComplexOffset(u32),
}

impl TypeTag {
	fn display_name(self) -> &'static str {
		match self {
			TypeTag::Void => "void",
			TypeTag::Boolean => "boolean",
			TypeTag::Int8 => "int8",
			TypeTag::UInt8 => "uint8",
			TypeTag::Int16 => "int16",
			TypeTag::UInt16 => "uint16",
			TypeTag::Int32 => "int32",
			TypeTag::UInt32 => "uint32",
			TypeTag::Int64 => "int64",
			TypeTag::UInt64 => "uint64",
			TypeTag::Float => "float",
			TypeTag::Double => "double",
			TypeTag::GType => "gtype",
			TypeTag::Utf8 => "utf8",
			TypeTag::Filename => "filename",
			TypeTag::Array => "array",
			TypeTag::Interface => "interface",
			TypeTag::GList => "glist",
			TypeTag::GSList => "gslist",
			TypeTag::GHash => "ghash",
			TypeTag::Error => "error",
			TypeTag::Unichar => "unichar",
		}
	}
}

/// Resolves the tag of the type blob at `offset`, whether it's encoded
/// inline (simple) or behind a complex-blob offset.
pub fn resolve_type_tag(reader: &TypelibReader, offset: usize) -> Result<TypeTag> {
	let raw: u32 = reader.view_at(offset)?;
	match decode_simple_word(raw) {
		SimpleTypeWord::Simple { tag, .. } => TypeTag::from_u8(tag).ok_or_else(|| TypelibError::invalid_blob("non-basic tag in simple type")),
		SimpleTypeWord::ComplexOffset(complex_offset) => {
			let bytes = reader.slice(complex_offset as usize, 1)?;
			TypeTag::from_u8(bytes[0] & 0x3F).ok_or_else(|| TypelibError::invalid_blob("wrong tag in complex type"))
		},
	}
}

/// The fixed on-the-wire width of a constant's value, for tags that have
/// one (§ invariant 12). `None` means the tag has no fixed width (strings,
/// and the non-basic container tags, which a well-formed constant never
/// declares).
pub fn fixed_value_width(tag: TypeTag) -> Option<u32> {
	use TypeTag::*;
	match tag {
		Boolean => Some(4),
		Int8 | UInt8 => Some(1),
		Int16 | UInt16 => Some(2),
		Int32 | UInt32 => Some(4),
		Int64 | UInt64 => Some(8),
		Float => Some(4),
		Double => Some(8),
		GType => Some(8),
		Unichar => Some(4),
		Void | Utf8 | Filename | Array | Interface | GList | GSList | GHash | Error => None,
	}
}

/// Returns whether the type blob at `offset` is an `interface` reference,
/// and the tag's display name (used to compose the constructor-return-type
/// error message in §4.6/S6).
pub fn describe_return_type(reader: &TypelibReader, offset: usize) -> Result<(bool, &'static str)> {
	let raw: u32 = reader.view_at(offset)?;
	match decode_simple_word(raw) {
		SimpleTypeWord::Simple { tag, .. } => {
			let tag = TypeTag::from_u8(tag).ok_or_else(|| TypelibError::invalid_blob("non-basic tag in simple type"))?;
			Ok((false, tag.display_name()))
		},
		SimpleTypeWord::ComplexOffset(complex_offset) => {
			let bytes = reader.slice(complex_offset as usize, 1)?;
			let tag = TypeTag::from_u8(bytes[0] & 0x3F).ok_or_else(|| TypelibError::invalid_blob("wrong tag in complex type"))?;
			Ok((matches!(tag, TypeTag::Interface), tag.display_name()))
		},
	}
}

fn decode_simple_word(v: u32) -> SimpleTypeWord {
	let reserved0 = v & 0b1;
	let reserved1 = (v >> 1) & 0b1;
	if reserved0 == 0 && reserved1 == 0 {
		let tag = ((v >> 2) & 0x3F) as u8;
		let pointer = (v >> 8) & 0b1 != 0;
		SimpleTypeWord::Simple { tag, pointer }
	} else {
		SimpleTypeWord::ComplexOffset(v)
	}
}

/// Recursively validates the type blob at `offset` (§4.4). `n_entries` is
/// the directory's entry count, used to bounds-check interface-type
/// indices; `depth` guards against pathological nesting and is checked
/// against `limits.max_type_depth` before any recursive call.
pub fn validate_type_blob(reader: &TypelibReader, offset: usize, n_entries: u16, limits: &Limits, depth: u32) -> Result<()> {
	if depth > limits.max_type_depth {
		return Err(TypelibError::invalid_blob("type nesting exceeds the maximum supported depth"));
	}

	let raw: u32 = reader.view_at(offset)?;
	match decode_simple_word(raw) {
		SimpleTypeWord::Simple { tag, pointer } => {
			let Some(tag) = TypeTag::from_u8(tag) else {
				return Err(TypelibError::invalid_blob("non-basic tag in simple type"));
			};
			if !tag.is_basic() {
				return Err(TypelibError::invalid_blob("non-basic tag in simple type"));
			}
			if matches!(tag, TypeTag::Utf8 | TypeTag::Filename) && !pointer {
				return Err(TypelibError::invalid_blob("string-like basic type must have the pointer flag set"));
			}
			Ok(())
		},
		SimpleTypeWord::ComplexOffset(complex_offset) => {
			validate_complex_type_blob(reader, complex_offset as usize, n_entries, limits, depth)
		},
	}
}

fn validate_complex_type_blob(reader: &TypelibReader, offset: usize, n_entries: u16, limits: &Limits, depth: u32) -> Result<()> {
	let bytes = reader.slice(offset, 2)?;
	let tag_byte = bytes[0];
	let pointer = bytes[1] != 0;
	let Some(tag) = TypeTag::from_u8(tag_byte & 0x3F) else {
		return Err(TypelibError::invalid_blob("wrong tag in complex type"));
	};

	match tag {
		TypeTag::Array => {
			reader.slice(offset, ARRAY_TYPE_SIZE)?;
			validate_type_blob(reader, offset + 4, n_entries, limits, depth + 1)
		},
		TypeTag::Interface => {
			let buf = reader.slice(offset, INTERFACE_TYPE_SIZE)?;
			let index = u16::from_le_bytes([buf[2], buf[3]]);
			if index == 0 || index > n_entries {
				return Err(TypelibError::invalid_blob(format!("interface type references invalid directory index {index}")));
			}
			Ok(())
		},
		TypeTag::GList | TypeTag::GSList => {
			if !pointer {
				return Err(TypelibError::invalid_blob("list type must have the pointer flag set"));
			}
			let buf = reader.slice(offset, PARAM_TYPE_SIZE)?;
			let n_params = buf[2];
			if n_params != 1 {
				return Err(TypelibError::invalid_blob(format!("list type declares {n_params} parameters, expected 1")));
			}
			validate_type_blob(reader, offset + PARAM_TYPE_SIZE, n_entries, limits, depth + 1)
		},
		TypeTag::GHash => {
			if !pointer {
				return Err(TypelibError::invalid_blob("hash type must have the pointer flag set"));
			}
			let buf = reader.slice(offset, PARAM_TYPE_SIZE)?;
			let n_params = buf[2];
			if n_params != 2 {
				return Err(TypelibError::invalid_blob(format!("hash type declares {n_params} parameters, expected 2")));
			}
			validate_type_blob(reader, offset + PARAM_TYPE_SIZE, n_entries, limits, depth + 1)?;
			validate_type_blob(reader, offset + PARAM_TYPE_SIZE + SIMPLE_TYPE_SIZE, n_entries, limits, depth + 1)
		},
		TypeTag::Error => {
			reader.slice(offset, ERROR_TYPE_SIZE)?;
			if !pointer {
				return Err(TypelibError::invalid_blob("error type must have the pointer flag set"));
			}
			Ok(())
		},
		_ => Err(TypelibError::invalid_blob("wrong tag in complex type")),
	}
}
