//! Fixed sizes, offsets and magic constants for every record kind in the
//! typelib binary format. Nothing in this module touches buffer contents;
//! it is the compiled-in half of the format's "bit-exact" contract.

/// 16-byte sentinel every typelib must begin with.
pub const MAGIC: [u8; 16] = *b"GOBJ\x0ATYPELIB\xCA\xFE\xBA\xBE";

/// Only major version this implementation understands.
pub const MAJOR_VERSION: u8 = 4;

/// Record sizes, in bytes. These are the binary contract from the
/// specification's external-interfaces section; every field here must
/// match the layout implemented by the corresponding blob struct.
pub const HEADER_SIZE: usize = 112;
pub const DIR_ENTRY_SIZE: usize = 12;
pub const SIMPLE_TYPE_SIZE: usize = 4;
pub const ARG_SIZE: usize = 16;
pub const SIGNATURE_SIZE: usize = 8;
pub const COMMON_SIZE: usize = 8;
pub const FUNCTION_SIZE: usize = 20;
pub const CALLBACK_SIZE: usize = 12;
pub const INTERFACE_TYPE_SIZE: usize = 4;
pub const ARRAY_TYPE_SIZE: usize = 8;
pub const PARAM_TYPE_SIZE: usize = 4;
pub const ERROR_TYPE_SIZE: usize = 4;
pub const VALUE_SIZE: usize = 12;
pub const FIELD_SIZE: usize = 16;
pub const REGISTERED_TYPE_SIZE: usize = 16;
pub const STRUCT_SIZE: usize = 32;
pub const ENUM_SIZE: usize = 24;
pub const PROPERTY_SIZE: usize = 16;
pub const SIGNAL_SIZE: usize = 16;
pub const VFUNC_SIZE: usize = 20;
pub const OBJECT_SIZE: usize = 60;
pub const INTERFACE_SIZE: usize = 40;
pub const CONSTANT_SIZE: usize = 24;
pub const ATTRIBUTE_SIZE: usize = 12;
pub const UNION_SIZE: usize = 40;

/// Sentinel id terminating the optional sections table.
pub const SECTION_END: u16 = 0;
/// Section id for the perfect-hash directory index, when present.
pub const SECTION_DIRECTORY_INDEX: u16 = 1;

/// Charset and length rule enforced by the name validator.
#[inline]
pub fn is_name_byte(b: u8) -> bool {
	b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

#[inline]
pub const fn round_to_4(value: usize) -> usize {
	(value + 3) & !3
}

#[inline]
pub const fn is_aligned4(offset: usize) -> bool {
	offset & 3 == 0
}
