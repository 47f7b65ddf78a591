use crate::context::ContextStack;
use crate::error::Result;
use crate::layout::{CALLBACK_SIZE, FIELD_SIZE, PROPERTY_SIZE};
use crate::limits::Limits;
use crate::name::validate_name;
use crate::reader::TypelibReader;
use crate::types::validate_type_blob;

use super::function::validate_callback;

bitflags::bitflags! {
	#[derive(Debug, Copy, Clone, Eq, PartialEq)]
	struct FieldFlags: u8 {
		const READABLE = 0b001;
		const WRITABLE = 0b010;
		const HAS_EMBEDDED_TYPE = 0b100;
	}
}

/// Result of validating one field: how many trailing bytes it occupied
/// (`FIELD_SIZE`, plus `CALLBACK_SIZE` when an embedded callback record
/// follows) and whether it counts toward `n_field_callbacks`.
pub struct FieldValidation {
	pub consumed: usize,
	pub has_embedded_type: bool,
}

/// Validates a field record (§4.7): name; if `has_embedded_type`, the
/// trailing callback blob is validated and the field's own type slot is
/// ignored; otherwise the field's type is validated directly.
pub fn validate_field(reader: &TypelibReader, offset: usize, n_entries: u16, limits: &Limits, ctx: &mut ContextStack) -> Result<FieldValidation> {
	let bytes = reader.slice(offset, FIELD_SIZE)?;
	let name_offset = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
	let flags = FieldFlags::from_bits_truncate(bytes[4]);

	let name = validate_name(reader, name_offset as usize, "field name", limits)?;
	let _guard = ctx.push(name);

	let result = (|| {
		if flags.contains(FieldFlags::HAS_EMBEDDED_TYPE) {
			validate_callback(reader, offset + FIELD_SIZE, n_entries, limits, ctx)?;
			Ok(FieldValidation { consumed: FIELD_SIZE + CALLBACK_SIZE, has_embedded_type: true })
		} else {
			validate_type_blob(reader, offset + 8, n_entries, limits, 0)?;
			Ok(FieldValidation { consumed: FIELD_SIZE, has_embedded_type: false })
		}
	})();
	result.map_err(|e| e.with_context(ctx.as_slice()))
}

/// Validates a property record (§4.7): name, type.
pub fn validate_property(reader: &TypelibReader, offset: usize, n_entries: u16, limits: &Limits, ctx: &mut ContextStack) -> Result<()> {
	let bytes = reader.slice(offset, PROPERTY_SIZE)?;
	let name_offset = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
	let name = validate_name(reader, name_offset as usize, "property name", limits)?;
	let _guard = ctx.push(name);
	validate_type_blob(reader, offset + 8, n_entries, limits, 0).map_err(|e| e.with_context(ctx.as_slice()))
}
