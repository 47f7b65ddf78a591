use crate::context::ContextStack;
use crate::directory::Container;
use crate::error::{Result, TypelibError};
use crate::layout::{is_aligned4, CONSTANT_SIZE, VALUE_SIZE};
use crate::limits::Limits;
use crate::name::validate_name;
use crate::reader::TypelibReader;
use crate::types::{fixed_value_width, resolve_type_tag, validate_type_blob};

/// Validates a constant record (§4.7, invariant 12): name, type, aligned
/// value offset, and — for tags with a fixed width — that the declared
/// value size matches it.
pub fn validate_constant(reader: &TypelibReader, offset: usize, n_entries: u16, limits: &Limits, ctx: &mut ContextStack, _container: Container) -> Result<()> {
	let bytes = reader.slice(offset, CONSTANT_SIZE)?;
	let name_offset = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
	let type_offset = offset + 8;
	let value_size = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
	let value_offset = u32::from_le_bytes(bytes[16..20].try_into().unwrap());

	let name = validate_name(reader, name_offset as usize, "constant name", limits)?;
	let _guard = ctx.push(name);

	let result = (|| {
		validate_type_blob(reader, type_offset, n_entries, limits, 0)?;

		if !is_aligned4(value_offset as usize) {
			return Err(TypelibError::invalid_data("constant value offset is not 4-byte aligned"));
		}
		reader.slice(value_offset as usize, value_size as usize)?;

		let tag = resolve_type_tag(reader, type_offset)?;
		if let Some(expected) = fixed_value_width(tag) {
			if value_size != expected {
				return Err(TypelibError::invalid_data(format!(
					"constant '{name}' declares value size {value_size}, expected {expected} for its type"
				)));
			}
		}

		Ok(())
	})();
	result.map_err(|e| e.with_context(ctx.as_slice()))
}

/// Validates an enum/flags value record (§4.7): name only.
pub fn validate_value(reader: &TypelibReader, offset: usize, limits: &Limits, ctx: &mut ContextStack) -> Result<()> {
	let bytes = reader.slice(offset, VALUE_SIZE)?;
	let name_offset = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
	let name = validate_name(reader, name_offset as usize, "enum value name", limits)?;
	let _guard = ctx.push(name);
	Ok(())
}
