use crate::context::ContextStack;
use crate::directory::{dir_entry_unchecked, BlobKind, Container};
use crate::error::{Result, TypelibError};
use crate::layout::{round_to_4, ENUM_SIZE, FUNCTION_SIZE, INTERFACE_SIZE, OBJECT_SIZE, STRUCT_SIZE, UNION_SIZE};
use crate::limits::Limits;
use crate::name::validate_name;
use crate::reader::TypelibReader;

use super::constant::{validate_constant, validate_value};
use super::field::{validate_field, validate_property};
use super::function::validate_function;
use super::signal::{validate_signal, validate_vfunc};

bitflags::bitflags! {
	#[derive(Debug, Copy, Clone, Eq, PartialEq)]
	struct RegisteredTypeFlags: u8 {
		const DEPRECATED = 0b01;
		const UNREGISTERED = 0b10;
	}
}

/// The fields common to struct/enum/object/interface/union headers
/// (§3, "RegisteredTypeBlob"): name, and — unless `unregistered` — a
/// gtype-name and gtype-init symbol (invariant 11).
struct RegisteredHeader<'a> {
	name: &'a str,
}

fn validate_registered_header<'a>(reader: &TypelibReader<'a>, offset: usize, limits: &Limits, role: &'static str) -> Result<RegisteredHeader<'a>> {
	let bytes = reader.slice(offset, 16)?;
	let flags = RegisteredTypeFlags::from_bits_truncate(bytes[0]);
	let name_offset = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
	let gtype_name_offset = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
	let gtype_init_offset = u32::from_le_bytes(bytes[12..16].try_into().unwrap());

	let name = validate_name(reader, name_offset as usize, role, limits)?;

	let unregistered = flags.contains(RegisteredTypeFlags::UNREGISTERED);
	if unregistered {
		if gtype_name_offset != 0 || gtype_init_offset != 0 {
			return Err(TypelibError::invalid_blob(format!("unregistered {role} must not declare a gtype name or init function")));
		}
	} else {
		validate_name(reader, gtype_name_offset as usize, "gtype name", limits)?;
		validate_name(reader, gtype_init_offset as usize, "gtype init function", limits)?;
	}

	Ok(RegisteredHeader { name })
}

/// Checks that directory index `index` is either a foreign entry, or a
/// local entry whose blob kind satisfies `allowed`.
fn check_index(reader: &TypelibReader, directory: usize, n_entries: u16, index: u16, allowed: impl Fn(BlobKind) -> bool, role: &'static str) -> Result<()> {
	if index == 0 || index > n_entries {
		return Err(TypelibError::invalid_blob(format!("{role} references invalid directory index {index}")));
	}
	let entry = dir_entry_unchecked(reader, directory, index);
	if !entry.local {
		return Ok(());
	}
	let kind = BlobKind::from_u8(entry.blob_type).ok_or_else(|| TypelibError::invalid_blob(format!("{role} entry has an unrecognised blob type")))?;
	if !allowed(kind) {
		return Err(TypelibError::invalid_blob(format!("{role} entry is not of an allowed kind")));
	}
	Ok(())
}

/// Validates a struct or boxed record (§4.9): header, trailing fields
/// (with embedded callbacks), trailing methods. The same validator
/// handles `union` per the specification's open-question resolution —
/// a union gets the same bounds/name/field checks as a struct.
pub fn validate_struct_or_boxed(reader: &TypelibReader, offset: usize, n_entries: u16, limits: &Limits, ctx: &mut ContextStack) -> Result<()> {
	let header = validate_registered_header(reader, offset, limits, "struct name")?;
	let _guard = ctx.push(header.name);

	let bytes = reader.slice(offset, STRUCT_SIZE)?;
	let n_fields = u16::from_le_bytes([bytes[20], bytes[21]]);
	let n_methods = u16::from_le_bytes([bytes[22], bytes[23]]);

	let result = (|| {
		let mut cursor = offset + STRUCT_SIZE;
		for _ in 0..n_fields {
			let v = validate_field(reader, cursor, n_entries, limits, ctx)?;
			cursor += v.consumed;
		}
		for _ in 0..n_methods {
			validate_function(reader, cursor, n_entries, limits, ctx, Container::StructOrBoxedOrUnion)?;
			cursor += FUNCTION_SIZE;
		}
		Ok(())
	})();
	result.map_err(|e| e.with_context(ctx.as_slice()))
}

/// Validates a union record. Structurally identical to struct/boxed for
/// validation purposes (see module doc on `validate_struct_or_boxed`).
pub fn validate_union(reader: &TypelibReader, offset: usize, n_entries: u16, limits: &Limits, ctx: &mut ContextStack) -> Result<()> {
	let header = validate_registered_header(reader, offset, limits, "union name")?;
	let _guard = ctx.push(header.name);

	let bytes = reader.slice(offset, UNION_SIZE)?;
	let n_fields = u16::from_le_bytes([bytes[20], bytes[21]]);
	let n_methods = u16::from_le_bytes([bytes[22], bytes[23]]);

	let result = (|| {
		let mut cursor = offset + UNION_SIZE;
		for _ in 0..n_fields {
			let v = validate_field(reader, cursor, n_entries, limits, ctx)?;
			cursor += v.consumed;
		}
		for _ in 0..n_methods {
			validate_function(reader, cursor, n_entries, limits, ctx, Container::StructOrBoxedOrUnion)?;
			cursor += FUNCTION_SIZE;
		}
		Ok(())
	})();
	result.map_err(|e| e.with_context(ctx.as_slice()))
}

/// Validates an enum or flags record (§4.9): header, values, methods.
/// Duplicate values are accepted (§9 open question).
pub fn validate_enum_or_flags(reader: &TypelibReader, offset: usize, n_entries: u16, limits: &Limits, ctx: &mut ContextStack) -> Result<()> {
	let header = validate_registered_header(reader, offset, limits, "enum name")?;
	let _guard = ctx.push(header.name);

	let bytes = reader.slice(offset, ENUM_SIZE)?;
	let n_values = u16::from_le_bytes([bytes[16], bytes[17]]);
	let n_methods = u16::from_le_bytes([bytes[18], bytes[19]]);
	let error_domain = u32::from_le_bytes(bytes[20..24].try_into().unwrap());

	let result = (|| {
		if error_domain != 0 {
			validate_name(reader, error_domain as usize, "error domain", limits)?;
		}

		let mut cursor = offset + ENUM_SIZE;
		for _ in 0..n_values {
			validate_value(reader, cursor, limits, ctx)?;
			cursor += crate::layout::VALUE_SIZE;
		}
		for _ in 0..n_methods {
			// Constructors, setters, getters and wraps-vfunc are not legal on
			// enum/flags methods (invariant 7 omits enum/flags from the
			// containers that allow them).
			validate_function(reader, cursor, n_entries, limits, ctx, Container::TopLevel)?;
			cursor += FUNCTION_SIZE;
		}
		Ok(())
	})();
	result.map_err(|e| e.with_context(ctx.as_slice()))
}

/// Validates an object record (§4.9, invariant 6 & 8): header, parent and
/// gtype-struct index constraints, the full composite trailer
/// (interfaces, fields, properties, methods, signals, vfuncs, constants),
/// and the field-callback count invariant.
pub fn validate_object(reader: &TypelibReader, offset: usize, directory: usize, n_entries: u16, limits: &Limits, ctx: &mut ContextStack) -> Result<()> {
	let header = validate_registered_header(reader, offset, limits, "object name")?;
	let _guard = ctx.push(header.name);

	let bytes = reader.slice(offset, OBJECT_SIZE)?;
	let parent = u16::from_le_bytes([bytes[16], bytes[17]]);
	let gtype_struct = u16::from_le_bytes([bytes[18], bytes[19]]);
	let n_interfaces = u16::from_le_bytes([bytes[20], bytes[21]]);
	let n_fields = u16::from_le_bytes([bytes[22], bytes[23]]);
	let n_properties = u16::from_le_bytes([bytes[24], bytes[25]]);
	let n_methods = u16::from_le_bytes([bytes[26], bytes[27]]);
	let n_signals = u16::from_le_bytes([bytes[28], bytes[29]]);
	let n_vfuncs = u16::from_le_bytes([bytes[30], bytes[31]]);
	let n_constants = u16::from_le_bytes([bytes[32], bytes[33]]);
	let n_field_callbacks = u16::from_le_bytes([bytes[34], bytes[35]]);

	let result = (|| {
		if parent != 0 {
			check_index(reader, directory, n_entries, parent, |k| k == BlobKind::Object, "parent")?;
		}
		if gtype_struct != 0 {
			check_index(reader, directory, n_entries, gtype_struct, |k| k == BlobKind::Struct, "gtype-struct")?;
			let entry = dir_entry_unchecked(reader, directory, gtype_struct);
			if !entry.local {
				return Err(TypelibError::invalid_blob("gtype-struct must resolve to a local struct"));
			}
		}

		let mut cursor = offset + OBJECT_SIZE;

		for i in 0..n_interfaces {
			let bytes = reader.slice(cursor + i as usize * 2, 2)?;
			let index = u16::from_le_bytes([bytes[0], bytes[1]]);
			check_index(reader, directory, n_entries, index, |k| k == BlobKind::Interface, "interface")?;
		}
		cursor += round_to_4(n_interfaces as usize * 2);

		let mut field_callbacks = 0u16;
		for _ in 0..n_fields {
			let v = validate_field(reader, cursor, n_entries, limits, ctx)?;
			if v.has_embedded_type {
				field_callbacks += 1;
			}
			cursor += v.consumed;
		}
		if field_callbacks != n_field_callbacks {
			return Err(TypelibError::invalid_blob(format!(
				"Incorrect number of field callbacks; expected {n_field_callbacks}, got {field_callbacks}"
			)));
		}

		for _ in 0..n_properties {
			validate_property(reader, cursor, n_entries, limits, ctx)?;
			cursor += crate::layout::PROPERTY_SIZE;
		}
		for _ in 0..n_methods {
			validate_function(reader, cursor, n_entries, limits, ctx, Container::Object)?;
			cursor += FUNCTION_SIZE;
		}
		for _ in 0..n_signals {
			validate_signal(reader, cursor, n_entries, limits, ctx, Container::Object, n_signals)?;
			cursor += crate::layout::SIGNAL_SIZE;
		}
		for _ in 0..n_vfuncs {
			validate_vfunc(reader, cursor, n_entries, limits, ctx, Container::Object, n_vfuncs)?;
			cursor += crate::layout::VFUNC_SIZE;
		}
		for _ in 0..n_constants {
			validate_constant(reader, cursor, n_entries, limits, ctx, Container::Object)?;
			cursor += crate::layout::CONSTANT_SIZE;
		}

		Ok(())
	})();
	result.map_err(|e| e.with_context(ctx.as_slice()))
}

/// Validates an interface record (§4.9): same skeleton as object minus
/// parent/fields/field-callbacks; prerequisites must be interface or
/// object (or foreign).
pub fn validate_interface(reader: &TypelibReader, offset: usize, directory: usize, n_entries: u16, limits: &Limits, ctx: &mut ContextStack) -> Result<()> {
	let header = validate_registered_header(reader, offset, limits, "interface name")?;
	let _guard = ctx.push(header.name);

	let bytes = reader.slice(offset, INTERFACE_SIZE)?;
	let n_prerequisites = u16::from_le_bytes([bytes[16], bytes[17]]);
	let n_properties = u16::from_le_bytes([bytes[18], bytes[19]]);
	let n_methods = u16::from_le_bytes([bytes[20], bytes[21]]);
	let n_signals = u16::from_le_bytes([bytes[22], bytes[23]]);
	let n_vfuncs = u16::from_le_bytes([bytes[24], bytes[25]]);
	let n_constants = u16::from_le_bytes([bytes[26], bytes[27]]);

	let result = (|| {
		let mut cursor = offset + INTERFACE_SIZE;

		for i in 0..n_prerequisites {
			let bytes = reader.slice(cursor + i as usize * 2, 2)?;
			let index = u16::from_le_bytes([bytes[0], bytes[1]]);
			check_index(reader, directory, n_entries, index, |k| matches!(k, BlobKind::Interface | BlobKind::Object), "prerequisite")?;
		}
		cursor += round_to_4(n_prerequisites as usize * 2);

		for _ in 0..n_properties {
			validate_property(reader, cursor, n_entries, limits, ctx)?;
			cursor += crate::layout::PROPERTY_SIZE;
		}
		for _ in 0..n_methods {
			validate_function(reader, cursor, n_entries, limits, ctx, Container::Interface)?;
			cursor += FUNCTION_SIZE;
		}
		for _ in 0..n_signals {
			validate_signal(reader, cursor, n_entries, limits, ctx, Container::Interface, n_signals)?;
			cursor += crate::layout::SIGNAL_SIZE;
		}
		for _ in 0..n_vfuncs {
			validate_vfunc(reader, cursor, n_entries, limits, ctx, Container::Interface, n_vfuncs)?;
			cursor += crate::layout::VFUNC_SIZE;
		}
		for _ in 0..n_constants {
			validate_constant(reader, cursor, n_entries, limits, ctx, Container::Interface)?;
			cursor += crate::layout::CONSTANT_SIZE;
		}

		Ok(())
	})();
	result.map_err(|e| e.with_context(ctx.as_slice()))
}
