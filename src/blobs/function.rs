use crate::context::ContextStack;
use crate::directory::{BlobKind, Container};
use crate::error::{Result, TypelibError};
use crate::layout::{CALLBACK_SIZE, FUNCTION_SIZE};
use crate::limits::Limits;
use crate::name::validate_name;
use crate::reader::TypelibReader;
use crate::signature::validate_signature;
use crate::types::describe_return_type;

bitflags::bitflags! {
	#[derive(Debug, Copy, Clone, Eq, PartialEq)]
	struct FunctionFlags: u8 {
		const CONSTRUCTOR = 0b0001;
		const SETTER = 0b0010;
		const GETTER = 0b0100;
		const WRAPS_VFUNC = 0b1000;
	}
}

/// Validates a function record (§4.6): bounds, name/symbol, contextual
/// flag legality (invariant 7), signature, and — for constructors inside
/// object/interface — that the return type is an `interface` reference.
pub fn validate_function(reader: &TypelibReader, offset: usize, n_entries: u16, limits: &Limits, ctx: &mut ContextStack, container: Container) -> Result<()> {
	let bytes = reader.slice(offset, FUNCTION_SIZE)?;
	if bytes[0] != BlobKind::Function as u8 {
		return Err(TypelibError::invalid_blob("expected a function blob"));
	}
	let name_offset = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
	let symbol_offset = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
	let flags = FunctionFlags::from_bits_truncate(bytes[12]);
	let index = bytes[13];
	let signature_offset = u32::from_le_bytes(bytes[16..20].try_into().unwrap());

	let name = validate_name(reader, name_offset as usize, "function name", limits)?;
	validate_name(reader, symbol_offset as usize, "function symbol", limits)?;

	if flags.contains(FunctionFlags::CONSTRUCTOR) && !container.allows_constructor() {
		return Err(TypelibError::invalid_blob("constructor flag is only valid inside boxed/struct/union/object/interface"));
	}
	let setter_getter_vfunc = flags.intersects(FunctionFlags::SETTER | FunctionFlags::GETTER | FunctionFlags::WRAPS_VFUNC);
	if setter_getter_vfunc && !container.allows_setter_getter_vfunc() {
		return Err(TypelibError::invalid_blob("setter/getter/wraps-vfunc flags are only valid inside object/interface"));
	}
	if index != 0 && !setter_getter_vfunc {
		return Err(TypelibError::invalid_blob("index is only meaningful alongside setter/getter/wraps-vfunc"));
	}

	let _guard = ctx.push(name);
	let result = (|| {
		validate_signature(reader, signature_offset as usize, n_entries, limits)?;

		if flags.contains(FunctionFlags::CONSTRUCTOR) && matches!(container, Container::Object | Container::Interface) {
			let (is_interface, tag_name) = describe_return_type(reader, signature_offset as usize)?;
			if !is_interface {
				return Err(TypelibError::invalid_data(format!("Invalid return type '{tag_name}' for constructor '{name}'")));
			}
		}

		Ok(())
	})();
	result.map_err(|e| e.with_context(ctx.as_slice()))
}

/// Validates a callback record (§4.7): bounds, name, signature.
pub fn validate_callback(reader: &TypelibReader, offset: usize, n_entries: u16, limits: &Limits, ctx: &mut ContextStack) -> Result<()> {
	let bytes = reader.slice(offset, CALLBACK_SIZE)?;
	if bytes[0] != BlobKind::Callback as u8 {
		return Err(TypelibError::invalid_blob("expected a callback blob"));
	}
	let name_offset = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
	let signature_offset = u32::from_le_bytes(bytes[8..12].try_into().unwrap());

	let name = validate_name(reader, name_offset as usize, "callback name", limits)?;
	let _guard = ctx.push(name);
	validate_signature(reader, signature_offset as usize, n_entries, limits).map_err(|e| e.with_context(ctx.as_slice()))
}
