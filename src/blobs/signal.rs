use crate::context::ContextStack;
use crate::directory::Container;
use crate::error::{Result, TypelibError};
use crate::layout::{SIGNAL_SIZE, VFUNC_SIZE};
use crate::limits::Limits;
use crate::name::validate_name;
use crate::reader::TypelibReader;
use crate::signature::validate_signature;

bitflags::bitflags! {
	#[derive(Debug, Copy, Clone, Eq, PartialEq)]
	struct SignalFlags: u8 {
		const RUN_FIRST = 0b00001;
		const RUN_LAST = 0b00010;
		const RUN_CLEANUP = 0b00100;
		const HAS_CLASS_CLOSURE = 0b01000;
		const DETAILED = 0b10000;
	}
}

/// Validates a signal record (§4.8, invariant 9 & 10): name; exactly one
/// run-phase flag; class-closure legality and bound.
pub fn validate_signal(
	reader: &TypelibReader,
	offset: usize,
	n_entries: u16,
	limits: &Limits,
	ctx: &mut ContextStack,
	container: Container,
	container_n_signals: u16,
) -> Result<()> {
	let bytes = reader.slice(offset, SIGNAL_SIZE)?;
	let name_offset = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
	let flags = SignalFlags::from_bits_truncate(bytes[4]);
	let class_closure = u16::from_le_bytes([bytes[6], bytes[7]]);
	let signature_offset = u32::from_le_bytes(bytes[8..12].try_into().unwrap());

	let name = validate_name(reader, name_offset as usize, "signal name", limits)?;
	let _guard = ctx.push(name);

	let result = (|| {
		let run_flags = flags & (SignalFlags::RUN_FIRST | SignalFlags::RUN_LAST | SignalFlags::RUN_CLEANUP);
		if run_flags.bits().count_ones() != 1 {
			return Err(TypelibError::invalid_blob("Invalid signal run flags"));
		}

		if flags.contains(SignalFlags::HAS_CLASS_CLOSURE) {
			if !matches!(container, Container::Object | Container::Interface) {
				return Err(TypelibError::invalid_blob("class closure is only valid on signals declared by an object or interface"));
			}
			if class_closure >= container_n_signals {
				return Err(TypelibError::invalid_blob(format!(
					"signal class closure index {class_closure} is not less than the container's signal count {container_n_signals}"
				)));
			}
		}

		validate_signature(reader, signature_offset as usize, n_entries, limits)
	})();
	result.map_err(|e| e.with_context(ctx.as_slice()))
}

bitflags::bitflags! {
	#[derive(Debug, Copy, Clone, Eq, PartialEq)]
	struct VFuncFlags: u8 {
		const MUST_CHAIN_UP = 0b00001;
		const OVERRIDE = 0b00010;
		const NOT_OVERRIDE = 0b00100;
		const HAS_CLASS_CLOSURE = 0b01000;
		const THROWS = 0b10000;
	}
}

/// Validates a vfunc record (§4.8, invariant 10): name; class-closure
/// legality and bound; signature.
pub fn validate_vfunc(
	reader: &TypelibReader,
	offset: usize,
	n_entries: u16,
	limits: &Limits,
	ctx: &mut ContextStack,
	container: Container,
	container_n_vfuncs: u16,
) -> Result<()> {
	let bytes = reader.slice(offset, VFUNC_SIZE)?;
	let name_offset = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
	let flags = VFuncFlags::from_bits_truncate(bytes[4]);
	let class_closure = u16::from_le_bytes([bytes[6], bytes[7]]);
	let signature_offset = u32::from_le_bytes(bytes[12..16].try_into().unwrap());

	let name = validate_name(reader, name_offset as usize, "vfunc name", limits)?;
	let _guard = ctx.push(name);

	let result = (|| {
		if flags.contains(VFuncFlags::HAS_CLASS_CLOSURE) {
			if !matches!(container, Container::Object | Container::Interface) {
				return Err(TypelibError::invalid_blob("class closure is only valid on vfuncs declared by an object or interface"));
			}
			if class_closure >= container_n_vfuncs {
				return Err(TypelibError::invalid_blob(format!(
					"vfunc class closure index {class_closure} is not less than the container's vfunc count {container_n_vfuncs}"
				)));
			}
		}

		validate_signature(reader, signature_offset as usize, n_entries, limits)
	})();
	result.map_err(|e| e.with_context(ctx.as_slice()))
}
