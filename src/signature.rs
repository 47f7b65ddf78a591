use crate::error::Result;
use crate::layout::{ARG_SIZE, SIGNATURE_SIZE};
use crate::limits::Limits;
use crate::name::validate_name;
use crate::reader::TypelibReader;
use crate::types::validate_type_blob;

/// Validates the signature blob at `offset`: return type, then `n_arguments`
/// argument blobs in sequence (§4.5).
pub fn validate_signature(reader: &TypelibReader, offset: usize, n_entries: u16, limits: &Limits) -> Result<()> {
	let bytes = reader.slice(offset, SIGNATURE_SIZE)?;
	let n_arguments = u16::from_le_bytes([bytes[4], bytes[5]]);

	validate_type_blob(reader, offset, n_entries, limits, 0)?;

	let args_base = offset + SIGNATURE_SIZE;
	for i in 0..n_arguments as usize {
		validate_arg(reader, args_base + i * ARG_SIZE, n_entries, limits)?;
	}
	Ok(())
}

/// Validates a single 16-byte argument blob: name, then type.
fn validate_arg(reader: &TypelibReader, offset: usize, n_entries: u16, limits: &Limits) -> Result<()> {
	let bytes = reader.slice(offset, ARG_SIZE)?;
	let name_offset = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
	validate_name(reader, name_offset as usize, "argument name", limits)?;
	validate_type_blob(reader, offset + 8, n_entries, limits, 0)
}
