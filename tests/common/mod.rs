//! Hand-assembled typelib fixtures for the integration scenarios (S1–S7,
//! §8). Integration tests link against the compiled library, not its
//! private modules, so this mirrors an external producer: it lays out the
//! wire format from scratch against the "bit-exact" constants in spec §6.1
//! rather than reusing `gi_typelib`'s internal `layout` module.
#![allow(dead_code)]

pub const MAGIC: [u8; 16] = *b"GOBJ\x0ATYPELIB\xCA\xFE\xBA\xBE";
pub const MAJOR_VERSION: u8 = 4;

pub const HEADER_SIZE: usize = 112;
pub const DIR_ENTRY_SIZE: usize = 12;
pub const SIGNATURE_SIZE: usize = 8;
pub const FUNCTION_SIZE: usize = 20;
pub const CALLBACK_SIZE: usize = 12;
pub const ARG_SIZE: usize = 16;
pub const PROPERTY_SIZE: usize = 16;
pub const FIELD_SIZE: usize = 16;
pub const VALUE_SIZE: usize = 12;
pub const CONSTANT_SIZE: usize = 24;
pub const ATTRIBUTE_SIZE: usize = 12;
pub const ENUM_SIZE: usize = 24;
pub const STRUCT_SIZE: usize = 32;
pub const OBJECT_SIZE: usize = 60;
pub const INTERFACE_SIZE: usize = 40;
pub const UNION_SIZE: usize = 40;
pub const SIGNAL_SIZE: usize = 16;
pub const VFUNC_SIZE: usize = 20;

pub const BLOB_FUNCTION: u8 = 1;
pub const BLOB_CALLBACK: u8 = 2;
pub const BLOB_OBJECT: u8 = 7;

pub const FUNC_FLAG_CONSTRUCTOR: u8 = 0b0001;

pub const SIGNAL_FLAG_RUN_FIRST: u8 = 0b00001;
pub const SIGNAL_FLAG_RUN_LAST: u8 = 0b00010;

pub const REGISTERED_UNREGISTERED: u8 = 0b10;

fn round4(n: usize) -> usize {
	(n + 3) & !3
}

fn put_u16(buf: &mut [u8], at: usize, v: u16) {
	buf[at..at + 2].copy_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut [u8], at: usize, v: u32) {
	buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

/// Appends `s` plus a NUL terminator and returns its start offset,
/// relative to `base` (the absolute offset at which the string region
/// begins in the final buffer).
struct StringTable {
	base: usize,
	bytes: Vec<u8>,
}

impl StringTable {
	fn new(base: usize) -> Self {
		Self { base, bytes: Vec::new() }
	}

	fn intern(&mut self, s: &str) -> u32 {
		let off = (self.base + self.bytes.len()) as u32;
		self.bytes.extend_from_slice(s.as_bytes());
		self.bytes.push(0);
		off
	}
}

/// Writes the 112-byte header at the start of `buf`. `buf` must already
/// be sized to the final buffer length; `size` is the value written into
/// the `size` field, separate from `buf.len()` so callers can construct
/// the stale-size-field mismatch scenario (S2).
fn write_header(buf: &mut [u8], size: u32, namespace_off: u32, c_prefix_off: u32, directory_off: u32, n_entries: u16, n_local_entries: u16) {
	buf[0..16].copy_from_slice(&MAGIC);
	buf[16] = MAJOR_VERSION;
	buf[17] = 0;
	put_u32(buf, 20, namespace_off);
	put_u32(buf, 24, c_prefix_off);
	put_u32(buf, 28, 0); // shared_library
	put_u32(buf, 32, size);
	put_u32(buf, 36, directory_off);
	put_u16(buf, 40, n_entries);
	put_u16(buf, 42, n_local_entries);
	put_u16(buf, 44, DIR_ENTRY_SIZE as u16);
	put_u16(buf, 46, FUNCTION_SIZE as u16);
	put_u16(buf, 48, CALLBACK_SIZE as u16);
	put_u16(buf, 50, SIGNAL_SIZE as u16);
	put_u16(buf, 52, VFUNC_SIZE as u16);
	put_u16(buf, 54, ARG_SIZE as u16);
	put_u16(buf, 56, PROPERTY_SIZE as u16);
	put_u16(buf, 58, FIELD_SIZE as u16);
	put_u16(buf, 60, VALUE_SIZE as u16);
	put_u16(buf, 62, CONSTANT_SIZE as u16);
	put_u16(buf, 64, ATTRIBUTE_SIZE as u16);
	put_u16(buf, 66, SIGNATURE_SIZE as u16);
	put_u16(buf, 68, ENUM_SIZE as u16);
	put_u16(buf, 70, STRUCT_SIZE as u16);
	put_u16(buf, 72, OBJECT_SIZE as u16);
	put_u16(buf, 74, INTERFACE_SIZE as u16);
	put_u16(buf, 76, UNION_SIZE as u16);
	put_u32(buf, 78, 0); // attributes
	put_u32(buf, 82, 0); // n_attributes
	put_u32(buf, 86, 0); // sections
	put_u32(buf, 90, 0); // nsversion
	put_u32(buf, 94, 0); // dependencies
}

fn write_dir_entry(buf: &mut [u8], at: usize, blob_type: u8, local: bool, name_off: u32, payload_off: u32) {
	buf[at] = blob_type;
	buf[at + 1] = local as u8;
	put_u32(buf, at + 4, name_off);
	put_u32(buf, at + 8, payload_off);
}

/// Writes a void-returning, no-argument signature blob (8 bytes) at `at`.
fn write_void_signature(buf: &mut [u8], at: usize) {
	put_u32(buf, at, 0); // return type: simple, tag=void, no pointer
	put_u16(buf, at + 4, 0); // n_arguments
}

/// Writes a signature blob (8 bytes) returning a basic `int32` (tag 6,
/// no pointer flag — the shape of an ordinary non-string scalar return).
fn write_int32_signature(buf: &mut [u8], at: usize) {
	let word: u32 = 6 << 2;
	put_u32(buf, at, word);
	put_u16(buf, at + 4, 0);
}

/// S1: minimal valid typelib — namespace `"T"`, one local function `"f"`
/// taking no arguments and returning `void`.
pub fn minimal_function_typelib(namespace: &str) -> Vec<u8> {
	let directory_off = HEADER_SIZE;
	let function_off = directory_off + DIR_ENTRY_SIZE;
	let signature_off = function_off + FUNCTION_SIZE;
	let strings_base = signature_off + SIGNATURE_SIZE;

	let mut strings = StringTable::new(strings_base);
	let namespace_off = strings.intern(namespace);
	let name_off = strings.intern("f");
	let symbol_off = strings.intern("f");

	let mut buf = vec![0u8; strings_base];
	write_header(&mut buf, strings_base as u32, namespace_off, 0, directory_off as u32, 1, 1);
	write_dir_entry(&mut buf, directory_off, BLOB_FUNCTION, true, name_off, function_off as u32);

	buf[function_off] = BLOB_FUNCTION;
	put_u32(&mut buf, function_off + 4, name_off);
	put_u32(&mut buf, function_off + 8, symbol_off);
	buf[function_off + 12] = 0;
	buf[function_off + 13] = 0;
	put_u32(&mut buf, function_off + 16, signature_off as u32);

	write_void_signature(&mut buf, signature_off);

	buf.extend_from_slice(&strings.bytes);
	let total = buf.len() as u32;
	put_u32(&mut buf, 32, total);
	buf
}

/// S4: object `"O"` with one field carrying an embedded callback
/// (`has_embedded_type`), and a caller-supplied `n_field_callbacks` so
/// both the matching (1) and mismatched (0) cases can be built.
pub fn object_with_embedded_field_callback(n_field_callbacks: u16) -> Vec<u8> {
	let directory_off = HEADER_SIZE;
	let object_off = directory_off + DIR_ENTRY_SIZE;
	let field_off = object_off + OBJECT_SIZE;
	let callback_off = field_off + FIELD_SIZE;
	let signature_off = callback_off + CALLBACK_SIZE;
	let strings_base = signature_off + SIGNATURE_SIZE;

	let mut strings = StringTable::new(strings_base);
	let namespace_off = strings.intern("T");
	let object_name_off = strings.intern("O");
	let field_name_off = strings.intern("field0");
	let callback_name_off = strings.intern("callback0");

	let mut buf = vec![0u8; strings_base];
	write_header(&mut buf, strings_base as u32, namespace_off, 0, directory_off as u32, 1, 1);
	write_dir_entry(&mut buf, directory_off, BLOB_OBJECT, true, object_name_off, object_off as u32);

	buf[object_off] = REGISTERED_UNREGISTERED;
	put_u32(&mut buf, object_off + 4, object_name_off);
	// gtype_name/gtype_init left zero: unregistered.
	put_u16(&mut buf, object_off + 20, 0); // n_interfaces
	put_u16(&mut buf, object_off + 22, 1); // n_fields
	put_u16(&mut buf, object_off + 24, 0); // n_properties
	put_u16(&mut buf, object_off + 26, 0); // n_methods
	put_u16(&mut buf, object_off + 28, 0); // n_signals
	put_u16(&mut buf, object_off + 30, 0); // n_vfuncs
	put_u16(&mut buf, object_off + 32, 0); // n_constants
	put_u16(&mut buf, object_off + 34, n_field_callbacks);

	put_u32(&mut buf, field_off, field_name_off);
	buf[field_off + 4] = 0b100; // has_embedded_type

	buf[callback_off] = BLOB_CALLBACK;
	put_u32(&mut buf, callback_off + 4, callback_name_off);
	put_u32(&mut buf, callback_off + 8, signature_off as u32);

	write_void_signature(&mut buf, signature_off);

	buf.extend_from_slice(&strings.bytes);
	let total = buf.len() as u32;
	put_u32(&mut buf, 32, total);
	buf
}

/// S5: object `"O"` with one signal declaring both `run_first` and
/// `run_last`.
pub fn object_with_bad_signal_flags() -> Vec<u8> {
	let directory_off = HEADER_SIZE;
	let object_off = directory_off + DIR_ENTRY_SIZE;
	let signal_off = object_off + OBJECT_SIZE;
	let signature_off = signal_off + SIGNAL_SIZE;
	let strings_base = signature_off + SIGNATURE_SIZE;

	let mut strings = StringTable::new(strings_base);
	let namespace_off = strings.intern("T");
	let object_name_off = strings.intern("O");
	let signal_name_off = strings.intern("notify");

	let mut buf = vec![0u8; strings_base];
	write_header(&mut buf, strings_base as u32, namespace_off, 0, directory_off as u32, 1, 1);
	write_dir_entry(&mut buf, directory_off, BLOB_OBJECT, true, object_name_off, object_off as u32);

	buf[object_off] = REGISTERED_UNREGISTERED;
	put_u32(&mut buf, object_off + 4, object_name_off);
	put_u16(&mut buf, object_off + 20, 0); // n_interfaces
	put_u16(&mut buf, object_off + 22, 0); // n_fields
	put_u16(&mut buf, object_off + 24, 0); // n_properties
	put_u16(&mut buf, object_off + 26, 0); // n_methods
	put_u16(&mut buf, object_off + 28, 1); // n_signals
	put_u16(&mut buf, object_off + 30, 0); // n_vfuncs
	put_u16(&mut buf, object_off + 32, 0); // n_constants
	put_u16(&mut buf, object_off + 34, 0); // n_field_callbacks

	put_u32(&mut buf, signal_off, signal_name_off);
	buf[signal_off + 4] = SIGNAL_FLAG_RUN_FIRST | SIGNAL_FLAG_RUN_LAST;
	put_u32(&mut buf, signal_off + 8, signature_off as u32);

	write_void_signature(&mut buf, signature_off);

	buf.extend_from_slice(&strings.bytes);
	let total = buf.len() as u32;
	put_u32(&mut buf, 32, total);
	buf
}

/// S6: object `"O"` with one constructor method returning a basic
/// `int32` instead of an `interface` reference.
pub fn object_with_bad_constructor_return() -> Vec<u8> {
	let directory_off = HEADER_SIZE;
	let object_off = directory_off + DIR_ENTRY_SIZE;
	let method_off = object_off + OBJECT_SIZE;
	let signature_off = method_off + FUNCTION_SIZE;
	let strings_base = signature_off + SIGNATURE_SIZE;

	let mut strings = StringTable::new(strings_base);
	let namespace_off = strings.intern("T");
	let object_name_off = strings.intern("O");
	let method_name_off = strings.intern("new");
	let symbol_off = strings.intern("t_o_new");

	let mut buf = vec![0u8; strings_base];
	write_header(&mut buf, strings_base as u32, namespace_off, 0, directory_off as u32, 1, 1);
	write_dir_entry(&mut buf, directory_off, BLOB_OBJECT, true, object_name_off, object_off as u32);

	buf[object_off] = REGISTERED_UNREGISTERED;
	put_u32(&mut buf, object_off + 4, object_name_off);
	put_u16(&mut buf, object_off + 20, 0); // n_interfaces
	put_u16(&mut buf, object_off + 22, 0); // n_fields
	put_u16(&mut buf, object_off + 24, 0); // n_properties
	put_u16(&mut buf, object_off + 26, 1); // n_methods
	put_u16(&mut buf, object_off + 28, 0); // n_signals
	put_u16(&mut buf, object_off + 30, 0); // n_vfuncs
	put_u16(&mut buf, object_off + 32, 0); // n_constants
	put_u16(&mut buf, object_off + 34, 0); // n_field_callbacks

	buf[method_off] = BLOB_FUNCTION;
	put_u32(&mut buf, method_off + 4, method_name_off);
	put_u32(&mut buf, method_off + 8, symbol_off);
	buf[method_off + 12] = FUNC_FLAG_CONSTRUCTOR;
	buf[method_off + 13] = 0;
	put_u32(&mut buf, method_off + 16, signature_off as u32);

	write_int32_signature(&mut buf, signature_off);

	buf.extend_from_slice(&strings.bytes);
	let total = buf.len() as u32;
	put_u32(&mut buf, 32, total);
	buf
}

pub fn round4_pub(n: usize) -> usize {
	round4(n)
}

/// Mirrors `gi_typelib`'s internal `sections::fnv1a` exactly, so the
/// `DIRECTORY_INDEX` fixture below probes and is probed identically —
/// the crate documents this hash as "part of the binary contract... a
/// single hash module shared between producer and consumer" (spec §9);
/// this test file plays the producer role.
fn fnv1a(name: &[u8]) -> u32 {
	let mut hash: u32 = 0x811c_9dc5;
	for &b in name {
		hash ^= b as u32;
		hash = hash.wrapping_mul(0x0100_0193);
	}
	hash
}

const SECTION_DIRECTORY_INDEX: u16 = 1;
const SECTION_END: u16 = 0;

/// S8-property-10 fixture: three local functions (`alpha`, `beta`,
/// `gamma`) plus a `DIRECTORY_INDEX` section built with open-addressing
/// placement, so a hashed lookup must agree with a linear scan for every
/// name. Returns the buffer and the `(name, index)` pairs it placed.
pub fn three_functions_with_directory_index() -> (Vec<u8>, Vec<(&'static str, u16)>) {
	let names: [&'static str; 3] = ["alpha", "beta", "gamma"];

	let directory_off = HEADER_SIZE;
	let dir_region = DIR_ENTRY_SIZE * names.len();
	let functions_off = directory_off + dir_region;
	let function_size_total = FUNCTION_SIZE * names.len();
	let signatures_off = functions_off + function_size_total;
	let signature_size_total = SIGNATURE_SIZE * names.len();
	let sections_off = signatures_off + signature_size_total;
	let sections_table_size = 8 * 2; // one DIRECTORY_INDEX entry + END sentinel
	let directory_index_off = sections_off + sections_table_size;

	let n_buckets: u32 = (names.len() * 2) as u32;
	let directory_index_size = 4 + n_buckets as usize * 4;
	let strings_base = directory_index_off + directory_index_size;

	let mut strings = StringTable::new(strings_base);
	let namespace_off = strings.intern("T");
	let name_offs: Vec<u32> = names.iter().map(|n| strings.intern(n)).collect();
	let symbol_offs: Vec<u32> = names.iter().map(|n| strings.intern(n)).collect();

	let mut buf = vec![0u8; strings_base];
	write_header(&mut buf, strings_base as u32, namespace_off, 0, directory_off as u32, names.len() as u16, names.len() as u16);
	put_u32(&mut buf, 86, sections_off as u32);

	let mut placements = Vec::new();
	for (i, &name) in names.iter().enumerate() {
		let index = (i + 1) as u16;
		let entry_off = directory_off + i * DIR_ENTRY_SIZE;
		let function_off = functions_off + i * FUNCTION_SIZE;
		let signature_off = signatures_off + i * SIGNATURE_SIZE;

		write_dir_entry(&mut buf, entry_off, BLOB_FUNCTION, true, name_offs[i], function_off as u32);

		buf[function_off] = BLOB_FUNCTION;
		put_u32(&mut buf, function_off + 4, name_offs[i]);
		put_u32(&mut buf, function_off + 8, symbol_offs[i]);
		buf[function_off + 12] = 0;
		buf[function_off + 13] = 0;
		put_u32(&mut buf, function_off + 16, signature_off as u32);

		write_void_signature(&mut buf, signature_off);
		placements.push((name, index));
	}

	// Sections table: one DIRECTORY_INDEX entry, then the END sentinel.
	put_u16(&mut buf, sections_off, SECTION_DIRECTORY_INDEX);
	put_u32(&mut buf, sections_off + 4, directory_index_off as u32);
	put_u16(&mut buf, sections_off + 8, SECTION_END);
	put_u32(&mut buf, sections_off + 12, 0);

	// DIRECTORY_INDEX section: n_buckets, then open-addressed placement.
	put_u32(&mut buf, directory_index_off, n_buckets);
	let mut buckets = vec![0u32; n_buckets as usize];
	for &(name, index) in &placements {
		let mut bucket = fnv1a(name.as_bytes()) % n_buckets;
		while buckets[bucket as usize] != 0 {
			bucket = (bucket + 1) % n_buckets;
		}
		buckets[bucket as usize] = index as u32;
	}
	for (i, b) in buckets.iter().enumerate() {
		put_u32(&mut buf, directory_index_off + 4 + i * 4, *b);
	}

	buf.extend_from_slice(&strings.bytes);
	let total = buf.len() as u32;
	put_u32(&mut buf, 32, total);

	(buf, placements)
}

/// Adversarial variant of [`three_functions_with_directory_index`]: one
/// occupied bucket is overwritten with an out-of-range directory index
/// (`n_entries` is 3, so 60000 is never valid). A typelib with this buffer
/// still passes `validate()` — the forged section isn't part of the
/// directory walk — but a hashed `dir_entry_by_name` lookup that happens to
/// probe the forged bucket must fail cleanly rather than read out of bounds.
pub fn three_functions_with_forged_directory_index_bucket() -> Vec<u8> {
	let (mut buf, placements) = three_functions_with_directory_index();

	let directory_off = HEADER_SIZE;
	let dir_region = DIR_ENTRY_SIZE * placements.len();
	let functions_off = directory_off + dir_region;
	let function_size_total = FUNCTION_SIZE * placements.len();
	let signatures_off = functions_off + function_size_total;
	let signature_size_total = SIGNATURE_SIZE * placements.len();
	let sections_off = signatures_off + signature_size_total;
	let sections_table_size = 8 * 2;
	let directory_index_off = sections_off + sections_table_size;

	let n_buckets: u32 = (placements.len() * 2) as u32;
	for i in 0..n_buckets as usize {
		let bucket_offset = directory_index_off + 4 + i * 4;
		let current = u32::from_le_bytes(buf[bucket_offset..bucket_offset + 4].try_into().unwrap());
		if current != 0 {
			put_u32(&mut buf, bucket_offset, 60_000);
			break;
		}
	}

	buf
}
