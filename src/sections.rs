//! The optional sections table (§6.1, §4.10 supplement) and the
//! `DIRECTORY_INDEX` perfect-hash-shaped lookup table it can point to.
//!
//! The binary shape of both is this crate's own contract — the
//! specification calls the hash format "part of the binary contract, not
//! reproduced here" and recommends producer and consumer share one module.
//! Absent a producer to cross-check against, the format below is
//! self-contained: the same code builds (for tests) and reads (for lookup)
//! the table, so lookup agreement (§8 property 10) is checkable against
//! this crate's own fixtures.

use crate::directory::dir_entry_checked;
use crate::error::{Result, TypelibError};
use crate::layout::{round_to_4, SECTION_DIRECTORY_INDEX, SECTION_END};
use crate::reader::{FromBlob, TypelibReader};

const SECTION_ENTRY_SIZE: usize = 8;
const BUCKET_SIZE: usize = 4;

struct SectionEntry {
	id: u16,
	offset: u32,
}

impl FromBlob for SectionEntry {
	const SIZE: usize = SECTION_ENTRY_SIZE;

	fn from_bytes(b: &[u8]) -> Self {
		Self { id: u16::from_le_bytes([b[0], b[1]]), offset: u32::from_le_bytes(b[4..8].try_into().unwrap()) }
	}
}

/// Walks the sections table at `sections_offset`, terminated by
/// `SECTION_END`, and returns the offset of the first section matching
/// `id`, if any.
pub fn find_section(reader: &TypelibReader, sections_offset: usize, id: u16) -> Result<Option<u32>> {
	let mut cursor = sections_offset;
	loop {
		let entry: SectionEntry = reader.view_at(cursor)?;
		if entry.id == SECTION_END {
			return Ok(None);
		}
		if entry.id == id {
			return Ok(Some(entry.offset));
		}
		cursor += SECTION_ENTRY_SIZE;
	}
}

/// Locates the `DIRECTORY_INDEX` section, if the typelib declares one.
pub fn find_directory_index(reader: &TypelibReader, sections_offset: usize) -> Result<Option<u32>> {
	find_section(reader, sections_offset, SECTION_DIRECTORY_INDEX)
}

/// FNV-1a over the raw bytes of a name, used both to place and to probe
/// entries in the `DIRECTORY_INDEX` bucket table.
fn fnv1a(name: &[u8]) -> u32 {
	let mut hash: u32 = 0x811c_9dc5;
	for &b in name {
		hash ^= b as u32;
		hash = hash.wrapping_mul(0x0100_0193);
	}
	hash
}

/// A `DIRECTORY_INDEX` section: `n_buckets: u32` followed by `n_buckets`
/// 4-byte directory indices (0 meaning an empty bucket, matching the
/// directory's own 1-based indexing so no entry is ever confused with
/// "empty").
#[derive(Debug, Copy, Clone)]
pub struct DirectoryIndex {
	offset: usize,
	n_buckets: u32,
}

impl DirectoryIndex {
	pub fn read(reader: &TypelibReader, offset: usize) -> Result<Self> {
		let n_buckets: u32 = reader.view_at(offset)?;
		if n_buckets == 0 {
			return Err(TypelibError::invalid_data("DIRECTORY_INDEX section declares zero buckets"));
		}
		Ok(Self { offset, n_buckets })
	}

	/// Looks up `name` via open addressing: probes forward from the home
	/// bucket, matching the placement rule `build_directory_index_bytes`
	/// uses, until it finds a matching name, an empty bucket (miss), or
	/// has probed every bucket (corrupt table, also a miss). Never falls
	/// back to a linear scan: per §4.10 the hash is authoritative for
	/// local entries.
	///
	/// A bucket value is untrusted input — nothing upstream of this call
	/// confirms it satisfies invariant 6 (`1 <= i <= n_entries`), since the
	/// sections table isn't walked by `validate()`. `dir_entry_checked`
	/// enforces that bound here rather than handing a forged index to the
	/// unchecked accessor.
	pub fn lookup(&self, reader: &TypelibReader, directory: usize, n_entries: u16, name: &str) -> Result<Option<u16>> {
		let home = fnv1a(name.as_bytes()) % self.n_buckets;
		for probe in 0..self.n_buckets {
			let bucket = (home + probe) % self.n_buckets;
			let bucket_offset = self.offset + 4 + bucket as usize * BUCKET_SIZE;
			let index: u32 = reader.view_at(bucket_offset)?;
			if index == 0 {
				return Ok(None);
			}
			let index = u16::try_from(index).map_err(|_| TypelibError::invalid_blob("DIRECTORY_INDEX bucket value exceeds a directory index"))?;
			let entry = dir_entry_checked(reader, directory, n_entries, index)?;
			let candidate = reader.string_at(entry.name as usize)?;
			if candidate == name {
				return Ok(Some(index));
			}
		}
		Ok(None)
	}
}

/// Test-only builder mirroring `DirectoryIndex::lookup`'s placement rule,
/// so the perfect-hash table used in fixtures is guaranteed consistent
/// with the reader.
#[cfg(test)]
pub fn build_directory_index_bytes(entries: &[(&str, u16)]) -> Vec<u8> {
	let n_buckets = (entries.len().max(1) * 2) as u32;
	let mut buckets = vec![0u32; n_buckets as usize];
	for &(name, index) in entries {
		let mut bucket = fnv1a(name.as_bytes()) % n_buckets;
		// Open-addressing probe: the table is built sparsely enough in
		// tests that collisions are rare, but we still resolve them
		// deterministically instead of silently overwriting a slot.
		while buckets[bucket as usize] != 0 {
			bucket = (bucket + 1) % n_buckets;
		}
		buckets[bucket as usize] = index as u32;
	}
	let mut bytes = n_buckets.to_le_bytes().to_vec();
	for b in buckets {
		bytes.extend_from_slice(&b.to_le_bytes());
	}
	let pad = round_to_4(bytes.len()) - bytes.len();
	bytes.extend(std::iter::repeat(0).take(pad));
	bytes
}
