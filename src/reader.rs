use crate::error::{Result, TypelibError};
use crate::layout::is_aligned4;

/// Anything that can be decoded from a fixed-size little-endian byte slice.
/// Implementors manually slice and `from_le_bytes` their fields, the same
/// way the teacher's PE/CLI record types do — never a raw pointer cast.
pub trait FromBlob: Sized {
	const SIZE: usize;
	fn from_bytes(bytes: &[u8]) -> Self;
}

/// A bounds-checked, offset-addressable view over the typelib's bytes.
/// Every read verifies `offset + N <= len` before slicing; nothing here
/// ever panics on attacker-controlled input.
#[derive(Debug, Copy, Clone)]
pub struct TypelibReader<'a> {
	data: &'a [u8],
}

impl<'a> TypelibReader<'a> {
	pub fn new(data: &'a [u8]) -> Self {
		Self { data }
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.data.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	#[inline]
	pub fn bytes(&self) -> &'a [u8] {
		self.data
	}

	#[inline]
	pub fn is_aligned4(&self, offset: usize) -> bool {
		is_aligned4(offset)
	}

	/// Bounds-checked raw slice of `len` bytes starting at `offset`.
	pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
		let end = offset
			.checked_add(len)
			.ok_or_else(|| TypelibError::invalid_data("offset overflow"))?;
		self.data
			.get(offset..end)
			.ok_or_else(|| TypelibError::invalid_data(format!("offset {offset} + {len} exceeds buffer length {}", self.data.len())))
	}

	/// Decodes a `T` at `offset`, bounds-checked against `T::SIZE`.
	pub fn view_at<T: FromBlob>(&self, offset: usize) -> Result<T> {
		let bytes = self.slice(offset, T::SIZE)?;
		Ok(T::from_bytes(bytes))
	}

	/// Scans for a NUL terminator starting at `offset` and decodes the
	/// bytes before it as UTF-8. Does **not** enforce the identifier
	/// charset or length cap — that's the name validator's job (§4.2);
	/// this is the raw byte-buffer primitive other code reuses for
	/// arbitrary (non-identifier) strings such as attribute values.
	pub fn string_at(&self, offset: usize) -> Result<&'a str> {
		if offset >= self.data.len() {
			return Err(TypelibError::invalid_data(format!("string offset {offset} is out of bounds")));
		}
		let rest = &self.data[offset..];
		let end = rest
			.iter()
			.position(|&b| b == 0)
			.ok_or_else(|| TypelibError::invalid_data("string is not NUL-terminated"))?;
		Ok(std::str::from_utf8(&rest[..end])?)
	}
}

macro_rules! impl_from_blob_uint {
	($($ty:ty),*) => {$(
		impl FromBlob for $ty {
			const SIZE: usize = std::mem::size_of::<$ty>();
			#[inline]
			fn from_bytes(bytes: &[u8]) -> Self {
				let mut buf = [0u8; std::mem::size_of::<$ty>()];
				buf.copy_from_slice(&bytes[..std::mem::size_of::<$ty>()]);
				Self::from_le_bytes(buf)
			}
		}
	)*};
}

impl_from_blob_uint!(u8, u16, u32, u64, i32);
