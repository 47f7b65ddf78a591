//! A validator and zero-copy reader for the GObject-Introspection binary
//! typelib format: the `.typelib` files that pair with a shared library to
//! describe its introspectable API (functions, objects, interfaces,
//! structs, enums, signals, vfuncs, properties, constants).
//!
//! [`Typelib::new_from_bytes`] performs cheap header validation and hands
//! back a handle; [`Typelib::validate`] runs the full recursive pass over
//! every directory entry before any indexed access should be trusted.

mod blobs;
mod context;
mod directory;
mod error;
mod header;
mod layout;
mod limits;
mod lookup;
mod name;
mod reader;
mod sections;
mod signature;
mod types;
mod typelib;


pub use context::ContextStack;
pub use directory::{BlobKind, Container, DirEntry};
pub use error::{Result, TypelibError, TypelibErrorKind};
pub use limits::Limits;
pub use lookup::matches_gtype_name_prefix;
pub use types::TypeTag;
pub use typelib::Typelib;

/// Constructs a [`Typelib`] from a memory-mapped file, for callers that
/// want to avoid reading the whole typelib into a `Vec<u8>` up front.
#[cfg(feature = "mmap")]
pub fn open_mmap(path: &std::path::Path) -> std::io::Result<memmap2::Mmap> {
	let file = std::fs::File::open(path)?;
	// SAFETY: the caller owns the returned mapping and must not mutate the
	// backing file while it is alive; `Typelib` never writes through it.
	unsafe { memmap2::Mmap::map(&file) }
}
