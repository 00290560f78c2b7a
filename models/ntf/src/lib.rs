pub mod build;
pub mod codec;
pub mod mesh;
#[cfg(feature = "metadata")]
pub mod metadata;
pub mod skeleton;
pub mod tree;
pub mod vertex;

use std::io;

use thiserror::Error;

/// Little endian value of the four magic bytes (`9F 99 66 F6` on disk)
pub const MAGIC: u32 = 0xF666999F;

/// Extensions the engine stores NTF containers under; the format is identical for all
pub static EXTENSIONS: &[&str] = &[
	"vdf", "mtr", "bon", "vif", "chm", "chv", "xfn", "hor", "d00", "d01", "d02", "d03",
];

#[derive(Debug, Error, PartialEq)]
pub enum NtfError {
	#[error("Not an NTF file: {0:#010X}")]
	NotAnNtfFile(u32),
	#[error("Unexpected end of data")]
	UnexpectedEof,
	#[error("Corrupt node: {0}")]
	CorruptNode(&'static str),
	#[error("Unknown chunk tag: {0}")]
	UnknownChunkTag(u8),
	#[error("Unsupported vertex format: {0}")]
	UnsupportedVertexFormat(i32),
	#[error("Index count {0} is not a multiple of three")]
	IndexCountNotMultipleOfThree(u32),
	#[error("Mesh group holds {0} vertices, the index format allows 65535")]
	TooManyVertices(usize),
	#[error("Missing required chunk: {0}")]
	MissingRequiredChunk(&'static str),
	#[error("Skeleton holds {skeleton} mesh groups, {supplied} were supplied")]
	SkeletonMismatch {
		skeleton: usize,
		supplied: usize,
	},
}

impl From<io::Error> for NtfError {
	// All reads come from in-memory slices; running off the end is the only failure
	fn from(_: io::Error) -> NtfError {
		NtfError::UnexpectedEof
	}
}
