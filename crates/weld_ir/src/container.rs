//! The `.wir` on-disk module container.
//!
//! Front-ends serialize one [`IrModule`] per file. Each file carries a
//! binary header with magic bytes, a format version, and a checksum over the
//! payload. Unlike cache reads, which are fail-safe, a module that fails to
//! load is a hard error: the link cannot proceed without its symbols.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use weld_common::ContentHash;

use crate::module::IrModule;

/// Magic bytes identifying a Weld IR module file.
const MODULE_MAGIC: [u8; 4] = *b"WIR\0";

/// Current module container format version. Increment on breaking changes
/// to the header or payload format.
const MODULE_FORMAT_VERSION: u32 = 1;

/// Header prepended to every `.wir` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModuleHeader {
    /// Magic bytes: must be `b"WIR\0"`.
    magic: [u8; 4],

    /// Container format version.
    format_version: u32,

    /// Content hash of the payload (for corruption detection).
    checksum: ContentHash,
}

/// Errors that can occur while reading or writing a `.wir` module file.
#[derive(Debug, thiserror::Error)]
pub enum ModuleFormatError {
    /// An I/O error occurred while reading or writing the file.
    #[error("module I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file does not start with the `.wir` magic bytes.
    #[error("{path} is not a Weld IR module (bad magic)")]
    BadMagic {
        /// The offending file path.
        path: PathBuf,
    },

    /// The file was produced by an incompatible container format version.
    #[error("unsupported module format version {found} in {path} (expected {expected})")]
    UnsupportedVersion {
        /// The offending file path.
        path: PathBuf,
        /// The version found in the header.
        found: u32,
        /// The version this build understands.
        expected: u32,
    },

    /// The file is truncated or its payload does not match the checksum.
    #[error("corrupt module file {path}: {reason}")]
    Corrupt {
        /// The offending file path.
        path: PathBuf,
        /// Description of the corruption.
        reason: String,
    },

    /// A serialization or deserialization error occurred.
    #[error("module encoding error in {path}: {reason}")]
    Encoding {
        /// The offending file path.
        path: PathBuf,
        /// Description of the encoding failure.
        reason: String,
    },
}

/// Writes a module to `path` in the `.wir` container format.
pub fn write_module(path: &Path, module: &IrModule) -> Result<(), ModuleFormatError> {
    let payload = bincode::serde::encode_to_vec(module, bincode::config::standard()).map_err(
        |e| ModuleFormatError::Encoding {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    )?;

    let header = ModuleHeader {
        magic: MODULE_MAGIC,
        format_version: MODULE_FORMAT_VERSION,
        checksum: ContentHash::from_bytes(&payload),
    };
    let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
        .map_err(|e| ModuleFormatError::Encoding {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    // Layout: 4-byte header length (little-endian) + header + payload
    let header_len = header_bytes.len() as u32;
    let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
    output.extend_from_slice(&header_len.to_le_bytes());
    output.extend_from_slice(&header_bytes);
    output.extend_from_slice(&payload);

    std::fs::write(path, &output).map_err(|e| ModuleFormatError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Reads a module from a `.wir` file, validating magic, version, and checksum.
pub fn read_module(path: &Path) -> Result<IrModule, ModuleFormatError> {
    let raw = std::fs::read(path).map_err(|e| ModuleFormatError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let corrupt = |reason: &str| ModuleFormatError::Corrupt {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if raw.len() < 4 {
        return Err(corrupt("file shorter than header length field"));
    }
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&raw[..4]);
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    if raw.len() < 4 + header_len {
        return Err(corrupt("truncated header"));
    }

    let header: ModuleHeader =
        bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
            .map_err(|_| corrupt("undecodable header"))?
            .0;

    if header.magic != MODULE_MAGIC {
        return Err(ModuleFormatError::BadMagic {
            path: path.to_path_buf(),
        });
    }
    if header.format_version != MODULE_FORMAT_VERSION {
        return Err(ModuleFormatError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: header.format_version,
            expected: MODULE_FORMAT_VERSION,
        });
    }

    let payload = &raw[4 + header_len..];
    if ContentHash::from_bytes(payload) != header.checksum {
        return Err(corrupt("payload checksum mismatch"));
    }

    let module: IrModule =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())
            .map_err(|e| ModuleFormatError::Encoding {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .0;
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::SymbolDescriptor;

    fn sample_module() -> IrModule {
        IrModule::new(
            "mod_a",
            "src/mod_a.c",
            vec![
                SymbolDescriptor::defined("f", b"f-body".to_vec()),
                SymbolDescriptor::undefined("g"),
            ],
        )
    }

    #[test]
    fn write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mod_a.wir");
        let module = sample_module();

        write_module(&path, &module).unwrap();
        let back = read_module(&path).unwrap();
        assert_eq!(module, back);
    }

    #[test]
    fn read_missing_file_errors() {
        let err = read_module(Path::new("/nonexistent/mod.wir")).unwrap_err();
        assert!(matches!(err, ModuleFormatError::Io { .. }));
    }

    #[test]
    fn read_garbage_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.wir");
        std::fs::write(&path, b"not a module at all").unwrap();
        let err = read_module(&path).unwrap_err();
        assert!(matches!(err, ModuleFormatError::Corrupt { .. }));
    }

    #[test]
    fn read_truncated_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.wir");
        std::fs::write(&path, b"AB").unwrap();
        let err = read_module(&path).unwrap_err();
        assert!(matches!(err, ModuleFormatError::Corrupt { .. }));
    }

    #[test]
    fn tampered_payload_fails_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mod_a.wir");
        write_module(&path, &sample_module()).unwrap();

        let mut raw = std::fs::read(&path).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0xff;
        std::fs::write(&path, &raw).unwrap();

        let err = read_module(&path).unwrap_err();
        assert!(matches!(err, ModuleFormatError::Corrupt { .. }));
    }

    #[test]
    fn wrong_magic_reports_bad_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.wir");

        let payload =
            bincode::serde::encode_to_vec(sample_module(), bincode::config::standard()).unwrap();
        let header = ModuleHeader {
            magic: *b"ELF\0",
            format_version: MODULE_FORMAT_VERSION,
            checksum: ContentHash::from_bytes(&payload),
        };
        let header_bytes =
            bincode::serde::encode_to_vec(&header, bincode::config::standard()).unwrap();
        let mut raw = Vec::new();
        raw.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
        raw.extend_from_slice(&header_bytes);
        raw.extend_from_slice(&payload);
        std::fs::write(&path, &raw).unwrap();

        let err = read_module(&path).unwrap_err();
        assert!(matches!(err, ModuleFormatError::BadMagic { .. }));
    }

    #[test]
    fn future_version_reports_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.wir");

        let payload =
            bincode::serde::encode_to_vec(sample_module(), bincode::config::standard()).unwrap();
        let header = ModuleHeader {
            magic: MODULE_MAGIC,
            format_version: 999,
            checksum: ContentHash::from_bytes(&payload),
        };
        let header_bytes =
            bincode::serde::encode_to_vec(&header, bincode::config::standard()).unwrap();
        let mut raw = Vec::new();
        raw.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
        raw.extend_from_slice(&header_bytes);
        raw.extend_from_slice(&payload);
        std::fs::write(&path, &raw).unwrap();

        let err = read_module(&path).unwrap_err();
        match err {
            ModuleFormatError::UnsupportedVersion { found, expected, .. } => {
                assert_eq!(found, 999);
                assert_eq!(expected, MODULE_FORMAT_VERSION);
            }
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
    }
}
