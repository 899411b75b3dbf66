//! Bundle archiving: one gzip-compressed tar with three named entries.
//!
//! Entry names derive from the nickname; compression level and all tar
//! header fields are fixed so the same bundle always packs to the same
//! bytes. The packer signals all-or-nothing: on any entry-write or
//! finalization failure the caller gets an [`ArchiveError`] and no bytes.

use crate::compose::Bundle;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fmt;
use tracing::info;

/// Fixed compression level, part of the deterministic-output contract.
const COMPRESSION_LEVEL: u32 = 6;

#[derive(Debug)]
pub enum ArchiveError {
    /// Writing one named entry failed.
    Entry { name: String, source: std::io::Error },
    /// Finishing the tar stream or the gzip encoder failed.
    Finalize(std::io::Error),
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::Entry { name, source } => {
                write!(f, "failed to write archive entry {name}: {source}")
            }
            ArchiveError::Finalize(e) => write!(f, "failed to finalize archive: {e}"),
        }
    }
}

impl std::error::Error for ArchiveError {}

/// Standard entry names for a nickname's bundle.
pub fn entry_names(nickname: &str) -> [String; 3] {
    [
        format!("{nickname}_avatar.png"),
        format!("{nickname}_cover_primary.png"),
        format!("{nickname}_cover_secondary.png"),
    ]
}

/// Serialize a bundle into a single `.tar.gz` buffer.
pub fn pack_bundle(bundle: &Bundle, nickname: &str) -> Result<Vec<u8>, ArchiveError> {
    let encoder = GzEncoder::new(Vec::new(), Compression::new(COMPRESSION_LEVEL));
    let mut builder = tar::Builder::new(encoder);

    let [avatar_name, primary_name, secondary_name] = entry_names(nickname);
    let entries: [(&str, &[u8]); 3] = [
        (&avatar_name, &bundle.avatar),
        (&primary_name, &bundle.cover_primary),
        (&secondary_name, &bundle.cover_secondary),
    ];

    for (name, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        // Zeroed timestamps keep repeated packs byte-identical.
        header.set_mtime(0);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content)
            .map_err(|source| ArchiveError::Entry {
                name: name.to_string(),
                source,
            })?;
    }

    let encoder = builder.into_inner().map_err(ArchiveError::Finalize)?;
    let bytes = encoder.finish().map_err(ArchiveError::Finalize)?;
    info!(
        nickname,
        archive_bytes = bytes.len(),
        "Packed bundle archive"
    );
    Ok(bytes)
}
