// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Gzipped tar archives of result files.

use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;

use super::store::FileRecord;
use crate::error::Result;

/// Mime type of the generated archives.
pub(crate) const ARCHIVE_MIME_TYPE: &str = "application/gzip";

/// Pack files into an in-memory `.tar.gz` archive, keeping their relative names.
pub(crate) fn tar_files(files: &[FileRecord]) -> Result<Bytes> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for file in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(file.data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(file.created_at.timestamp().max(0) as u64);
        header.set_cksum();
        builder.append_data(&mut header, &file.name, file.data.as_ref())?;
    }
    let encoder = builder.into_inner()?;
    Ok(Bytes::from(encoder.finish()?))
}
