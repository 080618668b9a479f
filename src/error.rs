// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/error.rs - Error types for the FRU decoder and transfer loops.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::fmt;

use thiserror::Error;

use crate::transport::{CompletionCode, TransportError};

/// Identifies which of the independent checksums in a FRU image failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    /// The 8-byte common header.
    CommonHeader,
    /// A chassis, board, or product info area.
    InfoArea,
    /// The 5-byte header of a multi-record.
    RecordHeader,
    /// The payload of a multi-record.
    RecordData,
}

impl fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChecksumKind::CommonHeader => "common header",
            ChecksumKind::InfoArea => "info area",
            ChecksumKind::RecordHeader => "multi-record header",
            ChecksumKind::RecordData => "multi-record data",
        };
        f.write_str(name)
    }
}

/// Errors returned while decoding or transferring FRU data.
///
/// Every decode error is fatal for the structure being decoded: no partially
/// populated area or inventory is ever returned alongside one.
#[derive(Error, Debug)]
pub enum FruError {
    /// A structure declared a format version this crate does not understand.
    #[error("{what}: unsupported format version ({version})")]
    UnsupportedVersion { what: &'static str, version: u8 },

    /// A zero-sum checksum did not add up to zero.
    #[error("{0} checksum failed")]
    Checksum(ChecksumKind),

    /// The buffer ended before the structure did.
    #[error("{what} truncated: need {needed} bytes, have {available}")]
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    /// A structure with a fixed size was handed the wrong number of bytes.
    #[error("{what} length != {expected} (got {actual})")]
    Length {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The transport failed with a non-recoverable error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The device kept rejecting reads until no request size was left to try.
    #[error("read at offset {offset} rejected at every chunk size (last completion code {code})")]
    ChunkSizeExhausted { offset: usize, code: CompletionCode },

    /// The device reported success but returned no data.
    #[error("empty read response at offset {offset}")]
    EmptyRead { offset: usize },

    /// A transfer would address bytes outside the 16-bit FRU offset space.
    #[error("offset {offset} is outside the FRU address space")]
    OffsetRange { offset: usize },
}

/// Returns the `what`-labelled slice `data[start..start + len]`, or a
/// [`FruError::Truncated`] naming how many bytes were missing.
pub(crate) fn take<'a>(
    data: &'a [u8],
    start: usize,
    len: usize,
    what: &'static str,
) -> Result<&'a [u8], FruError> {
    data.get(start..start + len).ok_or(FruError::Truncated {
        what,
        needed: start + len,
        available: data.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take() {
        let data = [1, 2, 3, 4];
        assert_eq!(take(&data, 1, 2, "test").unwrap(), &[2, 3]);
        assert_eq!(take(&data, 4, 0, "test").unwrap(), &[] as &[u8]);

        match take(&data, 2, 3, "test") {
            Err(FruError::Truncated {
                what,
                needed,
                available,
            }) => {
                assert_eq!(what, "test");
                assert_eq!(needed, 5);
                assert_eq!(available, 4);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        let err = FruError::Checksum(ChecksumKind::RecordHeader);
        assert_eq!(err.to_string(), "multi-record header checksum failed");

        let err = FruError::UnsupportedVersion {
            what: "info area",
            version: 2,
        };
        assert_eq!(err.to_string(), "info area: unsupported format version (2)");
    }
}
