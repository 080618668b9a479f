// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/transport.rs - Chunked FRU data transfers over a command channel.
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

/*!
 * # `transport` Module
 *
 * FRU data is read and written with the IPMI "Read FRU Data" and "Write FRU
 * Data" commands, a few bytes at a time. Management controllers limit how
 * much data fits in one transaction, but do not say what the limit is, so
 * [`FruClient`] starts with a generous read size and shrinks it every time
 * the controller answers with one of the "too much data" completion codes.
 *
 * The command channel itself is not part of this crate: implement
 * [`FruTransport`] for whatever sends IPMI requests (a LAN session, a KCS
 * driver, a test double).
 *
 * ## Usage Example
 *
 * ```no_run
 * use ipmi_fru::transport::{FruClient, FruTransport, TransferConfig};
 *
 * fn dump<T: FruTransport>(transport: T) -> Result<(), ipmi_fru::FruError> {
 *     let config = TransferConfig::default().read_chunk_size(24);
 *     let mut client = FruClient::with_config(transport, config);
 *
 *     let inventory = client.inventory(0)?;
 *     if let Some(board) = &inventory.board_info_area {
 *         println!("Board serial: {}", board.serial_number);
 *     }
 *
 *     Ok(())
 * }
 * ```
 */

use std::fmt;

use log::{debug, info, warn};
use thiserror::Error;

use crate::error::{FruError, take};
use crate::inventory::FruInventory;

/// FRU offsets are 16 bits wide.
const FRU_ADDRESS_SPACE: usize = 0x1_0000;

/// An IPMI completion code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompletionCode(pub u8);

impl CompletionCode {
    pub const SUCCESS: Self = Self(0x00);
    /// Write FRU Data: the FRU device is busy.
    pub const FRU_DEVICE_BUSY: Self = Self(0x81);
    pub const INVALID_COMMAND: Self = Self(0xc1);
    pub const REQUEST_DATA_LENGTH_INVALID: Self = Self(0xc7);
    pub const REQUEST_DATA_FIELD_LENGTH_EXCEEDED: Self = Self(0xc8);
    pub const PARAMETER_OUT_OF_RANGE: Self = Self(0xc9);
    pub const CANNOT_RETURN_REQUESTED_BYTES: Self = Self(0xca);
    pub const NOT_PRESENT: Self = Self(0xcb);
    pub const UNSPECIFIED: Self = Self(0xff);

    /// Returns `true` for the codes a controller uses to reject a read that
    /// asked for more bytes than it can return in one response.
    pub fn is_read_size_limit(self) -> bool {
        matches!(
            self,
            Self::CANNOT_RETURN_REQUESTED_BYTES
                | Self::REQUEST_DATA_FIELD_LENGTH_EXCEEDED
                | Self::PARAMETER_OUT_OF_RANGE
        )
    }
}

impl fmt::Display for CompletionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// A failed request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The controller answered with a non-success completion code.
    #[error("completion code {0}")]
    Completion(CompletionCode),

    /// The request never got a response.
    #[error("{0}")]
    Link(String),
}

impl TransportError {
    pub fn completion_code(&self) -> Option<CompletionCode> {
        match self {
            TransportError::Completion(code) => Some(*code),
            TransportError::Link(_) => None,
        }
    }
}

/// How the FRU device is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Bytes,
    Words,
}

/// Response to "Get FRU Inventory Area Info".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaInfo {
    /// Size of the FRU inventory area in bytes.
    pub size: u16,
    pub access: AccessMode,
}

impl AreaInfo {
    /// Decodes the response data (completion code already stripped).
    pub fn from_response(data: &[u8]) -> Result<Self, FruError> {
        let data = take(data, 0, 3, "FRU inventory area info")?;
        let access = if data[2] & 0x01 != 0 {
            AccessMode::Words
        } else {
            AccessMode::Bytes
        };

        Ok(Self {
            size: u16::from_le_bytes([data[0], data[1]]),
            access,
        })
    }
}

/// The command channel used to reach a FRU device.
///
/// Implementations send one request and wait for its response. A response
/// with a non-success completion code must be returned as
/// [`TransportError::Completion`] so that the read loop can react to it.
pub trait FruTransport {
    /// "Get FRU Inventory Area Info".
    fn area_info(&mut self, fru_id: u8) -> Result<AreaInfo, TransportError>;

    /// "Read FRU Data". Returns the data bytes of the response; a device may
    /// return fewer bytes than requested.
    fn read_data(
        &mut self,
        fru_id: u8,
        offset: u16,
        count: u8,
    ) -> Result<Vec<u8>, TransportError>;

    /// "Write FRU Data". Returns the number of bytes the device reports as
    /// written.
    fn write_data(&mut self, fru_id: u8, offset: u16, data: &[u8]) -> Result<u8, TransportError>;
}

impl<T: FruTransport + ?Sized> FruTransport for &mut T {
    fn area_info(&mut self, fru_id: u8) -> Result<AreaInfo, TransportError> {
        (**self).area_info(fru_id)
    }

    fn read_data(
        &mut self,
        fru_id: u8,
        offset: u16,
        count: u8,
    ) -> Result<Vec<u8>, TransportError> {
        (**self).read_data(fru_id, offset, count)
    }

    fn write_data(&mut self, fru_id: u8, offset: u16, data: &[u8]) -> Result<u8, TransportError> {
        (**self).write_data(fru_id, offset, data)
    }
}

/// Transfer sizes used by [`FruClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferConfig {
    /// Bytes asked for in the first read request.
    pub read_chunk_size: u8,
    /// Maximum bytes sent per write request.
    pub write_chunk_size: u8,
    /// How much to shrink the read size after a read is rejected.
    pub read_shrink_step: u8,
    /// Smallest read size to try before giving up.
    pub min_read_chunk_size: u8,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: 32,
            write_chunk_size: 16,
            read_shrink_step: 2,
            min_read_chunk_size: 1,
        }
    }
}

impl TransferConfig {
    pub fn read_chunk_size(mut self, size: u8) -> Self {
        self.read_chunk_size = size;
        self
    }

    pub fn write_chunk_size(mut self, size: u8) -> Self {
        self.write_chunk_size = size;
        self
    }

    pub fn read_shrink_step(mut self, step: u8) -> Self {
        self.read_shrink_step = step;
        self
    }

    pub fn min_read_chunk_size(mut self, size: u8) -> Self {
        self.min_read_chunk_size = size;
        self
    }
}

/// Reads and writes FRU data through a [`FruTransport`].
///
/// The client owns the transport, so requests are never interleaved.
#[derive(Debug)]
pub struct FruClient<T> {
    transport: T,
    config: TransferConfig,
}

impl<T: FruTransport> FruClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, TransferConfig::default())
    }

    pub fn with_config(transport: T, config: TransferConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Queries the size of the FRU inventory area.
    pub fn area_info(&mut self, fru_id: u8) -> Result<AreaInfo, FruError> {
        Ok(self.transport.area_info(fru_id)?)
    }

    /// Reads the whole FRU inventory area.
    pub fn read_all(&mut self, fru_id: u8) -> Result<Vec<u8>, FruError> {
        let area_info = self.area_info(fru_id)?;
        debug!(
            "FRU {} inventory area: {} bytes, {:?} access",
            fru_id, area_info.size, area_info.access
        );
        self.read_span(fru_id, 0, usize::from(area_info.size))
    }

    /// Reads exactly `count` bytes starting at `offset`.
    pub fn read(&mut self, fru_id: u8, offset: usize, count: usize) -> Result<Vec<u8>, FruError> {
        let end = offset
            .checked_add(count)
            .ok_or(FruError::OffsetRange { offset })?;
        self.read_span(fru_id, offset, end)
    }

    /// Reads and decodes the whole FRU inventory.
    pub fn inventory(&mut self, fru_id: u8) -> Result<FruInventory, FruError> {
        let data = self.read_all(fru_id)?;
        info!("Read {} bytes of FRU {} inventory", data.len(), fru_id);
        FruInventory::from_bytes(data)
    }

    /// Writes `data` starting at `offset`, [`TransferConfig::write_chunk_size`]
    /// bytes at a time.
    ///
    /// Stops at the first failed request and returns its error. Chunks
    /// written before the failure stay written, so the contents of the area
    /// from the failed chunk onwards are unknown.
    pub fn write(&mut self, fru_id: u8, offset: usize, data: &[u8]) -> Result<(), FruError> {
        let end = offset
            .checked_add(data.len())
            .ok_or(FruError::OffsetRange { offset })?;
        if end > FRU_ADDRESS_SPACE {
            return Err(FruError::OffsetRange { offset: end });
        }

        let mut cursor = offset;
        for chunk in data.chunks(usize::from(self.config.write_chunk_size.max(1))) {
            debug!(
                "Write FRU {} offset {:#06x} count {}",
                fru_id,
                cursor,
                chunk.len()
            );
            let written = self
                .transport
                .write_data(fru_id, fru_offset(cursor)?, chunk)?;
            if usize::from(written) != chunk.len() {
                warn!(
                    "FRU {} reported {} of {} bytes written at offset {:#06x}",
                    fru_id,
                    written,
                    chunk.len(),
                    cursor
                );
            }
            cursor += chunk.len();
        }

        Ok(())
    }

    fn read_span(&mut self, fru_id: u8, start: usize, end: usize) -> Result<Vec<u8>, FruError> {
        if end > FRU_ADDRESS_SPACE {
            return Err(FruError::OffsetRange { offset: end });
        }

        let shrink_step = self.config.read_shrink_step.max(1);
        let min_size = self.config.min_read_chunk_size.max(1);

        let mut data = Vec::with_capacity(end.saturating_sub(start));
        let mut cursor = start;
        let mut req_size = self.config.read_chunk_size.max(1);

        while cursor < end {
            req_size = req_size.min(u8::try_from(end - cursor).unwrap_or(u8::MAX));

            match self
                .transport
                .read_data(fru_id, fru_offset(cursor)?, req_size)
            {
                Ok(mut chunk) => {
                    if chunk.is_empty() {
                        return Err(FruError::EmptyRead { offset: cursor });
                    }
                    chunk.truncate(usize::from(req_size));
                    debug!(
                        "Read FRU {} offset {:#06x}: {} of {} bytes",
                        fru_id,
                        cursor,
                        chunk.len(),
                        req_size
                    );
                    cursor += chunk.len();
                    data.extend_from_slice(&chunk);
                }
                Err(TransportError::Completion(code)) if code.is_read_size_limit() => {
                    if req_size <= min_size {
                        return Err(FruError::ChunkSizeExhausted {
                            offset: cursor,
                            code,
                        });
                    }
                    let shrunk = req_size.saturating_sub(shrink_step).max(min_size);
                    warn!(
                        "FRU {} rejected {} byte read at offset {:#06x} ({}), retrying with {}",
                        fru_id, req_size, cursor, code, shrunk
                    );
                    req_size = shrunk;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(data)
    }
}

fn fru_offset(offset: usize) -> Result<u16, FruError> {
    u16::try_from(offset).map_err(|_| FruError::OffsetRange { offset })
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    /// An in-memory FRU device with a configurable transaction size limit.
    pub(crate) struct MockFru {
        pub image: Vec<u8>,
        /// Reads larger than this fail with `limit_code`.
        pub max_read: u8,
        pub limit_code: CompletionCode,
        /// Never return more than this many bytes per read.
        pub short_read: Option<usize>,
        /// Fail the read at this offset with this code.
        pub fail_read_at: Option<(u16, CompletionCode)>,
        /// Fail the n-th write request (0-based).
        pub fail_write: Option<(usize, CompletionCode)>,
        /// Report this many bytes written instead of the real count.
        pub report_written: Option<u8>,
        pub reads: Vec<(u16, u8)>,
        pub writes: Vec<(u16, Vec<u8>)>,
    }

    impl MockFru {
        pub(crate) fn new(image: Vec<u8>) -> Self {
            Self {
                image,
                max_read: u8::MAX,
                limit_code: CompletionCode::REQUEST_DATA_FIELD_LENGTH_EXCEEDED,
                short_read: None,
                fail_read_at: None,
                fail_write: None,
                report_written: None,
                reads: Vec::new(),
                writes: Vec::new(),
            }
        }
    }

    impl FruTransport for MockFru {
        fn area_info(&mut self, _fru_id: u8) -> Result<AreaInfo, TransportError> {
            Ok(AreaInfo {
                size: self.image.len() as u16,
                access: AccessMode::Bytes,
            })
        }

        fn read_data(
            &mut self,
            _fru_id: u8,
            offset: u16,
            count: u8,
        ) -> Result<Vec<u8>, TransportError> {
            self.reads.push((offset, count));

            if let Some((fail_offset, code)) = self.fail_read_at {
                if fail_offset == offset {
                    return Err(TransportError::Completion(code));
                }
            }
            if count > self.max_read {
                return Err(TransportError::Completion(self.limit_code));
            }

            let start = usize::from(offset);
            let mut len = usize::from(count);
            if let Some(short) = self.short_read {
                len = len.min(short);
            }
            let end = (start + len).min(self.image.len());
            Ok(self.image[start..end].to_vec())
        }

        fn write_data(
            &mut self,
            _fru_id: u8,
            offset: u16,
            data: &[u8],
        ) -> Result<u8, TransportError> {
            let index = self.writes.len();
            self.writes.push((offset, data.to_vec()));

            if let Some((fail_index, code)) = self.fail_write {
                if fail_index == index {
                    return Err(TransportError::Completion(code));
                }
            }

            let start = usize::from(offset);
            if self.image.len() < start + data.len() {
                self.image.resize(start + data.len(), 0);
            }
            self.image[start..start + data.len()].copy_from_slice(data);
            Ok(self.report_written.unwrap_or(data.len() as u8))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockFru;
    use super::*;

    fn reference_image(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    #[test]
    fn test_read_size_limit_codes() {
        assert!(CompletionCode(0xca).is_read_size_limit());
        assert!(CompletionCode(0xc8).is_read_size_limit());
        assert!(CompletionCode(0xc9).is_read_size_limit());
        assert!(!CompletionCode::SUCCESS.is_read_size_limit());
        assert!(!CompletionCode::INVALID_COMMAND.is_read_size_limit());
        assert!(!CompletionCode::REQUEST_DATA_LENGTH_INVALID.is_read_size_limit());
        assert!(!CompletionCode::FRU_DEVICE_BUSY.is_read_size_limit());
    }

    #[test]
    fn test_area_info_response() {
        let info = AreaInfo::from_response(&[0x00, 0x01, 0x00]).unwrap();
        assert_eq!(info.size, 256);
        assert_eq!(info.access, AccessMode::Bytes);

        let info = AreaInfo::from_response(&[0x80, 0x00, 0x01]).unwrap();
        assert_eq!(info.size, 128);
        assert_eq!(info.access, AccessMode::Words);

        assert!(matches!(
            AreaInfo::from_response(&[0x80, 0x00]),
            Err(FruError::Truncated { .. })
        ));
    }

    #[test]
    fn test_read_all_in_default_chunks() {
        let image = reference_image(100);
        let mut client = FruClient::new(MockFru::new(image.clone()));

        assert_eq!(client.read_all(0).unwrap(), image);
        assert_eq!(
            client.transport().reads,
            vec![(0, 32), (32, 32), (64, 32), (96, 4)]
        );
    }

    #[test]
    fn test_read_shrinks_after_size_limit() {
        let image = reference_image(100);
        let mut fru = MockFru::new(image.clone());
        fru.max_read = 28;

        let mut client = FruClient::new(&mut fru);
        assert_eq!(client.read_all(0).unwrap(), image);

        // Two rejected attempts, then the shrunk size sticks.
        assert_eq!(
            fru.reads,
            vec![(0, 32), (0, 30), (0, 28), (28, 28), (56, 28), (84, 16)]
        );
    }

    #[test]
    fn test_read_shrinks_on_every_transient_code() {
        for code in [
            CompletionCode::CANNOT_RETURN_REQUESTED_BYTES,
            CompletionCode::REQUEST_DATA_FIELD_LENGTH_EXCEEDED,
            CompletionCode::PARAMETER_OUT_OF_RANGE,
        ] {
            let image = reference_image(64);
            let mut fru = MockFru::new(image.clone());
            fru.max_read = 20;
            fru.limit_code = code;

            let mut client = FruClient::new(&mut fru);
            assert_eq!(client.read_all(0).unwrap(), image);
        }
    }

    #[test]
    fn test_read_tolerates_short_reads() {
        let image = reference_image(50);
        let mut fru = MockFru::new(image.clone());
        fru.short_read = Some(7);

        let mut client = FruClient::new(&mut fru);
        assert_eq!(client.read_all(0).unwrap(), image);

        // The cursor advances by what came back, not by what was asked for.
        assert_eq!(fru.reads[0], (0, 32));
        assert_eq!(fru.reads[1], (7, 32));
        assert_eq!(fru.reads.last(), Some(&(49, 1)));
    }

    #[test]
    fn test_read_range() {
        let image = reference_image(200);
        let mut fru = MockFru::new(image.clone());

        let mut client = FruClient::new(&mut fru);
        assert_eq!(client.read(0, 40, 50).unwrap(), &image[40..90]);
        assert_eq!(fru.reads, vec![(40, 32), (72, 18)]);
    }

    #[test]
    fn test_read_gives_up_when_size_exhausted() {
        let mut fru = MockFru::new(reference_image(64));
        fru.max_read = 0;
        fru.limit_code = CompletionCode::CANNOT_RETURN_REQUESTED_BYTES;

        let mut client = FruClient::new(&mut fru);
        match client.read_all(0) {
            Err(FruError::ChunkSizeExhausted { offset, code }) => {
                assert_eq!(offset, 0);
                assert_eq!(code, CompletionCode::CANNOT_RETURN_REQUESTED_BYTES);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        // 32, 30, ..., 2, then the 1-byte floor
        assert_eq!(fru.reads.len(), 17);
        assert_eq!(fru.reads.last(), Some(&(0, 1)));
    }

    #[test]
    fn test_read_falls_back_to_min_chunk_size() {
        let image = reference_image(10);
        let mut fru = MockFru::new(image.clone());
        fru.max_read = 1;

        let mut client = FruClient::new(&mut fru);
        assert_eq!(client.read_all(0).unwrap(), image);

        // The shrink step overshoots the floor, so the floor itself is tried.
        assert_eq!(
            fru.reads[..6].to_vec(),
            vec![(0, 10), (0, 8), (0, 6), (0, 4), (0, 2), (0, 1)]
        );
        assert_eq!(fru.reads.len(), 15);
        assert_eq!(fru.reads.last(), Some(&(9, 1)));
    }

    #[test]
    fn test_read_step_clamps_to_min_chunk_size() {
        let image = reference_image(12);
        let mut fru = MockFru::new(image.clone());
        fru.max_read = 3;

        let config = TransferConfig::default()
            .read_shrink_step(4)
            .min_read_chunk_size(3);
        let mut client = FruClient::with_config(&mut fru, config);
        assert_eq!(client.read_all(0).unwrap(), image);
        assert_eq!(
            fru.reads,
            vec![(0, 12), (0, 8), (0, 4), (0, 3), (3, 3), (6, 3), (9, 3)]
        );
    }

    #[test]
    fn test_read_respects_min_chunk_size() {
        let mut fru = MockFru::new(reference_image(64));
        fru.max_read = 8;

        let config = TransferConfig::default().min_read_chunk_size(16);
        let mut client = FruClient::with_config(&mut fru, config);
        assert!(matches!(
            client.read_all(0),
            Err(FruError::ChunkSizeExhausted { offset: 0, .. })
        ));
        assert_eq!(fru.reads.last(), Some(&(0, 16)));
    }

    #[test]
    fn test_read_propagates_fatal_errors() {
        let mut fru = MockFru::new(reference_image(64));
        fru.fail_read_at = Some((32, CompletionCode::NOT_PRESENT));

        let mut client = FruClient::new(&mut fru);
        match client.read_all(0) {
            Err(FruError::Transport(e)) => {
                assert_eq!(e.completion_code(), Some(CompletionCode::NOT_PRESENT));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        // No retry at a smaller size.
        assert_eq!(fru.reads, vec![(0, 32), (32, 32)]);
    }

    #[test]
    fn test_read_empty_response() {
        // The device claims 64 bytes but only has 10.
        struct Liar(MockFru);
        impl FruTransport for Liar {
            fn area_info(&mut self, _fru_id: u8) -> Result<AreaInfo, TransportError> {
                Ok(AreaInfo {
                    size: 64,
                    access: AccessMode::Bytes,
                })
            }
            fn read_data(
                &mut self,
                fru_id: u8,
                offset: u16,
                count: u8,
            ) -> Result<Vec<u8>, TransportError> {
                self.0.read_data(fru_id, offset, count)
            }
            fn write_data(
                &mut self,
                fru_id: u8,
                offset: u16,
                data: &[u8],
            ) -> Result<u8, TransportError> {
                self.0.write_data(fru_id, offset, data)
            }
        }

        let mut client = FruClient::new(Liar(MockFru::new(reference_image(10))));
        assert!(matches!(
            client.read_all(0),
            Err(FruError::EmptyRead { offset: 10 })
        ));
    }

    #[test]
    fn test_read_out_of_range() {
        let mut client = FruClient::new(MockFru::new(Vec::new()));
        assert!(matches!(
            client.read(0, 0xfff0, 0x20),
            Err(FruError::OffsetRange { offset: 0x10010 })
        ));
        assert!(client.transport().reads.is_empty());
    }

    #[test]
    fn test_read_count_overflow() {
        let mut client = FruClient::new(MockFru::new(reference_image(16)));
        assert!(matches!(
            client.read(0, 8, usize::MAX),
            Err(FruError::OffsetRange { offset: 8 })
        ));
        assert!(client.transport().reads.is_empty());
    }

    #[test]
    fn test_write_chunks() {
        let data = reference_image(40);
        let mut fru = MockFru::new(vec![0; 0x40]);

        let mut client = FruClient::new(&mut fru);
        client.write(0, 0x10, &data).unwrap();

        let writes: Vec<(u16, usize)> = fru.writes.iter().map(|(o, d)| (*o, d.len())).collect();
        assert_eq!(writes, vec![(0x10, 16), (0x20, 16), (0x30, 8)]);
        assert_eq!(&fru.image[0x10..0x38], data.as_slice());
    }

    #[test]
    fn test_write_chunk_size() {
        let data = reference_image(10);
        let mut fru = MockFru::new(Vec::new());

        let config = TransferConfig::default().write_chunk_size(4);
        let mut client = FruClient::with_config(&mut fru, config);
        client.write(0, 0, &data).unwrap();

        let offsets: Vec<u16> = fru.writes.iter().map(|(o, _)| *o).collect();
        assert_eq!(offsets, vec![0, 4, 8]);
        assert_eq!(fru.image, data);
    }

    #[test]
    fn test_write_stops_at_first_failure() {
        let data = reference_image(48);
        let mut fru = MockFru::new(vec![0; 48]);
        fru.fail_write = Some((1, CompletionCode::FRU_DEVICE_BUSY));

        let mut client = FruClient::new(&mut fru);
        match client.write(0, 0, &data) {
            Err(FruError::Transport(TransportError::Completion(code))) => {
                assert_eq!(code, CompletionCode::FRU_DEVICE_BUSY);
            }
            other => panic!("unexpected result: {:?}", other),
        }

        // The first chunk stays written; the third is never sent.
        assert_eq!(fru.writes.len(), 2);
        assert_eq!(&fru.image[..16], &data[..16]);
        assert_eq!(&fru.image[16..], &[0; 32]);
    }

    #[test]
    fn test_write_short_count_still_advances() {
        let data = reference_image(32);
        let mut fru = MockFru::new(vec![0; 32]);
        fru.report_written = Some(3);

        let mut client = FruClient::new(&mut fru);
        client.write(0, 0, &data).unwrap();
        let offsets: Vec<u16> = fru.writes.iter().map(|(o, _)| *o).collect();
        assert_eq!(offsets, vec![0, 16]);
    }

    #[test]
    fn test_write_out_of_range() {
        let mut client = FruClient::new(MockFru::new(Vec::new()));
        assert!(matches!(
            client.write(0, 0xfff8, &[0; 9]),
            Err(FruError::OffsetRange { .. })
        ));
        assert!(client.transport().writes.is_empty());

        assert!(matches!(
            client.write(0, usize::MAX, &[0; 1]),
            Err(FruError::OffsetRange { offset: usize::MAX })
        ));
        assert!(client.transport().writes.is_empty());
    }

    #[test]
    fn test_client_config_and_into_inner() {
        let image = reference_image(40);
        let config = TransferConfig::default()
            .read_chunk_size(24)
            .write_chunk_size(8);
        let mut client = FruClient::with_config(MockFru::new(image.clone()), config);
        assert_eq!(client.config(), &config);
        assert_eq!(client.config().read_shrink_step, 2);

        assert_eq!(client.read_all(0).unwrap(), image);
        let fru = client.into_inner();
        assert_eq!(fru.reads, vec![(0, 24), (24, 16)]);
    }

    #[test]
    fn test_link_errors_propagate() {
        struct Unplugged;
        impl FruTransport for Unplugged {
            fn area_info(&mut self, _fru_id: u8) -> Result<AreaInfo, TransportError> {
                Err(TransportError::Link("no route to BMC".to_string()))
            }
            fn read_data(
                &mut self,
                _fru_id: u8,
                _offset: u16,
                _count: u8,
            ) -> Result<Vec<u8>, TransportError> {
                unreachable!()
            }
            fn write_data(
                &mut self,
                _fru_id: u8,
                _offset: u16,
                _data: &[u8],
            ) -> Result<u8, TransportError> {
                unreachable!()
            }
        }

        let mut client = FruClient::new(Unplugged);
        match client.read_all(0) {
            Err(FruError::Transport(TransportError::Link(msg))) => {
                assert_eq!(msg, "no route to BMC");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
