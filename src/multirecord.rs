// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/multirecord.rs - Multi-record area decoder.
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
 * # `multirecord` Module
 *
 * The multi-record area is a list of self-describing records, each with a
 * 5-byte header (type, end-of-list flag and version, payload length, payload
 * checksum, header checksum) followed by its payload. The last record in the
 * list has the end-of-list flag set.
 *
 * Records are dispatched on their type ID. PICMG records (type `0xC0`) are
 * further dispatched on their PICMG record ID. Anything without a dedicated
 * decoder is kept as [`RecordBody::Unknown`], with the payload available in
 * [`MultiRecord::raw`].
 *
 * ## Usage Example
 *
 * ```
 * use ipmi_fru::multirecord::{MultiRecordArea, RecordBody};
 *
 * // A single empty record with the end-of-list flag set.
 * let data = [0x01, 0x80, 0x00, 0x00, 0x7f];
 * let area = MultiRecordArea::from_bytes(&data).unwrap();
 *
 * assert_eq!(area.records.len(), 1);
 * assert_eq!(area.len_bytes(), 5);
 * assert_eq!(area.records[0].body, RecordBody::Unknown);
 * ```
 */

use std::fmt;

use log::trace;
use num_enum::FromPrimitive;
use rust_decimal::Decimal;

use crate::checksum;
use crate::error::{ChecksumKind, FruError, take};
use crate::field::hex_string;

/// Size of a multi-record header in bytes.
pub const RECORD_HEADER_LEN: usize = 5;

/// IANA enterprise number of PICMG, as found in PICMG record payloads.
pub const PICMG_MANUFACTURER_ID: u32 = 0x00315a;

const PICMG_HEADER_LEN: usize = 5;

/// Multi-record type IDs defined by IPMI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum RecordType {
    PowerSupplyInformation = 0x00,
    DcOutput = 0x01,
    DcLoad = 0x02,
    ManagementAccess = 0x03,
    BaseCompatibility = 0x04,
    ExtendedCompatibility = 0x05,
    OemPicmg = 0xc0,
    /// Any other type, including the rest of the OEM range (0xC0-0xFF).
    #[num_enum(catch_all)]
    Other(u8),
}

/// PICMG record IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum PicmgRecordId {
    BackplanePtpConnectivity = 0x04,
    AddressTable = 0x10,
    ShelfPowerDistribution = 0x11,
    ShmcActivationManagement = 0x12,
    ShmcIpConnection = 0x13,
    BoardPtpConnectivity = 0x14,
    RadialIpmb0LinkMapping = 0x15,
    ModuleCurrentRequirements = 0x16,
    CarrierActivationManagement = 0x17,
    CarrierPtpConnectivity = 0x18,
    AmcPtpConnectivity = 0x19,
    CarrierInformation = 0x1a,
    MtcaFruInformationPartition = 0x20,
    MtcaCarrierManagerIpLink = 0x21,
    MtcaCarrierInformation = 0x22,
    MtcaShelfInformation = 0x23,
    MtcaShelfManagerIpLink = 0x24,
    MtcaCarrierPowerPolicy = 0x25,
    MtcaCarrierActivationAndPower = 0x26,
    MtcaPowerModuleCapability = 0x27,
    MtcaFanGeography = 0x28,
    OemModuleDescription = 0x29,
    CarrierClockPtpConnectivity = 0x2c,
    ClockConfiguration = 0x2d,
    Zone3InterfaceCompatibility = 0x30,
    CarrierBusedConnectivity = 0x31,
    Zone3InterfaceDocumentation = 0x32,
    #[num_enum(catch_all)]
    Other(u8),
}

/// The 5-byte header in front of every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiRecordHeader {
    pub record_type_id: u8,
    pub format_version: u8,
    /// Set on the last record of the area.
    pub end_of_list: bool,
    /// Payload length in bytes, not counting the header.
    pub length: u8,
    pub record_checksum: u8,
    pub header_checksum: u8,
}

impl MultiRecordHeader {
    pub fn from_bytes(data: &[u8]) -> Result<Self, FruError> {
        let header = take(data, 0, RECORD_HEADER_LEN, "multi-record header")?;
        if !checksum::is_valid(header) {
            return Err(FruError::Checksum(ChecksumKind::RecordHeader));
        }

        Ok(Self {
            record_type_id: header[0],
            format_version: header[1] & 0x0f,
            end_of_list: header[1] & 0x80 != 0,
            length: header[2],
            record_checksum: header[3],
            header_checksum: header[4],
        })
    }

    pub fn record_type(&self) -> RecordType {
        RecordType::from(self.record_type_id)
    }
}

/// Maximum output current of an MTCA power module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerModuleCapability {
    /// Maximum current output in units of 0.1 A.
    pub maximum_current_output_raw: u16,
}

impl PowerModuleCapability {
    fn from_payload(payload: &[u8]) -> Result<Self, FruError> {
        let current = take(
            payload,
            PICMG_HEADER_LEN,
            2,
            "power module capability record",
        )?;
        Ok(Self {
            maximum_current_output_raw: u16::from_le_bytes([current[0], current[1]]),
        })
    }

    /// Maximum current output in amps, exactly.
    pub fn maximum_current_output(&self) -> Decimal {
        Decimal::new(i64::from(self.maximum_current_output_raw), 1)
    }

    /// Maximum current output in amps.
    pub fn maximum_current_amps(&self) -> f64 {
        f64::from(self.maximum_current_output_raw) / 10.0
    }
}

/// Decoded contents of a PICMG record, by PICMG record ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PicmgBody {
    PowerModuleCapability(PowerModuleCapability),
    /// A PICMG record without a dedicated decoder.
    Unknown,
}

/// A PICMG (vendor-family) record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PicmgRecord {
    /// 24-bit IANA enterprise number; [`PICMG_MANUFACTURER_ID`] for PICMG.
    pub manufacturer_id: u32,
    pub record_id: u8,
    pub format_version: u8,
    pub body: PicmgBody,
}

impl PicmgRecord {
    fn from_payload(payload: &[u8]) -> Result<Self, FruError> {
        let header = take(payload, 0, PICMG_HEADER_LEN, "PICMG record header")?;
        let manufacturer_id = u32::from_le_bytes([header[0], header[1], header[2], 0]);
        let record_id = header[3];
        let format_version = header[4];

        let body = match PicmgRecordId::from(record_id) {
            PicmgRecordId::MtcaPowerModuleCapability => {
                PicmgBody::PowerModuleCapability(PowerModuleCapability::from_payload(payload)?)
            }
            _ => PicmgBody::Unknown,
        };

        Ok(Self {
            manufacturer_id,
            record_id,
            format_version,
            body,
        })
    }

    pub fn record_type(&self) -> PicmgRecordId {
        PicmgRecordId::from(self.record_id)
    }
}

/// Decoded contents of a record, by record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBody {
    Picmg(PicmgRecord),
    /// A record without a dedicated decoder. This is not an error; the
    /// payload is still available in [`MultiRecord::raw`].
    Unknown,
}

/// A single record from the multi-record area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiRecord {
    pub header: MultiRecordHeader,
    /// The record payload.
    pub raw: Vec<u8>,
    pub body: RecordBody,
}

impl MultiRecord {
    /// Decodes the record that starts at `data[0]`.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FruError> {
        let header = MultiRecordHeader::from_bytes(data)?;
        let payload = take(
            data,
            RECORD_HEADER_LEN,
            usize::from(header.length),
            "multi-record data",
        )?;
        if checksum::sum(payload).wrapping_add(header.record_checksum) != 0 {
            return Err(FruError::Checksum(ChecksumKind::RecordData));
        }

        let body = match header.record_type() {
            RecordType::OemPicmg => RecordBody::Picmg(PicmgRecord::from_payload(payload)?),
            _ => RecordBody::Unknown,
        };

        trace!(
            "multi-record type {:#04x}, {} bytes, end of list: {}",
            header.record_type_id, header.length, header.end_of_list
        );

        Ok(Self {
            header,
            raw: payload.to_vec(),
            body,
        })
    }

    pub fn record_type(&self) -> RecordType {
        self.header.record_type()
    }

    /// Number of bytes the record occupies, header included.
    pub fn encoded_len(&self) -> usize {
        RECORD_HEADER_LEN + self.raw.len()
    }
}

impl fmt::Display for MultiRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}: {}", self.header.record_type_id, hex_string(&self.raw))
    }
}

/// The multi-record area: every record up to and including the first one
/// with the end-of-list flag set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiRecordArea {
    pub records: Vec<MultiRecord>,
}

impl MultiRecordArea {
    /// Decodes the area that starts at `data[0]`. Bytes after the last
    /// record are ignored.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FruError> {
        let mut records = Vec::new();
        let mut offset = 0;

        loop {
            let rest = data.get(offset..).unwrap_or_default();
            let record = MultiRecord::from_bytes(rest)?;
            offset += record.encoded_len();

            let last = record.header.end_of_list;
            records.push(record);
            if last {
                break;
            }
        }

        Ok(Self { records })
    }

    /// Number of bytes occupied by the records in the area.
    pub fn len_bytes(&self) -> usize {
        self.records.iter().map(MultiRecord::encoded_len).sum()
    }
}

/// Builds an encoded record with valid checksums.
#[cfg(test)]
pub(crate) fn build_record(record_type_id: u8, end_of_list: bool, payload: &[u8]) -> Vec<u8> {
    let flags = if end_of_list { 0x82 } else { 0x02 };
    let mut out = vec![
        record_type_id,
        flags,
        payload.len() as u8,
        checksum::compute(payload),
    ];
    out.push(checksum::compute(&out));
    out.extend_from_slice(payload);
    out
}
