// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/area.rs - Chassis, board, and product info area decoders.
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
 * # `area` Module
 *
 * This module decodes the three fixed-layout info areas of a FRU image. Each
 * area starts with a format version byte and a length byte, carries a fixed
 * set of type/length fields, and ends with a list of custom fields
 * terminated by [`END_OF_FIELDS`].
 *
 * The decoders take a slice starting at the area and extending to the end of
 * the FRU image; each area works out its own extent from its length byte.
 */

use chrono::{DateTime, NaiveDateTime};
use log::trace;
use num_enum::FromPrimitive;

use crate::checksum;
use crate::error::{ChecksumKind, FruError, take};
use crate::field::{END_OF_FIELDS, TaggedField};
use crate::header::OFFSET_MULTIPLIER;

/// The only info area format version defined by IPMI.
pub const INFO_AREA_FORMAT_VERSION: u8 = 1;

/// 1996-01-01T00:00:00Z, the zero point of the board manufacture date.
const FRU_EPOCH_UNIX_SECONDS: i64 = 820_454_400;

/// Names the three kinds of info area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaKind {
    Chassis,
    Board,
    Product,
}

/// The part of an info area every variant shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaHeader {
    pub format_version: u8,
    /// Length of the whole area in bytes, checksum included.
    pub length: usize,
}

impl AreaHeader {
    /// Validates the format version, length, and checksum of the area that
    /// starts at `data[0]`.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FruError> {
        Self::validate(data).map(|(header, _)| header)
    }

    /// Like [`AreaHeader::from_bytes`], but also returns the area itself,
    /// trimmed to its declared length.
    fn validate(data: &[u8]) -> Result<(Self, &[u8]), FruError> {
        let preamble = take(data, 0, 2, "info area header")?;

        let format_version = preamble[0] & 0x0f;
        if format_version != INFO_AREA_FORMAT_VERSION {
            return Err(FruError::UnsupportedVersion {
                what: "info area",
                version: format_version,
            });
        }

        let length = usize::from(preamble[1]) * OFFSET_MULTIPLIER;
        let area = take(data, 0, length, "info area")?;
        if !checksum::is_valid(area) {
            return Err(FruError::Checksum(ChecksumKind::InfoArea));
        }

        Ok((
            Self {
                format_version,
                length,
            },
            area,
        ))
    }
}

/// Walks the fields of an area, one after the other.
struct FieldReader<'a> {
    area: &'a [u8],
    offset: usize,
}

impl<'a> FieldReader<'a> {
    fn new(area: &'a [u8], offset: usize) -> Self {
        Self { area, offset }
    }

    fn byte(&mut self, what: &'static str) -> Result<u8, FruError> {
        let b = take(self.area, self.offset, 1, what)?[0];
        self.offset += 1;
        Ok(b)
    }

    fn bytes(&mut self, len: usize, what: &'static str) -> Result<&'a [u8], FruError> {
        let b = take(self.area, self.offset, len, what)?;
        self.offset += len;
        Ok(b)
    }

    fn field(&mut self, force_text: bool) -> Result<TaggedField, FruError> {
        let field = TaggedField::from_bytes(self.area, self.offset, force_text)?;
        self.offset += field.encoded_len();
        Ok(field)
    }

    fn custom_fields(&mut self) -> Result<Vec<TaggedField>, FruError> {
        let mut fields = Vec::new();
        loop {
            let tag = take(self.area, self.offset, 1, "custom field list")?[0];
            if tag == END_OF_FIELDS {
                self.offset += 1;
                break;
            }
            fields.push(self.field(false)?);
        }
        Ok(fields)
    }
}

/// Chassis type codes, shared with SMBIOS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum ChassisType {
    Other = 1,
    Unknown = 2,
    Desktop = 3,
    LowProfileDesktop = 4,
    PizzaBox = 5,
    MiniTower = 6,
    Tower = 7,
    Portable = 8,
    Laptop = 9,
    Notebook = 10,
    HandHeld = 11,
    DockingStation = 12,
    AllInOne = 13,
    SubNotebook = 14,
    SpaceSaving = 15,
    LunchBox = 16,
    MainServerChassis = 17,
    ExpansionChassis = 18,
    SubChassis = 19,
    BusExpansionChassis = 20,
    PeripheralChassis = 21,
    RaidChassis = 22,
    RackMountChassis = 23,
    #[num_enum(catch_all)]
    Reserved(u8),
}

/// The chassis info area.
#[derive(Debug, Clone, PartialEq)]
pub struct ChassisInfoArea {
    pub header: AreaHeader,
    pub chassis_type: ChassisType,
    pub part_number: TaggedField,
    pub serial_number: TaggedField,
    pub custom_fields: Vec<TaggedField>,
}

impl ChassisInfoArea {
    pub fn from_bytes(data: &[u8]) -> Result<Self, FruError> {
        let (header, area) = AreaHeader::validate(data)?;
        let mut reader = FieldReader::new(area, 2);

        let chassis_type = ChassisType::from(reader.byte("chassis type")?);
        let part_number = reader.field(false)?;
        let serial_number = reader.field(true)?;
        let custom_fields = reader.custom_fields()?;

        trace!(
            "chassis info area: {} bytes, {} custom fields",
            header.length,
            custom_fields.len()
        );

        Ok(Self {
            header,
            chassis_type,
            part_number,
            serial_number,
            custom_fields,
        })
    }
}

/// The board info area.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardInfoArea {
    pub header: AreaHeader,
    pub language_code: u8,
    /// Manufacture date/time in minutes since 1996-01-01T00:00:00.
    pub mfg_minutes: u32,
    pub manufacturer: TaggedField,
    pub product_name: TaggedField,
    pub serial_number: TaggedField,
    pub part_number: TaggedField,
    pub fru_file_id: TaggedField,
    pub custom_fields: Vec<TaggedField>,
}

impl BoardInfoArea {
    pub fn from_bytes(data: &[u8]) -> Result<Self, FruError> {
        let (header, area) = AreaHeader::validate(data)?;
        let mut reader = FieldReader::new(area, 2);

        let language_code = reader.byte("language code")?;
        let mfg = reader.bytes(3, "manufacture date")?;
        let mfg_minutes = u32::from_le_bytes([mfg[0], mfg[1], mfg[2], 0]);

        let manufacturer = reader.field(false)?;
        let product_name = reader.field(false)?;
        let serial_number = reader.field(true)?;
        let part_number = reader.field(false)?;
        let fru_file_id = reader.field(true)?;
        let custom_fields = reader.custom_fields()?;

        trace!(
            "board info area: {} bytes, {} custom fields",
            header.length,
            custom_fields.len()
        );

        Ok(Self {
            header,
            language_code,
            mfg_minutes,
            manufacturer,
            product_name,
            serial_number,
            part_number,
            fru_file_id,
            custom_fields,
        })
    }

    /// The manufacture date as a UTC timestamp.
    pub fn mfg_date(&self) -> Option<NaiveDateTime> {
        let seconds = FRU_EPOCH_UNIX_SECONDS + i64::from(self.mfg_minutes) * 60;
        DateTime::from_timestamp(seconds, 0).map(|dt| dt.naive_utc())
    }
}

/// The product info area.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInfoArea {
    pub header: AreaHeader,
    pub language_code: u8,
    pub manufacturer: TaggedField,
    pub name: TaggedField,
    pub part_number: TaggedField,
    pub version: TaggedField,
    pub serial_number: TaggedField,
    pub asset_tag: TaggedField,
    pub fru_file_id: TaggedField,
    pub custom_fields: Vec<TaggedField>,
}

impl ProductInfoArea {
    pub fn from_bytes(data: &[u8]) -> Result<Self, FruError> {
        let (header, area) = AreaHeader::validate(data)?;
        let mut reader = FieldReader::new(area, 2);

        let language_code = reader.byte("language code")?;
        let manufacturer = reader.field(false)?;
        let name = reader.field(false)?;
        let part_number = reader.field(false)?;
        let version = reader.field(false)?;
        let serial_number = reader.field(true)?;
        let asset_tag = reader.field(false)?;
        let fru_file_id = reader.field(true)?;
        let custom_fields = reader.custom_fields()?;

        trace!(
            "product info area: {} bytes, {} custom fields",
            header.length,
            custom_fields.len()
        );

        Ok(Self {
            header,
            language_code,
            manufacturer,
            name,
            part_number,
            version,
            serial_number,
            asset_tag,
            fru_file_id,
            custom_fields,
        })
    }
}

/// A borrowed view of any one of the info areas.
#[derive(Debug, Clone, Copy)]
pub enum InfoArea<'a> {
    Chassis(&'a ChassisInfoArea),
    Board(&'a BoardInfoArea),
    Product(&'a ProductInfoArea),
}

impl<'a> InfoArea<'a> {
    pub fn kind(&self) -> AreaKind {
        match *self {
            InfoArea::Chassis(_) => AreaKind::Chassis,
            InfoArea::Board(_) => AreaKind::Board,
            InfoArea::Product(_) => AreaKind::Product,
        }
    }

    pub fn header(&self) -> &'a AreaHeader {
        match *self {
            InfoArea::Chassis(a) => &a.header,
            InfoArea::Board(a) => &a.header,
            InfoArea::Product(a) => &a.header,
        }
    }

    pub fn serial_number(&self) -> &'a TaggedField {
        match *self {
            InfoArea::Chassis(a) => &a.serial_number,
            InfoArea::Board(a) => &a.serial_number,
            InfoArea::Product(a) => &a.serial_number,
        }
    }

    pub fn custom_fields(&self) -> &'a [TaggedField] {
        match *self {
            InfoArea::Chassis(a) => &a.custom_fields,
            InfoArea::Board(a) => &a.custom_fields,
            InfoArea::Product(a) => &a.custom_fields,
        }
    }
}

/// Wraps `body` (everything after the length byte) into a valid info area:
/// pads to a multiple of 8 bytes and appends the checksum.
#[cfg(test)]
pub(crate) fn build_area(body: &[u8]) -> Vec<u8> {
    let mut area = vec![INFO_AREA_FORMAT_VERSION, 0x00];
    area.extend_from_slice(body);
    while (area.len() + 1) % OFFSET_MULTIPLIER != 0 {
        area.push(0x00);
    }
    area[1] = ((area.len() + 1) / OFFSET_MULTIPLIER) as u8;
    area.push(checksum::compute(&area));
    area
}
