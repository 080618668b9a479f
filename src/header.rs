// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/header.rs - FRU common header decoder.
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

use crate::checksum;
use crate::error::{ChecksumKind, FruError};

/// Size of the common header in bytes.
pub const COMMON_HEADER_LEN: usize = 8;

/// Area offsets in the header are stored in multiples of 8 bytes.
pub const OFFSET_MULTIPLIER: usize = 8;

/// The 8-byte header at the start of every FRU image.
///
/// Each offset is the absolute byte offset of its area within the image, or
/// `None` if the area is not present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonHeader {
    pub format_version: u8,
    pub internal_use_area_offset: Option<usize>,
    pub chassis_info_area_offset: Option<usize>,
    pub board_info_area_offset: Option<usize>,
    pub product_info_area_offset: Option<usize>,
    pub multirecord_area_offset: Option<usize>,
}

impl CommonHeader {
    /// Decodes a common header from exactly [`COMMON_HEADER_LEN`] bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FruError> {
        if data.len() != COMMON_HEADER_LEN {
            return Err(FruError::Length {
                what: "common header",
                expected: COMMON_HEADER_LEN,
                actual: data.len(),
            });
        }

        if !checksum::is_valid(data) {
            return Err(FruError::Checksum(ChecksumKind::CommonHeader));
        }

        Ok(Self {
            format_version: data[0] & 0x0f,
            internal_use_area_offset: area_offset(data[1]),
            chassis_info_area_offset: area_offset(data[2]),
            board_info_area_offset: area_offset(data[3]),
            product_info_area_offset: area_offset(data[4]),
            multirecord_area_offset: area_offset(data[5]),
        })
    }
}

fn area_offset(raw: u8) -> Option<usize> {
    match raw {
        0 => None,
        n => Some(usize::from(n) * OFFSET_MULTIPLIER),
    }
}
