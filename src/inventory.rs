// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/inventory.rs - Whole-image FRU inventory decoder.
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
 * # `inventory` Module
 *
 * This module ties the other decoders together: it reads the common header
 * and decodes every area the header points at.
 *
 * ## Usage Example
 *
 * ```no_run
 * use ipmi_fru::inventory::FruInventory;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let data = std::fs::read("fru.bin")?;
 *     let inventory = FruInventory::from_bytes(data)?;
 *
 *     if let Some(product) = &inventory.product_info_area {
 *         println!("Product: {} {}", product.manufacturer, product.name);
 *     }
 *
 *     Ok(())
 * }
 * ```
 */

use log::debug;

use crate::area::{BoardInfoArea, ChassisInfoArea, InfoArea, ProductInfoArea};
use crate::error::{FruError, take};
use crate::header::{COMMON_HEADER_LEN, CommonHeader};
use crate::multirecord::MultiRecordArea;

/// A fully decoded FRU image.
///
/// Areas the common header does not point at are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct FruInventory {
    /// The image the inventory was decoded from.
    pub raw: Vec<u8>,
    pub common_header: CommonHeader,
    pub chassis_info_area: Option<ChassisInfoArea>,
    pub board_info_area: Option<BoardInfoArea>,
    pub product_info_area: Option<ProductInfoArea>,
    pub multirecord_area: Option<MultiRecordArea>,
}

impl FruInventory {
    /// Decodes a FRU image.
    ///
    /// # Arguments
    ///
    /// * `data` - The FRU image, starting with the common header.
    ///
    /// # Returns
    ///
    /// A `Result` containing the decoded inventory, or the first error hit
    /// while decoding the header or any of the areas.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FruError> {
        let common_header =
            CommonHeader::from_bytes(take(&data, 0, COMMON_HEADER_LEN, "common header")?)?;
        debug!("FRU common header: {:?}", common_header);

        let chassis_info_area = common_header
            .chassis_info_area_offset
            .map(|offset| ChassisInfoArea::from_bytes(area_at(&data, offset, "chassis info area")?))
            .transpose()?;

        let board_info_area = common_header
            .board_info_area_offset
            .map(|offset| BoardInfoArea::from_bytes(area_at(&data, offset, "board info area")?))
            .transpose()?;

        let product_info_area = common_header
            .product_info_area_offset
            .map(|offset| ProductInfoArea::from_bytes(area_at(&data, offset, "product info area")?))
            .transpose()?;

        let multirecord_area = common_header
            .multirecord_area_offset
            .map(|offset| MultiRecordArea::from_bytes(area_at(&data, offset, "multi-record area")?))
            .transpose()?;

        Ok(Self {
            raw: data,
            common_header,
            chassis_info_area,
            board_info_area,
            product_info_area,
            multirecord_area,
        })
    }

    /// The info areas present in the image, in chassis, board, product order.
    pub fn info_areas(&self) -> Vec<InfoArea<'_>> {
        let mut areas = Vec::with_capacity(3);
        if let Some(a) = &self.chassis_info_area {
            areas.push(InfoArea::Chassis(a));
        }
        if let Some(a) = &self.board_info_area {
            areas.push(InfoArea::Board(a));
        }
        if let Some(a) = &self.product_info_area {
            areas.push(InfoArea::Product(a));
        }
        areas
    }
}

/// Everything from `offset` to the end of the image. Areas find their own
/// end from their length fields.
fn area_at<'a>(data: &'a [u8], offset: usize, what: &'static str) -> Result<&'a [u8], FruError> {
    if offset >= data.len() {
        return Err(FruError::Truncated {
            what,
            needed: offset + 1,
            available: data.len(),
        });
    }
    Ok(&data[offset..])
}

/// Assembles a FRU image from its areas, in header order. Empty slices mark
/// absent areas.
#[cfg(test)]
pub(crate) fn build_image(
    chassis: &[u8],
    board: &[u8],
    product: &[u8],
    multirecord: &[u8],
) -> Vec<u8> {
    use crate::checksum;

    let mut image = vec![0u8; COMMON_HEADER_LEN];
    image[0] = 0x01;
    for (slot, area) in [(2, chassis), (3, board), (4, product), (5, multirecord)] {
        if area.is_empty() {
            continue;
        }
        image[slot] = (image.len() / 8) as u8;
        image.extend_from_slice(area);
        while image.len() % 8 != 0 {
            image.push(0x00);
        }
    }
    image[7] = checksum::compute(&image[..7]);
    image
}
