// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/lib.rs - Reader and decoder library for IPMI FRU inventory data.
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
 * # `ipmi_fru` Crate
 *
 * A library for reading and decoding IPMI Field Replaceable Unit (FRU)
 * inventory data: the small, checksummed binary records that describe a
 * hardware module's manufacturer, part and serial numbers, manufacture date,
 * and vendor-specific extensions.
 *
 * This crate provides a full pipeline for working with FRU data:
 *
 * 1. [transport]: Fetches the raw FRU image from a management controller,
 *    adapting the read size to what the controller accepts.
 * 2. [header]: Decodes the common header that locates the other areas.
 * 3. [area] and [multirecord]: Decode the info areas and the multi-record
 *    area, using [field] for the individual type/length fields.
 * 4. [inventory]: Ties it all together into a [FruInventory].
 *
 * ## Usage Example
 *
 * ```no_run
 * use ipmi_fru::inventory::FruInventory;
 * use ipmi_fru::multirecord::RecordBody;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     // Read a FRU image dumped from a device
 *     let data = std::fs::read("fru.bin")?;
 *
 *     // Decode it
 *     let inventory = FruInventory::from_bytes(data)?;
 *
 *     // Access the decoded areas
 *     if let Some(board) = &inventory.board_info_area {
 *         println!("Board: {} {}", board.manufacturer, board.product_name);
 *         println!("  Serial: {}", board.serial_number);
 *     }
 *     if let Some(multirecord) = &inventory.multirecord_area {
 *         for record in &multirecord.records {
 *             if let RecordBody::Unknown = record.body {
 *                 println!("Record {}", record);
 *             }
 *         }
 *     }
 *
 *     Ok(())
 * }
 * ```
 */

pub mod area;
pub mod checksum;
pub mod error;
pub mod field;
pub mod header;
pub mod inventory;
pub mod multirecord;
pub mod transport;

pub use error::{ChecksumKind, FruError};
pub use inventory::FruInventory;
