// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  frudump.rs - FRU inventory dump demo.
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

use std::fs;

use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use ipmi_fru::area::InfoArea;
use ipmi_fru::inventory::FruInventory;
use ipmi_fru::multirecord::{PicmgBody, RecordBody};
use ipmi_fru::transport::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The FRU image to read.
    file: String,

    /// Read the image through a simulated controller that rejects reads
    /// larger than this many bytes.
    #[arg(long)]
    device_chunk_limit: Option<u8>,

    /// Log every transfer.
    #[arg(short, long)]
    verbose: bool,
}

/// A FRU device backed by an image in memory.
struct ImageFru {
    image: Vec<u8>,
    chunk_limit: u8,
}

impl FruTransport for ImageFru {
    fn area_info(&mut self, _fru_id: u8) -> Result<AreaInfo, TransportError> {
        let size = u16::try_from(self.image.len())
            .map_err(|_| TransportError::Link("image too large".to_string()))?;
        Ok(AreaInfo {
            size,
            access: AccessMode::Bytes,
        })
    }

    fn read_data(
        &mut self,
        _fru_id: u8,
        offset: u16,
        count: u8,
    ) -> Result<Vec<u8>, TransportError> {
        if count > self.chunk_limit {
            return Err(TransportError::Completion(
                CompletionCode::CANNOT_RETURN_REQUESTED_BYTES,
            ));
        }
        let start = usize::from(offset);
        let end = (start + usize::from(count)).min(self.image.len());
        self.image
            .get(start..end)
            .map(|d| d.to_vec())
            .ok_or(TransportError::Completion(CompletionCode::PARAMETER_OUT_OF_RANGE))
    }

    fn write_data(&mut self, _fru_id: u8, _offset: u16, _data: &[u8]) -> Result<u8, TransportError> {
        Err(TransportError::Completion(CompletionCode::INVALID_COMMAND))
    }
}

fn print_info_area(area: InfoArea) {
    match area {
        InfoArea::Chassis(c) => {
            println!("Chassis Info Area");
            println!("  Type:          {:?}", c.chassis_type);
            println!("  Part Number:   {}", c.part_number);
            println!("  Serial Number: {}", c.serial_number);
        }
        InfoArea::Board(b) => {
            println!("Board Info Area");
            match b.mfg_date() {
                Some(date) => println!("  Mfg. Date:     {}", date),
                None => println!("  Mfg. Date:     ({} minutes)", b.mfg_minutes),
            }
            println!("  Manufacturer:  {}", b.manufacturer);
            println!("  Product Name:  {}", b.product_name);
            println!("  Serial Number: {}", b.serial_number);
            println!("  Part Number:   {}", b.part_number);
            println!("  FRU File ID:   {}", b.fru_file_id);
        }
        InfoArea::Product(p) => {
            println!("Product Info Area");
            println!("  Manufacturer:  {}", p.manufacturer);
            println!("  Name:          {}", p.name);
            println!("  Part Number:   {}", p.part_number);
            println!("  Version:       {}", p.version);
            println!("  Serial Number: {}", p.serial_number);
            println!("  Asset Tag:     {}", p.asset_tag);
            println!("  FRU File ID:   {}", p.fru_file_id);
        }
    }
    for field in area.custom_fields() {
        println!("  Custom:        {}", field);
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(error) = SimpleLogger::new().with_level(level).init() {
        eprintln!("Error setting up logging: {:?}", error);
    }

    let image = match fs::read(&args.file) {
        Ok(data) => data,
        Err(error) => {
            eprintln!("Error opening file {:?}: {:?}", &args.file, error);
            return;
        }
    };

    let decoded = match args.device_chunk_limit {
        Some(chunk_limit) => {
            let mut client = FruClient::new(ImageFru { image, chunk_limit });
            client.inventory(0)
        }
        None => FruInventory::from_bytes(image),
    };

    let inventory = match decoded {
        Ok(inventory) => inventory,
        Err(error) => {
            eprintln!("Error decoding file {:?}: {}", &args.file, error);
            return;
        }
    };

    println!("Common Header: {:?}", inventory.common_header);
    for area in inventory.info_areas() {
        print_info_area(area);
    }

    if let Some(multirecord) = &inventory.multirecord_area {
        println!("Multi-Record Area ({} bytes)", multirecord.len_bytes());
        for record in &multirecord.records {
            match &record.body {
                RecordBody::Picmg(picmg) => match &picmg.body {
                    PicmgBody::PowerModuleCapability(power) => println!(
                        "  PICMG power module capability: {} A",
                        power.maximum_current_output()
                    ),
                    PicmgBody::Unknown => {
                        println!("  PICMG {:?}: {}", picmg.record_type(), record)
                    }
                },
                RecordBody::Unknown => println!("  {:?}: {}", record.record_type(), record),
            }
        }
    }
}
