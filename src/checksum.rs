// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/checksum.rs - Zero-sum checksums used throughout FRU data.
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

/// Sums `data` modulo 256.
pub fn sum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Returns `true` if the bytes of `data` add up to zero modulo 256.
pub fn is_valid(data: &[u8]) -> bool {
    sum(data) == 0
}

/// Computes the byte that, appended to `data`, makes the whole sum to zero.
pub fn compute(data: &[u8]) -> u8 {
    sum(data).wrapping_neg()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute() {
        let data = [0x01, 0x00, 0x00, 0x01, 0x02, 0x00, 0x00];
        assert_eq!(compute(&data), 0xfc);

        let mut full = data.to_vec();
        full.push(compute(&data));
        assert!(is_valid(&full));
    }

    #[test]
    fn test_empty_is_valid() {
        assert!(is_valid(&[]));
        assert_eq!(compute(&[]), 0);
    }

    #[test]
    fn test_wraps() {
        assert_eq!(sum(&[0xff, 0xff, 0x02]), 0x00);
        assert!(!is_valid(&[0xff, 0x02]));
    }
}
