// s5cmd-bench - Build comparison benchmarks for s5cmd
// Copyright (c) 2025 Oliver Seifert
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::error::{BenchError, Result};

const UNITS: &[(char, u32)] = &[('K', 1), ('M', 2), ('G', 3), ('T', 4), ('P', 5)];

/// Parse a fixture size such as `1024`, `1M` or `300G` into bytes.
///
/// Suffixes are binary: `K` is 1024, `M` is 1024², up to `P`.
pub fn parse_size(size: &str) -> Result<u64> {
    let invalid = || BenchError::config(format!("Given size is not correct: '{}'", size));

    if !size.is_empty() && size.bytes().all(|b| b.is_ascii_digit()) {
        return size.parse().map_err(|_| invalid());
    }

    let unit = size.chars().last().ok_or_else(invalid)?;
    let exponent = UNITS
        .iter()
        .find(|(suffix, _)| *suffix == unit)
        .map(|(_, exponent)| *exponent)
        .ok_or_else(invalid)?;

    let digits = &size[..size.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let count: u64 = digits.parse().map_err(|_| invalid())?;
    count
        .checked_mul(1024u64.pow(exponent))
        .ok_or_else(invalid)
}
