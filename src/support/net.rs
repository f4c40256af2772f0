//-
// Copyright (c) 2026, the Corral authors
//
// This file is part of Corral.
//
// Corral is free software: you can  redistribute it and/or modify it under the
// terms of  the GNU General Public  License as published by  the Free Software
// Foundation, either version  3 of the License, or (at  your option) any later
// version.
//
// Corral is distributed  in the hope that  it will be useful,  but WITHOUT ANY
// WARRANTY; without  even the implied  warranty of MERCHANTABILITY  or FITNESS
// FOR  A PARTICULAR  PURPOSE.  See the  GNU General  Public  License for  more
// details.
//
// You should have received a copy of the GNU General Public License along with
// Corral. If not, see <http://www.gnu.org/licenses/>.

//! Hostname and IPv4 heuristics for posting-origin extraction.
//!
//! These deliberately do not use `std::net` address parsing: historical
//! posting headers contain hex dotted quads and other oddities that the
//! stricter modern grammar rejects.

/// Parses a dotted-quad IPv4 address into its 32-bit numeric form.
///
/// All four groups are first tried as decimal (1-3 digits, value <= 255); if
/// any group fails, all four are retried as hex (1-2 digits). Mixed-radix
/// addresses are not a thing: the radix applies to the whole quad.
pub fn parse_dotted_quad(s: &str) -> Option<u32> {
    let groups: Vec<&str> = s.split('.').collect();
    if 4 != groups.len() {
        return None;
    }

    parse_quad_radix(&groups, 10, 3).or_else(|| parse_quad_radix(&groups, 16, 2))
}

fn parse_quad_radix(groups: &[&str], radix: u32, max_digits: usize) -> Option<u32> {
    let mut value = 0u32;
    for group in groups {
        if group.is_empty() || group.len() > max_digits {
            return None;
        }
        let octet = u8::from_str_radix(group, radix).ok()?;
        value = (value << 8) | u32::from(octet);
    }
    Some(value)
}

/// Formats a 32-bit address back into decimal dotted-quad form.
pub fn format_dotted_quad(addr: u32) -> String {
    format!(
        "{}.{}.{}.{}",
        (addr >> 24) & 0xFF,
        (addr >> 16) & 0xFF,
        (addr >> 8) & 0xFF,
        addr & 0xFF
    )
}

/// Whether `s` is a plausible fully-qualified hostname: at least two labels,
/// each 1-63 characters of alphanumerics and hyphens, with no leading,
/// trailing, or doubled hyphen.
pub fn is_hostname(s: &str) -> bool {
    let labels: Vec<&str> = s.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| is_hostname_label(l))
}

fn is_hostname_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && label.bytes().all(|b| b.is_ascii_alphanumeric() || b'-' == b)
        && !label.starts_with('-')
        && !label.ends_with('-')
        && !label.contains("--")
}

/// Returns the final label of `host` lowercased if it looks like an ISO
/// country code (exactly two letters).
pub fn country_label(host: &str) -> Option<String> {
    let last = host.rsplit('.').next()?;
    if 2 == last.len() && last.bytes().all(|b| b.is_ascii_alphabetic()) {
        Some(last.to_lowercase())
    } else {
        None
    }
}
