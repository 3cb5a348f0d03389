use std::fmt::Write;

const BYTES_PER_LINE: usize = 16;

/// Uppercase hex dump, 16 bytes per line, each line newline-terminated.
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3 + data.len() / BYTES_PER_LINE + 1);

    for line in data.chunks(BYTES_PER_LINE) {
        for b in line {
            // Writing to a String cannot fail.
            let _ = write!(out, "{:02X} ", b);
        }
        out.push('\n');
    }

    out
}

/// Colon separated lowercase MAC address.
pub fn format_mac(mac: &[u8; 6]) -> String {
    let mut out = String::with_capacity(17);
    for (i, b) in mac.iter().enumerate() {
        if i > 0 {
            out.push(':');
        }
        let _ = write!(out, "{:02x}", b);
    }
    out
}
