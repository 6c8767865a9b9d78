//! Numeric to ASCII conversion into caller-provided buffers.
//!
//! No allocator and no `core::fmt` machinery; digits are produced a byte
//! at a time. Hex comes out uppercase with a `0x` prefix, binary and octal
//! bare, decimal signed.

use crate::file::Base;

/// Worst case: "0x" plus 64 binary digits would not fit, but binary/octal
/// render without a prefix; 64 digits + sign + prefix headroom.
pub(crate) const INT_BUF: usize = 67;
/// Sign + 20 integer digits + '.' + up to 20 fractional digits.
pub(crate) const FLOAT_BUF: usize = 48;

const MAX_FLOAT_PLACES: u8 = 20;

// Above this even f64 stops having integer precision; mirrors the
// unsigned-long overflow guard in classic embedded print routines.
const FLOAT_OVERFLOW: f64 = 1.8446744e19;

pub(crate) fn format_int(value: i64, base: Base, out: &mut [u8; INT_BUF]) -> usize {
    match base {
        Base::Dec => {
            if value < 0 {
                out[0] = b'-';
                1 + format_radix(value.unsigned_abs(), 10, &mut out[1..])
            } else {
                format_radix(value as u64, 10, out)
            }
        }
        Base::Hex => {
            out[0] = b'0';
            out[1] = b'x';
            2 + format_radix(value as u64, 16, &mut out[2..])
        }
        Base::Oct => format_radix(value as u64, 8, out),
        Base::Bin => format_radix(value as u64, 2, out),
    }
}

pub(crate) fn format_float(value: f64, places: u8, out: &mut [u8; FLOAT_BUF]) -> usize {
    if value.is_nan() {
        return copy_literal(b"nan", out);
    }
    if value.is_infinite() {
        return copy_literal(b"inf", out);
    }

    let places = places.min(MAX_FLOAT_PLACES);
    let negative = value < 0.0;
    let mut value = if negative { -value } else { value };

    // Round at the last printed place.
    let mut rounding = 0.5;
    for _ in 0..places {
        rounding /= 10.0;
    }
    value += rounding;
    if value >= FLOAT_OVERFLOW {
        return copy_literal(b"ovf", out);
    }

    let mut len = 0;
    if negative {
        out[0] = b'-';
        len = 1;
    }
    let int_part = value as u64;
    len += format_radix(int_part, 10, &mut out[len..]);
    if places > 0 {
        out[len] = b'.';
        len += 1;
        let mut frac = value - int_part as f64;
        for _ in 0..places {
            frac *= 10.0;
            let digit = frac as u8;
            out[len] = b'0' + digit;
            len += 1;
            frac -= digit as f64;
        }
    }
    len
}

fn format_radix(mut value: u64, radix: u64, out: &mut [u8]) -> usize {
    let mut digits = [0u8; 64];
    let mut n = 0;
    loop {
        digits[n] = digit_ascii((value % radix) as u8);
        value /= radix;
        n += 1;
        if value == 0 {
            break;
        }
    }
    for i in 0..n {
        out[i] = digits[n - 1 - i];
    }
    n
}

fn digit_ascii(d: u8) -> u8 {
    if d < 10 {
        b'0' + d
    } else {
        b'A' + d - 10
    }
}

fn copy_literal(text: &[u8], out: &mut [u8]) -> usize {
    out[..text.len()].copy_from_slice(text);
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_str(value: i64, base: Base) -> heapless::String<{ INT_BUF }> {
        let mut buf = [0u8; INT_BUF];
        let len = format_int(value, base, &mut buf);
        buf[..len].iter().map(|&b| b as char).collect()
    }

    fn float_str(value: f64, places: u8) -> heapless::String<{ FLOAT_BUF }> {
        let mut buf = [0u8; FLOAT_BUF];
        let len = format_float(value, places, &mut buf);
        buf[..len].iter().map(|&b| b as char).collect()
    }

    #[test]
    fn decimal() {
        assert_eq!(int_str(0, Base::Dec), "0");
        assert_eq!(int_str(1234, Base::Dec), "1234");
        assert_eq!(int_str(-42, Base::Dec), "-42");
    }

    #[test]
    fn hex_prefixed_uppercase() {
        assert_eq!(int_str(0x2a, Base::Hex), "0x2A");
        assert_eq!(int_str(0xdead, Base::Hex), "0xDEAD");
    }

    #[test]
    fn binary_and_octal() {
        assert_eq!(int_str(6, Base::Bin), "110");
        assert_eq!(int_str(8, Base::Oct), "10");
    }

    #[test]
    fn float_fixed_places() {
        assert_eq!(float_str(3.14159, 2), "3.14");
        assert_eq!(float_str(-0.5, 1), "-0.5");
        assert_eq!(float_str(2.0, 0), "2");
    }

    #[test]
    fn float_rounds_last_place() {
        assert_eq!(float_str(1.005, 2), "1.00"); // 1.005 is not exact in binary
        assert_eq!(float_str(2.675, 1), "2.7");
        assert_eq!(float_str(9.99, 1), "10.0");
    }

    #[test]
    fn float_specials() {
        assert_eq!(float_str(f64::NAN, 2), "nan");
        assert_eq!(float_str(f64::INFINITY, 2), "inf");
        assert_eq!(float_str(1e30, 2), "ovf");
    }
}
