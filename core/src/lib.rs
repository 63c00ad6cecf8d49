#[cfg(feature = "io_ext")]
pub mod io_ext;

#[cfg(feature = "nom_ext")]
pub mod nom_ext;

pub mod scene;

/// Converts a 4-byte string into a 32-bit little endian integer.
/// Byte strings longer than 4 bytes are truncated.
#[macro_export]
macro_rules! rtag4 {
	($b4: literal) => {
		u32::from_le_bytes([$b4[0], $b4[1], $b4[2], $b4[3]])
	}
}

/// Copies `s` into a string that fits a fixed-size, NUL-terminated field of `len` bytes.
/// Truncation never splits a UTF-8 sequence.
pub fn fit_str(s: &str, len: usize) -> String {
	let max = len.saturating_sub(1);
	if s.len() <= max {
		return s.to_string();
	}

	let mut end = max;
	while !s.is_char_boundary(end) {
		end -= 1;
	}

	s[..end].to_string()
}

#[cfg(test)]
mod tests {
	#[test]
	fn test_rtag4() {
		assert_eq!(0x314D4253, rtag4!(b"SBM1"));
	}

	#[test]
	fn test_fit_str() {
		assert_eq!("abc", super::fit_str("abc", 4));
		assert_eq!("abc", super::fit_str("abcd", 4));
		assert_eq!("", super::fit_str("abcd", 0));
		// 'é' is two bytes and must not be split
		assert_eq!("a", super::fit_str("aé", 3));
	}
}
