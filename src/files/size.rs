const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
const STEP: u64 = 1024;
// past this an f64 has no digits left to show
const MAX_DECIMALS: i32 = 20;

/// Formats a byte count with two fractional digits at most.
pub fn format_bytes(bytes: u64) -> String {
    human_size(bytes, 2)
}

/// Formats `bytes` in 1024-based units, rounded half away from zero to
/// `decimals` digits with trailing zeros dropped. Sizes past the unit
/// table stay in `TB`.
pub fn human_size(bytes: u64, decimals: i32) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let decimals = decimals.clamp(0, MAX_DECIMALS) as usize;
    let index = unit_index(bytes);
    let value = bytes as f64 / (STEP as f64).powi(index as i32);
    let scale = 10f64.powi(decimals as i32);
    let rounded = (value * scale).round() / scale;
    format!("{} {}", trim_fraction(format!("{rounded:.decimals$}")), UNITS[index])
}

fn unit_index(bytes: u64) -> usize {
    let mut index = 0;
    let mut threshold = STEP;
    while index < UNITS.len() - 1 && bytes >= threshold {
        index += 1;
        match threshold.checked_mul(STEP) {
            Some(next) => threshold = next,
            None => break,
        }
    }
    index
}

fn trim_fraction(text: String) -> String {
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_bytes() {
        assert_eq!(human_size(0, 2), "0 Bytes");
    }

    #[test]
    fn integral_values_have_no_fraction() {
        assert_eq!(format_bytes(1), "1 Bytes");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1_048_576), "1 MB");
        assert_eq!(format_bytes(1 << 30), "1 GB");
    }

    #[test]
    fn fractional_values_drop_trailing_zeros() {
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1126), "1.1 KB");
        assert_eq!(format_bytes(1_500_000), "1.43 MB");
    }

    #[test]
    fn negative_decimals_round_to_integer() {
        assert_eq!(human_size(1536, -3), "2 KB");
        assert_eq!(human_size(1280, 0), "1 KB");
    }

    #[test]
    fn huge_decimals_are_capped() {
        assert_eq!(human_size(1536, 400), "1.5 KB");
        assert_eq!(human_size(1536, i32::MAX), "1.5 KB");
        assert_eq!(human_size(1024, 20), "1 KB");
    }

    #[test]
    fn integer_part_keeps_its_zeros() {
        assert_eq!(human_size(10 * 1024, 0), "10 KB");
        assert_eq!(format_bytes(100 * 1024 * 1024), "100 MB");
    }

    #[test]
    fn units_saturate_at_terabytes() {
        let pb: u64 = 1 << 50;
        assert_eq!(format_bytes(pb), "1024 TB");
        assert!(format_bytes(u64::MAX).ends_with(" TB"));
    }

    #[test]
    fn boundary_just_below_next_unit() {
        assert_eq!(format_bytes(1023), "1023 Bytes");
        assert_eq!(format_bytes(1_048_575), "1024 KB");
    }
}
