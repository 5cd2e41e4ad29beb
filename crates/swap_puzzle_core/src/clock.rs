//! Elapsed-time formatting shared by the play screen and the gallery.

/// Formats whole seconds as `MM:SS`.
///
/// Minutes are zero-padded to two digits and keep growing past 99.
pub fn format_clock(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_zero() {
        assert_eq!(format_clock(0), "00:00");
    }

    #[test]
    fn test_format_minutes_and_seconds() {
        assert_eq!(format_clock(75), "01:15");
        assert_eq!(format_clock(600), "10:00");
    }

    #[test]
    fn test_format_past_an_hour() {
        assert_eq!(format_clock(6000), "100:00");
    }
}
