/// Zero-pad a value to two digits, for hh:mm:ss rendering.
pub fn pad2(n: u64) -> String {
    format!("{:02}", n)
}

/// Group a number with `,` thousands separators (e.g. 1234567 -> "1,234,567").
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad2() {
        assert_eq!(pad2(0), "00");
        assert_eq!(pad2(7), "07");
        assert_eq!(pad2(42), "42");
        assert_eq!(pad2(100), "100");
    }

    #[test]
    fn test_group_thousands_small() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
    }

    #[test]
    fn test_group_thousands_grouping() {
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(12_345), "12,345");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(group_thousands(1_000_000_000), "1,000,000,000");
    }
}
