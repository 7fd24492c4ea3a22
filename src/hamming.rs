/// 两个 64 位哈希的汉明距离
#[inline(always)]
pub fn hamming(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// 若距离不超过阈值，返回该距离
#[inline(always)]
pub fn within(a: u64, b: u64, threshold: u32) -> Option<u8> {
    let d = hamming(a, b);
    // 64 位哈希的距离最大为 64，必然能放进 u8
    (d <= threshold).then_some(d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hamming_identical() {
        assert_eq!(hamming(0xdead_beef, 0xdead_beef), 0);
    }

    #[test]
    fn test_hamming_all_different() {
        assert_eq!(hamming(0, u64::MAX), 64);
    }

    #[test]
    fn test_hamming_single_bit() {
        assert_eq!(hamming(0, 1 << 63), 1);
    }

    #[test]
    fn test_within_threshold() {
        assert_eq!(within(0, 0b111, 3), Some(3));
        assert_eq!(within(0, 0b1111, 3), None);
        assert_eq!(within(0, u64::MAX, 64), Some(64));
    }
}
