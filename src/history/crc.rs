const CRC8_POLYNOMIAL: u8 = 0x31;

/// CRC-8 over `data`, polynomial 0x31, initial value 0x00, no reflection.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0x00;
    for byte in data.iter().copied() {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 == 0 {
                crc <<= 1;
            } else {
                crc = (crc << 1) ^ CRC8_POLYNOMIAL;
            }
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::crc8;

    #[test]
    fn known_vectors() {
        assert_eq!(crc8(&[0xbe, 0xef]), 0x13);
        assert_eq!(crc8(b"123456789"), 0xa2);
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(crc8(&[]), 0x00);
    }
}
