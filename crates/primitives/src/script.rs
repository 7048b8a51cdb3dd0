//! Minimal script construction: data pushes and small integers.

pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;

/// Appends `data` with the shortest push opcode that fits its length.
pub fn push_data(script: &mut Vec<u8>, data: &[u8]) {
    match data.len() {
        0..=75 => script.push(data.len() as u8),
        76..=0xff => {
            script.push(OP_PUSHDATA1);
            script.push(data.len() as u8);
        }
        0x100..=0xffff => {
            script.push(OP_PUSHDATA2);
            script.extend_from_slice(&(data.len() as u16).to_le_bytes());
        }
        _ => {
            script.push(OP_PUSHDATA4);
            script.extend_from_slice(&(data.len() as u32).to_le_bytes());
        }
    }
    script.extend_from_slice(data);
}

/// Appends an integer, using `OP_0`, `OP_1NEGATE` or `OP_1..OP_16` where possible.
pub fn push_int(script: &mut Vec<u8>, value: i64) {
    match value {
        0 => script.push(OP_0),
        -1 => script.push(OP_1NEGATE),
        1..=16 => script.push(OP_1 + (value as u8 - 1)),
        _ => push_num(script, value),
    }
}

/// Appends an integer as a data push of its script-number encoding.
pub fn push_num(script: &mut Vec<u8>, value: i64) {
    push_data(script, &script_num_to_vec(value));
}

/// Minimal little-endian sign-magnitude encoding.
pub fn script_num_to_vec(value: i64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }
    let mut abs = value.unsigned_abs();
    let mut result = Vec::new();
    while abs > 0 {
        result.push((abs & 0xff) as u8);
        abs >>= 8;
    }
    let sign_bit = 0x80u8;
    if let Some(last) = result.last_mut() {
        if (*last & sign_bit) != 0 {
            result.push(if value < 0 { sign_bit } else { 0 });
        } else if value < 0 {
            *last |= sign_bit;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_num_encoding() {
        assert!(script_num_to_vec(0).is_empty());
        assert_eq!(script_num_to_vec(42), vec![0x2a]);
        assert_eq!(script_num_to_vec(-1), vec![0x81]);
        assert_eq!(script_num_to_vec(0x80), vec![0x80, 0x00]);
        assert_eq!(script_num_to_vec(-0x80), vec![0x80, 0x80]);
        assert_eq!(script_num_to_vec(520_617_983), vec![0xff, 0xff, 0x08, 0x1f]);
    }

    #[test]
    fn push_int_uses_small_opcodes() {
        let mut script = Vec::new();
        push_int(&mut script, 0);
        push_int(&mut script, 1);
        push_int(&mut script, 16);
        push_int(&mut script, -1);
        push_int(&mut script, 42);
        assert_eq!(script, vec![OP_0, OP_1, OP_16, OP_1NEGATE, 0x01, 0x2a]);
    }

    #[test]
    fn push_data_length_prefixes() {
        let mut script = Vec::new();
        push_data(&mut script, &[0xaa; 75]);
        assert_eq!(script[0], 75);

        let mut script = Vec::new();
        push_data(&mut script, &[0xaa; 76]);
        assert_eq!(&script[..2], &[OP_PUSHDATA1, 76]);

        let mut script = Vec::new();
        push_data(&mut script, &[0xaa; 0x100]);
        assert_eq!(&script[..3], &[OP_PUSHDATA2, 0x00, 0x01]);
        assert_eq!(script.len(), 3 + 0x100);
    }
}
