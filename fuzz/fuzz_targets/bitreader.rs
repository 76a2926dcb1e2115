#![no_main]

use bitstream::BitReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = BitReader::new(data);
    let mut idx = 0usize;

    // Input bytes drive a bounded sequence of operations.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 9;
        idx += 1;

        match op {
            0 => {
                let _ = reader.read_bit();
            }
            1 => {
                let bits = (data[idx - 1] % 64).saturating_add(1);
                let _ = reader.read_bits(bits);
            }
            2 => {
                let _ = reader.align_to_byte();
            }
            3 => {
                let _ = reader.read_u64_aligned();
            }
            4 => {
                let _ = reader.read_varu64();
            }
            5 => {
                let _ = reader.read_vars64();
            }
            6 => {
                let len = usize::from(data.get(idx).copied().unwrap_or(0));
                let _ = reader.read_bytes_aligned(len);
            }
            7 => {
                let target = usize::from(data.get(idx).copied().unwrap_or(0));
                let _ = reader.seek(target);
            }
            _ => {
                let _ = reader.read_vars32();
            }
        }
    }
});
