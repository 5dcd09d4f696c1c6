//! Small MOD images for command tests

/// Cells as (pattern, row, channel, bytes)
type Cell = (usize, usize, usize, [u8; 4]);

/// Two-order, four-channel song with one looped sample.
///
/// - order 0, row 0, channel 0: `C-3(428) 01 C20`
/// - order 0, row 1, channel 1: `C-4(214) 01 ...`
pub fn mod_bytes() -> Vec<u8> {
    build(&[])
}

/// Same song with `B00` on order 1, row 3, so it repeats forever
pub fn looping_mod_bytes() -> Vec<u8> {
    build(&[(1, 3, 3, [0x00, 0x00, 0x0B, 0x00])])
}

fn build(extra: &[Cell]) -> Vec<u8> {
    const CHANNELS: usize = 4;
    const ROWS: usize = 64;
    const SAMPLE_WORDS: u16 = 32;

    let mut data = Vec::new();

    let mut title = [0u8; 20];
    title[..7].copy_from_slice(b"fixture");
    data.extend_from_slice(&title);

    for i in 0..31 {
        let mut name = [0u8; 22];
        if i == 0 {
            name[..4].copy_from_slice(b"lead");
            data.extend_from_slice(&name);
            data.extend_from_slice(&SAMPLE_WORDS.to_be_bytes());
            data.push(0); // finetune
            data.push(64); // volume
            data.extend_from_slice(&0u16.to_be_bytes());
            data.extend_from_slice(&SAMPLE_WORDS.to_be_bytes());
        } else {
            data.extend_from_slice(&name);
            data.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 1]);
        }
    }

    let orders = [0u8, 1];
    data.push(orders.len() as u8);
    data.push(0);
    let mut order_table = [0u8; 128];
    order_table[..orders.len()].copy_from_slice(&orders);
    data.extend_from_slice(&order_table);
    data.extend_from_slice(b"M.K.");

    let cells: Vec<Cell> = [
        (0, 0, 0, [0x01, 0xAC, 0x1C, 0x20]),
        (0, 1, 1, [0x00, 0xD6, 0x10, 0x00]),
    ]
    .into_iter()
    .chain(extra.iter().copied())
    .collect();

    let pattern_size = ROWS * CHANNELS * 4;
    let mut patterns = vec![0u8; orders.len() * pattern_size];
    for (pattern, row, channel, cell) in cells {
        let offset = pattern * pattern_size + (row * CHANNELS + channel) * 4;
        patterns[offset..offset + 4].copy_from_slice(&cell);
    }
    data.extend_from_slice(&patterns);

    // Square wave, half high half low
    let half = SAMPLE_WORDS as usize;
    data.extend(std::iter::repeat_n(0x40u8, half));
    data.extend(std::iter::repeat_n(0xC0u8, half));

    data
}
