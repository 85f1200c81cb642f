//! Display numbers for top-level posts.
//!
//! The first hundred posts are `#1`..`#100`. After that posts are grouped in
//! blocks of a hundred behind a letter prefix: `#A1`..`#A100`, `#B1`, ...
//! `#Z100`, then `#AA1` and so on (bijective base-26, like spreadsheet
//! columns).

const BLOCK: u64 = 100;

pub fn format_post_number(n: u64) -> String {
    if n <= BLOCK {
        return format!("#{n}");
    }
    let idx = n - (BLOCK + 1);
    let prefix = block_letters(idx / BLOCK);
    format!("#{}{}", prefix, idx % BLOCK + 1)
}

/// Accepts `#150`, `a1`, ` #B20 ` and similar. Returns `None` for anything
/// that is not a valid display number.
pub fn parse_post_number(input: &str) -> Option<u64> {
    let cleaned = input.trim();
    let cleaned = cleaned.strip_prefix('#').unwrap_or(cleaned).trim().to_ascii_uppercase();
    if cleaned.is_empty() {
        return None;
    }

    if cleaned.bytes().all(|b| b.is_ascii_digit()) {
        let n: u64 = cleaned.parse().ok()?;
        return (n >= 1).then_some(n);
    }

    let split = cleaned.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cleaned.split_at(split);
    if letters.is_empty()
        || !letters.bytes().all(|b| b.is_ascii_uppercase())
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let num: u64 = digits.parse().ok()?;
    if !(1..=BLOCK).contains(&num) {
        return None;
    }
    let block = letters_block(letters)?;
    block
        .checked_mul(BLOCK)?
        .checked_add(BLOCK + 1)?
        .checked_add(num - 1)
}

fn block_letters(mut block: u64) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (block % 26) as u8);
        if block < 26 {
            break;
        }
        block = block / 26 - 1;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn letters_block(letters: &str) -> Option<u64> {
    let mut value: u64 = 0;
    for b in letters.bytes() {
        value = value.checked_mul(26)?.checked_add(u64::from(b - b'A') + 1)?;
    }
    Some(value - 1)
}
