//! Chinese numeral parsing for chapter numbers.

/// Parse a chapter numeral written in Arabic digits or Chinese characters.
///
/// Supports 零〇一二两三四五六七八九 with the units 十百千, so 十二 is 12 and
/// 一百零五 is 105. Returns `None` for empty input or any other character.
pub fn parse_chinese_numeral(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        return text.parse().ok();
    }

    let mut total: u32 = 0;
    let mut current: u32 = 0;

    for c in text.chars() {
        if let Some(digit) = digit_value(c) {
            current = digit;
            continue;
        }
        let unit = unit_value(c)?;
        // A bare unit such as the 十 in 十二 means one of that unit
        let multiplier = if current == 0 { 1 } else { current };
        total = total.checked_add(multiplier.checked_mul(unit)?)?;
        current = 0;
    }

    total.checked_add(current)
}

fn digit_value(c: char) -> Option<u32> {
    let value = match c {
        '零' | '〇' => 0,
        '一' => 1,
        '二' | '两' => 2,
        '三' => 3,
        '四' => 4,
        '五' => 5,
        '六' => 6,
        '七' => 7,
        '八' => 8,
        '九' => 9,
        _ => return None,
    };
    Some(value)
}

fn unit_value(c: char) -> Option<u32> {
    match c {
        '十' => Some(10),
        '百' => Some(100),
        '千' => Some(1000),
        _ => None,
    }
}
