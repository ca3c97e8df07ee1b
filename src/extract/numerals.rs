const ROMAN_TABLE: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

pub(crate) fn to_roman(mut value: u32) -> Option<String> {
    if value == 0 || value > 3999 {
        return None;
    }

    let mut out = String::new();
    for (amount, symbol) in ROMAN_TABLE {
        while value >= amount {
            out.push_str(symbol);
            value -= amount;
        }
    }
    Some(out)
}

/// Parses canonical upper-case Roman numerals. Non-canonical spellings
/// (`IIII`, `VX`) are rejected so that stray capitals are not read as numbers.
pub(crate) fn parse_roman(input: &str) -> Option<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut total = 0u32;
    let mut previous = 0u32;
    for ch in trimmed.chars().rev() {
        let value = match ch {
            'I' => 1,
            'V' => 5,
            'X' => 10,
            'L' => 50,
            'C' => 100,
            'D' => 500,
            'M' => 1000,
            _ => return None,
        };
        if value < previous {
            total = total.checked_sub(value)?;
        } else {
            total = total.checked_add(value)?;
            previous = value;
        }
    }

    (to_roman(total).as_deref() == Some(trimmed)).then_some(total)
}

/// Number carried by a structural heading token: `II`, `3`, `a 2-a`, `I^1`.
/// Superscript suffixes are dropped; the display string keeps them.
pub(crate) fn parse_structural_number(token: &str) -> Option<u32> {
    let mut value = token.trim();
    if let Some(rest) = value
        .strip_prefix("a ")
        .or_else(|| value.strip_prefix("A "))
    {
        value = rest.trim_start();
    }
    value = value
        .strip_suffix("-a")
        .or_else(|| value.strip_suffix("-A"))
        .unwrap_or(value);
    if let Some((base, _)) = value.split_once('^') {
        value = base.trim_end();
    }

    if !value.is_empty() && value.chars().all(|ch| ch.is_ascii_digit()) {
        return value.parse::<u32>().ok();
    }

    parse_roman(&value.to_ascii_uppercase())
}

pub(crate) fn normalize_article_number(raw: &str) -> String {
    let compact = raw.split_whitespace().collect::<String>();
    if compact.eq_ignore_ascii_case("unic") {
        return "unic".to_string();
    }

    match parse_roman(&compact) {
        Some(value) => value.to_string(),
        None => compact,
    }
}
