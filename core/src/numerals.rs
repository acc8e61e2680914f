//! English cardinal spelling for all-digit tokens.

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
    "ten", "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen", "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [&str; 7] = [
    "", "thousand", "million", "billion", "trillion", "quadrillion", "quintillion",
];

/// Returns true when the token is a non-empty run of ASCII digits.
pub fn is_numeral(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Spell a run of ASCII digits as English words, one word per element.
///
/// Compound tens are split (`21` -> `twenty one`) and no conjunction is emitted,
/// so every word is itself a plain alphabetic token. Values that do not fit a
/// `u64` are spelled digit by digit.
pub fn spell(digits: &str) -> Vec<&'static str> {
    match digits.parse::<u64>() {
        Ok(n) => cardinal(n),
        Err(_) => digits
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(|d| ONES[d as usize])
            .collect(),
    }
}

fn cardinal(mut n: u64) -> Vec<&'static str> {
    if n == 0 {
        return vec![ONES[0]];
    }
    let mut groups: Vec<u64> = Vec::with_capacity(SCALES.len());
    while n > 0 {
        groups.push(n % 1000);
        n /= 1000;
    }
    let mut words = Vec::new();
    for (scale, &group) in groups.iter().enumerate().rev() {
        if group == 0 { continue; }
        below_thousand(group, &mut words);
        if scale > 0 {
            words.push(SCALES[scale]);
        }
    }
    words
}

fn below_thousand(n: u64, words: &mut Vec<&'static str>) {
    let hundreds = (n / 100) as usize;
    let rest = (n % 100) as usize;
    if hundreds > 0 {
        words.push(ONES[hundreds]);
        words.push("hundred");
    }
    if rest >= 20 {
        words.push(TENS[rest / 10]);
        if rest % 10 != 0 {
            words.push(ONES[rest % 10]);
        }
    } else if rest > 0 {
        words.push(ONES[rest]);
    }
}
