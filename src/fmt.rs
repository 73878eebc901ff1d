use chrono::NaiveDate;

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    if negative {
        format!("-${}.{dec_part}", group_thousands(int_part))
    } else {
        format!("${}.{dec_part}", group_thousands(int_part))
    }
}

/// Whole-dollar amount with thousands separators: $2,090
pub fn whole_money(val: i64) -> String {
    if val < 0 {
        format!("-${}", number(-val))
    } else {
        format!("${}", number(val))
    }
}

/// Integer with thousands separators: 1,234
pub fn number(val: i64) -> String {
    let digits = val.unsigned_abs().to_string();
    let grouped = group_thousands(&digits);
    if val < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Plain quantity: integers without a fraction, otherwise up to two decimals.
pub fn quantity(val: f64) -> String {
    if val.fract() == 0.0 {
        format!("{val:.0}")
    } else {
        let s = format!("{val:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Display form used by the sales table: dd/mm/yyyy
pub fn date_dmy(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn percent(val: f64) -> String {
    format!("{val:.1}%")
}

/// Unicode block bar of `value` scaled so that `max` fills `width` cells.
pub fn bar(value: f64, max: f64, width: usize) -> String {
    const PARTIAL: [char; 8] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉'];
    if max <= 0.0 || value <= 0.0 || width == 0 {
        return String::new();
    }
    let eighths = ((value / max).min(1.0) * width as f64 * 8.0).round() as usize;
    let mut out = "█".repeat(eighths / 8);
    if eighths % 8 > 0 {
        out.push(PARTIAL[eighths % 8]);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut with_commas = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    with_commas.chars().rev().collect()
}
