use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Order of the numeric components in a culture's short date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// `MM/dd/yyyy`
    MonthDayYear,
    /// `dd.MM.yyyy`
    DayMonthYear,
    /// `yyyy/MM/dd`
    YearMonthDay,
}

/// Parsing conventions of a named culture.
///
/// A `Culture` is a plain value. Each file task resolves its own copy and
/// passes it to every parse call, so tasks with different cultures never share
/// mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Culture {
    name: &'static str,
    decimal_separator: char,
    group_separator: char,
    date_separator: char,
    date_order: DateOrder,
    designators: Option<(&'static str, &'static str)>,
}

const INVARIANT: Culture = Culture {
    name: "",
    decimal_separator: '.',
    group_separator: ',',
    date_separator: '/',
    date_order: DateOrder::MonthDayYear,
    designators: Some(("AM", "PM")),
};

const EN_US: Culture = Culture {
    name: "en-US",
    ..INVARIANT
};

const EN_GB: Culture = Culture {
    name: "en-GB",
    date_order: DateOrder::DayMonthYear,
    designators: Some(("am", "pm")),
    ..INVARIANT
};

const RU_RU: Culture = Culture {
    name: "ru-RU",
    decimal_separator: ',',
    group_separator: '\u{a0}',
    date_separator: '.',
    date_order: DateOrder::DayMonthYear,
    designators: None,
};

const DE_DE: Culture = Culture {
    name: "de-DE",
    decimal_separator: ',',
    group_separator: '.',
    date_separator: '.',
    date_order: DateOrder::DayMonthYear,
    designators: None,
};

const FR_FR: Culture = Culture {
    name: "fr-FR",
    decimal_separator: ',',
    group_separator: '\u{202f}',
    date_separator: '/',
    date_order: DateOrder::DayMonthYear,
    designators: None,
};

const JA_JP: Culture = Culture {
    name: "ja-JP",
    date_order: DateOrder::YearMonthDay,
    designators: Some(("午前", "午後")),
    ..INVARIANT
};

static CULTURES: Lazy<HashMap<&'static str, Culture>> = Lazy::new(|| {
    [
        ("", INVARIANT),
        ("en", Culture { name: "en", ..EN_US }),
        ("en-us", EN_US),
        ("en-gb", EN_GB),
        ("ru", Culture { name: "ru", ..RU_RU }),
        ("ru-ru", RU_RU),
        ("de", Culture { name: "de", ..DE_DE }),
        ("de-de", DE_DE),
        ("fr", Culture { name: "fr", ..FR_FR }),
        ("fr-fr", FR_FR),
        ("ja", Culture { name: "ja", ..JA_JP }),
        ("ja-jp", JA_JP),
    ]
    .into_iter()
    .collect()
});

impl Culture {
    /// Returns the invariant culture.
    #[must_use]
    pub const fn invariant() -> Self {
        INVARIANT
    }

    /// Looks up a culture by name, ignoring ASCII case.
    ///
    /// The empty name selects the invariant culture.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCulture`] if the name is not in the built-in table.
    pub fn from_name(name: &str) -> Result<Self> {
        CULTURES
            .get(name.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| Error::unknown_culture(name))
    }

    /// Culture name as configured, empty for the invariant culture.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Name suitable for log output.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        if self.name.is_empty() {
            "invariant"
        } else {
            self.name
        }
    }

    /// Decimal separator used in numbers.
    #[must_use]
    pub const fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    /// Separator between the components of a short date.
    #[must_use]
    pub const fn date_separator(&self) -> char {
        self.date_separator
    }

    /// Component order of a short date.
    #[must_use]
    pub const fn date_order(&self) -> DateOrder {
        self.date_order
    }

    /// AM/PM designators, if the culture uses a 12-hour clock.
    #[must_use]
    pub const fn designators(&self) -> Option<(&'static str, &'static str)> {
        self.designators
    }

    fn is_group_separator(&self, c: char) -> bool {
        c == self.group_separator
            || (c == ' ' && matches!(self.group_separator, '\u{a0}' | '\u{202f}'))
    }

    /// Parses a floating-point number written with this culture's separators.
    ///
    /// Accepts an optional sign, group separators in the integer part, a
    /// fractional part, an exponent, and the `NaN`/`Infinity` symbols.
    #[must_use]
    pub fn parse_number(&self, input: &str) -> Option<f64> {
        let input = input.trim();
        match input {
            "" => return None,
            "NaN" => return Some(f64::NAN),
            "Infinity" | "+Infinity" => return Some(f64::INFINITY),
            "-Infinity" => return Some(f64::NEG_INFINITY),
            _ => {}
        }

        let mut normalized = String::with_capacity(input.len() + 2);
        let mut chars = input.chars().peekable();

        if let Some(&sign @ ('+' | '-')) = chars.peek() {
            if sign == '-' {
                normalized.push('-');
            }
            chars.next();
        }

        let mut int_digits = 0usize;
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                normalized.push(c);
                int_digits += 1;
            } else if int_digits > 0 && self.is_group_separator(c) {
                // grouping is cosmetic
            } else {
                break;
            }
            chars.next();
        }

        let mut frac_digits = 0usize;
        if chars.peek() == Some(&self.decimal_separator) {
            chars.next();
            if int_digits == 0 {
                normalized.push('0');
            }
            normalized.push('.');
            while let Some(&c) = chars.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                normalized.push(c);
                frac_digits += 1;
                chars.next();
            }
            if frac_digits == 0 {
                normalized.push('0');
            }
        }

        if int_digits + frac_digits == 0 {
            return None;
        }

        if matches!(chars.peek(), Some('e' | 'E')) {
            chars.next();
            normalized.push('e');
            if let Some(&sign @ ('+' | '-')) = chars.peek() {
                normalized.push(sign);
                chars.next();
            }
            let mut exp_digits = 0usize;
            while let Some(&c) = chars.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                normalized.push(c);
                exp_digits += 1;
                chars.next();
            }
            if exp_digits == 0 {
                return None;
            }
        }

        if chars.next().is_some() {
            return None;
        }

        normalized.parse().ok()
    }
}

impl Default for Culture {
    fn default() -> Self {
        INVARIANT
    }
}

/// Formats a number in the invariant representation.
///
/// Uses the shortest digits that round-trip. Switches to `d.dddE+XX` when the
/// decimal exponent is at least 15 or below -4.
#[must_use]
pub fn format_invariant(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();

    if (-4..15).contains(&exponent) {
        value.to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}E{sign}{:02}", exponent.unsigned_abs())
    }
}
