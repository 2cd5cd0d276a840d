use crate::{
    culture::{self, Culture},
    datetime::{self, DateParser},
    error::{Error, Result},
};
use chrono::{Local, NaiveDate};
use tracing::{error, trace};

/// Which interpretation produced a converted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// Line parsed as a number under the active culture
    Numeric,
    /// Line parsed as a date and/or time under the active culture
    DateTime,
    /// Line of the form `<index> <text>`
    CharIndexInstruction,
    /// No rule matched
    Unclassified,
}

/// A converted line together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Rule that matched
    pub outcome: ConversionOutcome,
    /// Converted text, empty when unclassified
    pub value: String,
}

impl Conversion {
    /// Conversion result for a line no rule accepted.
    #[must_use]
    pub const fn unclassified() -> Self {
        Self {
            outcome: ConversionOutcome::Unclassified,
            value: String::new(),
        }
    }

    /// Returns true if no rule matched.
    #[must_use]
    pub fn is_unclassified(&self) -> bool {
        self.outcome == ConversionOutcome::Unclassified
    }
}

type Rule = fn(&ValueClassifier, &str) -> Option<String>;

/// Rules in evaluation order; the first one that accepts a line wins.
///
/// Dates come before numbers so that a line such as `1.5` under `de-DE`
/// reads as a date. Numbers come last, after instructions, and surface
/// their invariant formatting.
const RULES: [(ConversionOutcome, Rule); 3] = [
    (ConversionOutcome::DateTime, ValueClassifier::convert_as_date_time),
    (
        ConversionOutcome::CharIndexInstruction,
        ValueClassifier::convert_as_char_index_instruction,
    ),
    (ConversionOutcome::Numeric, ValueClassifier::convert_as_number),
];

/// Classifies and converts single prepared lines.
///
/// Holds the culture of the file being processed and the reference date used
/// for inputs without a full date.
#[derive(Debug, Clone)]
pub struct ValueClassifier {
    culture: Culture,
    dates: DateParser,
}

impl ValueClassifier {
    /// Creates a classifier for the given culture, taking today's local date as reference.
    #[must_use]
    pub fn new(culture: Culture) -> Self {
        Self::with_reference_date(culture, Local::now().date_naive())
    }

    /// Creates a classifier with a fixed reference date.
    #[must_use]
    pub fn with_reference_date(culture: Culture, today: NaiveDate) -> Self {
        Self {
            dates: DateParser::new(&culture, today),
            culture,
        }
    }

    /// Culture used for parsing.
    #[must_use]
    pub const fn culture(&self) -> &Culture {
        &self.culture
    }

    /// Applies the rules in order and returns the first match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unclassified`] if no rule accepts the line.
    pub fn classify(&self, line: &str) -> Result<Conversion> {
        RULES
            .iter()
            .find_map(|&(outcome, rule)| {
                rule(self, line).map(|value| Conversion { outcome, value })
            })
            .ok_or_else(|| Error::unclassified(line))
    }

    /// Converts a line, logging and returning an empty value when no rule matches.
    #[must_use]
    pub fn convert(&self, line: &str) -> Conversion {
        match self.classify(line) {
            Ok(conversion) => {
                trace!(outcome = ?conversion.outcome, "{line:?} -> {:?}", conversion.value);
                conversion
            }
            Err(e) => {
                error!("{e}");
                Conversion::unclassified()
            }
        }
    }

    fn convert_as_date_time(&self, line: &str) -> Option<String> {
        self.dates.parse(line).map(|dt| datetime::format_invariant(&dt))
    }

    #[allow(clippy::unused_self)]
    fn convert_as_char_index_instruction(&self, line: &str) -> Option<String> {
        let mut parts = line.split(char::is_whitespace);
        let index: i32 = parts.next()?.parse().ok()?;
        let text = parts.next()?;

        let index = usize::try_from(index).ok()?;
        text.chars().nth(index).map(String::from)
    }

    fn convert_as_number(&self, line: &str) -> Option<String> {
        self.culture.parse_number(line).map(culture::format_invariant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier(culture: &str) -> ValueClassifier {
        ValueClassifier::with_reference_date(
            Culture::from_name(culture).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        )
    }

    #[test]
    fn test_char_index_instruction() {
        let conversion = classifier("").convert("1 abc");
        assert_eq!(conversion.outcome, ConversionOutcome::CharIndexInstruction);
        assert_eq!(conversion.value, "b");
    }

    #[test]
    fn test_char_index_bounds() {
        let c = classifier("");
        assert_eq!(c.convert("0 abc").value, "a");
        assert_eq!(c.convert("2 abc").value, "c");
        assert!(c.convert("3 abc").is_unclassified());
        assert!(c.convert("-1 abc").is_unclassified());
    }

    #[test]
    fn test_char_index_ignores_extra_tokens() {
        assert_eq!(classifier("").convert("2 abc def").value, "c");
    }

    #[test]
    fn test_char_index_does_not_collapse_whitespace() {
        // the second token is the empty string between the two spaces
        assert!(classifier("").convert("0  abc").is_unclassified());
    }

    #[test]
    fn test_char_index_counts_chars() {
        assert_eq!(classifier("").convert("1 привет").value, "р");
    }

    #[test]
    fn test_char_index_requires_integer() {
        assert!(classifier("").convert("x abc").is_unclassified());
        assert!(classifier("").convert("1.5 abc").is_unclassified());
    }

    #[test]
    fn test_date_time() {
        let conversion = classifier("").convert("2019-05-01");
        assert_eq!(conversion.outcome, ConversionOutcome::DateTime);
        assert_eq!(conversion.value, "05/01/2019 00:00:00");
    }

    #[test]
    fn test_month_name_dates() {
        let c = classifier("");
        for line in ["May 1, 2019", "1 May 2019"] {
            let conversion = c.convert(line);
            assert_eq!(conversion.outcome, ConversionOutcome::DateTime, "{line}");
            assert_eq!(conversion.value, "05/01/2019 00:00:00");
        }
    }

    #[test]
    fn test_month_name_wins_over_instruction() {
        let conversion = classifier("").convert("1 May");
        assert_eq!(conversion.outcome, ConversionOutcome::DateTime);
        assert_eq!(conversion.value, "05/01/2024 00:00:00");
    }

    #[test]
    fn test_rfc3339_timestamp() {
        let conversion = classifier("").convert("2019-05-01T10:30:00Z");
        assert_eq!(conversion.outcome, ConversionOutcome::DateTime);
        assert_eq!(conversion.value, "05/01/2019 10:30:00");
    }

    #[test]
    fn test_year_zero_is_not_a_date() {
        assert!(classifier("").convert("0000-01-01").is_unclassified());
    }

    #[test]
    fn test_date_wins_over_number() {
        let c = classifier("de-DE");
        assert!(c.culture().parse_number("1.5").is_some());

        let conversion = c.convert("1.5");
        assert_eq!(conversion.outcome, ConversionOutcome::DateTime);
        assert_eq!(conversion.value, "05/01/2024 00:00:00");
    }

    #[test]
    fn test_number_surfaces_in_invariant_form() {
        let conversion = classifier("ru-RU").convert("3,5");
        assert_eq!(conversion.outcome, ConversionOutcome::Numeric);
        assert_eq!(conversion.value, "3.5");

        assert_eq!(classifier("").convert("42").value, "42");
        assert_eq!(classifier("").convert("1,000.25").value, "1000.25");
    }

    #[test]
    fn test_instruction_wins_over_number() {
        // "1 234" is a grouped number under ru-RU but also a valid instruction
        let conversion = classifier("ru-RU").convert("1 234");
        assert_eq!(conversion.outcome, ConversionOutcome::CharIndexInstruction);
        assert_eq!(conversion.value, "3");
    }

    #[test]
    fn test_unclassified() {
        let c = classifier("");
        let err = c.classify("not-a-number").unwrap_err();
        assert!(err.is_unclassified());

        let conversion = c.convert("not-a-number");
        assert!(conversion.is_unclassified());
        assert!(conversion.value.is_empty());
    }

    #[test]
    fn test_single_token_is_not_an_instruction() {
        assert!(classifier("").convert("abc").is_unclassified());
    }
}
