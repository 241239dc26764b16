/// Text entry mirroring a numeric value.
///
/// The text is always a valid rendering of a number: digits only, at most
/// `max_digits` long, no leading zero unless the whole text is `"0"`, and
/// never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericMirror {
    text: String,
    max_digits: usize,
}

impl NumericMirror {
    pub fn new(max_digits: usize, value: u32) -> Self {
        let mut mirror = Self {
            text: String::new(),
            max_digits: max_digits.max(1),
        };
        mirror.text = mirror.normalize(&value.to_string());
        mirror
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> u32 {
        self.text.parse().unwrap_or(0)
    }

    pub fn max_digits(&self) -> usize {
        self.max_digits
    }

    /// Applies an edit from the entry field. Returns the resulting value, or
    /// `None` when the input contains anything but digits and was rejected.
    pub fn edit(&mut self, input: &str) -> Option<u32> {
        if !input.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        self.text = self.normalize(input);
        Some(self.value())
    }

    /// Deletes the last character. A single remaining character becomes "0".
    pub fn backspace(&mut self) -> u32 {
        if self.text.len() <= 1 {
            self.text = "0".to_string();
        } else {
            self.text.pop();
        }
        self.value()
    }

    /// Makes the text show `value`. Returns true when the text had to change.
    pub fn show(&mut self, value: u32) -> bool {
        if self.value() == value {
            return false;
        }
        self.text = self.normalize(&value.to_string());
        true
    }

    fn normalize(&self, digits: &str) -> String {
        let significant: String = digits
            .trim_start_matches('0')
            .chars()
            .take(self.max_digits)
            .collect();
        if significant.is_empty() {
            "0".to_string()
        } else {
            significant
        }
    }
}

#[cfg(test)]
#[path = "tests/mirror_tests.rs"]
mod tests;
