/// Stateful generator for hint labels over a fixed charset.
///
/// Labels follow the base-N counting sequence with width growth on
/// rollover: for `a..z` the sequence runs `a, b, .., z, aa, ab, .., zz,
/// aaa, ..`. A producer never repeats a label and never resets; global
/// uniqueness across contexts follows from every slice being drawn from
/// the same instance.
#[derive(Debug)]
pub struct HintKeyProducer {
    charset: Vec<char>,
    counter: Vec<usize>,
}

impl HintKeyProducer {
    /// Panics if `charset` is empty.
    pub fn new(charset: &str) -> Self {
        assert!(!charset.is_empty(), "hint charset must not be empty");
        Self {
            charset: charset.chars().collect(),
            counter: Vec::new(),
        }
    }

    /// Draw the next label.
    pub fn produce(&mut self) -> String {
        self.increment();
        self.counter
            .iter()
            .map(|&digit| self.charset[digit])
            .collect()
    }

    fn increment(&mut self) {
        let max = self.charset.len() - 1;
        if self.counter.iter().all(|&digit| digit == max) {
            // Saturated (or fresh): widen by one all-zero digit.
            self.counter = vec![0; self.counter.len() + 1];
            return;
        }
        for digit in self.counter.iter_mut().rev() {
            if *digit == max {
                *digit = 0;
            } else {
                *digit += 1;
                break;
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/producer_tests.rs"]
mod tests;
