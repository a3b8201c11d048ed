// Constrained-random password generation and a heuristic strength meter

use rand::seq::SliceRandom;
use rand::Rng;

pub const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
pub const NUMBERS: &[u8] = b"0123456789";
pub const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

pub const MIN_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 32;
pub const DEFAULT_LENGTH: usize = 16;

/// Which character classes to draw from, and how many characters to emit
///
/// The length is kept within `MIN_LENGTH..=MAX_LENGTH`, which is always large
/// enough to hold one character of every class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordConfig {
    length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: true,
        }
    }
}

impl PasswordConfig {
    pub fn new(length: usize) -> Self {
        Self::default().with_length(length)
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.set_length(length);
        self
    }

    pub fn with_classes(mut self, uppercase: bool, lowercase: bool, numbers: bool, symbols: bool) -> Self {
        self.uppercase = uppercase;
        self.lowercase = lowercase;
        self.numbers = numbers;
        self.symbols = symbols;
        self
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn set_length(&mut self, length: usize) {
        self.length = length.clamp(MIN_LENGTH, MAX_LENGTH);
    }

    /// Character sets of the selected classes, in a fixed order
    pub fn selected_classes(&self) -> Vec<&'static [u8]> {
        [
            (self.uppercase, UPPERCASE),
            (self.lowercase, LOWERCASE),
            (self.numbers, NUMBERS),
            (self.symbols, SYMBOLS),
        ]
        .into_iter()
        .filter_map(|(enabled, set)| enabled.then_some(set))
        .collect()
    }

    pub fn class_count(&self) -> usize {
        self.selected_classes().len()
    }
}

/// Generate a password with the thread-local RNG
pub fn generate(config: &PasswordConfig) -> String {
    generate_with(config, &mut rand::thread_rng())
}

/// Generate a password from the given RNG
///
/// One character is drawn from each selected class, the rest uniformly from
/// the union of the classes, then the whole buffer is shuffled. Returns an
/// empty string when no class is selected.
pub fn generate_with<R: Rng>(config: &PasswordConfig, rng: &mut R) -> String {
    let classes = config.selected_classes();
    if classes.is_empty() {
        return String::new();
    }

    let charset: Vec<u8> = classes.iter().flat_map(|set| set.iter().copied()).collect();
    let mut buffer: Vec<u8> = Vec::with_capacity(config.length);

    for set in &classes {
        buffer.push(set[rng.gen_range(0..set.len())]);
    }
    while buffer.len() < config.length {
        buffer.push(charset[rng.gen_range(0..charset.len())]);
    }

    buffer.shuffle(rng);
    buffer.into_iter().map(char::from).collect()
}

/// Strength bucket shown under the generated password
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strength {
    TooWeak,
    Weak,
    Medium,
    Good,
    Strong,
    VeryStrong,
}

impl Strength {
    /// Score the configuration: length thresholds plus class-count thresholds
    pub fn of(config: &PasswordConfig) -> Self {
        let length = config.length();
        let classes = config.class_count();

        let score = [
            length >= 8,
            length >= 12,
            length >= 16,
            classes >= 2,
            classes >= 4,
        ]
        .into_iter()
        .filter(|passed| *passed)
        .count();

        match score {
            0 => Strength::TooWeak,
            1 => Strength::Weak,
            2 => Strength::Medium,
            3 => Strength::Good,
            4 => Strength::Strong,
            _ => Strength::VeryStrong,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Strength::TooWeak => "Too Weak",
            Strength::Weak => "Weak",
            Strength::Medium => "Medium",
            Strength::Good => "Good",
            Strength::Strong => "Strong",
            Strength::VeryStrong => "Very Strong",
        }
    }

    /// Meter fill, 0-100
    pub fn percent(&self) -> u8 {
        match self {
            Strength::TooWeak => 0,
            Strength::Weak => 20,
            Strength::Medium => 40,
            Strength::Good => 60,
            Strength::Strong => 80,
            Strength::VeryStrong => 100,
        }
    }

    pub fn color(&self) -> egui::Color32 {
        match self {
            Strength::TooWeak | Strength::Weak => egui::Color32::from_rgb(239, 68, 68),
            Strength::Medium => egui::Color32::from_rgb(249, 115, 22),
            Strength::Good => egui::Color32::from_rgb(234, 179, 8),
            Strength::Strong => egui::Color32::from_rgb(34, 197, 94),
            Strength::VeryStrong => egui::Color32::from_rgb(16, 185, 129),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_no_classes_yields_empty() {
        let config = PasswordConfig::default().with_classes(false, false, false, false);
        assert_eq!(generate(&config), "");
    }

    #[test]
    fn test_length_is_clamped() {
        assert_eq!(PasswordConfig::new(2).length(), MIN_LENGTH);
        assert_eq!(PasswordConfig::new(100).length(), MAX_LENGTH);
        assert_eq!(PasswordConfig::new(20).length(), 20);
    }

    #[test]
    fn test_single_class_uses_only_that_class() {
        let config = PasswordConfig::new(24).with_classes(false, false, true, false);
        let password = generate(&config);

        assert_eq!(password.len(), 24);
        assert!(password.bytes().all(|b| NUMBERS.contains(&b)));
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let config = PasswordConfig::default();
        let a = generate_with(&config, &mut StdRng::seed_from_u64(7));
        let b = generate_with(&config, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_strength_thresholds() {
        let all = PasswordConfig::new(16);
        assert_eq!(Strength::of(&all), Strength::VeryStrong);
        assert_eq!(Strength::of(&all).label(), "Very Strong");

        let short_mixed = PasswordConfig::new(8).with_classes(true, true, false, false);
        assert_eq!(Strength::of(&short_mixed), Strength::Medium);

        let short_single = PasswordConfig::new(8).with_classes(false, true, false, false);
        assert_eq!(Strength::of(&short_single), Strength::Weak);

        let twelve_three = PasswordConfig::new(12).with_classes(true, true, true, false);
        assert_eq!(Strength::of(&twelve_three), Strength::Good);

        let long_two = PasswordConfig::new(32).with_classes(true, false, false, true);
        assert_eq!(Strength::of(&long_two), Strength::Strong);
    }

    #[test]
    fn test_strength_percent_matches_label_order() {
        assert!(Strength::Weak.percent() < Strength::Good.percent());
        assert_eq!(Strength::VeryStrong.percent(), 100);
    }
}
