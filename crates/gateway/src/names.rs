//! Random display names for chat participants.

use rand::seq::IndexedRandom;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Andrew", "Anna", "Bogdan", "Carol", "Daria", "David", "Elena", "Frank", "Grace",
    "Henry", "Iryna", "Jack", "Julia", "Kateryna", "Leo", "Maria", "Mykola", "Nina", "Oleh",
    "Olga", "Peter", "Roman", "Sofia", "Taras", "Victor", "Yulia", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Adams", "Bondarenko", "Brown", "Clark", "Davis", "Evans", "Hall", "Kovalenko", "Lewis",
    "Martin", "Melnyk", "Miller", "Moroz", "Shevchenko", "Smith", "Taylor", "Tkachenko", "Walker",
    "White", "Wilson",
];

/// Generate a "First Last" display name.
///
/// Names are not unique; the client id is the identity.
pub fn generate_display_name() -> String {
    let mut rng = rand::rng();
    let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Anonymous");
    let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("User");
    format!("{} {}", first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_name_shape() {
        for _ in 0..20 {
            let name = generate_display_name();
            let parts: Vec<&str> = name.split(' ').collect();
            assert_eq!(parts.len(), 2);
            assert!(FIRST_NAMES.contains(&parts[0]));
            assert!(LAST_NAMES.contains(&parts[1]));
        }
    }
}
