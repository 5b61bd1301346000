use chrono::{DateTime, Utc};
use uuid::Uuid;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a note id: base-36 creation millis followed by 16 random base-36 chars.
///
/// The time prefix keeps ids roughly sortable; the random suffix makes
/// collisions within the same millisecond practically impossible.
pub fn generate_id(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().max(0) as u128;
    let random = Uuid::new_v4().as_u128();

    let mut id = to_base36(millis);
    let suffix = to_base36(random);
    id.extend(suffix.chars().take(16));
    id
}

fn to_base36(mut n: u128) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
