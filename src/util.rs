use std::hash::Hasher;

use rustc_hash::FxHasher;

// Fed with explicit bytes rather than `Hash` impls so the output only depends
// on the pinned hasher version.
fn finish_mixed(hasher: FxHasher) -> u64 {
    let mut z = hasher.finish();
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn unit_pair_from_hash(hash: u64) -> (f64, f64) {
    let x = (hash & 0xffff_ffff) as f64 / u32::MAX as f64;
    let y = ((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

pub(crate) fn stable_key(id: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(id.as_bytes());
    finish_mixed(hasher)
}

/// Pseudo-random pair in `[-1, 1]²`, stable for a given seed and id.
pub(crate) fn stable_pair(seed: u64, id: &str) -> (f64, f64) {
    let mut hasher = FxHasher::default();
    hasher.write_u64(seed);
    hasher.write(id.as_bytes());
    unit_pair_from_hash(finish_mixed(hasher))
}

/// Unit direction for an unordered node pair. Callers pass the keys in a
/// canonical order so both sides of the pair agree on the sign.
pub(crate) fn stable_pair_direction(seed: u64, first_key: u64, second_key: u64) -> (f64, f64) {
    let mut hasher = FxHasher::default();
    hasher.write_u64(seed);
    hasher.write_u64(first_key);
    hasher.write_u64(second_key);
    let (turn, _) = unit_pair_from_hash(finish_mixed(hasher));
    let angle = (turn + 1.0) * std::f64::consts::PI;
    (angle.cos(), angle.sin())
}

pub(crate) fn short_label(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }

    let mut shortened = name
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    shortened.push('…');
    shortened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_pair_is_repeatable_and_seed_sensitive() {
        assert_eq!(stable_pair(7, "career-42"), stable_pair(7, "career-42"));
        assert_ne!(stable_pair(7, "career-42"), stable_pair(8, "career-42"));

        let (x, y) = stable_pair(1, "skill-rust");
        assert!((-1.0..=1.0).contains(&x));
        assert!((-1.0..=1.0).contains(&y));
    }

    #[test]
    fn pair_direction_is_unit_length() {
        let (x, y) = stable_pair_direction(3, stable_key("a"), stable_key("b"));
        assert!(((x * x + y * y).sqrt() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn keys_separate_ids_and_seeds() {
        assert_eq!(stable_key("course-7"), stable_key("course-7"));
        assert_ne!(stable_key("course-7"), stable_key("course-8"));
        assert_ne!(
            stable_pair_direction(1, stable_key("a"), stable_key("b")),
            stable_pair_direction(2, stable_key("a"), stable_key("b"))
        );
    }

    #[test]
    fn short_label_truncates_long_names() {
        assert_eq!(short_label("Rust", 10), "Rust");
        assert_eq!(short_label("Introduction to Algorithms", 10), "Introduct…");
    }
}
