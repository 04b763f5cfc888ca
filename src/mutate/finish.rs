use rand::Rng;
use rand::seq::IndexedRandom;
use std::fmt::Write;

use super::MutationContext;

const CONSONANTS: &[u8] = b"bcdfghjklmnprstvz";
const VOWELS: &[u8] = b"aeiou";

/// Characters the unit shows per name fragment.
pub const FRAGMENT_WIDTH: usize = 8;
pub const NAME_WIDTH: usize = FRAGMENT_WIDTH * 2;
pub const MAX_PATCH_ID: u64 = 9_999_999_999;

/// Three consonant-vowel syllables, first letter capitalised.
fn word<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut word = String::with_capacity(6);
    for _ in 0..3 {
        for letters in [CONSONANTS, VOWELS] {
            if let Some(&c) = letters.choose(rng) {
                word.push(char::from(c));
            }
        }
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => word,
    }
}

/// A pronounceable 16 character name: two words, each padded to a fragment.
pub fn patch_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = word(rng);
    let second = word(rng);
    format!("{first:<FRAGMENT_WIDTH$}{second:<FRAGMENT_WIDTH$}")
}

impl<R: Rng + ?Sized> MutationContext<'_, R> {
    /// Give the patch a fresh name and id, and store the log as its note.
    pub fn finish(&mut self) {
        let name = patch_name(&mut *self.rng);
        let id = self.rng.random_range(1..=MAX_PATCH_ID);

        let patch = &mut *self.patch;
        patch.gt100_name1 = name[..FRAGMENT_WIDTH].to_string();
        patch.gt100_name2 = name[FRAGMENT_WIDTH..].to_string();
        patch.params.patchname = name.clone();
        patch.id = format!("{id:010}");
        patch.note = self.log.clone();
        patch.name = name;

        let _ = writeln!(self.log, "  name: {}", self.patch.name);
    }
}
