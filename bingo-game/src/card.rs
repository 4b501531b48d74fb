//! Card generator.

use crate::rng::GameRng;
use crate::Result;
use bingo_core::{Card, WordPool, WORDS_PER_CARD};

/// Deal a card: shuffle the pool, keep the first 24 words and lay them out
/// row-major around the free space. The pool itself is untouched.
///
/// The pool must hold at least 24 words; game creation enforces that.
pub fn generate_card(pool: &WordPool, rng: &mut GameRng) -> Result<Card> {
    let mut words = pool.words().to_vec();
    rng.shuffle(&mut words);
    words.truncate(WORDS_PER_CARD);

    Ok(Card::from_words(words)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bingo_core::{FREE_POSITION, FREE_SPACE};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn pool(n: usize) -> WordPool {
        WordPool::new((1..=n).map(|i| format!("w{}", i)).collect(), 24).unwrap()
    }

    #[test]
    fn test_exact_pool_uses_every_word() {
        let pool = pool(24);
        let card = generate_card(&pool, &mut GameRng::new(1)).unwrap();

        assert_eq!(card.word_at(FREE_POSITION), Some(FREE_SPACE));
        let on_card: HashSet<&str> = card.words().collect();
        let in_pool: HashSet<&str> = pool.words().iter().map(String::as_str).collect();
        assert_eq!(on_card, in_pool);
    }

    #[test]
    fn test_pool_is_not_modified() {
        let pool = pool(40);
        let before = pool.clone();
        generate_card(&pool, &mut GameRng::new(3)).unwrap();
        assert_eq!(pool, before);
    }

    #[test]
    fn test_large_pool_varies_subset() {
        let pool = pool(60);
        let a = generate_card(&pool, &mut GameRng::new(1)).unwrap();
        let b = generate_card(&pool, &mut GameRng::new(2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_short_pool_is_rejected() {
        let short = WordPool::new((1..=10).map(|i| format!("w{}", i)).collect(), 1).unwrap();
        assert!(generate_card(&short, &mut GameRng::new(1)).is_err());
    }

    proptest! {
        #[test]
        fn prop_card_has_24_distinct_pool_words(size in 24usize..80, seed in any::<u64>()) {
            let pool = pool(size);
            let card = generate_card(&pool, &mut GameRng::new(seed)).unwrap();

            prop_assert_eq!(card.word_at(FREE_POSITION), Some(FREE_SPACE));
            prop_assert_eq!(card.cells().iter().filter(|c| c.as_str() == FREE_SPACE).count(), 1);

            let words: HashSet<&str> = card.words().collect();
            prop_assert_eq!(words.len(), WORDS_PER_CARD);
            prop_assert!(words.iter().all(|w| pool.contains(w)));
        }
    }
}
