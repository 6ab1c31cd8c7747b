//! Keystroke planning and playback.
//!
//! Planning is pure so the mistake and pause behaviour can be inspected
//! without a page; playback turns every press into a key-down/key-up pair.

use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::context::CursorContext;
use crate::page::{InputEvent, Key, Page, PageError};
use crate::options::TypeOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    Press(Key),
    Pause(Duration),
}

/// The character a clumsy finger hits instead of `ch`.
fn neighbour_of(ch: char) -> char {
    char::from_u32(ch as u32 + 1)
        .or_else(|| char::from_u32((ch as u32).saturating_sub(1)))
        .unwrap_or(ch)
}

fn between<R: Rng + ?Sized>(rng: &mut R, min_ms: u64, max_ms: u64) -> Duration {
    let (lo, hi) = (min_ms.min(max_ms), min_ms.max(max_ms));
    Duration::from_millis(rng.gen_range(lo..=hi))
}

/// Plan typing `text`.
///
/// ```
/// use phantom_cursor::options::TypeOptions;
/// use phantom_cursor::page::Key;
/// use phantom_cursor::typing::{plan_typing, Keystroke};
///
/// let options = TypeOptions { mistake_rate: 1.0, ..TypeOptions::default() };
/// let plan = plan_typing(&mut rand::thread_rng(), "a", &options);
/// let keys: Vec<Key> = plan
///     .iter()
///     .filter_map(|k| match k { Keystroke::Press(key) => Some(*key), _ => None })
///     .collect();
/// assert_eq!(keys, vec![Key::Char('b'), Key::Backspace, Key::Char('a')]);
/// ```
pub fn plan_typing<R: Rng + ?Sized>(rng: &mut R, text: &str, options: &TypeOptions) -> Vec<Keystroke> {
    let keystroke = |rng: &mut R| {
        Keystroke::Pause(between(
            rng,
            options.min_keystroke_delay_ms,
            options.max_keystroke_delay_ms,
        ))
    };
    let mut plan = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        if rng.gen::<f64>() < options.mistake_rate {
            plan.push(Keystroke::Press(Key::Char(neighbour_of(ch))));
            plan.push(keystroke(rng));
            plan.push(Keystroke::Press(Key::Backspace));
            plan.push(keystroke(rng));
        }
        plan.push(Keystroke::Press(Key::Char(ch)));
        plan.push(keystroke(rng));
        if rng.gen::<f64>() < options.thinking_probability {
            plan.push(Keystroke::Pause(between(
                rng,
                options.min_thinking_ms,
                options.max_thinking_ms,
            )));
        }
    }
    plan
}

/// Play `plan` back against the page.
pub async fn play<P: Page>(ctx: &CursorContext<P>, plan: &[Keystroke]) -> Result<(), PageError> {
    debug!(target: "cursor.type", cursor = %ctx.id(), steps = plan.len(), "typing");
    for step in plan {
        match *step {
            Keystroke::Press(key) => {
                ctx.page().dispatch(InputEvent::KeyDown(key)).await?;
                ctx.page().dispatch(InputEvent::KeyUp(key)).await?;
            }
            Keystroke::Pause(duration) => tokio::time::sleep(duration).await,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn presses(plan: &[Keystroke]) -> Vec<Key> {
        plan.iter()
            .filter_map(|k| match k {
                Keystroke::Press(key) => Some(*key),
                Keystroke::Pause(_) => None,
            })
            .collect()
    }

    #[test]
    fn no_mistakes_types_text_verbatim() {
        let mut rng = StdRng::seed_from_u64(2);
        let plan = plan_typing(&mut rng, "hello", &TypeOptions::default());
        let expected: Vec<Key> = "hello".chars().map(Key::Char).collect();
        assert_eq!(presses(&plan), expected);
    }

    #[test]
    fn full_mistake_rate_corrects_every_character() {
        let mut rng = StdRng::seed_from_u64(2);
        let options = TypeOptions {
            mistake_rate: 1.0,
            ..TypeOptions::default()
        };
        let keys = presses(&plan_typing(&mut rng, "abc", &options));
        assert_eq!(keys.len(), 9);
        assert_eq!(keys.iter().filter(|k| **k == Key::Backspace).count(), 3);
        for (chunk, ch) in keys.chunks(3).zip("abc".chars()) {
            assert_eq!(chunk, [Key::Char(neighbour_of(ch)), Key::Backspace, Key::Char(ch)]);
        }
    }

    #[test]
    fn pauses_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(13);
        let options = TypeOptions {
            thinking_probability: 0.0,
            ..TypeOptions::default()
        };
        for step in plan_typing(&mut rng, "the quick brown fox", &options) {
            if let Keystroke::Pause(d) = step {
                assert!(d >= Duration::from_millis(50) && d <= Duration::from_millis(150));
            }
        }
    }

    #[test]
    fn nan_probabilities_never_fire() {
        let mut rng = StdRng::seed_from_u64(4);
        let options = TypeOptions {
            mistake_rate: f64::NAN,
            thinking_probability: f64::NAN,
            ..TypeOptions::default()
        };
        let plan = plan_typing(&mut rng, "nan", &options);
        let expected: Vec<Key> = "nan".chars().map(Key::Char).collect();
        assert_eq!(presses(&plan), expected);
        assert_eq!(plan.len(), 6);
    }

    #[test]
    fn neighbour_skips_invalid_code_points() {
        assert_eq!(neighbour_of('a'), 'b');
        assert_eq!(neighbour_of('\u{D7FF}'), '\u{D7FE}');
        assert_ne!(neighbour_of(char::MAX), char::MAX);
    }
}
