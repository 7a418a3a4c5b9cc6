//! Break-time bonus earned by writing a progress note.

/// Bonus seconds for a note of `note_len` characters.
///
/// Step function: under 20 chars earns nothing, then 30/60/90 seconds at the
/// 20/50/100 thresholds, capped at 120 seconds from 200 chars on.
pub fn bonus_secs_for_note(note_len: usize) -> u32 {
    match note_len {
        0..=19 => 0,
        20..=49 => 30,
        50..=99 => 60,
        100..=199 => 90,
        _ => 120,
    }
}

/// Bonus for a note's text, counted in characters rather than bytes.
pub fn bonus_secs_for_text(text: &str) -> u32 {
    bonus_secs_for_note(text.chars().count())
}
