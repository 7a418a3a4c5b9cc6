//! Background music tracks, one list per session type.

use serde::Serialize;

use crate::timer::SessionType;

/// Price of every non-free track.
pub const TRACK_PRICE: u32 = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MusicTrack {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
    pub session_type: SessionType,
    /// 0 for tracks that are always unlocked.
    pub price: u32,
}

impl MusicTrack {
    pub fn is_free(&self) -> bool {
        self.price == 0
    }
}

const fn track(
    id: u32,
    name: &'static str,
    description: &'static str,
    emoji: &'static str,
    session_type: SessionType,
    price: u32,
) -> MusicTrack {
    MusicTrack {
        id,
        name,
        description,
        emoji,
        session_type,
        price,
    }
}

const WORK: SessionType = SessionType::Work;
const SHORT: SessionType = SessionType::ShortBreak;
const LONG: SessionType = SessionType::LongBreak;

const WORK_TRACKS: &[MusicTrack] = &[
    track(1, "Cosmos", "Spacey, contemplative ambience", "🌌", WORK, 0),
    track(2, "Electro Lofi", "Relaxed electronic beats", "🎹", WORK, TRACK_PRICE),
    track(3, "Nostalgia", "Sounds that bring back memories", "🌅", WORK, TRACK_PRICE),
    track(4, "Piano Focus", "Piano for concentration", "🎹", WORK, TRACK_PRICE),
    track(5, "Smooth Jazz", "Laid-back, productive jazz", "🎷", WORK, TRACK_PRICE),
    track(6, "NYC Nights", "Late-night city ambience", "🌃", WORK, TRACK_PRICE),
    track(7, "Quiet Fields", "Rural calm", "🌾", WORK, TRACK_PRICE),
    track(8, "With Love", "Warm, motivating rhythm", "💚", WORK, TRACK_PRICE),
];

const SHORT_BREAK_TRACKS: &[MusicTrack] = &[
    track(11, "Rain Outside", "Soothing rainfall", "🌧️", SHORT, 0),
    track(12, "Your Break", "A well-earned pause", "☁️", SHORT, TRACK_PRICE),
    track(13, "Progress", "Celebrate how far you got", "📈", SHORT, TRACK_PRICE),
    track(14, "Soft Guitar", "Gentle guitar melodies", "🎸", SHORT, TRACK_PRICE),
    track(15, "Cold Summit", "Crisp mountain air", "🏔️", SHORT, TRACK_PRICE),
    track(16, "Spring", "Renewal and energy", "🌸", SHORT, TRACK_PRICE),
];

const LONG_BREAK_TRACKS: &[MusicTrack] = &[
    track(21, "Japanese Zen", "Deep eastern calm", "🎋", LONG, 0),
    track(22, "Celebration", "Enjoy the achievement", "🎉", LONG, TRACK_PRICE),
    track(23, "Party", "A moment of joy", "🎊", LONG, TRACK_PRICE),
    track(24, "Inner Peace", "Complete stillness", "🕊️", LONG, TRACK_PRICE),
    track(25, "Serene Ice", "Winter quiet", "❄️", LONG, TRACK_PRICE),
    track(26, "Grand Finale", "An epic close", "🎵", LONG, TRACK_PRICE),
];

/// Tracks for one session type, in shop order.
pub fn tracks_by_type(session_type: SessionType) -> &'static [MusicTrack] {
    match session_type {
        SessionType::Work => WORK_TRACKS,
        SessionType::ShortBreak => SHORT_BREAK_TRACKS,
        SessionType::LongBreak => LONG_BREAK_TRACKS,
    }
}

pub fn all_tracks() -> impl Iterator<Item = &'static MusicTrack> {
    SessionType::ALL
        .into_iter()
        .flat_map(|session| tracks_by_type(session).iter())
}

pub fn track_by_id(id: u32) -> Option<&'static MusicTrack> {
    all_tracks().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_free_track_per_session_type() {
        for session in SessionType::ALL {
            let free: Vec<_> = tracks_by_type(session).iter().filter(|t| t.is_free()).collect();
            assert_eq!(free.len(), 1, "{session:?}");
        }
        assert_eq!(all_tracks().count(), 20);
    }

    #[test]
    fn tracks_are_listed_under_their_own_session_type() {
        for session in SessionType::ALL {
            assert!(tracks_by_type(session).iter().all(|t| t.session_type == session));
        }
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(track_by_id(14).map(|t| t.name), Some("Soft Guitar"));
        assert_eq!(track_by_id(21).map(|t| t.price), Some(0));
        assert!(track_by_id(9).is_none());
    }
}
