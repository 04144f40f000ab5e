// src/catalog/mod.rs
//! Read-only track and playlist catalog.
//!
//! The catalog is a static in-memory fixture: all lookups are pure
//! functions over it, with "not found" expressed as `None` or an empty
//! vector. Nothing here performs I/O.

use rand::Rng;
use rand::seq::SliceRandom;

/// Identifier of a catalog track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub u32);

/// One catalog entry. Immutable once loaded; the session-local favorite
/// overlay lives in the application, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: &'static str,
    pub artist: &'static str,
    pub album: &'static str,
    pub genre: &'static str,
    pub year: u16,
    pub duration_secs: u32,
    /// Playable-source reference.
    pub src: &'static str,
    /// Artwork reference.
    pub cover: &'static str,
    /// Accent color associated with the release.
    pub color: &'static str,
    pub favorite: bool,
}

/// A named, ordered selection of catalog tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub cover: &'static str,
    pub track_ids: &'static [u32],
    pub color: &'static str,
    pub created_at: &'static str,
}

/// Genre summary entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Genre {
    pub name: &'static str,
    pub count: u32,
    pub color: &'static str,
}

const fn track(
    id: u32,
    title: &'static str,
    artist: &'static str,
    album: &'static str,
    genre: &'static str,
    year: u16,
    duration_secs: u32,
    src: &'static str,
    cover: &'static str,
    color: &'static str,
) -> Track {
    Track {
        id: TrackId(id),
        title,
        artist,
        album,
        genre,
        year,
        duration_secs,
        src,
        cover,
        color,
        favorite: false,
    }
}

static TRACKS: [Track; 12] = [
    track(
        1,
        "Midnight Drive",
        "Synthwave Dreams",
        "Neon Nights",
        "Synthwave",
        2023,
        222,
        "audio/midnight-drive.mp3",
        "images/covers/neon-nights.jpg",
        "#8B5CF6",
    ),
    track(
        2,
        "Ocean Waves",
        "Ambient Collective",
        "Natural Sounds",
        "Ambient",
        2023,
        255,
        "audio/ocean-waves.mp3",
        "images/covers/natural-sounds.jpg",
        "#06B6D4",
    ),
    track(
        3,
        "Electric Pulse",
        "Digital Frequency",
        "Cyber City",
        "Electronic",
        2024,
        208,
        "audio/electric-pulse.mp3",
        "images/covers/cyber-city.jpg",
        "#EF4444",
    ),
    track(
        4,
        "Starlight Serenade",
        "Luna Orchestra",
        "Celestial Melodies",
        "Classical",
        2023,
        303,
        "audio/starlight-serenade.mp3",
        "images/covers/celestial-melodies.jpg",
        "#F59E0B",
    ),
    track(
        5,
        "Urban Jungle",
        "Street Beats",
        "City Life",
        "Hip Hop",
        2024,
        176,
        "audio/urban-jungle.mp3",
        "images/covers/city-life.jpg",
        "#10B981",
    ),
    track(
        6,
        "Retro Funk",
        "Groove Machine",
        "Disco Revival",
        "Funk",
        2023,
        261,
        "audio/retro-funk.mp3",
        "images/covers/disco-revival.jpg",
        "#F97316",
    ),
    track(
        7,
        "Mountain Echo",
        "Nature Sounds Co.",
        "Wilderness",
        "Nature",
        2024,
        372,
        "audio/mountain-echo.mp3",
        "images/covers/wilderness.jpg",
        "#059669",
    ),
    track(
        8,
        "Digital Dreams",
        "Pixel Perfect",
        "8-Bit Memories",
        "Chiptune",
        2023,
        213,
        "audio/digital-dreams.mp3",
        "images/covers/8bit-memories.jpg",
        "#8B5A2B",
    ),
    track(
        9,
        "Jazz Café",
        "Smooth Operators",
        "Late Night Sessions",
        "Jazz",
        2024,
        287,
        "audio/jazz-cafe.mp3",
        "images/covers/late-night-sessions.jpg",
        "#DC2626",
    ),
    track(
        10,
        "Future Bass",
        "Neon Lights",
        "Tomorrow's Sound",
        "Future Bass",
        2024,
        199,
        "audio/future-bass.mp3",
        "images/covers/tomorrows-sound.jpg",
        "#7C3AED",
    ),
    track(
        11,
        "Acoustic Sunrise",
        "Morning Dew",
        "Golden Hour",
        "Acoustic",
        2023,
        248,
        "audio/acoustic-sunrise.mp3",
        "images/covers/golden-hour.jpg",
        "#FBBF24",
    ),
    track(
        12,
        "Space Odyssey",
        "Cosmic Voyager",
        "Interstellar Journey",
        "Space Ambient",
        2024,
        334,
        "audio/space-odyssey.mp3",
        "images/covers/interstellar-journey.jpg",
        "#1E40AF",
    ),
];

static PLAYLISTS: [Playlist; 4] = [
    Playlist {
        id: 1,
        name: "Chill Vibes",
        description: "Perfect for relaxing and unwinding",
        cover: "images/playlists/chill-vibes.jpg",
        track_ids: &[2, 4, 7, 11],
        color: "#06B6D4",
        created_at: "2024-01-15",
    },
    Playlist {
        id: 2,
        name: "Electronic Mix",
        description: "High energy electronic beats",
        cover: "images/playlists/electronic-mix.jpg",
        track_ids: &[1, 3, 8, 10],
        color: "#8B5CF6",
        created_at: "2024-01-20",
    },
    Playlist {
        id: 3,
        name: "Night Drive",
        description: "Perfect soundtrack for late night drives",
        cover: "images/playlists/night-drive.jpg",
        track_ids: &[1, 6, 9, 12],
        color: "#1F2937",
        created_at: "2024-02-01",
    },
    Playlist {
        id: 4,
        name: "Focus Flow",
        description: "Instrumental tracks for productivity",
        cover: "images/playlists/focus-flow.jpg",
        track_ids: &[2, 4, 7, 8, 12],
        color: "#059669",
        created_at: "2024-02-10",
    },
];

static GENRES: [Genre; 12] = [
    Genre { name: "Synthwave", count: 1, color: "#8B5CF6" },
    Genre { name: "Ambient", count: 2, color: "#06B6D4" },
    Genre { name: "Electronic", count: 1, color: "#EF4444" },
    Genre { name: "Classical", count: 1, color: "#F59E0B" },
    Genre { name: "Hip Hop", count: 1, color: "#10B981" },
    Genre { name: "Funk", count: 1, color: "#F97316" },
    Genre { name: "Nature", count: 1, color: "#059669" },
    Genre { name: "Chiptune", count: 1, color: "#8B5A2B" },
    Genre { name: "Jazz", count: 1, color: "#DC2626" },
    Genre { name: "Future Bass", count: 1, color: "#7C3AED" },
    Genre { name: "Acoustic", count: 1, color: "#FBBF24" },
    Genre { name: "Space Ambient", count: 1, color: "#1E40AF" },
];

/// All catalog tracks in fixture order.
pub fn tracks() -> &'static [Track] {
    &TRACKS
}

/// All playlists.
pub fn playlists() -> &'static [Playlist] {
    &PLAYLISTS
}

/// Genre summary table.
pub fn genres() -> &'static [Genre] {
    &GENRES
}

/// Look up a track by id.
pub fn get_track_by_id(id: TrackId) -> Option<&'static Track> {
    TRACKS.iter().find(|t| t.id == id)
}

/// Resolve a list of ids, skipping any that do not exist.
pub fn get_tracks_by_ids(ids: &[u32]) -> Vec<&'static Track> {
    ids.iter()
        .filter_map(|&id| get_track_by_id(TrackId(id)))
        .collect()
}

/// Look up a playlist by id.
pub fn get_playlist_by_id(id: u32) -> Option<&'static Playlist> {
    PLAYLISTS.iter().find(|p| p.id == id)
}

/// A playlist together with its resolved tracks.
pub fn get_playlist_with_tracks(id: u32) -> Option<(&'static Playlist, Vec<&'static Track>)> {
    let playlist = get_playlist_by_id(id)?;
    Some((playlist, get_tracks_by_ids(playlist.track_ids)))
}

/// Case-insensitive substring search over title, artist, album, and genre.
pub fn search_tracks(query: &str) -> Vec<&'static Track> {
    let term = query.to_lowercase();
    TRACKS
        .iter()
        .filter(|t| {
            t.title.to_lowercase().contains(&term)
                || t.artist.to_lowercase().contains(&term)
                || t.album.to_lowercase().contains(&term)
                || t.genre.to_lowercase().contains(&term)
        })
        .collect()
}

/// All tracks of the given genre (exact match).
pub fn get_tracks_by_genre(genre: &str) -> Vec<&'static Track> {
    TRACKS.iter().filter(|t| t.genre == genre).collect()
}

/// Fisher-Yates shuffled copy of a track selection.
pub fn shuffle_tracks<R: Rng>(selection: &[&'static Track], rng: &mut R) -> Vec<&'static Track> {
    let mut shuffled = selection.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

/// Simple same-genre-first recommendations: tracks sharing the current
/// track's genre, then everything else, current excluded, shuffled, and
/// truncated to `limit`. With no current track, the head of the catalog.
pub fn get_recommended_tracks(
    current: Option<&Track>,
    limit: usize,
) -> Vec<&'static Track> {
    let Some(current) = current else {
        return TRACKS.iter().take(limit).collect();
    };

    let same_genre = TRACKS
        .iter()
        .filter(|t| t.genre == current.genre && t.id != current.id);
    let others = TRACKS
        .iter()
        .filter(|t| t.genre != current.genre && t.id != current.id);

    let recommended: Vec<&'static Track> = same_genre.chain(others).take(limit).collect();
    shuffle_tracks(&recommended, &mut rand::rng())
}

/// Format a second count as `m:ss`.
pub fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_get_track_by_id() {
        let t = get_track_by_id(TrackId(1)).unwrap();
        assert_eq!(t.title, "Midnight Drive");
        assert_eq!(t.duration_secs, 222);
        assert!(get_track_by_id(TrackId(99)).is_none());
    }

    #[test]
    fn test_get_tracks_by_ids_skips_missing() {
        let found = get_tracks_by_ids(&[2, 99, 4]);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, TrackId(2));
        assert_eq!(found[1].id, TrackId(4));
    }

    #[test]
    fn test_playlist_with_tracks() {
        let (playlist, tracks) = get_playlist_with_tracks(1).unwrap();
        assert_eq!(playlist.name, "Chill Vibes");
        assert_eq!(tracks.len(), 4);
        assert!(get_playlist_with_tracks(42).is_none());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let hits = search_tracks("JAZZ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Jazz Café");

        // Matches across artist and album fields too.
        let hits = search_tracks("neon");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_search_no_match_is_empty() {
        assert!(search_tracks("polka").is_empty());
    }

    #[test]
    fn test_tracks_by_genre() {
        assert_eq!(get_tracks_by_genre("Ambient").len(), 1);
        assert!(get_tracks_by_genre("Death Metal").is_empty());
    }

    #[test]
    fn test_recommendations_exclude_current_and_respect_limit() {
        let current = get_track_by_id(TrackId(1)).unwrap();
        let recs = get_recommended_tracks(Some(current), 5);
        assert_eq!(recs.len(), 5);
        assert!(recs.iter().all(|t| t.id != current.id));
    }

    #[test]
    fn test_recommendations_without_current() {
        let recs = get_recommended_tracks(None, 3);
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].id, TrackId(1));
    }

    #[test]
    fn test_shuffle_preserves_membership() {
        let all: Vec<&Track> = tracks().iter().collect();
        let mut rng = StdRng::seed_from_u64(7);
        let shuffled = shuffle_tracks(&all, &mut rng);
        assert_eq!(shuffled.len(), all.len());
        let mut ids: Vec<u32> = shuffled.iter().map(|t| t.id.0).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=12).collect::<Vec<_>>());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(222), "3:42");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(600), "10:00");
    }
}
