//! Static music vocabulary
//!
//! Immutable reference tables used to turn image descriptions and
//! attributes into search terms. Everything here is process-wide
//! read-only data; the lowercase views are built once on first use.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Taxonomy category, in scan priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Genre,
    Mood,
    Instrument,
    Era,
    Location,
}

impl Category {
    /// All categories in priority order
    pub const ALL: [Category; 5] = [
        Category::Genre,
        Category::Mood,
        Category::Instrument,
        Category::Era,
        Category::Location,
    ];

    /// Terms belonging to this category, in declaration order
    pub fn terms(self) -> &'static [&'static str] {
        match self {
            Category::Genre => GENRES,
            Category::Mood => MOODS,
            Category::Instrument => INSTRUMENTS,
            Category::Era => ERAS,
            Category::Location => LOCATIONS,
        }
    }

    /// Lowercased terms paired with their display form
    pub fn lowercase_terms(self) -> &'static [(String, &'static str)] {
        &LOWERCASE_TERMS[self as usize]
    }
}

pub static GENRES: &[&str] = &[
    // Western
    "Rock", "Pop", "Hip-hop", "Rap", "R&B", "Soul", "Jazz", "Blues", "Classical",
    "Country", "Folk", "Electronic", "EDM", "Techno", "House", "Trance", "Ambient",
    "Lo-fi", "Indie", "Alternative", "Metal", "Punk", "Grunge", "Disco", "Funk",
    "Reggae", "Ska", "Dubstep", "Drum and Bass", "Trap", "Gospel", "Christian",
    "New Age", "Experimental", "Psychedelic", "Progressive", "Synthwave", "Vaporwave",
    // Cultural and regional
    "Indian", "Bollywood", "Rajasthani", "Carnatic", "Hindustani", "Bhangra", "Ghazal",
    "Latin", "Salsa", "Bachata", "Reggaeton", "Merengue", "Cumbia", "Bossa Nova", "Samba",
    "African", "Afrobeat", "Highlife", "Soukous", "Mbalax", "Juju", "Fuji",
    "Asian", "K-pop", "J-pop", "C-pop", "Mandopop", "Cantopop", "Anime",
    "Middle Eastern", "Arabic", "Turkish", "Persian", "Rai", "Gnawa",
    "European", "Flamenco", "Fado", "Celtic", "Nordic", "Polka", "Balkan",
    // Fusion
    "World Music", "Fusion", "Crossover", "World Fusion", "Ethnic Fusion",
    "Jazz Fusion", "Classical Crossover", "Folk Rock", "Country Rock", "Pop Rock",
    "Rap Rock", "Nu Metal", "Industrial Metal", "Folk Metal", "Celtic Metal",
    "Latin Jazz", "Afro-Cuban", "Indo-Jazz", "Ethno-Jazz", "Tribal House",
];

pub static MOODS: &[&str] = &[
    "Happy", "Sad", "Energetic", "Calm", "Relaxed", "Excited", "Nostalgic",
    "Romantic", "Melancholic", "Upbeat", "Chill", "Dreamy", "Intense",
    "Peaceful", "Joyful", "Somber", "Playful", "Reflective", "Passionate",
    "Angry", "Aggressive", "Anxious", "Hopeful", "Optimistic", "Pessimistic",
    "Gloomy", "Bright", "Dark", "Ethereal", "Mystical", "Spiritual", "Sacred",
    "Triumphant", "Victorious", "Defeated", "Lonely", "Isolated", "Connected",
    "Communal", "Festive", "Celebratory", "Solemn", "Reverent", "Irreverent",
    "Quirky", "Eccentric", "Conventional", "Traditional", "Modern", "Futuristic",
    "Retro", "Vintage", "Classic", "Timeless", "Ephemeral", "Fleeting", "Enduring",
    "Empowering", "Motivational", "Inspiring", "Depressing", "Uplifting", "Soothing",
];

pub static INSTRUMENTS: &[&str] = &[
    "Guitar", "Piano", "Violin", "Cello", "Drums", "Bass", "Saxophone", "Trumpet",
    "Flute", "Clarinet", "Harp", "Ukulele", "Banjo", "Mandolin", "Accordion",
    "Synthesizer", "Keyboard", "Organ", "Harmonica", "Bagpipes", "Sitar", "Tabla",
    "Santoor", "Sarod", "Veena", "Sarangi", "Bansuri", "Shehnai", "Mridangam",
    "Djembe", "Congas", "Bongos", "Marimba", "Xylophone", "Vibraphone", "Theremin",
    "Orchestral", "Symphonic", "Chamber", "String Quartet", "Brass Band", "Big Band",
    "Acoustic", "Electric", "Electronic", "Digital", "Analog", "Instrumental", "Vocal",
    "A Cappella", "Choral", "Operatic", "Falsetto", "Baritone", "Soprano", "Tenor",
    "Guitar-driven", "Piano-led", "Drum-heavy", "Bass-heavy", "String-laden", "Brass-heavy",
];

pub static ERAS: &[&str] = &[
    "50s", "60s", "70s", "80s", "90s", "2000s", "2010s", "2020s",
    "Vintage", "Retro", "Classic", "Modern", "Contemporary", "Futuristic",
    "Old School", "New School", "Golden Age", "Renaissance", "Baroque", "Classical",
    "Romantic", "Medieval", "Ancient", "Traditional", "Progressive", "Avant-garde",
    "Underground", "Mainstream", "Alternative", "Independent", "Commercial", "Indie",
];

pub static LOCATIONS: &[&str] = &[
    "Beach", "Mountain", "Forest", "Desert", "Urban", "City", "Rural", "Countryside",
    "Ocean", "Sea", "Lake", "River", "Waterfall", "Island", "Coastal", "Tropical",
    "Arctic", "Snowy", "Rainy", "Sunny", "Cloudy", "Foggy", "Misty", "Stormy",
    "Dawn", "Dusk", "Sunrise", "Sunset", "Daytime", "Nighttime", "Midnight", "Noon",
    "Spring", "Summer", "Autumn", "Fall", "Winter", "Seasonal", "Holiday", "Festival",
    "Party", "Club", "Concert", "Stadium", "Arena", "Theater", "Cinema", "Cafe",
    "Restaurant", "Bar", "Pub", "Home", "Road", "Highway", "Street", "Alley",
    "Park", "Garden", "Meadow", "Field", "Farm", "Village", "Town", "Metropolis",
    "Suburban", "Industrial", "Post-industrial", "Futuristic", "Dystopian", "Utopian",
    "India", "Rajasthan", "Jaipur", "Delhi", "Mumbai", "Goa", "Kerala", "Himalayas",
];

static LOWERCASE_TERMS: Lazy<[Vec<(String, &'static str)>; 5]> = Lazy::new(|| {
    Category::ALL.map(|category| {
        category
            .terms()
            .iter()
            .map(|term| (term.to_lowercase(), *term))
            .collect()
    })
});

// ========== Attribute-driven tables ==========

/// Genres suggested by a scene type
pub static SCENE_GENRES: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| {
        HashMap::from([
            ("nature", &["ambient", "folk", "classical", "instrumental"][..]),
            ("urban", &["hip-hop", "electronic", "pop", "r&b", "rock"][..]),
            ("indoor", &["jazz", "acoustic", "lo-fi", "indie"][..]),
            ("beach", &["reggae", "tropical", "surf rock", "chill"][..]),
            ("mountains", &["folk", "indie folk", "ambient", "cinematic"][..]),
            ("party", &["dance", "electronic", "pop", "hip-hop"][..]),
            ("celebration", &["pop", "dance", "festive", "traditional"][..]),
            ("travel", &["world music", "cinematic", "instrumental"][..]),
            ("concert", &["rock", "pop", "live music"][..]),
            ("festival", &["edm", "dance", "world music"][..]),
            ("cafe", &["jazz", "acoustic", "lo-fi", "bossa nova"][..]),
            ("restaurant", &["jazz", "classical", "ambient"][..]),
            ("sunset", &["chill", "ambient", "lo-fi", "acoustic"][..]),
            ("sunrise", &["ambient", "classical", "new age"][..]),
            ("sports", &["rock", "hip-hop", "electronic"][..]),
            ("workout", &["electronic", "hip-hop", "rock", "motivational"][..]),
            ("meditation", &["ambient", "new age", "classical", "instrumental"][..]),
            ("study", &["lo-fi", "classical", "instrumental", "ambient"][..]),
            ("work", &["lo-fi", "ambient", "instrumental", "jazz"][..]),
            ("family", &["pop", "folk", "acoustic"][..]),
            ("friends", &["pop", "rock", "hip-hop", "electronic"][..]),
        ])
    });

/// Genres suggested by a mood
pub static MOOD_GENRES: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        ("happy", &["pop", "dance", "indie pop", "funk"][..]),
        ("sad", &["indie folk", "piano", "ambient", "slow"][..]),
        ("energetic", &["electronic", "rock", "hip-hop", "dance"][..]),
        ("calm", &["ambient", "classical", "acoustic", "lo-fi"][..]),
        ("romantic", &["r&b", "soul", "acoustic", "jazz"][..]),
        ("nostalgic", &["oldies", "classic rock", "retro", "vintage"][..]),
        ("excited", &["dance", "electronic", "pop", "rock"][..]),
        ("peaceful", &["ambient", "new age", "classical", "acoustic"][..]),
        ("reflective", &["indie folk", "acoustic", "piano", "ambient"][..]),
    ])
});

/// Scene genres used when the scene is not in [`SCENE_GENRES`]
pub static DEFAULT_SCENE_GENRES: &[&str] = &["pop", "rock", "electronic"];

/// Mood genres used when the mood is not in [`MOOD_GENRES`]
pub static DEFAULT_MOOD_GENRES: &[&str] = &["pop", "rock"];

pub static HIGH_ENERGY_MOODS: &[&str] = &["happy", "energetic", "excited", "playful", "determined"];
pub static HIGH_ENERGY_EMOTIONS: &[&str] = &["joy", "enthusiasm", "anticipation", "surprise", "amusement"];
pub static LOW_ENERGY_MOODS: &[&str] = &["calm", "peaceful", "sad", "reflective", "serene", "relaxed"];
pub static LOW_ENERGY_EMOTIONS: &[&str] = &["melancholy", "peace", "contentment", "serenity"];

pub static FAST_TEMPO_MOODS: &[&str] = &["energetic", "excited", "happy", "playful"];
pub static FAST_TEMPO_EMOTIONS: &[&str] = &["joy", "enthusiasm", "anticipation", "surprise"];
pub static SLOW_TEMPO_MOODS: &[&str] = &["calm", "peaceful", "sad", "romantic", "nostalgic", "reflective"];
pub static SLOW_TEMPO_EMOTIONS: &[&str] = &["melancholy", "peace", "love", "contentment", "serenity"];

/// Emotion or mood mapped to searchable mood terms, keyed lowercase
pub static EMOTION_MOOD_TERMS: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| {
        HashMap::from([
            ("serenity", &["melancholic", "romantic", "peaceful"][..]),
            ("calmness", &["soothing", "melodious", "peaceful"][..]),
            ("joy", &["upbeat", "celebration", "festive"][..]),
            ("excitement", &["energetic", "dance", "upbeat"][..]),
            ("nostalgia", &["classic", "retro", "old"][..]),
            ("contentment", &["melodious", "soothing"][..]),
            ("reflection", &["thoughtful", "philosophical"][..]),
            ("serene", &["peaceful", "romantic", "melodious"][..]),
            ("reflective", &["thoughtful", "introspective"][..]),
            ("contemplative", &["philosophical", "deep"][..]),
        ])
    });

// ========== Regional profiles ==========

/// Language or regional catalog profile
#[derive(Debug)]
pub struct RegionProfile {
    /// Profile key as configured (`CATALOG_REGION`)
    pub key: &'static str,
    /// Term prefixed onto queries ("Malayalam")
    pub term: &'static str,
    /// Lowercase substrings that mark a track as belonging to the region
    pub indicators: &'static [&'static str],
    /// Well-known artists of the region
    pub artists: &'static [&'static str],
    /// Recent films whose soundtracks belong to the region
    pub films: &'static [&'static str],
    /// Queries that always run in regional mode
    pub staple_queries: &'static [&'static str],
    /// Match label for the staple queries
    pub staple_label: &'static str,
}

pub static REGIONS: &[RegionProfile] = &[RegionProfile {
    key: "malayalam",
    term: "Malayalam",
    indicators: &["malayalam", "malayali", "mallu", "kerala", "mollywood"],
    artists: &[
        "KS Chithra",
        "KJ Yesudas",
        "Vineeth Sreenivasan",
        "Vidhu Prathap",
        "Najim Arshad",
        "Sithara",
        "Shreya Ghoshal",
        "Haricharan",
        "Karthik",
        "Shweta Mohan",
        "Manjari",
        "Madhu Balakrishnan",
        "Swetha Mohan",
        "Unni Menon",
        "Venugopal",
        "Pradeep Somasundaran",
        "Shankar Mahadevan",
    ],
    films: &[
        "Manjummel Boys",
        "Premalu",
        "Bramayugam",
        "Aadujeevitham",
        "Guruvayoor Ambalanadayil",
        "Aavesham",
        "Ullozhukku",
    ],
    staple_queries: &["Malayalam songs", "Malayalam hits", "Malayalam trending"],
    staple_label: "Malayalam Music",
}];

/// Look up a regional profile by its configured key (case-insensitive)
pub fn region(key: &str) -> Option<&'static RegionProfile> {
    REGIONS.iter().find(|r| r.key.eq_ignore_ascii_case(key.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_tables_are_populated() {
        for category in Category::ALL {
            assert!(!category.terms().is_empty());
            assert_eq!(category.terms().len(), category.lowercase_terms().len());
        }
    }

    #[test]
    fn test_lowercase_terms_keep_display_form() {
        let (lower, display) = &Category::Genre.lowercase_terms()[0];
        assert_eq!(lower, "rock");
        assert_eq!(*display, "Rock");
    }

    #[test]
    fn test_overlapping_terms_exist_in_several_categories() {
        assert!(GENRES.contains(&"Classical") && ERAS.contains(&"Classical"));
        assert!(MOODS.contains(&"Romantic") && ERAS.contains(&"Romantic"));
    }

    #[test]
    fn test_region_lookup() {
        let profile = region(" Malayalam ").unwrap();
        assert_eq!(profile.term, "Malayalam");
        assert_eq!(profile.artists.len(), 17);
        assert!(region("klingon").is_none());
    }

    #[test]
    fn test_attribute_tables_use_lowercase_keys() {
        assert!(SCENE_GENRES.keys().all(|k| k.chars().all(|c| !c.is_uppercase())));
        assert!(MOOD_GENRES.keys().all(|k| k.chars().all(|c| !c.is_uppercase())));
        assert!(EMOTION_MOOD_TERMS.keys().all(|k| k.chars().all(|c| !c.is_uppercase())));
    }
}
