#[derive(Clone, Copy, Debug)]
pub struct MinigameEntry {
    pub name: &'static str,
    pub label: &'static str,
}

pub const PUZZLE_MINIGAME: &str = "Puzzle";

pub const MINIGAME_CATALOG: &[MinigameEntry] = &[
    MinigameEntry {
        name: "HanoiTowers",
        label: "Towers of Hanoi",
    },
    MinigameEntry {
        name: "Pexeso",
        label: "Pexeso",
    },
    MinigameEntry {
        name: "Similarities",
        label: "Similarities",
    },
    MinigameEntry {
        name: "Silhouettes",
        label: "Silhouettes",
    },
    MinigameEntry {
        name: PUZZLE_MINIGAME,
        label: "Jigsaw Puzzle",
    },
    MinigameEntry {
        name: "Coloring",
        label: "Coloring Book",
    },
    MinigameEntry {
        name: "SocialGame",
        label: "Social Game",
    },
    MinigameEntry {
        name: "TotemGame",
        label: "Totem Game",
    },
];

pub fn minigame_by_name(name: &str) -> Option<&'static MinigameEntry> {
    let trimmed = name.trim();
    MINIGAME_CATALOG
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(trimmed))
}

#[derive(Clone, Copy, Debug)]
pub struct PictureEntry {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

pub const DEFAULT_PICTURE: &str = "Bonobo";

pub const PICTURE_CATALOG: &[PictureEntry] = &[
    PictureEntry {
        name: DEFAULT_PICTURE,
        width: 1024,
        height: 768,
    },
];

pub fn picture_by_name(name: &str) -> Option<&'static PictureEntry> {
    let trimmed = name.trim();
    PICTURE_CATALOG
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(trimmed))
}

/// Falls back to the default picture when `name` is not in the catalog.
pub fn picture_or_default(name: &str) -> &'static PictureEntry {
    picture_by_name(name).unwrap_or(&PICTURE_CATALOG[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_case_and_padding() {
        assert_eq!(minigame_by_name(" puzzle ").map(|e| e.name), Some("Puzzle"));
        assert_eq!(picture_by_name("bonobo").map(|e| e.width), Some(1024));
        assert!(minigame_by_name("Chess").is_none());
    }

    #[test]
    fn unknown_picture_falls_back_to_default() {
        assert_eq!(picture_or_default("missing").name, DEFAULT_PICTURE);
    }
}
