//! Category names offered to players and their Open Trivia DB ids.

/// Default category table, in the order players see it.
pub const DEFAULT_CATEGORIES: &[(&str, u32)] = &[
    ("General Knowledge", 9),
    ("Science", 17),
    ("History", 23),
    ("Geography", 22),
    ("Entertainment: Books", 10),
    ("Sports", 21),
    ("Anime and Manga", 31),
    ("Animals", 27),
    ("Science: Computers", 18),
    ("Science: Gadgets", 30),
    ("Cartoons and Animations", 32),
    ("Vehicles", 28),
];

/// Just the names of [`DEFAULT_CATEGORIES`], for the game's category menu.
pub fn default_category_names() -> Vec<String> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, _)| (*name).to_string())
        .collect()
}
