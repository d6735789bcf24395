/// Table and file name constants shared by the loader, transformer and cleanup.

// Staging tables (verbatim copies of the source files)
pub const GAME_LOG_STAGING: &str = "game_log";
pub const PARK_CODES_STAGING: &str = "park_codes";
pub const PERSON_CODES_STAGING: &str = "person_codes";
pub const TEAM_CODES_STAGING: &str = "team_codes";
pub const APPEARANCE_TYPE_STAGING: &str = "appearance_type_codes";

// Default source file names
pub const GAME_LOG_FILE: &str = "game_log.csv";
pub const PARK_CODES_FILE: &str = "park_codes.csv";
pub const PERSON_CODES_FILE: &str = "person_codes.csv";
pub const TEAM_CODES_FILE: &str = "team_codes.csv";
pub const APPEARANCE_TYPE_FILE: &str = "appearance_type.csv";

/// Staging tables that must be present before the transform step can run.
pub const REQUIRED_STAGING_TABLES: &[&str] = &[
    GAME_LOG_STAGING,
    PARK_CODES_STAGING,
    PERSON_CODES_STAGING,
    TEAM_CODES_STAGING,
];

/// Every staging table the loader may create, in load order.
pub const ALL_STAGING_TABLES: &[&str] = &[
    GAME_LOG_STAGING,
    PARK_CODES_STAGING,
    PERSON_CODES_STAGING,
    TEAM_CODES_STAGING,
    APPEARANCE_TYPE_STAGING,
];

/// Historical major leagues. Not derivable from the game log alone, which only
/// carries the codes.
pub const LEAGUES: &[(&str, &str)] = &[
    ("NL", "National League"),
    ("AL", "American League"),
    ("AA", "American Association"),
    ("FL", "Federal League"),
    ("PL", "Players League"),
    ("UA", "Union Association"),
];

/// Role codes referenced by `person_appearance`: (id, name, category).
pub const APPEARANCE_TYPES: &[(&str, &str, &str)] = &[
    ("O1", "Batter 1", "offense"),
    ("O2", "Batter 2", "offense"),
    ("O3", "Batter 3", "offense"),
    ("O4", "Batter 4", "offense"),
    ("O5", "Batter 5", "offense"),
    ("O6", "Batter 6", "offense"),
    ("O7", "Batter 7", "offense"),
    ("O8", "Batter 8", "offense"),
    ("O9", "Batter 9", "offense"),
    ("D1", "Pitcher", "defense"),
    ("D2", "Catcher", "defense"),
    ("D3", "1st Base", "defense"),
    ("D4", "2nd Base", "defense"),
    ("D5", "3rd Base", "defense"),
    ("D6", "Shortstop", "defense"),
    ("D7", "Left Field", "defense"),
    ("D8", "Center Field", "defense"),
    ("D9", "Right Field", "defense"),
    ("D10", "Unknown Position", "defense"),
    ("UHP", "Home Plate", "umpire"),
    ("U1B", "First Base", "umpire"),
    ("U2B", "Second Base", "umpire"),
    ("U3B", "Third Base", "umpire"),
    ("ULF", "Left Field", "umpire"),
    ("URF", "Right Field", "umpire"),
    ("MM", "Manager", "manager"),
    ("AWP", "Winning Pitcher", "award"),
    ("ALP", "Losing Pitcher", "award"),
    ("ASP", "Saving Pitcher", "award"),
    ("AWB", "Winning RBI Batter", "award"),
    ("PSP", "Starting Pitcher", "pitching"),
];
