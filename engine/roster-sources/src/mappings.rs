//! Provider lookup tables.
//!
//! One table per provider, shared by every adapter and parser that needs it.

/// ESPN `defaultPositionId` buckets the ESPN adapter fans out over
pub const ESPN_FANTASY_POSITION_IDS: [u32; 6] = [1, 2, 3, 4, 5, 16];

/// ESPN position id to position abbreviation
pub fn espn_position(position_id: u32) -> &'static str {
    match position_id {
        1 => "QB",
        2 => "RB",
        3 => "WR",
        4 => "TE",
        5 => "K",
        16 => "D/ST",
        17 => "LB",
        18 | 22 => "DT",
        19 | 23 => "DE",
        20 => "CB",
        21 => "S",
        _ => "UNK",
    }
}

/// ESPN `proTeamId` to team abbreviation. Unknown ids (including 0, free agents) map to "FA".
pub fn espn_team(team_id: u32) -> &'static str {
    match team_id {
        1 => "ATL",
        2 => "BUF",
        3 => "CHI",
        4 => "CIN",
        5 => "CLE",
        6 => "DAL",
        7 => "DEN",
        8 => "DET",
        9 => "GB",
        10 => "TEN",
        11 => "IND",
        12 => "KC",
        13 => "LV",
        14 => "LAR",
        15 => "MIA",
        16 => "MIN",
        17 => "NE",
        18 => "NO",
        19 => "NYG",
        20 => "NYJ",
        21 => "PHI",
        22 => "ARI",
        23 => "PIT",
        24 => "LAC",
        25 => "SF",
        26 => "SEA",
        27 => "TB",
        28 => "WAS",
        29 => "CAR",
        30 => "JAX",
        33 => "BAL",
        34 => "HOU",
        _ => "FA",
    }
}

/// Team abbreviations NFL.com roster endpoints are keyed by
pub const NFL_TEAMS: [&str; 32] = [
    "ARI", "ATL", "BAL", "BUF", "CAR", "CHI", "CIN", "CLE", "DAL", "DEN", "DET", "GB", "HOU", "IND",
    "JAX", "KC", "LV", "LAC", "LAR", "MIA", "MIN", "NE", "NO", "NYG", "NYJ", "PHI", "PIT", "SEA",
    "SF", "TB", "TEN", "WAS",
];
