//! Position and team vocabularies

/// Position placeholder for records that carry none
pub const UNKNOWN_POSITION: &str = "UNK";

/// Team placeholder for free agents and records that carry none
pub const FREE_AGENT: &str = "FA";

/// Upper-case a position and fold provider spellings onto one vocabulary
pub fn canonical_position(raw: Option<&str>) -> String {
    let upper = raw.map(|p| p.trim().to_uppercase()).filter(|p| !p.is_empty());
    match upper.as_deref() {
        None => UNKNOWN_POSITION.to_string(),
        Some("DST") => "D/ST".to_string(),
        Some("PK") => "K".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Upper-case a team abbreviation and fold historical or alternate codes
pub fn canonical_team(raw: Option<&str>) -> String {
    let upper = raw.map(|t| t.trim().to_uppercase()).filter(|t| !t.is_empty());
    match upper.as_deref() {
        None => FREE_AGENT.to_string(),
        Some("WSH") => "WAS".to_string(),
        Some("JAC") => "JAX".to_string(),
        Some("OAK") => "LV".to_string(),
        Some("SD") => "LAC".to_string(),
        Some("STL") | Some("LA") => "LAR".to_string(),
        Some(other) => other.to_string(),
    }
}
