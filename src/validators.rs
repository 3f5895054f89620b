/// Input validators for login and department payloads
/// 1. Length limits
/// 2. Character whitelists / control-character rejection
/// 3. SQL injection pattern detection

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MIN_USERNAME_LENGTH: usize = 2;
const MAX_USERNAME_LENGTH: usize = 32;
const MAX_DEPARTMENT_NAME_LENGTH: usize = 64;

lazy_static! {
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap();

    static ref SQL_INJECTION_PATTERNS: [Regex; 5] = [
        // Union-based
        Regex::new(r"(?i)\s+UNION\s+").unwrap(),
        // Comments and statement separators
        Regex::new(r"(--|;|/\*|\*/)").unwrap(),
        // Time-based blind
        Regex::new(r"(?i)\b(SLEEP|WAITFOR|BENCHMARK|PG_SLEEP)\b").unwrap(),
        // Boolean tautology
        Regex::new(r#"(?i)(\bOR\b|\bAND\b)\s*(['"][0-9]*['"]|[0-9]+)\s*=\s*(['"][0-9]*['"]|[0-9]+)"#).unwrap(),
        // Stacked DDL/DML keywords
        Regex::new(r"(?i)\b(DROP|TRUNCATE|ALTER)\s+TABLE\b").unwrap(),
    ];
}

/// Usernames are ASCII identifiers: letters, digits, `_`, `.`, `-`.
pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("username".to_string()));
    }
    if trimmed.len() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::TooShort("username".to_string(), MIN_USERNAME_LENGTH));
    }
    if trimmed.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong("username".to_string(), MAX_USERNAME_LENGTH));
    }
    if !USERNAME_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("username".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Department names are free text (any script), without control characters.
/// Length is counted in characters, not bytes.
pub fn is_valid_department_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("name".to_string()));
    }
    if trimmed.chars().count() > MAX_DEPARTMENT_NAME_LENGTH {
        return Err(ValidationError::TooLong("name".to_string(), MAX_DEPARTMENT_NAME_LENGTH));
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent("name".to_string()));
    }
    if contains_sql_injection_patterns(trimmed) {
        return Err(ValidationError::PossibleSQLInjection);
    }

    Ok(trimmed.to_string())
}

fn contains_sql_injection_patterns(input: &str) -> bool {
    SQL_INJECTION_PATTERNS.iter().any(|pattern| pattern.is_match(input))
}
