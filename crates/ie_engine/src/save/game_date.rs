use crate::sim::{GameText, MessageKey, StrRef, Tokens};

pub const DEFAULT_HOUR_SECONDS: u32 = 300;

/// Returned when the game stream is unreadable or has a foreign signature.
pub const DATE_ERROR: &str = "ERROR";

const GAME_SIGNATURE: &[u8] = b"GAME";
const SIGNATURE_LEN: usize = 8;

/// Elapsed game seconds from a `.gam` header: an 8-byte signature whose
/// first four bytes are `GAME`, then a little-endian u32.
pub fn read_game_time(bytes: &[u8]) -> Option<u32> {
    let mut cursor = 0usize;
    let signature = read_exact(bytes, &mut cursor, SIGNATURE_LEN)?;
    if !signature.starts_with(GAME_SIGNATURE) {
        return None;
    }
    let raw = read_exact(bytes, &mut cursor, 4)?;
    Some(u32::from_le_bytes(raw.try_into().ok()?))
}

fn read_exact<'a>(bytes: &'a [u8], cursor: &mut usize, len: usize) -> Option<&'a [u8]> {
    let end = cursor.saturating_add(len);
    if end > bytes.len() {
        return None;
    }
    let out = &bytes[*cursor..end];
    *cursor = end;
    Some(out)
}

/// Renders "N days and M hours" style text for a `.gam` header.
pub fn format_game_date(bytes: &[u8], hour_seconds: u32, text: &GameText<'_>) -> String {
    let Some(game_time) = read_game_time(bytes) else {
        return DATE_ERROR.to_string();
    };

    let total_hours = game_time / hour_seconds.max(1);
    let days = total_hours / 24;
    let hours = total_hours % 24;

    let mut tokens = Tokens::new();
    tokens.insert("GAMEDAYS".to_string(), days.to_string());
    tokens.insert("HOUR".to_string(), hours.to_string());

    // Languages without a plural form share one reference and one phrase.
    let day_ref = text.refs.get(MessageKey::Day);
    if day_ref.is_some() && day_ref == text.refs.get(MessageKey::Days) {
        return text.strref(StrRef::DATE2, "<GAMEDAYS> days, <HOUR> hours", &tokens);
    }

    let day_part = match days {
        0 => String::new(),
        1 => text.message(MessageKey::Day, &tokens),
        _ => text.message(MessageKey::Days, &tokens),
    };
    if hours == 0 && !day_part.is_empty() {
        return day_part;
    }

    let hour_part = if hours == 1 {
        text.message(MessageKey::Hour, &tokens)
    } else {
        text.message(MessageKey::Hours, &tokens)
    };
    if day_part.is_empty() {
        return hour_part;
    }
    let and = text.strref(StrRef::DATE1, "and", &tokens);
    format!("{day_part} {and} {hour_part}")
}
