/// Longest restaurant or menu value the store accepts, in encoded bytes.
pub const MAX_TEXT_BYTES: usize = 255;

/// Cut `value` to at most `max_bytes` bytes of its UTF-8 encoding.
///
/// The cut is made at the byte limit. When that limit falls inside a
/// multi-byte character, the incomplete trailing sequence is dropped so the
/// result stays valid UTF-8 and never exceeds `max_bytes`.
pub fn truncate_to_bytes(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }

    match std::str::from_utf8(&value.as_bytes()[..max_bytes]) {
        Ok(prefix) => prefix,
        Err(e) => &value[..e.valid_up_to()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_short_values_alone() {
        assert_eq!(truncate_to_bytes("Gimbap Cheonguk", MAX_TEXT_BYTES), "Gimbap Cheonguk");
        let exact = "x".repeat(MAX_TEXT_BYTES);
        assert_eq!(truncate_to_bytes(&exact, MAX_TEXT_BYTES), exact);
    }

    #[test]
    fn cuts_ascii_at_the_limit() {
        let long = "r".repeat(300);
        assert_eq!(truncate_to_bytes(&long, MAX_TEXT_BYTES).len(), 255);
    }

    #[test]
    fn counts_bytes_not_characters() {
        // 85 three-byte characters fill 255 bytes exactly.
        let hangul = "국".repeat(120);
        let cut = truncate_to_bytes(&hangul, MAX_TEXT_BYTES);
        assert_eq!(cut.len(), 255);
        assert_eq!(cut.chars().count(), 85);
    }

    #[test]
    fn drops_a_character_split_by_the_limit() {
        let mixed = format!("ab{}", "밥".repeat(100));
        let cut = truncate_to_bytes(&mixed, MAX_TEXT_BYTES);
        assert_eq!(cut.len(), 254);
        assert!(cut.starts_with("ab"));
        assert_eq!(cut.chars().count(), 2 + 84);
    }
}
