//! Key composition from an index array and a fragment array.

use serde::Serialize;

use super::pairing::ArrayPair;

/// How a selected fragment contributes to the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ComposeMode {
    /// The fragment is appended as is.
    Raw,
    /// The fragment is a hexadecimal character code and is appended as that
    /// character.
    HexDecode,
}

/// Map every index of the pair through its fragment array, in order.
///
/// The pair must have passed [`validate_mapping`](super::pairing::validate_mapping).
pub fn compose(pair: &ArrayPair, mode: ComposeMode) -> String {
    compose_fragments(pair.fragments(), pair.indices().iter().copied(), mode)
}

/// Compose from explicit indices. Every index must be in bounds.
pub fn compose_fragments(
    fragments: &[String],
    indices: impl IntoIterator<Item = usize>,
    mode: ComposeMode,
) -> String {
    let mut key = String::new();
    for index in indices {
        debug_assert!(
            index < fragments.len(),
            "index {} out of range for {} fragments",
            index,
            fragments.len()
        );
        let fragment = &fragments[index];
        match mode {
            ComposeMode::Raw => key.push_str(fragment),
            ComposeMode::HexDecode => key.push(decode_hex_char(fragment)),
        }
    }
    key
}

fn decode_hex_char(fragment: &str) -> char {
    u32::from_str_radix(fragment.trim(), 16)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}
