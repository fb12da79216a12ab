//! Room code generation.

use rand::Rng;
use rand::seq::IndexedRandom;

use playsync_protocol::RoomCode;

/// Upper-case letters and digits without the look-alikes `0 O 1 I L`.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Draws a random code of `len` characters from [`CODE_ALPHABET`].
pub fn generate_code(len: usize, rng: &mut impl Rng) -> RoomCode {
    let code: String = (0..len)
        .filter_map(|_| CODE_ALPHABET.choose(rng).map(|&b| char::from(b)))
        .collect();
    RoomCode::from(code)
}

/// Draws codes until one isn't taken.
pub(crate) fn generate_unique_code(
    len: usize,
    rng: &mut impl Rng,
    taken: impl Fn(&RoomCode) -> bool,
) -> RoomCode {
    loop {
        let code = generate_code(len, rng);
        if !taken(&code) {
            return code;
        }
    }
}
