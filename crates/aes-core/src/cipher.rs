//! Key schedule and block/buffer encryption and decryption.

use crate::block::Block;
use crate::error::Error;
use crate::key::{CipherKey, RoundKeys};
use crate::round::{
    add_round_key, inv_mix_columns, inv_shift_rows, inv_sub_bytes, mix_columns, shift_rows,
    sub_bytes,
};
use crate::sbox::SBox;
use crate::trace::{TraceRecord, TraceStep};

/// Round constants for the key schedule, indexed by `i / Nk - 1`.
const RCON: [u8; 10] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1b, 0x36];

/// Words per block.
const NB: usize = 4;

fn rot_word(word: u32) -> u32 {
    word.rotate_left(8)
}

fn sub_word(word: u32, sbox: &SBox) -> u32 {
    let b0 = sbox.apply((word >> 24) as u8) as u32;
    let b1 = sbox.apply((word >> 16) as u8) as u32;
    let b2 = sbox.apply((word >> 8) as u8) as u32;
    let b3 = sbox.apply(word as u8) as u32;
    (b0 << 24) | (b1 << 16) | (b2 << 8) | b3
}

/// Expands a cipher key into `Nr + 1` round keys through the active table.
///
/// Word-oriented FIPS-197 expansion, generic over `Nk`: word `i >= Nk` is
/// `w[i - Nk] ^ T` where `T` folds in `SubWord(RotWord(w[i-1]))` and the
/// round constant at `i % Nk == 0`, plus the extra `SubWord` leg at
/// `Nk > 6 && i % Nk == 4` (dormant for 128-bit keys).
pub fn expand_key(key: &CipherKey, sbox: &SBox) -> RoundKeys {
    let nk = key.nk();
    let nr = key.rounds();
    let total_words = NB * (nr + 1);

    let mut w = vec![0u32; total_words];
    for (i, chunk) in key.as_bytes().chunks_exact(4).enumerate() {
        let bytes: [u8; 4] = chunk.try_into().expect("chunk length is four");
        w[i] = u32::from_be_bytes(bytes);
    }

    for i in nk..total_words {
        let mut temp = w[i - 1];
        if i % nk == 0 {
            temp = sub_word(rot_word(temp), sbox) ^ (u32::from(RCON[i / nk - 1]) << 24);
        } else if nk > 6 && i % nk == 4 {
            temp = sub_word(temp, sbox);
        }
        w[i] = w[i - nk] ^ temp;
    }

    let mut keys = Vec::with_capacity(nr + 1);
    for round in 0..=nr {
        let mut block = [0u8; 16];
        for word_idx in 0..NB {
            let bytes = w[round * NB + word_idx].to_be_bytes();
            block[word_idx * 4..word_idx * 4 + 4].copy_from_slice(&bytes);
        }
        keys.push(block);
    }
    RoundKeys::from_blocks(keys)
}

fn encrypt_rounds(
    block: &Block,
    round_keys: &RoundKeys,
    sbox: &SBox,
    mut trace: Option<&mut Vec<TraceRecord>>,
) -> Block {
    let nr = round_keys.last_round();
    let mut state = *block;

    if let Some(records) = trace.as_mut() {
        records.push(TraceRecord::input(&state));
    }

    add_round_key(&mut state, round_keys.get(0));
    if let Some(records) = trace.as_mut() {
        records.push(TraceRecord::keyed(0, &state, round_keys.get(0)));
    }

    for round in 1..nr {
        sub_bytes(&mut state, sbox);
        if let Some(records) = trace.as_mut() {
            records.push(TraceRecord::step(round, TraceStep::SubBytes, &state));
        }
        shift_rows(&mut state);
        if let Some(records) = trace.as_mut() {
            records.push(TraceRecord::step(round, TraceStep::ShiftRows, &state));
        }
        mix_columns(&mut state);
        if let Some(records) = trace.as_mut() {
            records.push(TraceRecord::step(round, TraceStep::MixColumns, &state));
        }
        add_round_key(&mut state, round_keys.get(round));
        if let Some(records) = trace.as_mut() {
            records.push(TraceRecord::keyed(round, &state, round_keys.get(round)));
        }
    }

    sub_bytes(&mut state, sbox);
    if let Some(records) = trace.as_mut() {
        records.push(TraceRecord::step(nr, TraceStep::SubBytes, &state));
    }
    shift_rows(&mut state);
    if let Some(records) = trace.as_mut() {
        records.push(TraceRecord::step(nr, TraceStep::ShiftRows, &state));
    }
    add_round_key(&mut state, round_keys.get(nr));
    if let Some(records) = trace.as_mut() {
        records.push(TraceRecord::keyed(nr, &state, round_keys.get(nr)));
    }

    state
}

/// Encrypts a single block with pre-expanded round keys and the active table.
pub fn encrypt_block(block: &Block, round_keys: &RoundKeys, sbox: &SBox) -> Block {
    encrypt_rounds(block, round_keys, sbox, None)
}

/// Encrypts a block while recording a snapshot after every step.
///
/// The ciphertext is identical to [`encrypt_block`]; the records are purely
/// an audit view.
pub fn encrypt_block_traced(
    block: &Block,
    round_keys: &RoundKeys,
    sbox: &SBox,
) -> (Block, Vec<TraceRecord>) {
    let mut records = Vec::new();
    let out = encrypt_rounds(block, round_keys, sbox, Some(&mut records));
    (out, records)
}

/// Decrypts a single block.
///
/// `inv_sbox` must be the inverse of the table the ciphertext was produced
/// with (see [`SBox::inverse_table`]); round keys stay those of the forward
/// table.
pub fn decrypt_block(block: &Block, round_keys: &RoundKeys, inv_sbox: &SBox) -> Block {
    let nr = round_keys.last_round();
    let mut state = *block;

    add_round_key(&mut state, round_keys.get(nr));
    inv_shift_rows(&mut state);
    inv_sub_bytes(&mut state, inv_sbox);

    for round in (1..nr).rev() {
        add_round_key(&mut state, round_keys.get(round));
        inv_mix_columns(&mut state);
        inv_shift_rows(&mut state);
        inv_sub_bytes(&mut state, inv_sbox);
    }

    add_round_key(&mut state, round_keys.get(0));

    state
}

/// Encrypts a buffer of any length under PKCS#7 padding.
///
/// The pad is always appended: a block-aligned buffer gains a full block of
/// 0x10 bytes, so ciphertext length is `len + 16 - len % 16`.
pub fn encrypt_buffer(data: &[u8], round_keys: &RoundKeys, sbox: &SBox) -> Vec<u8> {
    let pad_len = 16 - data.len() % 16;
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.resize(data.len() + pad_len, pad_len as u8);

    let mut out = Vec::with_capacity(padded.len());
    for chunk in padded.chunks_exact(16) {
        let block: Block = chunk.try_into().expect("chunk length is sixteen");
        out.extend_from_slice(&encrypt_block(&block, round_keys, sbox));
    }
    out
}

/// Decrypts a buffer and strips PKCS#7 padding.
///
/// The input length must be a multiple of 16. When the trailing byte does
/// not describe a uniform pad, the buffer is returned unstripped rather than
/// rejected, so callers can inspect raw decryptions produced with mismatched
/// keys or experimental tables.
pub fn decrypt_buffer(data: &[u8], round_keys: &RoundKeys, sbox: &SBox) -> Result<Vec<u8>, Error> {
    if data.len() % 16 != 0 {
        return Err(Error::BufferLength(data.len()));
    }
    let inv_sbox = sbox.inverse_table();

    let mut out = Vec::with_capacity(data.len());
    for chunk in data.chunks_exact(16) {
        let block: Block = chunk.try_into().expect("chunk length is sixteen");
        out.extend_from_slice(&decrypt_block(&block, round_keys, &inv_sbox));
    }
    strip_padding(&mut out);
    Ok(out)
}

fn strip_padding(data: &mut Vec<u8>) {
    let pad_len = match data.last() {
        Some(&byte) => byte as usize,
        None => return,
    };
    if pad_len == 0 || pad_len > 16 || pad_len > data.len() {
        return;
    }
    let tail = data.len() - pad_len;
    if data[tail..].iter().all(|&byte| byte == pad_len as u8) {
        data.truncate(tail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbox::AES_SBOX;
    use rand::{Rng, RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn nist_key() -> CipherKey {
        let bytes = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        CipherKey::new(bytes).unwrap()
    }

    fn nist_plain() -> Block {
        hex::decode("00112233445566778899aabbccddeeff")
            .unwrap()
            .try_into()
            .unwrap()
    }

    #[test]
    fn encrypt_matches_fips197_c1() {
        let round_keys = expand_key(&nist_key(), &AES_SBOX);
        let ct = encrypt_block(&nist_plain(), &round_keys, &AES_SBOX);
        assert_eq!(hex::encode(ct), "69c4e0d86a7b0430d8cdb78070b4c55a");
    }

    #[test]
    fn decrypt_matches_fips197_c1() {
        let round_keys = expand_key(&nist_key(), &AES_SBOX);
        let ct: Block = hex::decode("69c4e0d86a7b0430d8cdb78070b4c55a")
            .unwrap()
            .try_into()
            .unwrap();
        let inv = AES_SBOX.inverse_table();
        let pt = decrypt_block(&ct, &round_keys, &inv);
        assert_eq!(pt, nist_plain());
    }

    #[test]
    fn encrypt_matches_fips197_c2_and_c3() {
        // 192-bit key, Appendix C.2.
        let key = CipherKey::new(
            hex::decode("000102030405060708090a0b0c0d0e0f1011121314151617").unwrap(),
        )
        .unwrap();
        let round_keys = expand_key(&key, &AES_SBOX);
        assert_eq!(round_keys.last_round(), 12);
        let ct = encrypt_block(&nist_plain(), &round_keys, &AES_SBOX);
        assert_eq!(hex::encode(ct), "dda97ca4864cdfe06eaf70a0ec0d7191");

        // 256-bit key, Appendix C.3; exercises the Nk > 6 SubWord leg.
        let key = CipherKey::new(
            hex::decode("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f")
                .unwrap(),
        )
        .unwrap();
        let round_keys = expand_key(&key, &AES_SBOX);
        assert_eq!(round_keys.last_round(), 14);
        let ct = encrypt_block(&nist_plain(), &round_keys, &AES_SBOX);
        assert_eq!(hex::encode(ct), "8ea2b7ca516745bfeafc49904b496089");
    }

    #[test]
    fn key_expansion_matches_fips197_appendix_a() {
        let key = CipherKey::new(hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap()).unwrap();
        let round_keys = expand_key(&key, &AES_SBOX);
        assert_eq!(round_keys.get(0)[..], key.as_bytes()[..]);
        assert_eq!(
            hex::encode(round_keys.get(1)),
            "a0fafe1788542cb123a339392a6c7605"
        );
        assert_eq!(
            hex::encode(round_keys.get(10)),
            "d014f9a8c9ee2589e13f0cc8b6630ca6"
        );
    }

    #[test]
    fn random_round_trips() {
        let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
        for _ in 0..50 {
            let mut key_bytes = [0u8; 16];
            let mut block = [0u8; 16];
            rng.fill_bytes(&mut key_bytes);
            rng.fill_bytes(&mut block);
            let round_keys = expand_key(&CipherKey::from(key_bytes), &AES_SBOX);
            let inv = AES_SBOX.inverse_table();
            let ct = encrypt_block(&block, &round_keys, &AES_SBOX);
            let pt = decrypt_block(&ct, &round_keys, &inv);
            assert_eq!(pt, block);
        }
    }

    #[test]
    fn custom_table_round_trips() {
        // Any bijective table works; XOR with a constant is one.
        let mut table = [0u8; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = (i as u8) ^ 0x5a;
        }
        let sbox = SBox::new(table);
        assert!(sbox.is_bijective());

        let key = CipherKey::from(*b"sixteen byte key");
        let round_keys = expand_key(&key, &sbox);
        let inv = sbox.inverse_table();
        let block: Block = *b"a plaintext blk!";
        let ct = encrypt_block(&block, &round_keys, &sbox);
        assert_ne!(ct, block);
        assert_eq!(decrypt_block(&ct, &round_keys, &inv), block);
    }

    #[test]
    fn buffer_round_trips_at_every_alignment() {
        let key = CipherKey::from(*b"sixteen byte key");
        let round_keys = expand_key(&key, &AES_SBOX);
        let mut rng = ChaCha20Rng::from_seed([2u8; 32]);

        for len in [0usize, 1, 15, 16, 17, 31, 32, 100] {
            let mut data = vec![0u8; len];
            rng.fill_bytes(&mut data);
            let ct = encrypt_buffer(&data, &round_keys, &AES_SBOX);
            assert_eq!(ct.len(), len + 16 - len % 16);
            let pt = decrypt_buffer(&ct, &round_keys, &AES_SBOX).unwrap();
            assert_eq!(pt, data, "len = {len}");
        }
    }

    #[test]
    fn aligned_buffer_gains_full_pad_block() {
        let key = CipherKey::from([0u8; 16]);
        let round_keys = expand_key(&key, &AES_SBOX);
        let data = [0xabu8; 32];
        let ct = encrypt_buffer(&data, &round_keys, &AES_SBOX);
        assert_eq!(ct.len(), 48);
    }

    #[test]
    fn malformed_padding_passes_through() {
        let key = CipherKey::from([0u8; 16]);
        let round_keys = expand_key(&key, &AES_SBOX);

        // Trailing 0x00 is never a valid pad length.
        let raw = [0u8; 16];
        let ct = encrypt_block(&raw, &round_keys, &AES_SBOX);
        let out = decrypt_buffer(&ct, &round_keys, &AES_SBOX).unwrap();
        assert_eq!(out, raw);

        // Nor is a claimed length above 16.
        let mut raw = [0u8; 16];
        raw[15] = 0x11;
        let ct = encrypt_block(&raw, &round_keys, &AES_SBOX);
        let out = decrypt_buffer(&ct, &round_keys, &AES_SBOX).unwrap();
        assert_eq!(out, raw);

        // A non-uniform tail with a plausible length also passes through.
        let raw = *b"0123456789abcd\x01\x02";
        let ct = encrypt_block(&raw, &round_keys, &AES_SBOX);
        let out = decrypt_buffer(&ct, &round_keys, &AES_SBOX).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn decrypt_rejects_unaligned_input() {
        let key = CipherKey::from([0u8; 16]);
        let round_keys = expand_key(&key, &AES_SBOX);
        let result = decrypt_buffer(&[0u8; 17], &round_keys, &AES_SBOX);
        assert!(matches!(result, Err(Error::BufferLength(17))));
    }

    #[test]
    fn tracing_does_not_change_the_ciphertext() {
        let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
        let mut key_bytes = [0u8; 16];
        let mut block = [0u8; 16];
        rng.fill_bytes(&mut key_bytes);
        rng.fill_bytes(&mut block);
        let round_keys = expand_key(&CipherKey::from(key_bytes), &AES_SBOX);

        let plain = encrypt_block(&block, &round_keys, &AES_SBOX);
        let (traced, records) = encrypt_block_traced(&block, &round_keys, &AES_SBOX);
        assert_eq!(traced, plain);

        // Input + whitening + 9 full rounds of 4 steps + 3 final-round steps.
        assert_eq!(records.len(), 41);
        assert_eq!(records[0].step, TraceStep::Input);
        assert!(records
            .iter()
            .all(|r| (r.step == TraceStep::AddRoundKey) == r.round_key.is_some()));
        let last = records.last().unwrap();
        assert_eq!(last.round, 10);
        assert_eq!(last.step, TraceStep::AddRoundKey);

        // The final snapshot is the ciphertext, column-major.
        for r in 0..4 {
            for c in 0..4 {
                assert_eq!(last.state[r][c], plain[r + 4 * c]);
            }
        }
    }

    #[test]
    fn non_bijective_table_decryption_is_unreliable_but_total() {
        let mut table = *AES_SBOX.as_bytes();
        table[1] = table[0];
        let sbox = SBox::new(table);
        assert!(!sbox.is_bijective());

        let key = CipherKey::from([9u8; 16]);
        let round_keys = expand_key(&key, &sbox);
        let inv = sbox.inverse_table();
        let mut rng = ChaCha20Rng::from_seed([4u8; 32]);
        // Decryption completes for any block; correctness is not promised.
        for _ in 0..8 {
            let block: Block = rng.gen();
            let ct = encrypt_block(&block, &round_keys, &sbox);
            let _ = decrypt_block(&ct, &round_keys, &inv);
        }
    }
}
