// Engine tests: round trips, tamper detection, envelope shape, nonce
// freshness, key hygiene and concurrent use.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    use aead_envelope::constants::{MIN_ENVELOPE_LEN, NONCE_LEN_12, TAG_LEN};
    use aead_envelope::prelude::*;
    use chrono::{DateTime, Duration, Utc};
    use proptest::prelude::*;

    /// Delegates to the OS source and counts every draw.
    #[derive(Debug, Default)]
    struct RecordingRandom {
        draws: AtomicUsize,
    }

    impl RecordingRandom {
        fn draws(&self) -> usize {
            self.draws.load(Ordering::SeqCst)
        }
    }

    impl RandomSource for RecordingRandom {
        fn fill(&self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.draws.fetch_add(1, Ordering::SeqCst);
            OsRandom.fill(dest)
        }
    }

    #[derive(Debug)]
    struct FailingRandom;

    impl RandomSource for FailingRandom {
        fn fill(&self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::new(std::io::ErrorKind::Other, "no entropy")))
        }
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Engine that leaves keys alone, so one key can serve many calls.
    fn reusable_engine() -> EnvelopeCipher {
        EnvelopeCipher::new(CipherConfig::default().without_key_wipe())
    }

    fn recording_engine(config: CipherConfig) -> (EnvelopeCipher, Arc<RecordingRandom>) {
        let random = Arc::new(RecordingRandom::default());
        (EnvelopeCipher::with_random(config, random.clone()), random)
    }

// # 1. Round trips

    #[test]
    fn round_trip_with_aad() {
        init_tracing();
        let engine = reusable_engine();
        let mut key = [0x24u8; 32];

        let env = engine.encrypt(&mut key, b"hello world", Some(b"user:17")).unwrap();
        let pt = engine.decrypt(&mut key, &env, Some(b"user:17")).unwrap();
        assert_eq!(pt, b"hello world");
    }

    #[test]
    fn round_trip_every_aes_key_size() {
        let engine = reusable_engine();
        for len in [16, 24, 32] {
            let mut key = vec![0x5au8; len];
            let env = engine.encrypt(&mut key, b"sized", None).unwrap();
            assert_eq!(engine.decrypt(&mut key, &env, None).unwrap(), b"sized");
        }
    }

    #[test]
    fn chacha_engine_round_trip() {
        let engine = EnvelopeCipher::new(
            CipherConfig::default()
                .with_suite(CipherSuite::ChaCha20Poly1305)
                .without_key_wipe(),
        );
        let mut key = [0x77u8; 32];
        let env = engine.encrypt(&mut key, b"stream cipher", Some(b"ctx")).unwrap();
        assert_eq!(engine.decrypt(&mut key, &env, Some(b"ctx")).unwrap(), b"stream cipher");

        let mut short = [0x77u8; 16];
        let err = engine.encrypt(&mut short, b"x", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKey);
    }

    #[test]
    fn suites_do_not_interoperate() {
        let aes = reusable_engine();
        let chacha = EnvelopeCipher::new(
            CipherConfig::default()
                .with_suite(CipherSuite::ChaCha20Poly1305)
                .without_key_wipe(),
        );
        let mut key = [3u8; 32];
        let env = aes.encrypt(&mut key, b"payload", None).unwrap();
        assert!(matches!(chacha.decrypt(&mut key, &env, None), Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let engine = reusable_engine();
        let mut key = [1u8; 16];
        let env = engine.encrypt(&mut key, b"", None).unwrap();
        assert_eq!(env.len(), MIN_ENVELOPE_LEN);
        assert!(engine.decrypt(&mut key, &env, None).unwrap().is_empty());
    }

    #[test]
    fn absent_and_empty_aad_are_equivalent() {
        let engine = reusable_engine();
        let mut key = [1u8; 16];
        let env = engine.encrypt(&mut key, b"x", None).unwrap();
        assert_eq!(engine.decrypt(&mut key, &env, Some(b"")).unwrap(), b"x");

        let env = engine.encrypt(&mut key, b"y", Some(b"")).unwrap();
        assert_eq!(engine.decrypt(&mut key, &env, None).unwrap(), b"y");
    }

// # 2. Envelope shape and nonces

    #[test]
    fn envelope_shape() {
        let engine = reusable_engine();
        let mut key = [9u8; 32];
        let env = engine.encrypt(&mut key, b"", None).unwrap();
        assert_eq!(env.len(), 29);
        assert_eq!(env[0] as usize, NONCE_LEN_12);

        let env = engine.encrypt(&mut key, &[0u8; 100], None).unwrap();
        assert_eq!(env.len(), 1 + NONCE_LEN_12 + 100 + TAG_LEN);
    }

    #[test]
    fn same_input_gives_different_envelopes() {
        let engine = reusable_engine();
        let mut key = [9u8; 32];
        let a = engine.encrypt(&mut key, b"same", Some(b"same")).unwrap();
        let b = engine.encrypt(&mut key, b"same", Some(b"same")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn nonces_do_not_repeat() {
        let engine = reusable_engine();
        let mut key = [9u8; 16];
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let env = engine.encrypt(&mut key, b"n", None).unwrap();
            let mut nonce = [0u8; NONCE_LEN_12];
            nonce.copy_from_slice(&env[1..1 + NONCE_LEN_12]);
            assert!(seen.insert(nonce), "nonce repeated");
        }
    }

// # 3. Fail closed

    #[test]
    fn every_flipped_bit_is_rejected() {
        let engine = reusable_engine();
        let mut key = [0x11u8; 32];
        let env = engine.encrypt(&mut key, b"tamper target", Some(b"aad")).unwrap();

        for i in 0..env.len() {
            for bit in 0..8 {
                let mut t = env.clone();
                t[i] ^= 1 << bit;
                let result = engine.decrypt(&mut key, &t, Some(b"aad"));
                if i == 0 {
                    // A changed length prefix may no longer frame at all.
                    let kind = result.unwrap_err().kind();
                    assert!(
                        kind == ErrorKind::AuthenticationFailure || kind == ErrorKind::MalformedEnvelope,
                        "prefix bit {} gave {}",
                        bit,
                        kind
                    );
                } else {
                    assert!(
                        matches!(result, Err(CryptoError::AuthenticationFailure)),
                        "byte {} bit {} was not an authentication failure",
                        i,
                        bit
                    );
                }
            }
        }
    }

    #[test]
    fn wrong_aad_and_wrong_key_fail() {
        let engine = reusable_engine();
        let mut key = [0x11u8; 32];
        let env = engine.encrypt(&mut key, b"secret", Some(b"tenant-a")).unwrap();

        assert!(matches!(engine.decrypt(&mut key, &env, Some(b"tenant-b")), Err(CryptoError::AuthenticationFailure)));
        assert!(matches!(engine.decrypt(&mut key, &env, None), Err(CryptoError::AuthenticationFailure)));

        let mut other = [0x12u8; 32];
        assert!(matches!(engine.decrypt(&mut other, &env, Some(b"tenant-a")), Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn truncated_envelopes_fail() {
        let engine = reusable_engine();
        let mut key = [0x11u8; 32];
        let env = engine.encrypt(&mut key, b"some plaintext", None).unwrap();

        for cut in 0..env.len() {
            assert!(engine.decrypt(&mut key, &env[..cut], None).is_err(), "prefix of {} bytes accepted", cut);
        }
    }

    #[test]
    fn short_input_is_malformed() {
        let engine = reusable_engine();
        let mut key = [0x11u8; 32];
        let err = engine.decrypt(&mut key, &[12, 0, 0, 0, 0], None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEnvelope);
        assert!(matches!(engine.decrypt(&mut key, &[], None), Err(CryptoError::MalformedEnvelope(_))));
    }

// # 4. Key hygiene

    #[test]
    fn invalid_key_has_no_side_effects() {
        let (engine, random) = recording_engine(CipherConfig::default());
        let mut key = [7u8; 15];

        let err = engine.encrypt(&mut key, b"x", None).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKey { actual: 15, .. }));
        let err = engine.decrypt(&mut key, &[0u8; 40], None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKey);

        assert_eq!(random.draws(), 0);
        assert_eq!(key, [7u8; 15]);
    }

    #[test]
    fn key_is_scrubbed_after_success() {
        let (engine, random) = recording_engine(CipherConfig::default());
        let original = [0x42u8; 32];

        let mut key = original;
        let env = engine.encrypt(&mut key, b"one shot", None).unwrap();
        assert_ne!(key, original);
        // nonce, then refill
        assert_eq!(random.draws(), 2);

        let mut key = original;
        assert_eq!(engine.decrypt(&mut key, &env, None).unwrap(), b"one shot");
        assert_ne!(key, original);
        assert_eq!(random.draws(), 3);
    }

    #[test]
    fn key_is_scrubbed_after_failures() {
        let engine = EnvelopeCipher::default();
        let original = [0x42u8; 32];

        let mut key = original;
        let env = engine.encrypt(&mut key, b"data", Some(b"a")).unwrap();

        let mut key = original;
        assert!(matches!(engine.decrypt(&mut key, &env, Some(b"b")), Err(CryptoError::AuthenticationFailure)));
        assert_ne!(key, original);

        let mut key = original;
        assert!(matches!(engine.decrypt(&mut key, &[1, 2, 3, 4, 5], None), Err(CryptoError::MalformedEnvelope(_))));
        assert_ne!(key, original);
    }

    #[test]
    fn scrubbed_key_no_longer_decrypts() {
        let engine = EnvelopeCipher::default();
        let mut key = [0x42u8; 16];
        let env = engine.encrypt(&mut key, b"data", None).unwrap();
        assert!(matches!(engine.decrypt(&mut key, &env, None), Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn wipe_disabled_leaves_key_intact() {
        let (engine, random) = recording_engine(CipherConfig::default().without_key_wipe());
        let mut key = [0x42u8; 24];
        let env = engine.encrypt(&mut key, b"keep", None).unwrap();
        engine.decrypt(&mut key, &env, None).unwrap();
        assert_eq!(key, [0x42u8; 24]);
        assert_eq!(random.draws(), 1);
    }

    #[test]
    fn entropy_failure_surfaces_and_still_destroys_key() {
        let engine = EnvelopeCipher::with_random(CipherConfig::default(), Arc::new(FailingRandom));
        let mut key = [0x42u8; 32];
        let err = engine.encrypt(&mut key, b"x", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EntropyUnavailable);
        assert_eq!(key, [0u8; 32]);
    }

// # 5. Structured and timestamp AAD

    #[test]
    fn value_sequences_bind_in_order() {
        let engine = reusable_engine();
        let mut key = [5u8; 32];
        let aad = [AadValue::from("order-42"), AadValue::from(2024i64)];

        let env = engine.encrypt_with_values(&mut key, b"invoice", &aad).unwrap();
        assert_eq!(engine.decrypt_with_values(&mut key, &env, &aad).unwrap(), b"invoice");

        let reversed = [AadValue::from(2024i64), AadValue::from("order-42")];
        assert!(matches!(
            engine.decrypt_with_values(&mut key, &env, &reversed),
            Err(CryptoError::AuthenticationFailure)
        ));
    }

    #[test]
    fn single_value_is_one_element_sequence() {
        let engine = reusable_engine();
        let mut key = [5u8; 32];
        let env = engine.encrypt_with_values(&mut key, b"p", &[AadValue::from(true)]).unwrap();

        let encoded = aead_envelope::crypto::encode_aad(&[AadValue::Bool(true)]).unwrap();
        assert_eq!(engine.decrypt(&mut key, &env, Some(&encoded)).unwrap(), b"p");
    }

    #[test]
    fn unserializable_aad_fails_before_touching_key() {
        let (engine, random) = recording_engine(CipherConfig::default());
        let mut map = std::collections::HashMap::new();
        map.insert((1u8, 2u8), 3u8);

        let mut key = [5u8; 32];
        let err = AadValue::structured(&map).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SerializationFailure);
        assert_eq!(key, [5u8; 32]);
        assert_eq!(random.draws(), 0);

        // the engine is still usable
        let env = engine.encrypt(&mut key, b"ok", None).unwrap();
        assert_eq!(env.len(), MIN_ENVELOPE_LEN + 2);
    }

    #[test]
    fn timestamp_binding_needs_exact_instant() {
        let engine = reusable_engine();
        let mut key = [6u8; 32];
        let at: DateTime<Utc> = DateTime::from_timestamp(1_700_000_000, 250_000_000).unwrap();

        let env = engine.encrypt_at(&mut key, b"ticket", at).unwrap();
        assert_eq!(engine.decrypt_at(&mut key, &env, at).unwrap(), b"ticket");
        assert!(matches!(
            engine.decrypt_at(&mut key, &env, at + Duration::seconds(1)),
            Err(CryptoError::AuthenticationFailure)
        ));
        assert!(matches!(engine.decrypt(&mut key, &env, None), Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn current_timestamp_is_bound() {
        let engine = reusable_engine();
        let mut key = [6u8; 32];
        let env = engine.encrypt_with_timestamp(&mut key, b"now").unwrap();
        assert_eq!(env.len(), MIN_ENVELOPE_LEN + 3);
        assert!(matches!(engine.decrypt(&mut key, &env, None), Err(CryptoError::AuthenticationFailure)));
    }

// # 6. Concurrency

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EnvelopeCipher>();
    }

    #[test]
    fn shared_engine_across_threads() {
        let engine = Arc::new(EnvelopeCipher::new(CipherConfig::default()));

        let handles: Vec<_> = (0..8u8)
            .map(|t| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    for i in 0..50u8 {
                        let material = [t.wrapping_mul(31).wrapping_add(i); 32];
                        let plaintext = vec![t, i, 0xAB];

                        let mut key = material;
                        let env = engine.encrypt(&mut key, &plaintext, Some(&[t])).unwrap();
                        let mut key = material;
                        assert_eq!(engine.decrypt(&mut key, &env, Some(&[t])).unwrap(), plaintext);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
    }

// # 7. Property tests

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_round_trip(
            key in proptest::collection::vec(any::<u8>(), 32),
            plaintext in proptest::collection::vec(any::<u8>(), 0..1024),
            aad in proptest::option::of(proptest::collection::vec(any::<u8>(), 0..64)),
        ) {
            let engine = reusable_engine();
            let mut key = key;
            let env = engine.encrypt(&mut key, &plaintext, aad.as_deref()).unwrap();
            prop_assert_eq!(env.len(), MIN_ENVELOPE_LEN + plaintext.len());
            prop_assert_eq!(engine.decrypt(&mut key, &env, aad.as_deref()).unwrap(), plaintext);
        }

        #[test]
        fn prop_garbage_never_panics(wire in proptest::collection::vec(any::<u8>(), 0..128)) {
            let engine = reusable_engine();
            let mut key = [0u8; 16];
            prop_assert!(engine.decrypt(&mut key, &wire, None).is_err());
        }
    }
}
