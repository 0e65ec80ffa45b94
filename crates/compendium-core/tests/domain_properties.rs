use compendium_core::{canonical, is_lowercase_hex, sha256_hex};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn sha256_hex_is_deterministic_and_lowercase(payload in proptest::collection::vec(any::<u8>(), 0..256)) {
        let h1 = sha256_hex(&payload);
        let h2 = sha256_hex(&payload);
        prop_assert_eq!(h1.len(), 64);
        prop_assert!(is_lowercase_hex(&h1));
        prop_assert_eq!(h1, h2);
    }

    #[test]
    fn stable_json_bytes_are_independent_of_object_key_order(a in "[a-z_]{1,12}", b in "[a-z_]{1,12}", av in any::<u32>(), bv in any::<u32>()) {
        prop_assume!(a != b);

        let left = json!({a.clone(): av, b.clone(): bv});
        let right = json!({b: bv, a: av});

        let left_bytes = canonical::stable_json_bytes(&left).expect("canonical left");
        let right_bytes = canonical::stable_json_bytes(&right).expect("canonical right");

        prop_assert_eq!(left_bytes, right_bytes);
    }
}

#[test]
fn lowercase_hex_rejects_uppercase_and_empty() {
    assert!(is_lowercase_hex("00ff9a"));
    assert!(!is_lowercase_hex("00FF9A"));
    assert!(!is_lowercase_hex(""));
    assert!(!is_lowercase_hex("xyz"));
}
