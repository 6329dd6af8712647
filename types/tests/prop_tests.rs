use proptest::prelude::*;

use mchain_types::{AccountId, TokenAmount, ACCOUNT_ID_LEN};

fn account_bytes() -> impl Strategy<Value = [u8; ACCOUNT_ID_LEN]> {
    prop::collection::vec(any::<u8>(), ACCOUNT_ID_LEN).prop_map(|v| {
        let mut out = [0u8; ACCOUNT_ID_LEN];
        out.copy_from_slice(&v);
        out
    })
}

proptest! {
    /// Hex rendering parses back to the same account.
    #[test]
    fn account_hex_roundtrip(bytes in account_bytes()) {
        let id = AccountId::new(bytes);
        let parsed = AccountId::from_hex(&id.to_hex()).unwrap();
        prop_assert_eq!(parsed, id);
    }

    /// AccountId::is_null is true only for all-zero bytes.
    #[test]
    fn account_is_null_correct(bytes in account_bytes()) {
        prop_assert_eq!(AccountId::new(bytes).is_null(), bytes == [0u8; ACCOUNT_ID_LEN]);
    }

    /// Account ordering follows byte ordering.
    #[test]
    fn account_ordering(a in account_bytes(), b in account_bytes()) {
        prop_assert_eq!(AccountId::new(a) <= AccountId::new(b), a <= b);
    }

    /// checked_add then checked_sub restores the original amount.
    #[test]
    fn amount_add_sub_inverse(a in 0u128..u128::MAX / 2, b in 0u128..u128::MAX / 2) {
        let x = TokenAmount::new(a);
        let y = TokenAmount::new(b);
        let sum = x.checked_add(y).unwrap();
        prop_assert_eq!(sum.checked_sub(y), Some(x));
    }

    /// checked_sub fails exactly when the result would be negative.
    #[test]
    fn amount_checked_sub_never_negative(a in any::<u128>(), b in any::<u128>()) {
        let result = TokenAmount::new(a).checked_sub(TokenAmount::new(b));
        prop_assert_eq!(result.is_none(), b > a);
    }

    /// checked_sum agrees with u128 checked arithmetic.
    #[test]
    fn amount_checked_sum_matches_u128(values in prop::collection::vec(any::<u64>(), 0..32)) {
        let expected: u128 = values.iter().map(|v| u128::from(*v)).sum();
        let amounts = values.iter().map(|v| TokenAmount::from(*v));
        prop_assert_eq!(TokenAmount::checked_sum(amounts), Some(TokenAmount::new(expected)));
    }

    /// from_whole equals whole * 10^decimals whenever that fits.
    #[test]
    fn amount_from_whole_scales(whole in 0u128..1_000_000_000_000, decimals in 0u8..=18) {
        let expected = whole * 10u128.pow(u32::from(decimals));
        prop_assert_eq!(TokenAmount::from_whole(whole, decimals), Some(TokenAmount::new(expected)));
    }
}
