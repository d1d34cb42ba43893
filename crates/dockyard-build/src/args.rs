//! ビルド引数のマージ
//!
//! サービスが宣言したビルド引数に外部から与えた上書き値を適用します。

use dockyard_core::BuildArgs;
use std::collections::{BTreeMap, HashMap};

/// 外部から与える上書き値（CLI の `--build-arg` など）
pub type ArgOverrides = BTreeMap<String, String>;

/// ビルド引数に上書き値をマージ
///
/// - サービスが宣言済みのキーだけが対象（上書き側にしかないキーは無視）
/// - 上書き値が空文字のキーは「値なし」（`None`）になる。キー自体は残る
pub fn merge_args(mut args: BuildArgs, overrides: &ArgOverrides) -> BuildArgs {
    for (key, value) in args.iter_mut() {
        if let Some(over) = overrides.get(key) {
            *value = if over.is_empty() {
                None
            } else {
                Some(over.clone())
            };
        }
    }
    args
}

/// エンジンに渡す形へ変換（値なしのキーは落とす）
pub fn flatten_args(args: &BuildArgs) -> HashMap<String, String> {
    args.iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared() -> BuildArgs {
        let mut args = BuildArgs::new();
        args.insert("NODE_VERSION".to_string(), Some("18".to_string()));
        args.insert("GIT_SHA".to_string(), None);
        args.insert("REGISTRY".to_string(), Some("ghcr.io/org".to_string()));
        args
    }

    #[test]
    fn test_override_wins() {
        let mut overrides = ArgOverrides::new();
        overrides.insert("NODE_VERSION".to_string(), "20".to_string());
        overrides.insert("GIT_SHA".to_string(), "abc123".to_string());

        let merged = merge_args(declared(), &overrides);
        assert_eq!(merged["NODE_VERSION"], Some("20".to_string()));
        assert_eq!(merged["GIT_SHA"], Some("abc123".to_string()));
        assert_eq!(merged["REGISTRY"], Some("ghcr.io/org".to_string()));
    }

    #[test]
    fn test_empty_override_clears_value() {
        let mut overrides = ArgOverrides::new();
        overrides.insert("REGISTRY".to_string(), String::new());

        let merged = merge_args(declared(), &overrides);
        assert!(merged.contains_key("REGISTRY"));
        assert_eq!(merged["REGISTRY"], None);
    }

    #[test]
    fn test_override_only_keys_ignored() {
        let mut overrides = ArgOverrides::new();
        overrides.insert("UNDECLARED".to_string(), "x".to_string());

        let merged = merge_args(declared(), &overrides);
        assert!(!merged.contains_key("UNDECLARED"));
        assert_eq!(merged, declared());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut overrides = ArgOverrides::new();
        overrides.insert("NODE_VERSION".to_string(), "20".to_string());
        overrides.insert("REGISTRY".to_string(), String::new());

        let once = merge_args(declared(), &overrides);
        let twice = merge_args(once.clone(), &overrides);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_flatten_drops_valueless() {
        let flat = flatten_args(&declared());
        assert_eq!(flat.len(), 2);
        assert_eq!(flat.get("NODE_VERSION").map(String::as_str), Some("18"));
        assert!(!flat.contains_key("GIT_SHA"));

        assert!(flatten_args(&BuildArgs::new()).is_empty());
    }
}
