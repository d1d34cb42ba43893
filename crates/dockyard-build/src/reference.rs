//! イメージ参照の分解

/// イメージ参照をリポジトリとタグに分離
///
/// # Examples
/// - `ghcr.io/org/app:v1.0` -> `("ghcr.io/org/app", "v1.0")`
/// - `redis` -> `("redis", "latest")`
/// - `localhost:5000/app` -> `("localhost:5000/app", "latest")`
/// - `alpine@sha256:...` -> `("alpine@sha256:...", "")`
pub fn split_image_tag(image: &str) -> (String, String) {
    // digest 指定はタグを持たない
    if image.contains('@') {
        return (image.to_string(), String::new());
    }

    if let Some(pos) = image.rfind(':') {
        let potential_tag = &image[pos + 1..];
        let potential_image = &image[..pos];

        // `:` の後ろに `/` があればレジストリのポート番号
        if !potential_tag.contains('/') && !potential_tag.is_empty() {
            return (potential_image.to_string(), potential_tag.to_string());
        }
    }

    (image.to_string(), "latest".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_with_tag() {
        let (image, tag) = split_image_tag("ghcr.io/org/app:v1.0");
        assert_eq!(image, "ghcr.io/org/app");
        assert_eq!(tag, "v1.0");
    }

    #[test]
    fn test_split_without_tag() {
        let (image, tag) = split_image_tag("redis");
        assert_eq!(image, "redis");
        assert_eq!(tag, "latest");
    }

    #[test]
    fn test_split_registry_port() {
        let (image, tag) = split_image_tag("localhost:5000/app");
        assert_eq!(image, "localhost:5000/app");
        assert_eq!(tag, "latest");

        let (image, tag) = split_image_tag("localhost:5000/app:dev");
        assert_eq!(image, "localhost:5000/app");
        assert_eq!(tag, "dev");
    }

    #[test]
    fn test_split_digest() {
        let reference = "alpine@sha256:0123456789abcdef";
        let (image, tag) = split_image_tag(reference);
        assert_eq!(image, reference);
        assert!(tag.is_empty());
    }
}
