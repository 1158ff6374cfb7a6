//! # 資格情報の照合
//!
//! ログイン時のユーザー名・パスワードを照合する。
//! 照合先はトレイトで抽象化し、ユースケースには `Arc<dyn CredentialVerifier>` で注入する。

use std::collections::HashMap;

use subtle::ConstantTimeEq;

/// 資格情報を照合するトレイト
pub trait CredentialVerifier: Send + Sync {
    /// ユーザー名とパスワードの組が正しければ `true`
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// プロセス内の固定表による実装
///
/// 表は起動時に設定（`AUTH_USERS`）から渡される。
/// パスワードの比較は定数時間で行う。
#[derive(Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new(users: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            users: users.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut usernames: Vec<&str> = self.users.keys().map(String::as_str).collect();
        usernames.sort_unstable();
        f.debug_struct("StaticCredentials")
            .field("usernames", &usernames)
            .finish()
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|expected| bool::from(expected.as_bytes().ct_eq(password.as_bytes())))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn credentials() -> StaticCredentials {
        StaticCredentials::new([
            ("admin".to_string(), "admin123".to_string()),
            ("rodrigo".to_string(), "rodrigo123".to_string()),
        ])
    }

    #[rstest]
    #[case("admin", "admin123", true)]
    #[case("rodrigo", "rodrigo123", true)]
    #[case("admin", "rodrigo123", false)]
    #[case("admin", "admin1234", false)]
    #[case("admin", "", false)]
    #[case("desconocido", "admin123", false)]
    fn test_verifyはユーザーごとのパスワードと照合する(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(credentials().verify(username, password), expected);
    }

    #[test]
    fn test_debug出力にパスワードを含めない() {
        let output = format!("{:?}", credentials());

        assert!(output.contains("admin"));
        assert!(!output.contains("admin123"));
    }
}
