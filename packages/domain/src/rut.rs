//! # RUT（Rol Único Tributario）
//!
//! チリの国民識別番号。`本体-検証数字` の形式で、検証数字は mod 11 で求める。
//!
//! ## アルゴリズム
//!
//! 1. 全体が 8 文字未満なら無効
//! 2. 最後の 1 文字を検証数字、それ以外を本体とする
//! 3. 本体に数字以外が含まれていれば無効
//! 4. 本体を右から順に 2, 3, 4, 5, 6, 7, 2, 3, ... を掛けて合計する
//! 5. `r = 合計 mod 11` とし、`r == 1` なら `K`、`r == 0` なら `0`、
//!    それ以外は `11 - r` が期待する検証数字
//!
//! 形式不備とチェックサム不一致は区別せず、どちらも `false` を返す。

/// 正規化済みの RUT（数字と `K` のみ）が有効か判定する
///
/// ```rust
/// use agenda_domain::rut::is_valid_rut;
///
/// assert!(is_valid_rut("123456785"));
/// assert!(!is_valid_rut("123456784"));
/// ```
pub fn is_valid_rut(rut: &str) -> bool {
    let chars: Vec<char> = rut.chars().collect();
    if chars.len() < 8 {
        return false;
    }
    let Some((check, body)) = chars.split_last() else {
        return false;
    };

    let mut sum = 0;
    let mut multiplier = 2;
    for c in body.iter().rev() {
        let Some(digit) = c.to_digit(10) else {
            return false;
        };
        sum = (sum + digit * multiplier) % 11;
        multiplier = if multiplier == 7 { 2 } else { multiplier + 1 };
    }

    check.to_ascii_uppercase() == expected_check_digit(sum)
}

fn expected_check_digit(remainder: u32) -> char {
    match remainder {
        0 => '0',
        1 => 'K',
        r => char::from_digit(11 - r, 10).unwrap_or('?'),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_既知の有効なrutを受け付ける() {
        assert!(is_valid_rut("123456785"));
    }

    #[test]
    fn test_検証数字を変えると無効になる() {
        for check in "012346789K".chars() {
            let rut = format!("12345678{check}");
            assert!(!is_valid_rut(&rut), "{rut} は無効であること");
        }
    }

    #[test]
    fn test_余りが0なら検証数字は0() {
        assert!(is_valid_rut("100000040"));
        assert!(is_valid_rut("198765430"));
    }

    #[test]
    fn test_余りが1なら検証数字はk() {
        assert!(is_valid_rut("10000013K"));
        assert!(is_valid_rut("10000013k"));
        assert!(!is_valid_rut("100000131"));
    }

    #[test]
    fn test_本体7桁のrutを受け付ける() {
        assert!(is_valid_rut("76543216"));
    }

    #[rstest]
    #[case("")]
    #[case("1234567")]
    #[case("7654321")]
    fn test_8文字未満は無効(#[case] rut: &str) {
        assert!(!is_valid_rut(rut));
    }

    #[rstest]
    #[case("1234K6785")]
    #[case("K23456785")]
    #[case("12345678-5")]
    fn test_本体に数字以外を含むと無効(#[case] rut: &str) {
        assert!(!is_valid_rut(rut));
    }
}
