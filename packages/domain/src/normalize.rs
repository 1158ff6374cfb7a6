//! # 正規化ヘルパー
//!
//! 検証の前段で適用する、失敗しない整形処理。
//!
//! すべての関数は冪等であり、`f(f(x)) == f(x)` が成り立つ。
//! 対象フィールドが存在しない、または文字列でない場合は何もしない
//! （型の不一致は検証段階で報告する）。

use serde_json::Value;

use crate::validation::RawRecord;

/// 単語の先頭を大文字、残りを小文字にする
///
/// 英字以外の文字の直後を単語の先頭とみなす（`"o'higgins"` → `"O'Higgins"`）。
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if !c.is_alphabetic() {
            out.push(c);
            in_word = false;
            continue;
        }
        if in_word {
            out.extend(c.to_lowercase());
        } else {
            // 大文字化で複数文字になる場合（ß → SS）は 2 文字目以降を小文字にする
            let mut upper = c.to_uppercase();
            out.extend(upper.next());
            out.extend(upper.flat_map(char::to_lowercase));
        }
        in_word = true;
    }

    out
}

/// RUT を大文字化し、数字と `K` 以外を取り除く
pub fn clean_rut(rut: &str) -> String {
    rut.to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'K')
        .collect()
}

/// 電話番号から数字と先頭の `+` 以外を取り除く
pub fn clean_phone(phone: &str) -> String {
    let mut out = String::with_capacity(phone.len());
    for c in phone.chars() {
        if c.is_ascii_digit() || (c == '+' && out.is_empty()) {
            out.push(c);
        }
    }
    out
}

/// キーワードを trim + 小文字化し、空になったものを捨てる
///
/// 文字列以外の要素はそのまま残す。
pub fn clean_keywords(values: &[Value]) -> Vec<Value> {
    values
        .iter()
        .filter_map(|value| match value {
            Value::String(term) => {
                let term = term.trim().to_lowercase();
                (!term.is_empty()).then_some(Value::String(term))
            }
            other => Some(other.clone()),
        })
        .collect()
}

/// レコード内のすべての文字列の前後空白を取り除く（ネストを含む）
pub fn trim_text_fields(record: &mut RawRecord) {
    for value in record.values_mut() {
        trim_value(value);
    }
}

fn trim_value(value: &mut Value) {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.len() != text.len() {
                *text = trimmed.to_string();
            }
        }
        Value::Array(items) => items.iter_mut().for_each(trim_value),
        Value::Object(map) => map.values_mut().for_each(trim_value),
        _ => {}
    }
}

/// 文字列フィールドに変換を適用する
pub fn map_text(record: &mut RawRecord, field: &str, f: impl Fn(&str) -> String) {
    if let Some(Value::String(text)) = record.get_mut(field) {
        *text = f(text);
    }
}

/// 配列フィールドのキーワードを整形する
pub fn map_keywords(record: &mut RawRecord, field: &str) {
    if let Some(Value::Array(items)) = record.get_mut(field) {
        *items = clean_keywords(items);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case("cardiología", "Cardiología")]
    #[case("PEDIATRÍA", "Pediatría")]
    #[case("medicina  general", "Medicina  General")]
    #[case("o'higgins", "O'Higgins")]
    #[case("maría-josé", "María-José")]
    #[case("", "")]
    fn test_title_caseは単語の先頭だけを大文字にする(
        #[case] input: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(title_case(input), expected);
    }

    #[rstest]
    #[case("straße")]
    #[case("ßeta")]
    #[case("dr. juan pérez")]
    fn test_title_caseは冪等(#[case] input: &str) {
        let once = title_case(input);
        assert_eq!(title_case(&once), once);
    }

    #[rstest]
    #[case("12.345.678-5", "123456785")]
    #[case("10.000.013-k", "10000013K")]
    #[case(" 7654321-6 ", "76543216")]
    #[case("abc", "")]
    fn test_clean_rutは数字とkだけを残す(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(clean_rut(input), expected);
    }

    #[rstest]
    #[case("+56 9 1234 5678", "+56912345678")]
    #[case("(+56) 2-2345-6789", "+56223456789")]
    #[case("56+9", "569")]
    #[case("++56", "+56")]
    fn test_clean_phoneは先頭のプラスだけを残す(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(clean_phone(input), expected);
        assert_eq!(clean_phone(expected), expected);
    }

    #[test]
    fn test_clean_keywordsは空白を除いて小文字化し空要素を捨てる() {
        let cleaned = clean_keywords(&[json!(" Corazón "), json!(""), json!("  Pediatría")]);

        assert_eq!(cleaned, vec![json!("corazón"), json!("pediatría")]);
    }

    #[test]
    fn test_clean_keywordsは文字列以外を残す() {
        let cleaned = clean_keywords(&[json!(1), json!("  ")]);

        assert_eq!(cleaned, vec![json!(1)]);
    }

    #[test]
    fn test_trim_text_fieldsはネストした文字列も整形する() {
        let Value::Object(mut record) = json!({
            "email": "  ana@example.com ",
            "horarios": [{ "dia": " lunes ", "inicio": "08:00 " }],
            "disponible": true,
        }) else {
            unreachable!()
        };

        trim_text_fields(&mut record);

        assert_eq!(
            Value::Object(record),
            json!({
                "email": "ana@example.com",
                "horarios": [{ "dia": "lunes", "inicio": "08:00" }],
                "disponible": true,
            })
        );
    }

    #[test]
    fn test_map_textは文字列以外を変更しない() {
        let Value::Object(mut record) = json!({ "nombre": 42 }) else {
            unreachable!()
        };

        map_text(&mut record, "nombre", title_case);
        map_text(&mut record, "apellido", title_case);

        assert_eq!(Value::Object(record), json!({ "nombre": 42 }));
    }
}
