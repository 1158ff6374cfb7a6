//! # フィールド検証ルール
//!
//! レコード種別ごとのルール表から共通して使う検証ヘルパー。
//!
//! [`FieldReader`] は候補レコードからフィールドを 1 つずつ読み取り、
//! ルールに合格した値を返す。不合格のフィールドは内部の
//! [`ValidationErrors`] に記録され、[`FieldReader::finish`] でまとめて返される。
//!
//! ## 作成モードと部分モード
//!
//! | モード | 欠落した必須フィールド | 存在するフィールド |
//! |--------|----------------------|------------------|
//! | [`ValidationMode::Create`] | エラー | ルールを適用 |
//! | [`ValidationMode::Partial`] | 無視 | ルールを適用 |
//!
//! `null` は欠落と同じに扱う。

use std::{str::FromStr, sync::LazyLock};

use chrono::NaiveTime;
use regex::Regex;
use serde_json::{Map, Value};
use strum::VariantNames;
use url::Url;
use validator::{ValidateEmail, ValidateUrl};

use crate::{
    error::ValidationErrors,
    rut::is_valid_rut,
};

/// 検証前の生レコード
pub type RawRecord = Map<String, Value>;

/// 必須フィールドの欠落をどう扱うか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// 新規作成。必須フィールドの欠落はエラー
    Create,
    /// 部分更新。存在するフィールドだけを検証する
    Partial,
}

/// テキストフィールドのルール
#[derive(Debug, Clone, Copy)]
pub struct TextRule {
    pub min:      usize,
    pub max:      usize,
    /// 必須の場合、欠落時のメッセージ
    pub required: Option<&'static str>,
}

impl TextRule {
    pub const fn required(min: usize, max: usize, message: &'static str) -> Self {
        Self {
            min,
            max,
            required: Some(message),
        }
    }

    pub const fn optional(min: usize, max: usize) -> Self {
        Self {
            min,
            max,
            required: None,
        }
    }

    fn length_message(&self) -> String {
        if self.min == 0 {
            format!("Debe tener como máximo {} caracteres", self.max)
        } else {
            format!("Debe tener entre {} y {} caracteres", self.min, self.max)
        }
    }
}

/// チリの電話番号（固定 / 携帯）
static CHILEAN_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?56\s?[2-9]\d{8}$|^\+?56\s?9\s?\d{4}\s?\d{4}$").expect("正規表現が不正")
});

pub const MSG_NOT_TEXT: &str = "Debe ser un texto";
pub const MSG_NOT_BOOL: &str = "Debe ser un valor booleano";
pub const MSG_NOT_INTEGER: &str = "Debe ser un número entero";
pub const MSG_NOT_LIST: &str = "Debe ser una lista";
pub const MSG_NOT_OBJECT: &str = "Debe ser un objeto";
pub const MSG_INVALID_RUT: &str = "RUT chileno inválido";
pub const MSG_INVALID_PHONE: &str = "Formato de teléfono chileno inválido";
pub const MSG_INVALID_EMAIL: &str = "Email inválido";
pub const MSG_INVALID_URL: &str = "URL inválida";
pub const MSG_INVALID_TIME: &str = "Hora inválida, use el formato HH:MM";

const URL_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

/// 候補レコードからルールに沿ってフィールドを読み取る
pub struct FieldReader<'a> {
    record: &'a RawRecord,
    mode:   ValidationMode,
    prefix: Option<String>,
    errors: ValidationErrors,
}

impl<'a> FieldReader<'a> {
    pub fn new(record: &'a RawRecord, mode: ValidationMode) -> Self {
        Self {
            record,
            mode,
            prefix: None,
            errors: ValidationErrors::new(),
        }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// 記録済みのエラーを返す。エラーがなければ `Ok(())`
    pub fn finish(self) -> Result<(), ValidationErrors> {
        self.errors.into_result()
    }

    /// エラーキー（ネスト時は `horarios.0.dia` のようにプレフィックスを付ける）
    fn key(&self, field: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        }
    }

    pub fn report(&mut self, field: &str, message: impl Into<String>) {
        let key = self.key(field);
        self.errors.add(key, message);
    }

    /// フィールドの値を取り出す。欠落・`null` の場合は必須判定を行う
    fn lookup(&mut self, field: &str, required: Option<&'static str>) -> Option<&'a Value> {
        match self.record.get(field) {
            Some(Value::Null) | None => {
                if let (ValidationMode::Create, Some(message)) = (self.mode, required) {
                    self.report(field, message);
                }
                None
            }
            Some(value) => Some(value),
        }
    }

    /// ネストしたオブジェクトを作成モードで読み取る
    ///
    /// ネスト側で記録されたエラーは `field.{index}.` のプレフィックス付きで取り込む。
    pub fn nested<T>(
        &mut self,
        field: &str,
        index: usize,
        record: &'a RawRecord,
        read: impl FnOnce(&mut FieldReader<'a>) -> T,
    ) -> T {
        let mut inner = FieldReader {
            record,
            mode: ValidationMode::Create,
            prefix: Some(self.key(&format!("{field}.{index}"))),
            errors: ValidationErrors::new(),
        };
        let value = read(&mut inner);
        self.errors.merge(inner.errors);
        value
    }

    pub fn text(&mut self, field: &str, rule: TextRule) -> Option<String> {
        let value = self.lookup(field, rule.required)?;
        let Value::String(text) = value else {
            self.report(field, MSG_NOT_TEXT);
            return None;
        };
        let length = text.chars().count();
        if length < rule.min || length > rule.max {
            self.report(field, rule.length_message());
            return None;
        }
        Some(text.clone())
    }

    pub fn flag(&mut self, field: &str) -> Option<bool> {
        match self.lookup(field, None)? {
            Value::Bool(flag) => Some(*flag),
            _ => {
                self.report(field, MSG_NOT_BOOL);
                None
            }
        }
    }

    pub fn integer(&mut self, field: &str, min: i64, max: i64) -> Option<i64> {
        let value = self.lookup(field, None)?;
        let Some(number) = value.as_i64() else {
            self.report(field, MSG_NOT_INTEGER);
            return None;
        };
        if !(min..=max).contains(&number) {
            self.report(field, format!("Debe estar entre {min} y {max}"));
            return None;
        }
        Some(number)
    }

    /// 文字列のリスト。要素ごとのエラーは `field.{i}` に記録する
    pub fn text_list(&mut self, field: &str, item: TextRule, max_items: usize) -> Option<Vec<String>> {
        let value = self.lookup(field, item.required)?;
        let Value::Array(items) = value else {
            self.report(field, MSG_NOT_LIST);
            return None;
        };
        if items.len() > max_items {
            self.report(field, format!("Debe contener como máximo {max_items} elementos"));
            return None;
        }

        let mut out = Vec::with_capacity(items.len());
        let mut valid = true;
        for (index, entry) in items.iter().enumerate() {
            let entry_key = format!("{field}.{index}");
            match entry {
                Value::String(text) => {
                    let length = text.chars().count();
                    if length < item.min || length > item.max {
                        self.report(&entry_key, item.length_message());
                        valid = false;
                    } else {
                        out.push(text.clone());
                    }
                }
                _ => {
                    self.report(&entry_key, MSG_NOT_TEXT);
                    valid = false;
                }
            }
        }
        valid.then_some(out)
    }

    /// オブジェクトのリスト。件数が `min` 未満なら `required` のメッセージを使う
    pub fn objects(
        &mut self,
        field: &str,
        min: usize,
        max: usize,
        required: &'static str,
    ) -> Option<Vec<&'a RawRecord>> {
        let value = self.lookup(field, Some(required))?;
        let Value::Array(items) = value else {
            self.report(field, MSG_NOT_LIST);
            return None;
        };
        if items.len() < min {
            self.report(field, required);
            return None;
        }
        if items.len() > max {
            self.report(field, format!("Debe contener entre {min} y {max} elementos"));
            return None;
        }

        let mut out = Vec::with_capacity(items.len());
        for (index, entry) in items.iter().enumerate() {
            match entry {
                Value::Object(map) => out.push(map),
                _ => self.report(&format!("{field}.{index}"), MSG_NOT_OBJECT),
            }
        }
        (out.len() == items.len()).then_some(out)
    }

    /// 列挙値。候補は `T::VARIANTS` から表示する
    pub fn choice<T>(&mut self, field: &str, required: Option<&'static str>) -> Option<T>
    where
        T: FromStr + VariantNames,
    {
        let value = self.lookup(field, required)?;
        let Value::String(text) = value else {
            self.report(field, MSG_NOT_TEXT);
            return None;
        };
        match text.parse() {
            Ok(choice) => Some(choice),
            Err(_) => {
                self.report(field, format!("Debe ser uno de: {}", T::VARIANTS.join(", ")));
                None
            }
        }
    }

    /// 時刻（`HH:MM` または `HH:MM:SS`）
    pub fn time(&mut self, field: &str, required: Option<&'static str>) -> Option<NaiveTime> {
        let value = self.lookup(field, required)?;
        let parsed = value.as_str().and_then(parse_time);
        if parsed.is_none() {
            self.report(field, MSG_INVALID_TIME);
        }
        parsed
    }

    /// RUT。長さの基本チェックに合格した場合のみチェックサムを検証する
    ///
    /// 下限は 8 文字。本体 7 桁の RUT（`1000005` + `K` など）も受け付ける。
    pub fn rut(&mut self, field: &str, required: &'static str) -> Option<String> {
        let rut = self.text(field, TextRule::required(8, 12, required))?;
        if !is_valid_rut(&rut) {
            self.report(field, MSG_INVALID_RUT);
            return None;
        }
        Some(rut)
    }

    pub fn phone(&mut self, field: &str, required: &'static str) -> Option<String> {
        let phone = self.text(field, TextRule::required(1, 20, required))?;
        if !CHILEAN_PHONE.is_match(&phone) {
            self.report(field, MSG_INVALID_PHONE);
            return None;
        }
        Some(phone)
    }

    pub fn email(&mut self, field: &str, required: &'static str) -> Option<String> {
        let email = self.text(field, TextRule::required(3, 254, required))?;
        let has_domain_dot = email
            .rsplit_once('@')
            .is_some_and(|(_, domain)| domain.contains('.'));
        if !email.validate_email() || !has_domain_dot {
            self.report(field, MSG_INVALID_EMAIL);
            return None;
        }
        Some(email)
    }

    /// `http` / `https` / `ftp` / `ftps` で、ホスト名にドットを含む URL だけを受け付ける
    pub fn url(&mut self, field: &str) -> Option<String> {
        let url = self.text(field, TextRule::optional(0, 500))?;
        if !url.validate_url() || !has_allowed_scheme_and_host(&url) {
            self.report(field, MSG_INVALID_URL);
            return None;
        }
        Some(url)
    }
}

fn has_allowed_scheme_and_host(text: &str) -> bool {
    let Ok(url) = Url::parse(text) else {
        return false;
    };
    URL_SCHEMES.contains(&url.scheme()) && url.host_str().is_some_and(|host| host.contains('.'))
}

/// `HH:MM` または `HH:MM:SS` を解析する
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("オブジェクトであること"),
        }
    }

    const NOMBRE: TextRule = TextRule::required(2, 100, "obligatorio");

    #[test]
    fn test_作成モードでは必須フィールドの欠落を報告する() {
        let candidate = record(json!({}));
        let mut reader = FieldReader::new(&candidate, ValidationMode::Create);

        assert_eq!(reader.text("nombre", NOMBRE), None);

        let errors = reader.finish().unwrap_err();
        assert_eq!(errors.messages("nombre"), ["obligatorio"]);
    }

    #[test]
    fn test_部分モードでは欠落を無視する() {
        let candidate = record(json!({ "nombre": null }));
        let mut reader = FieldReader::new(&candidate, ValidationMode::Partial);

        assert_eq!(reader.text("nombre", NOMBRE), None);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_部分モードでも存在するフィールドは検証する() {
        let candidate = record(json!({ "nombre": "X" }));
        let mut reader = FieldReader::new(&candidate, ValidationMode::Partial);

        reader.text("nombre", NOMBRE);

        let errors = reader.finish().unwrap_err();
        assert_eq!(errors.messages("nombre"), ["Debe tener entre 2 y 100 caracteres"]);
    }

    #[test]
    fn test_文字数は文字単位で数える() {
        let candidate = record(json!({ "nombre": "Ñú" }));
        let mut reader = FieldReader::new(&candidate, ValidationMode::Create);

        assert_eq!(reader.text("nombre", NOMBRE), Some("Ñú".to_string()));
    }

    #[test]
    fn test_型が違うフィールドを報告する() {
        let candidate = record(json!({ "nombre": 1, "activa": "si", "anos": 1.5, "tags": "x" }));
        let mut reader = FieldReader::new(&candidate, ValidationMode::Create);

        reader.text("nombre", NOMBRE);
        reader.flag("activa");
        reader.integer("anos", 0, 50);
        reader.text_list("tags", TextRule::optional(2, 50), 20);

        let errors = reader.finish().unwrap_err();
        assert_eq!(errors.messages("nombre"), [MSG_NOT_TEXT]);
        assert_eq!(errors.messages("activa"), [MSG_NOT_BOOL]);
        assert_eq!(errors.messages("anos"), [MSG_NOT_INTEGER]);
        assert_eq!(errors.messages("tags"), [MSG_NOT_LIST]);
    }

    #[test]
    fn test_整数の範囲外を報告する() {
        let candidate = record(json!({ "anos": 51 }));
        let mut reader = FieldReader::new(&candidate, ValidationMode::Create);

        assert_eq!(reader.integer("anos", 0, 50), None);
        assert_eq!(reader.finish().unwrap_err().messages("anos"), ["Debe estar entre 0 y 50"]);
    }

    #[test]
    fn test_リスト要素のエラーは添字付きのキーに記録する() {
        let candidate = record(json!({ "tags": ["ok", "x", 3] }));
        let mut reader = FieldReader::new(&candidate, ValidationMode::Create);

        assert_eq!(reader.text_list("tags", TextRule::optional(2, 50), 20), None);

        let errors = reader.finish().unwrap_err();
        assert!(!errors.contains("tags.0"));
        assert_eq!(errors.messages("tags.1"), ["Debe tener entre 2 y 50 caracteres"]);
        assert_eq!(errors.messages("tags.2"), [MSG_NOT_TEXT]);
    }

    #[test]
    fn test_リストの件数上限を超えると報告する() {
        let tags: Vec<String> = (0..21).map(|i| format!("t{i}")).collect();
        let candidate = record(json!({ "tags": tags }));
        let mut reader = FieldReader::new(&candidate, ValidationMode::Create);

        reader.text_list("tags", TextRule::optional(2, 50), 20);

        assert_eq!(
            reader.finish().unwrap_err().messages("tags"),
            ["Debe contener como máximo 20 elementos"]
        );
    }

    #[test]
    fn test_ネストしたエラーはプレフィックス付きで取り込む() {
        let candidate = record(json!({ "items": [{ "dia": "" }] }));
        let mut reader = FieldReader::new(&candidate, ValidationMode::Partial);

        let items = reader.objects("items", 1, 7, "al menos uno").unwrap();
        for (index, item) in items.into_iter().enumerate() {
            reader.nested("items", index, item, |inner| {
                inner.text("dia", TextRule::required(1, 10, "dia obligatorio"));
                inner.time("inicio", Some("inicio obligatorio"));
            });
        }

        let errors = reader.finish().unwrap_err();
        assert_eq!(errors.messages("items.0.dia"), ["Debe tener entre 1 y 10 caracteres"]);
        assert_eq!(errors.messages("items.0.inicio"), ["inicio obligatorio"]);
    }

    #[test]
    fn test_空のオブジェクトリストは必須メッセージを使う() {
        let candidate = record(json!({ "items": [] }));
        let mut reader = FieldReader::new(&candidate, ValidationMode::Create);

        assert_eq!(reader.objects("items", 1, 7, "al menos uno"), None);
        assert_eq!(reader.finish().unwrap_err().messages("items"), ["al menos uno"]);
    }

    #[rstest]
    #[case("08:00", Some((8, 0, 0)))]
    #[case("18:30:15", Some((18, 30, 15)))]
    #[case("24:00", None)]
    #[case("8am", None)]
    fn test_parse_timeは2つの書式を受け付ける(
        #[case] input: &str,
        #[case] expected: Option<(u32, u32, u32)>,
    ) {
        let expected = expected.and_then(|(h, m, s)| NaiveTime::from_hms_opt(h, m, s));
        assert_eq!(parse_time(input), expected);
    }

    #[rstest]
    #[case("+56912345678", true)]
    #[case("56223456789", true)]
    #[case("+56123456789", false)]
    #[case("912345678", false)]
    fn test_電話番号のパターン(#[case] phone: &str, #[case] valid: bool) {
        let candidate = record(json!({ "telefono": phone }));
        let mut reader = FieldReader::new(&candidate, ValidationMode::Create);

        assert_eq!(reader.phone("telefono", "obligatorio").is_some(), valid);
    }

    #[rstest]
    #[case("123456785", true)]
    #[case("123456784", false)]
    #[case("1000005K", true)]
    #[case("1234567", false)]
    fn test_rutは長さとチェックサムを検証する(#[case] rut: &str, #[case] valid: bool) {
        let candidate = record(json!({ "rut": rut }));
        let mut reader = FieldReader::new(&candidate, ValidationMode::Create);

        assert_eq!(reader.rut("rut", "obligatorio").is_some(), valid);
    }

    #[test]
    fn test_短すぎるrutは長さエラーだけを報告する() {
        let candidate = record(json!({ "rut": "1234567" }));
        let mut reader = FieldReader::new(&candidate, ValidationMode::Create);

        reader.rut("rut", "obligatorio");

        assert_eq!(
            reader.finish().unwrap_err().messages("rut"),
            ["Debe tener entre 8 y 12 caracteres"]
        );
    }

    #[rstest]
    #[case("ana@example.com", true)]
    #[case("ana@", false)]
    #[case("sin-arroba", false)]
    #[case("a@b", false)]
    #[case("x@localhost", false)]
    fn test_email(#[case] email: &str, #[case] valid: bool) {
        let candidate = record(json!({ "email": email }));
        let mut reader = FieldReader::new(&candidate, ValidationMode::Create);

        assert_eq!(reader.email("email", "obligatorio").is_some(), valid);
    }

    #[rstest]
    #[case("https://cdn.example.com/foto.png", true)]
    #[case("ftp://archivos.clinica.cl/fotos/ana.jpg", true)]
    #[case("no es una url", false)]
    #[case("javascript:alert(1)", false)]
    #[case("mailto:x@y.cl", false)]
    #[case("file:///etc/passwd", false)]
    #[case("http://localhost/foto.png", false)]
    fn test_url(#[case] url: &str, #[case] valid: bool) {
        let candidate = record(json!({ "foto_url": url }));
        let mut reader = FieldReader::new(&candidate, ValidationMode::Create);

        assert_eq!(reader.url("foto_url").is_some(), valid);
    }
}
