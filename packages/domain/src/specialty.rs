//! # 専門分野（Especialidad）
//!
//! ## フィールド
//!
//! | フィールド | ルール | 正規化 |
//! |-----------|--------|--------|
//! | `nombre` | 必須、2〜100 文字 | trim + 単語先頭大文字 |
//! | `codigo` | 必須、1〜50 文字、一意 | trim |
//! | `descripcion` | 任意、500 文字以下 | trim |
//! | `taxonomia` | 任意、各 2〜50 文字、20 件以下 | trim + 小文字化、空要素を除去 |
//! | `activa` | 任意、真偽値（作成時の既定値 `true`） | なし |
//!
//! 更新時は `codigo` を照合キーとして扱い、値そのものは変更しない。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationErrors,
    normalize,
    record::{RecordId, RecordSchema, missing_required},
    validation::{FieldReader, RawRecord, TextRule, ValidationMode},
};

const NOMBRE: TextRule = TextRule::required(2, 100, "El nombre de la especialidad es obligatorio");
const CODIGO: TextRule = TextRule::required(1, 50, "El código de la especialidad es obligatorio");
const DESCRIPCION: TextRule = TextRule::optional(0, 500);
const TAXONOMIA_ITEM: TextRule = TextRule::optional(2, 50);
const TAXONOMIA_MAX_ITEMS: usize = 20;

/// 保存済みの専門分野
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specialty {
    pub id:          RecordId,
    pub codigo:      String,
    pub nombre:      String,
    pub descripcion: Option<String>,
    pub taxonomia:   Vec<String>,
    pub activa:      bool,
    pub created_at:  DateTime<Utc>,
    pub updated_at:  Option<DateTime<Utc>>,
}

impl Specialty {
    /// 検証済みレコードに識別子と作成時刻を付与する
    pub fn from_new(id: RecordId, new: NewSpecialty, now: DateTime<Utc>) -> Self {
        Self {
            id,
            codigo: new.codigo,
            nombre: new.nombre,
            descripcion: new.descripcion,
            taxonomia: new.taxonomia,
            activa: new.activa,
            created_at: now,
            updated_at: None,
        }
    }

    /// 変更内容のうち指定されたフィールドだけを反映する
    pub fn apply(&mut self, changes: &SpecialtyChanges, now: DateTime<Utc>) {
        if let Some(nombre) = &changes.nombre {
            self.nombre.clone_from(nombre);
        }
        if let Some(descripcion) = &changes.descripcion {
            self.descripcion = Some(descripcion.clone());
        }
        if let Some(taxonomia) = &changes.taxonomia {
            self.taxonomia.clone_from(taxonomia);
        }
        if let Some(activa) = changes.activa {
            self.activa = activa;
        }
        self.updated_at = Some(now);
    }
}

/// 作成用の検証済みレコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSpecialty {
    pub codigo:      String,
    pub nombre:      String,
    pub descripcion: Option<String>,
    pub taxonomia:   Vec<String>,
    pub activa:      bool,
}

/// 部分更新の変更内容
///
/// `codigo` は照合キー。`None` のフィールドは変更しない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialtyChanges {
    pub codigo:      Option<String>,
    pub nombre:      Option<String>,
    pub descripcion: Option<String>,
    pub taxonomia:   Option<Vec<String>>,
    pub activa:      Option<bool>,
}

/// 専門分野のルール表
pub struct SpecialtySchema;

impl RecordSchema for SpecialtySchema {
    type New = NewSpecialty;
    type Changes = SpecialtyChanges;

    fn normalize(mut raw: RawRecord) -> RawRecord {
        normalize::trim_text_fields(&mut raw);
        normalize::map_text(&mut raw, "nombre", normalize::title_case);
        normalize::map_keywords(&mut raw, "taxonomia");
        raw
    }

    fn validate_new(candidate: &RawRecord) -> Result<NewSpecialty, ValidationErrors> {
        let mut reader = FieldReader::new(candidate, ValidationMode::Create);
        let fields = read_fields(&mut reader);
        reader.finish()?;

        let (Some(codigo), Some(nombre)) = (fields.codigo, fields.nombre) else {
            return Err(missing_required());
        };
        Ok(NewSpecialty {
            codigo,
            nombre,
            descripcion: fields.descripcion,
            taxonomia: fields.taxonomia.unwrap_or_default(),
            activa: fields.activa.unwrap_or(true),
        })
    }

    fn validate_changes(candidate: &RawRecord) -> Result<SpecialtyChanges, ValidationErrors> {
        let mut reader = FieldReader::new(candidate, ValidationMode::Partial);
        let fields = read_fields(&mut reader);
        reader.finish()?;
        Ok(fields)
    }
}

fn read_fields(reader: &mut FieldReader<'_>) -> SpecialtyChanges {
    SpecialtyChanges {
        codigo:      reader.text("codigo", CODIGO),
        nombre:      reader.text("nombre", NOMBRE),
        descripcion: reader.text("descripcion", DESCRIPCION),
        taxonomia:   reader.text_list("taxonomia", TAXONOMIA_ITEM, TAXONOMIA_MAX_ITEMS),
        activa:      reader.flag("activa"),
    }
}
