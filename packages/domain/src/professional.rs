//! # 専門職（Profesional）
//!
//! 専門分野に所属する医療従事者。`rut` を一意キーとして扱う。
//!
//! ## 検証の順序
//!
//! 1. すべてのフィールドルールを適用し、エラーを収集する
//! 2. フィールドエラーがなければ、勤務時間帯ごとに `inicio < fin` を検査する
//!    （最初の違反で中断し、`horarios.{i}._schema` に記録する）

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr, VariantNames};

use crate::{
    error::{SCHEMA_KEY, ValidationErrors},
    normalize,
    record::{RecordId, RecordSchema, missing_required},
    validation::{FieldReader, RawRecord, TextRule, ValidationMode},
};

const NOMBRE: TextRule = TextRule::required(2, 100, "El nombre del profesional es obligatorio");
const APELLIDO: TextRule = TextRule::required(2, 100, "El apellido es obligatorio");
const ESPECIALIDAD_ID: TextRule = TextRule::required(1, 64, "La especialidad es obligatoria");
const DIRECCION: TextRule = TextRule::optional(0, 200);
const REGISTRO_PROFESIONAL: TextRule = TextRule::optional(0, 50);

const MSG_RUT_REQUIRED: &str = "El RUT es obligatorio";
const MSG_PHONE_REQUIRED: &str = "El teléfono es obligatorio";
const MSG_EMAIL_REQUIRED: &str = "El email es obligatorio";
const MSG_SCHEDULE_REQUIRED: &str = "Debe definir al menos un horario";
const MSG_SCHEDULE_ORDER: &str = "La hora de inicio debe ser menor que la hora de fin";

const MAX_SCHEDULE_ENTRIES: usize = 7;
const MAX_EXPERIENCE_YEARS: i64 = 50;

/// 曜日
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    EnumString,
    IntoStaticStr,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Weekday {
    Lunes,
    Martes,
    Miercoles,
    Jueves,
    Viernes,
    Sabado,
    Domingo,
}

/// 勤務時間帯
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub dia:    Weekday,
    pub inicio: NaiveTime,
    pub fin:    NaiveTime,
    pub activo: bool,
}

/// 保存済みの専門職
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Professional {
    pub id:                   RecordId,
    pub rut:                  String,
    pub nombre:               String,
    pub apellido:             String,
    pub especialidad_id:      String,
    pub telefono:             String,
    pub email:                String,
    pub direccion:            Option<String>,
    pub horarios:             Vec<ScheduleEntry>,
    pub disponible:           bool,
    pub registro_profesional: Option<String>,
    pub experiencia_anos:     Option<u8>,
    pub foto_url:             Option<String>,
    pub created_at:           DateTime<Utc>,
    pub updated_at:           Option<DateTime<Utc>>,
}

impl Professional {
    pub fn from_new(id: RecordId, new: NewProfessional, now: DateTime<Utc>) -> Self {
        Self {
            id,
            rut: new.rut,
            nombre: new.nombre,
            apellido: new.apellido,
            especialidad_id: new.especialidad_id,
            telefono: new.telefono,
            email: new.email,
            direccion: new.direccion,
            horarios: new.horarios,
            disponible: new.disponible,
            registro_profesional: new.registro_profesional,
            experiencia_anos: new.experiencia_anos,
            foto_url: new.foto_url,
            created_at: now,
            updated_at: None,
        }
    }

    /// 指定されたフィールドだけを反映する。`rut` は変更しない
    pub fn apply(&mut self, changes: &ProfessionalChanges, now: DateTime<Utc>) {
        fn set<T: Clone>(target: &mut T, value: Option<&T>) {
            if let Some(value) = value {
                target.clone_from(value);
            }
        }
        fn set_some<T: Clone>(target: &mut Option<T>, value: Option<&T>) {
            if let Some(value) = value {
                *target = Some(value.clone());
            }
        }

        set(&mut self.nombre, changes.nombre.as_ref());
        set(&mut self.apellido, changes.apellido.as_ref());
        set(&mut self.especialidad_id, changes.especialidad_id.as_ref());
        set(&mut self.telefono, changes.telefono.as_ref());
        set(&mut self.email, changes.email.as_ref());
        set(&mut self.horarios, changes.horarios.as_ref());
        set(&mut self.disponible, changes.disponible.as_ref());
        set_some(&mut self.direccion, changes.direccion.as_ref());
        set_some(&mut self.registro_profesional, changes.registro_profesional.as_ref());
        set_some(&mut self.experiencia_anos, changes.experiencia_anos.as_ref());
        set_some(&mut self.foto_url, changes.foto_url.as_ref());
        self.updated_at = Some(now);
    }
}

/// 作成用の検証済みレコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfessional {
    pub rut:                  String,
    pub nombre:               String,
    pub apellido:             String,
    pub especialidad_id:      String,
    pub telefono:             String,
    pub email:                String,
    pub direccion:            Option<String>,
    pub horarios:             Vec<ScheduleEntry>,
    pub disponible:           bool,
    pub registro_profesional: Option<String>,
    pub experiencia_anos:     Option<u8>,
    pub foto_url:             Option<String>,
}

/// 部分更新の変更内容
///
/// `rut` は照合キー。`horarios` を指定した場合は一覧全体を置き換える。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfessionalChanges {
    pub rut:                  Option<String>,
    pub nombre:               Option<String>,
    pub apellido:             Option<String>,
    pub especialidad_id:      Option<String>,
    pub telefono:             Option<String>,
    pub email:                Option<String>,
    pub direccion:            Option<String>,
    pub horarios:             Option<Vec<ScheduleEntry>>,
    pub disponible:           Option<bool>,
    pub registro_profesional: Option<String>,
    pub experiencia_anos:     Option<u8>,
    pub foto_url:             Option<String>,
}

/// 専門職のルール表
pub struct ProfessionalSchema;

impl RecordSchema for ProfessionalSchema {
    type New = NewProfessional;
    type Changes = ProfessionalChanges;

    fn normalize(mut raw: RawRecord) -> RawRecord {
        normalize::trim_text_fields(&mut raw);
        normalize::map_text(&mut raw, "nombre", normalize::title_case);
        normalize::map_text(&mut raw, "apellido", normalize::title_case);
        normalize::map_text(&mut raw, "rut", normalize::clean_rut);
        normalize::map_text(&mut raw, "telefono", normalize::clean_phone);
        raw
    }

    fn validate_new(candidate: &RawRecord) -> Result<NewProfessional, ValidationErrors> {
        let changes = read_and_check(candidate, ValidationMode::Create)?;

        let ProfessionalChanges {
            rut: Some(rut),
            nombre: Some(nombre),
            apellido: Some(apellido),
            especialidad_id: Some(especialidad_id),
            telefono: Some(telefono),
            email: Some(email),
            horarios: Some(horarios),
            ..
        } = changes.clone()
        else {
            return Err(missing_required());
        };

        Ok(NewProfessional {
            rut,
            nombre,
            apellido,
            especialidad_id,
            telefono,
            email,
            direccion: changes.direccion,
            horarios,
            disponible: changes.disponible.unwrap_or(true),
            registro_profesional: changes.registro_profesional,
            experiencia_anos: changes.experiencia_anos,
            foto_url: changes.foto_url,
        })
    }

    fn validate_changes(candidate: &RawRecord) -> Result<ProfessionalChanges, ValidationErrors> {
        read_and_check(candidate, ValidationMode::Partial)
    }
}

fn read_and_check(
    candidate: &RawRecord,
    mode: ValidationMode,
) -> Result<ProfessionalChanges, ValidationErrors> {
    let mut reader = FieldReader::new(candidate, mode);
    let changes = read_fields(&mut reader);
    reader.finish()?;

    if let Some(horarios) = &changes.horarios {
        check_schedule_order(horarios)?;
    }
    Ok(changes)
}

fn read_fields(reader: &mut FieldReader<'_>) -> ProfessionalChanges {
    ProfessionalChanges {
        rut:                  reader.rut("rut", MSG_RUT_REQUIRED),
        nombre:               reader.text("nombre", NOMBRE),
        apellido:             reader.text("apellido", APELLIDO),
        especialidad_id:      reader.text("especialidad_id", ESPECIALIDAD_ID),
        telefono:             reader.phone("telefono", MSG_PHONE_REQUIRED),
        email:                reader.email("email", MSG_EMAIL_REQUIRED),
        direccion:            reader.text("direccion", DIRECCION),
        horarios:             read_schedule(reader),
        disponible:           reader.flag("disponible"),
        registro_profesional: reader.text("registro_profesional", REGISTRO_PROFESIONAL),
        experiencia_anos:     reader
            .integer("experiencia_anos", 0, MAX_EXPERIENCE_YEARS)
            .and_then(|years| u8::try_from(years).ok()),
        foto_url:             reader.url("foto_url"),
    }
}

/// 勤務時間帯の一覧。各エントリは部分更新時も完全な形で検証する
fn read_schedule(reader: &mut FieldReader<'_>) -> Option<Vec<ScheduleEntry>> {
    let entries = reader.objects("horarios", 1, MAX_SCHEDULE_ENTRIES, MSG_SCHEDULE_REQUIRED)?;

    let parsed: Vec<Option<ScheduleEntry>> = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            reader.nested("horarios", index, entry, |inner| {
                let dia = inner.choice::<Weekday>("dia", Some("El día es obligatorio"));
                let inicio = inner.time("inicio", Some("La hora de inicio es obligatoria"));
                let fin = inner.time("fin", Some("La hora de fin es obligatoria"));
                let activo = inner.flag("activo").unwrap_or(true);
                Some(ScheduleEntry {
                    dia: dia?,
                    inicio: inicio?,
                    fin: fin?,
                    activo,
                })
            })
        })
        .collect();

    parsed.into_iter().collect()
}

/// 最初に `inicio >= fin` となったエントリをエントリ全体のエラーとして返す
fn check_schedule_order(horarios: &[ScheduleEntry]) -> Result<(), ValidationErrors> {
    match horarios.iter().position(|entry| entry.inicio >= entry.fin) {
        Some(index) => Err(ValidationErrors::single(
            format!("horarios.{index}.{SCHEMA_KEY}"),
            MSG_SCHEDULE_ORDER,
        )),
        None => Ok(()),
    }
}
