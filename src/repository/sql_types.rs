// ==========================================
// 学校课表系统 - 领域类型 <-> SQLite 映射
// ==========================================
// TimePoint 以 TEXT 存储 (YYYY-MM-DDTHH:MM), 字典序即时间序
// 实体ID 以 INTEGER 存储
// ==========================================

use crate::domain::types::{CourseId, LessonId, StudentId, SubjectId, TeacherId, TimePoint};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

impl ToSql for TimePoint {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for TimePoint {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        TimePoint::parse(raw)
            .ok_or_else(|| FromSqlError::Other(format!("无效的课时时间: {}", raw).into()))
    }
}

macro_rules! sql_entity_id {
    ($($name:ident),* $(,)?) => {
        $(
            impl ToSql for $name {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.0))
                }
            }

            impl FromSql for $name {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    i64::column_result(value).map($name)
                }
            }
        )*
    };
}

sql_entity_id!(StudentId, TeacherId, CourseId, SubjectId, LessonId);
