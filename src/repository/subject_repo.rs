// ==========================================
// 学校课表系统 - 科目数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::school::Subject;
use crate::domain::types::SubjectId;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, OptionalExtension};

// ==========================================
// SubjectRepository - 科目仓储
// ==========================================
pub struct SubjectRepository<'c> {
    conn: &'c Connection,
}

impl<'c> SubjectRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// 新增科目
    pub fn insert(&self, name: &str) -> RepositoryResult<Subject> {
        self.conn
            .execute("INSERT INTO subject (name) VALUES (?1)", params![name])?;
        Ok(Subject {
            id: SubjectId(self.conn.last_insert_rowid()),
            name: name.to_string(),
        })
    }

    /// 按主键查询
    pub fn find_by_id(&self, id: SubjectId) -> RepositoryResult<Option<Subject>> {
        let subject = self
            .conn
            .query_row(
                "SELECT subject_id, name FROM subject WHERE subject_id = ?1",
                params![id],
                |row| {
                    Ok(Subject {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(subject)
    }
}
