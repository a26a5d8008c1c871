// ==========================================
// 学校课表系统 - 教师数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::school::Teacher;
use crate::domain::types::TeacherId;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, OptionalExtension};

// ==========================================
// TeacherRepository - 教师仓储
// ==========================================
pub struct TeacherRepository<'c> {
    conn: &'c Connection,
}

impl<'c> TeacherRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// 新增教师 (忽略传入的 id, 返回带数据库分配 id 的实体)
    pub fn insert(&self, draft: &Teacher) -> RepositoryResult<Teacher> {
        self.conn.execute(
            "INSERT INTO teacher (first_name, last_name, birth_date) VALUES (?1, ?2, ?3)",
            params![draft.first_name, draft.last_name, draft.birth_date],
        )?;
        Ok(Teacher {
            id: TeacherId(self.conn.last_insert_rowid()),
            ..draft.clone()
        })
    }

    /// 按主键查询
    pub fn find_by_id(&self, id: TeacherId) -> RepositoryResult<Option<Teacher>> {
        let teacher = self
            .conn
            .query_row(
                r#"
                SELECT teacher_id, first_name, last_name, birth_date
                FROM teacher
                WHERE teacher_id = ?1
                "#,
                params![id],
                |row| {
                    Ok(Teacher {
                        id: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                        birth_date: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(teacher)
    }
}
