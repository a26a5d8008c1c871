// ==========================================
// 学校课表系统 - 学生数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::school::Student;
use crate::domain::types::StudentId;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

const STUDENT_COLUMNS: &str = "student_id, first_name, last_name, birth_date, grade, class";

// ==========================================
// StudentRepository - 学生仓储
// ==========================================
pub struct StudentRepository<'c> {
    conn: &'c Connection,
}

impl<'c> StudentRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// 新增学生 (忽略传入的 id, 返回带数据库分配 id 的实体)
    pub fn insert(&self, draft: &Student) -> RepositoryResult<Student> {
        self.conn.execute(
            r#"
            INSERT INTO student (first_name, last_name, birth_date, grade, class)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                draft.first_name,
                draft.last_name,
                draft.birth_date,
                draft.grade,
                draft.class,
            ],
        )?;
        Ok(Student {
            id: StudentId(self.conn.last_insert_rowid()),
            ..draft.clone()
        })
    }

    /// 按主键查询
    pub fn find_by_id(&self, id: StudentId) -> RepositoryResult<Option<Student>> {
        let sql = format!("SELECT {} FROM student WHERE student_id = ?1", STUDENT_COLUMNS);
        let student = self
            .conn
            .query_row(&sql, params![id], map_student)
            .optional()?;
        Ok(student)
    }

    /// 查询某年级某班的全部学生
    ///
    /// # 参数
    /// - grade: 年级 (1..=12)
    /// - class: 班级 (0..=4), 精确匹配
    pub fn find_by_class(&self, grade: u8, class: u8) -> RepositoryResult<Vec<Student>> {
        let sql = format!(
            "SELECT {} FROM student WHERE grade = ?1 AND class = ?2 ORDER BY student_id",
            STUDENT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let students = stmt
            .query_map(params![grade, class], map_student)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(students)
    }
}

/// 行映射 (列顺序见 STUDENT_COLUMNS)
pub(crate) fn map_student(row: &Row<'_>) -> SqliteResult<Student> {
    Ok(Student {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        birth_date: row.get(3)?,
        grade: row.get(4)?,
        class: row.get(5)?,
    })
}
