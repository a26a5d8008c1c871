// ==========================================
// 学校课表系统 - 课时数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 同时实现 CommitmentLookup,为冲突引擎提供占用快照
// ==========================================

use crate::domain::school::Lesson;
use crate::domain::types::{CourseId, LessonId, StudentId, TeacherId, TimePoint};
use crate::engine::commitments::CommitmentLookup;
use crate::repository::error::RepositoryResult;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Params, Result as SqliteResult, Row};
use std::collections::BTreeSet;

// ==========================================
// LessonRepository - 课时仓储
// ==========================================
pub struct LessonRepository<'c> {
    conn: &'c Connection,
}

impl<'c> LessonRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 批量写入课时
    ///
    /// # 参数
    /// - course_id: 所属课程
    /// - times: 课时时间点 (按输入顺序写入)
    ///
    /// # 返回
    /// - 写入后的课时 (含分配的 lesson_id)
    pub fn insert_batch(
        &self,
        course_id: CourseId,
        times: &[TimePoint],
    ) -> RepositoryResult<Vec<Lesson>> {
        let mut stmt = self
            .conn
            .prepare("INSERT INTO lesson (course_id, time) VALUES (?1, ?2)")?;
        let mut lessons = Vec::with_capacity(times.len());
        for time in times {
            stmt.execute(params![course_id, time])?;
            lessons.push(Lesson {
                id: LessonId(self.conn.last_insert_rowid()),
                course_id,
                time: *time,
            });
        }
        Ok(lessons)
    }

    /// 修改课时 (所属课程与时间)
    ///
    /// # 返回
    /// - 更新的行数
    pub fn update(&self, lesson: &Lesson) -> RepositoryResult<usize> {
        let count = self.conn.execute(
            "UPDATE lesson SET course_id = ?1, time = ?2 WHERE lesson_id = ?3",
            params![lesson.course_id, lesson.time, lesson.id],
        )?;
        Ok(count)
    }

    /// 删除课时
    ///
    /// # 返回
    /// - 删除的行数
    pub fn delete(&self, lesson_id: LessonId) -> RepositoryResult<usize> {
        let count = self
            .conn
            .execute("DELETE FROM lesson WHERE lesson_id = ?1", params![lesson_id])?;
        Ok(count)
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn find_by_id(&self, lesson_id: LessonId) -> RepositoryResult<Option<Lesson>> {
        let lesson = self
            .conn
            .query_row(
                "SELECT lesson_id, course_id, time FROM lesson WHERE lesson_id = ?1",
                params![lesson_id],
                map_lesson,
            )
            .optional()?;
        Ok(lesson)
    }

    /// 课程的全部课时 (按时间排序)
    pub fn list_by_course(&self, course_id: CourseId) -> RepositoryResult<Vec<Lesson>> {
        self.query_lessons(
            r#"
            SELECT l.lesson_id, l.course_id, l.time
            FROM lesson l
            WHERE l.course_id = ?1
            ORDER BY l.time, l.lesson_id
            "#,
            params![course_id],
        )
    }

    /// 学生课表 (可按日期过滤)
    pub fn list_by_student(
        &self,
        student_id: StudentId,
        day: Option<NaiveDate>,
    ) -> RepositoryResult<Vec<Lesson>> {
        let day = day.map(|d| d.format("%Y-%m-%d").to_string());
        self.query_lessons(
            r#"
            SELECT l.lesson_id, l.course_id, l.time
            FROM lesson l
            JOIN course_student cs ON cs.course_id = l.course_id
            WHERE cs.student_id = ?1
              AND (?2 IS NULL OR substr(l.time, 1, 10) = ?2)
            ORDER BY l.time, l.lesson_id
            "#,
            params![student_id, day],
        )
    }

    /// 教师课表 (可按日期过滤)
    pub fn list_by_teacher(
        &self,
        teacher_id: TeacherId,
        day: Option<NaiveDate>,
    ) -> RepositoryResult<Vec<Lesson>> {
        let day = day.map(|d| d.format("%Y-%m-%d").to_string());
        self.query_lessons(
            r#"
            SELECT l.lesson_id, l.course_id, l.time
            FROM lesson l
            JOIN course c ON c.course_id = l.course_id
            WHERE c.teacher_id = ?1
              AND (?2 IS NULL OR substr(l.time, 1, 10) = ?2)
            ORDER BY l.time, l.lesson_id
            "#,
            params![teacher_id, day],
        )
    }

    fn query_lessons<P: Params>(&self, sql: &str, args: P) -> RepositoryResult<Vec<Lesson>> {
        let mut stmt = self.conn.prepare(sql)?;
        let lessons = stmt
            .query_map(args, map_lesson)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(lessons)
    }

    fn query_times<P: Params>(&self, sql: &str, args: P) -> RepositoryResult<BTreeSet<TimePoint>> {
        let mut stmt = self.conn.prepare(sql)?;
        let times = stmt
            .query_map(args, |row| row.get(0))?
            .collect::<SqliteResult<BTreeSet<TimePoint>>>()?;
        Ok(times)
    }
}

// ==========================================
// CommitmentLookup 实现
// ==========================================
// 未知 ID 返回空集合,存在性由调用方检查
impl CommitmentLookup for LessonRepository<'_> {
    fn course_lesson_times(&self, course_id: CourseId) -> RepositoryResult<BTreeSet<TimePoint>> {
        self.query_times("SELECT time FROM lesson WHERE course_id = ?1", params![course_id])
    }

    fn student_lesson_times(
        &self,
        student_id: StudentId,
    ) -> RepositoryResult<BTreeSet<TimePoint>> {
        self.query_times(
            r#"
            SELECT l.time
            FROM lesson l
            JOIN course_student cs ON cs.course_id = l.course_id
            WHERE cs.student_id = ?1
            "#,
            params![student_id],
        )
    }

    fn teacher_lesson_times(
        &self,
        teacher_id: TeacherId,
    ) -> RepositoryResult<BTreeSet<TimePoint>> {
        self.query_times(
            r#"
            SELECT l.time
            FROM lesson l
            JOIN course c ON c.course_id = l.course_id
            WHERE c.teacher_id = ?1
            "#,
            params![teacher_id],
        )
    }
}

fn map_lesson(row: &Row<'_>) -> SqliteResult<Lesson> {
    Ok(Lesson {
        id: row.get(0)?,
        course_id: row.get(1)?,
        time: row.get(2)?,
    })
}
