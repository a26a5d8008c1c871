// ==========================================
// 学校课表系统 - 课程与选课数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 年级/班级资格与冲突校验在 engine 层完成
// ==========================================

use crate::domain::school::{Course, Student};
use crate::domain::timetable::CourseSnapshot;
use crate::domain::types::{CourseId, StudentId, SubjectId, TeacherId};
use crate::repository::error::RepositoryResult;
use crate::repository::student_repo::map_student;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::collections::BTreeSet;

const COURSE_COLUMNS: &str = "course_id, subject_id, teacher_id, for_grade, for_class";

// ==========================================
// CourseRepository - 课程仓储
// ==========================================
pub struct CourseRepository<'c> {
    conn: &'c Connection,
}

impl<'c> CourseRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    // ==========================================
    // 课程
    // ==========================================

    /// 新增课程 (忽略传入的 id)
    pub fn insert(&self, draft: &Course) -> RepositoryResult<Course> {
        self.conn.execute(
            r#"
            INSERT INTO course (subject_id, teacher_id, for_grade, for_class)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                draft.subject_id,
                draft.teacher_id,
                draft.for_grade,
                draft.for_class,
            ],
        )?;
        Ok(Course {
            id: CourseId(self.conn.last_insert_rowid()),
            ..draft.clone()
        })
    }

    /// 更新课程的科目/教师/年级/班级
    ///
    /// # 返回
    /// - 更新的行数 (0 表示课程不存在)
    pub fn update(&self, course: &Course) -> RepositoryResult<usize> {
        let count = self.conn.execute(
            r#"
            UPDATE course
            SET subject_id = ?2, teacher_id = ?3, for_grade = ?4, for_class = ?5
            WHERE course_id = ?1
            "#,
            params![
                course.id,
                course.subject_id,
                course.teacher_id,
                course.for_grade,
                course.for_class,
            ],
        )?;
        Ok(count)
    }

    /// 删除课程 (课时与选课关系由外键级联删除)
    ///
    /// # 返回
    /// - 删除的行数 (0 表示课程不存在)
    pub fn delete(&self, id: CourseId) -> RepositoryResult<usize> {
        let count = self
            .conn
            .execute("DELETE FROM course WHERE course_id = ?1", params![id])?;
        Ok(count)
    }

    /// 按主键查询
    pub fn find_by_id(&self, id: CourseId) -> RepositoryResult<Option<Course>> {
        let sql = format!("SELECT {} FROM course WHERE course_id = ?1", COURSE_COLUMNS);
        let course = self
            .conn
            .query_row(&sql, params![id], map_course)
            .optional()?;
        Ok(course)
    }

    /// 查询全部课程
    pub fn list_all(&self) -> RepositoryResult<Vec<Course>> {
        let sql = format!("SELECT {} FROM course ORDER BY course_id", COURSE_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let courses = stmt
            .query_map([], map_course)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(courses)
    }

    /// 查找科目/教师/年级/班级完全相同的课程
    pub fn find_duplicate(
        &self,
        subject_id: SubjectId,
        teacher_id: TeacherId,
        for_grade: u8,
        for_class: u8,
    ) -> RepositoryResult<Option<Course>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM course
            WHERE subject_id = ?1 AND teacher_id = ?2 AND for_grade = ?3 AND for_class = ?4
            LIMIT 1
            "#,
            COURSE_COLUMNS
        );
        let course = self
            .conn
            .query_row(
                &sql,
                params![subject_id, teacher_id, for_grade, for_class],
                map_course,
            )
            .optional()?;
        Ok(course)
    }

    // ==========================================
    // 选课关系
    // ==========================================

    /// 课程已选学生 ID
    pub fn enrolled_student_ids(&self, course_id: CourseId) -> RepositoryResult<Vec<StudentId>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_id FROM course_student WHERE course_id = ?1 ORDER BY student_id",
        )?;
        let ids = stmt
            .query_map(params![course_id], |row| row.get(0))?
            .collect::<SqliteResult<Vec<StudentId>>>()?;
        Ok(ids)
    }

    /// 课程已选学生
    pub fn enrolled_students(&self, course_id: CourseId) -> RepositoryResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.student_id, s.first_name, s.last_name, s.birth_date, s.grade, s.class
            FROM student s
            JOIN course_student cs ON cs.student_id = s.student_id
            WHERE cs.course_id = ?1
            ORDER BY s.student_id
            "#,
        )?;
        let students = stmt
            .query_map(params![course_id], map_student)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(students)
    }

    /// 批量写入选课关系
    ///
    /// # 返回
    /// - 写入的行数
    pub fn enroll_students(
        &self,
        course_id: CourseId,
        student_ids: &[StudentId],
    ) -> RepositoryResult<usize> {
        let mut stmt = self
            .conn
            .prepare("INSERT INTO course_student (course_id, student_id) VALUES (?1, ?2)")?;
        let mut count = 0;
        for student_id in student_ids {
            count += stmt.execute(params![course_id, student_id])?;
        }
        Ok(count)
    }

    /// 退选单个学生
    ///
    /// # 返回
    /// - 删除的行数 (0 表示学生未选该课程)
    pub fn unenroll_student(
        &self,
        course_id: CourseId,
        student_id: StudentId,
    ) -> RepositoryResult<usize> {
        let count = self.conn.execute(
            "DELETE FROM course_student WHERE course_id = ?1 AND student_id = ?2",
            params![course_id, student_id],
        )?;
        Ok(count)
    }

    /// 退选某年级某班在该课程中的全部学生
    ///
    /// # 返回
    /// - 删除的行数
    pub fn unenroll_class(
        &self,
        course_id: CourseId,
        grade: u8,
        class: u8,
    ) -> RepositoryResult<usize> {
        let count = self.conn.execute(
            r#"
            DELETE FROM course_student
            WHERE course_id = ?1
              AND student_id IN (
                  SELECT student_id FROM student WHERE grade = ?2 AND class = ?3
              )
            "#,
            params![course_id, grade, class],
        )?;
        Ok(count)
    }

    // ==========================================
    // 快照
    // ==========================================

    /// 课程快照: 课程 + 已选学生 + 已排课时
    pub fn snapshot(&self, course_id: CourseId) -> RepositoryResult<Option<CourseSnapshot>> {
        let course = match self.find_by_id(course_id)? {
            Some(course) => course,
            None => return Ok(None),
        };

        let enrolled: BTreeSet<StudentId> =
            self.enrolled_student_ids(course_id)?.into_iter().collect();

        let mut stmt = self
            .conn
            .prepare("SELECT time FROM lesson WHERE course_id = ?1")?;
        let lesson_times = stmt
            .query_map(params![course_id], |row| row.get(0))?
            .collect::<SqliteResult<BTreeSet<_>>>()?;

        Ok(Some(CourseSnapshot {
            course,
            enrolled,
            lesson_times,
        }))
    }
}

fn map_course(row: &Row<'_>) -> SqliteResult<Course> {
    Ok(Course {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        teacher_id: row.get(2)?,
        for_grade: row.get(3)?,
        for_class: row.get(4)?,
    })
}
