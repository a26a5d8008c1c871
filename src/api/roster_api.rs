// ==========================================
// 学校课表系统 - 学籍/师资 API
// ==========================================
// 职责: 科目、教师、学生的登记与查询
// ==========================================

use chrono::NaiveDate;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::error::{ApiError, ApiResult};
use crate::api::placement::require;
use crate::db;
use crate::domain::school::{Student, Subject, Teacher};
use crate::domain::types::{validate_class, validate_grade, StudentId, SubjectId, TeacherId};
use crate::repository::{StudentRepository, SubjectRepository, TeacherRepository};

// ==========================================
// RosterApi - 学籍/师资 API
// ==========================================
pub struct RosterApi {
    conn: Arc<Mutex<Connection>>,
}

impl RosterApi {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 登记科目
    pub fn add_subject(&self, name: &str) -> ApiResult<Subject> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("科目名称不能为空".to_string()));
        }

        let subject = db::unit_of_work(&self.conn, |tx| {
            Ok::<_, ApiError>(SubjectRepository::new(tx).insert(name)?)
        })?;
        tracing::info!(subject_id = %subject.id, name, "科目已登记");
        Ok(subject)
    }

    pub fn get_subject(&self, subject_id: SubjectId) -> ApiResult<Subject> {
        db::with_connection(&self.conn, |conn| {
            require(SubjectRepository::new(conn).find_by_id(subject_id)?, "科目", subject_id)
        })
    }

    /// 登记教师
    pub fn add_teacher(
        &self,
        first_name: &str,
        last_name: &str,
        birth_date: NaiveDate,
    ) -> ApiResult<Teacher> {
        let draft = Teacher {
            id: TeacherId(0),
            first_name: required_name(first_name, "名")?,
            last_name: required_name(last_name, "姓")?,
            birth_date,
        };

        let teacher = db::unit_of_work(&self.conn, |tx| {
            Ok::<_, ApiError>(TeacherRepository::new(tx).insert(&draft)?)
        })?;
        tracing::info!(teacher_id = %teacher.id, "教师已登记");
        Ok(teacher)
    }

    pub fn get_teacher(&self, teacher_id: TeacherId) -> ApiResult<Teacher> {
        db::with_connection(&self.conn, |conn| {
            require(TeacherRepository::new(conn).find_by_id(teacher_id)?, "教师", teacher_id)
        })
    }

    /// 登记学生
    ///
    /// # 参数
    /// - grade: 年级 (1..=12)
    /// - class: 班级 (0..=4, 0 表示年级只有一个班)
    pub fn add_student(
        &self,
        first_name: &str,
        last_name: &str,
        birth_date: NaiveDate,
        grade: i64,
        class: i64,
    ) -> ApiResult<Student> {
        let draft = Student {
            id: StudentId(0),
            first_name: required_name(first_name, "名")?,
            last_name: required_name(last_name, "姓")?,
            birth_date,
            grade: validate_grade(grade)?,
            class: validate_class(class)?,
        };

        let student = db::unit_of_work(&self.conn, |tx| {
            Ok::<_, ApiError>(StudentRepository::new(tx).insert(&draft)?)
        })?;
        tracing::info!(
            student_id = %student.id,
            grade = student.grade,
            class = student.class,
            "学生已登记"
        );
        Ok(student)
    }

    pub fn get_student(&self, student_id: StudentId) -> ApiResult<Student> {
        db::with_connection(&self.conn, |conn| {
            require(StudentRepository::new(conn).find_by_id(student_id)?, "学生", student_id)
        })
    }

    /// 某年级某班的学生
    pub fn class_students(&self, grade: i64, class: i64) -> ApiResult<Vec<Student>> {
        let grade = validate_grade(grade)?;
        let class = validate_class(class)?;
        db::with_connection(&self.conn, |conn| {
            Ok(StudentRepository::new(conn).find_by_class(grade, class)?)
        })
    }
}

fn required_name(raw: &str, field: &str) -> ApiResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{}不能为空", field)));
    }
    Ok(trimmed.to_string())
}
