// ==========================================
// 学校课表系统 - 选课 API
// ==========================================
// 职责: 单个学生/整班选课与退选
// 流程: 同一事务内 "读取课程快照与学生课表 -> 选课校验 -> 写入"
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::error::{ApiError, ApiResult};
use crate::api::placement::{require, PlacementResult};
use crate::db;
use crate::domain::school::Student;
use crate::domain::timetable::{ConflictReport, StudentSchedule};
use crate::domain::types::{validate_class, validate_grade, CourseId, StudentId};
use crate::engine::{CommitmentLookup, EnrollmentPlanner};
use crate::repository::{CourseRepository, LessonRepository, RepositoryResult, StudentRepository};

// ==========================================
// EnrollmentApi - 选课 API
// ==========================================
pub struct EnrollmentApi {
    conn: Arc<Mutex<Connection>>,
    planner: EnrollmentPlanner,
}

impl EnrollmentApi {
    pub fn new(conn: Arc<Mutex<Connection>>, planner: EnrollmentPlanner) -> Self {
        Self { conn, planner }
    }

    /// 单个学生选课
    ///
    /// # 返回
    /// - Ok(Applied(student)): 已加入课程
    /// - Ok(Rejected(rejection)): 年级/班级不符、已选或课表冲突
    /// - Err(NotFound): 课程或学生不存在
    pub fn enroll_student(
        &self,
        course_id: CourseId,
        student_id: StudentId,
    ) -> ApiResult<PlacementResult<Student>> {
        db::unit_of_work(&self.conn, |tx| {
            let courses = CourseRepository::new(tx);
            let course = require(courses.snapshot(course_id)?, "课程", course_id)?;
            let student = require(
                StudentRepository::new(tx).find_by_id(student_id)?,
                "学生",
                student_id,
            )?;
            let candidate = schedule_of(&LessonRepository::new(tx), student)?;

            match self.planner.validate_single(&course, &candidate) {
                ConflictReport::Accepted => {
                    courses.enroll_students(course_id, &[student_id])?;
                    tracing::info!(course_id = %course_id, student_id = %student_id, "学生已选课");
                    Ok(PlacementResult::Applied(candidate.student))
                }
                ConflictReport::Rejected(rejection) => {
                    tracing::warn!(course_id = %course_id, %rejection, "选课被拒绝");
                    Ok(PlacementResult::Rejected(rejection))
                }
            }
        })
    }

    /// 整班选课: 将某年级某班的全部学生加入课程
    ///
    /// # 参数
    /// - grade: 年级 (1..=12)
    /// - class: 班级 (0..=4)
    ///
    /// # 返回
    /// - Ok(Applied(students)): 全班已加入
    /// - Ok(Rejected(rejection)): 全班均未加入
    pub fn enroll_class(
        &self,
        course_id: CourseId,
        grade: i64,
        class: i64,
    ) -> ApiResult<PlacementResult<Vec<Student>>> {
        let grade = validate_grade(grade)?;
        let class = validate_class(class)?;

        db::unit_of_work(&self.conn, |tx| {
            let courses = CourseRepository::new(tx);
            let course = require(courses.snapshot(course_id)?, "课程", course_id)?;

            let lessons = LessonRepository::new(tx);
            let candidates = StudentRepository::new(tx)
                .find_by_class(grade, class)?
                .into_iter()
                .map(|student| schedule_of(&lessons, student))
                .collect::<RepositoryResult<Vec<_>>>()?;

            match self.planner.validate_bulk_assignment(&course, &candidates) {
                ConflictReport::Accepted => {
                    let ids: Vec<StudentId> = candidates.iter().map(|c| c.student.id).collect();
                    courses.enroll_students(course_id, &ids)?;
                    tracing::info!(
                        course_id = %course_id,
                        grade,
                        class,
                        students = ids.len(),
                        "整班已选课"
                    );
                    Ok(PlacementResult::Applied(
                        candidates.into_iter().map(|c| c.student).collect(),
                    ))
                }
                ConflictReport::Rejected(rejection) => {
                    tracing::warn!(course_id = %course_id, grade, class, %rejection, "整班选课被拒绝");
                    Ok(PlacementResult::Rejected(rejection))
                }
            }
        })
    }

    /// 单个学生退选
    pub fn unenroll_student(&self, course_id: CourseId, student_id: StudentId) -> ApiResult<()> {
        db::unit_of_work(&self.conn, |tx| {
            let courses = CourseRepository::new(tx);
            require(courses.find_by_id(course_id)?, "课程", course_id)?;

            if courses.unenroll_student(course_id, student_id)? == 0 {
                tracing::warn!(course_id = %course_id, student_id = %student_id, "学生未选该课程");
                return Err(ApiError::NotFound(format!(
                    "学生(id={})未选课程(id={})",
                    student_id, course_id
                )));
            }
            tracing::info!(course_id = %course_id, student_id = %student_id, "学生已退选");
            Ok(())
        })
    }

    /// 整班退选
    ///
    /// # 返回
    /// - Ok(n): 退选的学生数
    /// - Err(BusinessRuleViolation): 年级/班级与课程限制不符
    /// - Err(NotFound): 该班没有学生选这门课
    pub fn unenroll_class(&self, course_id: CourseId, grade: i64, class: i64) -> ApiResult<usize> {
        let grade = validate_grade(grade)?;
        let class = validate_class(class)?;

        db::unit_of_work(&self.conn, |tx| {
            let courses = CourseRepository::new(tx);
            let course = require(courses.find_by_id(course_id)?, "课程", course_id)?;

            if !course.admits_grade(grade) || !course.admits_class(class) {
                return Err(ApiError::BusinessRuleViolation(format!(
                    "{}年级{}班与课程(id={})的年级/班级限制不符",
                    grade, class, course_id
                )));
            }

            let removed = courses.unenroll_class(course_id, grade, class)?;
            if removed == 0 {
                tracing::warn!(course_id = %course_id, grade, class, "该班没有学生选这门课");
                return Err(ApiError::NotFound(format!(
                    "{}年级{}班没有学生选课程(id={})",
                    grade, class, course_id
                )));
            }
            tracing::info!(course_id = %course_id, grade, class, removed, "整班已退选");
            Ok(removed)
        })
    }
}

/// 学生 + 其现有课表
fn schedule_of<L>(lookup: &L, student: Student) -> RepositoryResult<StudentSchedule>
where
    L: CommitmentLookup + ?Sized,
{
    let times = lookup.student_lesson_times(student.id)?;
    Ok(StudentSchedule { student, times })
}
