// ==========================================
// 学校课表系统 - 课程 API
// ==========================================
// 职责: 课程创建、修改、删除与查询
// 红线: 修改课程不得让已排课时或已选学生违反排课规则
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::error::{ApiError, ApiResult};
use crate::api::placement::require;
use crate::db;
use crate::domain::school::{Course, Student};
use crate::domain::types::{
    validate_class, validate_grade, CourseId, StudentId, SubjectId, TeacherId, TimePoint,
};
use crate::engine::CommitmentLookup;
use crate::repository::{
    CourseRepository, LessonRepository, SubjectRepository, TeacherRepository,
};
use std::collections::BTreeSet;

// ==========================================
// CourseApi - 课程 API
// ==========================================
pub struct CourseApi {
    conn: Arc<Mutex<Connection>>,
}

impl CourseApi {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 创建课程
    ///
    /// # 参数
    /// - subject_id: 科目
    /// - teacher_id: 授课教师
    /// - for_grade: 年级 (1..=12)
    /// - for_class: 班级 (0 表示该年级任意班级)
    ///
    /// # 返回
    /// - Ok(Course): 新建课程
    /// - Err(NotFound): 科目或教师不存在
    /// - Err(BusinessRuleViolation): 已存在相同科目/教师/年级/班级的课程
    pub fn create_course(
        &self,
        subject_id: SubjectId,
        teacher_id: TeacherId,
        for_grade: i64,
        for_class: i64,
    ) -> ApiResult<Course> {
        let for_grade = validate_grade(for_grade)?;
        let for_class = validate_class(for_class)?;

        let course = db::unit_of_work(&self.conn, |tx| {
            require(SubjectRepository::new(tx).find_by_id(subject_id)?, "科目", subject_id)?;
            require(TeacherRepository::new(tx).find_by_id(teacher_id)?, "教师", teacher_id)?;

            let courses = CourseRepository::new(tx);
            if let Some(existing) =
                courses.find_duplicate(subject_id, teacher_id, for_grade, for_class)?
            {
                tracing::warn!(course_id = %existing.id, "课程已存在");
                return Err(ApiError::BusinessRuleViolation(format!(
                    "课程已存在: course_id={}",
                    existing.id
                )));
            }

            let course = courses.insert(&Course {
                id: CourseId(0),
                subject_id,
                teacher_id,
                for_grade,
                for_class,
            })?;
            Ok(course)
        })?;

        tracing::info!(
            course_id = %course.id,
            subject_id = %subject_id,
            teacher_id = %teacher_id,
            for_grade,
            for_class,
            "课程已创建"
        );
        Ok(course)
    }

    /// 修改课程
    ///
    /// # 参数
    /// - course_id: 待修改课程
    /// - 其余参数同 create_course
    ///
    /// # 返回
    /// - Ok(Course): 修改后的课程
    /// - Err(NotFound): 课程、科目或教师不存在
    /// - Err(InvalidInput): 年级/班级超出范围
    /// - Err(BusinessRuleViolation): 与其他课程重复; 新教师在本课程的课时上已有课;
    ///   已选学生不满足新的年级/班级限制
    pub fn update_course(
        &self,
        course_id: CourseId,
        subject_id: SubjectId,
        teacher_id: TeacherId,
        for_grade: i64,
        for_class: i64,
    ) -> ApiResult<Course> {
        let for_grade = validate_grade(for_grade)?;
        let for_class = validate_class(for_class)?;

        let course = db::unit_of_work(&self.conn, |tx| {
            let courses = CourseRepository::new(tx);
            let current = require(courses.find_by_id(course_id)?, "课程", course_id)?;
            require(SubjectRepository::new(tx).find_by_id(subject_id)?, "科目", subject_id)?;
            require(TeacherRepository::new(tx).find_by_id(teacher_id)?, "教师", teacher_id)?;

            if let Some(existing) =
                courses.find_duplicate(subject_id, teacher_id, for_grade, for_class)?
            {
                if existing.id != course_id {
                    tracing::warn!(course_id = %course_id, duplicate_of = %existing.id, "课程已存在");
                    return Err(ApiError::BusinessRuleViolation(format!(
                        "课程已存在: course_id={}",
                        existing.id
                    )));
                }
            }

            let updated = Course {
                id: course_id,
                subject_id,
                teacher_id,
                for_grade,
                for_class,
            };

            if updated.teacher_id != current.teacher_id {
                let lessons = LessonRepository::new(tx);
                let own = lessons.course_lesson_times(course_id)?;
                let busy: BTreeSet<TimePoint> = lessons
                    .teacher_lesson_times(teacher_id)?
                    .intersection(&own)
                    .copied()
                    .collect();
                if !busy.is_empty() {
                    tracing::warn!(course_id = %course_id, teacher_id = %teacher_id, ?busy, "新教师课时冲突");
                    return Err(ApiError::BusinessRuleViolation(format!(
                        "教师(id={})在以下时间已有课: {}",
                        teacher_id,
                        join_display(&busy)
                    )));
                }
            }

            let excluded: BTreeSet<StudentId> = courses
                .enrolled_students(course_id)?
                .into_iter()
                .filter(|student| !updated.admits(student))
                .map(|student| student.id)
                .collect();
            if !excluded.is_empty() {
                tracing::warn!(course_id = %course_id, ?excluded, "已选学生不满足新的年级/班级限制");
                return Err(ApiError::BusinessRuleViolation(format!(
                    "已选学生不满足年级/班级限制: {}",
                    join_display(&excluded)
                )));
            }

            courses.update(&updated)?;
            Ok(updated)
        })?;

        tracing::info!(
            course_id = %course.id,
            subject_id = %course.subject_id,
            teacher_id = %course.teacher_id,
            for_grade = course.for_grade,
            for_class = course.for_class,
            "课程已修改"
        );
        Ok(course)
    }

    /// 删除课程,连同其课时与选课关系
    ///
    /// # 返回
    /// - Err(NotFound): 课程不存在
    pub fn delete_course(&self, course_id: CourseId) -> ApiResult<()> {
        db::unit_of_work(&self.conn, |tx| {
            let deleted = CourseRepository::new(tx).delete(course_id)?;
            require((deleted > 0).then_some(()), "课程", course_id)
        })?;

        tracing::info!(course_id = %course_id, "课程已删除");
        Ok(())
    }

    pub fn get_course(&self, course_id: CourseId) -> ApiResult<Course> {
        db::with_connection(&self.conn, |conn| {
            require(CourseRepository::new(conn).find_by_id(course_id)?, "课程", course_id)
        })
    }

    pub fn list_courses(&self) -> ApiResult<Vec<Course>> {
        db::with_connection(&self.conn, |conn| Ok(CourseRepository::new(conn).list_all()?))
    }

    /// 课程已选学生
    pub fn course_students(&self, course_id: CourseId) -> ApiResult<Vec<Student>> {
        db::with_connection(&self.conn, |conn| {
            let courses = CourseRepository::new(conn);
            require(courses.find_by_id(course_id)?, "课程", course_id)?;
            Ok(courses.enrolled_students(course_id)?)
        })
    }
}

fn join_display<T: std::fmt::Display>(items: &BTreeSet<T>) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
