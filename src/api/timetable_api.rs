// ==========================================
// 学校课表系统 - 排课 API
// ==========================================
// 职责: 课时新增、调课、删除与课表查询
// 流程: 同一事务内 "读取占用快照 -> 冲突校验 -> 写入"
// ==========================================

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::api::error::{ApiError, ApiResult};
use crate::api::placement::{require, PlacementResult};
use crate::db;
use crate::domain::school::Lesson;
use crate::domain::timetable::{ConflictReport, ProposedLesson};
use crate::domain::types::{CourseId, LessonId, LessonSlotIndex, StudentId, TeacherId, TimePoint};
use crate::engine::{CommitmentSnapshot, ConflictEngine};
use crate::repository::{CourseRepository, LessonRepository, StudentRepository, TeacherRepository};

/// 排课请求: 日期 + 第几节课 (1..=8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRequest {
    pub date: NaiveDate,
    pub slot: i64,
}

impl LessonRequest {
    pub fn new(date: NaiveDate, slot: i64) -> Self {
        Self { date, slot }
    }
}

// ==========================================
// TimetableApi - 排课 API
// ==========================================
pub struct TimetableApi {
    conn: Arc<Mutex<Connection>>,
    engine: ConflictEngine,
}

impl TimetableApi {
    pub fn new(conn: Arc<Mutex<Connection>>, engine: ConflictEngine) -> Self {
        Self { conn, engine }
    }

    // ==========================================
    // 写操作
    // ==========================================

    /// 为课程新增一批课时
    ///
    /// # 参数
    /// - course_id: 课程
    /// - requests: 待排课时 (日期 + 节次)
    ///
    /// # 返回
    /// - Ok(Applied(lessons)): 全部写入
    /// - Ok(Rejected(rejection)): 冲突,未写入任何课时
    /// - Err(InvalidInput): 节次越界
    /// - Err(NotFound): 课程不存在
    pub fn add_lessons(
        &self,
        course_id: CourseId,
        requests: &[LessonRequest],
    ) -> ApiResult<PlacementResult<Vec<Lesson>>> {
        let proposed = to_proposed(course_id, requests)?;

        db::unit_of_work(&self.conn, |tx| {
            let courses = CourseRepository::new(tx);
            let course = require(courses.find_by_id(course_id)?, "课程", course_id)?;
            let students = courses.enrolled_student_ids(course_id)?;

            let lessons = LessonRepository::new(tx);
            let snapshot = CommitmentSnapshot::collect(&lessons, &course, &students)?;

            match self.engine.validate_snapshot(&proposed, &snapshot) {
                ConflictReport::Accepted => {
                    // 批次内重复时间点只写入一次
                    let mut seen = HashSet::new();
                    let times: Vec<TimePoint> = self
                        .engine
                        .time_points(&proposed)
                        .into_iter()
                        .filter(|time| seen.insert(*time))
                        .collect();

                    let inserted = lessons.insert_batch(course_id, &times)?;
                    tracing::info!(course_id = %course_id, lessons = inserted.len(), "课时已排入");
                    Ok(PlacementResult::Applied(inserted))
                }
                ConflictReport::Rejected(rejection) => {
                    tracing::warn!(course_id = %course_id, %rejection, "排课被拒绝");
                    Ok(PlacementResult::Rejected(rejection))
                }
            }
        })
    }

    /// 调课: 修改课时的时间,可同时改到其他课程
    ///
    /// 课时原时间在校验前从原课程、原教师、原课程学生的占用中移除,
    /// 因此 "原地不动" 的调课不会与自身冲突
    pub fn move_lesson(
        &self,
        lesson_id: LessonId,
        course_id: CourseId,
        date: NaiveDate,
        slot: i64,
    ) -> ApiResult<PlacementResult<Lesson>> {
        let proposed = ProposedLesson::new(course_id, date, LessonSlotIndex::new(slot)?);

        db::unit_of_work(&self.conn, |tx| {
            let lessons = LessonRepository::new(tx);
            let existing = require(lessons.find_by_id(lesson_id)?, "课时", lesson_id)?;

            let courses = CourseRepository::new(tx);
            let course = require(courses.find_by_id(course_id)?, "课程", course_id)?;
            let owner = require(
                courses.snapshot(existing.course_id)?,
                "课程",
                existing.course_id,
            )?;
            let students = courses.enrolled_student_ids(course_id)?;

            let snapshot = CommitmentSnapshot::collect(&lessons, &course, &students)?
                .vacate(existing.time, &owner);

            match self.engine.validate_snapshot(&[proposed], &snapshot) {
                ConflictReport::Accepted => {
                    let moved = Lesson {
                        id: lesson_id,
                        course_id,
                        time: self.engine.catalog().time_point(date, proposed.slot),
                    };
                    lessons.update(&moved)?;
                    tracing::info!(
                        lesson_id = %lesson_id,
                        course_id = %course_id,
                        from = %existing.time,
                        to = %moved.time,
                        "课时已调整"
                    );
                    Ok(PlacementResult::Applied(moved))
                }
                ConflictReport::Rejected(rejection) => {
                    tracing::warn!(lesson_id = %lesson_id, %rejection, "调课被拒绝");
                    Ok(PlacementResult::Rejected(rejection))
                }
            }
        })
    }

    /// 删除课时
    pub fn delete_lesson(&self, lesson_id: LessonId) -> ApiResult<()> {
        db::unit_of_work(&self.conn, |tx| {
            let lessons = LessonRepository::new(tx);
            if lessons.delete(lesson_id)? == 0 {
                return require(None::<()>, "课时", lesson_id);
            }
            tracing::info!(lesson_id = %lesson_id, "课时已删除");
            Ok(())
        })
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn get_lesson(&self, lesson_id: LessonId) -> ApiResult<Lesson> {
        db::with_connection(&self.conn, |conn| {
            require(LessonRepository::new(conn).find_by_id(lesson_id)?, "课时", lesson_id)
        })
    }

    /// 课程的全部课时
    pub fn course_lessons(&self, course_id: CourseId) -> ApiResult<Vec<Lesson>> {
        db::with_connection(&self.conn, |conn| {
            Ok(LessonRepository::new(conn).list_by_course(course_id)?)
        })
    }

    /// 学生课表
    pub fn student_lessons(&self, student_id: StudentId) -> ApiResult<Vec<Lesson>> {
        self.student_schedule(student_id, None)
    }

    /// 学生某天的课表 (按时间排序)
    pub fn student_day(&self, student_id: StudentId, day: NaiveDate) -> ApiResult<Vec<Lesson>> {
        self.student_schedule(student_id, Some(day))
    }

    /// 教师课表
    pub fn teacher_lessons(&self, teacher_id: TeacherId) -> ApiResult<Vec<Lesson>> {
        self.teacher_schedule(teacher_id, None)
    }

    /// 教师某天的课表 (按时间排序)
    pub fn teacher_day(&self, teacher_id: TeacherId, day: NaiveDate) -> ApiResult<Vec<Lesson>> {
        self.teacher_schedule(teacher_id, Some(day))
    }

    fn student_schedule(
        &self,
        student_id: StudentId,
        day: Option<NaiveDate>,
    ) -> ApiResult<Vec<Lesson>> {
        db::with_connection(&self.conn, |conn| {
            require(StudentRepository::new(conn).find_by_id(student_id)?, "学生", student_id)?;
            Ok(LessonRepository::new(conn).list_by_student(student_id, day)?)
        })
    }

    fn teacher_schedule(
        &self,
        teacher_id: TeacherId,
        day: Option<NaiveDate>,
    ) -> ApiResult<Vec<Lesson>> {
        db::with_connection(&self.conn, |conn| {
            require(TeacherRepository::new(conn).find_by_id(teacher_id)?, "教师", teacher_id)?;
            Ok(LessonRepository::new(conn).list_by_teacher(teacher_id, day)?)
        })
    }
}

/// 请求 -> 待排课时 (节次越界即返回 InvalidInput)
fn to_proposed(course_id: CourseId, requests: &[LessonRequest]) -> ApiResult<Vec<ProposedLesson>> {
    requests
        .iter()
        .map(|request| {
            let slot = LessonSlotIndex::new(request.slot).map_err(ApiError::from)?;
            Ok(ProposedLesson::new(course_id, request.date, slot))
        })
        .collect()
}
