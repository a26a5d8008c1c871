// ==========================================
// 学校课表系统 - 排课领域模型
// ==========================================
// 职责: 排课请求、占用快照、冲突报告
// 生命周期: 均为单次请求内的瞬时值,校验结束即丢弃
// ==========================================

use crate::domain::school::{Course, Student};
use crate::domain::types::{CourseId, LessonSlotIndex, StudentId, TimePoint};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ==========================================
// ProposedLesson - 待排课时
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedLesson {
    pub date: NaiveDate,
    pub slot: LessonSlotIndex,
    pub course_id: CourseId,
}

impl ProposedLesson {
    pub fn new(course_id: CourseId, date: NaiveDate, slot: LessonSlotIndex) -> Self {
        Self {
            date,
            slot,
            course_id,
        }
    }
}

// ==========================================
// CourseSnapshot - 课程快照
// ==========================================
// 课程 + 已选学生 + 已排课时时间点 (持久层读取的只读快照)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSnapshot {
    pub course: Course,
    pub enrolled: BTreeSet<StudentId>,
    pub lesson_times: BTreeSet<TimePoint>,
}

// ==========================================
// StudentSchedule - 学生课表
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentSchedule {
    pub student: Student,
    pub times: BTreeSet<TimePoint>,
}

// ==========================================
// RejectionKind - 拒绝原因分类
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionKind {
    // ===== 课表冲突 =====
    WeekendViolation, // 课时落在周末
    DuplicateLesson,  // 课程在该时间点已有课时
    StudentOverlap,   // 学生在该时间点已有课
    TeacherOverlap,   // 教师在该时间点已有课

    // ===== 选课状态 =====
    AlreadyEnrolled, // 学生已在课程中
    GradeMismatch,   // 年级不符
    ClassMismatch,   // 班级不符
    NoCandidates,    // 没有待选学生
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RejectionKind::WeekendViolation => "WEEKEND_VIOLATION",
            RejectionKind::DuplicateLesson => "DUPLICATE_LESSON",
            RejectionKind::StudentOverlap => "STUDENT_OVERLAP",
            RejectionKind::TeacherOverlap => "TEACHER_OVERLAP",
            RejectionKind::AlreadyEnrolled => "ALREADY_ENROLLED",
            RejectionKind::GradeMismatch => "GRADE_MISMATCH",
            RejectionKind::ClassMismatch => "CLASS_MISMATCH",
            RejectionKind::NoCandidates => "NO_CANDIDATES",
        };
        write!(f, "{}", label)
    }
}

// ==========================================
// Rejection - 拒绝详情
// ==========================================
// time_points / student_ids 均已排序去重,便于测试按字段断言
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub kind: RejectionKind,
    pub time_points: Vec<TimePoint>,
    pub student_ids: Vec<StudentId>,
}

impl Rejection {
    pub fn at_times(kind: RejectionKind, times: BTreeSet<TimePoint>) -> Self {
        Self {
            kind,
            time_points: times.into_iter().collect(),
            student_ids: Vec::new(),
        }
    }

    pub fn for_students(kind: RejectionKind, students: BTreeSet<StudentId>) -> Self {
        Self {
            kind,
            time_points: Vec::new(),
            student_ids: students.into_iter().collect(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self.kind {
            RejectionKind::WeekendViolation => "课时不能安排在周末",
            RejectionKind::DuplicateLesson => "课程在该时间已有课时",
            RejectionKind::StudentOverlap => "学生课表冲突",
            RejectionKind::TeacherOverlap => "教师课表冲突",
            RejectionKind::AlreadyEnrolled => "学生已在课程中",
            RejectionKind::GradeMismatch => "学生年级与课程不符",
            RejectionKind::ClassMismatch => "学生班级与课程不符",
            RejectionKind::NoCandidates => "没有可加入课程的学生",
        };
        write!(f, "{}", message)?;

        if !self.time_points.is_empty() {
            let times: Vec<String> = self.time_points.iter().map(|t| t.to_string()).collect();
            write!(f, ": {}", times.join(", "))?;
        }
        if !self.student_ids.is_empty() {
            let ids: Vec<String> = self.student_ids.iter().map(|id| id.to_string()).collect();
            write!(f, " (student_id={})", ids.join(", "))?;
        }
        Ok(())
    }
}

// ==========================================
// ConflictReport - 校验结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictReport {
    Accepted,
    Rejected(Rejection),
}

impl ConflictReport {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ConflictReport::Accepted)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ConflictReport::Accepted => None,
            ConflictReport::Rejected(rejection) => Some(rejection),
        }
    }

    pub fn kind(&self) -> Option<RejectionKind> {
        self.rejection().map(|r| r.kind)
    }
}

impl From<Rejection> for ConflictReport {
    fn from(rejection: Rejection) -> Self {
        ConflictReport::Rejected(rejection)
    }
}
