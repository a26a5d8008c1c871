// ==========================================
// 学校课表系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、值对象、排课结果
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod school;
pub mod timetable;
pub mod types;

// 重导出核心类型
pub use school::{Course, Lesson, Student, Subject, Teacher};
pub use timetable::{
    ConflictReport, CourseSnapshot, ProposedLesson, Rejection, RejectionKind, StudentSchedule,
};
pub use types::{
    is_weekend, CourseId, LessonId, LessonSlotIndex, ScheduleInputError, StudentId, SubjectId,
    TeacherId, TimePoint,
};
