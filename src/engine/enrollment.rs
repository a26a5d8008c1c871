// ==========================================
// 学校课表系统 - 批量选课校验
// ==========================================
// 职责: 校验将一批学生(如整个班级)加入已排课课程
// 输入: 课程快照 + 候选学生课表
// 输出: ConflictReport
// ==========================================
// 检查顺序:
// 1. 候选为空 -> NO_CANDIDATES
// 2. 年级不符 -> GRADE_MISMATCH
// 3. 班级不符 -> CLASS_MISMATCH (课程 for_class=0 时不限班级)
// 4. 已在课程中 -> ALREADY_ENROLLED (先于课表冲突)
// 5. 候选学生占用并集 ∩ 课程已有课时 -> STUDENT_OVERLAP
// ==========================================

use crate::domain::timetable::{
    ConflictReport, CourseSnapshot, Rejection, RejectionKind, StudentSchedule,
};
use crate::domain::types::{StudentId, TimePoint};
use std::collections::BTreeSet;

// ==========================================
// EnrollmentPlanner - 选课校验器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrollmentPlanner;

impl EnrollmentPlanner {
    pub fn new() -> Self {
        Self
    }

    /// 校验批量选课
    ///
    /// # 参数
    /// - course: 课程快照 (含已选学生与已排课时)
    /// - candidates: 候选学生及其现有课表
    pub fn validate_bulk_assignment(
        &self,
        course: &CourseSnapshot,
        candidates: &[StudentSchedule],
    ) -> ConflictReport {
        if candidates.is_empty() {
            tracing::debug!(course_id = %course.course.id, "没有候选学生");
            return Rejection::for_students(RejectionKind::NoCandidates, BTreeSet::new()).into();
        }

        // 资格预检: 年级 / 班级
        let wrong_grade: BTreeSet<StudentId> = candidates
            .iter()
            .filter(|c| !course.course.admits_grade(c.student.grade))
            .map(|c| c.student.id)
            .collect();
        if !wrong_grade.is_empty() {
            return Self::reject_students(RejectionKind::GradeMismatch, wrong_grade);
        }

        let wrong_class: BTreeSet<StudentId> = candidates
            .iter()
            .filter(|c| !course.course.admits_class(c.student.class))
            .map(|c| c.student.id)
            .collect();
        if !wrong_class.is_empty() {
            return Self::reject_students(RejectionKind::ClassMismatch, wrong_class);
        }

        // 选课状态
        let candidate_ids: BTreeSet<StudentId> = candidates.iter().map(|c| c.student.id).collect();
        let already: BTreeSet<StudentId> = candidate_ids
            .intersection(&course.enrolled)
            .copied()
            .collect();
        if !already.is_empty() {
            return Self::reject_students(RejectionKind::AlreadyEnrolled, already);
        }

        // 课表冲突: 与已排课课程比对
        let busy: BTreeSet<TimePoint> = candidates
            .iter()
            .flat_map(|c| c.times.iter().copied())
            .collect();
        let overlap: BTreeSet<TimePoint> = busy
            .intersection(&course.lesson_times)
            .copied()
            .collect();
        if !overlap.is_empty() {
            tracing::debug!(
                course_id = %course.course.id,
                conflicts = overlap.len(),
                "选课校验拒绝: 学生课表冲突"
            );
            return Rejection::at_times(RejectionKind::StudentOverlap, overlap).into();
        }

        tracing::debug!(
            course_id = %course.course.id,
            candidates = candidates.len(),
            "选课校验通过"
        );
        ConflictReport::Accepted
    }

    /// 校验单个学生选课 (与批量规则一致)
    pub fn validate_single(
        &self,
        course: &CourseSnapshot,
        candidate: &StudentSchedule,
    ) -> ConflictReport {
        self.validate_bulk_assignment(course, std::slice::from_ref(candidate))
    }

    fn reject_students(kind: RejectionKind, students: BTreeSet<StudentId>) -> ConflictReport {
        tracing::debug!(%kind, students = students.len(), "选课校验拒绝");
        Rejection::for_students(kind, students).into()
    }
}
