// ==========================================
// 学校课表系统 - 排课冲突引擎
// ==========================================
// 职责: 判定一批待排课时能否放入课表
// 输入: 待排课时 + 课程/学生/教师占用快照
// 输出: ConflictReport (接受 / 拒绝 + 冲突时间点)
// ==========================================
// 检查顺序 (固定, 第一个失败项决定拒绝原因):
// 1. 周末
// 2. 课程内重复课时
// 3. 学生课表冲突
// 4. 教师课表冲突
// ==========================================
// 红线: 纯函数,不做 I/O,不修改输入
// 注: 同一批次内的重复时间点不在此处特判
// ==========================================

use crate::domain::timetable::{ConflictReport, ProposedLesson, Rejection, RejectionKind};
use crate::domain::types::TimePoint;
use crate::engine::commitments::CommitmentSnapshot;
use crate::engine::slot_catalog::SlotCatalog;
use std::collections::BTreeSet;
use std::sync::Arc;

// ==========================================
// ConflictEngine - 排课冲突引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct ConflictEngine {
    catalog: Arc<SlotCatalog>,
}

impl ConflictEngine {
    pub fn new(catalog: Arc<SlotCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &SlotCatalog {
        &self.catalog
    }

    /// 待排课时 -> 时间点 (保持输入顺序)
    pub fn time_points(&self, proposed: &[ProposedLesson]) -> Vec<TimePoint> {
        proposed
            .iter()
            .map(|lesson| self.catalog.time_point(lesson.date, lesson.slot))
            .collect()
    }

    /// 校验待排课时
    ///
    /// # 参数
    /// - proposed: 同一课程的待排课时 (可为空,空批次直接接受)
    /// - course_existing_times: 课程已有课时
    /// - student_schedule_sets: 课程每个已选学生的占用
    /// - teacher_schedule_set: 授课教师的占用
    ///
    /// # 返回
    /// - Accepted: 全部检查通过
    /// - Rejected: 第一个失败检查的原因 + 全部冲突时间点
    pub fn validate<'a, S>(
        &self,
        proposed: &[ProposedLesson],
        course_existing_times: &BTreeSet<TimePoint>,
        student_schedule_sets: S,
        teacher_schedule_set: &BTreeSet<TimePoint>,
    ) -> ConflictReport
    where
        S: IntoIterator<Item = &'a BTreeSet<TimePoint>>,
    {
        if proposed.is_empty() {
            tracing::debug!("空排课批次,直接接受");
            return ConflictReport::Accepted;
        }

        let proposed_times = self.time_points(proposed);

        // 检查 1: 周末
        let weekend: BTreeSet<TimePoint> = proposed_times
            .iter()
            .copied()
            .filter(TimePoint::is_weekend)
            .collect();
        if !weekend.is_empty() {
            return Self::reject(RejectionKind::WeekendViolation, weekend);
        }

        let proposed_set: BTreeSet<TimePoint> = proposed_times.into_iter().collect();

        // 检查 2: 课程内重复
        let duplicates: BTreeSet<TimePoint> = proposed_set
            .intersection(course_existing_times)
            .copied()
            .collect();
        if !duplicates.is_empty() {
            return Self::reject(RejectionKind::DuplicateLesson, duplicates);
        }

        // 检查 3: 学生冲突 (所有学生占用的并集 ∩ 待排时间点)
        let mut student_overlap = BTreeSet::new();
        for schedule in student_schedule_sets {
            student_overlap.extend(proposed_set.intersection(schedule).copied());
            if student_overlap.len() == proposed_set.len() {
                break;
            }
        }
        if !student_overlap.is_empty() {
            return Self::reject(RejectionKind::StudentOverlap, student_overlap);
        }

        // 检查 4: 教师冲突
        let teacher_overlap: BTreeSet<TimePoint> = proposed_set
            .intersection(teacher_schedule_set)
            .copied()
            .collect();
        if !teacher_overlap.is_empty() {
            return Self::reject(RejectionKind::TeacherOverlap, teacher_overlap);
        }

        tracing::debug!(lessons = proposed.len(), "排课校验通过");
        ConflictReport::Accepted
    }

    /// 以占用快照校验
    pub fn validate_snapshot(
        &self,
        proposed: &[ProposedLesson],
        snapshot: &CommitmentSnapshot,
    ) -> ConflictReport {
        self.validate(
            proposed,
            &snapshot.course_times,
            snapshot.student_times.values(),
            &snapshot.teacher_times,
        )
    }

    fn reject(kind: RejectionKind, times: BTreeSet<TimePoint>) -> ConflictReport {
        tracing::debug!(%kind, conflicts = times.len(), "排课校验拒绝");
        ConflictReport::Rejected(Rejection::at_times(kind, times))
    }
}
