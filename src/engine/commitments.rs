// ==========================================
// 学校课表系统 - 占用时间查询
// ==========================================
// 职责: 定义引擎消费的占用查询接口,并收集单次校验所需的快照
// 红线: 引擎只读快照,不修改、不缓存
// ==========================================

use crate::domain::school::Course;
use crate::domain::timetable::CourseSnapshot;
use crate::domain::types::{CourseId, StudentId, TeacherId, TimePoint};
use crate::repository::error::RepositoryResult;
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// Trait: CommitmentLookup
// ==========================================
// 实现方: LessonRepository (SQLite) / 测试中的内存实现
pub trait CommitmentLookup {
    /// 课程已排课时的时间点
    fn course_lesson_times(&self, course_id: CourseId) -> RepositoryResult<BTreeSet<TimePoint>>;

    /// 学生在所有已选课程中的课时时间点
    fn student_lesson_times(&self, student_id: StudentId)
        -> RepositoryResult<BTreeSet<TimePoint>>;

    /// 教师在所有授课课程中的课时时间点
    fn teacher_lesson_times(&self, teacher_id: TeacherId)
        -> RepositoryResult<BTreeSet<TimePoint>>;
}

// ==========================================
// CommitmentSnapshot - 单次校验的占用快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentSnapshot {
    pub course_id: CourseId,
    pub teacher_id: TeacherId,
    pub course_times: BTreeSet<TimePoint>,
    pub student_times: BTreeMap<StudentId, BTreeSet<TimePoint>>,
    pub teacher_times: BTreeSet<TimePoint>,
}

impl CommitmentSnapshot {
    /// 收集课程、已选学生、授课教师的占用时间
    ///
    /// # 参数
    /// - lookup: 占用查询实现 (调用方应保证处于同一事务内)
    /// - course: 目标课程
    /// - students: 课程已选学生
    pub fn collect<L>(lookup: &L, course: &Course, students: &[StudentId]) -> RepositoryResult<Self>
    where
        L: CommitmentLookup + ?Sized,
    {
        let course_times = lookup.course_lesson_times(course.id)?;
        let student_times = students
            .iter()
            .map(|id| lookup.student_lesson_times(*id).map(|times| (*id, times)))
            .collect::<RepositoryResult<BTreeMap<_, _>>>()?;
        let teacher_times = lookup.teacher_lesson_times(course.teacher_id)?;

        tracing::debug!(
            course_id = %course.id,
            course_lessons = course_times.len(),
            students = student_times.len(),
            teacher_lessons = teacher_times.len(),
            "占用快照已收集"
        );

        Ok(Self {
            course_id: course.id,
            teacher_id: course.teacher_id,
            course_times,
            student_times,
            teacher_times,
        })
    }

    /// 移除被调走课时的原时间点 (调课时使用)
    ///
    /// 只从该课时实际占用的集合中移除:
    /// 原课程的课时集合、原课程教师、原课程已选学生。
    /// 调课到其他课程时,目标课程自身的同一时间点不受影响。
    ///
    /// # 参数
    /// - time: 课时原时间
    /// - owner: 课时原属课程的快照
    pub fn vacate(mut self, time: TimePoint, owner: &CourseSnapshot) -> Self {
        if owner.course.id == self.course_id {
            self.course_times.remove(&time);
        }
        if owner.course.teacher_id == self.teacher_id {
            self.teacher_times.remove(&time);
        }
        for (student_id, times) in self.student_times.iter_mut() {
            if owner.enrolled.contains(student_id) {
                times.remove(&time);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::SubjectId;
    use std::collections::HashMap;

    // ==========================================
    // 内存版占用查询
    // ==========================================
    #[derive(Default)]
    struct InMemoryLookup {
        courses: HashMap<CourseId, BTreeSet<TimePoint>>,
        students: HashMap<StudentId, BTreeSet<TimePoint>>,
        teachers: HashMap<TeacherId, BTreeSet<TimePoint>>,
    }

    impl CommitmentLookup for InMemoryLookup {
        fn course_lesson_times(&self, id: CourseId) -> RepositoryResult<BTreeSet<TimePoint>> {
            Ok(self.courses.get(&id).cloned().unwrap_or_default())
        }

        fn student_lesson_times(&self, id: StudentId) -> RepositoryResult<BTreeSet<TimePoint>> {
            Ok(self.students.get(&id).cloned().unwrap_or_default())
        }

        fn teacher_lesson_times(&self, id: TeacherId) -> RepositoryResult<BTreeSet<TimePoint>> {
            Ok(self.teachers.get(&id).cloned().unwrap_or_default())
        }
    }

    fn tp(raw: &str) -> TimePoint {
        TimePoint::parse(raw).unwrap()
    }

    fn set(raws: &[&str]) -> BTreeSet<TimePoint> {
        raws.iter().map(|raw| tp(raw)).collect()
    }

    fn course(id: i64, teacher: i64) -> Course {
        Course {
            id: CourseId(id),
            subject_id: SubjectId(1),
            teacher_id: TeacherId(teacher),
            for_grade: 2,
            for_class: 1,
        }
    }

    fn owner(course: Course, enrolled: &[i64]) -> CourseSnapshot {
        CourseSnapshot {
            course,
            enrolled: enrolled.iter().map(|id| StudentId(*id)).collect(),
            lesson_times: BTreeSet::new(),
        }
    }

    #[test]
    fn test_collect_unknown_ids_yield_empty_sets() {
        let mut lookup = InMemoryLookup::default();
        lookup.students.insert(StudentId(1), set(&["2022-06-09T08:00"]));

        let snapshot =
            CommitmentSnapshot::collect(&lookup, &course(7, 16), &[StudentId(1), StudentId(2)])
                .unwrap();
        assert!(snapshot.course_times.is_empty());
        assert!(snapshot.teacher_times.is_empty());
        assert_eq!(snapshot.student_times.len(), 2);
        assert_eq!(snapshot.student_times[&StudentId(1)], set(&["2022-06-09T08:00"]));
        assert!(snapshot.student_times[&StudentId(2)].is_empty());
    }

    #[test]
    fn test_vacate_within_same_course() {
        let own = "2022-06-09T08:00";
        let mut lookup = InMemoryLookup::default();
        lookup.courses.insert(CourseId(7), set(&[own, "2022-06-10T08:00"]));
        lookup.students.insert(StudentId(1), set(&[own]));
        lookup.teachers.insert(TeacherId(16), set(&[own]));

        let target = course(7, 16);
        let snapshot = CommitmentSnapshot::collect(&lookup, &target, &[StudentId(1)])
            .unwrap()
            .vacate(tp(own), &owner(target, &[1]));

        assert_eq!(snapshot.course_times, set(&["2022-06-10T08:00"]));
        assert!(snapshot.student_times[&StudentId(1)].is_empty());
        assert!(snapshot.teacher_times.is_empty());
    }

    #[test]
    fn test_vacate_when_moving_to_another_course() {
        // 课时从课程 7 (教师 16) 调到课程 8 (教师 17)
        // 学生 2 只在课程 8 中, 其同一时间的占用来自其他课程, 不得移除
        let own = "2022-06-09T08:00";
        let mut lookup = InMemoryLookup::default();
        lookup.courses.insert(CourseId(8), set(&[own]));
        lookup.students.insert(StudentId(1), set(&[own]));
        lookup.students.insert(StudentId(2), set(&[own]));
        lookup.teachers.insert(TeacherId(17), set(&[own]));

        let target = course(8, 17);
        let snapshot =
            CommitmentSnapshot::collect(&lookup, &target, &[StudentId(1), StudentId(2)])
                .unwrap()
                .vacate(tp(own), &owner(course(7, 16), &[1]));

        assert_eq!(snapshot.course_times, set(&[own]));
        assert!(snapshot.student_times[&StudentId(1)].is_empty());
        assert_eq!(snapshot.student_times[&StudentId(2)], set(&[own]));
        assert_eq!(snapshot.teacher_times, set(&[own]));
    }
}
