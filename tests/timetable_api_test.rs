// ==========================================
// 排课 API 集成测试
// ==========================================
// 职责: 验证 "读快照 -> 冲突校验 -> 写入" 全流程
// ==========================================


#[cfg(test)]
mod timetable_api_test {
    use school_timetable::api::ApiError;
    use school_timetable::domain::types::{CourseId, LessonId, TimePoint};
    use school_timetable::{logging, PlacementResult, RejectionKind};

    use crate::test_helpers::*;

    fn tp(raw: &str) -> TimePoint {
        TimePoint::parse(raw).unwrap()
    }

    // ==========================================
    // 场景 A-D
    // ==========================================

    #[test]
    fn test_duplicate_lesson_in_same_course() {
        // 场景 A
        logging::init_test();
        let (_tmp, state) = setup_state();
        let teacher = seed_teacher(&state, "Ada", "Lovelace");
        let course = seed_course(&state, "Math", &teacher, 2, 1);

        expect_applied(
            state
                .timetable_api
                .add_lessons(course.id, &[lesson_at(2022, 6, 9, 1)])
                .unwrap(),
        );

        let result = state
            .timetable_api
            .add_lessons(course.id, &[lesson_at(2022, 6, 9, 1)])
            .unwrap();
        let rejection = result.rejection().unwrap();
        assert_eq!(rejection.kind, RejectionKind::DuplicateLesson);
        assert_eq!(rejection.time_points, vec![tp("2022-06-09T08:00")]);
        assert_eq!(state.timetable_api.course_lessons(course.id).unwrap().len(), 1);
    }

    #[test]
    fn test_student_overlap_via_other_course() {
        // 场景 B
        logging::init_test();
        let (_tmp, state) = setup_state();
        let math_teacher = seed_teacher(&state, "Ada", "Lovelace");
        let art_teacher = seed_teacher(&state, "Frida", "Kahlo");
        let math = seed_course(&state, "Math", &math_teacher, 2, 1);
        let art = seed_course(&state, "Art", &art_teacher, 2, 1);
        let student = seed_student(&state, "Jack", 2, 1);

        expect_applied(state.enrollment_api.enroll_student(math.id, student.id).unwrap());
        expect_applied(state.enrollment_api.enroll_student(art.id, student.id).unwrap());
        expect_applied(
            state
                .timetable_api
                .add_lessons(math.id, &[lesson_at(2022, 6, 9, 1)])
                .unwrap(),
        );

        let result = state
            .timetable_api
            .add_lessons(art.id, &[lesson_at(2022, 6, 9, 1)])
            .unwrap();
        let rejection = result.rejection().unwrap();
        assert_eq!(rejection.kind, RejectionKind::StudentOverlap);
        assert_eq!(rejection.time_points, vec![tp("2022-06-09T08:00")]);
        assert!(state.timetable_api.course_lessons(art.id).unwrap().is_empty());
    }

    #[test]
    fn test_teacher_overlap() {
        // 场景 C
        logging::init_test();
        let (_tmp, state) = setup_state();
        let teacher = seed_teacher(&state, "Ada", "Lovelace");
        let grade2 = seed_course(&state, "Math", &teacher, 2, 0);
        let grade3 = seed_course(&state, "Math", &teacher, 3, 0);

        expect_applied(
            state
                .timetable_api
                .add_lessons(grade2.id, &[lesson_at(2022, 6, 9, 1)])
                .unwrap(),
        );

        let result = state
            .timetable_api
            .add_lessons(grade3.id, &[lesson_at(2022, 6, 9, 1)])
            .unwrap();
        let rejection = result.rejection().unwrap();
        assert_eq!(rejection.kind, RejectionKind::TeacherOverlap);
        assert_eq!(rejection.time_points, vec![tp("2022-06-09T08:00")]);
    }

    #[test]
    fn test_weekend_violation() {
        // 场景 D: 2022-06-12 为周日, 第5节 12:00
        logging::init_test();
        let (_tmp, state) = setup_state();
        let teacher = seed_teacher(&state, "Ada", "Lovelace");
        let course = seed_course(&state, "Math", &teacher, 2, 1);

        let result = state
            .timetable_api
            .add_lessons(
                course.id,
                &[lesson_at(2022, 6, 10, 1), lesson_at(2022, 6, 12, 5)],
            )
            .unwrap();
        let rejection = result.rejection().unwrap();
        assert_eq!(rejection.kind, RejectionKind::WeekendViolation);
        assert_eq!(rejection.time_points, vec![tp("2022-06-12T12:00")]);

        // 整批拒绝: 周五的课时也未写入
        assert!(state.timetable_api.course_lessons(course.id).unwrap().is_empty());
    }

    // ==========================================
    // 输入与存在性
    // ==========================================

    #[test]
    fn test_invalid_slot_is_an_input_error() {
        logging::init_test();
        let (_tmp, state) = setup_state();
        let teacher = seed_teacher(&state, "Ada", "Lovelace");
        let course = seed_course(&state, "Math", &teacher, 2, 1);

        for slot in [0, 9] {
            let err = state
                .timetable_api
                .add_lessons(course.id, &[lesson_at(2022, 6, 9, slot)])
                .unwrap_err();
            assert!(matches!(err, ApiError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_unknown_course_is_not_found() {
        logging::init_test();
        let (_tmp, state) = setup_state();
        let err = state
            .timetable_api
            .add_lessons(CourseId(999), &[lesson_at(2022, 6, 9, 1)])
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_batch_with_repeated_time_is_stored_once() {
        logging::init_test();
        let (_tmp, state) = setup_state();
        let teacher = seed_teacher(&state, "Ada", "Lovelace");
        let course = seed_course(&state, "Math", &teacher, 2, 1);

        let lessons = expect_applied(
            state
                .timetable_api
                .add_lessons(
                    course.id,
                    &[lesson_at(2022, 6, 9, 3), lesson_at(2022, 6, 9, 3)],
                )
                .unwrap(),
        );
        assert_eq!(lessons.len(), 1);
        assert_eq!(lessons[0].time, tp("2022-06-09T09:50"));
    }

    // ==========================================
    // 调课与删除
    // ==========================================

    #[test]
    fn test_move_lesson_in_place_and_to_free_slot() {
        logging::init_test();
        let (_tmp, state) = setup_state();
        let teacher = seed_teacher(&state, "Ada", "Lovelace");
        let course = seed_course(&state, "Math", &teacher, 2, 1);
        let student = seed_student(&state, "Jack", 2, 1);
        expect_applied(state.enrollment_api.enroll_student(course.id, student.id).unwrap());

        let lesson = expect_applied(
            state
                .timetable_api
                .add_lessons(course.id, &[lesson_at(2022, 6, 9, 1)])
                .unwrap(),
        )
        .remove(0);

        // 原地不动: 不与自身冲突
        let same = expect_applied(
            state
                .timetable_api
                .move_lesson(lesson.id, course.id, date(2022, 6, 9), 1)
                .unwrap(),
        );
        assert_eq!(same.time, lesson.time);

        // 改到第2节
        let moved = expect_applied(
            state
                .timetable_api
                .move_lesson(lesson.id, course.id, date(2022, 6, 9), 2)
                .unwrap(),
        );
        assert_eq!(moved.time, tp("2022-06-09T08:55"));
        assert_eq!(state.timetable_api.get_lesson(lesson.id).unwrap().time, moved.time);
    }

    #[test]
    fn test_move_lesson_rejected_keeps_original() {
        logging::init_test();
        let (_tmp, state) = setup_state();
        let teacher = seed_teacher(&state, "Ada", "Lovelace");
        let course = seed_course(&state, "Math", &teacher, 2, 1);

        let lessons = expect_applied(
            state
                .timetable_api
                .add_lessons(course.id, &[lesson_at(2022, 6, 9, 1), lesson_at(2022, 6, 9, 2)])
                .unwrap(),
        );

        // 改到已有课时的时间 -> 重复
        let result = state
            .timetable_api
            .move_lesson(lessons[0].id, course.id, date(2022, 6, 9), 2)
            .unwrap();
        assert_eq!(result.rejection().unwrap().kind, RejectionKind::DuplicateLesson);

        // 改到周六 -> 周末
        let result = state
            .timetable_api
            .move_lesson(lessons[0].id, course.id, date(2022, 6, 11), 1)
            .unwrap();
        assert_eq!(result.rejection().unwrap().kind, RejectionKind::WeekendViolation);

        assert_eq!(
            state.timetable_api.get_lesson(lessons[0].id).unwrap().time,
            tp("2022-06-09T08:00")
        );
    }

    #[test]
    fn test_move_lesson_to_other_course_checks_target_teacher() {
        logging::init_test();
        let (_tmp, state) = setup_state();
        let ada = seed_teacher(&state, "Ada", "Lovelace");
        let alan = seed_teacher(&state, "Alan", "Turing");
        let math = seed_course(&state, "Math", &ada, 2, 0);
        let physics = seed_course(&state, "Physics", &alan, 2, 0);
        let chemistry = seed_course(&state, "Chemistry", &alan, 3, 0);

        let lesson = expect_applied(
            state
                .timetable_api
                .add_lessons(math.id, &[lesson_at(2022, 6, 9, 1)])
                .unwrap(),
        )
        .remove(0);
        expect_applied(
            state
                .timetable_api
                .add_lessons(chemistry.id, &[lesson_at(2022, 6, 9, 1)])
                .unwrap(),
        );

        // Alan 在该时间已有化学课
        let result = state
            .timetable_api
            .move_lesson(lesson.id, physics.id, date(2022, 6, 9), 1)
            .unwrap();
        assert_eq!(result.rejection().unwrap().kind, RejectionKind::TeacherOverlap);

        let moved = expect_applied(
            state
                .timetable_api
                .move_lesson(lesson.id, physics.id, date(2022, 6, 9), 2)
                .unwrap(),
        );
        assert_eq!(moved.course_id, physics.id);
        assert!(state.timetable_api.course_lessons(math.id).unwrap().is_empty());
    }

    #[test]
    fn test_move_lesson_rejected_by_student_lesson_in_other_course() {
        logging::init_test();
        let (_tmp, state) = setup_state();
        let ada = seed_teacher(&state, "Ada", "Lovelace");
        let frida = seed_teacher(&state, "Frida", "Kahlo");
        let math = seed_course(&state, "Math", &ada, 2, 1);
        let art = seed_course(&state, "Art", &frida, 2, 1);
        let student = seed_student(&state, "Jack", 2, 1);
        expect_applied(state.enrollment_api.enroll_student(math.id, student.id).unwrap());
        expect_applied(state.enrollment_api.enroll_student(art.id, student.id).unwrap());

        let lesson = expect_applied(
            state
                .timetable_api
                .add_lessons(math.id, &[lesson_at(2022, 6, 9, 1)])
                .unwrap(),
        )
        .remove(0);
        expect_applied(
            state
                .timetable_api
                .add_lessons(art.id, &[lesson_at(2022, 6, 9, 2)])
                .unwrap(),
        );

        // Jack 第2节已有美术课
        let result = state
            .timetable_api
            .move_lesson(lesson.id, math.id, date(2022, 6, 9), 2)
            .unwrap();
        let rejection = result.rejection().unwrap();
        assert_eq!(rejection.kind, RejectionKind::StudentOverlap);
        assert_eq!(rejection.time_points, vec![tp("2022-06-09T08:55")]);
        assert_eq!(
            state.timetable_api.get_lesson(lesson.id).unwrap().time,
            tp("2022-06-09T08:00")
        );
    }

    #[test]
    fn test_move_lesson_to_other_course_shared_student_frees_old_time() {
        logging::init_test();
        let (_tmp, state) = setup_state();
        let ada = seed_teacher(&state, "Ada", "Lovelace");
        let alan = seed_teacher(&state, "Alan", "Turing");
        let math = seed_course(&state, "Math", &ada, 2, 1);
        let physics = seed_course(&state, "Physics", &alan, 2, 1);
        let student = seed_student(&state, "Jack", 2, 1);
        expect_applied(state.enrollment_api.enroll_student(math.id, student.id).unwrap());
        expect_applied(state.enrollment_api.enroll_student(physics.id, student.id).unwrap());

        let lesson = expect_applied(
            state
                .timetable_api
                .add_lessons(math.id, &[lesson_at(2022, 6, 9, 1)])
                .unwrap(),
        )
        .remove(0);

        // 课时从数学移到物理,时间不变: Jack 的旧占用随课时一起让出
        let moved = expect_applied(
            state
                .timetable_api
                .move_lesson(lesson.id, physics.id, date(2022, 6, 9), 1)
                .unwrap(),
        );
        assert_eq!(moved.course_id, physics.id);
        assert_eq!(moved.time, tp("2022-06-09T08:00"));

        let jack_lessons = state.timetable_api.student_lessons(student.id).unwrap();
        assert_eq!(jack_lessons, vec![moved]);
        assert!(state.timetable_api.course_lessons(math.id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_lesson() {
        logging::init_test();
        let (_tmp, state) = setup_state();
        let teacher = seed_teacher(&state, "Ada", "Lovelace");
        let course = seed_course(&state, "Math", &teacher, 2, 1);

        let lesson = expect_applied(
            state
                .timetable_api
                .add_lessons(course.id, &[lesson_at(2022, 6, 9, 1)])
                .unwrap(),
        )
        .remove(0);

        state.timetable_api.delete_lesson(lesson.id).unwrap();
        assert!(state.timetable_api.course_lessons(course.id).unwrap().is_empty());

        let err = state.timetable_api.delete_lesson(lesson.id).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        let err = state.timetable_api.delete_lesson(LessonId(12345)).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        // 删除后原时间可重新排课
        let result = state
            .timetable_api
            .add_lessons(course.id, &[lesson_at(2022, 6, 9, 1)])
            .unwrap();
        assert!(matches!(result, PlacementResult::Applied(_)));
    }

    // ==========================================
    // 课表查询
    // ==========================================

    #[test]
    fn test_day_views_are_ordered_by_time() {
        logging::init_test();
        let (_tmp, state) = setup_state();
        let teacher = seed_teacher(&state, "Ada", "Lovelace");
        let math = seed_course(&state, "Math", &teacher, 2, 1);
        let art = seed_course(&state, "Art", &teacher, 2, 1);
        let student = seed_student(&state, "Jack", 2, 1);
        expect_applied(state.enrollment_api.enroll_student(math.id, student.id).unwrap());
        expect_applied(state.enrollment_api.enroll_student(art.id, student.id).unwrap());

        expect_applied(
            state
                .timetable_api
                .add_lessons(math.id, &[lesson_at(2022, 6, 9, 6), lesson_at(2022, 6, 10, 1)])
                .unwrap(),
        );
        expect_applied(
            state
                .timetable_api
                .add_lessons(art.id, &[lesson_at(2022, 6, 9, 2)])
                .unwrap(),
        );

        let day: Vec<TimePoint> = state
            .timetable_api
            .student_day(student.id, date(2022, 6, 9))
            .unwrap()
            .into_iter()
            .map(|l| l.time)
            .collect();
        assert_eq!(day, vec![tp("2022-06-09T08:55"), tp("2022-06-09T12:55")]);

        let teacher_day = state
            .timetable_api
            .teacher_day(teacher.id, date(2022, 6, 10))
            .unwrap();
        assert_eq!(teacher_day.len(), 1);
        assert_eq!(teacher_day[0].course_id, math.id);

        assert_eq!(state.timetable_api.student_lessons(student.id).unwrap().len(), 3);
        assert_eq!(state.timetable_api.teacher_lessons(teacher.id).unwrap().len(), 3);
        assert!(state
            .timetable_api
            .student_day(student.id, date(2022, 6, 13))
            .unwrap()
            .is_empty());
    }
}
