// ==========================================
// 选课 API 集成测试
// ==========================================
// 职责: 验证单个学生/整班选课与退选
// ==========================================


#[cfg(test)]
mod enrollment_api_test {
    use school_timetable::api::ApiError;
    use school_timetable::domain::types::{StudentId, TimePoint};
    use school_timetable::{logging, RejectionKind};

    use crate::test_helpers::*;

    #[test]
    fn test_enroll_whole_class() {
        // 场景 E
        logging::init_test();
        let (_tmp, state) = setup_state();
        let teacher = seed_teacher(&state, "Ada", "Lovelace");
        let course = seed_course(&state, "Math", &teacher, 2, 1);
        let class = seed_class(&state, 2, 1, 5);
        seed_student(&state, "Other", 2, 2);

        let enrolled = expect_applied(state.enrollment_api.enroll_class(course.id, 2, 1).unwrap());
        assert_eq!(enrolled.len(), 5);

        let mut ids: Vec<StudentId> = state
            .course_api
            .course_students(course.id)
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        ids.sort();
        let expected: Vec<StudentId> = class.iter().map(|s| s.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_already_enrolled_reported_alone() {
        // 场景 F: 学生1 已选, 学生2 与课程课时冲突 -> 只报告学生1
        logging::init_test();
        let (_tmp, state) = setup_state();
        let ada = seed_teacher(&state, "Ada", "Lovelace");
        let alan = seed_teacher(&state, "Alan", "Turing");
        let math = seed_course(&state, "Math", &ada, 2, 1);
        let physics = seed_course(&state, "Physics", &alan, 2, 1);
        let class = seed_class(&state, 2, 1, 2);

        expect_applied(
            state
                .timetable_api
                .add_lessons(math.id, &[lesson_at(2022, 6, 9, 1)])
                .unwrap(),
        );
        expect_applied(
            state
                .timetable_api
                .add_lessons(physics.id, &[lesson_at(2022, 6, 9, 1)])
                .unwrap(),
        );
        expect_applied(state.enrollment_api.enroll_student(math.id, class[0].id).unwrap());
        expect_applied(state.enrollment_api.enroll_student(physics.id, class[1].id).unwrap());

        let result = state.enrollment_api.enroll_class(math.id, 2, 1).unwrap();
        let rejection = result.rejection().unwrap();
        assert_eq!(rejection.kind, RejectionKind::AlreadyEnrolled);
        assert_eq!(rejection.student_ids, vec![class[0].id]);
        assert!(rejection.time_points.is_empty());

        // 整班未写入
        assert_eq!(state.course_api.course_students(math.id).unwrap().len(), 1);
    }

    #[test]
    fn test_class_schedule_overlap() {
        logging::init_test();
        let (_tmp, state) = setup_state();
        let ada = seed_teacher(&state, "Ada", "Lovelace");
        let alan = seed_teacher(&state, "Alan", "Turing");
        let math = seed_course(&state, "Math", &ada, 2, 0);
        let physics = seed_course(&state, "Physics", &alan, 2, 0);
        let class = seed_class(&state, 2, 1, 3);

        expect_applied(
            state
                .timetable_api
                .add_lessons(math.id, &[lesson_at(2022, 6, 9, 1)])
                .unwrap(),
        );
        expect_applied(
            state
                .timetable_api
                .add_lessons(physics.id, &[lesson_at(2022, 6, 9, 1), lesson_at(2022, 6, 9, 2)])
                .unwrap(),
        );
        expect_applied(state.enrollment_api.enroll_student(math.id, class[2].id).unwrap());

        let result = state.enrollment_api.enroll_class(physics.id, 2, 1).unwrap();
        let rejection = result.rejection().unwrap();
        assert_eq!(rejection.kind, RejectionKind::StudentOverlap);
        assert_eq!(
            rejection.time_points,
            vec![TimePoint::parse("2022-06-09T08:00").unwrap()]
        );
        assert!(state.course_api.course_students(physics.id).unwrap().is_empty());
    }

    #[test]
    fn test_empty_class_and_mismatches() {
        logging::init_test();
        let (_tmp, state) = setup_state();
        let teacher = seed_teacher(&state, "Ada", "Lovelace");
        let course = seed_course(&state, "Math", &teacher, 2, 1);
        seed_class(&state, 2, 2, 2);
        seed_class(&state, 3, 1, 2);

        let result = state.enrollment_api.enroll_class(course.id, 2, 3).unwrap();
        assert_eq!(result.rejection().unwrap().kind, RejectionKind::NoCandidates);

        let result = state.enrollment_api.enroll_class(course.id, 2, 2).unwrap();
        assert_eq!(result.rejection().unwrap().kind, RejectionKind::ClassMismatch);

        let result = state.enrollment_api.enroll_class(course.id, 3, 1).unwrap();
        let rejection = result.rejection().unwrap();
        assert_eq!(rejection.kind, RejectionKind::GradeMismatch);
        assert_eq!(rejection.student_ids.len(), 2);

        let err = state.enrollment_api.enroll_class(course.id, 13, 1).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_enroll_single_student() {
        logging::init_test();
        let (_tmp, state) = setup_state();
        let teacher = seed_teacher(&state, "Ada", "Lovelace");
        let course = seed_course(&state, "Math", &teacher, 10, 0);
        let student = seed_student(&state, "Jack", 10, 3);

        let enrolled = expect_applied(state.enrollment_api.enroll_student(course.id, student.id).unwrap());
        assert_eq!(enrolled.id, student.id);

        let result = state.enrollment_api.enroll_student(course.id, student.id).unwrap();
        assert_eq!(result.rejection().unwrap().kind, RejectionKind::AlreadyEnrolled);

        let err = state
            .enrollment_api
            .enroll_student(course.id, StudentId(4242))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_unenroll_student() {
        logging::init_test();
        let (_tmp, state) = setup_state();
        let teacher = seed_teacher(&state, "Ada", "Lovelace");
        let course = seed_course(&state, "Math", &teacher, 2, 1);
        let student = seed_student(&state, "Jack", 2, 1);
        expect_applied(state.enrollment_api.enroll_student(course.id, student.id).unwrap());

        state.enrollment_api.unenroll_student(course.id, student.id).unwrap();
        assert!(state.course_api.course_students(course.id).unwrap().is_empty());

        let err = state
            .enrollment_api
            .unenroll_student(course.id, student.id)
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_unenroll_class() {
        logging::init_test();
        let (_tmp, state) = setup_state();
        let teacher = seed_teacher(&state, "Ada", "Lovelace");
        let course = seed_course(&state, "Math", &teacher, 2, 0);
        seed_class(&state, 2, 1, 3);
        let other = seed_class(&state, 2, 2, 2);

        expect_applied(state.enrollment_api.enroll_class(course.id, 2, 1).unwrap());
        expect_applied(state.enrollment_api.enroll_class(course.id, 2, 2).unwrap());

        assert_eq!(state.enrollment_api.unenroll_class(course.id, 2, 1).unwrap(), 3);
        let remaining: Vec<StudentId> = state
            .course_api
            .course_students(course.id)
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(remaining, other.iter().map(|s| s.id).collect::<Vec<_>>());

        // 该班已无学生选课
        let err = state.enrollment_api.unenroll_class(course.id, 2, 1).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        // 年级与课程不符
        let err = state.enrollment_api.unenroll_class(course.id, 3, 1).unwrap_err();
        assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
    }
}
