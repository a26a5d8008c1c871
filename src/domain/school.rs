// ==========================================
// 学校课表系统 - 学校实体
// ==========================================
// 对齐: db.rs 中 subject / teacher / student / course / lesson 表
// ==========================================

use crate::domain::types::{CourseId, LessonId, StudentId, SubjectId, TeacherId, TimePoint};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Subject - 科目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
}

// ==========================================
// Teacher - 教师
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
}

// ==========================================
// Student - 学生
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub grade: u8, // 1..=12
    pub class: u8, // 0 = 全年级唯一班, 1..=4 = A..D
}

// ==========================================
// Course - 课程
// ==========================================
// 一门课程 = 科目 + 授课教师 + 年级/班级限制
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
    pub for_grade: u8,
    pub for_class: u8, // 0 = 该年级任意班级均可选
}

impl Course {
    /// 学生是否满足课程的年级/班级限制
    pub fn admits(&self, student: &Student) -> bool {
        self.admits_grade(student.grade) && self.admits_class(student.class)
    }

    pub fn admits_grade(&self, grade: u8) -> bool {
        self.for_grade == grade
    }

    pub fn admits_class(&self, class: u8) -> bool {
        self.for_class == 0 || self.for_class == class
    }
}

// ==========================================
// Lesson - 已排课时
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub course_id: CourseId,
    pub time: TimePoint,
}
