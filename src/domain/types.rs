// ==========================================
// 学校课表系统 - 领域类型定义
// ==========================================
// 职责: 时间点、课节序号、实体标识等值对象
// 红线: 时间点精确相等才算冲突,不做容差
// ==========================================

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ==========================================
// 输入错误 (调用方缺陷,不是业务规则违反)
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleInputError {
    #[error("无效的课节序号: {0} (有效范围 1..=8)")]
    InvalidSlotIndex(i64),

    #[error("无效的课节时间表: {0}")]
    InvalidSlotTable(String),

    #[error("无效的课时时间: {0} (格式 YYYY-MM-DDTHH:MM)")]
    InvalidTimePoint(String),

    #[error("无效的年级: {0} (有效范围 1..=12)")]
    InvalidGrade(i64),

    #[error("无效的班级: {0} (有效范围 0..=4)")]
    InvalidClass(i64),
}

// ==========================================
// 实体标识
// ==========================================
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                $name(id)
            }
        }
    };
}

entity_id!(
    /// 学生ID
    StudentId
);
entity_id!(
    /// 教师ID
    TeacherId
);
entity_id!(
    /// 课程ID
    CourseId
);
entity_id!(
    /// 科目ID
    SubjectId
);
entity_id!(
    /// 课时ID
    LessonId
);

// ==========================================
// TimePoint - 课时时间点
// ==========================================
// 日期 + 时刻,分钟精度,按本地挂钟时间处理(不做时区换算)
// 序列化为 `YYYY-MM-DDTHH:MM`,带秒的输入被拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimePoint(NaiveDateTime);

impl TimePoint {
    /// 数据库/展示统一格式
    pub const FORMAT: &'static str = "%Y-%m-%dT%H:%M";

    /// 由日期和时刻构造 (秒及以下被截断)
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        let minute_time = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0)
            .unwrap_or(time);
        TimePoint(date.and_time(minute_time))
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.0.time()
    }

    /// 是否落在周六/周日
    pub fn is_weekend(&self) -> bool {
        is_weekend(self.date())
    }

    /// 解析 `YYYY-MM-DDTHH:MM` 格式
    pub fn parse(raw: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(raw.trim(), Self::FORMAT)
            .ok()
            .map(TimePoint)
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl TryFrom<String> for TimePoint {
    type Error = ScheduleInputError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        TimePoint::parse(&raw).ok_or(ScheduleInputError::InvalidTimePoint(raw))
    }
}

impl From<TimePoint> for String {
    fn from(tp: TimePoint) -> Self {
        tp.to_string()
    }
}

/// 周末判定: 周六、周日
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

// ==========================================
// LessonSlotIndex - 课节序号 (1..=8)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct LessonSlotIndex(u8);

impl LessonSlotIndex {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 8;

    /// 校验并构造课节序号
    pub fn new(index: i64) -> Result<Self, ScheduleInputError> {
        if index < Self::MIN as i64 || index > Self::MAX as i64 {
            return Err(ScheduleInputError::InvalidSlotIndex(index));
        }
        Ok(LessonSlotIndex(index as u8))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// 从0开始的数组下标
    pub fn position(&self) -> usize {
        (self.0 - Self::MIN) as usize
    }

    /// 全部课节 (1..=8)
    pub fn all() -> impl Iterator<Item = LessonSlotIndex> {
        (Self::MIN..=Self::MAX).map(LessonSlotIndex)
    }
}

impl TryFrom<i64> for LessonSlotIndex {
    type Error = ScheduleInputError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        LessonSlotIndex::new(value)
    }
}

impl From<LessonSlotIndex> for i64 {
    fn from(index: LessonSlotIndex) -> Self {
        index.0 as i64
    }
}

impl fmt::Display for LessonSlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "第{}节", self.0)
    }
}

// ==========================================
// 年级 / 班级
// ==========================================
// 班级 0 表示该年级只有一个班(或课程对全年级开放)
pub const MIN_GRADE: i64 = 1;
pub const MAX_GRADE: i64 = 12;
pub const MAX_CLASS: i64 = 4;

/// 校验年级
pub fn validate_grade(grade: i64) -> Result<u8, ScheduleInputError> {
    if !(MIN_GRADE..=MAX_GRADE).contains(&grade) {
        return Err(ScheduleInputError::InvalidGrade(grade));
    }
    Ok(grade as u8)
}

/// 校验班级
pub fn validate_class(class: i64) -> Result<u8, ScheduleInputError> {
    if !(0..=MAX_CLASS).contains(&class) {
        return Err(ScheduleInputError::InvalidClass(class));
    }
    Ok(class as u8)
}
