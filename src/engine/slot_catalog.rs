// ==========================================
// 学校课表系统 - 课节时间表
// ==========================================
// 职责: 每日8个固定上课时刻 + 周末排除规则
// 红线: 无状态、无副作用、无 I/O 操作
// 说明: 启动时构造一次,以 Arc<SlotCatalog> 共享,不可变
// ==========================================

use crate::domain::types::{is_weekend, LessonSlotIndex, ScheduleInputError, TimePoint};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

/// 标准上课时刻 (时, 分)
pub const STANDARD_SLOT_TIMES: [(u32, u32); 8] = [
    (8, 0),
    (8, 55),
    (9, 50),
    (10, 55),
    (12, 0),
    (12, 55),
    (13, 50),
    (14, 45),
];

// ==========================================
// SlotCatalog - 课节时间表
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotCatalog {
    times: [NaiveTime; 8],
}

impl SlotCatalog {
    /// 学校标准时间表
    pub fn standard() -> Self {
        let times =
            STANDARD_SLOT_TIMES.map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default());
        Self { times }
    }

    /// 由配置提供的时刻构造
    ///
    /// # 规则
    /// - 必须恰好 8 个时刻
    /// - 必须严格递增(同一天内不可重复)
    pub fn from_times(times: &[NaiveTime]) -> Result<Self, ScheduleInputError> {
        let table: [NaiveTime; 8] = times.try_into().map_err(|_| {
            ScheduleInputError::InvalidSlotTable(format!(
                "需要 8 个上课时刻,实际 {} 个",
                times.len()
            ))
        })?;

        if let Some(pair) = table.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ScheduleInputError::InvalidSlotTable(format!(
                "上课时刻必须严格递增: {} 不早于 {}",
                pair[0].format("%H:%M"),
                pair[1].format("%H:%M")
            )));
        }

        Ok(Self { times: table })
    }

    /// 课节序号 -> 上课时刻
    pub fn slot_time(&self, slot: LessonSlotIndex) -> NaiveTime {
        self.times[slot.position()]
    }

    /// 原始序号 -> 上课时刻,序号越界时报错
    pub fn slot_time_at(&self, index: i64) -> Result<NaiveTime, ScheduleInputError> {
        LessonSlotIndex::new(index).map(|slot| self.slot_time(slot))
    }

    /// 日期 + 课节 -> 时间点
    pub fn time_point(&self, date: NaiveDate, slot: LessonSlotIndex) -> TimePoint {
        TimePoint::new(date, self.slot_time(slot))
    }

    /// 时刻 -> 课节序号 (非标准时刻返回 None)
    pub fn slot_of(&self, time: NaiveTime) -> Option<LessonSlotIndex> {
        LessonSlotIndex::all().find(|slot| self.slot_time(*slot) == time)
    }

    pub fn is_weekend(date: NaiveDate) -> bool {
        is_weekend(date)
    }

    pub fn times(&self) -> &[NaiveTime; 8] {
        &self.times
    }
}

impl Default for SlotCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
