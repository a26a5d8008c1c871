// ==========================================
// 学校课表系统 - 排课/选课结果
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::timetable::Rejection;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 排课/选课操作结果
///
/// 规则拒绝是正常结果,不是错误: 调用方据此展示冲突时间点或学生
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlacementResult<T> {
    Applied(T),
    Rejected(Rejection),
}

impl<T> PlacementResult<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, PlacementResult::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            PlacementResult::Applied(value) => Some(value),
            PlacementResult::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            PlacementResult::Applied(_) => None,
            PlacementResult::Rejected(rejection) => Some(rejection),
        }
    }
}

/// 查询结果为空时返回 NotFound (并记录告警)
pub(crate) fn require<T>(found: Option<T>, entity: &str, id: impl fmt::Display) -> ApiResult<T> {
    found.ok_or_else(|| {
        tracing::warn!(entity, %id, "资源未找到");
        ApiError::from(RepositoryError::not_found(entity, id))
    })
}
