// ==========================================
// 学校课表系统 - API 层
// ==========================================
// 职责: 请求级用例,组织 "读快照 -> 校验 -> 写入" 的工作单元
// ==========================================

pub mod course_api;
pub mod enrollment_api;
pub mod error;
pub mod placement;
pub mod roster_api;
pub mod timetable_api;

// 重导出核心类型
pub use course_api::CourseApi;
pub use enrollment_api::EnrollmentApi;
pub use error::{ApiError, ApiResult};
pub use placement::PlacementResult;
pub use roster_api::RosterApi;
pub use timetable_api::{LessonRequest, TimetableApi};
