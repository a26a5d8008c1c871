// ==========================================
// 学校课表系统 - 引擎层
// ==========================================
// 职责: 排课冲突判定与选课校验,不拼 SQL
// 红线: Engine 不拼 SQL, 所有拒绝必须携带原因与冲突明细
// ==========================================

pub mod commitments;
pub mod conflict;
pub mod enrollment;
pub mod slot_catalog;

// 重导出核心引擎
pub use commitments::{CommitmentLookup, CommitmentSnapshot};
pub use conflict::ConflictEngine;
pub use enrollment::EnrollmentPlanner;
pub use slot_catalog::{SlotCatalog, STANDARD_SLOT_TIMES};
